use docrepo_data::DataError;

/// Extension trait for converting `mongodb::error::Error` into `DataError`.
///
/// Orphan rules forbid `From<mongodb::error::Error> for DataError` here, so
/// use `.map_err(MongoErrorExt::into_data_error)` instead.
pub trait MongoErrorExt {
    fn into_data_error(self) -> DataError;
}

impl MongoErrorExt for mongodb::error::Error {
    fn into_data_error(self) -> DataError {
        DataError::store(self)
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type MongoResult<T> = Result<T, DataError>;

/// Why [`try_bootstrap`](crate::try_bootstrap) could not produce a connection.
#[derive(Debug)]
pub enum BootstrapError {
    /// Required keys are missing or mistyped.
    Config(String),
    /// Building the client or the `ping` handshake failed.
    Connect(mongodb::error::Error),
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::Config(msg) => write!(f, "MongoDB configuration error: {msg}"),
            BootstrapError::Connect(err) => write!(f, "failed to connect to MongoDB: {err}"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BootstrapError::Connect(err) => Some(err),
            BootstrapError::Config(_) => None,
        }
    }
}

impl From<mongodb::error::Error> for BootstrapError {
    fn from(err: mongodb::error::Error) -> Self {
        BootstrapError::Connect(err)
    }
}
