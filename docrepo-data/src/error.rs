/// Errors returned by repository operations.
///
/// Every operation either succeeds or fails with exactly one of these kinds.
#[derive(Debug)]
pub enum DataError {
    /// The id string is not a valid ObjectId (24 hex characters).
    InvalidIdentity(String),
    /// No document matched an id- or filter-scoped single-document operation.
    NotFound(String),
    /// A bulk delete was attempted without a filter.
    EmptyFilter,
    /// Any other store failure (network, (de)serialization, constraint
    /// violation), passed through unchanged.
    Store(Box<dyn std::error::Error + Send + Sync>),
}

/// Convenience alias for data-layer results.
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Wrap a backend or codec error.
    ///
    /// Used by store implementations (e.g. `docrepo-data-mongo`) to wrap
    /// driver-specific errors.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Store(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }

    pub fn is_invalid_identity(&self) -> bool {
        matches!(self, DataError::InvalidIdentity(_))
    }

    pub fn is_empty_filter(&self) -> bool {
        matches!(self, DataError::EmptyFilter)
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::InvalidIdentity(id) => write!(f, "invalid object ID format: {id:?}"),
            DataError::NotFound(what) => write!(f, "document not found: {what}"),
            DataError::EmptyFilter => {
                write!(f, "filter cannot be empty for delete many operation")
            }
            DataError::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Store(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<bson::ser::Error> for DataError {
    fn from(err: bson::ser::Error) -> Self {
        DataError::store(err)
    }
}

impl From<bson::de::Error> for DataError {
    fn from(err: bson::de::Error) -> Self {
        DataError::store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_messages() {
        assert_eq!(
            DataError::InvalidIdentity("nope".into()).to_string(),
            "invalid object ID format: \"nope\""
        );
        assert_eq!(
            DataError::NotFound("users/507f1f77bcf86cd799439011".into()).to_string(),
            "document not found: users/507f1f77bcf86cd799439011"
        );
        assert_eq!(
            DataError::EmptyFilter.to_string(),
            "filter cannot be empty for delete many operation"
        );
    }

    #[test]
    fn store_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = DataError::store(io);
        assert!(err.to_string().contains("reset by peer"));
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }
}
