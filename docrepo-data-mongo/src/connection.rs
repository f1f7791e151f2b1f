use crate::config::MongoConfig;
use crate::error::BootstrapError;
use crate::store::MongoStore;
use bson::{doc, Document};
use docrepo_core::config::{validate_section, ConfigProperties, DocrepoConfig};
use docrepo_data::{DocumentRepository, Model};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{error, info};

/// An established MongoDB connection bound to one database.
///
/// Built once at startup and passed to whatever needs repositories. Clones
/// are cheap and share the driver's connection pool.
#[derive(Clone, Debug)]
pub struct MongoConnection {
    client: Client,
    database: Database,
}

impl MongoConnection {
    /// Build the client, then issue a `ping` so a bad URI or unreachable
    /// server fails here rather than on the first query.
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(
            database = %config.database,
            app_name = %config.app_name,
            "connected to MongoDB"
        );
        Ok(Self { client, database })
    }

    /// [`connect`](Self::connect), exiting the process on failure.
    pub async fn connect_or_exit(config: &MongoConfig) -> Self {
        match Self::connect(config).await {
            Ok(connection) => connection,
            Err(err) => {
                error!(error = %err, database = %config.database, "failed to connect to MongoDB");
                std::process::exit(1);
            }
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn collection(&self, name: &str) -> MongoStore {
        MongoStore::new(self.database.collection::<Document>(name))
    }

    /// Typed driver handle, for queries the repository does not cover.
    pub fn typed_collection<T: Model>(&self) -> Collection<T> {
        self.database.collection::<T>(&T::collection_name())
    }

    pub fn collection_for<T: Model>(&self) -> MongoStore {
        self.collection(&T::collection_name())
    }

    /// Repository over `T`'s own collection.
    pub fn repository<T: Model>(&self) -> DocumentRepository<T> {
        DocumentRepository::new(self.collection_for::<T>())
    }

    /// Repository over an explicitly named collection.
    pub fn repository_named<T: Model>(&self, name: &str) -> DocumentRepository<T> {
        DocumentRepository::new(self.collection(name))
    }
}

/// Read [`MongoConfig`] from `config` and connect.
///
/// Every missing required key is listed in the error, each with the
/// environment variable that would provide it.
pub async fn try_bootstrap(config: &DocrepoConfig) -> Result<MongoConnection, BootstrapError> {
    validate_section::<MongoConfig>(config).map_err(|e| BootstrapError::Config(e.to_string()))?;
    let mongo =
        MongoConfig::from_config(config).map_err(|e| BootstrapError::Config(e.to_string()))?;
    Ok(MongoConnection::connect(&mongo).await?)
}

/// [`try_bootstrap`], exiting the process on failure.
///
/// Intended for binaries: configuration and connectivity problems at startup
/// are fatal.
pub async fn bootstrap(config: &DocrepoConfig) -> MongoConnection {
    match try_bootstrap(config).await {
        Ok(connection) => connection,
        Err(err) => {
            error!(error = %err, "MongoDB bootstrap failed");
            std::process::exit(1);
        }
    }
}
