use docrepo_core::config::{ConfigError, ConfigProperties, DocrepoConfig, PropertyKey};
use tracing::warn;

/// Application name reported to the server when `app.name` is not set.
pub const DEFAULT_APP_NAME: &str = "training-api";

/// Connection settings for [`MongoConnection`](crate::MongoConnection).
///
/// | Key | Env var | |
/// |-----|---------|---|
/// | `mongo.uri` | `MONGO_URI` | required |
/// | `mongo.database` | `MONGO_DATABASE` | required |
/// | `app.name` | `APP_NAME` | optional, defaults to `training-api` |
///
/// An empty value counts as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub app_name: String,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Load the layered configuration for `profile` from the working
    /// directory and read this section from it.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::from_config(&DocrepoConfig::load(profile)?)
    }

    /// [`load`](Self::load) with the default `dev` profile; `DOCREPO_PROFILE`
    /// still takes precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load("dev")
    }
}

fn required(config: &DocrepoConfig, key: &str) -> Result<String, ConfigError> {
    match config.get_opt::<String>(key)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::NotFound(key.to_string())),
    }
}

impl ConfigProperties for MongoConfig {
    fn prefix() -> &'static str {
        "mongo"
    }

    fn keys() -> Vec<PropertyKey> {
        vec![
            PropertyKey {
                key: "mongo.uri",
                type_name: "String",
                required: true,
                description: Some("connection string, e.g. mongodb://localhost:27017"),
            },
            PropertyKey {
                key: "mongo.database",
                type_name: "String",
                required: true,
                description: Some("database holding every collection"),
            },
            PropertyKey {
                key: "app.name",
                type_name: "String",
                required: false,
                description: Some("application name sent in the handshake"),
            },
        ]
    }

    fn from_config(config: &DocrepoConfig) -> Result<Self, ConfigError> {
        let uri = required(config, "mongo.uri")?;
        let database = required(config, "mongo.database")?;
        let app_name = match config.get_opt::<String>("app.name")? {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                warn!(app_name = DEFAULT_APP_NAME, "app.name not set, using default");
                DEFAULT_APP_NAME.to_string()
            }
        };
        Ok(Self {
            uri,
            database,
            app_name,
        })
    }
}
