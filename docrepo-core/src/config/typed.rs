use super::{ConfigError, DocrepoConfig};

/// Description of one key a typed section reads.
#[derive(Debug, Clone)]
pub struct PropertyKey {
    /// Absolute key, e.g. `"mongo.uri"`.
    pub key: &'static str,
    /// Rust type name, e.g. `"String"`.
    pub type_name: &'static str,
    /// `false` when the key is optional or has a default.
    pub required: bool,
    pub description: Option<&'static str>,
}

impl PropertyKey {
    /// Environment variable that overrides this key: `mongo.uri` -> `MONGO_URI`.
    pub fn env_var(&self) -> String {
        self.key.to_uppercase().replace('.', "_")
    }
}

/// A strongly-typed configuration section.
///
/// ```ignore
/// struct CacheConfig { ttl_secs: u64 }
///
/// impl ConfigProperties for CacheConfig {
///     fn prefix() -> &'static str { "cache" }
///     fn keys() -> Vec<PropertyKey> {
///         vec![PropertyKey { key: "cache.ttl_secs", type_name: "u64", required: false, description: None }]
///     }
///     fn from_config(config: &DocrepoConfig) -> Result<Self, ConfigError> {
///         Ok(Self { ttl_secs: config.get_or("cache.ttl_secs", 60) })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    fn prefix() -> &'static str;

    /// Every key the section reads, used for validation messages.
    fn keys() -> Vec<PropertyKey>;

    fn from_config(config: &DocrepoConfig) -> Result<Self, ConfigError>;
}
