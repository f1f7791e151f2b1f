mod loader;
pub mod secrets;
pub mod typed;
pub mod validation;
pub mod value;

use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;

pub use secrets::{resolve_placeholders, DefaultSecretResolver, SecretResolver};
pub use typed::{ConfigProperties, PropertyKey};
pub use validation::{validate_section, ConfigValidationError, MissingKeyError};
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "DOCREPO_PROFILE";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key is absent.
    NotFound(String),
    /// The value exists but cannot be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// A config file or secret reference could not be read or parsed.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process configuration, resolved once at startup and passed by reference to
/// whatever needs it (connection bootstrap, repositories, binaries).
///
/// `DocrepoConfig` (= `DocrepoConfig<()>`) is a flat map of dot-separated keys.
/// `DocrepoConfig<T>` additionally carries a typed section reachable through
/// `Deref<Target = T>`.
///
/// Sources, lowest to highest priority:
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` then `.env.{profile}` (loaded into the process environment,
///    never overwriting variables that are already set)
/// 4. Environment variables: `MONGO_URI` overrides `mongo.uri`
///
/// The profile is `DOCREPO_PROFILE` when set, otherwise the argument.
#[derive(Debug, Clone)]
pub struct DocrepoConfig<T = ()> {
    values: HashMap<String, ConfigValue>,
    profile: String,
    typed: T,
}

impl DocrepoConfig {
    /// Load the layered configuration from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Load the layered configuration, looking for YAML and `.env` files in `dir`.
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_with_resolver(dir, profile, &DefaultSecretResolver)
    }

    /// Same as [`load_from`](Self::load_from) with a custom `${...}` resolver.
    pub fn load_from_with_resolver(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(&dir.join(format!("application-{profile}.yaml")), &mut values)?;

        // Missing .env files are fine.
        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{profile}")));

        for value in values.values_mut() {
            if let ConfigValue::String(s) = value {
                if s.contains("${") {
                    *s = resolve_placeholders(s, resolver)?;
                }
            }
        }

        // Non-UTF-8 variables cannot name or hold a config value; skip them.
        for (name, raw) in std::env::vars_os() {
            let (Ok(name), Ok(raw)) = (name.into_string(), raw.into_string()) else {
                continue;
            };
            values.insert(loader::env_to_key(&name), ConfigValue::String(raw));
        }

        Ok(DocrepoConfig {
            values,
            profile,
            typed: (),
        })
    }

    /// Build a config from a YAML document only (no files, no environment).
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(DocrepoConfig {
            values,
            profile: profile.to_string(),
            typed: (),
        })
    }

    /// An empty config, useful in tests.
    pub fn empty() -> Self {
        DocrepoConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
            typed: (),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Attach the typed section `C`, built from the raw values.
    ///
    /// ```ignore
    /// let config = DocrepoConfig::load("dev")?.with_typed::<MongoConfig>()?;
    /// println!("{}", config.database);
    /// ```
    pub fn with_typed<C: ConfigProperties>(self) -> Result<DocrepoConfig<C>, ConfigError> {
        let typed = C::from_config(&self)?;
        Ok(DocrepoConfig {
            values: self.values,
            profile: self.profile,
            typed,
        })
    }
}

impl<T> DocrepoConfig<T> {
    /// Get the value stored under a dot-separated key.
    ///
    /// # Errors
    ///
    /// `ConfigError::NotFound` when the key is absent, `ConfigError::TypeMismatch`
    /// when the value does not convert to `V`.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Like [`get`](Self::get), but an absent key is `Ok(None)` rather than an error.
    pub fn get_opt<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn typed(&self) -> &T {
        &self.typed
    }

    /// Drop the typed section and keep only the raw values.
    pub fn raw(&self) -> DocrepoConfig {
        DocrepoConfig {
            values: self.values.clone(),
            profile: self.profile.clone(),
            typed: (),
        }
    }
}

impl<T> Deref for DocrepoConfig<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.typed
    }
}
