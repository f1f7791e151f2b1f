//! # docrepo-core
//!
//! Shared runtime pieces for the docrepo crates:
//!
//! - [`config`]: layered configuration (`application.yaml`, profile YAML,
//!   `.env` files, environment variables) with typed sections.
//! - [`logging`]: `tracing` subscriber initialisation for binaries and tests.

pub mod config;
pub mod logging;

pub use config::{
    resolve_placeholders, validate_section, ConfigError, ConfigProperties, ConfigValidationError,
    ConfigValue, DefaultSecretResolver, DocrepoConfig, FromConfigValue, MissingKeyError,
    PropertyKey, SecretResolver,
};
pub use logging::{init_tracing, init_tracing_with};

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::{ConfigError, ConfigProperties, DocrepoConfig, FromConfigValue};
}
