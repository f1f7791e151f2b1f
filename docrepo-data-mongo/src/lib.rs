//! # docrepo-data-mongo
//!
//! MongoDB backend for the docrepo data layer. Depends on [`docrepo-data`]
//! for the repository contract and adds the driver-facing pieces.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MongoConfig`] | `mongo.uri`, `mongo.database`, `app.name` read from [`DocrepoConfig`](docrepo_core::DocrepoConfig) |
//! | [`MongoConnection`] | Connected client + database; hands out stores and repositories |
//! | [`MongoStore`] | [`DocumentStore`](docrepo_data::DocumentStore) over one `Collection<Document>` |
//! | [`bootstrap`] / [`try_bootstrap`] | Config → connection, fatal or fallible |
//! | [`MongoErrorExt`] | `mongodb::error::Error` → `DataError` (`.into_data_error()`) |
//!
//! # Quick start
//!
//! ```ignore
//! use docrepo_core::{init_tracing, DocrepoConfig};
//! use docrepo_data_mongo::prelude::*;
//!
//! init_tracing();
//! let config = DocrepoConfig::load("dev")?;
//! let mongo = bootstrap(&config).await;
//!
//! let trainings = mongo.repository::<Training>();
//! let page = trainings.find_with_pagination(None, &Pageable::default()).await?;
//! ```
//!
//! # Error bridging
//!
//! Orphan rules prevent `From<mongodb::error::Error> for DataError` in this
//! crate; store code maps driver errors with [`MongoErrorExt`].

pub mod config;
pub mod connection;
pub mod error;
pub mod store;

pub use config::{MongoConfig, DEFAULT_APP_NAME};
pub use connection::{bootstrap, try_bootstrap, MongoConnection};
pub use error::{BootstrapError, MongoErrorExt, MongoResult};
pub use store::MongoStore;

/// Re-exports of the most commonly used types from both `docrepo-data` and this crate.
pub mod prelude {
    pub use crate::{bootstrap, MongoConfig, MongoConnection, MongoErrorExt, MongoStore};
    pub use docrepo_data::prelude::*;
}
