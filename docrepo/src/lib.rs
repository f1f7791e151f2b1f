//! docrepo: typed CRUD, pagination and bulk operations over a document
//! store, one repository per model type.
//!
//! This facade re-exports the docrepo crates behind a single dependency:
//!
//! ```ignore
//! use docrepo::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Crate                |
//! |-----------|---------|----------------------|
//! | `mongodb` | **yes** | `docrepo-data-mongo` |
//!
//! Without `mongodb` only the in-memory store is available, which is enough
//! for unit tests of code written against [`Repository`](docrepo_data::Repository).

pub use docrepo_core;
pub use docrepo_data;
#[cfg(feature = "mongodb")]
pub use docrepo_data_mongo;

// Core and data types at the top level for convenience.
pub use docrepo_core::*;
pub use docrepo_data::*;
#[cfg(feature = "mongodb")]
pub use docrepo_data_mongo::{
    bootstrap, try_bootstrap, BootstrapError, MongoConfig, MongoConnection, MongoErrorExt,
    MongoStore,
};

/// Unified prelude: import everything with `use docrepo::prelude::*`.
pub mod prelude {
    pub use docrepo_core::prelude::*;
    pub use docrepo_core::init_tracing;
    pub use docrepo_data::prelude::*;
    #[cfg(feature = "mongodb")]
    pub use docrepo_data_mongo::prelude::*;
}
