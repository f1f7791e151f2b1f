//! # docrepo-data
//!
//! Backend-agnostic data layer: a generic repository over a document store.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Model`] | What a type must provide to be stored: identity accessors and a collection name |
//! | [`Repository`] | The CRUD / pagination / bulk operation contract |
//! | [`DocumentRepository`] | The generic implementation of [`Repository`] over any [`DocumentStore`] |
//! | [`DocumentStore`] | The store collaborator: one collection handle, raw BSON documents |
//! | [`DataError`] | `InvalidIdentity`, `NotFound`, `EmptyFilter` or an opaque `Store` error |
//! | [`InMemoryStore`] / [`MemoryDatabase`] | In-process [`DocumentStore`] for tests and prototyping |
//!
//! Filters and update documents are plain [`bson::Document`]s and are forwarded
//! to the store untouched.
//!
//! ```ignore
//! use docrepo_data::prelude::*;
//!
//! let db = MemoryDatabase::new();
//! let users = db.repository::<User>();
//!
//! let mut alice = User::new("Alice", 30);
//! users.create(&mut alice).await?;
//! let page = users.find_with_pagination(doc! {}, &Pageable::new(1, 10)).await?;
//! ```

pub mod crud;
pub mod error;
pub mod memory;
pub mod model;
pub mod options;
pub mod page;
pub mod repository;
pub mod store;

pub use bson::{doc, oid::ObjectId, DateTime, Document};
pub use crud::DocumentRepository;
pub use error::{DataError, DataResult};
pub use memory::{InMemoryStore, MemoryDatabase, MemoryStoreError};
pub use model::{default_collection_name, Model};
pub use options::FindOptions;
pub use page::{Page, Pageable};
pub use repository::Repository;
pub use store::{DocumentStore, StoreFuture, UpdateOutcome};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        doc, DataError, Document, DocumentRepository, DocumentStore, FindOptions, MemoryDatabase,
        Model, ObjectId, Page, Pageable, Repository,
    };
}
