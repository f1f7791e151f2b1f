use crate::error::DataError;
use crate::options::FindOptions;
use bson::oid::ObjectId;
use bson::Document;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`DocumentStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DataError>> + Send + 'a>>;

/// Result of an update: documents matched by the filter and documents whose
/// content actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Handle to one collection of a document store.
///
/// This is the whole surface a [`DocumentRepository`](crate::DocumentRepository)
/// needs. Implementations translate their driver errors into
/// [`DataError::Store`] and report absence through `Option` / counts rather
/// than errors; classifying absence as `NotFound` is the repository's job.
///
/// Updates take the partial document itself; the store applies it as a
/// field-level merge (`$set`).
pub trait DocumentStore: Send + Sync + 'static {
    fn collection_name(&self) -> &str;

    fn find_by_id(&self, id: ObjectId) -> StoreFuture<'_, Option<Document>>;

    fn find_many(&self, filter: Document, options: FindOptions) -> StoreFuture<'_, Vec<Document>>;

    /// First match in natural order.
    fn find_first(&self, filter: Document) -> StoreFuture<'_, Option<Document>>;

    /// Insert and return the identity of the new document. A document without
    /// `_id` gets a fresh one.
    fn insert(&self, document: Document) -> StoreFuture<'_, ObjectId>;

    fn update_by_id(&self, id: ObjectId, fields: Document) -> StoreFuture<'_, UpdateOutcome>;

    fn update_many(&self, filter: Document, fields: Document) -> StoreFuture<'_, UpdateOutcome>;

    /// Returns the number of deleted documents (0 or 1).
    fn delete_by_id(&self, id: ObjectId) -> StoreFuture<'_, u64>;

    fn delete_many(&self, filter: Document) -> StoreFuture<'_, u64>;

    fn count(&self, filter: Document) -> StoreFuture<'_, u64>;
}
