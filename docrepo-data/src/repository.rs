use crate::error::DataError;
use crate::model::Model;
use crate::options::FindOptions;
use crate::page::{Page, Pageable};
use bson::Document;
use std::future::Future;

/// Generic async repository contract for one model type.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`.
///
/// Filters are `impl Into<Option<Document>>`: pass `doc! { .. }` or `None`.
/// An absent or empty filter matches every document, except in
/// [`delete_many`](Repository::delete_many) where it is rejected.
///
/// Ids are the 24-character hex form of an `ObjectId`; anything else fails
/// with [`DataError::InvalidIdentity`] before the store is contacted.
pub trait Repository<T>: Send + Sync
where
    T: Model,
{
    /// Insert `model` and write the store-assigned id back into it.
    fn create(&self, model: &mut T) -> impl Future<Output = Result<(), DataError>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = Result<T, DataError>> + Send;

    fn get_all(
        &self,
        filter: impl Into<Option<Document>> + Send,
        options: impl Into<Option<FindOptions>> + Send,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// Merge `fields` into the document and return the updated document.
    ///
    /// Existence is checked first, so an unknown id is `NotFound` and no
    /// write is issued.
    fn update(
        &self,
        id: &str,
        fields: Document,
    ) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Delete by id; `NotFound` when nothing was deleted.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), DataError>> + Send;

    fn count(
        &self,
        filter: impl Into<Option<Document>> + Send,
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// One page of matches plus the total match count (two store reads, not a
    /// snapshot).
    fn find_with_pagination(
        &self,
        filter: impl Into<Option<Document>> + Send,
        pageable: &Pageable,
    ) -> impl Future<Output = Result<Page<T>, DataError>> + Send;

    /// First match in natural order; `NotFound` when nothing matches.
    fn find_one(
        &self,
        filter: impl Into<Option<Document>> + Send,
    ) -> impl Future<Output = Result<T, DataError>> + Send;

    /// Merge `fields` into every match; returns how many documents changed.
    fn update_many(
        &self,
        filter: impl Into<Option<Document>> + Send,
        fields: Document,
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Delete every match; returns how many were deleted. An absent or empty
    /// filter is refused with [`DataError::EmptyFilter`].
    fn delete_many(
        &self,
        filter: impl Into<Option<Document>> + Send,
    ) -> impl Future<Output = Result<u64, DataError>> + Send;
}
