use crate::error::DataError;
use crate::model::Model;
use crate::options::FindOptions;
use crate::page::{Page, Pageable};
use crate::repository::Repository;
use crate::store::DocumentStore;
use bson::oid::ObjectId;
use bson::Document;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// The generic [`Repository`] implementation.
///
/// Holds one collection handle and nothing else; clones share the handle.
/// Each operation is one or two store calls plus error classification.
///
/// # Example
///
/// ```ignore
/// let repo = DocumentRepository::<User>::new(InMemoryStore::new("users"));
/// let mut user = User::new("Alice", 30);
/// repo.create(&mut user).await?;
/// let id = user.id().unwrap().to_hex();
/// let same = repo.get_by_id(&id).await?;
/// ```
pub struct DocumentRepository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> DocumentRepository<T> {
    pub fn new(store: impl DocumentStore) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn collection_name(&self) -> &str {
        self.store.collection_name()
    }

    /// The underlying collection handle.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn not_found(&self, id: ObjectId) -> DataError {
        DataError::NotFound(format!("{}/{}", self.collection_name(), id.to_hex()))
    }
}

impl<T> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for DocumentRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("collection", &self.store.collection_name())
            .finish()
    }
}

fn parse_id(id: &str) -> Result<ObjectId, DataError> {
    ObjectId::parse_str(id).map_err(|_| DataError::InvalidIdentity(id.to_string()))
}

fn decode<T: Model>(document: Document) -> Result<T, DataError> {
    Ok(bson::from_document(document)?)
}

fn decode_all<T: Model>(documents: Vec<Document>) -> Result<Vec<T>, DataError> {
    documents.into_iter().map(decode::<T>).collect()
}

impl<T: Model> Repository<T> for DocumentRepository<T> {
    async fn create(&self, model: &mut T) -> Result<(), DataError> {
        model.touch_created(bson::DateTime::now());
        let document = bson::to_document(&*model)?;
        let id = self.store.insert(document).await?;
        model.set_id(id);
        debug!(collection = self.collection_name(), id = %id, "document created");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<T, DataError> {
        let id = parse_id(id)?;
        match self.store.find_by_id(id).await? {
            Some(document) => decode(document),
            None => Err(self.not_found(id)),
        }
    }

    async fn get_all(
        &self,
        filter: impl Into<Option<Document>> + Send,
        options: impl Into<Option<FindOptions>> + Send,
    ) -> Result<Vec<T>, DataError> {
        let filter = filter.into().unwrap_or_default();
        let options = options.into().unwrap_or_default();
        let documents = self.store.find_many(filter, options).await?;
        decode_all(documents)
    }

    async fn update(&self, id: &str, fields: Document) -> Result<T, DataError> {
        let id = parse_id(id)?;

        // Read first so an unknown id is reported as NotFound instead of a
        // zero match count.
        if self.store.find_by_id(id).await?.is_none() {
            return Err(self.not_found(id));
        }

        let outcome = self.store.update_by_id(id, fields).await?;
        debug!(
            collection = self.collection_name(),
            id = %id,
            modified = outcome.modified,
            "document updated"
        );

        match self.store.find_by_id(id).await? {
            Some(document) => decode(document),
            // Deleted between the write and the re-read.
            None => Err(self.not_found(id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), DataError> {
        let id = parse_id(id)?;
        match self.store.delete_by_id(id).await? {
            0 => Err(self.not_found(id)),
            _ => {
                debug!(collection = self.collection_name(), id = %id, "document deleted");
                Ok(())
            }
        }
    }

    async fn count(&self, filter: impl Into<Option<Document>> + Send) -> Result<u64, DataError> {
        let filter = filter.into().unwrap_or_default();
        self.store.count(filter).await
    }

    async fn find_with_pagination(
        &self,
        filter: impl Into<Option<Document>> + Send,
        pageable: &Pageable,
    ) -> Result<Page<T>, DataError> {
        let filter = filter.into().unwrap_or_default();
        let options = FindOptions::new()
            .skip(pageable.offset())
            .limit(i64::try_from(pageable.limit).unwrap_or(i64::MAX));

        let documents = self.store.find_many(filter.clone(), options).await?;
        let content = decode_all(documents)?;
        let total = self.store.count(filter).await?;

        Ok(Page::new(content, pageable, total))
    }

    async fn find_one(&self, filter: impl Into<Option<Document>> + Send) -> Result<T, DataError> {
        let filter = filter.into().unwrap_or_default();
        match self.store.find_first(filter.clone()).await? {
            Some(document) => decode(document),
            None => Err(DataError::NotFound(format!(
                "{} matching {filter}",
                self.collection_name()
            ))),
        }
    }

    async fn update_many(
        &self,
        filter: impl Into<Option<Document>> + Send,
        fields: Document,
    ) -> Result<u64, DataError> {
        let filter = filter.into().unwrap_or_default();
        let outcome = self.store.update_many(filter, fields).await?;
        debug!(
            collection = self.collection_name(),
            matched = outcome.matched,
            modified = outcome.modified,
            "documents updated"
        );
        Ok(outcome.modified)
    }

    async fn delete_many(&self, filter: impl Into<Option<Document>> + Send) -> Result<u64, DataError> {
        let filter = match filter.into() {
            Some(filter) if !filter.is_empty() => filter,
            _ => return Err(DataError::EmptyFilter),
        };
        let deleted = self.store.delete_many(filter).await?;
        if deleted > 0 {
            info!(collection = self.collection_name(), deleted, "documents deleted");
        }
        Ok(deleted)
    }
}
