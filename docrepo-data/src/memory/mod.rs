//! In-process [`DocumentStore`] for tests and prototyping.
//!
//! Supports the query subset repositories actually send: implicit equality,
//! `$eq $ne $gt $gte $lt $lte $in $nin $exists $not`, `$and $or $nor`,
//! dotted paths and array membership. Updates are `$set` merges. Anything
//! outside that subset fails with [`MemoryStoreError`] instead of silently
//! matching nothing.

mod compare;
mod filter;
mod update;

use crate::crud::DocumentRepository;
use crate::error::DataError;
use crate::model::Model;
use crate::options::FindOptions;
use crate::store::{DocumentStore, StoreFuture, UpdateOutcome};
use bson::oid::ObjectId;
use bson::{Bson, Document};
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Failures specific to the in-memory store. Surfaced as
/// [`DataError::Store`].
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryStoreError {
    UnsupportedOperator(String),
    InvalidOperand { op: String, reason: &'static str },
    EmptyUpdate,
    DuplicateKey(ObjectId),
    ImmutableField(String),
    PathConflict(String),
    UnsupportedProjection(String),
    /// `_id` was present but is not an ObjectId.
    UnsupportedId(String),
}

impl std::fmt::Display for MemoryStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryStoreError::UnsupportedOperator(op) => write!(f, "unsupported operator '{op}'"),
            MemoryStoreError::InvalidOperand { op, reason } => {
                write!(f, "invalid operand for '{op}': {reason}")
            }
            MemoryStoreError::EmptyUpdate => write!(f, "update document must not be empty"),
            MemoryStoreError::DuplicateKey(id) => write!(f, "duplicate key: _id {id}"),
            MemoryStoreError::ImmutableField(field) => {
                write!(f, "field '{field}' is immutable")
            }
            MemoryStoreError::PathConflict(path) => {
                write!(f, "cannot set '{path}': path crosses a non-document value")
            }
            MemoryStoreError::UnsupportedProjection(reason) => {
                write!(f, "unsupported projection: {reason}")
            }
            MemoryStoreError::UnsupportedId(kind) => {
                write!(f, "_id must be an ObjectId, got {kind}")
            }
        }
    }
}

impl std::error::Error for MemoryStoreError {}

impl From<MemoryStoreError> for DataError {
    fn from(err: MemoryStoreError) -> Self {
        DataError::store(err)
    }
}

/// One collection held in memory. Clones share the same documents.
///
/// Natural order is insertion order.
#[derive(Clone)]
pub struct InMemoryStore {
    name: Arc<str>,
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Copy of every stored document, in natural order.
    pub async fn snapshot(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn id_of(document: &Document) -> Option<ObjectId> {
    match document.get("_id") {
        Some(Bson::ObjectId(id)) => Some(*id),
        _ => None,
    }
}

/// First value at a dotted path, descending through documents only.
fn field_at<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = document;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let value = current.get(part)?;
        if parts.peek().is_none() {
            return Some(value);
        }
        match value {
            Bson::Document(inner) => current = inner,
            _ => return None,
        }
    }
    None
}

fn sort_documents(documents: &mut [Document], sort: &Document) -> Result<(), MemoryStoreError> {
    let mut keys = Vec::with_capacity(sort.len());
    for (path, direction) in sort {
        let ascending = match direction {
            Bson::Int32(1) | Bson::Int64(1) => true,
            Bson::Int32(-1) | Bson::Int64(-1) => false,
            Bson::Double(d) if *d == 1.0 => true,
            Bson::Double(d) if *d == -1.0 => false,
            _ => {
                return Err(MemoryStoreError::InvalidOperand {
                    op: format!("sort.{path}"),
                    reason: "direction must be 1 or -1",
                })
            }
        };
        keys.push((path.as_str(), ascending));
    }

    // `sort_by` is stable, so ties keep natural order.
    documents.sort_by(|a, b| {
        for (path, ascending) in &keys {
            let ord = compare::sort_order(field_at(a, path), field_at(b, path));
            let ord = if *ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn include_flag(value: &Bson) -> Option<bool> {
    match value {
        Bson::Boolean(b) => Some(*b),
        Bson::Int32(i) => Some(*i != 0),
        Bson::Int64(i) => Some(*i != 0),
        Bson::Double(d) => Some(*d != 0.0),
        _ => None,
    }
}

/// Top-level inclusion or exclusion projection. `_id` is kept unless
/// excluded explicitly.
fn project(document: Document, projection: &Document) -> Result<Document, MemoryStoreError> {
    let mut include_id = true;
    let mut fields = Vec::new();
    let mut mode: Option<bool> = None;

    for (key, value) in projection {
        if key.contains('.') || key.starts_with('$') {
            return Err(MemoryStoreError::UnsupportedProjection(format!(
                "field '{key}' must be a top-level name"
            )));
        }
        let Some(include) = include_flag(value) else {
            return Err(MemoryStoreError::UnsupportedProjection(format!(
                "value for '{key}' must be a boolean or number"
            )));
        };
        if key == "_id" {
            include_id = include;
            continue;
        }
        match mode {
            Some(m) if m != include => {
                return Err(MemoryStoreError::UnsupportedProjection(
                    "cannot mix inclusion and exclusion".to_string(),
                ))
            }
            _ => mode = Some(include),
        }
        fields.push(key.as_str());
    }

    let projected = document
        .into_iter()
        .filter(|(key, _)| {
            if key == "_id" {
                return include_id;
            }
            match mode {
                Some(true) => fields.contains(&key.as_str()),
                Some(false) => !fields.contains(&key.as_str()),
                None => true,
            }
        })
        .collect();
    Ok(projected)
}

impl DocumentStore for InMemoryStore {
    fn collection_name(&self) -> &str {
        &self.name
    }

    fn find_by_id(&self, id: ObjectId) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            let documents = self.documents.read().await;
            Ok(documents.iter().find(|d| id_of(d) == Some(id)).cloned())
        })
    }

    fn find_many(&self, filter: Document, options: FindOptions) -> StoreFuture<'_, Vec<Document>> {
        Box::pin(async move {
            let predicate = filter::compile(&filter)?;
            let mut matched: Vec<Document> = {
                let documents = self.documents.read().await;
                documents
                    .iter()
                    .filter(|d| predicate.matches(d))
                    .cloned()
                    .collect()
            };

            if let Some(sort) = &options.sort {
                sort_documents(&mut matched, sort)?;
            }

            let skip = usize::try_from(options.skip.unwrap_or(0)).unwrap_or(usize::MAX);
            // Zero means no limit; a negative limit is a batch size and
            // caps the result like a positive one.
            let limit = match options.limit.map(i64::unsigned_abs) {
                None | Some(0) => usize::MAX,
                Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            };

            let found: Result<Vec<Document>, DataError> = matched
                .into_iter()
                .skip(skip)
                .take(limit)
                .map(|d| match &options.projection {
                    Some(projection) => project(d, projection).map_err(DataError::from),
                    None => Ok(d),
                })
                .collect();
            found
        })
    }

    fn find_first(&self, filter: Document) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            let predicate = filter::compile(&filter)?;
            let documents = self.documents.read().await;
            Ok(documents.iter().find(|d| predicate.matches(d)).cloned())
        })
    }

    fn insert(&self, mut document: Document) -> StoreFuture<'_, ObjectId> {
        Box::pin(async move {
            let id = match document.remove("_id") {
                None | Some(Bson::Null) => ObjectId::new(),
                Some(Bson::ObjectId(id)) => id,
                Some(other) => {
                    let kind = format!("{:?}", other.element_type());
                    return Err(DataError::from(MemoryStoreError::UnsupportedId(kind)));
                }
            };

            let mut stored = Document::new();
            stored.insert("_id", id);
            for (key, value) in document {
                stored.insert(key, value);
            }

            let mut documents = self.documents.write().await;
            if documents.iter().any(|d| id_of(d) == Some(id)) {
                return Err(DataError::from(MemoryStoreError::DuplicateKey(id)));
            }
            documents.push(stored);
            Ok(id)
        })
    }

    fn update_by_id(&self, id: ObjectId, fields: Document) -> StoreFuture<'_, UpdateOutcome> {
        Box::pin(async move {
            update::check_fields(&fields)?;
            let mut documents = self.documents.write().await;
            let Some(document) = documents.iter_mut().find(|d| id_of(d) == Some(id)) else {
                return Ok(UpdateOutcome::default());
            };
            let changed = update::apply_set(document, &fields)?;
            Ok(UpdateOutcome {
                matched: 1,
                modified: u64::from(changed),
            })
        })
    }

    fn update_many(&self, filter: Document, fields: Document) -> StoreFuture<'_, UpdateOutcome> {
        Box::pin(async move {
            update::check_fields(&fields)?;
            let predicate = filter::compile(&filter)?;
            let mut documents = self.documents.write().await;

            // Work on a copy so a failure half-way leaves the collection as it was.
            let mut staged = documents.clone();
            let mut outcome = UpdateOutcome::default();
            for document in staged.iter_mut().filter(|d| predicate.matches(d)) {
                outcome.matched += 1;
                if update::apply_set(document, &fields)? {
                    outcome.modified += 1;
                }
            }
            if outcome.modified > 0 {
                *documents = staged;
            }
            Ok(outcome)
        })
    }

    fn delete_by_id(&self, id: ObjectId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut documents = self.documents.write().await;
            match documents.iter().position(|d| id_of(d) == Some(id)) {
                Some(index) => {
                    documents.remove(index);
                    Ok(1)
                }
                None => Ok(0),
            }
        })
    }

    fn delete_many(&self, filter: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let predicate = filter::compile(&filter)?;
            let mut documents = self.documents.write().await;
            let before = documents.len();
            documents.retain(|d| !predicate.matches(d));
            Ok((before - documents.len()) as u64)
        })
    }

    fn count(&self, filter: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let predicate = filter::compile(&filter)?;
            let documents = self.documents.read().await;
            Ok(documents.iter().filter(|d| predicate.matches(d)).count() as u64)
        })
    }
}

/// A set of named [`InMemoryStore`] collections, the in-memory counterpart of
/// a database handle. Clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    collections: Arc<DashMap<String, InMemoryStore>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the named collection, created on first use.
    pub fn collection(&self, name: &str) -> InMemoryStore {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| InMemoryStore::new(name))
            .clone()
    }

    pub fn collection_for<T: Model>(&self) -> InMemoryStore {
        self.collection(&T::collection_name())
    }

    /// Repository over `T`'s own collection.
    pub fn repository<T: Model>(&self) -> DocumentRepository<T> {
        DocumentRepository::new(self.collection_for::<T>())
    }

    /// Repository over an explicitly named collection.
    pub fn repository_named<T: Model>(&self, name: &str) -> DocumentRepository<T> {
        DocumentRepository::new(self.collection(name))
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Remove a collection and its documents. Handles obtained earlier see an
    /// empty collection afterwards. Returns whether the collection existed.
    pub async fn drop_collection(&self, name: &str) -> bool {
        match self.collections.remove(name) {
            Some((_, store)) => {
                store.clear().await;
                tracing::debug!(collection = name, "collection dropped");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("collections", &self.collection_names())
            .finish()
    }
}
