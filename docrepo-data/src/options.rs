use bson::Document;

/// Store options for multi-document reads, passed through to the store as-is.
///
/// ```ignore
/// let opts = FindOptions::new().sort(doc! { "age": -1 }).limit(5);
/// let oldest = repo.get_all(doc! {}, opts).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// `{ field: 1 | -1, ... }`
    pub sort: Option<Document>,
    /// `{ field: 1, ... }` (inclusion) or `{ field: 0, ... }` (exclusion)
    pub projection: Option<Document>,
    pub skip: Option<u64>,
    /// Maximum number of documents; `0` means no limit.
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
