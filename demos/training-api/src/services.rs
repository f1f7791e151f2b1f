use crate::models::Training;
use docrepo::{doc, DataError, Page, Pageable, Repository};
use tracing::info;

/// Training catalogue operations, generic over the repository so the same
/// code runs against MongoDB and the in-memory store.
pub struct TrainingService<R> {
    repo: R,
}

impl<R: Repository<Training>> TrainingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Insert the starter catalogue unless trainings already exist.
    /// Returns how many were inserted.
    pub async fn seed(&self) -> Result<usize, DataError> {
        if self.repo.count(None).await? > 0 {
            return Ok(0);
        }
        let mut catalogue = [
            Training::new("Rust basics", "Ownership, borrowing and lifetimes", "/img/rust.png"),
            Training::new("Async Rust", "Futures, tasks and tokio", "/img/async.png"),
            Training::new("MongoDB", "Documents, filters and indexes", "/img/mongo.png"),
        ];
        for training in catalogue.iter_mut() {
            self.repo.create(training).await?;
        }
        info!(count = catalogue.len(), "seeded trainings");
        Ok(catalogue.len())
    }

    pub async fn list(&self, pageable: &Pageable) -> Result<Page<Training>, DataError> {
        self.repo.find_with_pagination(None, pageable).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Training, DataError> {
        self.repo.find_one(doc! { "name": name }).await
    }
}
