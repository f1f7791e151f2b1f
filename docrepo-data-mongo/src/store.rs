use crate::error::MongoErrorExt;
use bson::oid::ObjectId;
use bson::{doc, Document};
use docrepo_data::{DataError, DocumentStore, FindOptions, StoreFuture, UpdateOutcome};
use futures_util::TryStreamExt;
use mongodb::Collection;

/// [`DocumentStore`] over one MongoDB collection.
///
/// Filters are sent as-is, updates are wrapped in `$set`.
#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Drop the whole collection. Mostly useful to reset state in tests.
    pub async fn drop_collection(&self) -> Result<(), DataError> {
        self.collection
            .drop()
            .await
            .map_err(MongoErrorExt::into_data_error)
    }
}

fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

fn driver_options(options: FindOptions) -> mongodb::options::FindOptions {
    let mut find = mongodb::options::FindOptions::default();
    find.sort = options.sort;
    find.projection = options.projection;
    find.skip = options.skip;
    // The driver already treats 0 as "no limit"; keep it out of the command.
    find.limit = options.limit.filter(|limit| *limit != 0);
    find
}

impl DocumentStore for MongoStore {
    fn collection_name(&self) -> &str {
        self.collection.name()
    }

    fn find_by_id(&self, id: ObjectId) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            self.collection
                .find_one(by_id(id))
                .await
                .map_err(MongoErrorExt::into_data_error)
        })
    }

    fn find_many(&self, filter: Document, options: FindOptions) -> StoreFuture<'_, Vec<Document>> {
        Box::pin(async move {
            let cursor = self
                .collection
                .find(filter)
                .with_options(driver_options(options))
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            cursor
                .try_collect::<Vec<Document>>()
                .await
                .map_err(MongoErrorExt::into_data_error)
        })
    }

    fn find_first(&self, filter: Document) -> StoreFuture<'_, Option<Document>> {
        Box::pin(async move {
            self.collection
                .find_one(filter)
                .await
                .map_err(MongoErrorExt::into_data_error)
        })
    }

    fn insert(&self, document: Document) -> StoreFuture<'_, ObjectId> {
        Box::pin(async move {
            let result = self
                .collection
                .insert_one(document)
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            match result.inserted_id.as_object_id() {
                Some(id) => Ok(id),
                None => Err(DataError::Store(
                    format!("inserted _id is not an ObjectId: {}", result.inserted_id).into(),
                )),
            }
        })
    }

    fn update_by_id(&self, id: ObjectId, fields: Document) -> StoreFuture<'_, UpdateOutcome> {
        Box::pin(async move {
            let result = self
                .collection
                .update_one(by_id(id), doc! { "$set": fields })
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            Ok(UpdateOutcome {
                matched: result.matched_count,
                modified: result.modified_count,
            })
        })
    }

    fn update_many(&self, filter: Document, fields: Document) -> StoreFuture<'_, UpdateOutcome> {
        Box::pin(async move {
            let result = self
                .collection
                .update_many(filter, doc! { "$set": fields })
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            Ok(UpdateOutcome {
                matched: result.matched_count,
                modified: result.modified_count,
            })
        })
    }

    fn delete_by_id(&self, id: ObjectId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = self
                .collection
                .delete_one(by_id(id))
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            Ok(result.deleted_count)
        })
    }

    fn delete_many(&self, filter: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = self
                .collection
                .delete_many(filter)
                .await
                .map_err(MongoErrorExt::into_data_error)?;
            Ok(result.deleted_count)
        })
    }

    fn count(&self, filter: Document) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            self.collection
                .count_documents(filter)
                .await
                .map_err(MongoErrorExt::into_data_error)
        })
    }
}
