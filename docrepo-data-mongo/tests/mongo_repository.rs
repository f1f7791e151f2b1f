//! End-to-end repository tests against a real `mongo:7` container.
//!
//! Ignored by default: run with `cargo test -- --ignored` on a machine with a
//! Docker daemon.

use docrepo_core::DocrepoConfig;
use docrepo_data_mongo::prelude::*;
use docrepo_data_mongo::try_bootstrap;
use serde::{Deserialize, Serialize};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestModel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    age: i32,
}

impl TestModel {
    fn new(name: &str, age: i32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age,
        }
    }
}

impl Model for TestModel {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

async fn start_mongo(database: &str) -> (ContainerAsync<GenericImage>, MongoConnection) {
    let container = GenericImage::new("mongo", "7")
        .with_exposed_port(ContainerPort::Tcp(27017))
        .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
        .start()
        .await
        .expect("start mongo container");
    let port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("mapped port for 27017");

    let mut config = DocrepoConfig::empty();
    config.set("mongo.uri", format!("mongodb://127.0.0.1:{port}"));
    config.set("mongo.database", database);
    config.set("app.name", "test_app");

    let connection = try_bootstrap(&config).await.expect("connect to mongo");
    (container, connection)
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn crud_round_trip() {
    let (_container, mongo) = start_mongo("crud_db").await;
    let repo = mongo.repository::<TestModel>();
    assert_eq!(repo.collection_name(), "test_models");

    let mut alice = TestModel::new("Alice", 30);
    repo.create(&mut alice).await.unwrap();
    let id = alice.id().unwrap().to_hex();
    assert_eq!(repo.get_by_id(&id).await.unwrap(), alice);

    let updated = repo.update(&id, doc! { "age": 31 }).await.unwrap();
    assert_eq!(updated.age, 31);
    assert_eq!(updated.name, "Alice");

    assert!(repo.get_by_id("invalid").await.unwrap_err().is_invalid_identity());
    assert!(repo
        .update(&ObjectId::new().to_hex(), doc! { "age": 1 })
        .await
        .unwrap_err()
        .is_not_found());

    repo.delete(&id).await.unwrap();
    assert!(repo.delete(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn bulk_operations_and_pagination() {
    let (_container, mongo) = start_mongo("bulk_db").await;
    let repo = mongo.repository::<TestModel>();

    let empty = repo
        .find_with_pagination(doc! {}, &Pageable::new(1, 10))
        .await
        .unwrap();
    assert_eq!(empty.total_elements, 0);
    assert!(empty.content.is_empty());

    for (name, age) in [("Alice", 30), ("Bob", 25), ("Carol", 30)] {
        repo.create(&mut TestModel::new(name, age)).await.unwrap();
    }

    assert_eq!(repo.count(doc! { "name": "Alice" }).await.unwrap(), 1);
    assert_eq!(
        repo.update_many(doc! { "name": "Alice" }, doc! { "age": 32 })
            .await
            .unwrap(),
        1
    );
    assert_eq!(repo.find_one(doc! { "name": "Alice" }).await.unwrap().age, 32);

    let page = repo
        .find_with_pagination(None, &Pageable::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_elements, repo.count(None).await.unwrap());

    let sorted = repo
        .get_all(None, FindOptions::new().sort(doc! { "age": 1 }))
        .await
        .unwrap();
    assert_eq!(sorted[0].name, "Bob");

    assert!(repo.delete_many(doc! {}).await.unwrap_err().is_empty_filter());
    assert_eq!(repo.delete_many(doc! { "age": 30 }).await.unwrap(), 1);

    mongo.collection_for::<TestModel>().drop_collection().await.unwrap();
    assert_eq!(repo.count(None).await.unwrap(), 0);
}
