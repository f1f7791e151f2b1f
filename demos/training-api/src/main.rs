use docrepo::prelude::*;
use tracing::{error, info};

mod models;
mod services;

use models::Training;
use services::TrainingService;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match DocrepoConfig::load("dev") {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let mongo = bootstrap(&config).await;
    let service = TrainingService::new(mongo.repository::<Training>());

    if let Err(err) = run(&service).await {
        error!(error = %err, "training-api demo failed");
        std::process::exit(1);
    }
}

async fn run<R: Repository<Training>>(service: &TrainingService<R>) -> Result<(), DataError> {
    let inserted = service.seed().await?;
    info!(inserted, "catalogue ready");

    let page = service.list(&Pageable::default()).await?;
    info!(
        total = page.total_elements,
        pages = page.total_pages,
        "listing trainings"
    );
    for training in &page.content {
        let id = training.id.map(|id| id.to_hex()).unwrap_or_default();
        info!(id = %id, name = %training.name, "training");
    }

    let rust = service.find_by_name("Rust basics").await?;
    info!(description = %rust.description, "found by name");
    Ok(())
}
