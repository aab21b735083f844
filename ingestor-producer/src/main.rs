mod api;
mod config;

use std::sync::Arc;

use api::AppState;
use config::{ProducerConfig, PublisherBackend};
use ingestor_core::InMemoryPublisher;
use ingestor_mongo::MongoRepository;
use ingestor_rabbitmq::BrokerPublisher;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = ProducerConfig::from_env();

    let repository = MongoRepository::connect(&config.mongo_uri, &config.mongo_db).await?;

    let publisher: Arc<dyn ingestor_core::MessagePublisher> = match config.publisher_backend {
        PublisherBackend::InMemory => Arc::new(InMemoryPublisher::new(config.publisher.queue_max_length as usize)),
        PublisherBackend::Broker => BrokerPublisher::connect(config.publisher).await?,
    };

    let state = Arc::new(AppState { publisher, repository: Arc::new(repository) });
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "producer listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("producer received shutdown signal");
}
