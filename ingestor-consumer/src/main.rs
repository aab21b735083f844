mod config;

use std::sync::Arc;

use config::WorkerConfig;
use ingestor_core::Processor;
use ingestor_fetcher::ReqwestFetcher;
use ingestor_mongo::MongoRepository;
use ingestor_rabbitmq::Consumer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = WorkerConfig::from_env();

    let repository = Arc::new(MongoRepository::connect(&config.mongo_uri, &config.mongo_db).await?);
    let fetcher = Arc::new(ReqwestFetcher::new(config.fetcher)?);
    let processor = Arc::new(Processor::new(
        repository,
        fetcher,
        config.max_retries,
        config.max_page_source_length,
    ));

    let consumer = Consumer::new(config.consumer, processor);
    let cancel = consumer.cancellation_token();

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        cancel.cancel();
    });

    consumer.run().await?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
