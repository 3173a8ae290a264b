pub mod config;
pub mod db;
pub mod device;
pub mod error;
pub mod ingest;
pub mod presence;
pub mod probe;
pub mod proximity;
pub mod web;

use std::sync::Arc;

use clap::Parser;
use tokio::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;
use ingest::Radar;

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Opening {:?} store in {}",
        config.store,
        config.data_dir.display()
    );
    let store = db::open_store(config.store, config.data_dir.clone())
        .map_err(|e| io::Error::other(e.to_string()))?;
    let radar = Arc::new(Radar::new(store));

    match web::start(&config, radar).await {
        Ok(result) => result,
        Err(e) => Err(io::Error::other(format!("Web server task failed: {}", e))),
    }
}
