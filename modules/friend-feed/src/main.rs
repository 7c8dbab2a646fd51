use event_bus::{EventBus, InMemoryBus, NatsBus};
use friend_feed::config::Config;
use friend_feed::consumer_tasks::{spawn_feed_consumers, ConsumerOptions};
use friend_feed::store::InMemoryFeedStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let bus: Arc<dyn EventBus> = match config.bus_type.as_str() {
        "nats" => {
            let client = async_nats::connect(&config.nats_url).await?;
            tracing::info!(url = %config.nats_url, "Connected to NATS");
            Arc::new(NatsBus::new(client))
        }
        _ => {
            tracing::info!("Using in-memory event bus");
            Arc::new(InMemoryBus::new())
        }
    };

    let store = Arc::new(InMemoryFeedStore::new());

    let options = ConsumerOptions {
        concurrency: config.concurrency,
        ..ConsumerOptions::default()
    };

    let mut workers = spawn_feed_consumers(
        bus.clone(),
        store.clone(),
        &config.topics.unified_activity,
        options.clone(),
    );
    workers.extend(spawn_feed_consumers(
        bus,
        store,
        &config.topics.friend_activity,
        options,
    ));

    tracing::info!(workers = workers.len(), "Friend-feed module running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down friend-feed module");
    for worker in workers {
        worker.abort();
    }

    Ok(())
}
