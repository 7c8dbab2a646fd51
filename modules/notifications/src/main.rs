use event_bus::{EventBus, InMemoryBus, NatsBus};
use notifications::config::Config;
use notifications::consumer_tasks::{spawn_notification_consumers, ConsumerOptions};
use notifications::store::{InMemoryNotificationStore, StaticUserDirectory};
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

    let store = Arc::new(InMemoryNotificationStore::new());
    let directory = Arc::new(StaticUserDirectory::new());

    let options = ConsumerOptions {
        concurrency: config.concurrency,
        ..ConsumerOptions::default()
    };

    let mut workers = spawn_notification_consumers(
        bus.clone(),
        store.clone(),
        directory.clone(),
        &config.topics.unified_activity,
        options.clone(),
    );
    workers.extend(spawn_notification_consumers(
        bus,
        store,
        directory,
        &config.topics.friend_request,
        options,
    ));

    tracing::info!(workers = workers.len(), "Notifications module running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down notifications module");
    for worker in workers {
        worker.abort();
    }

    Ok(())
}
