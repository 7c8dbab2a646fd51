use activity_events::TopicConfig;
use std::env;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bus_type: String,
    pub nats_url: String,
    pub topics: TopicConfig,
    pub concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let bus_type = env::var("BUS_TYPE").unwrap_or_else(|_| "inmemory".to_string());

        let nats_url = env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let concurrency: usize = env::var("CONSUMER_CONCURRENCY")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| "CONSUMER_CONCURRENCY must be a positive integer".to_string())?;

        Ok(Config {
            bus_type,
            nats_url,
            topics: TopicConfig::from_env(),
            concurrency,
        })
    }
}
