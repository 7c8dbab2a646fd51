//! Bounded publish worker pool
//!
//! The producing side runs on a small fixed pool of publish workers,
//! separate from the request-handling tasks, so event publication never
//! blocks the response path. Producers enqueue a job and return
//! immediately; workers drain the queue and publish to the bus, logging
//! success or failure. Nothing is propagated back to the producer.
//!
//! A full queue drops the job with a warning: losing a notification or
//! audit entry is an accepted operational failure, failing the business
//! operation is not.

use event_bus::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Sizing and shutdown knobs for the publish pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of publish worker tasks
    pub workers: usize,
    /// Bounded intake queue length
    pub queue_capacity: usize,
    /// How long `shutdown` waits for queued jobs to drain before aborting
    pub shutdown_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 100,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// One pending publish
#[derive(Debug)]
pub(crate) struct PublishJob {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
    pub event_id: Uuid,
    pub event_kind: &'static str,
}

/// Cloneable intake for producers
#[derive(Clone)]
pub struct PublishHandle {
    tx: mpsc::Sender<PublishJob>,
}

impl PublishHandle {
    /// Enqueue a job without waiting. Returns immediately in every case.
    pub(crate) fn submit(&self, job: PublishJob) {
        match self.tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(
                    event_kind = job.event_kind,
                    event_id = %job.event_id,
                    topic = %job.topic,
                    "Publish queue full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::error!(
                    event_kind = job.event_kind,
                    event_id = %job.event_id,
                    topic = %job.topic,
                    "Publish pool is shut down, dropping event"
                );
            }
        }
    }
}

/// The pool itself; owned by the service bootstrap, which is responsible
/// for calling [`PublishPool::shutdown`] on exit
pub struct PublishPool {
    tx: mpsc::Sender<PublishJob>,
    workers: Vec<JoinHandle<()>>,
    shutdown_grace: Duration,
}

impl PublishPool {
    /// Start the worker tasks against the given bus
    pub fn start(config: PoolConfig, bus: Arc<dyn EventBus>) -> Self {
        let (tx, rx) = mpsc::channel::<PublishJob>(config.queue_capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                let rx = rx.clone();
                let bus = bus.clone();
                tokio::spawn(async move {
                    loop {
                        let job = { rx.lock().await.recv().await };
                        let Some(job) = job else {
                            // Intake closed and drained; worker exits
                            break;
                        };

                        match bus.publish(&job.topic, &job.key, job.payload).await {
                            Ok(()) => {
                                tracing::debug!(
                                    worker_id,
                                    event_kind = job.event_kind,
                                    event_id = %job.event_id,
                                    topic = %job.topic,
                                    partition_key = %job.key,
                                    "Event published"
                                );
                            }
                            Err(e) => {
                                // Fire-and-forget contract: log, never rethrow
                                tracing::error!(
                                    worker_id,
                                    event_kind = job.event_kind,
                                    event_id = %job.event_id,
                                    topic = %job.topic,
                                    partition_key = %job.key,
                                    error = %e,
                                    "Failed to publish event"
                                );
                            }
                        }
                    }
                })
            })
            .collect();

        Self {
            tx,
            workers,
            shutdown_grace: config.shutdown_grace,
        }
    }

    /// Intake handle for producers
    pub fn handle(&self) -> PublishHandle {
        PublishHandle {
            tx: self.tx.clone(),
        }
    }

    /// Stop accepting jobs, let queued publishes drain within the grace
    /// window, then abort whatever is still in flight
    pub async fn shutdown(self) {
        drop(self.tx);

        let deadline = tokio::time::Instant::now() + self.shutdown_grace;
        for mut worker in self.workers {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if tokio::time::timeout(remaining, &mut worker).await.is_err() {
                worker.abort();
                tracing::warn!("Publish worker did not drain within grace period, aborting");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::{EventBus, InMemoryBus};
    use futures::StreamExt;

    fn job(topic: &str, key: &str, payload: &[u8]) -> PublishJob {
        PublishJob {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
            event_id: Uuid::new_v4(),
            event_kind: "test",
        }
    }

    #[tokio::test]
    async fn test_pool_publishes_submitted_jobs() {
        let bus = Arc::new(InMemoryBus::new());
        let mut stream = bus.subscribe("audit-events", "audit-group").await.unwrap();

        let pool = PublishPool::start(PoolConfig::default(), bus.clone());
        pool.handle().submit(job("audit-events", "7", b"payload"));

        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.payload, b"payload".to_vec());
        assert_eq!(msg.partition_key.as_deref(), Some("7"));

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_jobs() {
        let bus = Arc::new(InMemoryBus::new());
        let mut stream = bus.subscribe("audit-events", "audit-group").await.unwrap();

        let pool = PublishPool::start(
            PoolConfig {
                workers: 1,
                queue_capacity: 50,
                shutdown_grace: Duration::from_secs(5),
            },
            bus.clone(),
        );

        let handle = pool.handle();
        for i in 0..10u8 {
            handle.submit(job("audit-events", "7", &[i]));
        }
        pool.shutdown().await;

        for i in 0..10u8 {
            let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
                .await
                .expect("timeout")
                .expect("stream ended");
            assert_eq!(msg.payload, vec![i]);
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_blocking() {
        // No workers draining: a zero-worker pool is coerced to one worker,
        // so block it with a bus that never completes
        struct StuckBus;
        #[async_trait::async_trait]
        impl EventBus for StuckBus {
            async fn publish(
                &self,
                _topic: &str,
                _key: &str,
                _payload: Vec<u8>,
            ) -> event_bus::BusResult<()> {
                futures::future::pending::<()>().await;
                Ok(())
            }
            async fn subscribe(
                &self,
                _topic: &str,
                _group: &str,
            ) -> event_bus::BusResult<futures::stream::BoxStream<'static, event_bus::BusMessage>>
            {
                unimplemented!("not used")
            }
        }

        let pool = PublishPool::start(
            PoolConfig {
                workers: 1,
                queue_capacity: 2,
                shutdown_grace: Duration::from_millis(50),
            },
            Arc::new(StuckBus),
        );

        let handle = pool.handle();
        let start = std::time::Instant::now();
        for i in 0..20u8 {
            handle.submit(job("audit-events", "7", &[i]));
        }
        // Overflow is dropped, not awaited
        assert!(start.elapsed() < Duration::from_millis(100));

        pool.shutdown().await;
    }
}
