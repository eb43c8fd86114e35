//! Flush scheduler - periodic persistence of the volatile cache.
//!
//! Every interval the entire cache is encoded through the type codec and
//! submitted to the durable backend as one batched write. The write is
//! fire-and-forget from the cache's point of view: a failure is logged and
//! dropped, the in-memory state stays correct, and the data-loss window on
//! abrupt termination is bounded by the interval length.
//!
//! An on-demand path (`flush_now`) exists for callers that want a snapshot
//! taken outside the timer, e.g. before a deliberate shutdown.

use crate::error::StoreError;
use crate::persist::backend::DurableStore;
use crate::store::Store;
use crate::types::now_ms;
use log::{error, info};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Configuration for the flush scheduler.
#[derive(Debug, Clone)]
pub struct FlushConfig {
    /// Interval between flushes.
    pub interval: Duration,
    /// Whether the scheduler is enabled.
    pub enabled: bool,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            // One minute bounds the data-loss window while keeping the
            // backend write rate negligible.
            interval: Duration::from_secs(60),
            enabled: true,
        }
    }
}

/// Statistics from one flush operation.
#[derive(Debug, Clone)]
pub struct FlushStats {
    /// Number of entries written.
    pub keys_written: usize,
    /// Duration of the flush in milliseconds.
    pub duration_ms: u64,
    /// Timestamp of the flush.
    pub timestamp: u64,
}

/// Periodic flusher for the settings store.
///
/// Spawned as a background task during startup, after hydration succeeds.
/// The timer is never cancelled or rearmed with a different period.
pub struct FlushScheduler {
    store: Arc<Store>,
    backend: Arc<dyn DurableStore>,
    config: FlushConfig,
    /// Timestamp of the last successful flush.
    last_flush_at: RwLock<u64>,
}

impl FlushScheduler {
    pub fn new(store: Arc<Store>, backend: Arc<dyn DurableStore>, config: FlushConfig) -> Self {
        Self {
            store,
            backend,
            config,
            last_flush_at: RwLock::new(now_ms()),
        }
    }

    /// Milliseconds-since-epoch of the last successful flush, or the
    /// construction time if none has completed yet.
    pub fn last_flush(&self) -> u64 {
        *self.last_flush_at.read()
    }

    /// Runs the flush loop. Spawn as a tokio task; runs for the life of the
    /// process. Returns immediately if disabled in config.
    pub async fn start(self: Arc<Self>) {
        if !self.config.enabled {
            info!("periodic flush is disabled, skipping");
            return;
        }

        info!(
            "starting periodic flush with {}-second interval",
            self.config.interval.as_secs()
        );

        let mut ticker = interval(self.config.interval);
        // The first tick of tokio's interval fires immediately; consume it
        // so the first real flush lands one full interval after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self.flush_now().await {
                Ok(stats) => {
                    info!(
                        "flushed {} settings to durable storage in {}ms",
                        stats.keys_written, stats.duration_ms
                    );
                }
                Err(e) => {
                    // Cache stays correct in memory; next tick retries the
                    // full snapshot anyway.
                    error!("periodic flush failed: {}", e);
                }
            }
        }
    }

    /// Encodes the whole cache and writes one batched snapshot immediately.
    pub async fn flush_now(&self) -> Result<FlushStats, StoreError> {
        let start = now_ms();

        let snapshot = self.store.encode_snapshot();
        let keys_written = snapshot.len();

        self.backend
            .write(snapshot)
            .await
            .map_err(StoreError::WriteFailure)?;

        *self.last_flush_at.write() = now_ms();

        Ok(FlushStats {
            keys_written,
            duration_ms: now_ms() - start,
            timestamp: now_ms(),
        })
    }
}
