//! Hydration controller - startup population of the volatile cache.
//!
//! Hydration is a two-state machine: `Uninitialized -> Ready` when the
//! durable read succeeds, `Uninitialized -> Failed` when it does not. The
//! failed state is terminal for the process (no automatic retry); downstream
//! subsystems are signalled only on the success path, exactly once, in
//! registration order.
//!
//! The durable read failing is handled fail-closed on purpose: the cache
//! still holds the step-1 defaults, but a half-configured process must not
//! start serving as if it were configured.

use crate::error::StoreError;
use crate::persist::backend::DurableStore;
use crate::store::Store;
use crate::types::{now_ms, SettingKey};
use log::{error, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle state of the hydration controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrationState {
    /// Store not yet populated; no consumer may read.
    Uninitialized,
    /// Defaults and persisted data applied; downstream started.
    Ready,
    /// Durable read failed; terminal absent a process restart.
    Failed,
}

/// A downstream feature started exactly once after successful hydration.
///
/// Start is an opaque no-argument trigger; the controller does not inspect
/// what the subsystem does with it.
pub trait Subsystem: Send + Sync {
    fn name(&self) -> &str;
    fn start(&self);
}

/// Statistics from one hydration run.
#[derive(Debug, Clone)]
pub struct HydrationStats {
    /// Persisted entries applied to the cache.
    pub keys_applied: usize,
    /// Recognized keys whose persisted value was corrupt and fell back to
    /// the built-in default.
    pub keys_defaulted: usize,
    /// Duration of the hydration run in milliseconds.
    pub duration_ms: u64,
}

/// Startup hydrator.
///
/// Owns the fixed, ordered list of downstream subsystems and the backend
/// handle; shares the store with every consumer.
pub struct Hydrator {
    store: Arc<Store>,
    backend: Arc<dyn DurableStore>,
    subsystems: Vec<Arc<dyn Subsystem>>,
    state: RwLock<HydrationState>,
}

impl Hydrator {
    /// Creates a hydrator. `subsystems` are started in the order given.
    pub fn new(
        store: Arc<Store>,
        backend: Arc<dyn DurableStore>,
        subsystems: Vec<Arc<dyn Subsystem>>,
    ) -> Self {
        Self {
            store,
            backend,
            subsystems,
            state: RwLock::new(HydrationState::Uninitialized),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HydrationState {
        *self.state.read()
    }

    /// Runs the startup sequence: seed defaults, read the full persisted
    /// snapshot, apply it through the codec, signal downstream.
    ///
    /// Per-key decode failures are isolated: the offending key is logged and
    /// re-seeded with its default, and the remaining keys still load. Only a
    /// failure of the durable read itself halts hydration.
    pub async fn hydrate(&self) -> Result<HydrationStats, StoreError> {
        if self.state() != HydrationState::Uninitialized {
            return Err(StoreError::AlreadyHydrated);
        }

        let start = now_ms();
        self.store.seed_defaults();

        let snapshot = match self.backend.read(None).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("hydration read failed, downstream will not start: {}", e);
                *self.state.write() = HydrationState::Failed;
                return Err(StoreError::ReadFailure(e));
            }
        };

        let mut keys_applied = 0;
        let mut keys_defaulted = 0;
        for (key, value) in snapshot {
            match self.store.set(&key, value) {
                Ok(()) => keys_applied += 1,
                Err(e) => {
                    warn!("discarding corrupt persisted value: {}", e);
                    if let Some(known) = SettingKey::from_wire(&key) {
                        self.store.reset_to_default(known);
                    }
                    keys_defaulted += 1;
                }
            }
        }

        *self.state.write() = HydrationState::Ready;

        for subsystem in &self.subsystems {
            info!("starting subsystem '{}'", subsystem.name());
            subsystem.start();
        }

        let stats = HydrationStats {
            keys_applied,
            keys_defaulted,
            duration_ms: now_ms() - start,
        };
        info!(
            "hydration complete: {} persisted keys applied, {} defaulted, {} subsystems started in {}ms",
            stats.keys_applied,
            stats.keys_defaulted,
            self.subsystems.len(),
            stats.duration_ms
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::backend::MemoryBackend;
    use crate::store::StoreConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSubsystem {
        name: &'static str,
        starts: AtomicUsize,
    }

    impl CountingSubsystem {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                starts: AtomicUsize::new(0),
            })
        }
    }

    impl Subsystem for CountingSubsystem {
        fn name(&self) -> &str {
            self.name
        }

        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_hydrate_empty_backend_seeds_defaults_and_starts_once() {
        let store = Arc::new(Store::new(StoreConfig::default()));
        let backend = Arc::new(MemoryBackend::new());
        let engine = CountingSubsystem::new("rule-engine");

        let hydrator = Hydrator::new(store.clone(), backend, vec![engine.clone()]);
        let stats = hydrator.hydrate().await.unwrap();

        assert_eq!(stats.keys_applied, 0);
        assert_eq!(store.len(), SettingKey::ALL.len());
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
        assert_eq!(hydrator.state(), HydrationState::Ready);
    }

    #[tokio::test]
    async fn test_second_hydrate_is_rejected() {
        let store = Arc::new(Store::new(StoreConfig::default()));
        let backend = Arc::new(MemoryBackend::new());
        let engine = CountingSubsystem::new("rule-engine");

        let hydrator = Hydrator::new(store, backend, vec![engine.clone()]);
        hydrator.hydrate().await.unwrap();

        let err = hydrator.hydrate().await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyHydrated));
        // Start signal still fired exactly once.
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
    }
}
