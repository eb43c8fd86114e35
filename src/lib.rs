//! # settings-store
//!
//! Two-tier key/value persistence for an extension's runtime configuration
//! and operational state: a volatile in-memory cache serves every synchronous
//! read and write, while periodic and on-demand snapshots keep an
//! asynchronous durable backend in sync.
//!
//! # Architecture
//! - **Store**: the in-memory cache, single source of truth during process
//!   life, shared by reference with every consumer
//! - **Type codec**: per-key marshalling between memory and wire form
//!   (structured JSON, comma-joined lists, migrated URLs, passthrough)
//! - **Hydrator**: startup sequence - seed defaults, apply the persisted
//!   snapshot, signal downstream subsystems exactly once
//! - **FlushScheduler**: 60-second batched writes back to the backend
//! - **DurableStore**: the opaque async backend seam (in-memory and
//!   JSON-file implementations ship with the crate)
//!
//! # Lifecycle
//! `create -> hydrate -> serve -> flush* -> drop`: the cache is lost at
//! process termination; the persisted snapshot is the only surviving state.
//! A crash between flushes loses at most one interval's worth of mutations.
//!
//! # Example
//! ```rust,no_run
//! use settings_store::{
//!     FlushConfig, FlushScheduler, Hydrator, MemoryBackend, Store, StoreConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), settings_store::StoreError> {
//! let store = Arc::new(Store::new(StoreConfig::default()));
//! let backend = Arc::new(MemoryBackend::new());
//!
//! let hydrator = Hydrator::new(store.clone(), backend.clone(), vec![]);
//! hydrator.hydrate().await?;
//!
//! let scheduler = Arc::new(FlushScheduler::new(
//!     store.clone(),
//!     backend,
//!     FlushConfig::default(),
//! ));
//! tokio::spawn(scheduler.start());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod migrate;
pub mod persist;
pub mod store;
pub mod types;

pub use codec::CodecClass;
pub use error::{BackendError, CodecError, StoreError};
pub use persist::{
    DurableStore, FlushConfig, FlushScheduler, FlushStats, HydrationState, HydrationStats,
    Hydrator, JsonFileBackend, MemoryBackend, Snapshot, Subsystem,
};
pub use store::{Store, StoreConfig};
pub use types::{Platform, SettingKey, SettingValue, StatusCode};
