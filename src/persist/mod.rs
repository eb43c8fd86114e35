//! Persistence layer - synchronization between cache and durable backend.
//!
//! Two flows operate on the volatile cache through the type codec:
//! 1. **Hydration** (hydrate): startup-only, defaults + persisted snapshot,
//!    then downstream start signals
//! 2. **Flush** (flush): periodic and on-demand batched writes back to the
//!    backend

pub mod backend;
pub mod flush;
pub mod hydrate;

pub use backend::{DurableStore, JsonFileBackend, MemoryBackend, Snapshot};
pub use flush::{FlushConfig, FlushScheduler, FlushStats};
pub use hydrate::{HydrationState, HydrationStats, Hydrator, Subsystem};
