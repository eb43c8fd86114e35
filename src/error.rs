//! Error taxonomy for the persistence layer.
//!
//! Three failure families matter operationally:
//! - read failures halt hydration (fail-closed, no downstream start),
//! - parse failures are isolated per key (the key falls back to its default),
//! - write failures are logged and dropped (bounded data-loss window).

use thiserror::Error;

/// Failures originating inside a durable backend implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored snapshot exists but cannot be understood.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// The backend is reachable but refused the operation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A per-key decode failure in the type codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A key whose wire form must be text carried something else.
    #[error("key '{key}' expected a text wire value, got {found}")]
    NotText { key: String, found: &'static str },

    /// A structured-JSON key carried text that does not parse.
    #[error("key '{key}' carries malformed JSON: {source}")]
    MalformedJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable read at hydration failed; the store stays on defaults and
    /// downstream subsystems are never signalled.
    #[error("durable read failed: {0}")]
    ReadFailure(#[source] BackendError),

    /// A flush write failed; the in-memory cache is still correct.
    #[error("durable write failed: {0}")]
    WriteFailure(#[source] BackendError),

    /// A single key failed to decode.
    #[error("decode failed: {0}")]
    ParseFailure(#[from] CodecError),

    /// Hydration runs exactly once per process; a second attempt is a bug in
    /// the caller.
    #[error("hydration already attempted")]
    AlreadyHydrated,
}
