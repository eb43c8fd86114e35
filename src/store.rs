//! Volatile settings cache - the single source of truth during process life.
//!
//! One `Store` instance is created at startup, hydrated once, then shared by
//! reference with every consuming subsystem. Reads and writes are synchronous
//! and purely in-memory; durable I/O happens only in the hydration and flush
//! paths.
//!
//! # Thread Safety
//! The entry map sits behind a `parking_lot::RwLock`. Reads can proceed
//! concurrently; writes take the lock for the duration of one map mutation.
//! There is no cross-key transaction: the ordering of concurrent mutations is
//! whatever the runtime's task scheduling provides.

use crate::codec;
use crate::error::CodecError;
use crate::types::{now_ms, Platform, SettingKey, SettingValue, StatusCode};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Configuration for the settings store.
#[derive(Clone, Copy, Debug)]
pub struct StoreConfig {
    /// Host platform family; selects the resource-type set default.
    pub platform: Platform,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Firefox,
        }
    }
}

// ================================================================================================
// STORE
// ================================================================================================

/// The in-memory settings cache.
#[derive(Debug)]
pub struct Store {
    /// Current entries, keyed by wire name.
    entries: RwLock<HashMap<String, SettingValue>>,
    /// Platform family used for environment-dependent defaults.
    platform: Platform,
    /// Creation timestamp (ms since epoch).
    created_at: u64,
}

impl Store {
    /// Creates an empty store. Entries appear once `seed_defaults` runs
    /// (normally via the hydrator).
    pub fn new(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            platform: config.platform,
            created_at: now_ms(),
        }
    }

    // ============================================================================================
    // ACCESSORS
    // ============================================================================================

    /// Returns the current value under `key`, or None if the key was never
    /// set. Never touches durable storage, never blocks on I/O.
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.entries.read().get(key).cloned()
    }

    /// Typed convenience over [`Store::get`] for recognized keys.
    pub fn get_key(&self, key: SettingKey) -> Option<SettingValue> {
        self.get(key.wire_name())
    }

    /// Returns a point-in-time view of every entry. The clone is taken under
    /// the read lock; mutations racing with this call land in the next view.
    pub fn entries(&self) -> HashMap<String, SettingValue> {
        self.entries.read().clone()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    // ============================================================================================
    // MUTATION
    // ============================================================================================

    /// Stores a wire-form value under `key`, running the per-key decode rule
    /// (and thus legacy URL migration) first. Overwrites unconditionally; no
    /// validation beyond the type coercion itself.
    pub fn set(&self, key: &str, value: Value) -> Result<(), CodecError> {
        let decoded = codec::decode(key, value)?;
        self.entries.write().insert(key.to_string(), decoded);
        Ok(())
    }

    /// Stores an already-decoded value directly, bypassing the codec. Used
    /// by default seeding and by internal logic that holds canonical values.
    pub fn put(&self, key: SettingKey, value: SettingValue) {
        self.entries
            .write()
            .insert(key.wire_name().to_string(), value);
    }

    /// Records the outcome of a rule-set hash comparison. The cache holds
    /// the fixed status token, never the raw integer.
    pub fn set_hash_status(&self, code: i64) {
        let status = StatusCode::from_code(code);
        self.put(
            SettingKey::HashStatus,
            SettingValue::Text(status.token().to_string()),
        );
    }

    /// Assigns every recognized key its built-in default. Called once at the
    /// start of hydration, before any persisted data is applied.
    pub fn seed_defaults(&self) {
        let mut entries = self.entries.write();
        for key in SettingKey::ALL {
            entries.insert(
                key.wire_name().to_string(),
                key.default_value(self.platform),
            );
        }
    }

    /// Re-seeds a single recognized key with its default. Used when a
    /// persisted value for that key turns out to be corrupt.
    pub fn reset_to_default(&self, key: SettingKey) {
        self.put(key, key.default_value(self.platform));
    }

    // ============================================================================================
    // FLUSH SUPPORT
    // ============================================================================================

    /// Encodes the entire cache into wire form for one batched durable write.
    /// Runs the codec's encode direction per key; this is the only caller of
    /// that direction.
    pub fn encode_snapshot(&self) -> HashMap<String, Value> {
        let entries = self.entries.read();
        entries
            .iter()
            .map(|(key, value)| (key.clone(), codec::encode(key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_store() -> Store {
        let store = Store::new(StoreConfig::default());
        store.seed_defaults();
        store
    }

    #[test]
    fn test_get_before_any_set_is_none() {
        let store = Store::new(StoreConfig::default());
        assert!(store.get("globalStatus").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_seed_defaults_covers_every_recognized_key() {
        let store = seeded_store();
        assert_eq!(store.len(), SettingKey::ALL.len());
        for key in SettingKey::ALL {
            assert!(store.get_key(key).is_some(), "missing default for {}", key);
        }
    }

    #[test]
    fn test_set_runs_decode_path() {
        let store = seeded_store();

        store.set("types", json!("main_frame,script")).unwrap();
        assert_eq!(
            store.get("types").unwrap().as_list().unwrap(),
            ["main_frame".to_string(), "script".to_string()]
        );

        store.set("ClearURLsData", json!("[1,2,3]")).unwrap();
        assert_eq!(
            store.get("ClearURLsData").unwrap().as_json().unwrap(),
            &json!([1, 2, 3])
        );
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let store = seeded_store();
        store.set("globalCounter", json!(5)).unwrap();
        store.set("globalCounter", json!(9)).unwrap();
        assert_eq!(store.get("globalCounter").unwrap().as_int(), Some(9));
    }

    #[test]
    fn test_unrecognized_keys_pass_through() {
        let store = seeded_store();
        store.set("customFlag", json!(true)).unwrap();
        assert_eq!(store.get("customFlag").unwrap().as_bool(), Some(true));
        assert_eq!(store.len(), SettingKey::ALL.len() + 1);
    }

    #[test]
    fn test_hash_status_stores_token_not_integer() {
        let store = seeded_store();

        store.set_hash_status(2);
        assert_eq!(
            store.get_key(SettingKey::HashStatus).unwrap().as_text(),
            Some("hash_status_code_2")
        );

        store.set_hash_status(99);
        assert_eq!(
            store.get_key(SettingKey::HashStatus).unwrap().as_text(),
            Some("hash_status_code_4")
        );
    }

    #[test]
    fn test_encode_snapshot_stringifies_structured_keys() {
        let store = seeded_store();
        let snapshot = store.encode_snapshot();

        // Structured and list keys go to the wire as strings.
        assert_eq!(snapshot.get("ClearURLsData"), Some(&json!("[]")));
        assert!(matches!(
            snapshot.get("types"),
            Some(serde_json::Value::String(_))
        ));
        // Scalars stay native.
        assert_eq!(snapshot.get("globalStatus"), Some(&json!(true)));
        assert_eq!(snapshot.get("globalurlcounter"), Some(&json!(0)));
    }

    #[test]
    fn test_reset_to_default_after_corruption() {
        let store = seeded_store();
        store.put(
            SettingKey::BadgedColor,
            SettingValue::Text("zzzzzz".to_string()),
        );
        store.reset_to_default(SettingKey::BadgedColor);
        assert_eq!(
            store.get_key(SettingKey::BadgedColor).unwrap().as_text(),
            Some("ffa500")
        );
    }
}
