//! Integration tests for flush fidelity and full persistence cycles.
//!
//! The core property: after any sequence of mutations followed by a flush,
//! decoding the persisted snapshot reproduces the cache state at flush time.
//! Also exercises the JSON file backend across a simulated process restart.

use serde_json::json;
use settings_store::{
    codec, FlushConfig, FlushScheduler, Hydrator, JsonFileBackend, MemoryBackend, Store,
    StoreConfig,
};
use std::sync::Arc;

fn seeded_store() -> Arc<Store> {
    let store = Arc::new(Store::new(StoreConfig::default()));
    store.seed_defaults();
    store
}

#[tokio::test]
async fn test_flush_snapshot_decodes_back_to_cache_state() {
    let store = seeded_store();

    // A burst of mutations across every codec class.
    store.set("globalStatus", json!(false)).unwrap();
    store.set("globalurlcounter", json!(42)).unwrap();
    store.set("badged_color", json!("00ff00")).unwrap();
    store
        .set("types", json!("main_frame,sub_frame,script"))
        .unwrap();
    store
        .set("ClearURLsData", json!(r#"[{"urlPattern":".*"}]"#))
        .unwrap();
    store.set_hash_status(1);

    let backend = Arc::new(MemoryBackend::new());
    let scheduler = FlushScheduler::new(store.clone(), backend.clone(), FlushConfig::default());

    let state_at_flush = store.entries();
    scheduler.flush_now().await.unwrap();

    // A mutation after the flush must not appear in the persisted snapshot.
    store.set("globalurlcounter", json!(43)).unwrap();

    let persisted = backend.snapshot();
    assert_eq!(persisted.len(), state_at_flush.len());
    for (key, expected) in &state_at_flush {
        let wire = persisted.get(key).expect("key missing from snapshot");
        let decoded = codec::decode(key, wire.clone()).unwrap();
        assert_eq!(&decoded, expected, "round-trip mismatch for {}", key);
    }
}

#[tokio::test]
async fn test_flush_then_hydrate_through_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    // First process life: hydrate on defaults, mutate, flush.
    {
        let store = Arc::new(Store::new(StoreConfig::default()));
        let backend = Arc::new(JsonFileBackend::open(&path).unwrap());

        let hydrator = Hydrator::new(store.clone(), backend.clone(), vec![]);
        hydrator.hydrate().await.unwrap();

        store.set("loggingStatus", json!(true)).unwrap();
        store.set("dataHash", json!("abc123")).unwrap();
        store.set("types", json!("script,image")).unwrap();

        let scheduler = FlushScheduler::new(store, backend, FlushConfig::default());
        scheduler.flush_now().await.unwrap();
    }

    // Second process life: a fresh store hydrates the flushed state back.
    {
        let store = Arc::new(Store::new(StoreConfig::default()));
        let backend = Arc::new(JsonFileBackend::open(&path).unwrap());

        let hydrator = Hydrator::new(store.clone(), backend, vec![]);
        hydrator.hydrate().await.unwrap();

        assert_eq!(store.get("loggingStatus").unwrap().as_bool(), Some(true));
        assert_eq!(store.get("dataHash").unwrap().as_text(), Some("abc123"));
        assert_eq!(
            store.get("types").unwrap().as_list().unwrap(),
            ["script".to_string(), "image".to_string()]
        );
    }
}

#[tokio::test]
async fn test_periodic_flush_ticks_in_background() {
    let store = seeded_store();
    store.set("globalCounter", json!(3)).unwrap();

    let backend = Arc::new(MemoryBackend::new());
    let scheduler = Arc::new(FlushScheduler::new(
        store,
        backend.clone(),
        FlushConfig {
            interval: std::time::Duration::from_millis(20),
            enabled: true,
        },
    ));

    let handle = tokio::spawn(scheduler.clone().start());
    tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    handle.abort();

    let persisted = backend.snapshot();
    assert_eq!(persisted.get("globalCounter"), Some(&json!(3)));
}
