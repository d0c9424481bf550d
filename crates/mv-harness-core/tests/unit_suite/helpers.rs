//! Test helper utilities.
//!
//! Provides configs with short deadlines and stores with a ready schema.

use mv_harness_core::{HarnessConfig, MemoryStore, RetryPolicy, ScoreStore};

/// Config whose settle and scenario deadlines suit in-memory runs
pub fn fast_config() -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.settle = RetryPolicy {
        initial_delay_ms: 1,
        max_delay_ms: 10,
        timeout_secs: 1,
    };
    config.scenarios.timeout_secs = 10;
    config
}

/// Memory store with `keyspace` selected and an empty `scores` table
pub async fn store_with_table(keyspace: &str) -> MemoryStore {
    let store = MemoryStore::new();
    create_table(&store, keyspace).await;
    store
}

pub async fn create_table(store: &MemoryStore, keyspace: &str) {
    store.create_keyspace(keyspace).await.unwrap();
    store.use_keyspace(keyspace).await.unwrap();
    store.create_scores_table().await.unwrap();
}
