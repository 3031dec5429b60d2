//! Tests for per-generation capacity and eviction.

use outpost_core::{CacheEntry, CacheKey, Response};
use outpost_moka::{EvictionPolicy, MokaStore, MokaStoreBuilder};
use outpost_store::{CacheGeneration, CacheStore};
use url::Url;

fn make_key(id: u32) -> CacheKey {
    CacheKey::get(&Url::parse(&format!("https://shop.example/img/{id}.png")).unwrap())
}

fn make_entry(size: usize) -> CacheEntry {
    CacheEntry::new(Response::ok(vec![0u8; size]))
}

#[tokio::test]
async fn test_max_entries_is_per_generation() {
    let store = MokaStore::builder()
        .max_entries(2)
        .eviction_policy(EvictionPolicy::lru())
        .build();
    let current = store.open("novashop-v4").await.unwrap();
    let other = store.open("novashop-v5").await.unwrap();

    for i in 1..=3 {
        current.put(&make_key(i), make_entry(10)).await.unwrap();
    }
    other.put(&make_key(1), make_entry(10)).await.unwrap();

    current.cache().run_pending_tasks().await;
    other.cache().run_pending_tasks().await;

    assert_eq!(current.cache().entry_count(), 2);
    assert_eq!(other.cache().entry_count(), 1);
    assert!(current.lookup(&make_key(3)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_max_bytes_eviction() {
    let single = make_entry(1_000).memory_size() as u64 + 64;
    // Use MokaStoreBuilder::default() to test Default impl
    let store = MokaStoreBuilder::default().max_bytes(single * 3).build();
    let generation = store.open("novashop-v4").await.unwrap();

    for i in 1..=3 {
        generation.put(&make_key(i), make_entry(1_000)).await.unwrap();
    }
    generation.cache().run_pending_tasks().await;
    for i in 1..=3 {
        assert!(
            generation.lookup(&make_key(i)).await.unwrap().is_some(),
            "Entry {} should exist (capacity fits 3)",
            i
        );
    }

    generation.put(&make_key(4), make_entry(1_000)).await.unwrap();
    generation.cache().run_pending_tasks().await;

    let mut count = 0;
    for i in 1..=4 {
        if generation.lookup(&make_key(i)).await.unwrap().is_some() {
            count += 1;
        }
    }
    assert_eq!(count, 3, "Should have exactly 3 entries after eviction");
}

#[tokio::test]
async fn test_keys_lists_stored_requests() {
    let store = MokaStore::builder().max_entries(10).build();
    let generation = store.open("novashop-v4").await.unwrap();
    generation.put(&make_key(1), make_entry(1)).await.unwrap();
    generation.put(&make_key(2), make_entry(1)).await.unwrap();
    generation.cache().run_pending_tasks().await;

    let mut keys: Vec<String> = generation
        .keys()
        .await
        .unwrap()
        .iter()
        .map(|k| k.to_string())
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "GET https://shop.example/img/1.png",
            "GET https://shop.example/img/2.png"
        ]
    );
}
