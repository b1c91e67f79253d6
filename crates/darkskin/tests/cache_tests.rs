//! Integration tests for conversion memoization and shared use.

use std::sync::Arc;
use std::thread;

use darkskin::{ContentHash, ConversionCache, DarkModeConfig, DarkModeConverter};

fn stylesheet(i: usize) -> String {
    format!(".item-{i}{{color:#{:06x};margin:{i}px}}", i * 997)
}

#[test]
fn converter_cache_is_bounded_fifo() {
    let converter = DarkModeConverter::new();
    let inputs: Vec<_> = (0..201).map(stylesheet).collect();
    for css in &inputs {
        converter.convert(css);
    }

    let stats = converter.cache_stats();
    assert_eq!(stats.entries, 200);
    assert_eq!(stats.capacity, 200);
    assert_eq!(stats.misses, 201);

    // The first stylesheet was evicted, the second is still cached.
    converter.convert(&inputs[1]);
    assert_eq!(converter.cache_stats().hits, 1);
    converter.convert(&inputs[0]);
    assert_eq!(converter.cache_stats().misses, 202);
}

#[test]
fn standalone_cache_bound() {
    let mut cache = ConversionCache::new(200);
    let keys: Vec<_> = (0..201).map(|i| ContentHash::of(&stylesheet(i))).collect();
    for key in &keys {
        cache.insert(*key, String::from("converted"));
    }
    assert_eq!(cache.len(), 200);
    assert!(!cache.contains(&keys[0]));
    assert!(cache.contains(&keys[1]));
}

#[test]
fn custom_capacity() {
    let config = DarkModeConfig::default().with_cache_capacity(3);
    let converter = DarkModeConverter::with_config(config).unwrap();
    for i in 0..10 {
        converter.convert(&stylesheet(i));
    }
    assert_eq!(converter.cache_stats().entries, 3);
}

#[test]
fn shared_across_threads() {
    let converter = Arc::new(DarkModeConverter::new());
    let expected: Vec<_> = (0..16).map(|i| converter.convert_uncached(&stylesheet(i))).collect();
    let expected = Arc::new(expected);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let converter = Arc::clone(&converter);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                for round in 0..50 {
                    let i = (worker + round) % 16;
                    assert_eq!(converter.convert(&stylesheet(i)), expected[i]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = converter.cache_stats();
    assert_eq!(stats.entries, 16);
    assert_eq!(stats.hits + stats.misses, 8 * 50);
}

#[test]
fn content_hash_distinguishes_inputs() {
    assert_ne!(ContentHash::of("a{color:#000}"), ContentHash::of("a{color:#001}"));
    assert_ne!(ContentHash::of("ab"), ContentHash::of("abc"));
    assert_eq!(ContentHash::of("h1{}"), ContentHash::of("h1{}"));
}
