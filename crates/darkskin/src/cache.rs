//! Bounded memo of whole-stylesheet conversions.
//!
//! Entries are keyed by a cheap content hash and evicted in insertion order
//! (FIFO). Reads never refresh an entry's position.
//!
//! # Example
//!
//! ```
//! use darkskin::{ContentHash, ConversionCache};
//!
//! let mut cache = ConversionCache::new(2);
//! cache.insert(ContentHash::of("a{}"), "dark a".into());
//! cache.insert(ContentHash::of("b{}"), "dark b".into());
//! cache.insert(ContentHash::of("c{}"), "dark c".into());
//!
//! assert_eq!(cache.len(), 2);
//! assert!(!cache.contains(&ContentHash::of("a{}")));
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Content hash of a stylesheet: its length plus a rolling `h * 31 + c`
/// hash over its characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash {
    /// Length in characters.
    pub len: usize,
    /// Rolling polynomial hash, wrapping at 32 bits.
    pub hash: u32,
}

impl ContentHash {
    /// Hash `css`.
    pub fn of(css: &str) -> Self {
        let (len, hash) = css.chars().fold((0usize, 0u32), |(len, hash), c| {
            (len + 1, hash.wrapping_mul(31).wrapping_add(c as u32))
        });
        Self { len, hash }
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.len, self.hash)
    }
}

/// FIFO cache of converted stylesheets.
///
/// Not thread-safe on its own; [`DarkModeConverter`](crate::DarkModeConverter)
/// wraps it in a mutex.
pub struct ConversionCache {
    capacity: usize,
    entries: HashMap<ContentHash, String>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<ContentHash>,
    hits: u64,
    misses: u64,
}

impl ConversionCache {
    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            hits: 0,
            misses: 0,
        }
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Look up a conversion, counting the hit or miss.
    pub fn get(&mut self, key: &ContentHash) -> Option<&str> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                tracing::debug!(%key, "conversion cache hit");
                Some(value.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching the statistics.
    pub fn contains(&self, key: &ContentHash) -> bool {
        self.entries.contains_key(key)
    }

    /// Store a conversion.
    ///
    /// Inserting a key that is already present does nothing. When the cache
    /// grows past its capacity the oldest inserted entry is evicted.
    pub fn insert(&mut self, key: ContentHash, value: String) {
        if self.entries.contains_key(&key) {
            return;
        }
        self.entries.insert(key, value);
        self.order.push_back(key);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(key = %oldest, "evicted oldest cached conversion");
        }
    }

    /// Remove every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Reset hit and miss counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Fraction of lookups that hit (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
        }
    }
}

impl fmt::Debug for ConversionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionCache")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("hit_rate", &format!("{:.1}%", self.hit_rate() * 100.0))
            .finish()
    }
}

/// Snapshot of cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Number of cached conversions.
    pub entries: usize,
    /// Maximum number of cached conversions.
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(i: usize) -> ContentHash {
        ContentHash::of(&format!(".r{i}{{color:#{i:06x}}}"))
    }

    #[test]
    fn hash_is_length_plus_rolling() {
        assert_eq!(ContentHash::of(""), ContentHash { len: 0, hash: 0 });
        assert_eq!(ContentHash::of("ab"), ContentHash { len: 2, hash: 97 * 31 + 98 });
        assert_eq!(ContentHash::of("é").len, 1);
        assert_eq!(ContentHash::of("ab").to_string(), "2:3105");
    }

    #[test]
    fn hash_wraps() {
        let long = "z".repeat(10_000);
        assert_eq!(ContentHash::of(&long).len, 10_000);
    }

    #[test]
    fn fifo_eviction_ignores_reads() {
        let mut cache = ConversionCache::new(3);
        for i in 0..3 {
            cache.insert(key(i), format!("v{i}"));
        }
        // Reading the oldest entry does not protect it.
        assert_eq!(cache.get(&key(0)), Some("v0"));
        cache.insert(key(3), "v3".into());

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(3)));
    }

    #[test]
    fn bound_of_two_hundred() {
        let mut cache = ConversionCache::new(200);
        for i in 0..201 {
            cache.insert(key(i), String::new());
        }
        assert_eq!(cache.len(), 200);
        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
        assert!(cache.contains(&key(200)));
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut cache = ConversionCache::new(2);
        cache.insert(key(0), "first".into());
        cache.insert(key(1), "second".into());
        cache.insert(key(0), "again".into());
        assert_eq!(cache.get(&key(0)), Some("first"));

        // key(0) kept its original position and is evicted next.
        cache.insert(key(2), "third".into());
        assert!(!cache.contains(&key(0)));
        assert!(cache.contains(&key(1)));
    }

    #[test]
    fn statistics() {
        let mut cache = ConversionCache::new(4);
        cache.insert(key(0), "x".into());
        assert!(cache.get(&key(0)).is_some());
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(0)).is_some());

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-12);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 2);
        cache.reset_stats();
        assert_eq!(cache.hit_rate(), 0.0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut cache = ConversionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key(0), "a".into());
        cache.insert(key(1), "b".into());
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key(1)));
    }
}
