//! # Separate Chaining Hash Table
//!
//! A **HashMap** using **separate chaining**, sized by an "accuracy" knob instead of a raw load factor.
//! It supports:
//! - **Generic** key-value pairs (`K: Hash + Eq, V`).
//! - **Accuracy**: the percentage of buckets the map tries to keep free. Higher accuracy spends
//!   more memory on buckets and keeps chains shorter.
//! - **Hysteresis** between growing and shrinking, so a map hovering around one size does not
//!   resize on every insert/remove pair.
//! - **Configurable** hasher using `BuildHasher` traits.
//! - **Insert**, **get**, **remove**, **iter** operations with expected **O(1)** average performance.
//!
//! The adaptive Huffman tree uses it as its symbol index (byte → leaf).

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};

use crate::cs::error::{Error, Result};

/// Bucket count of a freshly built map when no capacity is given.
pub const INITIAL_BUCKET_COUNT: usize = 15;

/// Lowest accepted accuracy.
pub const MIN_ACCURACY: u8 = 8;

/// Highest accepted accuracy.
pub const MAX_ACCURACY: u8 = 90;

/// Accuracy used when none is specified; equivalent to a 0.75 load factor.
pub const DEFAULT_ACCURACY: u8 = 25;

/// The map shrinks once fewer than `100 - SHRINKING_ACCURACY` percent of buckets are in use.
pub const SHRINKING_ACCURACY: u8 = 98;

/// Maps holding this many items or fewer never shrink.
pub const SHRINKING_MIN_ITEMS: usize = 8;

/// A single entry in a chain: `(K, V)`.
#[derive(Debug, Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// A "bucket" is a vector of entries for separate chaining.
type Bucket<K, V> = Vec<Entry<K, V>>;

/// A separate-chaining HashMap with generic `K, V` and a customizable hasher.
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V, S = RandomState> {
    buckets: Vec<Bucket<K, V>>,
    /// The number of stored key-value pairs.
    len: usize,
    /// Percentage of buckets kept free before growing.
    accuracy: u8,
    /// Hasher builder.
    build_hasher: S,
}

/// A builder for the `ChainedHashMap`.
/// Typically you'll call `.with_capacity(...)`, `.with_accuracy(...)?`, etc., then `.build()`.
#[derive(Debug)]
pub struct ChainedHashMapBuilder<S> {
    capacity: usize,
    accuracy: u8,
    hasher: S,
}

impl Default for ChainedHashMapBuilder<RandomState> {
    fn default() -> Self {
        Self {
            capacity: INITIAL_BUCKET_COUNT,
            accuracy: DEFAULT_ACCURACY,
            hasher: RandomState::new(),
        }
    }
}

impl ChainedHashMapBuilder<RandomState> {
    /// Creates a new builder with default capacity, accuracy and hasher (RandomState).
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S: BuildHasher> ChainedHashMapBuilder<S> {
    /// Sets the initial number of buckets.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Sets the accuracy, which must lie in `MIN_ACCURACY..=MAX_ACCURACY`.
    pub fn with_accuracy(mut self, accuracy: u8) -> Result<Self> {
        if !(MIN_ACCURACY..=MAX_ACCURACY).contains(&accuracy) {
            return Err(Error::InvalidInput(format!(
                "accuracy {} outside {}..={}",
                accuracy, MIN_ACCURACY, MAX_ACCURACY
            )));
        }
        self.accuracy = accuracy;
        Ok(self)
    }

    /// Sets a custom hasher builder.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> ChainedHashMapBuilder<T> {
        ChainedHashMapBuilder {
            capacity: self.capacity,
            accuracy: self.accuracy,
            hasher,
        }
    }

    /// Build the final `ChainedHashMap`.
    pub fn build<K: Hash + Eq, V>(self) -> ChainedHashMap<K, V, S> {
        let mut buckets = Vec::with_capacity(self.capacity);
        buckets.resize_with(self.capacity, Default::default);

        ChainedHashMap {
            buckets,
            len: 0,
            accuracy: self.accuracy,
            build_hasher: self.hasher,
        }
    }
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V> {
    /// Creates a new map with default capacity, accuracy and hasher.
    pub fn new() -> Self {
        ChainedHashMapBuilder::new().build()
    }

    /// Creates a new map with a specified initial bucket count.
    pub fn with_capacity(cap: usize) -> Self {
        ChainedHashMapBuilder::new().with_capacity(cap).build()
    }
}

impl<K: Hash + Eq, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedHashMap<K, V, S> {
    /// Returns the number of key-value pairs in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Configured accuracy.
    pub fn accuracy(&self) -> u8 {
        self.accuracy
    }

    /// Inserts a key-value pair into the map.
    /// If the key already exists, its value is replaced and the old value returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let bucket_index = self.bucket_index(&key);
        let bucket = &mut self.buckets[bucket_index];

        for entry in bucket.iter_mut() {
            if entry.key == key {
                return Some(std::mem::replace(&mut entry.value, value));
            }
        }
        bucket.push(Entry { key, value });
        self.len += 1;

        if self.over_high_water() {
            self.resize(self.bucket_count() * 2);
        }
        None
    }

    /// Returns a reference to the value corresponding to the key, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value corresponding to the key, if present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .iter_mut()
            .find(|entry| &entry.key == key)
            .map(|entry| &mut entry.value)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes and returns the value for the specified key, if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.bucket_index(key);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|entry| &entry.key == key)?;
        let entry = bucket.swap_remove(pos);
        self.len -= 1;

        if self.under_low_water() {
            self.resize((self.bucket_count() / 2).max(1));
        }
        Some(entry.value)
    }

    /// Clears the map, removing all key-value pairs. The bucket count is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns an iterator over the key-value pairs in the map.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|entry| (&entry.key, &entry.value)))
    }

    /// Calls `f` on every key-value pair.
    pub fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    fn over_high_water(&self) -> bool {
        self.len * 100 > self.bucket_count() * (100 - self.accuracy as usize)
    }

    fn under_low_water(&self) -> bool {
        self.len > SHRINKING_MIN_ITEMS
            && self.len * 100 < self.bucket_count() * (100 - SHRINKING_ACCURACY as usize)
    }

    fn hash_to(&self, key: &K, bucket_count: usize) -> usize {
        let mut hasher = self.build_hasher.build_hasher();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % bucket_count
    }

    fn bucket_index(&self, key: &K) -> usize {
        self.hash_to(key, self.bucket_count())
    }

    /// Rehash every entry into `new_bucket_count` buckets.
    fn resize(&mut self, new_bucket_count: usize) {
        log::debug!(
            "resizing chained hash map: {} -> {} buckets ({} items)",
            self.bucket_count(),
            new_bucket_count,
            self.len
        );
        let mut new_buckets: Vec<Bucket<K, V>> = Vec::with_capacity(new_bucket_count);
        new_buckets.resize_with(new_bucket_count, Default::default);

        let old = std::mem::take(&mut self.buckets);
        for entry in old.into_iter().flatten() {
            let h = self.hash_to(&entry.key, new_bucket_count);
            new_buckets[h].push(entry);
        }
        self.buckets = new_buckets;
    }
}
