//! Core store — the heart of pailstore.
//!
//! `Store` combines the bucket hasher, the chained bucket table, and the
//! flat-file snapshot into the single entry point external callers use.
//!
//! **Read path**: hash, scan one bucket, no disk I/O.
//! **Write path**: hash, mutate the bucket, grow the table if the load
//! factor crossed the threshold, then rewrite the whole snapshot file.
//! **Startup**: replay the snapshot through the normal insert path with the
//! disk flush suppressed.
//!
//! The store itself is single-writer and takes `&mut self` for mutations.
//! Hosts with more than one thread wrap it in [`SharedStore`], one lock
//! around all operations.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::config::StoreConfig;
use crate::error::{PailError, PailResult};
use crate::hash::BucketHasher;
use crate::persist::FlatFile;
use crate::table::{BucketSnapshot, BucketTable, Entry};

/// Load factor report. Pure snapshot — computing it never resizes.
#[derive(Debug, Clone)]
pub struct LoadFactorInfo {
    /// Entries currently stored
    pub entries: usize,
    /// Current bucket count
    pub bucket_count: usize,
    /// entries / bucket_count
    pub load_factor: f64,
    /// Threshold the resize policy compares against
    pub threshold: f64,
    /// Whether inserting one more new key would trigger a resize
    pub resize_on_next_insert: bool,
}

/// Full bucket-structure report for introspection.
#[derive(Debug, Clone)]
pub struct BucketVisualization {
    /// Total buckets in the table
    pub bucket_count: usize,
    /// Total entries across all buckets
    pub total_items: usize,
    /// Per-bucket structure, index order
    pub buckets: Vec<BucketSnapshot>,
    /// Bucket index → entry count, every bucket present
    pub item_counts: HashMap<usize, usize>,
}

/// Bucket-hashed key-value store with write-through flat-file persistence.
///
/// Capacity starts at the configured bucket count and doubles whenever an
/// insert of a new key pushes the load factor over the threshold. The
/// hasher and table are rebuilt wholesale on resize — placement is
/// capacity-dependent, so every entry is rehashed under the new count.
/// Capacity never shrinks, even after mass deletion.
pub struct Store {
    /// Bucket placement, bound to the current bucket count
    hasher: BucketHasher,
    /// Chained bucket storage
    table: BucketTable,
    /// Snapshot file, rewritten on every mutation
    file: FlatFile,
    /// Resize trigger
    threshold: f64,
}

impl Store {
    /// Open a store: validate the configuration, load the snapshot file,
    /// and replay its entries into the table.
    ///
    /// A missing snapshot is an empty store. An unreadable snapshot is
    /// logged and treated the same — the file will be rewritten by the
    /// first mutation. Replay runs the normal insert path (resize included)
    /// without flushing back to disk.
    pub fn open(config: StoreConfig) -> PailResult<Self> {
        config
            .validate()
            .map_err(|reason| PailError::InvalidConfig { reason })?;

        let mut store = Self {
            hasher: BucketHasher::new(config.initial_buckets),
            table: BucketTable::new(config.initial_buckets),
            file: FlatFile::new(&config.data_path),
            threshold: config.load_factor_threshold,
        };

        let persisted = match store.file.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "snapshot unreadable, starting empty");
                Vec::new()
            }
        };

        let replayed = persisted.len();
        for entry in persisted {
            store.insert_in_memory(&entry.key, &entry.value);
        }
        if replayed > 0 {
            tracing::info!(
                entries = replayed,
                path = %store.file.path().display(),
                "replayed persisted entries"
            );
        }

        Ok(store)
    }

    /// Set `key` to `value`.
    ///
    /// An existing key is overwritten in place and does not count toward
    /// the load factor; a new key is inserted and may trigger a resize.
    /// Either way the full snapshot is flushed to disk.
    pub fn set(&mut self, key: &str, value: &str) {
        self.insert_in_memory(key, value);
        self.flush();
    }

    /// Value for `key`, if present. Never touches disk.
    pub fn get(&self, key: &str) -> Option<String> {
        self.table
            .find(self.hasher.index(key), key)
            .map(String::from)
    }

    /// Overwrite an existing key. Returns false (and does nothing, not even
    /// a flush) when the key is absent.
    pub fn update(&mut self, key: &str, value: &str) -> bool {
        let bucket = self.hasher.index(key);
        if !self.table.contains(bucket, key) {
            return false;
        }
        self.table.insert_or_update(bucket, key, value);
        self.flush();
        true
    }

    /// Remove `key`. Returns false with no side effect when absent.
    /// Capacity is unchanged either way — there is no shrink path.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.table.remove(self.hasher.index(key), key);
        if removed {
            self.flush();
        }
        removed
    }

    /// Whether `key` is present. Pure lookup.
    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains(self.hasher.index(key), key)
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Current bucket count.
    pub fn bucket_count(&self) -> usize {
        self.hasher.bucket_count()
    }

    /// All keys, flattened across buckets. Caller owns the copy.
    pub fn keys(&self) -> Vec<String> {
        self.table.all_entries().into_iter().map(|e| e.key).collect()
    }

    /// All entries, flattened across buckets. Caller owns the copy.
    pub fn entries(&self) -> Vec<Entry> {
        self.table.all_entries()
    }

    /// The bucket index `key` hashes to under the current capacity, whether
    /// or not the key exists. Exactly the index a `set` would use.
    pub fn bucket_for_key(&self, key: &str) -> usize {
        self.hasher.index(key)
    }

    /// All keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        keys
    }

    /// Aggregate the fields stored under `"{prefix}_"`-scoped keys.
    ///
    /// `set("user1_name", "A")` then `user_data("user1")` yields
    /// `{"name": "A"}`. Keys without the exact underscore separator are
    /// excluded.
    pub fn user_data(&self, prefix: &str) -> HashMap<String, String> {
        let scoped = format!("{}_", prefix);
        let mut fields = HashMap::new();
        for key in self.keys_with_prefix(&scoped) {
            if let Some(value) = self.get(&key) {
                fields.insert(key[scoped.len()..].to_string(), value);
            }
        }
        fields
    }

    /// Full bucket-structure report: total buckets, total items, per-bucket
    /// entries, and an index → count map.
    pub fn visualize_buckets(&self) -> BucketVisualization {
        let buckets = self.table.snapshot();
        let item_counts = buckets.iter().map(|b| (b.index, b.count)).collect();
        BucketVisualization {
            bucket_count: self.table.bucket_count(),
            total_items: self.table.len(),
            buckets,
            item_counts,
        }
    }

    /// Current load-factor numbers. Reporting only — never triggers a
    /// resize.
    pub fn load_factor_info(&self) -> LoadFactorInfo {
        let entries = self.table.len();
        let bucket_count = self.hasher.bucket_count();
        LoadFactorInfo {
            entries,
            bucket_count,
            load_factor: entries as f64 / bucket_count as f64,
            threshold: self.threshold,
            resize_on_next_insert: (entries + 1) as f64 / bucket_count as f64 > self.threshold,
        }
    }

    /// The snapshot file path this store persists to.
    pub fn data_path(&self) -> &std::path::Path {
        self.file.path()
    }

    /// Insert or overwrite without flushing. Shared by `set` and startup
    /// replay. Returns true when a new key was added.
    fn insert_in_memory(&mut self, key: &str, value: &str) -> bool {
        let inserted = self
            .table
            .insert_or_update(self.hasher.index(key), key, value);
        if inserted && self.load_factor() > self.threshold {
            self.grow();
        }
        inserted
    }

    fn load_factor(&self) -> f64 {
        self.table.len() as f64 / self.hasher.bucket_count() as f64
    }

    /// Double the capacity and rehash every entry.
    ///
    /// The old hasher and table are discarded, not mutated: a fresh pair is
    /// allocated at double capacity and every entry is re-inserted under
    /// the new count. Entries may land in different buckets than before.
    fn grow(&mut self) {
        let new_count = self.hasher.bucket_count() * 2;
        tracing::debug!(
            from = self.hasher.bucket_count(),
            to = new_count,
            entries = self.table.len(),
            "doubling bucket table"
        );

        let hasher = BucketHasher::new(new_count);
        let old = std::mem::replace(&mut self.table, BucketTable::new(new_count));
        for entry in old.into_entries() {
            self.table.append(hasher.index(&entry.key), entry);
        }
        self.hasher = hasher;
    }

    /// Rewrite the snapshot file with the current table.
    ///
    /// A write failure is logged and swallowed: the in-memory table stays
    /// authoritative and the caller's mutation still succeeds. The on-disk
    /// copy may be stale (or partially written) until the next flush.
    fn flush(&self) {
        if let Err(e) = self.file.save(&self.table.all_entries()) {
            tracing::warn!(error = %e, "snapshot write failed, in-memory state unaffected");
        }
    }
}

/// The external mutual-exclusion wrapper the concurrency model requires for
/// multi-threaded hosts: one mutex guarding all store operations. Clones
/// share the same underlying store.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    /// Wrap an already-opened store.
    pub fn new(store: Store) -> Self {
        Self { inner: Arc::new(Mutex::new(store)) }
    }

    /// Open a store and wrap it in one step.
    pub fn open(config: StoreConfig) -> PailResult<Self> {
        Store::open(config).map(Self::new)
    }

    /// Acquire the store. All operations on the guard run to completion
    /// before the next caller is admitted.
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock()
    }
}
