//! Thread-Safe Keyspace with Per-Key Guards and Expiry Support
//!
//! This module implements the core key table for FieldKV. It maps keys to
//! typed value slots and gives every key its own reader/writer guard, so
//! commands on different keys run fully in parallel while commands on the
//! same key serialize: one writer at a time, any number of readers.
//!
//! ## Design Decisions
//!
//! 1. **Sharded key table**: the outer map is split into shards to reduce
//!    contention on structural changes (key creation and removal).
//! 2. **Per-key guards**: shard locks are held only long enough to find or
//!    insert an entry; the command's critical section runs under the key's
//!    own lock, so keys that share a shard still never block each other.
//! 3. **Tombstones**: removal replaces a slot with `None` before the entry
//!    leaves the table, so a command racing with a delete or an expiry
//!    observes the removal instead of mutating a detached slot.
//! 4. **Lazy Expiry**: deadlines are checked on access, plus a bounded
//!    background sweep for keys nobody touches.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          KeySpace                            │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐      ┌─────────┐        │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ ...  │ Shard N │        │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │      │ RwLock  │        │
//! │  │ HashMap │ │ HashMap │ │ HashMap │      │ HashMap │        │
//! │  └────┬────┘ └────┬────┘ └─────────┘      └─────────┘        │
//! │       │           │                                          │
//! │  ┌────▼─────┐ ┌───▼──────┐    one entry per key:             │
//! │  │ KeyEntry │ │ KeyEntry │    RwLock<Option<Slot>>           │
//! │  └──────────┘ └──────────┘                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lock discipline: a slot guard is never acquired while a shard lock is
//! held (the sweep's non-blocking `try_read` peek is the one exception),
//! and a shard lock is never acquired while a slot guard is held. Removal
//! always tombstones under the slot guard first and detaches the entry
//! from the shard afterwards.

use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};
use crate::storage::slot::{HashTable, KeyEntry, Slot, Value, ValueKind};

/// Number of shards for the key table.
/// More shards = less lock contention, but more memory overhead.
/// 64 is a good balance for most workloads.
const NUM_SHARDS: usize = 64;

/// A single shard holding a portion of the key table.
///
/// The shard lock protects the map structure only. Lookups clone the
/// `Arc` out and release the lock before the command's critical section
/// starts.
#[derive(Debug, Default)]
struct Shard {
    entries: RwLock<HashMap<Bytes, Arc<KeyEntry>>>,
}

/// Caps for a single background expiry sweep.
///
/// The sweep is deliberately bounded: it visits a few shards per pass,
/// samples a limited number of entries per shard, and gives up once its
/// time budget runs out. Keys it misses are still reclaimed lazily on
/// their next access.
#[derive(Debug, Clone)]
pub struct SweepLimits {
    /// How many shards one sweep visits, round robin across calls.
    pub shards_per_sweep: usize,
    /// How many entries to examine per visited shard.
    pub samples_per_shard: usize,
    /// Wall-clock cap for the whole sweep.
    pub time_budget: Duration,
}

impl Default for SweepLimits {
    fn default() -> Self {
        Self {
            shards_per_sweep: 16,
            samples_per_shard: 128,
            time_budget: Duration::from_millis(2),
        }
    }
}

/// What a single expiry sweep accomplished.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOutcome {
    /// Entries examined.
    pub scanned: u64,
    /// Entries removed because their deadline had passed.
    pub removed: u64,
}

/// Keyspace statistics.
#[derive(Debug, Clone, Copy)]
pub struct KeySpaceStats {
    /// Number of keys currently mapped (approximate).
    pub keys: u64,
    /// Total keys removed because their deadline passed.
    pub expired: u64,
}

/// The main key-to-value table for FieldKV.
///
/// # Thread Safety
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// threads or tasks. Every operation takes `&self` and is safe to call
/// concurrently; operations on the same key serialize on that key's
/// guard, operations on different keys proceed in parallel.
///
/// # Example
///
/// ```
/// use fieldkv::storage::KeySpace;
/// use bytes::Bytes;
///
/// let keyspace = KeySpace::new();
///
/// // Store two fields under one key
/// keyspace
///     .hset(
///         Bytes::from("user:1000"),
///         vec![
///             (Bytes::from("name"), Bytes::from("gyubin")),
///             (Bytes::from("age"), Bytes::from("31")),
///         ],
///     )
///     .unwrap();
///
/// // Read one field back
/// let name = keyspace.hget(b"user:1000", b"name").unwrap();
/// assert_eq!(name, Some(Bytes::from("gyubin")));
/// ```
pub struct KeySpace {
    /// Sharded key table for reduced lock contention
    shards: Vec<Shard>,

    /// Statistics: number of mapped keys (approximate)
    key_count: AtomicU64,

    /// Statistics: keys removed because their deadline passed
    expired_count: AtomicU64,

    /// Round-robin shard cursor for the background sweep
    sweep_cursor: AtomicUsize,
}

impl std::fmt::Debug for KeySpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySpace")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .field("expired_count", &self.expired_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySpace {
    /// Creates a new, empty keyspace.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
            sweep_cursor: AtomicUsize::new(0),
        }
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Gets the shard for a given key.
    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Looks up a key's entry without creating one.
    fn lookup(&self, key: &[u8]) -> Option<Arc<KeyEntry>> {
        let entries = self.shard(key).entries.read().unwrap();
        entries.get(key).cloned()
    }

    /// Looks up a key's entry, creating one holding an empty hash when the
    /// key is absent.
    fn lookup_or_create(&self, key: &Bytes) -> Arc<KeyEntry> {
        // Fast path: a live entry is already mapped
        {
            let entries = self.shard(key).entries.read().unwrap();
            if let Some(entry) = entries.get(key) {
                if !entry.is_tombstoned() {
                    return Arc::clone(entry);
                }
            }
        }

        let mut entries = self.shard(key).entries.write().unwrap();
        if let Some(entry) = entries.get(key) {
            if !entry.is_tombstoned() {
                return Arc::clone(entry);
            }
        }

        // The key is absent, or its entry is a tombstone whose remover has
        // not detached it yet. A fresh entry takes the spot either way;
        // the pending detach is ptr_eq-checked and leaves it alone.
        let entry = Arc::new(KeyEntry::vacant_hash());
        if entries.insert(key.clone(), Arc::clone(&entry)).is_none() {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Removes an entry from the key table if it is still the mapped one.
    ///
    /// Callers tombstone the slot and release its guard before calling
    /// this. The `ptr_eq` check keeps a fresh entry created under the same
    /// key in the meantime untouched.
    fn detach(&self, key: &[u8], entry: &Arc<KeyEntry>) {
        let mut entries = self.shard(key).entries.write().unwrap();
        let is_current = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, entry));
        if is_current {
            entries.remove(key);
            self.key_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Runs `f` under the key's shared guard.
    ///
    /// `f` sees `None` when the key is absent, expired, or holds an empty
    /// hash. An expired entry found along the way is detached before the
    /// call returns, which is the lazy half of expiry.
    fn read_slot<R>(&self, key: &[u8], f: impl FnOnce(Option<&Slot>) -> R) -> R {
        let Some(entry) = self.lookup(key) else {
            return f(None);
        };

        let guard = entry.slot.read().unwrap();
        if guard.as_ref().is_some_and(Slot::is_expired) {
            // The deadline has passed: report absence, then switch to the
            // write guard to detach the dead entry
            drop(guard);
            let result = f(None);
            self.remove_expired(key, &entry);
            return result;
        }

        match guard.as_ref() {
            Some(slot) if !slot.is_vacant_hash() => f(Some(slot)),
            // A tombstone or an empty table reads as absence: the former
            // means a delete won the race for this entry, the latter is
            // the creation window before a first field write lands
            _ => f(None),
        }
    }

    /// Runs `f` under the key's exclusive guard, creating the key as an
    /// empty hash when absent and resetting it when expired.
    ///
    /// If `f` leaves the slot holding an empty hash, the key is removed:
    /// an empty hash and an absent key are the same thing.
    fn write_slot<R>(&self, key: &Bytes, f: impl FnOnce(&mut Slot) -> R) -> R {
        loop {
            let entry = self.lookup_or_create(key);
            let mut guard = entry.slot.write().unwrap();

            let Some(mut slot) = guard.take() else {
                // Lost the race with a remover; the entry is dead and the
                // key table has moved on, so look the key up again
                continue;
            };

            if slot.is_expired() {
                // Expired while nobody was looking. The write observes the
                // same state a brand-new key would have.
                self.expired_count.fetch_add(1, Ordering::Relaxed);
                slot = Slot::new(Value::Hash(HashTable::new()));
            }

            let result = f(&mut slot);

            if slot.is_vacant_hash() {
                // Guard already holds the tombstone from take()
                drop(guard);
                self.detach(key, &entry);
            } else {
                *guard = Some(slot);
            }

            return result;
        }
    }

    /// Runs `f` under the key's exclusive guard only when the key is
    /// present and live. Returns `None` without calling `f` otherwise.
    fn update_slot<R>(&self, key: &[u8], f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        let entry = self.lookup(key)?;
        let mut guard = entry.slot.write().unwrap();

        let Some(mut slot) = guard.take() else {
            // Deleted while we waited for the guard
            return None;
        };

        if slot.is_expired() {
            // Keep the tombstone from take() and detach the dead entry
            drop(guard);
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            self.detach(key, &entry);
            return None;
        }

        if slot.is_vacant_hash() {
            // Another writer's creation window; not ours to touch
            *guard = Some(slot);
            return None;
        }

        let result = f(&mut slot);

        if slot.is_vacant_hash() {
            // The update removed the last field; the key goes with it
            drop(guard);
            self.detach(key, &entry);
        } else {
            *guard = Some(slot);
        }

        Some(result)
    }

    /// Detaches an entry whose deadline was observed to have passed.
    ///
    /// Re-checks under the write guard: a concurrent write may have
    /// reset the key, or another remover may have taken the slot already.
    fn remove_expired(&self, key: &[u8], entry: &Arc<KeyEntry>) {
        let mut guard = entry.slot.write().unwrap();
        if !guard.as_ref().is_some_and(Slot::is_expired) {
            return;
        }
        guard.take();
        drop(guard);
        self.expired_count.fetch_add(1, Ordering::Relaxed);
        self.detach(key, entry);
    }

    /// Non-blocking variant of [`Self::remove_expired`] for the sweep.
    ///
    /// Returns `true` when the entry was removed. A busy guard means a
    /// command is working on the key right now, and that command's own
    /// expiry check will deal with the deadline.
    fn try_remove_expired(&self, key: &[u8], entry: &Arc<KeyEntry>) -> bool {
        let Ok(mut guard) = entry.slot.try_write() else {
            return false;
        };
        if !guard.as_ref().is_some_and(Slot::is_expired) {
            return false;
        }
        guard.take();
        drop(guard);
        self.expired_count.fetch_add(1, Ordering::Relaxed);
        self.detach(key, entry);
        true
    }

    // ========================================================================
    // HASH OPERATIONS
    // ========================================================================

    /// Sets fields on the hash stored at `key`, creating the hash if the
    /// key is absent.
    ///
    /// Later pairs win when the same field appears more than once. All
    /// pairs land under a single guard acquisition: concurrent readers
    /// see either none of them or all of them.
    ///
    /// # Returns
    ///
    /// The number of fields that did not exist before, or `WrongType`
    /// when the key holds a non-hash value (in which case nothing is
    /// written).
    pub fn hset(&self, key: Bytes, pairs: Vec<(Bytes, Bytes)>) -> StoreResult<u64> {
        self.write_slot(&key, |slot| {
            let table = slot.value.as_hash_mut()?;
            let mut created = 0u64;
            for (field, value) in pairs {
                if table.insert(field, value) {
                    created += 1;
                }
            }
            Ok(created)
        })
    }

    /// Gets the value of one field.
    ///
    /// Returns `None` when the key or the field is absent; absence is not
    /// an error.
    pub fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Bytes>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(None),
            Some(slot) => Ok(slot.value.as_hash()?.get(field).cloned()),
        })
    }

    /// Gets the values of several fields, in request order.
    ///
    /// Absent fields come back as `None` in their position. An absent key
    /// yields all `None`.
    pub fn hmget(&self, key: &[u8], fields: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(vec![None; fields.len()]),
            Some(slot) => {
                let table = slot.value.as_hash()?;
                Ok(fields.iter().map(|field| table.get(field).cloned()).collect())
            }
        })
    }

    /// Returns every field/value pair of the hash at `key`.
    ///
    /// The snapshot is consistent: it is taken under the key's shared
    /// guard, so no concurrent write can be half-visible in it. An absent
    /// key yields an empty vector.
    pub fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Bytes, Bytes)>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(Vec::new()),
            Some(slot) => {
                let table = slot.value.as_hash()?;
                Ok(table.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            }
        })
    }

    /// Returns every field name of the hash at `key`.
    pub fn hkeys(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(Vec::new()),
            Some(slot) => Ok(slot.value.as_hash()?.field_names().cloned().collect()),
        })
    }

    /// Returns every value of the hash at `key`.
    ///
    /// Between two writes, repeated calls traverse the table in the same
    /// order, and that order matches what [`Self::hgetall`] and
    /// [`Self::hkeys`] report.
    pub fn hvals(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(Vec::new()),
            Some(slot) => Ok(slot.value.as_hash()?.values().cloned().collect()),
        })
    }

    /// Number of fields in the hash at `key`, 0 when the key is absent.
    pub fn hlen(&self, key: &[u8]) -> StoreResult<u64> {
        self.read_slot(key, |slot| match slot {
            None => Ok(0),
            Some(slot) => Ok(slot.value.as_hash()?.len() as u64),
        })
    }

    /// Whether `field` exists in the hash at `key`.
    pub fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        self.read_slot(key, |slot| match slot {
            None => Ok(false),
            Some(slot) => Ok(slot.value.as_hash()?.contains(field)),
        })
    }

    /// Removes fields from the hash at `key`.
    ///
    /// Removing the last field removes the key itself. Absent fields and
    /// an absent key simply count for nothing.
    ///
    /// # Returns
    ///
    /// The number of fields actually removed.
    pub fn hdel(&self, key: &[u8], fields: &[Bytes]) -> StoreResult<u64> {
        self.update_slot(key, |slot| {
            let table = slot.value.as_hash_mut()?;
            let mut removed = 0u64;
            for field in fields {
                if table.remove(field).is_some() {
                    removed += 1;
                }
            }
            Ok(removed)
        })
        .unwrap_or(Ok(0))
    }

    /// Atomically adds `delta` to the integer stored at `field`.
    ///
    /// An absent key or field reads as 0 before the addition. The read,
    /// the addition and the write-back happen under one exclusive guard
    /// acquisition, so concurrent increments never lose updates.
    ///
    /// # Returns
    ///
    /// The value after the addition. Fails with `NotAnInteger` when the
    /// stored value does not parse as a signed 64-bit integer or the
    /// addition would overflow one; the stored value is left untouched in
    /// both cases.
    pub fn hincrby(&self, key: Bytes, field: Bytes, delta: i64) -> StoreResult<i64> {
        self.write_slot(&key, |slot| {
            let table = slot.value.as_hash_mut()?;
            let current = table.read_numeric(&field)?;
            let updated = current
                .checked_add(delta)
                .ok_or(StoreError::NotAnInteger)?;
            table.insert(field, Bytes::from(updated.to_string()));
            Ok(updated)
        })
    }

    // ========================================================================
    // KEY OPERATIONS
    // ========================================================================

    /// Stores `value` under `key`, replacing whatever was there and
    /// clearing any expiry.
    ///
    /// Storing an empty hash is the same as deleting the key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was absent before, `false` when an
    /// existing value was replaced.
    pub fn put(&self, key: Bytes, value: Value) -> bool {
        self.write_slot(&key, |slot| {
            let was_absent = slot.is_vacant_hash();
            *slot = Slot::new(value);
            was_absent
        })
    }

    /// Returns a snapshot clone of the hash stored at `key`.
    ///
    /// `Ok(None)` when the key is absent; `WrongType` when the key holds
    /// a non-hash value.
    pub fn get(&self, key: &[u8]) -> StoreResult<Option<HashTable>> {
        self.read_slot(key, |slot| match slot {
            None => Ok(None),
            Some(slot) => Ok(Some(slot.value.as_hash()?.clone())),
        })
    }

    /// Returns a clone of the whole value stored at `key`, whatever its
    /// kind.
    pub fn get_value(&self, key: &[u8]) -> Option<Value> {
        self.read_slot(key, |slot| slot.map(|slot| slot.value.clone()))
    }

    /// Reports the kind of value stored at `key`, `None` when absent.
    pub fn kind(&self, key: &[u8]) -> Option<ValueKind> {
        self.read_slot(key, |slot| slot.map(|slot| slot.value.kind()))
    }

    /// Checks if a key exists (present, live, and not an empty hash).
    pub fn exists(&self, key: &[u8]) -> bool {
        self.read_slot(key, |slot| slot.is_some())
    }

    /// Counts how many of the given keys exist.
    pub fn exists_many(&self, keys: &[Bytes]) -> u64 {
        keys.iter().filter(|key| self.exists(key)).count() as u64
    }

    /// Deletes a key.
    ///
    /// Waits for a command already inside the key's critical section to
    /// finish, then takes the slot. A command that raced the delete finds
    /// the tombstone and observes the key as removed.
    ///
    /// # Returns
    ///
    /// Returns `true` if a live key was deleted, `false` if it did not
    /// exist.
    pub fn delete(&self, key: &[u8]) -> bool {
        let Some(entry) = self.lookup(key) else {
            return false;
        };

        let taken = entry.slot.write().unwrap().take();
        self.detach(key, &entry);

        match taken {
            // Another remover beat us to the slot
            None => false,
            Some(slot) => {
                if slot.is_expired() {
                    self.expired_count.fetch_add(1, Ordering::Relaxed);
                    false
                } else {
                    !slot.is_vacant_hash()
                }
            }
        }
    }

    /// Deletes multiple keys.
    ///
    /// # Returns
    ///
    /// Returns the number of keys that were deleted.
    pub fn delete_many(&self, keys: &[Bytes]) -> u64 {
        let mut deleted = 0;
        for key in keys {
            if self.delete(key) {
                deleted += 1;
            }
        }
        deleted
    }

    /// Sets an expiry deadline `ttl` from now on an existing key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the deadline was set, `false` if the key does
    /// not exist.
    pub fn expire(&self, key: &[u8], ttl: Duration) -> bool {
        self.expire_at(key, Instant::now() + ttl)
    }

    /// Sets an absolute expiry deadline on an existing key.
    pub fn expire_at(&self, key: &[u8], deadline: Instant) -> bool {
        self.update_slot(key, |slot| {
            slot.expires_at = Some(deadline);
            true
        })
        .unwrap_or(false)
    }

    /// Removes the expiry from a key (makes it persistent).
    ///
    /// # Returns
    ///
    /// Returns `true` if an expiry was removed, `false` if the key does
    /// not exist or had none.
    pub fn persist(&self, key: &[u8]) -> bool {
        self.update_slot(key, |slot| slot.expires_at.take().is_some())
            .unwrap_or(false)
    }

    /// Gets the remaining time to live for a key, in whole seconds.
    ///
    /// # Returns
    ///
    /// - `Some(seconds)` if the key exists and has an expiry
    /// - `Some(-1)` if the key exists but has no expiry
    /// - `None` if the key does not exist
    pub fn ttl(&self, key: &[u8]) -> Option<i64> {
        self.read_slot(key, |slot| {
            slot.map(|slot| match slot.ttl() {
                Some(left) => left.as_secs() as i64,
                None => -1,
            })
        })
    }

    /// Gets the remaining time to live for a key, in milliseconds.
    pub fn pttl(&self, key: &[u8]) -> Option<i64> {
        self.read_slot(key, |slot| {
            slot.map(|slot| match slot.ttl() {
                Some(left) => left.as_millis() as i64,
                None => -1,
            })
        })
    }

    // ========================================================================
    // MAINTENANCE
    // ========================================================================

    /// Clears all keys.
    ///
    /// Each entry is tombstoned after leaving the table, so commands
    /// already holding an entry observe the removal. Keys created while
    /// the flush walks the shards may survive it.
    pub fn flush(&self) {
        for shard in &self.shards {
            let drained: Vec<Arc<KeyEntry>> = {
                let mut entries = shard.entries.write().unwrap();
                self.key_count
                    .fetch_sub(entries.len() as u64, Ordering::Relaxed);
                entries.drain().map(|(_, entry)| entry).collect()
            };
            for entry in drained {
                entry.slot.write().unwrap().take();
            }
        }
    }

    /// Returns the approximate number of keys in the keyspace.
    ///
    /// This is an approximation because it uses relaxed atomic ordering
    /// and counts keys whose creation is still in flight.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    /// Returns true if the keyspace is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns keyspace statistics.
    pub fn stats(&self) -> KeySpaceStats {
        KeySpaceStats {
            keys: self.key_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }

    /// Removes a bounded batch of expired keys.
    ///
    /// This is the active half of expiry, called periodically by the
    /// background sweeper. It walks a few shards per call (continuing
    /// where the previous call left off), samples entries with
    /// non-blocking guard peeks, and never waits on a contended guard,
    /// so foreground commands keep their latency.
    pub fn sweep_expired(&self, limits: &SweepLimits) -> SweepOutcome {
        let started = Instant::now();
        let mut outcome = SweepOutcome::default();

        for _ in 0..limits.shards_per_sweep.min(NUM_SHARDS) {
            if started.elapsed() >= limits.time_budget {
                break;
            }

            let index = self.sweep_cursor.fetch_add(1, Ordering::Relaxed) % NUM_SHARDS;

            // Collect candidates under the shard read lock with guard
            // peeks only; actual removal happens after the shard lock is
            // released, per the lock discipline.
            let mut doomed: Vec<(Bytes, Arc<KeyEntry>)> = Vec::new();
            {
                let entries = self.shards[index].entries.read().unwrap();
                for (key, entry) in entries.iter().take(limits.samples_per_shard) {
                    outcome.scanned += 1;
                    if let Ok(guard) = entry.slot.try_read() {
                        if guard.as_ref().is_some_and(Slot::is_expired) {
                            doomed.push((key.clone(), Arc::clone(entry)));
                        }
                    }
                }
            }

            for (key, entry) in doomed {
                if self.try_remove_expired(&key, &entry) {
                    outcome.removed += 1;
                }
            }
        }

        outcome
    }
}
