//! Value slots and per-key guard cells.
//!
//! Every key in the keyspace owns one [`KeyEntry`]: a slot protected by
//! its own `RwLock`. That lock is the key's guard. Writers hold it
//! exclusively, readers share it, and commands on other keys never touch
//! it. A `None` slot is a tombstone left behind by delete, expiry or
//! flush so that a command racing with the removal cannot resurrect dead
//! state.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::{StoreError, StoreResult};

/// A hash stored under one key: a map from field names to opaque values.
///
/// Fields are unique; a field is either absent or maps to exactly one
/// value. Values are raw byte sequences and the store never interprets
/// them. Iteration order is unspecified but stays fixed while the table
/// is not mutated, so repeated full reads between writes agree with each
/// other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTable {
    fields: HashMap<Bytes, Bytes>,
}

impl HashTable {
    /// Creates an empty hash table.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Returns the value stored under `field`, if any.
    pub fn get(&self, field: &[u8]) -> Option<&Bytes> {
        self.fields.get(field)
    }

    /// Inserts or overwrites a field.
    ///
    /// Returns `true` when the field did not exist before.
    pub fn insert(&mut self, field: Bytes, value: Bytes) -> bool {
        self.fields.insert(field, value).is_none()
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, field: &[u8]) -> Option<Bytes> {
        self.fields.remove(field)
    }

    /// Returns true when `field` is present.
    pub fn contains(&self, field: &[u8]) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields in the table.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the table holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over field/value pairs in the table's traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.fields.iter()
    }

    /// Iterates over field names.
    pub fn field_names(&self) -> impl Iterator<Item = &Bytes> {
        self.fields.keys()
    }

    /// Iterates over values.
    pub fn values(&self) -> impl Iterator<Item = &Bytes> {
        self.fields.values()
    }

    /// Reads a field as a base-10 signed 64-bit integer.
    ///
    /// An absent field reads as 0. Anything that does not parse as an
    /// `i64`, including empty or non-UTF-8 bytes, fails with
    /// [`StoreError::NotAnInteger`].
    pub fn read_numeric(&self, field: &[u8]) -> StoreResult<i64> {
        match self.fields.get(field) {
            None => Ok(0),
            Some(raw) => std::str::from_utf8(raw)
                .ok()
                .and_then(|text| text.parse::<i64>().ok())
                .ok_or(StoreError::NotAnInteger),
        }
    }
}

impl FromIterator<(Bytes, Bytes)> for HashTable {
    fn from_iter<I: IntoIterator<Item = (Bytes, Bytes)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// The typed content of a key's slot.
///
/// The keyspace is typed: a key holds exactly one kind of value, and an
/// operation against the wrong kind fails with [`StoreError::WrongType`]
/// instead of coercing. `Scalar` covers the plain byte-string kind owned
/// by other command families; the store keeps it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A field/value hash table.
    Hash(HashTable),
    /// An opaque byte value.
    Scalar(Bytes),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Hash(_) => ValueKind::Hash,
            Value::Scalar(_) => ValueKind::Scalar,
        }
    }

    /// Borrows the hash table, or fails with `WrongType`.
    pub fn as_hash(&self) -> StoreResult<&HashTable> {
        match self {
            Value::Hash(table) => Ok(table),
            _ => Err(StoreError::WrongType),
        }
    }

    /// Mutably borrows the hash table, or fails with `WrongType`.
    pub fn as_hash_mut(&mut self) -> StoreResult<&mut HashTable> {
        match self {
            Value::Hash(table) => Ok(table),
            _ => Err(StoreError::WrongType),
        }
    }
}

/// Discriminant of a [`Value`], reported by key introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Hash,
    Scalar,
}

impl ValueKind {
    /// The conventional type name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Hash => "hash",
            ValueKind::Scalar => "string",
        }
    }
}

/// A live slot: the value plus its optional expiry deadline.
#[derive(Debug)]
pub(crate) struct Slot {
    pub value: Value,
    /// Absolute deadline after which the key is logically absent.
    pub expires_at: Option<Instant>,
}

impl Slot {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Checks whether the deadline has passed.
    #[inline]
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Remaining lifetime, `None` when no expiry is set.
    pub fn ttl(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True when the slot holds a hash with no fields left.
    ///
    /// An empty hash is indistinguishable from an absent key: mutations
    /// that empty a table detach the entry, and reads treat the transient
    /// empty state as absence.
    pub fn is_vacant_hash(&self) -> bool {
        matches!(&self.value, Value::Hash(table) if table.is_empty())
    }
}

/// One key's entry in the keyspace: the per-key guard around its slot.
///
/// `None` means the entry has been detached by delete, expiry or flush.
/// The tombstone is terminal: an entry never goes back from `None` to
/// `Some`, which is what makes "saw a tombstone" safe to act on without
/// re-checking.
#[derive(Debug)]
pub(crate) struct KeyEntry {
    pub slot: RwLock<Option<Slot>>,
}

impl KeyEntry {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot: RwLock::new(Some(slot)),
        }
    }

    /// A fresh entry holding an empty hash, the state a key is born in
    /// before its first field write lands.
    pub fn vacant_hash() -> Self {
        Self::new(Slot::new(Value::Hash(HashTable::new())))
    }

    /// Non-blocking tombstone check. Errs on the side of "live" when the
    /// guard is contended; callers that care re-check under the guard.
    pub fn is_tombstoned(&self) -> bool {
        match self.slot.try_read() {
            Ok(guard) => guard.is_none(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_insert_reports_new_fields() {
        let mut table = HashTable::new();
        assert!(table.insert(Bytes::from("name"), Bytes::from("gyubin")));
        assert!(!table.insert(Bytes::from("name"), Bytes::from("kim")));
        assert_eq!(table.get(b"name"), Some(&Bytes::from("kim")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_returns_old_value() {
        let mut table = HashTable::new();
        table.insert(Bytes::from("age"), Bytes::from("31"));
        assert_eq!(table.remove(b"age"), Some(Bytes::from("31")));
        assert_eq!(table.remove(b"age"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_read_numeric_absent_field_is_zero() {
        let table = HashTable::new();
        assert_eq!(table.read_numeric(b"visitors"), Ok(0));
    }

    #[test]
    fn test_read_numeric_parses_signed_values() {
        let mut table = HashTable::new();
        table.insert(Bytes::from("balance"), Bytes::from("-42"));
        assert_eq!(table.read_numeric(b"balance"), Ok(-42));
    }

    #[test]
    fn test_read_numeric_rejects_garbage() {
        let mut table = HashTable::new();
        table.insert(Bytes::from("a"), Bytes::from("12.5"));
        table.insert(Bytes::from("b"), Bytes::from("ten"));
        table.insert(Bytes::from("c"), Bytes::from(""));
        table.insert(Bytes::from("d"), Bytes::from(&[0xff, 0xfe][..]));
        for field in [b"a", b"b", b"c", b"d"] {
            assert_eq!(table.read_numeric(field), Err(StoreError::NotAnInteger));
        }
    }

    #[test]
    fn test_value_kind_and_borrows() {
        let mut hash = Value::Hash(HashTable::new());
        assert_eq!(hash.kind(), ValueKind::Hash);
        assert!(hash.as_hash().is_ok());
        assert!(hash.as_hash_mut().is_ok());

        let mut scalar = Value::Scalar(Bytes::from("plain"));
        assert_eq!(scalar.kind(), ValueKind::Scalar);
        assert_eq!(scalar.as_hash().unwrap_err(), StoreError::WrongType);
        assert_eq!(scalar.as_hash_mut().unwrap_err(), StoreError::WrongType);
        assert_eq!(ValueKind::Scalar.as_str(), "string");
        assert_eq!(ValueKind::Hash.as_str(), "hash");
    }

    #[test]
    fn test_slot_expiry_deadline() {
        let mut slot = Slot::new(Value::Scalar(Bytes::from("v")));
        assert!(!slot.is_expired());
        assert_eq!(slot.ttl(), None);

        slot.expires_at = Some(Instant::now() + Duration::from_millis(20));
        assert!(!slot.is_expired());
        assert!(slot.ttl().unwrap() <= Duration::from_millis(20));

        thread::sleep(Duration::from_millis(30));
        assert!(slot.is_expired());
        assert_eq!(slot.ttl(), Some(Duration::ZERO));
    }

    #[test]
    fn test_vacant_hash_detection() {
        let slot = Slot::new(Value::Hash(HashTable::new()));
        assert!(slot.is_vacant_hash());

        let filled = Slot::new(Value::Hash(HashTable::from_iter([(
            Bytes::from("f"),
            Bytes::from("v"),
        )])));
        assert!(!filled.is_vacant_hash());

        let scalar = Slot::new(Value::Scalar(Bytes::from("v")));
        assert!(!scalar.is_vacant_hash());
    }

    #[test]
    fn test_tombstone_is_observable() {
        let entry = KeyEntry::vacant_hash();
        assert!(!entry.is_tombstoned());
        entry.slot.write().unwrap().take();
        assert!(entry.is_tombstoned());
    }
}
