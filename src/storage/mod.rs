//! Storage Module
//!
//! This module provides the storage core of FieldKV: a thread-safe,
//! sharded keyspace of hash-field values with TTL support and a
//! background expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KeySpace                             │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └────┬────┘ └────┬────┘ └─────────┘ └─────────┘           │
//! │       │           │                                         │
//! │       ▼           ▼                                         │
//! │  ┌─────────┐ ┌─────────┐     one KeyEntry per key,         │
//! │  │KeyEntry │ │KeyEntry │     each with its own slot         │
//! │  │ RwLock  │ │ RwLock  │     lock for command bodies        │
//! │  └─────────┘ └─────────┘                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Keyspace**: 64 independent shards reduce lock contention
//! - **Per-Key Locks**: Commands on different keys never block each other
//! - **Hash Values**: Each key holds a field table, addressed field by field
//! - **TTL Support**: Whole keys can have time-to-live expiry
//! - **Lazy Expiry**: Expired keys are cleaned on access
//! - **Active Expiry**: Background sweeper cleans orphaned expired keys
//!
//! ## Example
//!
//! ```
//! use fieldkv::storage::KeySpace;
//! use bytes::Bytes;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let keyspace = Arc::new(KeySpace::new());
//!
//! // Hash operations
//! keyspace.hset(
//!     Bytes::from("user:1000"),
//!     vec![(Bytes::from("name"), Bytes::from("gyubin"))],
//! ).unwrap();
//! let name = keyspace.hget(b"user:1000", b"name").unwrap();
//! assert_eq!(name, Some(Bytes::from("gyubin")));
//!
//! // Key-level expiry
//! keyspace.expire(b"user:1000", Duration::from_secs(3600));
//! ```

pub mod expiry;
pub mod keyspace;
pub mod slot;

// Re-export commonly used types
pub use expiry::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper, SweepPacing};
pub use keyspace::{KeySpace, KeySpaceStats, SweepLimits, SweepOutcome};
pub use slot::{HashTable, Value, ValueKind};
