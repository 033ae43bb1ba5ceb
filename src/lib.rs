//! # FieldKV - An Embedded Hash-Field Key-Value Store
//!
//! FieldKV is an embeddable, concurrent key-value store core where every
//! value is a hash: a table of field-value pairs addressed field by field,
//! in the manner of Redis hashes. It demonstrates systems programming
//! concepts like fine-grained locking, concurrent data structures, and
//! background expiry.
//!
//! ## Features
//!
//! - **Hash Values**: Read and write individual fields without touching the rest
//! - **Per-Key Serialization**: Commands on one key apply atomically, one at a time
//! - **High Concurrency**: Sharded keyspace plus per-key locks; different keys never block
//! - **TTL Support**: Keys can have expiry times with automatic cleanup
//! - **Embeddable**: A library core with a typed command surface, no sockets attached
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              FieldKV                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐                                     │
//! │  │  Embedding  │───>│  Command    │                                     │
//! │  │ Application │    │  Executor   │                                     │
//! │  └─────────────┘    └──────┬──────┘                                     │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                     ┌──────────────────────────────────────────────┐    │
//! │                     │                 KeySpace                     │    │
//! │                     │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │    │
//! │                     │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │    │
//! │                     │  │RwLock  │ │RwLock  │ │RwLock  │ │shards  │ │    │
//! │                     │  └───┬────┘ └────────┘ └────────┘ └────────┘ │    │
//! │                     │      │  per-key entries, each with its own   │    │
//! │                     │      ▼  slot lock guarding the hash table    │    │
//! │                     │  ┌────────┐ ┌────────┐                       │    │
//! │                     │  │KeyEntry│ │KeyEntry│ ...                   │    │
//! │                     │  └────────┘ └────────┘                       │    │
//! │                     └──────────────────────────────────────────────┘    │
//! │                                            ▲                            │
//! │                                            │                            │
//! │                     ┌──────────────────────┴──────────────────────┐     │
//! │                     │               ExpirySweeper                 │     │
//! │                     │          (Background Tokio Task)            │     │
//! │                     └─────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use fieldkv::commands::{Command, CommandExecutor, Reply};
//! use fieldkv::storage::{start_expiry_sweeper, KeySpace};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create the keyspace
//!     let keyspace = Arc::new(KeySpace::new());
//!
//!     // Start the background expiry sweeper
//!     let _sweeper = start_expiry_sweeper(Arc::clone(&keyspace));
//!
//!     // Execute commands through the typed surface
//!     let executor = CommandExecutor::new(Arc::clone(&keyspace));
//!
//!     executor
//!         .execute(Command::hset("user:1000", ["name", "gyubin", "age", "31"]))
//!         .unwrap();
//!
//!     let reply = executor.execute(Command::hget("user:1000", "name")).unwrap();
//!     assert_eq!(reply, Reply::bulk("gyubin"));
//!
//!     let hits = executor
//!         .execute(Command::hincrby("user:1000", "visits", 1))
//!         .unwrap();
//!     assert_eq!(hits, Reply::integer(1));
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### Hash Commands
//! - `HSET key field value [field value ...]`
//! - `HGET key field`
//! - `HMGET key field [field ...]`
//! - `HGETALL key`
//! - `HKEYS key` / `HVALS key`
//! - `HDEL key field [field ...]`
//! - `HEXISTS key field`
//! - `HLEN key`
//! - `HINCRBY key field increment`
//!
//! ### Key Commands
//! - `DEL key [key ...]`
//! - `EXISTS key [key ...]`
//! - `EXPIRE key seconds` / `PEXPIRE key milliseconds`
//! - `TTL key` / `PTTL key`
//! - `PERSIST key`
//!
//! ## Module Overview
//!
//! - [`storage`]: Sharded keyspace, hash tables and the expiry sweeper
//! - [`commands`]: Typed command vocabulary and the executor
//! - [`error`]: The error surface shared by every operation
//!
//! ## Design Highlights
//!
//! ### Per-Key Serialization
//!
//! Locking is two-level: 64 shard locks protect the key map itself, and a
//! per-key lock guards each key's hash table. Shard locks are held only
//! for lookup and insert, never across a command body, so commands on
//! different keys run concurrently while commands on one key apply in a
//! single total order.
//!
//! ### Zero-Copy Values
//!
//! Keys, fields and values are `bytes::Bytes`. Read replies hand back
//! reference-counted slices of the stored data, and lookups borrow as
//! `&[u8]` without allocating.
//!
//! ### Lazy + Active Expiry
//!
//! Keys with TTL are expired in two ways:
//! 1. **Lazy**: When a key is accessed, we check if it's expired
//! 2. **Active**: A background task periodically scans for expired keys
//!
//! This ensures memory is reclaimed even for keys that are never accessed again.

pub mod commands;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{Command, CommandExecutor, Reply};
pub use error::{StoreError, StoreResult};
pub use storage::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper, KeySpace};

/// Version of FieldKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
