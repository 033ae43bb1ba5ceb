//! Command Module
//!
//! This module implements the command layer of FieldKV. It defines the
//! typed command and reply vocabulary, and the executor that runs
//! commands against the keyspace.
//!
//! ## Architecture
//!
//! ```text
//! Caller (embedding application)
//!       │
//!       ▼
//! ┌─────────────────┐
//! │    Command      │  (typed request, this module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandExecutor │  (this module)
//! │                 │
//! │  - Validate     │
//! │  - Dispatch     │
//! │  - Shape reply  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    KeySpace     │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! ### Hash Commands
//! - `HSET`, `HGET`, `HMGET`, `HGETALL`
//! - `HKEYS`, `HVALS`, `HDEL`
//! - `HEXISTS`, `HLEN`, `HINCRBY`
//!
//! ### Key Commands
//! - `DEL`, `EXISTS`
//! - `EXPIRE`, `PEXPIRE`
//! - `TTL`, `PTTL`, `PERSIST`

pub mod executor;
pub mod types;

// Re-export the command vocabulary and executor
pub use executor::CommandExecutor;
pub use types::{Command, Reply};
