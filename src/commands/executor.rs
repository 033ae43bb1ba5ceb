//! Command Executor Module
//!
//! This module maps parsed [`Command`]s onto keyspace operations and
//! shapes the results into [`Reply`]s. It owns the argument validation
//! that is independent of storage state (arity, pairing), while type
//! checks happen inside the keyspace where the value is visible.
//!
//! ## Supported Commands
//!
//! ### Hash Commands
//! - `HSET key field value [field value ...]` - Set hash fields
//! - `HGET key field` - Get one field
//! - `HMGET key field [field ...]` - Get several fields
//! - `HGETALL key` - Get all fields and values
//! - `HKEYS key` - Get all field names
//! - `HVALS key` - Get all values
//! - `HDEL key field [field ...]` - Remove fields
//! - `HEXISTS key field` - Check for a field
//! - `HLEN key` - Count fields
//! - `HINCRBY key field increment` - Add to an integer field
//!
//! ### Key Commands
//! - `DEL key [key ...]` - Delete keys
//! - `EXISTS key [key ...]` - Count existing keys
//! - `EXPIRE key seconds` / `PEXPIRE key milliseconds` - Set expiry
//! - `TTL key` / `PTTL key` - Get remaining expiry
//! - `PERSIST key` - Remove expiry
//!
//! ## Error Semantics
//!
//! A command either applies in full or returns an error without touching
//! the keyspace. Absence is never an error: missing keys and fields come
//! back as nil replies, empty arrays or zero counts. Validation failures
//! (`Arity`), type mismatches (`WrongType`) and numeric failures
//! (`NotAnInteger`) are the only error paths.

use crate::commands::types::{Command, Reply};
use crate::error::{StoreError, StoreResult};
use crate::storage::KeySpace;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Executes commands against a shared keyspace.
///
/// Cloning is cheap; clones share the same keyspace, so one executor can
/// be handed to every worker task.
#[derive(Clone)]
pub struct CommandExecutor {
    /// The keyspace all commands operate on
    keyspace: Arc<KeySpace>,
}

impl CommandExecutor {
    /// Creates a new executor over the given keyspace.
    pub fn new(keyspace: Arc<KeySpace>) -> Self {
        Self { keyspace }
    }

    /// The keyspace this executor operates on.
    pub fn keyspace(&self) -> &Arc<KeySpace> {
        &self.keyspace
    }

    /// Executes a command and returns its reply.
    ///
    /// Every command is synchronous and self-contained: by the time this
    /// returns, the operation has fully happened (or fully not happened).
    pub fn execute(&self, command: Command) -> StoreResult<Reply> {
        trace!(command = command.name(), "Executing command");

        match command {
            Command::HSet { key, field_values } => self.cmd_hset(key, field_values),
            Command::HGet { key, field } => self.cmd_hget(key, field),
            Command::HMGet { key, fields } => self.cmd_hmget(key, fields),
            Command::HGetAll { key } => self.cmd_hgetall(key),
            Command::HKeys { key } => self.cmd_hkeys(key),
            Command::HVals { key } => self.cmd_hvals(key),
            Command::HDel { key, fields } => self.cmd_hdel(key, fields),
            Command::HExists { key, field } => self.cmd_hexists(key, field),
            Command::HLen { key } => self.cmd_hlen(key),
            Command::HIncrBy { key, field, delta } => self.cmd_hincrby(key, field, delta),
            Command::Del { keys } => self.cmd_del(keys),
            Command::Exists { keys } => self.cmd_exists(keys),
            Command::Expire { key, seconds } => {
                self.cmd_expire(key, Duration::from_secs(seconds))
            }
            Command::PExpire { key, millis } => {
                self.cmd_expire(key, Duration::from_millis(millis))
            }
            Command::Ttl { key } => self.cmd_ttl(key, false),
            Command::PTtl { key } => self.cmd_ttl(key, true),
            Command::Persist { key } => self.cmd_persist(key),
        }
    }

    // ========================================================================
    // Hash Commands
    // ========================================================================

    /// HSET key field value [field value ...]
    fn cmd_hset(&self, key: Bytes, field_values: Vec<Bytes>) -> StoreResult<Reply> {
        if field_values.is_empty() || field_values.len() % 2 != 0 {
            return Err(StoreError::Arity("hset"));
        }

        let mut pairs = Vec::with_capacity(field_values.len() / 2);
        let mut args = field_values.into_iter();
        while let (Some(field), Some(value)) = (args.next(), args.next()) {
            pairs.push((field, value));
        }

        let created = self.keyspace.hset(key, pairs)?;
        Ok(Reply::Integer(created as i64))
    }

    /// HGET key field
    fn cmd_hget(&self, key: Bytes, field: Bytes) -> StoreResult<Reply> {
        Ok(Reply::Bulk(self.keyspace.hget(&key, &field)?))
    }

    /// HMGET key field [field ...]
    fn cmd_hmget(&self, key: Bytes, fields: Vec<Bytes>) -> StoreResult<Reply> {
        if fields.is_empty() {
            return Err(StoreError::Arity("hmget"));
        }
        Ok(Reply::NullableArray(self.keyspace.hmget(&key, &fields)?))
    }

    /// HGETALL key
    ///
    /// The reply flattens the snapshot into alternating field, value
    /// positions.
    fn cmd_hgetall(&self, key: Bytes) -> StoreResult<Reply> {
        let pairs = self.keyspace.hgetall(&key)?;
        let mut flat = Vec::with_capacity(pairs.len() * 2);
        for (field, value) in pairs {
            flat.push(field);
            flat.push(value);
        }
        Ok(Reply::Array(flat))
    }

    /// HKEYS key
    fn cmd_hkeys(&self, key: Bytes) -> StoreResult<Reply> {
        Ok(Reply::Array(self.keyspace.hkeys(&key)?))
    }

    /// HVALS key
    fn cmd_hvals(&self, key: Bytes) -> StoreResult<Reply> {
        Ok(Reply::Array(self.keyspace.hvals(&key)?))
    }

    /// HDEL key field [field ...]
    fn cmd_hdel(&self, key: Bytes, fields: Vec<Bytes>) -> StoreResult<Reply> {
        if fields.is_empty() {
            return Err(StoreError::Arity("hdel"));
        }
        let removed = self.keyspace.hdel(&key, &fields)?;
        Ok(Reply::Integer(removed as i64))
    }

    /// HEXISTS key field
    fn cmd_hexists(&self, key: Bytes, field: Bytes) -> StoreResult<Reply> {
        let found = self.keyspace.hexists(&key, &field)?;
        Ok(Reply::Integer(i64::from(found)))
    }

    /// HLEN key
    fn cmd_hlen(&self, key: Bytes) -> StoreResult<Reply> {
        Ok(Reply::Integer(self.keyspace.hlen(&key)? as i64))
    }

    /// HINCRBY key field increment
    fn cmd_hincrby(&self, key: Bytes, field: Bytes, delta: i64) -> StoreResult<Reply> {
        Ok(Reply::Integer(self.keyspace.hincrby(key, field, delta)?))
    }

    // ========================================================================
    // Key Commands
    // ========================================================================

    /// DEL key [key ...]
    fn cmd_del(&self, keys: Vec<Bytes>) -> StoreResult<Reply> {
        if keys.is_empty() {
            return Err(StoreError::Arity("del"));
        }
        Ok(Reply::Integer(self.keyspace.delete_many(&keys) as i64))
    }

    /// EXISTS key [key ...]
    fn cmd_exists(&self, keys: Vec<Bytes>) -> StoreResult<Reply> {
        if keys.is_empty() {
            return Err(StoreError::Arity("exists"));
        }
        Ok(Reply::Integer(self.keyspace.exists_many(&keys) as i64))
    }

    /// EXPIRE key seconds / PEXPIRE key milliseconds
    fn cmd_expire(&self, key: Bytes, ttl: Duration) -> StoreResult<Reply> {
        let applied = self.keyspace.expire(&key, ttl);
        Ok(Reply::Integer(i64::from(applied)))
    }

    /// TTL key / PTTL key
    ///
    /// Replies -2 when the key does not exist and -1 when it has no
    /// expiry, matching the Redis conventions.
    fn cmd_ttl(&self, key: Bytes, millis: bool) -> StoreResult<Reply> {
        let remaining = if millis {
            self.keyspace.pttl(&key)
        } else {
            self.keyspace.ttl(&key)
        };
        Ok(Reply::Integer(remaining.unwrap_or(-2)))
    }

    /// PERSIST key
    fn cmd_persist(&self, key: Bytes) -> StoreResult<Reply> {
        let removed = self.keyspace.persist(&key);
        Ok(Reply::Integer(i64::from(removed)))
    }
}
