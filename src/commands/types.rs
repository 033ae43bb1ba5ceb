//! Command and Reply Types
//!
//! This module defines the request and response shapes of the command
//! layer. A [`Command`] is a fully-parsed operation; how it got parsed
//! (wire protocol, test harness, embedding application) is not this
//! crate's business. A [`Reply`] is the successful result, shaped so a
//! protocol front end can serialize it without consulting the store.
//!
//! ## Conventions
//!
//! - Counting commands (HSET, HDEL, DEL, EXISTS) reply with `Integer`.
//! - Single-value lookups reply with `Bulk`, where `Bulk(None)` stands
//!   for an absent key or field.
//! - HGETALL replies with a flat `Array` of alternating field, value
//!   pairs, the way Redis serializes hashes.
//! - HMGET replies with `NullableArray`: one entry per requested field,
//!   in request order, `None` for absent fields.
//! - TTL and PTTL reply with `Integer`, using -2 for "no such key" and
//!   -1 for "no expiry".

use bytes::Bytes;
use std::fmt;

/// A fully-parsed command, ready to execute.
///
/// `HSet` keeps its arguments as the flat alternating list the caller
/// supplied, so a malformed pairing (odd length, or nothing at all) is
/// still representable and gets rejected by the executor instead of
/// being silently unbuildable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set one or more field/value pairs on a hash.
    /// Arguments alternate: field, value, field, value, ...
    HSet { key: Bytes, field_values: Vec<Bytes> },

    /// Get the value of one field.
    HGet { key: Bytes, field: Bytes },

    /// Get the values of several fields, in request order.
    HMGet { key: Bytes, fields: Vec<Bytes> },

    /// Get every field and value of a hash.
    HGetAll { key: Bytes },

    /// Get every field name of a hash.
    HKeys { key: Bytes },

    /// Get every value of a hash.
    HVals { key: Bytes },

    /// Remove one or more fields from a hash.
    HDel { key: Bytes, fields: Vec<Bytes> },

    /// Check whether a field exists in a hash.
    HExists { key: Bytes, field: Bytes },

    /// Count the fields of a hash.
    HLen { key: Bytes },

    /// Add a signed delta to the integer stored in a field.
    HIncrBy {
        key: Bytes,
        field: Bytes,
        delta: i64,
    },

    /// Delete one or more keys.
    Del { keys: Vec<Bytes> },

    /// Count how many of the given keys exist.
    Exists { keys: Vec<Bytes> },

    /// Set a key's time to live in seconds.
    Expire { key: Bytes, seconds: u64 },

    /// Set a key's time to live in milliseconds.
    PExpire { key: Bytes, millis: u64 },

    /// Get a key's remaining time to live in seconds.
    Ttl { key: Bytes },

    /// Get a key's remaining time to live in milliseconds.
    PTtl { key: Bytes },

    /// Remove a key's time to live.
    Persist { key: Bytes },
}

impl Command {
    /// The lowercase command name, as it appears in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::HSet { .. } => "hset",
            Command::HGet { .. } => "hget",
            Command::HMGet { .. } => "hmget",
            Command::HGetAll { .. } => "hgetall",
            Command::HKeys { .. } => "hkeys",
            Command::HVals { .. } => "hvals",
            Command::HDel { .. } => "hdel",
            Command::HExists { .. } => "hexists",
            Command::HLen { .. } => "hlen",
            Command::HIncrBy { .. } => "hincrby",
            Command::Del { .. } => "del",
            Command::Exists { .. } => "exists",
            Command::Expire { .. } => "expire",
            Command::PExpire { .. } => "pexpire",
            Command::Ttl { .. } => "ttl",
            Command::PTtl { .. } => "pttl",
            Command::Persist { .. } => "persist",
        }
    }

    /// Builds an HSET from a flat alternating field, value list.
    ///
    /// # Example
    /// ```
    /// use fieldkv::commands::Command;
    /// let cmd = Command::hset("users", ["a@x.com", "gyubin"]);
    /// ```
    pub fn hset(
        key: impl Into<Bytes>,
        field_values: impl IntoIterator<Item = impl Into<Bytes>>,
    ) -> Self {
        Command::HSet {
            key: key.into(),
            field_values: field_values.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an HGET.
    pub fn hget(key: impl Into<Bytes>, field: impl Into<Bytes>) -> Self {
        Command::HGet {
            key: key.into(),
            field: field.into(),
        }
    }

    /// Builds an HMGET.
    pub fn hmget(
        key: impl Into<Bytes>,
        fields: impl IntoIterator<Item = impl Into<Bytes>>,
    ) -> Self {
        Command::HMGet {
            key: key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an HGETALL.
    pub fn hgetall(key: impl Into<Bytes>) -> Self {
        Command::HGetAll { key: key.into() }
    }

    /// Builds an HKEYS.
    pub fn hkeys(key: impl Into<Bytes>) -> Self {
        Command::HKeys { key: key.into() }
    }

    /// Builds an HVALS.
    pub fn hvals(key: impl Into<Bytes>) -> Self {
        Command::HVals { key: key.into() }
    }

    /// Builds an HDEL.
    pub fn hdel(
        key: impl Into<Bytes>,
        fields: impl IntoIterator<Item = impl Into<Bytes>>,
    ) -> Self {
        Command::HDel {
            key: key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an HEXISTS.
    pub fn hexists(key: impl Into<Bytes>, field: impl Into<Bytes>) -> Self {
        Command::HExists {
            key: key.into(),
            field: field.into(),
        }
    }

    /// Builds an HLEN.
    pub fn hlen(key: impl Into<Bytes>) -> Self {
        Command::HLen { key: key.into() }
    }

    /// Builds an HINCRBY.
    pub fn hincrby(key: impl Into<Bytes>, field: impl Into<Bytes>, delta: i64) -> Self {
        Command::HIncrBy {
            key: key.into(),
            field: field.into(),
            delta,
        }
    }

    /// Builds a DEL.
    pub fn del(keys: impl IntoIterator<Item = impl Into<Bytes>>) -> Self {
        Command::Del {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an EXISTS.
    pub fn exists(keys: impl IntoIterator<Item = impl Into<Bytes>>) -> Self {
        Command::Exists {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an EXPIRE.
    pub fn expire(key: impl Into<Bytes>, seconds: u64) -> Self {
        Command::Expire {
            key: key.into(),
            seconds,
        }
    }

    /// Builds a PEXPIRE.
    pub fn pexpire(key: impl Into<Bytes>, millis: u64) -> Self {
        Command::PExpire {
            key: key.into(),
            millis,
        }
    }

    /// Builds a TTL.
    pub fn ttl(key: impl Into<Bytes>) -> Self {
        Command::Ttl { key: key.into() }
    }

    /// Builds a PTTL.
    pub fn pttl(key: impl Into<Bytes>) -> Self {
        Command::PTtl { key: key.into() }
    }

    /// Builds a PERSIST.
    pub fn persist(key: impl Into<Bytes>) -> Self {
        Command::Persist { key: key.into() }
    }
}

/// The successful result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A count or a flag (0/1), also TTLs with their -2/-1 conventions.
    Integer(i64),

    /// A single optional value. `None` stands for an absent key or field.
    Bulk(Option<Bytes>),

    /// A flat list of values. HGETALL uses alternating field, value
    /// positions.
    Array(Vec<Bytes>),

    /// A positional list where individual entries can be absent, as
    /// HMGET replies.
    NullableArray(Vec<Option<Bytes>>),
}

impl Reply {
    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates a present bulk reply.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(Some(data.into()))
    }

    /// Creates an absent bulk reply.
    pub fn none() -> Self {
        Reply::Bulk(None)
    }

    /// Creates an array reply.
    pub fn array(values: Vec<Bytes>) -> Self {
        Reply::Array(values)
    }

    /// Returns true for the absent bulk reply.
    pub fn is_none(&self) -> bool {
        matches!(self, Reply::Bulk(None))
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a present bulk value.
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Reply::Bulk(Some(data)) => Some(data),
            _ => None,
        }
    }

    /// Attempts to extract the inner array.
    pub fn as_array(&self) -> Option<&[Bytes]> {
        match self {
            Reply::Array(values) => Some(values),
            _ => None,
        }
    }
}

fn fmt_bytes(f: &mut fmt::Formatter<'_>, data: &Bytes) -> fmt::Result {
    if let Ok(text) = std::str::from_utf8(data) {
        write!(f, "\"{}\"", text)
    } else {
        write!(f, "(binary data, {} bytes)", data.len())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Bulk(Some(data)) => fmt_bytes(f, data),
            Reply::Bulk(None) => write!(f, "(nil)"),
            Reply::Array(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, value) in values.iter().enumerate() {
                        write!(f, "{}) ", i + 1)?;
                        fmt_bytes(f, value)?;
                        writeln!(f)?;
                    }
                    Ok(())
                }
            }
            Reply::NullableArray(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, value) in values.iter().enumerate() {
                        write!(f, "{}) ", i + 1)?;
                        match value {
                            Some(data) => fmt_bytes(f, data)?,
                            None => write!(f, "(nil)")?,
                        }
                        writeln!(f)?;
                    }
                    Ok(())
                }
            }
        }
    }
}
