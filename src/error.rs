//! Error types shared by the storage and command layers.
//!
//! Every failure in the core is a plain, deterministic return value: a
//! command either applies in full or returns one of these errors without
//! touching the keyspace. Absence of a key or a field is never an error;
//! it is reported through `Option` or an empty collection.

use thiserror::Error;

/// Errors a command can produce.
///
/// Messages follow the Redis wording so a protocol front end can forward
/// them to clients verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key holds a value of an incompatible kind.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// Malformed argument list, such as an odd field/value pairing.
    #[error("wrong number of arguments for '{0}' command")]
    Arity(&'static str),

    /// An increment hit a value that is not a base-10 signed 64-bit
    /// integer, or the result would not fit in one.
    #[error("hash value is not an integer or out of range")]
    NotAnInteger,
}

/// Convenience alias for fallible storage and command operations.
pub type StoreResult<T> = Result<T, StoreError>;
