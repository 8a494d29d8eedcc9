//! Core value types for stixkit.
//!
//! This crate defines the leaf types every entity model depends on:
//! - [`Identifier`]: `<type-name>--<uuid>` entity identifiers
//! - [`Timestamp`]: UTC timestamps with millisecond precision
//! - [`IdGenerator`]: injectable identifier source ([`RandomIds`], [`SequentialIds`])
//! - [`Clock`]: injectable time source ([`SystemClock`], [`FixedClock`])
//!
//! Entity schemas, validation and serialization live in `stixkit-model`.

mod ids;
mod timestamp;

pub use ids::{IdGenerator, Identifier, RandomIds, SequentialIds};
pub use timestamp::{Clock, FixedClock, SystemClock, Timestamp};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing value types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
