//! Identifier types and generators.
//!
//! Identifiers take the form `<type-name>--<uuid>`. The type-name prefix
//! names the entity type the identifier belongs to.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

const SEPARATOR: &str = "--";

/// An entity identifier of the form `<type-name>--<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    type_name: String,
    uuid: Uuid,
}

impl Identifier {
    /// Creates an identifier from a type name and UUID.
    #[must_use]
    pub fn new(type_name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            type_name: type_name.into(),
            uuid,
        }
    }

    /// Creates an identifier with a fresh random (v4) UUID.
    #[must_use]
    pub fn random(type_name: impl Into<String>) -> Self {
        Self::new(type_name, Uuid::new_v4())
    }

    /// Returns the type-name prefix.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the UUID part.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns true if the prefix equals `type_name`.
    #[must_use]
    pub fn is_of_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// Parses `<type-name>--<uuid>`.
    ///
    /// The type name must be non-empty and the UUID part must be a
    /// lowercase hyphenated UUID. Simple, braced and URN forms are rejected
    /// so that the text always equals the rendered identifier.
    pub fn parse(s: &str) -> Result<Self> {
        let (type_name, text) = s
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| Error::InvalidIdentifier(s.to_string()))?;
        if type_name.is_empty() {
            return Err(Error::InvalidIdentifier(s.to_string()));
        }
        let uuid = Uuid::parse_str(text)?;
        if uuid.hyphenated().to_string() != text {
            return Err(Error::InvalidIdentifier(s.to_string()));
        }
        Ok(Self::new(type_name, uuid))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.type_name, SEPARATOR, self.uuid.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

/// Source of fresh identifiers for entities that do not supply one.
pub trait IdGenerator: Send + Sync {
    /// Generates a new identifier for the given type name.
    fn generate(&self, type_name: &str) -> Identifier;
}

/// Generates random (v4) identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self, type_name: &str) -> Identifier {
        Identifier::random(type_name)
    }
}

/// Generates deterministic identifiers for fixtures.
///
/// The n-th generated UUID is `00000000-0000-4000-8000-<n as 12 hex digits>`,
/// starting at 1. The result is a well-formed v4 UUID.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    /// Creates a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts the sequence.
    pub fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self, type_name: &str) -> Identifier {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0000 | u128::from(n & 0xffff_ffff_ffff));
        Identifier::new(type_name, uuid)
    }
}
