//! Discriminator registries: tag value → entity type.
//!
//! A registry backs both top-level parsing (keyed by `type`) and
//! polymorphic fields (keyed by e.g. `xsi:type`). Registering a tag twice
//! is refused so that an extension can never silently shadow a type.

use crate::{EntityType, Mapping, ModelError, ModelResult};
use indexmap::IndexMap;
use tracing::debug;

/// Maps discriminator values to the entity types they construct.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    name: String,
    key: String,
    entries: IndexMap<String, &'static EntityType>,
}

impl TypeRegistry {
    /// Creates an empty registry that reads its tag from `key`.
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            entries: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapping key holding the discriminator.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn register(&mut self, tag: impl Into<String>, ty: &'static EntityType) -> ModelResult<()> {
        let tag = tag.into();
        if self.entries.contains_key(&tag) {
            return Err(ModelError::DuplicateRegistration {
                registry: self.name.clone(),
                tag,
            });
        }
        debug!(registry = %self.name, tag = %tag, entity_type = ty.name(), "Registered entity type");
        self.entries.insert(tag, ty);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&'static EntityType> {
        self.entries.get(tag).copied()
    }

    /// Like [`get`](Self::get), failing with `UnknownDiscriminator`.
    pub fn lookup(&self, tag: &str) -> ModelResult<&'static EntityType> {
        self.get(tag).ok_or_else(|| ModelError::UnknownDiscriminator {
            registry: self.name.clone(),
            tag: tag.to_string(),
        })
    }

    /// Selects the concrete type for a raw mapping from its tag.
    pub fn resolve(&self, raw: &Mapping) -> ModelResult<&'static EntityType> {
        let tag = raw
            .get(&self.key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ModelError::MissingDiscriminator {
                registry: self.name.clone(),
                key: self.key.clone(),
            })?;
        self.lookup(tag)
    }

    /// Returns true if some tag maps to `ty`.
    #[must_use]
    pub fn contains_type(&self, ty: &EntityType) -> bool {
        self.entries.values().any(|registered| *registered == ty)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
