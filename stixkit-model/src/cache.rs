//! Identity cache: identifier → entity.
//!
//! Entries are immutable `Arc<Entity>` values; `put` replaces a whole
//! entry under the write lock and never mutates one in place. There is no
//! eviction. Long-running processes call [`IdentityCache::clear`] (or
//! [`cache_clear`](crate::cache_clear) for the process-wide instance) to
//! bound memory.

use crate::{Context, Entity, ModelError, ModelResult};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::debug;

static GLOBAL: LazyLock<Arc<IdentityCache>> = LazyLock::new(|| Arc::new(IdentityCache::new()));

#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: RwLock<HashMap<String, Arc<Entity>>>,
}

impl IdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`Context::new`](crate::Context::new).
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Registers an entity under its identifier, last write wins.
    ///
    /// Returns the entry it replaced, if any.
    pub fn put(&self, entity: impl Into<Arc<Entity>>) -> ModelResult<Option<Arc<Entity>>> {
        let entity = entity.into();
        let identifier = entity
            .identifier()
            .ok_or_else(|| ModelError::MissingIdentifier {
                type_name: entity.entity_type().name().to_string(),
            })?
            .to_string();
        debug!(identifier = %identifier, "Caching entity");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.insert(identifier, entity))
    }

    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<Entity>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(identifier).cloned()
    }

    /// Like [`get`](Self::get), failing with `UnresolvedReference`.
    pub fn lookup(&self, identifier: &str) -> ModelResult<Arc<Entity>> {
        self.get(identifier)
            .ok_or_else(|| ModelError::UnresolvedReference(identifier.to_string()))
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(identifier)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        debug!(entries = entries.len(), "Clearing identity cache");
        entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Post-set hook for identifier fields: registers the entity in the
/// context's cache unless caching is turned off.
pub fn cache_entity(ctx: &Context, entity: &Entity) {
    if ctx.config().cache_entities && entity.identifier().is_some() {
        // put only fails for entities without an identifier
        ctx.cache().put(entity.clone()).ok();
    }
}
