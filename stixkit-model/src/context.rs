//! Construction context: the collaborators every parse and construct call
//! needs, passed explicitly instead of living in globals.
//!
//! A [`Context`] owns the type registries and configuration, and shares
//! the identity cache, identifier generator, clock and codec. Build one
//! at startup, register types on it, then share it (`&Context` or
//! `Arc<Context>`) across threads. [`Context::new`] wires in the
//! process-wide [`IdentityCache`]; tests swap in an isolated one.

use crate::codec::{Codec, JsonCodec};
use crate::{EntityType, IdentityCache, ModelError, ModelResult, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use stixkit_types::{Clock, IdGenerator, Identifier, RandomIds, SystemClock, Timestamp};

/// Name of the registry consulted by [`parse`](crate::parse).
pub const TOP_LEVEL_REGISTRY: &str = "types";
/// Discriminator key of the top-level registry.
pub const TYPE_KEY: &str = "type";

/// Tunables for entity construction and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Register entities with identifiers in the identity cache when
    /// constructed. Turn off to keep memory flat in bulk conversions.
    pub cache_entities: bool,
    /// Treat every entity type as open, keeping unknown keys as custom
    /// properties.
    pub allow_custom_properties: bool,
    /// Indentation width of pretty JSON output.
    pub pretty_indent: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cache_entities: true,
            allow_custom_properties: false,
            pretty_indent: JsonCodec::DEFAULT_INDENT,
        }
    }
}

pub struct Context {
    cache: Arc<IdentityCache>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    codec: Arc<dyn Codec>,
    config: ModelConfig,
    types: TypeRegistry,
    names: HashMap<String, &'static EntityType>,
    variants: HashMap<String, TypeRegistry>,
}

impl Context {
    /// A context with default config, random identifiers, the system
    /// clock, the JSON codec and the process-wide identity cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: IdentityCache::global(),
            ids: Arc::new(RandomIds),
            clock: Arc::new(SystemClock),
            codec: Arc::new(JsonCodec::default()),
            config: ModelConfig::default(),
            types: TypeRegistry::new(TOP_LEVEL_REGISTRY, TYPE_KEY),
            names: HashMap::new(),
            variants: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<IdentityCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the codec. Call after [`with_config`](Self::with_config),
    /// which resets the codec to JSON with the configured indent.
    #[must_use]
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.codec = Arc::new(JsonCodec::with_indent(config.pretty_indent));
        self.config = config;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[must_use]
    pub fn generate_id(&self, type_name: &str) -> Identifier {
        self.ids.generate(type_name)
    }

    /// Registers a top-level type: parseable by its `type` discriminator
    /// and by name through [`parse_as`](crate::parse_as).
    pub fn register_type(&mut self, ty: &'static EntityType) -> ModelResult<()> {
        self.types.register(ty.type_name(), ty)?;
        self.register_named(ty);
        Ok(())
    }

    /// Makes a type reachable by name (display name and type name) only.
    pub fn register_named(&mut self, ty: &'static EntityType) {
        self.names.insert(ty.name().to_string(), ty);
        self.names.insert(ty.type_name().to_string(), ty);
    }

    /// Creates an empty polymorphic registry reading its tag from `key`.
    /// Defining an existing registry again is a no-op.
    pub fn define_registry(&mut self, name: &str, key: &str) {
        self.variants
            .entry(name.to_string())
            .or_insert_with(|| TypeRegistry::new(name, key));
    }

    /// Adds a concrete type to a polymorphic registry under `tag`.
    pub fn register_variant(
        &mut self,
        registry: &str,
        tag: &str,
        ty: &'static EntityType,
    ) -> ModelResult<()> {
        let entries = self
            .variants
            .get_mut(registry)
            .ok_or_else(|| ModelError::UnknownRegistry(registry.to_string()))?;
        entries.register(tag, ty)?;
        self.register_named(ty);
        Ok(())
    }

    /// The registry consulted by top-level parsing.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn registry(&self, name: &str) -> ModelResult<&TypeRegistry> {
        self.variants
            .get(name)
            .ok_or_else(|| ModelError::UnknownRegistry(name.to_string()))
    }

    /// Looks a type up by display name or type name.
    pub fn resolve_name(&self, name: &str) -> ModelResult<&'static EntityType> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
