//! Schema-driven entity model for stixkit.
//!
//! Entity types are declared as static tables of field descriptors; the
//! core coerces, validates and defaults values against them, keeps an
//! identity cache for by-reference resolution, and serializes entities to
//! a deterministic canonical form:
//! - [`FieldDescriptor`]: one named, typed property and its rules
//! - [`EntityType`] / [`Entity`]: a schema and a validated instance of it
//! - [`TypeRegistry`]: discriminator → type dispatch for polymorphic fields and parsing
//! - [`EntityList`]: ordered, homogeneous lists of entities or related objects
//! - [`RelatedObject`]: a related entity held inline or by reference
//! - [`IdentityCache`]: identifier → entity, process-wide or per context
//! - [`Context`]: the injected collaborators (cache, registries, id generator, clock, codec)
//! - [`parse`] / [`parse_as`] / [`Entity::serialize`]: the text boundary
//!
//! Concrete entity catalogs live outside the core and register their
//! types on a [`Context`].

mod cache;
pub mod coerce;
mod codec;
mod context;
mod entity;
mod error;
pub mod field;
mod list;
mod parse;
mod registry;
mod related;
mod value;

pub use cache::{IdentityCache, cache_entity};
pub use codec::{Codec, JsonCodec};
pub use context::{Context, ModelConfig, TOP_LEVEL_REGISTRY, TYPE_KEY};
pub use entity::{Entity, EntityType, TypeTag};
pub use error::{ModelError, ModelResult};
pub use field::{DefaultValue, FieldDescriptor, FieldKind, Validator};
pub use list::{EntityList, ListElement};
pub use parse::{ParseInput, parse, parse_as, serialize};
pub use registry::TypeRegistry;
pub use related::{FormHint, IDREF_KEY, RELATIONSHIP_KEY, ReferenceForm, RelatedObject, Resolved};
pub use value::{Mapping, Value, mapping_from_json};

/// Empties the process-wide identity cache.
pub fn cache_clear() {
    IdentityCache::global().clear();
}
