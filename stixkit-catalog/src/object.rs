//! CybOX Object: a cyber-relevant observable with typed properties and
//! related objects.

use crate::properties::{DOMAIN_SPECIFIC_PROPERTIES, OBJECT_PROPERTIES};
use std::fmt;
use std::sync::LazyLock;
use stixkit_model::{
    Context, DefaultValue, Entity, EntityList, EntityType, FieldDescriptor, FieldKind, ModelError,
    ModelResult, RelatedObject, Validator, Value, cache_entity,
};
use tracing::debug;

pub const TYPE_NAME: &str = "object";

pub fn object_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Object", TYPE_NAME)
            .identified_by("id")
            .with_field(
                FieldDescriptor::optional("id", FieldKind::String)
                    .with_default(DefaultValue::GenerateId)
                    .validated(Validator::identifier_of(TYPE_NAME))
                    .on_set(cache_entity),
            )
            .with_field(FieldDescriptor::optional("has_changed", FieldKind::Boolean))
            .with_field(FieldDescriptor::optional("state", FieldKind::String))
            .with_field(FieldDescriptor::optional("description", FieldKind::String))
            .with_field(FieldDescriptor::optional(
                "properties",
                FieldKind::Polymorphic(OBJECT_PROPERTIES),
            ))
            .with_field(FieldDescriptor::optional(
                "domain_specific_object_properties",
                FieldKind::Polymorphic(DOMAIN_SPECIFIC_PROPERTIES),
            ))
            .with_field(
                FieldDescriptor::optional("related_objects", FieldKind::Related(object_type))
                    .multiple(),
            )
    });
    &TYPE
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object(Entity);

impl Object {
    /// Builds an object with a fresh identifier around `properties`.
    pub fn new(ctx: &Context, properties: Option<Entity>) -> ModelResult<Self> {
        let values = properties.map(|p| ("properties", Value::from(p)));
        Entity::new(ctx, object_type(), values).map(Self)
    }

    /// Builds an object from keyword values.
    pub fn from_values<K, V>(
        ctx: &Context,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> ModelResult<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Entity::new(ctx, object_type(), values).map(Self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.identifier().unwrap_or_default()
    }

    #[must_use]
    pub fn properties(&self) -> Option<&Entity> {
        self.0.get_entity("properties")
    }

    #[must_use]
    pub fn domain_specific_properties(&self) -> Option<&Entity> {
        self.0.get_entity("domain_specific_object_properties")
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.0.get_str("state")
    }

    #[must_use]
    pub fn has_changed(&self) -> Option<bool> {
        self.0.get_bool("has_changed")
    }

    #[must_use]
    pub fn related_objects(&self) -> EntityList<RelatedObject> {
        EntityList::from_field(&self.0, "related_objects")
            .unwrap_or_else(|| EntityList::new(object_type()))
    }

    /// Relates another object, embedding it or keeping only its identifier.
    ///
    /// The cache entry for this object is replaced with the updated one.
    pub fn add_related(
        &mut self,
        ctx: &Context,
        related: Object,
        relationship: impl Into<String>,
        inline: bool,
    ) -> ModelResult<()> {
        let related = RelatedObject::new(related.0, Some(relationship.into()), inline)?;
        let mut list = self.related_objects();
        list.push(related)?;
        debug!(object = %self.0, count = list.len(), inline, "Adding related object");
        self.0.set(ctx, "related_objects", list)?;
        cache_entity(ctx, &self.0);
        Ok(())
    }

    #[must_use]
    pub fn as_entity(&self) -> &Entity {
        &self.0
    }

    #[must_use]
    pub fn into_entity(self) -> Entity {
        self.0
    }

    pub fn serialize(&self, pretty: bool) -> ModelResult<String> {
        self.0.serialize(pretty)
    }
}

impl TryFrom<Entity> for Object {
    type Error = ModelError;

    fn try_from(entity: Entity) -> ModelResult<Self> {
        if entity.entity_type() != object_type() {
            return Err(ModelError::UnknownType(entity.entity_type().name().to_string()));
        }
        Ok(Self(entity))
    }
}

impl AsRef<Entity> for Object {
    fn as_ref(&self) -> &Entity {
        &self.0
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
