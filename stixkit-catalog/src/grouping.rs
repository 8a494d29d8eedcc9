//! STIX 2.1 Grouping.

use std::sync::LazyLock;
use stixkit_model::{
    Context, DefaultValue, Entity, EntityType, FieldDescriptor, FieldKind, Mapping, ModelError,
    ModelResult, Validator, Value, cache_entity,
};
use stixkit_types::Timestamp;

pub const TYPE_NAME: &str = "grouping";
pub const SPEC_VERSION: &str = "2.1";

const IDENTITY: &[&str] = &["identity"];
const MARKING: &[&str] = &["marking-definition"];

pub fn grouping_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Grouping", TYPE_NAME)
            .identified_by("id")
            .with_field(
                FieldDescriptor::optional("type", FieldKind::String)
                    .with_default(DefaultValue::Fixed(Value::from(TYPE_NAME)))
                    .validated(Validator::Equals(TYPE_NAME.into())),
            )
            .with_field(
                FieldDescriptor::optional("spec_version", FieldKind::String)
                    .with_default(DefaultValue::Fixed(Value::from(SPEC_VERSION)))
                    .validated(Validator::Equals(SPEC_VERSION.into())),
            )
            .with_field(
                FieldDescriptor::optional("id", FieldKind::String)
                    .with_default(DefaultValue::GenerateId)
                    .validated(Validator::identifier_of(TYPE_NAME))
                    .on_set(cache_entity),
            )
            .with_field(FieldDescriptor::optional(
                "created_by_ref",
                FieldKind::Identifier { allowed: IDENTITY },
            ))
            .with_field(
                FieldDescriptor::optional("created", FieldKind::Timestamp)
                    .with_default(DefaultValue::Now),
            )
            .with_field(
                FieldDescriptor::optional("modified", FieldKind::Timestamp)
                    .with_default(DefaultValue::SameAs("created")),
            )
            .with_field(FieldDescriptor::optional("name", FieldKind::String))
            .with_field(FieldDescriptor::optional("description", FieldKind::String))
            .with_field(FieldDescriptor::required("context", FieldKind::String))
            .with_field(
                FieldDescriptor::required("object_refs", FieldKind::Identifier { allowed: &[] })
                    .multiple(),
            )
            .with_field(FieldDescriptor::optional("revoked", FieldKind::Boolean))
            .with_field(FieldDescriptor::optional("labels", FieldKind::String).multiple())
            .with_field(
                FieldDescriptor::optional("confidence", FieldKind::Integer)
                    .validated(Validator::Range { min: 0, max: 100 }),
            )
            .with_field(FieldDescriptor::optional("lang", FieldKind::String))
            .with_field(
                FieldDescriptor::optional(
                    "object_marking_refs",
                    FieldKind::Identifier { allowed: MARKING },
                )
                .multiple(),
            )
    });
    &TYPE
}

/// A context-sharing set of STIX objects asserted to be related.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping(Entity);

impl Grouping {
    #[must_use]
    pub fn builder() -> GroupingBuilder {
        GroupingBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.identifier().unwrap_or_default()
    }

    #[must_use]
    pub fn created(&self) -> Option<Timestamp> {
        self.0.get_timestamp("created")
    }

    #[must_use]
    pub fn modified(&self) -> Option<Timestamp> {
        self.0.get_timestamp("modified")
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get_str("name")
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    #[must_use]
    pub fn context(&self) -> &str {
        self.0.get_str("context").unwrap_or_default()
    }

    #[must_use]
    pub fn object_refs(&self) -> Vec<&str> {
        self.0.get_strs("object_refs")
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.0.get_strs("labels")
    }

    #[must_use]
    pub fn confidence(&self) -> Option<i64> {
        self.0.get_i64("confidence")
    }

    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.0.get_bool("revoked").unwrap_or(false)
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

impl TryFrom<Entity> for Grouping {
    type Error = ModelError;

    fn try_from(entity: Entity) -> ModelResult<Self> {
        if entity.entity_type() != grouping_type() {
            return Err(ModelError::UnknownType(entity.entity_type().name().to_string()));
        }
        Ok(Self(entity))
    }
}

impl AsRef<Entity> for Grouping {
    fn as_ref(&self) -> &Entity {
        &self.0
    }
}

/// Collects Grouping properties; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct GroupingBuilder {
    values: Mapping,
    object_refs: Vec<Value>,
    labels: Vec<Value>,
    markings: Vec<Value>,
}

impl GroupingBuilder {
    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("id", id.into())
    }

    #[must_use]
    pub fn created(self, created: Timestamp) -> Self {
        self.with("created", created)
    }

    #[must_use]
    pub fn modified(self, modified: Timestamp) -> Self {
        self.with("modified", modified)
    }

    #[must_use]
    pub fn created_by_ref(self, identity: impl Into<String>) -> Self {
        self.with("created_by_ref", identity.into())
    }

    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        self.with("name", name.into())
    }

    #[must_use]
    pub fn description(self, description: impl Into<String>) -> Self {
        self.with("description", description.into())
    }

    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        self.with("context", context.into())
    }

    #[must_use]
    pub fn object_ref(mut self, reference: impl Into<String>) -> Self {
        self.object_refs.push(Value::String(reference.into()));
        self
    }

    #[must_use]
    pub fn object_refs<I, S>(self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        references
            .into_iter()
            .fold(self, |builder, reference| builder.object_ref(reference))
    }

    #[must_use]
    pub fn revoked(self, revoked: bool) -> Self {
        self.with("revoked", revoked)
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(Value::String(label.into()));
        self
    }

    #[must_use]
    pub fn confidence(self, confidence: i64) -> Self {
        self.with("confidence", confidence)
    }

    #[must_use]
    pub fn lang(self, lang: impl Into<String>) -> Self {
        self.with("lang", lang.into())
    }

    #[must_use]
    pub fn object_marking_ref(mut self, marking: impl Into<String>) -> Self {
        self.markings.push(Value::String(marking.into()));
        self
    }

    /// Sets any property by key, declared or not.
    #[must_use]
    pub fn property(self, key: &str, value: impl Into<Value>) -> Self {
        self.with(key, value)
    }

    pub fn build(self, ctx: &Context) -> ModelResult<Grouping> {
        let mut values = self.values;
        for (key, list) in [
            ("object_refs", self.object_refs),
            ("labels", self.labels),
            ("object_marking_refs", self.markings),
        ] {
            if !list.is_empty() {
                values.insert(key.to_string(), Value::List(list));
            }
        }
        Entity::from_mapping(ctx, grouping_type(), values).map(Grouping)
    }
}
