//! Entity types and entity instances.
//!
//! An [`EntityType`] is a static, ordered table of [`FieldDescriptor`]s.
//! An [`Entity`] is an instance of one: the values assigned to its
//! declared fields (unset fields are absent, never null) plus, for open
//! types, any extra custom properties.
//!
//! Construction is atomic. Every descriptor is run, every failure is
//! collected, and only a fully valid entity has its post-set hooks run
//! and is returned. Hooks of nested entities wait for the outermost
//! entity, so a failure anywhere in the tree leaves no side effects.

use crate::codec::{Codec, JsonCodec};
use crate::field::{FieldDescriptor, PostSetHook};
use crate::value::mapping_from_json;
use crate::{Context, Mapping, ModelError, ModelResult, RelatedObject, Value};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;
use stixkit_types::Timestamp;

/// Post-set hooks queued by a construction that has not finished yet.
pub(crate) type PendingHooks = Vec<(PostSetHook, Entity)>;

pub(crate) fn run_post_set_hooks(ctx: &Context, pending: PendingHooks) {
    for (hook, entity) in pending {
        hook(ctx, &entity);
    }
}

/// A type tag carried by entities that are picked out of a registry by a
/// discriminator key that is not itself a declared field (`xsi:type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTag {
    pub key: &'static str,
    pub value: &'static str,
}

/// Schema for one kind of entity.
#[derive(Debug)]
pub struct EntityType {
    name: &'static str,
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    id_field: Option<&'static str>,
    tag: Option<TypeTag>,
    open: bool,
}

impl EntityType {
    /// Starts a closed schema.
    ///
    /// `name` is the display name used in error messages (`Grouping`);
    /// `type_name` is the identifier prefix and top-level discriminator
    /// (`grouping`).
    #[must_use]
    pub fn new(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            fields: Vec::new(),
            id_field: None,
            tag: None,
            open: false,
        }
    }

    /// Appends a field. Field names must be unique within the type.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        assert!(
            self.descriptor(field.name()).is_none(),
            "duplicate field '{}' on {}",
            field.name(),
            self.name
        );
        self.fields.push(field);
        self
    }

    /// Names the field holding this type's identifier.
    #[must_use]
    pub fn identified_by(mut self, field: &'static str) -> Self {
        self.id_field = Some(field);
        self
    }

    #[must_use]
    pub fn tagged(mut self, key: &'static str, value: &'static str) -> Self {
        self.tag = Some(TypeTag { key, value });
        self
    }

    /// Accepts and keeps undeclared keys instead of rejecting them.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    #[must_use]
    pub const fn id_field(&self) -> Option<&'static str> {
        self.id_field
    }

    #[must_use]
    pub const fn tag(&self) -> Option<TypeTag> {
        self.tag
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// The tag, when its key is not also a declared field.
    fn undeclared_tag(&self) -> Option<TypeTag> {
        self.tag.filter(|tag| self.descriptor(tag.key).is_none())
    }

    fn build(&'static self, ctx: &Context, supplied: Mapping) -> ModelResult<Entity> {
        let mut pending = PendingHooks::new();
        let entity = self.build_deferred(ctx, supplied, &mut pending)?;
        run_post_set_hooks(ctx, pending);
        Ok(entity)
    }

    /// Builds without running post-set hooks. On success the hooks of the
    /// entity and of everything nested in it are appended to `pending`,
    /// innermost first; on failure `pending` is left as it was.
    pub(crate) fn build_deferred(
        &'static self,
        ctx: &Context,
        mut supplied: Mapping,
        pending: &mut PendingHooks,
    ) -> ModelResult<Entity> {
        let mut errors = Vec::new();
        let mut nested = PendingHooks::new();

        if let Some(tag) = self.undeclared_tag() {
            if let Some(raw) = supplied.shift_remove(tag.key) {
                if raw.as_str() != Some(tag.value) {
                    errors.push(ModelError::invalid(
                        self.name,
                        tag.key,
                        format!("must equal '{}'.", tag.value),
                    ));
                }
            }
        }

        let mut values = Mapping::new();
        let mut rejected = Vec::new();
        for field in &self.fields {
            let raw = supplied.shift_remove(field.name());
            match field.assign(ctx, self, raw, &values, &mut nested) {
                Ok(Some(value)) => {
                    values.insert(field.name().to_string(), value);
                }
                Ok(None) => {}
                Err(err) => {
                    rejected.push(field.name());
                    errors.push(err);
                }
            }
        }

        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.is_required())
            .filter(|f| !values.contains_key(f.name()) && !rejected.contains(&f.name()))
            .map(|f| f.name().to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(ModelError::MissingRequiredProperties {
                type_name: self.name.to_string(),
                properties: missing,
            });
        }

        let extras = if self.open || ctx.config().allow_custom_properties {
            supplied
        } else {
            if !supplied.is_empty() {
                errors.push(ModelError::UnexpectedProperties {
                    type_name: self.name.to_string(),
                    properties: supplied.keys().cloned().collect(),
                });
            }
            Mapping::new()
        };

        if let Some(err) = ModelError::collapse(errors) {
            return Err(err);
        }

        let entity = Entity {
            entity_type: self,
            values,
            extras,
        };
        pending.append(&mut nested);
        for field in &self.fields {
            if let Some(hook) = field.post_set_hook() {
                if entity.is_set(field.name()) {
                    pending.push((hook, entity.clone()));
                }
            }
        }
        Ok(entity)
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_name == other.type_name
    }
}

impl Eq for EntityType {}

/// A constructed, validated instance of an [`EntityType`].
#[derive(Clone)]
pub struct Entity {
    entity_type: &'static EntityType,
    values: Mapping,
    extras: Mapping,
}

impl Entity {
    /// Builds an entity from keyword values.
    pub fn new<K, V>(
        ctx: &Context,
        entity_type: &'static EntityType,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> ModelResult<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let supplied = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entity_type.build(ctx, supplied)
    }

    /// Builds an entity from a raw mapping, e.g. one produced by a decoder.
    pub fn from_mapping(
        ctx: &Context,
        entity_type: &'static EntityType,
        mapping: Mapping,
    ) -> ModelResult<Self> {
        entity_type.build(ctx, mapping)
    }

    /// Builds an entity from a decoded JSON object.
    pub fn from_json(
        ctx: &Context,
        entity_type: &'static EntityType,
        json: Json,
    ) -> ModelResult<Self> {
        match json {
            Json::Object(map) => entity_type.build(ctx, mapping_from_json(map)),
            other => Err(ModelError::NotAMapping(json_kind(&other))),
        }
    }

    #[must_use]
    pub const fn entity_type(&self) -> &'static EntityType {
        self.entity_type
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.entity_type.type_name()
    }

    /// The identifier, for types that declare an identifier field.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.entity_type
            .id_field()
            .and_then(|field| self.get_str(field))
    }

    /// A declared field's value, or a custom property's.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| self.extras.get(name))
    }

    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_timestamp(&self, name: &str) -> Option<Timestamp> {
        self.get(name).and_then(Value::as_timestamp)
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// String elements of a multiple field, e.g. a list of references.
    #[must_use]
    pub fn get_strs(&self, name: &str) -> Vec<&str> {
        self.get_list(name)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(Value::as_entity)
    }

    #[must_use]
    pub fn get_related(&self, name: &str) -> Option<&RelatedObject> {
        self.get(name).and_then(Value::as_related)
    }

    /// Declared fields that hold a value, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.entity_type
            .fields()
            .iter()
            .filter_map(|f| self.values.get(f.name()).map(|v| (f.name(), v)))
    }

    /// Undeclared properties kept by open types.
    #[must_use]
    pub fn custom_properties(&self) -> &Mapping {
        &self.extras
    }

    /// Assigns one field through the same coercion and validation path as
    /// construction, then runs its post-set hook.
    ///
    /// On error the entity is left unchanged.
    pub fn set(&mut self, ctx: &Context, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let ty = self.entity_type;
        let Some(field) = ty.descriptor(name) else {
            if ty.is_open() || ctx.config().allow_custom_properties {
                self.extras.insert(name.to_string(), value.into());
                return Ok(());
            }
            return Err(ModelError::UnexpectedProperties {
                type_name: ty.name().to_string(),
                properties: vec![name.to_string()],
            });
        };
        let mut pending = PendingHooks::new();
        let assigned = field.assign(ctx, ty, Some(value.into()), &self.values, &mut pending)?;
        if let Some(value) = assigned {
            self.values.insert(name.to_string(), value);
        }
        run_post_set_hooks(ctx, pending);
        if let Some(hook) = field.post_set_hook() {
            hook(ctx, self);
        }
        Ok(())
    }

    /// Clears an optional field or custom property, returning its value.
    pub fn unset(&mut self, name: &str) -> ModelResult<Option<Value>> {
        if let Some(field) = self.entity_type.descriptor(name) {
            if field.is_required() {
                return Err(ModelError::MissingRequiredProperties {
                    type_name: self.entity_type.name().to_string(),
                    properties: vec![name.to_string()],
                });
            }
            return Ok(self.values.shift_remove(name));
        }
        Ok(self.extras.shift_remove(name))
    }

    /// The deterministic key/value form of this entity.
    ///
    /// Keys come out as: the type tag (if not a declared field), declared
    /// fields in declaration order skipping unset ones, then custom
    /// properties in the order they were supplied.
    #[must_use]
    pub fn to_canonical_mapping(&self) -> serde_json::Map<String, Json> {
        let mut out = serde_json::Map::new();
        if let Some(tag) = self.entity_type.undeclared_tag() {
            out.insert(tag.key.to_string(), Json::String(tag.value.to_string()));
        }
        for (name, value) in self.fields() {
            out.insert(name.to_string(), value.to_json());
        }
        for (name, value) in &self.extras {
            out.insert(name.clone(), value.to_json());
        }
        out
    }

    /// Canonical JSON text; `pretty` indents by four spaces.
    ///
    /// Always encodes with the default [`JsonCodec`]. Use
    /// [`serialize`](crate::serialize) to honour the context's codec and
    /// `pretty_indent`.
    pub fn serialize(&self, pretty: bool) -> ModelResult<String> {
        JsonCodec::default().encode(&self.to_canonical_mapping(), pretty)
    }
}

/// Value equality: two entities are equal iff their canonical mappings are.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.to_canonical_mapping() == other.to_canonical_mapping()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.entity_type.name())
            .field("values", &self.values)
            .field("extras", &self.extras)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identifier() {
            Some(id) => f.write_str(id),
            None => f.write_str(self.entity_type.name()),
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_canonical_mapping().serialize(serializer)
    }
}

pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
