//! Field descriptors: one named, typed property of an entity type.
//!
//! A descriptor carries everything the construction path needs to turn a
//! raw value into a stored one: the semantic [`FieldKind`], whether the
//! field is required or holds a sequence, how to default it, how to
//! validate it, and what to run once it is stored.

use crate::coerce;
use crate::entity::PendingHooks;
use crate::{Context, Entity, EntityType, Mapping, ModelResult, Value};
use stixkit_types::Identifier;

/// Lazily resolved reference to a statically declared entity type.
///
/// A function pointer rather than a reference so that schemas may refer
/// to themselves and to each other.
pub type TypeRef = fn() -> &'static EntityType;

/// Side effect run after a field is stored on a completed entity.
pub type PostSetHook = fn(&Context, &Entity);

/// The semantic type of a field's value.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Timestamp,
    /// An identifier string referring to another entity. An empty
    /// `allowed` list accepts any type prefix.
    Identifier { allowed: &'static [&'static str] },
    /// A free-form mapping kept as-is.
    Dictionary,
    /// A nested entity of one fixed type.
    Entity(TypeRef),
    /// A nested entity whose concrete type is picked by a discriminator
    /// from the named registry.
    Polymorphic(&'static str),
    /// A related entity held inline or by reference.
    Related(TypeRef),
}

/// How a field is filled when the caller supplies nothing.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    /// A constant.
    Fixed(Value),
    /// A fresh identifier for the owning type from the context's generator.
    GenerateId,
    /// The context clock's current time.
    Now,
    /// The value already assigned to another (earlier) field, if any.
    SameAs(&'static str),
    /// Anything else.
    Deferred(fn(&DefaultScope<'_>) -> Option<Value>),
}

/// What a deferred default can see.
pub struct DefaultScope<'a> {
    pub ctx: &'a Context,
    pub entity_type: &'a EntityType,
    /// Fields assigned so far, in declaration order.
    pub assigned: &'a Mapping,
}

impl DefaultValue {
    fn materialize(&self, scope: &DefaultScope<'_>) -> Option<Value> {
        match self {
            Self::Fixed(value) => Some(value.clone()),
            Self::GenerateId => Some(Value::String(
                scope
                    .ctx
                    .generate_id(scope.entity_type.type_name())
                    .to_string(),
            )),
            Self::Now => Some(Value::Timestamp(scope.ctx.now())),
            Self::SameAs(other) => scope.assigned.get(*other).cloned(),
            Self::Deferred(factory) => factory(scope),
        }
    }
}

/// A predicate over a coerced value. Failures carry a reason phrase that
/// ends up in [`ModelError::InvalidPropertyValue`](crate::ModelError).
#[derive(Debug, Clone)]
pub enum Validator {
    /// `must equal '<literal>'.`
    Equals(String),
    /// `must start with '<prefix>'.`
    StartsWith(String),
    /// An identifier with the given `<type>--` prefix and a valid UUID.
    IdentifierPrefix(String),
    /// An integer within `min..=max`.
    Range { min: i64, max: i64 },
    Custom(fn(&Value) -> Result<(), String>),
}

impl Validator {
    /// Validator for an entity's own `id` field.
    #[must_use]
    pub fn identifier_of(type_name: &str) -> Self {
        Self::IdentifierPrefix(format!("{type_name}--"))
    }

    /// Checks one value, returning the failure reason.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Equals(expected) => match value.as_str() {
                Some(s) if s == expected => Ok(()),
                _ => Err(format!("must equal '{expected}'.")),
            },
            Self::StartsWith(prefix) => match value.as_str() {
                Some(s) if s.starts_with(prefix.as_str()) => Ok(()),
                _ => Err(format!("must start with '{prefix}'.")),
            },
            Self::IdentifierPrefix(prefix) => {
                let s = value
                    .as_str()
                    .filter(|s| s.starts_with(prefix.as_str()))
                    .ok_or_else(|| format!("must start with '{prefix}'."))?;
                Identifier::parse(s)
                    .map(|_| ())
                    .map_err(|_| "must match <object-type>--<UUID>.".to_string())
            }
            Self::Range { min, max } => match value.as_i64() {
                Some(i) if (*min..=*max).contains(&i) => Ok(()),
                _ => Err(format!("must be between {min} and {max}.")),
            },
            Self::Custom(check) => check(value),
        }
    }
}

/// Metadata and behavior for one named property.
///
/// `required` and a default are mutually exclusive: attaching a default
/// makes the field optional.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    multiple: bool,
    default: Option<DefaultValue>,
    validator: Option<Validator>,
    post_set: Option<PostSetHook>,
}

impl FieldDescriptor {
    fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            kind,
            required,
            multiple: false,
            default: None,
            validator: None,
            post_set: None,
        }
    }

    /// A field that must hold a value once construction completes.
    #[must_use]
    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, true)
    }

    /// A field that may stay unset.
    #[must_use]
    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, false)
    }

    /// Holds an ordered sequence of `kind` values instead of a scalar.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Fills the field when absent. Clears `required`.
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn on_set(mut self, hook: PostSetHook) -> Self {
        self.post_set = Some(hook);
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    #[must_use]
    pub fn post_set_hook(&self) -> Option<PostSetHook> {
        self.post_set
    }

    /// Produces the value to store for this field.
    ///
    /// An absent `raw` falls back to the default, which then goes through
    /// the same coercion and validation as a supplied value. `Ok(None)`
    /// means the field stays unset. Storing the value and running the
    /// post-set hook is left to the owner. Hooks of entities nested in the
    /// value are queued on `pending` rather than run.
    pub(crate) fn assign(
        &self,
        ctx: &Context,
        owner: &EntityType,
        raw: Option<Value>,
        assigned: &Mapping,
        pending: &mut PendingHooks,
    ) -> ModelResult<Option<Value>> {
        let raw = match raw {
            Some(raw) => raw,
            None => {
                let scope = DefaultScope {
                    ctx,
                    entity_type: owner,
                    assigned,
                };
                match self.default.as_ref().and_then(|d| d.materialize(&scope)) {
                    Some(value) => value,
                    None => return Ok(None),
                }
            }
        };
        coerce::coerce(ctx, owner, self, raw, pending).map(Some)
    }
}
