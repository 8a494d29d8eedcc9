//! Type coercion from raw values to field values.
//!
//! Raw values are whatever a decoder or a caller produced: scalars,
//! lists and mappings. Each field kind accepts its already-typed form as
//! well, so re-assigning a value taken from another entity is a no-op.

use crate::entity::PendingHooks;
use crate::field::{FieldDescriptor, FieldKind};
use crate::related::IDREF_KEY;
use crate::{Context, EntityType, ModelError, ModelResult, RelatedObject, Value};
use stixkit_types::{Identifier, Timestamp};

/// Picks the concrete entity type a raw value will be built as.
///
/// Fixed for entity and related fields; read from the discriminator for
/// polymorphic ones. `Ok(None)` for scalar kinds.
pub fn resolve(
    ctx: &Context,
    field: &FieldDescriptor,
    raw: &Value,
) -> ModelResult<Option<&'static EntityType>> {
    match field.kind() {
        FieldKind::Entity(ty) | FieldKind::Related(ty) => Ok(Some(ty())),
        FieldKind::Polymorphic(registry) => {
            let registry = ctx.registry(registry)?;
            match raw {
                Value::Mapping(map) => registry.resolve(map).map(Some),
                Value::Entity(entity) => Ok(Some(entity.entity_type())),
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

/// Coerces and validates a raw value for `field` on `owner`.
pub(crate) fn coerce(
    ctx: &Context,
    owner: &EntityType,
    field: &FieldDescriptor,
    raw: Value,
    pending: &mut PendingHooks,
) -> ModelResult<Value> {
    if !field.is_multiple() {
        let value = coerce_one(ctx, owner, field, raw, field.name(), pending)?;
        validate(owner, field, &value)?;
        return Ok(value);
    }

    let items = match raw {
        Value::List(items) => items,
        single => vec![single],
    };
    if items.is_empty() && field.is_required() {
        return Err(ModelError::invalid(owner.name(), field.name(), "must not be empty."));
    }
    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let segment = format!("{}[{index}]", field.name());
        let value = coerce_one(ctx, owner, field, item, &segment, pending)?;
        validate(owner, field, &value)?;
        values.push(value);
    }
    Ok(Value::List(values))
}

fn validate(owner: &EntityType, field: &FieldDescriptor, value: &Value) -> ModelResult<()> {
    match field.validator() {
        Some(validator) => validator
            .check(value)
            .map_err(|reason| ModelError::invalid(owner.name(), field.name(), reason)),
        None => Ok(()),
    }
}

fn coerce_one(
    ctx: &Context,
    owner: &EntityType,
    field: &FieldDescriptor,
    raw: Value,
    segment: &str,
    pending: &mut PendingHooks,
) -> ModelResult<Value> {
    let invalid = |reason: String| ModelError::invalid(owner.name(), field.name(), reason);

    match field.kind() {
        FieldKind::String => match raw {
            Value::String(_) => Ok(raw),
            _ => Err(invalid("must be a string.".into())),
        },
        FieldKind::Boolean => match raw {
            Value::Bool(_) => Ok(raw),
            Value::String(ref s) if s == "true" || s == "1" => Ok(Value::Bool(true)),
            Value::String(ref s) if s == "false" || s == "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("must be a boolean.".into())),
        },
        FieldKind::Integer => match raw {
            Value::Integer(_) => Ok(raw),
            Value::String(ref s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid("must be an integer.".into())),
            _ => Err(invalid("must be an integer.".into())),
        },
        FieldKind::Float => match raw {
            Value::Float(_) => Ok(raw),
            Value::Integer(i) => Ok(Value::Float(i as f64)),
            Value::String(ref s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid("must be a number.".into())),
            _ => Err(invalid("must be a number.".into())),
        },
        FieldKind::Timestamp => match raw {
            Value::Timestamp(_) => Ok(raw),
            Value::String(ref s) => Timestamp::parse(s)
                .map(Value::Timestamp)
                .map_err(|_| invalid("must be a valid timestamp.".into())),
            _ => Err(invalid("must be a valid timestamp.".into())),
        },
        FieldKind::Identifier { allowed } => {
            let id = raw
                .as_str()
                .and_then(|s| Identifier::parse(s).ok())
                .ok_or_else(|| invalid("must match <object-type>--<UUID>.".into()))?;
            if !allowed.is_empty() && !allowed.contains(&id.type_name()) {
                return Err(invalid(format!(
                    "must reference one of: {}.",
                    allowed.join(", ")
                )));
            }
            Ok(Value::String(id.to_string()))
        }
        FieldKind::Dictionary => match raw {
            Value::Mapping(_) => Ok(raw),
            _ => Err(invalid("must be a mapping.".into())),
        },
        FieldKind::Entity(ty) => {
            let ty = ty();
            match raw {
                Value::Mapping(map) => ty
                    .build_deferred(ctx, map, pending)
                    .map(Value::from)
                    .map_err(|e| e.at(segment)),
                Value::Entity(ref entity) if entity.entity_type() == ty => Ok(raw),
                Value::Entity(_) => Err(invalid(format!("must be a {}.", ty.name()))),
                _ => Err(invalid("must be a mapping.".into())),
            }
        }
        FieldKind::Polymorphic(name) => {
            let registry = ctx.registry(name)?;
            match raw {
                Value::Mapping(map) => {
                    let ty = registry.resolve(&map).map_err(|e| e.at(segment))?;
                    ty.build_deferred(ctx, map, pending)
                        .map(Value::from)
                        .map_err(|e| e.at(segment))
                }
                Value::Entity(ref entity) if registry.contains_type(entity.entity_type()) => {
                    Ok(raw)
                }
                Value::Entity(_) => Err(invalid(format!("must be a registered '{name}' type."))),
                _ => Err(invalid("must be a mapping.".into())),
            }
        }
        FieldKind::Related(ty) => {
            let ty = ty();
            match raw {
                Value::Mapping(map) => {
                    let hint = RelatedObject::hint_for(&map);
                    RelatedObject::build_deferred(ctx, ty, map, hint, pending)
                        .map(Value::from)
                        .map_err(|e| e.at(segment))
                }
                Value::Related(ref related) if related.embeds_type(ty) => {
                    if related
                        .idref()
                        .is_some_and(|idref| Identifier::parse(idref).is_err())
                    {
                        return Err(ModelError::invalid(
                            "RelatedObject",
                            IDREF_KEY,
                            "must match <object-type>--<UUID>.",
                        )
                        .at(segment));
                    }
                    Ok(raw)
                }
                Value::Entity(entity) if entity.entity_type() == ty => {
                    Ok(Value::from(RelatedObject::inline(*entity, None)))
                }
                Value::Related(_) | Value::Entity(_) => {
                    Err(invalid(format!("must be a {}.", ty.name())))
                }
                _ => Err(invalid("must be a mapping.".into())),
            }
        }
    }
}
