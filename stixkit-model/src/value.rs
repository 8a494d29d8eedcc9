//! Property values, raw and coerced.
//!
//! A [`Value`] is what callers hand to construction and what fields hold
//! afterwards. Raw decoded data arrives as scalars, [`Value::List`] and
//! [`Value::Mapping`]; coercion turns those into timestamps, nested
//! [`Entity`] values and [`RelatedObject`]s according to each field's kind.

use crate::{Entity, RelatedObject};
use indexmap::IndexMap;
use serde_json::Value as Json;
use stixkit_types::{Identifier, Timestamp};

/// Insertion-ordered property mapping.
pub type Mapping = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
    List(Vec<Value>),
    Mapping(Mapping),
    Entity(Box<Entity>),
    Related(Box<RelatedObject>),
}

impl Value {
    /// Short name of the variant, used in error reasons.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Timestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Mapping(_) => "mapping",
            Self::Entity(_) => "entity",
            Self::Related(_) => "related object",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_related(&self) -> Option<&RelatedObject> {
        match self {
            Self::Related(related) => Some(related),
            _ => None,
        }
    }

    /// Converts to the canonical JSON form.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Timestamp(ts) => Json::String(ts.to_string()),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Mapping(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Entity(entity) => Json::Object(entity.to_canonical_mapping()),
            Self::Related(related) => Json::Object(related.to_canonical_mapping()),
        }
    }
}

/// Converts decoded JSON into raw values.
///
/// `null` has no counterpart: nulls inside mappings and lists are dropped,
/// so an explicit `null` reads the same as an absent key. A bare `null`
/// becomes an empty mapping.
impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(Value::from)
                    .collect(),
            ),
            Json::Object(map) => Self::Mapping(mapping_from_json(map)),
            Json::Null => Self::Mapping(Mapping::new()),
        }
    }
}

/// Converts a decoded JSON object into a raw mapping, dropping nulls.
#[must_use]
pub fn mapping_from_json(map: serde_json::Map<String, Json>) -> Mapping {
    map.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k, Value::from(v)))
        .collect()
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<Identifier> for Value {
    fn from(id: Identifier) -> Self {
        Self::String(id.to_string())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Self::Mapping(map)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Entity(Box::new(entity))
    }
}

impl From<RelatedObject> for Value {
    fn from(related: RelatedObject) -> Self {
        Self::Related(Box::new(related))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
