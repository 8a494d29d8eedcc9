//! Homogeneous, ordered lists of entities or related objects.
//!
//! On the wire a list is a plain array; in a field it is a
//! [`Value::List`]. [`EntityList`] is the typed handle used to build or
//! read one without going through raw values.

use crate::field::FieldKind;
use crate::value::mapping_from_json;
use crate::{Context, Entity, EntityType, ModelError, ModelResult, RelatedObject, Value};
use serde_json::Value as Json;
use std::slice;

/// An element type an [`EntityList`] can hold.
pub trait ListElement: Clone + PartialEq + Into<Value> {
    /// Whether this element belongs in a list of `element_type`.
    fn fits(&self, element_type: &EntityType) -> bool;

    /// Extracts an element from a stored field value.
    fn from_value(value: &Value) -> Option<Self>;

    /// Builds an element from one decoded array item.
    fn from_raw(ctx: &Context, element_type: &'static EntityType, raw: Json) -> ModelResult<Self>;

    fn to_json(&self) -> Json;
}

impl ListElement for Entity {
    fn fits(&self, element_type: &EntityType) -> bool {
        self.entity_type() == element_type
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_entity().cloned()
    }

    fn from_raw(ctx: &Context, element_type: &'static EntityType, raw: Json) -> ModelResult<Self> {
        Entity::from_json(ctx, element_type, raw)
    }

    fn to_json(&self) -> Json {
        Json::Object(self.to_canonical_mapping())
    }
}

impl ListElement for RelatedObject {
    fn fits(&self, element_type: &EntityType) -> bool {
        self.embeds_type(element_type)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_related().cloned()
    }

    fn from_raw(ctx: &Context, element_type: &'static EntityType, raw: Json) -> ModelResult<Self> {
        match raw {
            Json::Object(map) => {
                RelatedObject::from_mapping(ctx, element_type, mapping_from_json(map))
            }
            other => Err(ModelError::NotAMapping(crate::entity::json_kind(&other))),
        }
    }

    fn to_json(&self) -> Json {
        Json::Object(self.to_canonical_mapping())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityList<T: ListElement = Entity> {
    element_type: &'static EntityType,
    items: Vec<T>,
}

impl<T: ListElement> EntityList<T> {
    #[must_use]
    pub fn new(element_type: &'static EntityType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Builds a list, rejecting the first item of the wrong type.
    pub fn from_items(
        element_type: &'static EntityType,
        items: impl IntoIterator<Item = T>,
    ) -> ModelResult<Self> {
        let mut list = Self::new(element_type);
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    /// Reads the list stored in a multiple entity or related field.
    ///
    /// `None` if the field is not declared as such a list. An unset field
    /// reads as an empty list.
    #[must_use]
    pub fn from_field(entity: &Entity, field: &str) -> Option<Self> {
        let descriptor = entity.entity_type().descriptor(field)?;
        if !descriptor.is_multiple() {
            return None;
        }
        let element_type = match descriptor.kind() {
            FieldKind::Entity(ty) | FieldKind::Related(ty) => ty(),
            _ => return None,
        };
        let items = entity
            .get_list(field)
            .map(|values| values.iter().filter_map(T::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            element_type,
            items,
        })
    }

    /// Decodes an array, building every item as `element_type`.
    pub fn from_json(
        ctx: &Context,
        element_type: &'static EntityType,
        json: Json,
    ) -> ModelResult<Self> {
        let raw_items = match json {
            Json::Array(raw_items) => raw_items,
            other => return Err(ModelError::NotAList(crate::entity::json_kind(&other))),
        };
        let mut list = Self::new(element_type);
        for (index, raw) in raw_items.into_iter().enumerate() {
            let item = T::from_raw(ctx, element_type, raw).map_err(|e| e.at(format!("[{index}]")))?;
            list.items.push(item);
        }
        Ok(list)
    }

    pub fn push(&mut self, item: T) -> ModelResult<()> {
        if !item.fits(self.element_type) {
            return Err(ModelError::invalid(
                self.element_type.name(),
                format!("[{}]", self.items.len()),
                format!("must be a {}.", self.element_type.name()),
            ));
        }
        self.items.push(item);
        Ok(())
    }

    #[must_use]
    pub const fn element_type(&self) -> &'static EntityType {
        self.element_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The array form: each element's canonical form, in order.
    #[must_use]
    pub fn to_json(&self) -> Json {
        Json::Array(self.items.iter().map(ListElement::to_json).collect())
    }
}

impl<T: ListElement> From<EntityList<T>> for Value {
    fn from(list: EntityList<T>) -> Self {
        Value::List(list.items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: ListElement> IntoIterator for &'a EntityList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: ListElement> IntoIterator for EntityList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
