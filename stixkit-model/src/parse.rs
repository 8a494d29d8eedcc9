//! Parsing façade: raw text or mappings in, entities out.

use crate::entity::json_kind;
use crate::value::mapping_from_json;
use crate::{Context, Entity, Mapping, ModelError, ModelResult};
use serde_json::Value as Json;

/// Anything [`parse`] accepts.
#[derive(Debug, Clone)]
pub enum ParseInput {
    /// Encoded text, decoded with the context's codec.
    Text(String),
    /// An already decoded document.
    Json(Json),
    /// A raw mapping.
    Mapping(Mapping),
}

impl From<&str> for ParseInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ParseInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Json> for ParseInput {
    fn from(json: Json) -> Self {
        Self::Json(json)
    }
}

impl From<Mapping> for ParseInput {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl ParseInput {
    fn into_mapping(self, ctx: &Context) -> ModelResult<Mapping> {
        let json = match self {
            Self::Mapping(mapping) => return Ok(mapping),
            Self::Json(json) => json,
            Self::Text(text) => ctx.codec().decode(&text)?,
        };
        match json {
            Json::Object(map) => Ok(mapping_from_json(map)),
            other => Err(ModelError::NotAMapping(json_kind(&other))),
        }
    }
}

/// Parses a document, picking its entity type from the top-level `type`
/// key through the context's type registry.
pub fn parse(ctx: &Context, input: impl Into<ParseInput>) -> ModelResult<Entity> {
    let mapping = input.into().into_mapping(ctx)?;
    let ty = ctx.types().resolve(&mapping)?;
    Entity::from_mapping(ctx, ty, mapping)
}

/// Parses a document as the named entity type (display name or type name).
pub fn parse_as(
    ctx: &Context,
    type_name: &str,
    input: impl Into<ParseInput>,
) -> ModelResult<Entity> {
    let ty = ctx.resolve_name(type_name)?;
    let mapping = input.into().into_mapping(ctx)?;
    Entity::from_mapping(ctx, ty, mapping)
}

/// Serializes an entity with the context's codec.
pub fn serialize(ctx: &Context, entity: &Entity, pretty: bool) -> ModelResult<String> {
    ctx.codec().encode(&entity.to_canonical_mapping(), pretty)
}
