//! Error types for entity construction, parsing and resolution.

use thiserror::Error;

/// Entity model errors.
///
/// Construction either succeeds or returns one of these; no partially
/// built entity is ever handed back.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Required fields were still unset after construction.
    #[error("No values for required properties for {type_name}: ({}).", .properties.join(", "))]
    MissingRequiredProperties {
        type_name: String,
        properties: Vec<String>,
    },

    /// Supplied keys that the entity type does not declare.
    #[error("Unexpected properties for {type_name}: ({}).", .properties.join(", "))]
    UnexpectedProperties {
        type_name: String,
        properties: Vec<String>,
    },

    /// A value failed coercion or its field's validator.
    #[error("Invalid value for {type_name} '{property}': {reason}")]
    InvalidPropertyValue {
        type_name: String,
        property: String,
        reason: String,
    },

    /// A by-reference lookup found no cached entity.
    #[error("unresolved reference: no cached entity with identifier '{0}'")]
    UnresolvedReference(String),

    /// A polymorphic value carried a type tag nobody registered.
    #[error("unknown discriminator '{tag}' in registry '{registry}'")]
    UnknownDiscriminator { registry: String, tag: String },

    /// A polymorphic value carried no type tag at all.
    #[error("missing discriminator key '{key}' in registry '{registry}'")]
    MissingDiscriminator { registry: String, key: String },

    /// A registry already holds a constructor for this tag.
    #[error("discriminator '{tag}' is already registered in registry '{registry}'")]
    DuplicateRegistration { registry: String, tag: String },

    /// A polymorphic field names a registry the context does not define.
    #[error("unknown registry: {0}")]
    UnknownRegistry(String),

    /// `parse_as` was given a type name nobody registered.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// An operation needed an identifier the entity does not have.
    #[error("{type_name} has no identifier")]
    MissingIdentifier { type_name: String },

    /// Parse input was not a mapping at the top level.
    #[error("expected a mapping, found {0}")]
    NotAMapping(&'static str),

    /// List input was not an array.
    #[error("expected a list, found {0}")]
    NotAList(&'static str),

    /// Several construction failures, in the order they were found.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ModelError>),

    /// An error raised while building a nested value.
    #[error("at {path}: {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<ModelError>,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn invalid(
        type_name: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPropertyValue {
            type_name: type_name.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the error with a document path segment.
    ///
    /// Nested calls build paths outermost-first, e.g.
    /// `related_objects[0].properties`.
    #[must_use]
    pub fn at(self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref();
        match self {
            Self::AtPath { path, source } => {
                let joiner = if path.starts_with('[') { "" } else { "." };
                Self::AtPath {
                    path: format!("{segment}{joiner}{path}"),
                    source,
                }
            }
            other => Self::AtPath {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Returns the error with any path annotation stripped.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::AtPath { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the document path, if the error was raised below the top level.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Collapses collected errors: one stays itself, several become `Multiple`.
    pub(crate) fn collapse(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
