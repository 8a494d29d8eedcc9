//! Related entities, embedded inline or pointed to by identifier.
//!
//! A [`RelatedObject`] is always in exactly one [`ReferenceForm`]:
//!
//! - `Inline` embeds the full entity.
//! - `ByReference` keeps only the entity's identifier (`idref`).
//!
//! Both carry an optional relationship tag. Turning an inline object into
//! a reference reads the embedded identifier once and drops the payload.
//! Resolving a reference goes through the [`IdentityCache`](crate::IdentityCache).
//!
//! When parsing, a record presented as a reference that has no `idref`
//! but does carry embedded data is read as inline.

use crate::entity::{PendingHooks, run_post_set_hooks};
use crate::{Context, Entity, EntityType, Mapping, ModelError, ModelResult, Value};
use serde_json::Value as Json;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use stixkit_types::Identifier;
use tracing::trace;

/// Record key holding the referenced identifier.
pub const IDREF_KEY: &str = "idref";
/// Record key holding the relationship tag.
pub const RELATIONSHIP_KEY: &str = "relationship";

const TYPE_NAME: &str = "RelatedObject";

#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceForm {
    Inline(Box<Entity>),
    ByReference(String),
}

/// The form a record is presented in before it is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormHint {
    Inline,
    ByReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelatedObject {
    form: ReferenceForm,
    relationship: Option<String>,
}

impl RelatedObject {
    #[must_use]
    pub fn inline(entity: Entity, relationship: Option<String>) -> Self {
        Self {
            form: ReferenceForm::Inline(Box::new(entity)),
            relationship,
        }
    }

    #[must_use]
    pub fn by_reference(idref: impl Into<String>, relationship: Option<String>) -> Self {
        Self {
            form: ReferenceForm::ByReference(idref.into()),
            relationship,
        }
    }

    /// Relates `entity`, embedding it if `inline`, otherwise keeping only
    /// its identifier.
    pub fn new(entity: Entity, relationship: Option<String>, inline: bool) -> ModelResult<Self> {
        let related = Self::inline(entity, relationship);
        if inline {
            Ok(related)
        } else {
            related.into_reference()
        }
    }

    /// Moves `Inline` to `ByReference`, discarding the embedded payload.
    ///
    /// Fails with `MissingIdentifier` if the embedded entity has no
    /// identifier. A `ByReference` object is returned unchanged.
    pub fn into_reference(self) -> ModelResult<Self> {
        match self.form {
            ReferenceForm::Inline(entity) => {
                let idref = entity
                    .identifier()
                    .ok_or_else(|| ModelError::MissingIdentifier {
                        type_name: entity.entity_type().name().to_string(),
                    })?
                    .to_string();
                Ok(Self::by_reference(idref, self.relationship))
            }
            ReferenceForm::ByReference(_) => Ok(self),
        }
    }

    #[must_use]
    pub fn form(&self) -> &ReferenceForm {
        &self.form
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.form, ReferenceForm::Inline(_))
    }

    /// The referenced identifier, for `ByReference` objects.
    #[must_use]
    pub fn idref(&self) -> Option<&str> {
        match &self.form {
            ReferenceForm::ByReference(idref) => Some(idref),
            ReferenceForm::Inline(_) => None,
        }
    }

    /// The embedded entity, for `Inline` objects.
    #[must_use]
    pub fn embedded(&self) -> Option<&Entity> {
        match &self.form {
            ReferenceForm::Inline(entity) => Some(entity),
            ReferenceForm::ByReference(_) => None,
        }
    }

    /// Identifier of the related entity in either form.
    #[must_use]
    pub fn target_identifier(&self) -> Option<&str> {
        match &self.form {
            ReferenceForm::Inline(entity) => entity.identifier(),
            ReferenceForm::ByReference(idref) => Some(idref),
        }
    }

    #[must_use]
    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }

    pub fn set_relationship(&mut self, relationship: Option<String>) {
        self.relationship = relationship;
    }

    /// Returns true if an inline payload is of type `ty`. References match
    /// any type, since their target is unknown until resolved.
    #[must_use]
    pub fn embeds_type(&self, ty: &EntityType) -> bool {
        match &self.form {
            ReferenceForm::Inline(entity) => entity.entity_type() == ty,
            ReferenceForm::ByReference(_) => true,
        }
    }

    /// The related entity: the embedded one, or the cache entry for the
    /// reference. A reference missing from the cache is `UnresolvedReference`.
    pub fn resolve(&self, ctx: &Context) -> ModelResult<Resolved<'_>> {
        match &self.form {
            ReferenceForm::Inline(entity) => Ok(Resolved::Inline(entity)),
            ReferenceForm::ByReference(idref) => ctx.cache().lookup(idref).map(Resolved::Cached),
        }
    }

    /// Parses a record, reading it as a reference when it has an `idref`.
    pub fn from_mapping(
        ctx: &Context,
        embedded_type: &'static EntityType,
        mapping: Mapping,
    ) -> ModelResult<Self> {
        let hint = Self::hint_for(&mapping);
        Self::from_mapping_as(ctx, embedded_type, mapping, hint)
    }

    pub(crate) fn hint_for(mapping: &Mapping) -> FormHint {
        if mapping.contains_key(IDREF_KEY) {
            FormHint::ByReference
        } else {
            FormHint::Inline
        }
    }

    /// Parses a record presented in the `hint` form.
    ///
    /// | idref | payload | result                                   |
    /// |-------|---------|------------------------------------------|
    /// | yes   | no      | `ByReference`                            |
    /// | no    | yes     | `Inline`, even when hinted as reference  |
    /// | yes   | yes     | the hinted form; the other part dropped  |
    /// | no    | no      | `MissingRequiredProperties(idref)`       |
    pub fn from_mapping_as(
        ctx: &Context,
        embedded_type: &'static EntityType,
        mapping: Mapping,
        hint: FormHint,
    ) -> ModelResult<Self> {
        let mut pending = PendingHooks::new();
        let related = Self::build_deferred(ctx, embedded_type, mapping, hint, &mut pending)?;
        run_post_set_hooks(ctx, pending);
        Ok(related)
    }

    /// [`from_mapping_as`](Self::from_mapping_as) with the embedded
    /// entity's post-set hooks queued on `pending`.
    pub(crate) fn build_deferred(
        ctx: &Context,
        embedded_type: &'static EntityType,
        mut mapping: Mapping,
        hint: FormHint,
        pending: &mut PendingHooks,
    ) -> ModelResult<Self> {
        let relationship = match mapping.shift_remove(RELATIONSHIP_KEY) {
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                return Err(ModelError::invalid(
                    TYPE_NAME,
                    RELATIONSHIP_KEY,
                    "must be a string.",
                ));
            }
            None => None,
        };
        let idref = match mapping.shift_remove(IDREF_KEY) {
            Some(Value::String(s)) if Identifier::parse(&s).is_ok() => Some(s),
            Some(_) => {
                return Err(ModelError::invalid(
                    TYPE_NAME,
                    IDREF_KEY,
                    "must match <object-type>--<UUID>.",
                ));
            }
            None => None,
        };
        let has_payload = !mapping.is_empty();

        let form = match (idref, has_payload) {
            (Some(idref), false) => ReferenceForm::ByReference(idref),
            (Some(idref), true) if hint == FormHint::ByReference => {
                trace!(idref = %idref, "Dropping embedded payload of reference record");
                ReferenceForm::ByReference(idref)
            }
            (_, true) => {
                if hint == FormHint::ByReference {
                    trace!(
                        entity_type = embedded_type.name(),
                        "Reference record without idref carries a payload; reading it inline"
                    );
                }
                let entity = embedded_type.build_deferred(ctx, mapping, pending)?;
                ReferenceForm::Inline(Box::new(entity))
            }
            (None, false) => {
                return Err(ModelError::MissingRequiredProperties {
                    type_name: TYPE_NAME.to_string(),
                    properties: vec![IDREF_KEY.to_string()],
                });
            }
        };
        Ok(Self { form, relationship })
    }

    /// `Inline`: the embedded entity's mapping plus `relationship`.
    /// `ByReference`: `idref` plus `relationship`, nothing else.
    #[must_use]
    pub fn to_canonical_mapping(&self) -> serde_json::Map<String, Json> {
        let mut out = match &self.form {
            ReferenceForm::Inline(entity) => entity.to_canonical_mapping(),
            ReferenceForm::ByReference(idref) => {
                let mut out = serde_json::Map::new();
                out.insert(IDREF_KEY.to_string(), Json::String(idref.clone()));
                out
            }
        };
        if let Some(relationship) = &self.relationship {
            out.insert(
                RELATIONSHIP_KEY.to_string(),
                Json::String(relationship.clone()),
            );
        }
        out
    }
}

impl fmt::Display for RelatedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.form {
            ReferenceForm::Inline(entity) => write!(f, "Related: {entity}"),
            ReferenceForm::ByReference(idref) => write!(f, "Related: {idref}"),
        }
    }
}

/// A resolved related entity.
#[derive(Debug)]
pub enum Resolved<'a> {
    Inline(&'a Entity),
    Cached(Arc<Entity>),
}

impl Resolved<'_> {
    /// The shared cache entry, when resolution went through the cache.
    #[must_use]
    pub fn shared(&self) -> Option<&Arc<Entity>> {
        match self {
            Self::Cached(entity) => Some(entity),
            Self::Inline(_) => None,
        }
    }
}

impl Deref for Resolved<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        match self {
            Self::Inline(entity) => entity,
            Self::Cached(entity) => entity.as_ref(),
        }
    }
}
