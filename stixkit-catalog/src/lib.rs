//! Concrete stixkit entity types.
//!
//! - [`Grouping`]: the STIX 2.1 Grouping object
//! - [`Object`]: the CybOX Object with polymorphic properties and related objects
//! - [`properties`]: object property types dispatched by `xsi:type`
//!
//! [`register`] adds every type here to a [`Context`]; [`new_context`]
//! does so on a fresh default context.

mod grouping;
mod object;
pub mod properties;

pub use grouping::{Grouping, GroupingBuilder, grouping_type};
pub use object::{Object, object_type};

use stixkit_model::{Context, ModelResult};
use tracing::debug;

/// Registers the catalog's types and property registries on `ctx`.
///
/// Grouping is parseable by its `type`; Object, which has no `type` key,
/// is reachable through [`parse_as`](stixkit_model::parse_as).
pub fn register(ctx: &mut Context) -> ModelResult<()> {
    ctx.register_type(grouping_type())?;
    ctx.register_named(object_type());
    properties::register(ctx)?;
    debug!(types = ctx.types().len(), "Registered catalog types");
    Ok(())
}

/// A default [`Context`] with the catalog registered.
pub fn new_context() -> ModelResult<Context> {
    let mut ctx = Context::new();
    register(&mut ctx)?;
    Ok(ctx)
}
