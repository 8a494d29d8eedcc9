//! Shared test schema and context for model tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock};
use stixkit_model::{
    Context, DefaultValue, EntityType, FieldDescriptor, FieldKind, IdentityCache, Validator,
    Value, cache_entity,
};
use stixkit_types::{FixedClock, SequentialIds, Timestamp};

/// A small identified type exercising every field feature.
pub fn note_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Note", "note")
            .identified_by("id")
            .with_field(
                FieldDescriptor::optional("type", FieldKind::String)
                    .with_default(DefaultValue::Fixed(Value::from("note")))
                    .validated(Validator::Equals("note".into())),
            )
            .with_field(
                FieldDescriptor::optional("id", FieldKind::String)
                    .with_default(DefaultValue::GenerateId)
                    .validated(Validator::identifier_of("note"))
                    .on_set(cache_entity),
            )
            .with_field(
                FieldDescriptor::optional("created", FieldKind::Timestamp)
                    .with_default(DefaultValue::Now),
            )
            .with_field(
                FieldDescriptor::optional("modified", FieldKind::Timestamp)
                    .with_default(DefaultValue::SameAs("created")),
            )
            .with_field(FieldDescriptor::required("title", FieldKind::String))
            .with_field(FieldDescriptor::required("body", FieldKind::String))
            .with_field(FieldDescriptor::optional("tags", FieldKind::String).multiple())
            .with_field(
                FieldDescriptor::optional("priority", FieldKind::Integer)
                    .validated(Validator::Range { min: 0, max: 10 }),
            )
            .with_field(FieldDescriptor::optional("pinned", FieldKind::Boolean))
            .with_field(FieldDescriptor::optional(
                "attachment",
                FieldKind::Polymorphic("attachments"),
            ))
            .with_field(FieldDescriptor::optional("author", FieldKind::Entity(person_type)))
            .with_field(
                FieldDescriptor::optional("see_also", FieldKind::Related(note_type)).multiple(),
            )
    });
    &TYPE
}

/// A nested, unidentified type.
pub fn person_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Person", "person")
            .with_field(FieldDescriptor::required("name", FieldKind::String))
            .with_field(FieldDescriptor::optional("email", FieldKind::String))
    });
    &TYPE
}

pub fn link_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Link", "link")
            .tagged("kind", "LinkAttachment")
            .with_field(FieldDescriptor::required("url", FieldKind::String))
    });
    &TYPE
}

pub fn image_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Image", "image")
            .tagged("kind", "ImageAttachment")
            .with_field(FieldDescriptor::required("path", FieldKind::String))
            .with_field(FieldDescriptor::optional("width", FieldKind::Integer))
    });
    &TYPE
}

/// An open type that keeps unknown keys.
pub fn bag_type() -> &'static EntityType {
    static TYPE: LazyLock<EntityType> = LazyLock::new(|| {
        EntityType::new("Bag", "bag")
            .open()
            .with_field(FieldDescriptor::optional("label", FieldKind::String))
    });
    &TYPE
}

pub fn fake_time() -> Timestamp {
    Timestamp::from_ymd_hms(2017, 1, 1, 12, 34, 56).unwrap()
}

/// A deterministic context with an isolated cache.
pub fn context() -> Context {
    context_with_cache(Arc::new(IdentityCache::new()))
}

pub fn context_with_cache(cache: Arc<IdentityCache>) -> Context {
    let mut ctx = Context::new()
        .with_cache(cache)
        .with_id_generator(SequentialIds::new())
        .with_clock(FixedClock(fake_time()));
    ctx.register_type(note_type()).unwrap();
    ctx.register_named(person_type());
    ctx.register_named(bag_type());
    ctx.define_registry("attachments", "kind");
    ctx.register_variant("attachments", "LinkAttachment", link_type())
        .unwrap();
    ctx.register_variant("attachments", "ImageAttachment", image_type())
        .unwrap();
    ctx
}

pub fn note_values() -> Vec<(&'static str, Value)> {
    vec![("title", Value::from("Hello")), ("body", Value::from("World"))]
}

pub const FIRST_NOTE_ID: &str = "note--00000000-0000-4000-8000-000000000001";
