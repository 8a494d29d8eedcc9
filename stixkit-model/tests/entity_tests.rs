mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use stixkit_model::{Entity, ModelConfig, ModelError, Value};
use stixkit_types::Timestamp;

fn note(ctx: &stixkit_model::Context) -> Entity {
    Entity::new(ctx, note_type(), note_values()).unwrap()
}

// ── Defaults ─────────────────────────────────────────────────────

#[test]
fn defaults_fill_type_id_and_timestamps() {
    let ctx = context();
    let e = note(&ctx);
    assert_eq!(e.get_str("type"), Some("note"));
    assert_eq!(e.identifier(), Some(FIRST_NOTE_ID));
    assert_eq!(e.get_timestamp("created"), Some(fake_time()));
    assert_eq!(e.get_timestamp("modified"), Some(fake_time()));
}

#[test]
fn modified_defaults_to_supplied_created() {
    let ctx = context();
    let mut values = note_values();
    values.push(("created", Value::from("2020-02-02T01:02:03Z")));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    let expected = Timestamp::from_ymd_hms(2020, 2, 2, 1, 2, 3).unwrap();
    assert_eq!(e.get_timestamp("created"), Some(expected));
    assert_eq!(e.get_timestamp("modified"), Some(expected));
}

#[test]
fn supplied_values_override_defaults() {
    let ctx = context();
    let id = "note--3b5c1e0a-9f1d-4c8e-a0f2-6c9a4d2b7e11";
    let mut values = note_values();
    values.push(("id", Value::from(id)));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    assert_eq!(e.identifier(), Some(id));
}

#[test]
fn optional_fields_without_default_stay_unset() {
    let ctx = context();
    let e = note(&ctx);
    assert!(!e.is_set("priority"));
    assert!(!e.is_set("tags"));
    assert!(e.get("priority").is_none());
}

// ── Coercion ─────────────────────────────────────────────────────

#[test]
fn numeric_and_boolean_strings_are_coerced() {
    let ctx = context();
    let mut values = note_values();
    values.push(("priority", Value::from("7")));
    values.push(("pinned", Value::from("true")));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    assert_eq!(e.get_i64("priority"), Some(7));
    assert_eq!(e.get_bool("pinned"), Some(true));
}

#[test]
fn scalar_is_wrapped_for_multiple_field() {
    let ctx = context();
    let mut values = note_values();
    values.push(("tags", Value::from("work")));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    assert_eq!(e.get_strs("tags"), vec!["work"]);
}

#[test]
fn list_values_keep_order() {
    let ctx = context();
    let mut values = note_values();
    values.push(("tags", Value::from(vec!["b", "a", "c"])));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    assert_eq!(e.get_strs("tags"), vec!["b", "a", "c"]);
}

#[test]
fn nested_entity_is_built_from_mapping() {
    let ctx = context();
    let e = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "author": {"name": "Ada"}}),
    )
    .unwrap();
    let author = e.get_entity("author").unwrap();
    assert_eq!(author.entity_type(), person_type());
    assert_eq!(author.get_str("name"), Some("Ada"));
}

#[test]
fn nested_entity_errors_carry_path() {
    let ctx = context();
    let err = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "author": {"email": "a@b.c"}}),
    )
    .unwrap_err();
    assert_eq!(err.path(), Some("author"));
    assert_eq!(
        err.root().to_string(),
        "No values for required properties for Person: (name)."
    );
}

#[test]
fn entity_of_wrong_type_is_rejected() {
    let ctx = context();
    let other = note(&ctx);
    let mut values = note_values();
    values.push(("author", Value::from(other)));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'author': must be a Person."
    );
}

// ── Polymorphic fields ───────────────────────────────────────────

#[test]
fn polymorphic_field_dispatches_on_discriminator() {
    let ctx = context();
    let e = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "attachment": {"kind": "ImageAttachment", "path": "/a.png", "width": 640}}),
    )
    .unwrap();
    let attachment = e.get_entity("attachment").unwrap();
    assert_eq!(attachment.entity_type(), image_type());
    assert_eq!(attachment.get_i64("width"), Some(640));
}

#[test]
fn polymorphic_tag_is_written_first() {
    let ctx = context();
    let e = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "attachment": {"url": "https://x.test", "kind": "LinkAttachment"}}),
    )
    .unwrap();
    let text = e.get_entity("attachment").unwrap().serialize(false).unwrap();
    assert_eq!(text, r#"{"kind":"LinkAttachment","url":"https://x.test"}"#);
}

#[test]
fn unknown_discriminator_is_rejected() {
    let ctx = context();
    let err = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "attachment": {"kind": "VideoAttachment"}}),
    )
    .unwrap_err();
    assert_eq!(err.path(), Some("attachment"));
    assert!(matches!(
        err.root(),
        ModelError::UnknownDiscriminator { tag, .. } if tag == "VideoAttachment"
    ));
}

#[test]
fn missing_discriminator_is_rejected() {
    let ctx = context();
    let err = Entity::from_json(
        &ctx,
        note_type(),
        json!({"title": "t", "body": "b", "attachment": {"url": "https://x.test"}}),
    )
    .unwrap_err();
    assert!(matches!(
        err.root(),
        ModelError::MissingDiscriminator { key, .. } if key == "kind"
    ));
}

#[test]
fn variant_with_mismatched_tag_is_rejected() {
    let ctx = context();
    let err = Entity::from_json(
        &ctx,
        link_type(),
        json!({"kind": "ImageAttachment", "url": "https://x.test"}),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Link 'kind': must equal 'LinkAttachment'."
    );
}

// ── Validation errors ────────────────────────────────────────────

#[test]
fn missing_required_fields_are_listed_in_order() {
    let ctx = context();
    let err = Entity::new(&ctx, note_type(), Vec::<(&str, Value)>::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No values for required properties for Note: (title, body)."
    );
}

#[test]
fn unexpected_properties_are_reported() {
    let ctx = context();
    let mut values = note_values();
    values.push(("color", Value::from("red")));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected properties for Note: (color).");
}

#[test]
fn literal_type_is_enforced() {
    let ctx = context();
    let mut values = note_values();
    values.push(("type", Value::from("memo")));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'type': must equal 'note'."
    );
}

#[test]
fn identifier_prefix_is_checked_before_uuid() {
    let ctx = context();
    let mut values = note_values();
    values.push(("id", Value::from("memo--not-a-uuid")));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'id': must start with 'note--'."
    );
}

#[test]
fn identifier_uuid_is_checked() {
    let ctx = context();
    let mut values = note_values();
    values.push(("id", Value::from("note--not-a-uuid")));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'id': must match <object-type>--<UUID>."
    );
}

#[test]
fn identifier_uuid_must_be_hyphenated() {
    let ctx = context();
    let mut values = note_values();
    values.push(("id", Value::from("note--{5e0c3f5a-2b1d-4f7e-9a3c-1d2e3f4a5b6c}")));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'id': must match <object-type>--<UUID>."
    );
}

#[test]
fn range_validator_rejects_out_of_bounds() {
    let ctx = context();
    let mut values = note_values();
    values.push(("priority", Value::from(11)));
    let err = Entity::new(&ctx, note_type(), values).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value for Note 'priority': must be between 0 and 10."
    );
}

#[test]
fn rejected_required_field_is_not_also_missing() {
    let ctx = context();
    let err = Entity::new(
        &ctx,
        note_type(),
        vec![("title", Value::from(5)), ("body", Value::from("b"))],
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidPropertyValue { ref property, .. } if property == "title"));
}

#[test]
fn errors_are_collected_invalid_missing_unexpected() {
    let ctx = context();
    let err = Entity::new(
        &ctx,
        note_type(),
        vec![("priority", Value::from(99)), ("color", Value::from("red"))],
    )
    .unwrap_err();
    let errors = match err {
        ModelError::Multiple(errors) => errors,
        other => panic!("expected several errors, got {other:?}"),
    };
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], ModelError::InvalidPropertyValue { .. }));
    assert!(matches!(errors[1], ModelError::MissingRequiredProperties { .. }));
    assert!(matches!(errors[2], ModelError::UnexpectedProperties { .. }));
}

#[test]
fn failed_construction_caches_nothing() {
    let ctx = context();
    let mut values = note_values();
    values.push(("priority", Value::from(-1)));
    assert!(Entity::new(&ctx, note_type(), values).is_err());
    assert!(ctx.cache().is_empty());
}

const INNER_ID: &str = "note--5e0c3f5a-2b1d-4f7e-9a3c-1d2e3f4a5b6c";

#[test]
fn failed_outer_construction_caches_no_nested_entity() {
    let ctx = context();
    let result = Entity::from_json(
        &ctx,
        note_type(),
        json!({
            "title": "outer",
            "body": "b",
            "bogus": 1,
            "see_also": [{"id": INNER_ID, "title": "inner", "body": "x"}]
        }),
    );
    assert!(matches!(
        result,
        Err(ModelError::UnexpectedProperties { .. })
    ));
    assert!(!ctx.cache().contains(INNER_ID));
    assert!(ctx.cache().is_empty());
}

#[test]
fn nested_entities_are_cached_once_outer_succeeds() {
    let ctx = context();
    let outer = Entity::from_json(
        &ctx,
        note_type(),
        json!({
            "title": "outer",
            "body": "b",
            "see_also": [{"id": INNER_ID, "title": "inner", "body": "x"}]
        }),
    )
    .unwrap();
    assert_eq!(ctx.cache().len(), 2);
    assert!(ctx.cache().contains(INNER_ID));
    assert!(ctx.cache().contains(outer.identifier().unwrap()));
}

#[test]
fn failed_set_caches_no_nested_entity() {
    let ctx = context();
    let mut e = Entity::new(&ctx, note_type(), note_values()).unwrap();
    let raw = json!([
        {"id": INNER_ID, "title": "inner", "body": "x"},
        {"idref": "garbage"}
    ]);
    let err = e.set(&ctx, "see_also", Value::from(raw)).unwrap_err();
    assert_eq!(err.path(), Some("see_also[1]"));
    assert!(!e.is_set("see_also"));
    assert!(!ctx.cache().contains(INNER_ID));
    assert_eq!(ctx.cache().len(), 1);
}

#[test]
fn non_mapping_json_is_rejected() {
    let ctx = context();
    let err = Entity::from_json(&ctx, note_type(), json!([1, 2])).unwrap_err();
    assert!(matches!(err, ModelError::NotAMapping("array")));
}

// ── Custom properties ────────────────────────────────────────────

#[test]
fn open_type_keeps_unknown_keys_after_declared_fields() {
    let ctx = context();
    let e = Entity::from_json(&ctx, bag_type(), json!({"zeta": 1, "label": "x", "alpha": true}))
        .unwrap();
    assert_eq!(e.custom_properties().len(), 2);
    assert_eq!(
        e.serialize(false).unwrap(),
        r#"{"label":"x","zeta":1,"alpha":true}"#
    );
}

#[test]
fn config_allows_custom_properties_on_closed_types() {
    let ctx = context().with_config(ModelConfig {
        allow_custom_properties: true,
        ..ModelConfig::default()
    });
    let mut values = note_values();
    values.push(("x_color", Value::from("red")));
    let e = Entity::new(&ctx, note_type(), values).unwrap();
    assert_eq!(e.get_str("x_color"), Some("red"));
}

// ── Mutation ─────────────────────────────────────────────────────

#[test]
fn set_goes_through_coercion() {
    let ctx = context();
    let mut e = note(&ctx);
    e.set(&ctx, "priority", "3").unwrap();
    assert_eq!(e.get_i64("priority"), Some(3));
}

#[test]
fn failed_set_leaves_entity_unchanged() {
    let ctx = context();
    let mut e = note(&ctx);
    e.set(&ctx, "priority", 4).unwrap();
    let before = e.clone();
    assert!(e.set(&ctx, "priority", 40).is_err());
    assert_eq!(e, before);
}

#[test]
fn set_unknown_field_on_closed_type_fails() {
    let ctx = context();
    let mut e = note(&ctx);
    let err = e.set(&ctx, "color", "red").unwrap_err();
    assert_eq!(err.to_string(), "Unexpected properties for Note: (color).");
}

#[test]
fn set_identifier_recaches() {
    let ctx = context();
    let mut e = note(&ctx);
    let id = "note--9d1f0a2b-3c4d-4e5f-8a6b-7c8d9e0f1a2b";
    e.set(&ctx, "id", id).unwrap();
    assert!(ctx.cache().contains(id));
    assert!(ctx.cache().contains(FIRST_NOTE_ID));
}

#[test]
fn unset_optional_returns_previous_value() {
    let ctx = context();
    let mut e = note(&ctx);
    e.set(&ctx, "pinned", true).unwrap();
    assert_eq!(e.unset("pinned").unwrap(), Some(Value::Bool(true)));
    assert!(!e.is_set("pinned"));
}

#[test]
fn unset_required_fails() {
    let ctx = context();
    let mut e = note(&ctx);
    assert!(matches!(
        e.unset("title"),
        Err(ModelError::MissingRequiredProperties { .. })
    ));
    assert_eq!(e.get_str("title"), Some("Hello"));
}

// ── Canonical form ───────────────────────────────────────────────

#[test]
fn canonical_mapping_follows_declaration_order() {
    let ctx = context();
    let e = Entity::new(
        &ctx,
        note_type(),
        vec![
            ("tags", Value::from(vec!["x"])),
            ("body", Value::from("World")),
            ("title", Value::from("Hello")),
        ],
    )
    .unwrap();
    let keys: Vec<String> = e.to_canonical_mapping().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["type", "id", "created", "modified", "title", "body", "tags"]
    );
}

#[test]
fn compact_serialization_matches_canonical_form() {
    let ctx = context();
    let e = note(&ctx);
    assert_eq!(
        e.serialize(false).unwrap(),
        format!(
            r#"{{"type":"note","id":"{FIRST_NOTE_ID}","created":"2017-01-01T12:34:56.000Z","modified":"2017-01-01T12:34:56.000Z","title":"Hello","body":"World"}}"#
        )
    );
}

#[test]
fn pretty_serialization_indents_four_spaces() {
    let ctx = context();
    let e = Entity::from_json(&ctx, person_type(), json!({"name": "Ada"})).unwrap();
    assert_eq!(e.serialize(true).unwrap(), "{\n    \"name\": \"Ada\"\n}");
}

#[test]
fn serde_serialize_uses_canonical_mapping() {
    let ctx = context();
    let e = Entity::from_json(&ctx, person_type(), json!({"email": "a@b.c", "name": "Ada"}))
        .unwrap();
    assert_eq!(
        serde_json::to_value(&e).unwrap(),
        json!({"name": "Ada", "email": "a@b.c"})
    );
}

#[test]
fn equality_is_by_canonical_form() {
    let ctx = context();
    let a = Entity::from_json(&ctx, person_type(), json!({"name": "Ada"})).unwrap();
    let b = Entity::new(&ctx, person_type(), vec![("name", "Ada")]).unwrap();
    let c = Entity::new(&ctx, person_type(), vec![("name", "Bob")]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn display_shows_identifier_or_type_name() {
    let ctx = context();
    assert_eq!(note(&ctx).to_string(), FIRST_NOTE_ID);
    let p = Entity::new(&ctx, person_type(), vec![("name", "Ada")]).unwrap();
    assert_eq!(p.to_string(), "Person");
}

#[test]
fn fields_iterates_set_fields_in_order() {
    let ctx = context();
    let e = note(&ctx);
    let names: Vec<&str> = e.fields().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["type", "id", "created", "modified", "title", "body"]);
}
