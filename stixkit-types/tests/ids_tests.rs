use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;
use stixkit_types::{IdGenerator, Identifier, RandomIds, SequentialIds};
use uuid::Uuid;

// ── Identifier ────────────────────────────────────────────────────

#[test]
fn parse_splits_type_and_uuid() {
    let id = Identifier::parse("grouping--753abcde-3141-5926-ace5-0a810b1ff996").unwrap();
    assert_eq!(id.type_name(), "grouping");
    assert_eq!(
        id.uuid(),
        Uuid::parse_str("753abcde-3141-5926-ace5-0a810b1ff996").unwrap()
    );
}

#[test]
fn display_roundtrip() {
    let s = "malware--c8d2fae5-7271-400c-b81d-931a4caf20b9";
    let id = Identifier::from_str(s).unwrap();
    assert_eq!(id.to_string(), s);
}

#[test]
fn hyphenated_type_names_are_kept_whole() {
    let id = Identifier::parse("x-acme-widget--988145ed-a3b4-4421-b7a7-273376be67ce").unwrap();
    assert_eq!(id.type_name(), "x-acme-widget");
    assert!(id.is_of_type("x-acme-widget"));
    assert!(!id.is_of_type("x-acme"));
}

#[test]
fn parse_rejects_missing_separator() {
    assert!(Identifier::parse("grouping-753abcde-3141-5926-ace5-0a810b1ff996").is_err());
}

#[test]
fn parse_rejects_empty_type() {
    assert!(Identifier::parse("--753abcde-3141-5926-ace5-0a810b1ff996").is_err());
}

#[test]
fn parse_rejects_empty_uuid() {
    assert!(Identifier::parse("my-prefix--").is_err());
}

#[test]
fn parse_rejects_non_hyphenated_uuid_forms() {
    for s in [
        "grouping--753abcde31415926ace50a810b1ff996",
        "grouping--{753abcde-3141-5926-ace5-0a810b1ff996}",
        "grouping--urn:uuid:753abcde-3141-5926-ace5-0a810b1ff996",
        "grouping--753ABCDE-3141-5926-ACE5-0A810B1FF996",
    ] {
        assert!(Identifier::parse(s).is_err(), "{s} should be rejected");
    }
}

#[test]
fn serde_uses_string_form() {
    let id = Identifier::parse("identity--988145ed-a3b4-4421-b7a7-273376be67ce").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"identity--988145ed-a3b4-4421-b7a7-273376be67ce\"");
    let back: Identifier = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn serde_rejects_malformed() {
    assert!(serde_json::from_str::<Identifier>("\"nope\"").is_err());
}

// ── Generators ────────────────────────────────────────────────────

#[test]
fn random_ids_are_unique_v4() {
    let ids = RandomIds;
    let set: HashSet<_> = (0..100).map(|_| ids.generate("grouping")).collect();
    assert_eq!(set.len(), 100);
    for id in &set {
        assert_eq!(id.type_name(), "grouping");
        assert_eq!(id.uuid().get_version_num(), 4);
    }
}

#[test]
fn sequential_ids_match_fixture_form() {
    let ids = SequentialIds::new();
    assert_eq!(
        ids.generate("grouping").to_string(),
        "grouping--00000000-0000-4000-8000-000000000001"
    );
    assert_eq!(
        ids.generate("object").to_string(),
        "object--00000000-0000-4000-8000-000000000002"
    );
}

#[test]
fn sequential_ids_reset() {
    let ids = SequentialIds::new();
    ids.generate("a");
    ids.generate("a");
    ids.reset();
    assert_eq!(
        ids.generate("a").to_string(),
        "a--00000000-0000-4000-8000-000000000001"
    );
}

proptest! {
    #[test]
    fn any_uuid_survives_display_and_parse(raw in any::<u128>(), name in "[a-z][a-z0-9-]{0,20}[a-z0-9]") {
        let id = Identifier::new(name.clone(), Uuid::from_u128(raw));
        let parsed = Identifier::parse(&id.to_string()).unwrap();
        prop_assert_eq!(parsed.type_name(), name.as_str());
        prop_assert_eq!(parsed, id);
    }
}
