//! Shared fixtures for catalog tests.

#![allow(dead_code)]

use std::sync::Arc;
use stixkit_catalog::register;
use stixkit_model::{Context, IdentityCache};
use stixkit_types::{FixedClock, SequentialIds, Timestamp};

pub const GROUPING_ID: &str = "grouping--753abcde-3141-5926-ace5-0a810b1ff996";
pub const MALWARE_REF: &str = "malware--c8d2fae5-7271-400c-b81d-931a4caf20b9";
pub const IDENTITY_REF: &str = "identity--988145ed-a3b4-4421-b7a7-273376be67ce";
pub const GROUPING_NAME: &str = "Harry Potter and the Leet Hackers";
pub const GROUPING_CONTEXT: &str = "suspicious-activity";

pub const FIRST_GROUPING_ID: &str = "grouping--00000000-0000-4000-8000-000000000001";
pub const FIRST_OBJECT_ID: &str = "object--00000000-0000-4000-8000-000000000001";
pub const SECOND_OBJECT_ID: &str = "object--00000000-0000-4000-8000-000000000002";

pub fn fake_time() -> Timestamp {
    Timestamp::from_ymd_hms(2017, 1, 1, 12, 34, 56).unwrap()
}

/// Deterministic ids and clock, an isolated cache, the catalog registered.
pub fn context() -> Context {
    let mut ctx = Context::new()
        .with_cache(Arc::new(IdentityCache::new()))
        .with_id_generator(SequentialIds::new())
        .with_clock(FixedClock(fake_time()));
    register(&mut ctx).unwrap();
    ctx
}
