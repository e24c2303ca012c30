//! Tests for #[derive(Persist)] macro

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap

use serde::{Deserialize, Serialize};
use taskdeck_core::persist::{Persist, PersistError};
use taskdeck_core::serde_json::json;
use taskdeck_macros::Persist;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Entry {
    label: String,
    done: bool,
}

#[derive(Persist, Clone, Debug, Default, PartialEq)]
#[persist(key = "journal")]
struct JournalState {
    #[persist]
    entries: Vec<Entry>,
    #[persist]
    pinned: Option<u32>,
    draft: String,
    scroll: usize,
}

#[derive(Persist, Clone, Debug, Default)]
#[persist(key = "dial")]
struct DialState {
    #[persist]
    value: i64,
}

fn sample() -> JournalState {
    JournalState {
        entries: vec![Entry {
            label: "water plants".to_string(),
            done: false,
        }],
        pinned: Some(0),
        draft: "half-typed".to_string(),
        scroll: 12,
    }
}

#[test]
fn test_key() {
    assert_eq!(JournalState::KEY, "journal");
    assert_eq!(DialState::KEY, "dial");
}

#[test]
fn test_snapshot_contains_only_whitelisted_fields() {
    let snapshot = sample().snapshot().unwrap();

    assert_eq!(
        snapshot,
        json!({
            "entries": [{ "label": "water plants", "done": false }],
            "pinned": 0,
        })
    );
}

#[test]
fn test_restore_merges_into_defaults() {
    let mut restored = JournalState::default();
    restored.restore(sample().snapshot().unwrap()).unwrap();

    assert_eq!(restored.entries, sample().entries);
    assert_eq!(restored.pinned, Some(0));
    assert_eq!(restored.draft, "");
    assert_eq!(restored.scroll, 0);
}

#[test]
fn test_restore_ignores_unknown_and_transient_fields() {
    let mut state = DialState::default();
    state
        .restore(json!({ "value": 7, "draft": "x", "other": [1, 2] }))
        .unwrap();
    assert_eq!(state.value, 7);
}

#[test]
fn test_missing_fields_keep_current_value() {
    let mut state = sample();
    state.restore(json!({ "pinned": null })).unwrap();

    assert_eq!(state.entries, sample().entries);
    assert_eq!(state.pinned, None);
}

#[test]
fn test_malformed_record_leaves_state_untouched() {
    let mut state = sample();

    // `entries` is valid but `pinned` is not: nothing may be applied.
    let err = state
        .restore(json!({ "entries": [], "pinned": "zero" }))
        .unwrap_err();
    assert!(matches!(err, PersistError::Serialization(_)));
    assert_eq!(state, sample());
}

#[test]
fn test_non_object_record_is_a_shape_error() {
    let mut state = DialState::default();
    let err = state.restore(json!(42)).unwrap_err();
    assert!(matches!(err, PersistError::Shape { ref key, .. } if key == "dial"));
    assert_eq!(state.value, 0);
}
