//! Wizard Navigation Tests
//!
//! Forward, backward and jump navigation over small JSON-object wizards.

use std::sync::Arc;

use rstest::rstest;
use serde_json::{json, Value};

use crate::core::wizard::{
    FieldErrors, MemorySnapshotStore, Navigation, SnapshotSlot, SnapshotStore, Wizard,
    WizardOptions, WizardStep,
};
use crate::tests::common::fixtures::{
    accept_all, memory_slot, named, object, open_json_wizard, three_steps, JsonData, TEST_KEY,
};

fn name_required(data: &JsonData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if data.get("name").and_then(Value::as_str).unwrap_or_default().is_empty() {
        errors.insert("name".into(), "Name must not be empty".into());
    }
    errors
}

/// The middle step requires a non-empty `name`.
fn middle_step_validated() -> Wizard<JsonData> {
    Wizard::open(
        vec![
            WizardStep::new("first", "First"),
            WizardStep::new("second", "Second").with_validator(name_required),
            WizardStep::new("third", "Third"),
        ],
        JsonData::new(),
        accept_all(),
        WizardOptions::default(),
    )
    .unwrap()
}

/// Wizard on step `c` with `a` and `b` completed.
async fn at_last_step(store: &MemorySnapshotStore) -> Wizard<JsonData> {
    let mut wizard = open_json_wizard(store, accept_all());
    wizard.update_data(named("Acme"));
    wizard.go_to_next().await.unwrap();
    wizard.go_to_next().await.unwrap();
    assert_eq!(wizard.current_step_index(), 2);
    wizard
}

// =============================================================================
// Validation Gating
// =============================================================================

#[tokio::test]
async fn test_empty_name_blocks_until_filled() {
    let mut wizard = middle_step_validated();
    wizard.go_to_next().await.unwrap();
    assert_eq!(wizard.current_step_index(), 1);

    wizard.update_data(object(json!({ "name": "" })));
    for _ in 0..2 {
        let outcome = wizard.go_to_next().await.unwrap();
        assert!(matches!(outcome, Navigation::Blocked(_)));
        assert_eq!(wizard.current_step_index(), 1);
        assert_eq!(wizard.errors().get("name").map(String::as_str), Some("Name must not be empty"));
        assert_eq!(wizard.errors().len(), 1);
    }

    wizard.update_data(named("x"));
    let outcome = wizard.go_to_next().await.unwrap();
    assert_eq!(outcome, Navigation::Moved { from: 1, to: 2 });
    assert!(wizard.errors().is_empty());
    assert!(wizard.completed_step_ids().contains("second"));
}

#[tokio::test]
async fn test_blocked_errors_equal_validator_output() {
    let mut wizard = middle_step_validated();
    wizard.go_to_next().await.unwrap();

    let expected = name_required(wizard.data());
    match wizard.go_to_next().await.unwrap() {
        Navigation::Blocked(errors) => assert_eq!(errors, expected),
        other => panic!("expected Blocked, got {other:?}"),
    }
    assert_eq!(wizard.errors(), &expected);
}

#[tokio::test]
async fn test_steps_without_validator_always_advance() {
    let store = MemorySnapshotStore::new();
    let mut wizard = open_json_wizard(&store, accept_all());
    wizard.update_data(named("Acme"));

    assert_eq!(wizard.go_to_next().await.unwrap(), Navigation::Moved { from: 0, to: 1 });
    assert_eq!(wizard.go_to_next().await.unwrap(), Navigation::Moved { from: 1, to: 2 });
}

// =============================================================================
// Backward Navigation
// =============================================================================

#[test]
fn test_previous_on_first_step_is_noop() {
    let mut wizard = middle_step_validated();
    assert_eq!(wizard.go_to_previous(), Navigation::Stayed);
    assert_eq!(wizard.current_step_index(), 0);
}

#[tokio::test]
async fn test_previous_clears_errors_without_validation() {
    let mut wizard = middle_step_validated();
    wizard.go_to_next().await.unwrap();
    wizard.go_to_next().await.unwrap();
    assert!(!wizard.errors().is_empty());

    assert_eq!(wizard.go_to_previous(), Navigation::Moved { from: 1, to: 0 });
    assert!(wizard.errors().is_empty());
}

/// Optional middle step that still validates when submitted with Next.
fn optional_validated() -> Wizard<JsonData> {
    Wizard::open(
        vec![
            WizardStep::new("first", "First"),
            WizardStep::new("extra", "Extra").with_validator(name_required).optional(),
            WizardStep::new("last", "Last"),
        ],
        JsonData::new(),
        accept_all(),
        WizardOptions::default(),
    )
    .unwrap()
}

#[rstest]
#[case::jump_back("first", 0)]
#[case::same_step("extra", 1)]
#[tokio::test]
async fn test_go_to_step_clears_errors(#[case] target: &str, #[case] index: usize) {
    let mut wizard = optional_validated();
    wizard.go_to_next().await.unwrap();
    assert!(matches!(wizard.go_to_next().await.unwrap(), Navigation::Blocked(_)));
    assert!(!wizard.errors().is_empty());

    assert!(wizard.go_to_step(target).is_moved());
    assert_eq!(wizard.current_step_index(), index);
    assert!(wizard.errors().is_empty());
}

#[tokio::test]
async fn test_skip_clears_errors_and_bypasses_validation() {
    let mut wizard = optional_validated();
    wizard.go_to_next().await.unwrap();
    assert!(matches!(wizard.go_to_next().await.unwrap(), Navigation::Blocked(_)));

    assert_eq!(wizard.skip(), Navigation::Moved { from: 1, to: 2 });
    assert!(wizard.errors().is_empty());
    assert!(wizard.completed_step_ids().contains("extra"));
}

// =============================================================================
// Jumps
// =============================================================================

#[rstest]
#[case::earlier_step("a", true)]
#[case::current_step("b", true)]
#[case::ahead_not_completed("c", false)]
#[case::unknown_step("zzz", false)]
#[tokio::test]
async fn test_go_to_step_from_second_step(#[case] target: &str, #[case] allowed: bool) {
    let store = MemorySnapshotStore::new();
    let mut wizard = open_json_wizard(&store, accept_all());
    wizard.update_data(named("Acme"));
    wizard.go_to_next().await.unwrap();

    let outcome = wizard.go_to_step(target);
    assert_eq!(outcome.is_moved(), allowed);
    if !allowed {
        assert_eq!(wizard.current_step_index(), 1);
    }
}

#[tokio::test]
async fn test_jump_forward_to_completed_step() {
    let store = MemorySnapshotStore::new();
    let mut wizard = at_last_step(&store).await;

    assert!(wizard.go_to_step("a").is_moved());
    assert!(wizard.can_go_to_step("b"));
    // `c` was reached but never completed
    assert!(!wizard.can_go_to_step("c"));
    assert_eq!(wizard.go_to_step("b"), Navigation::Moved { from: 0, to: 1 });
}

#[tokio::test]
async fn test_skip_advances_exactly_one_step() {
    let store = MemorySnapshotStore::new();
    let mut wizard = open_json_wizard(&store, accept_all());
    wizard.update_data(named("Acme"));
    wizard.go_to_next().await.unwrap();

    assert_eq!(wizard.skip(), Navigation::Moved { from: 1, to: 2 });
    assert!(wizard.completed_step_ids().contains("b"));
    // Last step cannot be skipped
    assert_eq!(wizard.skip(), Navigation::Stayed);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_reopen_restores_position_and_data() {
    let store = MemorySnapshotStore::new();
    let wizard = at_last_step(&store).await;
    let expected_completed = wizard.completed_step_ids().clone();
    wizard.cancel();

    let reopened = open_json_wizard(&store, accept_all());
    assert_eq!(reopened.current_step_index(), 2);
    assert_eq!(reopened.completed_step_ids(), &expected_completed);
    assert_eq!(reopened.data(), &named("Acme"));
}

#[test]
fn test_snapshot_data_merges_over_initial_data() {
    let store = MemorySnapshotStore::new();
    store
        .set(TEST_KEY, r#"{"data":{"name":"stored"},"currentStepIndex":1,"completedStepIds":["a"]}"#)
        .unwrap();

    let wizard = Wizard::open(
        three_steps(),
        object(json!({ "name": "initial", "team": "red" })),
        accept_all(),
        WizardOptions::default().with_persistence(memory_slot(&store)),
    )
    .unwrap();

    assert_eq!(wizard.data(), &object(json!({ "name": "stored", "team": "red" })));
    assert_eq!(wizard.current_step_index(), 1);
}

#[rstest]
#[case::not_json("{{{")]
#[case::wrong_shape(r#"{"data":[],"currentStepIndex":"one"}"#)]
#[case::index_past_end(r#"{"data":{},"currentStepIndex":7,"completedStepIds":[]}"#)]
fn test_unusable_snapshot_starts_fresh(#[case] raw: &str) {
    let store = MemorySnapshotStore::new();
    store.set(TEST_KEY, raw).unwrap();

    let wizard = open_json_wizard(&store, accept_all());
    assert_eq!(wizard.current_step_index(), 0);
    assert!(wizard.completed_step_ids().is_empty());
    assert!(wizard.data().is_empty());
}

#[test]
fn test_wizards_with_different_keys_do_not_interfere() {
    let store = MemorySnapshotStore::new();
    let shared: Arc<dyn SnapshotStore> = Arc::new(store.clone());
    let open = |key: &str| {
        Wizard::open(
            three_steps(),
            JsonData::new(),
            accept_all(),
            WizardOptions::default()
                .with_persistence(SnapshotSlot::new(key, shared.clone())),
        )
        .unwrap()
    };

    let mut first = open("first");
    let mut second = open("second");
    first.update_data(named("one"));
    second.update_data(named("two"));

    assert_eq!(open("first").data(), &named("one"));
    assert_eq!(open("second").data(), &named("two"));
    assert_eq!(store.keys().unwrap(), vec!["first".to_string(), "second".to_string()]);
}
