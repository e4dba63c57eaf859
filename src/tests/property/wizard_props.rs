//! Property-based tests for wizard navigation and persistence
//!
//! Random operation sequences are applied to a wizard backed by a memory
//! store; the invariants are checked after every operation.

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::core::wizard::{
    FieldErrors, MemorySnapshotStore, Navigation, PersistedSnapshot, Wizard, WizardOptions, WizardStep,
};
use crate::tests::common::fixtures::{accept_all, memory_slot, object, JsonData};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    SetField(String, String),
    Next,
    Previous,
    Skip,
    Jump(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("(name|client)", "[a-z ]{0,6}").prop_map(|(key, value)| Op::SetField(key, value)),
        Just(Op::Next),
        Just(Op::Previous),
        Just(Op::Skip),
        (0usize..6).prop_map(Op::Jump),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 0..40)
}

fn required(field: &'static str) -> impl Fn(&JsonData) -> FieldErrors {
    move |data: &JsonData| {
        let mut errors = FieldErrors::new();
        let ok = data
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|v| !v.trim().is_empty());
        if !ok {
            errors.insert(field.to_string(), format!("{field} is required"));
        }
        errors
    }
}

fn steps() -> Vec<WizardStep<JsonData>> {
    vec![
        WizardStep::new("s0", "Zero").with_validator(required("name")),
        WizardStep::new("s1", "One").optional(),
        WizardStep::new("s2", "Two").with_validator(required("client")),
        WizardStep::new("s3", "Three").optional(),
        WizardStep::new("s4", "Four"),
    ]
}

fn open(store: &MemorySnapshotStore) -> Wizard<JsonData> {
    Wizard::open(
        steps(),
        JsonData::new(),
        accept_all(),
        WizardOptions::default().with_persistence(memory_slot(store)),
    )
    .expect("wizard opens")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn apply(rt: &tokio::runtime::Runtime, wizard: &mut Wizard<JsonData>, op: &Op) -> Navigation {
    match op {
        Op::SetField(key, value) => {
            let mut patch = JsonData::new();
            patch.insert(key.clone(), Value::String(value.clone()));
            wizard.update_data(patch);
            Navigation::Stayed
        }
        Op::Next => rt.block_on(wizard.go_to_next()).expect("accept_all never fails"),
        Op::Previous => wizard.go_to_previous(),
        Op::Skip => wizard.skip(),
        Op::Jump(index) => wizard.go_to_step(&format!("s{index}")),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn index_and_completed_ids_stay_valid(ops in arb_ops()) {
        let rt = runtime();
        let store = MemorySnapshotStore::new();
        let mut wizard = open(&store);
        let ids: Vec<String> = wizard.steps().iter().map(|s| s.id.clone()).collect();

        for op in &ops {
            apply(&rt, &mut wizard, op);
            prop_assert!(wizard.current_step_index() < ids.len());
            prop_assert!(wizard.completed_step_ids().iter().all(|id| ids.contains(id)));
            prop_assert!(wizard.progress_percent() <= 100);
            prop_assert!(!wizard.is_submitting());
        }
    }

    #[test]
    fn jumps_only_reach_earlier_or_completed_steps(ops in arb_ops(), target in 0usize..5) {
        let rt = runtime();
        let store = MemorySnapshotStore::new();
        let mut wizard = open(&store);
        for op in &ops {
            apply(&rt, &mut wizard, op);
        }

        let before = wizard.current_step_index();
        let step_id = format!("s{target}");
        let allowed = target <= before || wizard.completed_step_ids().contains(&step_id);
        let outcome = wizard.go_to_step(&step_id);

        if allowed {
            prop_assert_eq!(wizard.current_step_index(), target);
            prop_assert_eq!(outcome, Navigation::Moved { from: before, to: target });
        } else {
            prop_assert_eq!(wizard.current_step_index(), before);
            prop_assert_eq!(outcome, Navigation::Stayed);
        }
    }

    #[test]
    fn forward_moves_are_single_steps(ops in arb_ops()) {
        let rt = runtime();
        let store = MemorySnapshotStore::new();
        let mut wizard = open(&store);

        for op in &ops {
            let outcome = apply(&rt, &mut wizard, op);
            if let (Op::Next | Op::Skip, Navigation::Moved { from, to }) = (op, &outcome) {
                prop_assert_eq!(*to, from + 1);
            }
        }
    }

    #[test]
    fn reopening_restores_the_same_position(ops in arb_ops()) {
        let rt = runtime();
        let store = MemorySnapshotStore::new();
        let mut wizard = open(&store);
        for op in &ops {
            apply(&rt, &mut wizard, op);
        }

        let reopened = open(&store);
        prop_assert_eq!(reopened.current_step_index(), wizard.current_step_index());
        prop_assert_eq!(reopened.completed_step_ids(), wizard.completed_step_ids());
        prop_assert_eq!(reopened.data(), wizard.data());
    }

    #[test]
    fn snapshot_json_round_trip(
        name in "[A-Za-z0-9 ]{0,20}",
        index in 0usize..10,
        completed in prop::collection::btree_set("[a-z]{1,8}", 0..5),
    ) {
        let snapshot = PersistedSnapshot::new(object(json!({ "name": name })), index, completed);
        let json = snapshot.to_json().expect("serializes");
        let restored = PersistedSnapshot::<JsonData>::from_json(&json).expect("parses");
        prop_assert_eq!(restored, snapshot);
    }
}
