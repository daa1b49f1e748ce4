//! Property-based tests using proptest.
//!
//! Random sequences of request / undo / dismiss / clock advances are applied
//! to a controller, and the cross-store invariants are checked after every
//! step:
//!
//! - a task id is never both visible and pending;
//! - every task is exactly one of visible, pending, or deleted for good;
//! - notice ids are a subset of pending ids;
//! - visible tasks always equal their original version.

mod common;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use common::{controller_with, sample_tasks, RecordingDeleter};
use tasklist_undo::{DeleteFailure, Task, UndoError};

#[derive(Debug, Clone)]
enum Op {
    Request(usize),
    Undo(usize),
    Dismiss(usize),
    Advance(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3).prop_map(Op::Request),
        2 => (0usize..3).prop_map(Op::Undo),
        1 => (0usize..3).prop_map(Op::Dismiss),
        2 => (0u64..=12).prop_map(Op::Advance),
    ]
}

fn ids() -> Vec<String> {
    sample_tasks().into_iter().map(|t| t.id).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn stores_stay_consistent(
        ops in prop::collection::vec(arb_op(), 1..40),
        failing in prop::collection::hash_set(0usize..3, 0..=3),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        runtime.block_on(async {
            let deleter = RecordingDeleter::new();
            let ids = ids();
            let failing: HashSet<String> = failing.iter().map(|i| ids[*i].clone()).collect();
            for id in &failing {
                deleter.fail_for(id, DeleteFailure::with_status(500, "nope"));
            }
            let originals: HashMap<String, Task> =
                sample_tasks().into_iter().map(|t| (t.id.clone(), t)).collect();
            let (controller, scheduler) = controller_with(deleter.clone());

            for op in ops {
                match op {
                    Op::Request(i) => {
                        let was_pending = controller.is_pending(&ids[i]);
                        let result = controller.request_delete(&ids[i]);
                        if was_pending {
                            let is_already_pending =
                                matches!(result, Err(UndoError::AlreadyPending { .. }));
                            prop_assert!(is_already_pending);
                        }
                    }
                    Op::Undo(i) => {
                        let was_pending = controller.is_pending(&ids[i]);
                        let result = controller.undo(&ids[i]);
                        prop_assert_eq!(result.is_ok(), was_pending);
                    }
                    Op::Dismiss(i) => {
                        controller.dismiss(&ids[i]);
                    }
                    Op::Advance(secs) => {
                        scheduler.advance(Duration::from_secs(secs)).await;
                    }
                }

                let visible = controller.tasks();
                let visible_ids: HashSet<&str> = visible.iter().map(|t| t.id.as_str()).collect();
                prop_assert_eq!(visible_ids.len(), visible.len(), "duplicate visible ids");

                let deleted: HashSet<String> = deleter
                    .calls()
                    .into_iter()
                    .filter(|id| !failing.contains(id))
                    .collect();

                for id in &ids {
                    let places = [
                        visible_ids.contains(id.as_str()),
                        controller.is_pending(id),
                        deleted.contains(id),
                    ];
                    prop_assert_eq!(
                        places.iter().filter(|p| **p).count(),
                        1,
                        "task {} in {:?}",
                        id,
                        places
                    );
                }

                for notice in controller.notifications() {
                    prop_assert!(controller.is_pending(&notice.id));
                }

                for task in &visible {
                    prop_assert_eq!(Some(task), originals.get(&task.id));
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Undo within the window always restores, regardless of when in the
    /// window it happens.
    #[test]
    fn undo_inside_window_always_restores(elapsed_ms in 0u64..10_000) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        runtime.block_on(async {
            let deleter = RecordingDeleter::new();
            let (controller, scheduler) = controller_with(deleter.clone());

            controller.request_delete("t1").map_err(|e| TestCaseError::fail(e.to_string()))?;
            scheduler.advance(Duration::from_millis(elapsed_ms)).await;
            prop_assert!(controller.undo("t1").is_ok());
            scheduler.advance(Duration::from_secs(20)).await;

            prop_assert!(deleter.calls().is_empty());
            prop_assert!(controller.task("t1").is_some());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
