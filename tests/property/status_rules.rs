//! Property tests for the task status transition rules.
//!
//! Checks the rule engine against its closed-form definition: a move is
//! legal iff it stays put or shifts the status index by exactly one.

use fieldnotes_proto::status::{TaskStatus, adjacent_statuses, allowed_statuses, can_transition};
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::Doing),
        Just(TaskStatus::Done),
    ]
}

proptest! {
    #[test]
    fn can_transition_iff_same_or_one_step(from in arb_status(), to in arb_status()) {
        let distance = from.index().abs_diff(to.index());
        prop_assert_eq!(can_transition(from, to), from == to || distance == 1);
    }

    #[test]
    fn transitions_are_symmetric(from in arb_status(), to in arb_status()) {
        prop_assert_eq!(can_transition(from, to), can_transition(to, from));
    }

    #[test]
    fn staying_put_is_legal(status in arb_status()) {
        prop_assert!(can_transition(status, status));
    }

    #[test]
    fn allowed_is_current_plus_adjacent(status in arb_status()) {
        let allowed = allowed_statuses(status);
        let adjacent = adjacent_statuses(status);
        prop_assert_eq!(allowed[0], status);
        prop_assert_eq!(&allowed[1..], adjacent.as_slice());
        for target in TaskStatus::ALL {
            prop_assert_eq!(allowed.contains(&target), can_transition(status, target));
        }
    }

    #[test]
    fn adjacent_statuses_are_ordered_and_distinct(status in arb_status()) {
        let adjacent = adjacent_statuses(status);
        prop_assert!(!adjacent.contains(&status));
        prop_assert!(adjacent.windows(2).all(|w| w[0].index() < w[1].index()));
    }

    #[test]
    fn status_name_round_trips(status in arb_status()) {
        prop_assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
    }
}

#[test]
fn concrete_transitions() {
    assert!(can_transition(TaskStatus::Todo, TaskStatus::Doing));
    assert!(!can_transition(TaskStatus::Todo, TaskStatus::Done));
    assert!(can_transition(TaskStatus::Done, TaskStatus::Doing));
    assert!(!can_transition(TaskStatus::Done, TaskStatus::Todo));
}
