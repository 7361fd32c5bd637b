//! The checkpoint-schedule producer trait (component A).
//!
//! Generalizes an enum-dispatch decider pattern to a trait, since drivers
//! hold heterogeneous schedule kinds (`Revolve`, `HRevolve`, `Mixed`, ...)
//! behind a single call site.

use crate::action::{Action, StorageTier};
use crate::error::ScheduleError;

/// Produces one [`Action`] at a time, driving a checkpointed reverse-mode
/// AD run.
///
/// A schedule that returns `Err` must not be called again: the error may
/// leave internal bookkeeping (the snapshot mirror, a DP cursor) in a
/// state that no longer satisfies the schedule's own invariants.
pub trait CheckpointSchedule {
    /// Produce the next action. Returns
    /// [`ScheduleError::ScheduleExhausted`] once the schedule has already
    /// yielded its terminal [`Action::EndReverse`] (or, for
    /// [`crate::trivial::NoneCheckpointSchedule`], its terminal
    /// [`Action::EndForward`]).
    fn next(&mut self) -> Result<Action, ScheduleError>;

    /// `true` once `next()` will only ever return
    /// [`ScheduleError::ScheduleExhausted`].
    fn is_exhausted(&self) -> bool;

    /// `true` if this schedule ever emits an action referencing `tier`
    /// (including [`StorageTier::Work`]).
    fn uses_storage(&self, tier: StorageTier) -> bool;

    /// Fix the total step count for an online schedule that was
    /// constructed without knowing it in advance. Offline schedules (which
    /// already know `max_n` at construction) reject this with
    /// [`ScheduleError::InvalidCheckpointState`].
    fn finalize(&mut self, _max_n: usize) -> Result<(), ScheduleError> {
        Err(ScheduleError::invalid_state(
            "this schedule already knows its step count and cannot be finalized",
        ))
    }
}

/// Shared `finalize` bookkeeping for online schedules: a schedule without a
/// known `max_n` may be finalized once its internal step count has already
/// reached `target`; a schedule whose `max_n` is already fixed accepts a
/// repeated, matching `finalize` call as a no-op and rejects anything else.
///
/// Grounded on `schedule.py::CheckpointSchedule.finalize`'s generic
/// bookkeeping, shared by every online schedule (`MultiStage` without
/// `max_n`, `TwoLevel`, the trivial schedules) rather than reimplemented
/// per module.
pub(crate) fn validate_finalize(
    target: usize,
    current_n: usize,
    existing_max_n: Option<usize>,
) -> Result<(), ScheduleError> {
    if target < 1 {
        return Err(ScheduleError::invalid_argument("n must be positive"));
    }
    match existing_max_n {
        None if current_n >= target => Ok(()),
        None => Err(ScheduleError::invalid_state(
            "finalize called before the forward phase reached the given step count",
        )),
        Some(max_n) if current_n == target && max_n == target => Ok(()),
        Some(_) => Err(ScheduleError::invalid_state(
            "invalid checkpointing state",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        done: bool,
    }

    impl CheckpointSchedule for Stub {
        fn next(&mut self) -> Result<Action, ScheduleError> {
            if self.done {
                return Err(ScheduleError::ScheduleExhausted);
            }
            self.done = true;
            Ok(Action::EndForward)
        }

        fn is_exhausted(&self) -> bool {
            self.done
        }

        fn uses_storage(&self, _tier: StorageTier) -> bool {
            false
        }
    }

    #[test]
    fn default_finalize_fails() {
        let mut stub = Stub { done: false };
        assert!(stub.finalize(10).is_err());
    }

    #[test]
    fn exhausted_after_terminal_action() {
        let mut stub = Stub { done: false };
        assert!(stub.next().is_ok());
        assert!(stub.is_exhausted());
        assert!(stub.next().is_err());
    }

    #[test]
    fn validate_finalize_accepts_caught_up_state() {
        assert!(validate_finalize(10, 10, None).is_ok());
        assert!(validate_finalize(10, 12, None).is_ok());
    }

    #[test]
    fn validate_finalize_accepts_repeated_matching_call() {
        assert!(validate_finalize(10, 10, Some(10)).is_ok());
    }

    #[test]
    fn validate_finalize_rejects_premature_or_mismatched() {
        assert!(validate_finalize(10, 5, None).is_err());
        assert!(validate_finalize(10, 10, Some(11)).is_err());
        assert!(validate_finalize(0, 0, None).is_err());
    }
}
