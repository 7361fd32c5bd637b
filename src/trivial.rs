//! The trivial schedules (component H): no optimization, just a fixed
//! storage discipline. Useful as a baseline and for calculations too cheap
//! to warrant a real checkpointing strategy.
//!
//! Grounded on `basic_schedules.py::{SingleMemoryStorageSchedule,
//! SingleDiskStorageSchedule, NoneCheckpointSchedule}`.

use crate::action::{Action, StorageTier};
use crate::error::ScheduleError;
use crate::schedule::{validate_finalize, CheckpointSchedule};

/// All adjoint-dependency data is kept in memory for the whole run. Online;
/// unlimited adjoint calculations permitted.
pub struct SingleMemoryCheckpointSchedule {
    max_n: Option<usize>,
    n: usize,
    sentinel_emitted: bool,
    end_forward_emitted: bool,
    r: usize,
}

impl SingleMemoryCheckpointSchedule {
    pub fn new() -> Self {
        SingleMemoryCheckpointSchedule {
            max_n: None,
            n: 0,
            sentinel_emitted: false,
            end_forward_emitted: false,
            r: 0,
        }
    }
}

impl Default for SingleMemoryCheckpointSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointSchedule for SingleMemoryCheckpointSchedule {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        if self.max_n.is_none() {
            if self.sentinel_emitted {
                return Err(ScheduleError::invalid_state(
                    "next() called again before finalize: the unbounded forward sentinel is only emitted once",
                ));
            }
            self.sentinel_emitted = true;
            let n0 = self.n;
            let n1 = usize::MAX;
            self.n = n1;
            return Ok(Action::Forward {
                n0,
                n1,
                write_ics: false,
                write_adj_deps: true,
                storage: StorageTier::Work,
            });
        }
        let max_n = self.max_n.unwrap();

        if !self.end_forward_emitted {
            self.end_forward_emitted = true;
            return Ok(Action::EndForward);
        }

        if self.r == 0 {
            self.r = max_n;
            Ok(Action::Reverse {
                n1: max_n,
                n0: 0,
                clear_adj_deps: true,
            })
        } else if self.r == max_n {
            self.r = 0;
            Ok(Action::EndReverse)
        } else {
            Err(ScheduleError::invalid_state("invalid checkpointing state"))
        }
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        tier == StorageTier::Work
    }

    fn finalize(&mut self, max_n: usize) -> Result<(), ScheduleError> {
        validate_finalize(max_n, self.n, self.max_n)?;
        self.n = max_n;
        self.max_n = Some(max_n);
        Ok(())
    }
}

/// All adjoint-dependency data is kept on disk for the whole run, read (or
/// moved) back one step at a time during the reverse pass. Online if
/// `move_data` is `false` (unlimited adjoint calculations permitted); if
/// `move_data` is `true`, the single reverse pass consumes the disk data as
/// it goes, so only one adjoint calculation is permitted.
pub struct SingleDiskCheckpointSchedule {
    move_data: bool,
    max_n: Option<usize>,
    n: usize,
    end_forward_emitted: bool,
    reverse_actions: Option<Vec<Action>>,
    reverse_cursor: usize,
    exhausted: bool,
}

impl SingleDiskCheckpointSchedule {
    pub fn new(move_data: bool) -> Self {
        SingleDiskCheckpointSchedule {
            move_data,
            max_n: None,
            n: 0,
            end_forward_emitted: false,
            reverse_actions: None,
            reverse_cursor: 0,
            exhausted: false,
        }
    }

    fn build_reverse_pass(max_n: usize, move_data: bool) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2 * max_n + 1);
        for r in 0..max_n {
            let n1 = max_n - r;
            let n0 = n1 - 1;
            actions.push(if move_data {
                Action::Move {
                    n: n0,
                    from: StorageTier::Disk,
                    to: StorageTier::Work,
                }
            } else {
                Action::Copy {
                    n: n0,
                    from: StorageTier::Disk,
                    to: StorageTier::Work,
                }
            });
            actions.push(Action::Reverse {
                n1,
                n0,
                clear_adj_deps: true,
            });
        }
        actions.push(Action::EndReverse);
        actions
    }
}

impl Default for SingleDiskCheckpointSchedule {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CheckpointSchedule for SingleDiskCheckpointSchedule {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        if self.exhausted {
            return Err(ScheduleError::ScheduleExhausted);
        }

        let Some(max_n) = self.max_n else {
            let n0 = self.n;
            let n1 = n0 + 1;
            self.n = n1;
            return Ok(Action::Forward {
                n0,
                n1,
                write_ics: false,
                write_adj_deps: true,
                storage: StorageTier::Disk,
            });
        };

        if !self.end_forward_emitted {
            self.end_forward_emitted = true;
            return Ok(Action::EndForward);
        }

        if self.reverse_actions.is_none() {
            self.reverse_actions = Some(Self::build_reverse_pass(max_n, self.move_data));
            self.reverse_cursor = 0;
        }

        let actions = self.reverse_actions.as_ref().unwrap();
        let action = actions[self.reverse_cursor];
        self.reverse_cursor += 1;
        if self.reverse_cursor == actions.len() {
            if self.move_data {
                self.exhausted = true;
            } else {
                self.reverse_cursor = 0;
            }
        }
        Ok(action)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        matches!(tier, StorageTier::Disk | StorageTier::Work)
    }

    fn finalize(&mut self, max_n: usize) -> Result<(), ScheduleError> {
        validate_finalize(max_n, self.n, self.max_n)?;
        self.n = max_n;
        self.max_n = Some(max_n);
        Ok(())
    }
}

/// No adjoint calculation is ever performed; the forward solver simply
/// runs to completion. Online; zero adjoint calculations permitted.
pub struct NoneCheckpointSchedule {
    max_n: Option<usize>,
    n: usize,
    sentinel_emitted: bool,
    exhausted: bool,
}

impl NoneCheckpointSchedule {
    pub fn new() -> Self {
        NoneCheckpointSchedule {
            max_n: None,
            n: 0,
            sentinel_emitted: false,
            exhausted: false,
        }
    }
}

impl Default for NoneCheckpointSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointSchedule for NoneCheckpointSchedule {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        if self.exhausted {
            return Err(ScheduleError::ScheduleExhausted);
        }
        if self.max_n.is_none() {
            if self.sentinel_emitted {
                return Err(ScheduleError::invalid_state(
                    "next() called again before finalize: the unbounded forward sentinel is only emitted once",
                ));
            }
            self.sentinel_emitted = true;
            let n0 = self.n;
            let n1 = usize::MAX;
            self.n = n1;
            return Ok(Action::Forward {
                n0,
                n1,
                write_ics: false,
                write_adj_deps: false,
                storage: StorageTier::None,
            });
        }
        self.exhausted = true;
        Ok(Action::EndForward)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn uses_storage(&self, _tier: StorageTier) -> bool {
        false
    }

    fn finalize(&mut self, max_n: usize) -> Result<(), ScheduleError> {
        validate_finalize(max_n, self.n, self.max_n)?;
        self.n = max_n;
        self.max_n = Some(max_n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_memory_forward_then_reverse_cycles_forever() {
        let mut schedule = SingleMemoryCheckpointSchedule::new();
        assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        schedule.finalize(10).unwrap();
        assert!(matches!(schedule.next().unwrap(), Action::EndForward));
        for _ in 0..3 {
            assert!(matches!(schedule.next().unwrap(), Action::Reverse { .. }));
            assert!(matches!(schedule.next().unwrap(), Action::EndReverse));
        }
        assert!(!schedule.is_exhausted());
    }

    #[test]
    fn single_memory_rejects_a_second_sentinel_request() {
        let mut schedule = SingleMemoryCheckpointSchedule::new();
        assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        assert!(schedule.next().is_err());
    }

    #[test]
    fn single_memory_uses_only_work() {
        let schedule = SingleMemoryCheckpointSchedule::new();
        assert!(schedule.uses_storage(StorageTier::Work));
        assert!(!schedule.uses_storage(StorageTier::Disk));
    }

    #[test]
    fn single_disk_copy_mode_cycles_forever() {
        let mut schedule = SingleDiskCheckpointSchedule::new(false);
        for _ in 0..5 {
            assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        }
        schedule.finalize(5).unwrap();
        assert!(matches!(schedule.next().unwrap(), Action::EndForward));
        for _ in 0..3 {
            for _ in 0..5 {
                assert!(matches!(schedule.next().unwrap(), Action::Copy { .. }));
                assert!(matches!(schedule.next().unwrap(), Action::Reverse { .. }));
            }
            assert!(matches!(schedule.next().unwrap(), Action::EndReverse));
        }
        assert!(!schedule.is_exhausted());
    }

    #[test]
    fn single_disk_move_mode_is_exhausted_after_one_pass() {
        let mut schedule = SingleDiskCheckpointSchedule::new(true);
        for _ in 0..4 {
            schedule.next().unwrap();
        }
        schedule.finalize(4).unwrap();
        assert!(matches!(schedule.next().unwrap(), Action::EndForward));
        for _ in 0..4 {
            assert!(matches!(schedule.next().unwrap(), Action::Move { .. }));
            assert!(matches!(schedule.next().unwrap(), Action::Reverse { .. }));
        }
        assert!(matches!(schedule.next().unwrap(), Action::EndReverse));
        assert!(schedule.is_exhausted());
        assert!(schedule.next().is_err());
    }

    #[test]
    fn none_schedule_ends_forward_then_exhausts() {
        let mut schedule = NoneCheckpointSchedule::new();
        assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        schedule.finalize(3).unwrap();
        assert!(matches!(schedule.next().unwrap(), Action::EndForward));
        assert!(schedule.is_exhausted());
        assert!(schedule.next().is_err());
    }

    #[test]
    fn none_schedule_rejects_a_second_sentinel_request() {
        let mut schedule = NoneCheckpointSchedule::new();
        assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        assert!(schedule.next().is_err());
    }

    #[test]
    fn none_schedule_never_uses_storage() {
        let schedule = NoneCheckpointSchedule::new();
        assert!(!schedule.uses_storage(StorageTier::Ram));
        assert!(!schedule.uses_storage(StorageTier::Work));
    }
}
