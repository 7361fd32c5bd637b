//! Two-Level: periodic disk checkpoints every `period` forward steps, with
//! a binomial (MultiStage-style) snapshot stack filling the gap between
//! consecutive disk checkpoints during each reverse pass (component F,
//! periodic+binomial half).
//!
//! Grounded on `twolevel_binomial.py::TwoLevelCheckpointSchedule`. Online:
//! the forward phase stays lazy (`max_n` is unknown until [`finalize`] is
//! called), but once fixed every reverse pass computes the same action
//! sequence as the last, so it is built once and replayed on a wrapping
//! cursor rather than recomputed per pass.
//!
//! [`finalize`]: crate::schedule::CheckpointSchedule::finalize

use crate::action::{Action, StorageTier};
use crate::error::ScheduleError;
use crate::multistage::{n_advance, Trajectory};
use crate::schedule::{validate_finalize, CheckpointSchedule};

fn build_reverse_pass(
    max_n: usize,
    period: usize,
    binomial_snapshots: usize,
    binomial_storage: StorageTier,
    trajectory: Trajectory,
) -> Result<Vec<Action>, ScheduleError> {
    let mut actions = Vec::new();
    let mut r: usize = 0;

    while r < max_n {
        let n = max_n - r - 1;
        let n0s = (n / period) * period;
        let n1s = (n0s + period).min(max_n);
        if r != max_n - n1s {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }

        let mut snapshots: Vec<usize> = vec![n0s];
        while r < max_n - n0s {
            if snapshots.is_empty() {
                return Err(ScheduleError::invalid_state("invalid checkpointing state"));
            }
            let cp_n = *snapshots.last().unwrap();
            let mut n_cursor;

            if cp_n == max_n - r - 1 {
                snapshots.pop();
                n_cursor = cp_n;
                if cp_n == n0s {
                    actions.push(Action::Copy {
                        n: cp_n,
                        from: StorageTier::Disk,
                        to: StorageTier::Work,
                    });
                } else {
                    actions.push(Action::Move {
                        n: cp_n,
                        from: binomial_storage,
                        to: StorageTier::Work,
                    });
                }
            } else {
                n_cursor = cp_n;
                if cp_n == n0s {
                    actions.push(Action::Copy {
                        n: cp_n,
                        from: StorageTier::Disk,
                        to: StorageTier::Work,
                    });
                } else {
                    actions.push(Action::Copy {
                        n: cp_n,
                        from: binomial_storage,
                        to: StorageTier::Work,
                    });
                }

                let n_snapshots = binomial_snapshots + 1 - snapshots.len() + 1;
                let n0 = n_cursor;
                let n1 = n0 + n_advance(max_n - r - n0, n_snapshots, trajectory)?;
                if n1 <= n0 {
                    return Err(ScheduleError::invalid_state("n_advance did not advance"));
                }
                n_cursor = n1;
                actions.push(Action::Forward {
                    n0,
                    n1,
                    write_ics: false,
                    write_adj_deps: false,
                    storage: StorageTier::Work,
                });

                while n_cursor < max_n - r - 1 {
                    let n_snapshots = binomial_snapshots + 1 - snapshots.len();
                    let n0 = n_cursor;
                    let n1 = n0 + n_advance(max_n - r - n0, n_snapshots, trajectory)?;
                    if n1 <= n0 {
                        return Err(ScheduleError::invalid_state("n_advance did not advance"));
                    }
                    n_cursor = n1;
                    actions.push(Action::Forward {
                        n0,
                        n1,
                        write_ics: true,
                        write_adj_deps: false,
                        storage: binomial_storage,
                    });

                    if snapshots.len() >= binomial_snapshots + 1 {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    snapshots.push(n0);
                }

                if n_cursor != max_n - r - 1 {
                    return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                }
            }

            n_cursor += 1;
            actions.push(Action::Forward {
                n0: n_cursor - 1,
                n1: n_cursor,
                write_ics: false,
                write_adj_deps: true,
                storage: StorageTier::Work,
            });

            r += 1;
            actions.push(Action::Reverse {
                n1: n_cursor,
                n0: n_cursor - 1,
                clear_adj_deps: true,
            });
        }

        if r != max_n - n0s {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }
        if !snapshots.is_empty() {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }
    }
    if r != max_n {
        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
    }

    actions.push(Action::EndReverse);
    Ok(actions)
}

/// A two-level mixed periodic/binomial schedule: disk checkpoints every
/// `period` forward steps, with up to `binomial_snapshots` additional
/// checkpoints (in `binomial_storage`) filling each period during a reverse
/// pass. Online; unlimited adjoint calculations permitted.
pub struct TwoLevelCheckpointSchedule {
    period: usize,
    binomial_snapshots: usize,
    binomial_storage: StorageTier,
    trajectory: Trajectory,
    max_n: Option<usize>,
    n: usize,
    end_forward_emitted: bool,
    reverse_actions: Option<Vec<Action>>,
    reverse_cursor: usize,
}

impl TwoLevelCheckpointSchedule {
    pub fn new(
        period: usize,
        binomial_snapshots: usize,
        binomial_storage: StorageTier,
        trajectory: Trajectory,
    ) -> Result<Self, ScheduleError> {
        if period < 1 {
            return Err(ScheduleError::invalid_argument("period must be positive"));
        }
        if binomial_storage != StorageTier::Ram && binomial_storage != StorageTier::Disk {
            return Err(ScheduleError::invalid_argument("invalid storage"));
        }
        Ok(TwoLevelCheckpointSchedule {
            period,
            binomial_snapshots,
            binomial_storage,
            trajectory,
            max_n: None,
            n: 0,
            end_forward_emitted: false,
            reverse_actions: None,
            reverse_cursor: 0,
        })
    }
}

impl CheckpointSchedule for TwoLevelCheckpointSchedule {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        let Some(max_n) = self.max_n else {
            let n0 = self.n;
            let n1 = n0 + self.period;
            self.n = n1;
            return Ok(Action::Forward {
                n0,
                n1,
                write_ics: true,
                write_adj_deps: false,
                storage: StorageTier::Disk,
            });
        };

        if !self.end_forward_emitted {
            self.end_forward_emitted = true;
            return Ok(Action::EndForward);
        }

        if self.reverse_actions.is_none() {
            let actions = build_reverse_pass(
                max_n,
                self.period,
                self.binomial_snapshots,
                self.binomial_storage,
                self.trajectory,
            )?;
            self.reverse_actions = Some(actions);
            self.reverse_cursor = 0;
        }

        let actions = self.reverse_actions.as_ref().unwrap();
        let action = actions[self.reverse_cursor];
        self.reverse_cursor += 1;
        if self.reverse_cursor == actions.len() {
            self.reverse_cursor = 0;
        }
        Ok(action)
    }

    fn is_exhausted(&self) -> bool {
        false
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        match tier {
            StorageTier::Disk => true,
            StorageTier::Ram => self.binomial_storage == StorageTier::Ram,
            StorageTier::Work => true,
            StorageTier::FwdRestart | StorageTier::AdjDeps | StorageTier::None => false,
        }
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
    fn rejects_zero_period() {
        assert!(TwoLevelCheckpointSchedule::new(0, 2, StorageTier::Disk, Trajectory::Maximum).is_err());
    }

    #[test]
    fn rejects_non_ram_disk_binomial_storage() {
        assert!(TwoLevelCheckpointSchedule::new(4, 2, StorageTier::Work, Trajectory::Maximum).is_err());
    }

    #[test]
    fn forward_phase_is_lazy_until_finalized() {
        let mut schedule =
            TwoLevelCheckpointSchedule::new(4, 2, StorageTier::Ram, Trajectory::Maximum).unwrap();
        for _ in 0..5 {
            assert!(matches!(schedule.next().unwrap(), Action::Forward { .. }));
        }
        assert!(schedule.finalize(20).is_ok());
    }

    #[test]
    fn repeated_matching_finalize_is_a_no_op() {
        let mut schedule =
            TwoLevelCheckpointSchedule::new(4, 2, StorageTier::Ram, Trajectory::Maximum).unwrap();
        for _ in 0..5 {
            schedule.next().unwrap();
        }
        assert!(schedule.finalize(20).is_ok());
        assert!(schedule.finalize(20).is_ok());
    }

    #[test]
    fn reverse_pass_cycles_and_never_exhausts() {
        let mut schedule =
            TwoLevelCheckpointSchedule::new(4, 1, StorageTier::Disk, Trajectory::Maximum).unwrap();
        loop {
            if matches!(schedule.next().unwrap(), Action::EndForward) {
                break;
            }
        }
        let mut end_reverse_count = 0;
        let mut steps = 0;
        while end_reverse_count < 3 {
            if matches!(schedule.next().unwrap(), Action::EndReverse) {
                end_reverse_count += 1;
            }
            steps += 1;
            assert!(steps < 10_000, "reverse pass did not cycle");
        }
        assert!(!schedule.is_exhausted());
    }
}
