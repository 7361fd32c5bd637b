//! Mixed: a schedule that mixes forward-restart and adjoint-dependency data
//! in the same checkpointing units, assuming both cost the same to store
//! (component G).
//!
//! Grounded on `utils.py::{mixed_step_memoization, mixed_step_memoization_0}`
//! and `mixed.py::MixedCheckpointSchedule`
//! (Maddison, "On the implementation of checkpointing with high-level
//! algorithmic differentiation", https://arxiv.org/abs/2305.09568v1).
//! Offline: every action is a pure function of `max_n`, the checkpoint
//! capacity, and the storage tier, so (as with [`crate::multistage`]) the
//! `_iterator` generator is replaced with one eager build followed by a
//! cursor replay. The source's `numba`-tabulated variant is dropped in
//! favor of the memoized one — both compute the same tables, and this
//! crate has no JIT dependency to reach for.

use hashbrown::{HashMap, HashSet};

use crate::action::{Action, StepKind, StorageTier};
use crate::error::ScheduleError;
use crate::schedule::CheckpointSchedule;

/// Memoized dynamic-program tables for the two mutually-recursive
/// subproblems `mixed_step(n, s)` (checkpoint `n0` not yet written) and
/// `mixed_step_0(n, s)` (checkpoint `n0` already written).
#[derive(Default)]
pub struct MixedTables {
    step: HashMap<(usize, usize), (StepKind, usize, usize)>,
    step_0: HashMap<(usize, usize), (StepKind, usize, usize)>,
}

impl MixedTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimal step for `n` remaining steps and `s` free checkpoint slots,
    /// when the next step's initial data has not already been checkpointed.
    /// Returns `(step kind, step-local parameter, total cost)`.
    fn mixed_step(&mut self, n: usize, s: usize) -> Result<(StepKind, usize, usize), ScheduleError> {
        if n == 0 {
            return Err(ScheduleError::invalid_argument("invalid number of steps"));
        }
        let s = s.min(n - 1);
        let lower = if n >= 2 { 1 } else { 0 };
        if s < lower {
            return Err(ScheduleError::invalid_argument("invalid number of snapshots"));
        }
        if let Some(&cached) = self.step.get(&(n, s)) {
            return Ok(cached);
        }

        let result = if n == 1 {
            (StepKind::ForwardReverse, 1, 1)
        } else if n <= s + 1 {
            (StepKind::WriteData, 1, n)
        } else if s == 1 {
            (StepKind::WriteIcs, n - 1, n * (n + 1) / 2 - 1)
        } else {
            let mut best: Option<(StepKind, usize, usize)> = None;
            for i in 2..n {
                let left = self.mixed_step(i, s)?;
                let right = self.mixed_step(n - i, s - 1)?;
                let cost = i + left.2 + right.2;
                if best.map_or(true, |b| cost <= b.2) {
                    best = Some((StepKind::WriteIcs, i, cost));
                }
            }
            let mut best = best.ok_or_else(|| {
                ScheduleError::invalid_state("failed to determine total number of steps")
            })?;
            let tail = self.mixed_step(n - 1, s - 1)?;
            let alt_cost = 1 + tail.2;
            if alt_cost <= best.2 {
                best = (StepKind::WriteData, 1, alt_cost);
            }
            best
        };

        self.step.insert((n, s), result);
        Ok(result)
    }

    /// Optimal step for `n` remaining steps and `s` free checkpoint slots,
    /// when the next step's initial data is already checkpointed.
    fn mixed_step_0(&mut self, n: usize, s: usize) -> Result<(StepKind, usize, usize), ScheduleError> {
        let s = if n >= 2 { s.min(n - 2) } else { s };
        if n < s + 2 {
            return Err(ScheduleError::invalid_argument("invalid number of steps"));
        }
        if let Some(&cached) = self.step_0.get(&(n, s)) {
            return Ok(cached);
        }

        let result = if s == 0 {
            (StepKind::ForwardReverse, n, n * (n + 1) / 2 - 1)
        } else {
            let mut best: Option<(StepKind, usize, usize)> = None;
            for i in 1..n {
                let left = self.mixed_step(i, s + 1)?;
                let right = self.mixed_step(n - i, s)?;
                let cost = i + left.2 + right.2;
                if best.map_or(true, |b| cost <= b.2) {
                    best = Some((StepKind::Forward, i, cost));
                }
            }
            best.ok_or_else(|| {
                ScheduleError::invalid_state("failed to determine total number of steps")
            })?
        };

        self.step_0.insert((n, s), result);
        Ok(result)
    }
}

fn build_actions(
    max_n: usize,
    snapshots_cap: usize,
    storage: StorageTier,
) -> Result<Vec<Action>, ScheduleError> {
    let mut tables = MixedTables::new();
    let mut actions = Vec::new();
    let mut snapshot_set: HashSet<usize> = HashSet::new();
    let mut snapshots: Vec<(StepKind, usize)> = Vec::new();
    let mut n: usize = 0;
    let mut r: usize = 0;
    let mut step_type = StepKind::None;

    loop {
        while n < max_n - r {
            let n0 = n;
            let free = snapshots_cap - snapshots.len();
            let (kind, delta, _) = if snapshot_set.contains(&n0) {
                tables.mixed_step_0(max_n - r - n0, free)?
            } else {
                tables.mixed_step(max_n - r - n0, free)?
            };
            let n1 = n0 + delta;
            step_type = kind;

            match kind {
                StepKind::ForwardReverse => {
                    if n1 > n0 + 1 {
                        n = n1 - 1;
                        actions.push(Action::Forward {
                            n0,
                            n1: n1 - 1,
                            write_ics: false,
                            write_adj_deps: false,
                            storage: StorageTier::None,
                        });
                    } else if n1 <= n0 {
                        return Err(ScheduleError::invalid_state("invalid forward step"));
                    }
                    n += 1;
                    actions.push(Action::Forward {
                        n0: n1 - 1,
                        n1,
                        write_ics: false,
                        write_adj_deps: true,
                        storage: StorageTier::Work,
                    });
                }
                StepKind::Forward => {
                    if n1 <= n0 {
                        return Err(ScheduleError::invalid_state("invalid forward step"));
                    }
                    n = n1;
                    actions.push(Action::Forward {
                        n0,
                        n1,
                        write_ics: false,
                        write_adj_deps: false,
                        storage: StorageTier::None,
                    });
                }
                StepKind::WriteData => {
                    if n1 != n0 + 1 {
                        return Err(ScheduleError::invalid_state("invalid forward step"));
                    }
                    n = n1;
                    actions.push(Action::Forward {
                        n0,
                        n1,
                        write_ics: false,
                        write_adj_deps: true,
                        storage,
                    });
                    if snapshot_set.contains(&n0) {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    if snapshots.len() as i64 > snapshots_cap as i64 - 1 {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    snapshot_set.insert(n0);
                    snapshots.push((StepKind::ReadData, n0));
                }
                StepKind::WriteIcs => {
                    if n1 <= n0 + 1 {
                        return Err(ScheduleError::invalid_state("invalid action index"));
                    }
                    n = n1;
                    actions.push(Action::Forward {
                        n0,
                        n1,
                        write_ics: true,
                        write_adj_deps: false,
                        storage,
                    });
                    if snapshot_set.contains(&n0) {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    if snapshots.len() as i64 > snapshots_cap as i64 - 1 {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    snapshot_set.insert(n0);
                    snapshots.push((StepKind::ReadIcs, n0));
                }
                _ => return Err(ScheduleError::invalid_state("unexpected step type")),
            }
        }

        if n != max_n - r {
            return Err(ScheduleError::invalid_state("invalid forward step"));
        }
        if step_type != StepKind::ForwardReverse {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }

        if r == 0 {
            actions.push(Action::EndForward);
        }

        r += 1;
        actions.push(Action::Reverse {
            n1: max_n - r + 1,
            n0: max_n - r,
            clear_adj_deps: true,
        });

        if r == max_n {
            break;
        }

        let (kind, cp_n) = *snapshots.last().ok_or_else(|| {
            ScheduleError::invalid_state("invalid checkpointing state")
        })?;
        let cp_delete = cp_n as i64
            >= (max_n as i64 - r as i64 - 1 - (snapshots_cap as i64 - snapshots.len() as i64 + 1));
        if cp_delete {
            snapshot_set.remove(&cp_n);
            snapshots.pop();
        }

        n = cp_n;
        if kind == StepKind::ReadData {
            if !cp_delete {
                return Err(ScheduleError::invalid_state("invalid checkpointing state"));
            }
            n += 1;
        } else if kind != StepKind::ReadIcs {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }

        if cp_delete {
            actions.push(Action::Move {
                n: cp_n,
                from: storage,
                to: StorageTier::Work,
            });
        } else {
            actions.push(Action::Copy {
                n: cp_n,
                from: storage,
                to: StorageTier::Work,
            });
        }
    }

    if !snapshot_set.is_empty() || !snapshots.is_empty() {
        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
    }

    actions.push(Action::EndReverse);
    Ok(actions)
}

/// A schedule that mixes forward-restart and adjoint-dependency data in the
/// same checkpointing units, assuming they cost the same to store. Offline;
/// one adjoint calculation permitted.
pub struct MixedCheckpointSchedule {
    actions: Vec<Action>,
    cursor: usize,
    exhausted: bool,
    storage: StorageTier,
}

impl MixedCheckpointSchedule {
    pub fn new(max_n: usize, snapshots: usize, storage: StorageTier) -> Result<Self, ScheduleError> {
        if max_n < 1 {
            return Err(ScheduleError::invalid_argument("max_n must be positive"));
        }
        if storage != StorageTier::Ram && storage != StorageTier::Disk {
            return Err(ScheduleError::invalid_argument("invalid storage"));
        }
        let lower = if max_n >= 2 { 1 } else { 0 };
        if snapshots < lower {
            return Err(ScheduleError::invalid_argument("invalid number of snapshots"));
        }
        let snapshots = snapshots.min(max_n - 1);

        let actions = build_actions(max_n, snapshots, storage)?;
        Ok(MixedCheckpointSchedule {
            actions,
            cursor: 0,
            exhausted: false,
            storage,
        })
    }
}

impl CheckpointSchedule for MixedCheckpointSchedule {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        if self.exhausted {
            return Err(ScheduleError::ScheduleExhausted);
        }
        let action = self.actions[self.cursor];
        self.cursor += 1;
        if matches!(action, Action::EndReverse) {
            self.exhausted = true;
        }
        Ok(action)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        match tier {
            StorageTier::Ram | StorageTier::Disk => self.storage == tier,
            StorageTier::Work => true,
            StorageTier::FwdRestart | StorageTier::AdjDeps | StorageTier::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_storage() {
        assert!(MixedCheckpointSchedule::new(10, 3, StorageTier::Work).is_err());
    }

    #[test]
    fn rejects_too_few_snapshots() {
        assert!(MixedCheckpointSchedule::new(10, 0, StorageTier::Disk).is_err());
    }

    #[test]
    fn single_step_needs_no_snapshots() {
        let mut schedule = MixedCheckpointSchedule::new(1, 0, StorageTier::Disk).unwrap();
        let mut saw_end_forward = false;
        loop {
            match schedule.next().unwrap() {
                Action::EndForward => saw_end_forward = true,
                Action::EndReverse => break,
                _ => {}
            }
        }
        assert!(saw_end_forward);
        assert!(schedule.is_exhausted());
    }

    #[test]
    fn runs_to_end_reverse() {
        let mut schedule = MixedCheckpointSchedule::new(25, 4, StorageTier::Disk).unwrap();
        let mut steps = 0;
        loop {
            match schedule.next().unwrap() {
                Action::EndReverse => break,
                _ => {
                    steps += 1;
                    assert!(steps < 10_000, "schedule did not terminate");
                }
            }
        }
        assert!(schedule.is_exhausted());
        assert!(schedule.next().is_err());
    }

    #[test]
    fn uses_storage_reports_configured_tier_and_work() {
        let schedule = MixedCheckpointSchedule::new(25, 4, StorageTier::Ram).unwrap();
        assert!(schedule.uses_storage(StorageTier::Ram));
        assert!(!schedule.uses_storage(StorageTier::Disk));
        assert!(schedule.uses_storage(StorageTier::Work));
    }

    #[test]
    fn mixed_step_rejects_invalid_snapshot_count() {
        let mut tables = MixedTables::new();
        assert!(tables.mixed_step(5, 0).is_err());
    }

    #[test]
    fn mixed_step_clamps_excess_snapshots_like_the_reference() {
        let mut tables = MixedTables::new();
        assert_eq!(tables.mixed_step(5, 10).unwrap(), tables.mixed_step(5, 4).unwrap());
    }
}
