//! MultiStage: the binomial (Griewank-Walther) offline schedule with a
//! snapshot stack distributed across RAM and disk (component F, binomial
//! half).
//!
//! Grounded on `utils.py::n_advance` (GW2000) and
//! `multistage.py::{allocate_snapshots, MultistageCheckpointSchedule}`.
//! Like [`crate::revolve`], the `_iterator` generator is replaced with an
//! eager build of the full [`Action`] stream followed by a cursor replay —
//! every action here is a pure function of `max_n`, the per-slot storage
//! assignment, and the trajectory rule, so there is nothing to compute
//! lazily.

use crate::action::{Action, StorageTier};
use crate::error::ScheduleError;
use crate::schedule::CheckpointSchedule;

/// Which of GW2000's two solutions to the "how far to advance" problem to
/// use when multiple step sizes are compatible with the optimal region
/// (Fig. 4 of GW2000).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trajectory {
    /// The maximum step size compatible with the optimal region.
    Maximum,
    /// The standard revolve solution (GW2000, equation at the bottom of
    /// p. 34).
    Revolve,
}

impl Default for Trajectory {
    fn default() -> Self {
        Trajectory::Maximum
    }
}

/// How far to advance the forward solver given `n` remaining steps and
/// `snapshots` available checkpointing units (GW2000 Proposition 1).
pub fn n_advance(n: usize, snapshots: usize, trajectory: Trajectory) -> Result<usize, ScheduleError> {
    if n < 1 {
        return Err(ScheduleError::invalid_argument("require at least one block"));
    }
    if snapshots == 0 {
        return Err(ScheduleError::invalid_argument("require at least one snapshot"));
    }

    let snapshots = snapshots.min(n - 1).max(1);
    if snapshots == 1 {
        return Ok(n - 1);
    }
    if snapshots == n - 1 {
        return Ok(1);
    }

    let n128 = n as u128;
    let s = snapshots as u128;

    let mut t: u128 = 2;
    let mut b_s_tm2: u128 = 1;
    let mut b_s_tm1: u128 = s + 1;
    let mut b_s_t: u128 = (s + 1) * (s + 2) / 2;

    while b_s_tm1 >= n128 || n128 > b_s_t {
        t += 1;
        b_s_tm2 = b_s_tm1;
        b_s_tm1 = b_s_t;
        b_s_t = b_s_t * (s + t) / t;
    }

    let result = match trajectory {
        Trajectory::Maximum => {
            let b_sm1_tm2 = (b_s_tm2 * s) / (s + t - 2);
            if n128 <= b_s_tm1 + b_sm1_tm2 {
                n128 - b_s_tm1 + b_s_tm2
            } else {
                let b_sm1_tm1 = (b_s_tm1 * s) / (s + t - 1);
                let b_sm2_tm1 = (b_sm1_tm1 * (s - 1)) / (s + t - 2);
                if n128 <= b_s_tm1 + b_sm2_tm1 + b_sm1_tm2 {
                    b_s_tm2 + b_sm1_tm2
                } else if n128 <= b_s_tm1 + b_sm1_tm1 + b_sm2_tm1 {
                    n128 - b_sm1_tm1 - b_sm2_tm1
                } else {
                    b_s_tm1
                }
            }
        }
        Trajectory::Revolve => {
            let b_sm1_tm1 = (b_s_tm1 * s) / (s + t - 1);
            let b_sm2_tm1 = (b_sm1_tm1 * (s - 1)) / (s + t - 2);
            if n128 <= b_s_tm1 + b_sm2_tm1 {
                b_s_tm2
            } else if n128 < b_s_tm1 + b_sm1_tm1 + b_sm2_tm1 {
                n128 - b_sm1_tm1 - b_sm2_tm1
            } else {
                b_s_tm1
            }
        }
    };

    Ok(result as usize)
}

fn write(
    n0: usize,
    snapshots: &mut Vec<usize>,
    storage: &[StorageTier],
    capacity: usize,
) -> Result<StorageTier, ScheduleError> {
    if snapshots.len() >= capacity {
        return Err(ScheduleError::invalid_state("unexpected snapshot number"));
    }
    snapshots.push(n0);
    Ok(storage[snapshots.len() - 1])
}

/// Build the full `max_n`-step action stream for a snapshot stack with the
/// given per-slot storage assignment. Grounded on
/// `multistage.py::MultistageCheckpointSchedule._iterator`.
fn build_actions(
    max_n: usize,
    storage: &[StorageTier],
    trajectory: Trajectory,
) -> Result<Vec<Action>, ScheduleError> {
    if max_n < 1 {
        return Err(ScheduleError::invalid_argument("max_n must be positive"));
    }
    let capacity = storage.len();
    let mut actions = Vec::new();
    let mut snapshots: Vec<usize> = Vec::new();
    let mut n: usize = 0;
    let mut r: usize = 0;

    while n < max_n - 1 {
        let n_snapshots = capacity - snapshots.len();
        let n0 = n;
        let n1 = n0 + n_advance(max_n - n0, n_snapshots, trajectory)?;
        if n1 <= n0 {
            return Err(ScheduleError::invalid_state("n_advance did not advance"));
        }
        n = n1;
        let cp_storage = write(n0, &mut snapshots, storage, capacity)?;
        actions.push(Action::Forward {
            n0,
            n1,
            write_ics: true,
            write_adj_deps: false,
            storage: cp_storage,
        });
    }
    if n != max_n - 1 {
        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
    }

    n += 1;
    actions.push(Action::Forward {
        n0: n - 1,
        n1: n,
        write_ics: false,
        write_adj_deps: true,
        storage: StorageTier::Work,
    });
    actions.push(Action::EndForward);

    r += 1;
    actions.push(Action::Reverse {
        n1: n,
        n0: n - 1,
        clear_adj_deps: true,
    });

    while r < max_n {
        if snapshots.is_empty() {
            return Err(ScheduleError::invalid_state("invalid checkpointing state"));
        }
        let cp_n = *snapshots.last().unwrap();
        let cp_storage = storage[snapshots.len() - 1];
        if cp_n == max_n - r - 1 {
            snapshots.pop();
            n = cp_n;
            actions.push(Action::Move {
                n: cp_n,
                from: cp_storage,
                to: StorageTier::Work,
            });
        } else {
            n = cp_n;
            actions.push(Action::Copy {
                n: cp_n,
                from: cp_storage,
                to: StorageTier::Work,
            });

            let n_snapshots = capacity - snapshots.len() + 1;
            let n0 = n;
            let n1 = n0 + n_advance(max_n - r - n0, n_snapshots, trajectory)?;
            if n1 <= n0 {
                return Err(ScheduleError::invalid_state("n_advance did not advance"));
            }
            n = n1;
            actions.push(Action::Forward {
                n0,
                n1,
                write_ics: false,
                write_adj_deps: false,
                storage: StorageTier::Work,
            });

            while n < max_n - r - 1 {
                let n_snapshots = capacity - snapshots.len();
                let n0 = n;
                let n1 = n0 + n_advance(max_n - r - n0, n_snapshots, trajectory)?;
                if n1 <= n0 {
                    return Err(ScheduleError::invalid_state("n_advance did not advance"));
                }
                n = n1;
                let cp_storage = write(n0, &mut snapshots, storage, capacity)?;
                actions.push(Action::Forward {
                    n0,
                    n1,
                    write_ics: true,
                    write_adj_deps: false,
                    storage: cp_storage,
                });
            }
            if n != max_n - r - 1 {
                return Err(ScheduleError::invalid_state("invalid checkpointing state"));
            }
        }

        n += 1;
        actions.push(Action::Forward {
            n0: n - 1,
            n1: n,
            write_ics: false,
            write_adj_deps: true,
            storage: StorageTier::Work,
        });
        r += 1;
        actions.push(Action::Reverse {
            n1: n,
            n0: n - 1,
            clear_adj_deps: true,
        });
    }
    if r != max_n {
        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
    }
    if !snapshots.is_empty() {
        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
    }

    actions.push(Action::EndReverse);
    Ok(actions)
}

/// Drive a trial all-disk schedule once to measure how often each stack
/// slot is read/written/deleted, then assign the highest-cost slots to RAM.
/// Grounded on `multistage.py::allocate_snapshots`.
///
/// Reproduces Stumm & Walther's MultiStage RAM/disk split for unit
/// read/write weights and zero delete weight.
pub fn allocate_snapshots(
    max_n: usize,
    snapshots_in_ram: usize,
    snapshots_on_disk: usize,
    write_weight: f64,
    read_weight: f64,
    delete_weight: f64,
    trajectory: Trajectory,
) -> Result<(Vec<f64>, Vec<StorageTier>), ScheduleError> {
    let snapshots_in_ram = snapshots_in_ram.min(max_n - 1);
    let snapshots_on_disk = snapshots_on_disk.min(max_n - 1);
    let snapshots = (snapshots_in_ram + snapshots_on_disk).min(max_n - 1);
    let mut weights = vec![0.0f64; snapshots];

    let trial_storage = vec![StorageTier::Disk; snapshots];
    let actions = build_actions(max_n, &trial_storage, trajectory)?;

    let mut snapshot_i: isize = -1;
    for action in actions {
        match action {
            Action::Copy { .. } => {
                if snapshot_i < 0 {
                    return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                }
                weights[snapshot_i as usize] += read_weight;
            }
            Action::Move { to, .. } => {
                if snapshot_i < 0 {
                    return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                }
                weights[snapshot_i as usize] += read_weight;
                if to == StorageTier::Work {
                    weights[snapshot_i as usize] += delete_weight;
                    snapshot_i -= 1;
                }
            }
            Action::Forward { write_ics, .. } => {
                if write_ics {
                    snapshot_i += 1;
                    if snapshot_i as usize >= snapshots {
                        return Err(ScheduleError::invalid_state("invalid checkpointing state"));
                    }
                    weights[snapshot_i as usize] += write_weight;
                }
            }
            Action::Reverse { .. } | Action::EndForward | Action::EndReverse => {}
        }
    }

    let mut order: Vec<usize> = (0..snapshots).collect();
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut allocation = vec![StorageTier::Disk; snapshots];
    for &i in order.iter().take(snapshots_in_ram) {
        allocation[i] = StorageTier::Ram;
    }

    Ok((weights, allocation))
}

/// The binomial checkpointing schedule (Griewank-Walther), with a MultiStage
/// distribution of the snapshot stack between RAM and disk. Offline; one
/// adjoint calculation permitted.
pub struct MultiStageCheckpointSchedule {
    snapshots_in_ram: usize,
    snapshots_on_disk: usize,
    actions: Vec<Action>,
    cursor: usize,
    exhausted: bool,
}

impl MultiStageCheckpointSchedule {
    pub fn new(
        max_n: usize,
        snapshots_in_ram: usize,
        snapshots_on_disk: usize,
        trajectory: Trajectory,
    ) -> Result<Self, ScheduleError> {
        if max_n < 1 {
            return Err(ScheduleError::invalid_argument("max_n must be positive"));
        }
        let snapshots_in_ram = snapshots_in_ram.min(max_n - 1);
        let snapshots_on_disk = snapshots_on_disk.min(max_n - 1);

        let storage = if snapshots_in_ram == 0 {
            vec![StorageTier::Disk; snapshots_on_disk]
        } else if snapshots_on_disk == 0 {
            vec![StorageTier::Ram; snapshots_in_ram]
        } else {
            let (_, allocation) = allocate_snapshots(
                max_n,
                snapshots_in_ram,
                snapshots_on_disk,
                1.0,
                1.0,
                0.0,
                trajectory,
            )?;
            allocation
        };

        Self::with_storage(max_n, storage, trajectory)
    }

    fn with_storage(
        max_n: usize,
        storage: Vec<StorageTier>,
        trajectory: Trajectory,
    ) -> Result<Self, ScheduleError> {
        let snapshots_in_ram = storage.iter().filter(|&&t| t == StorageTier::Ram).count();
        let snapshots_on_disk = storage.iter().filter(|&&t| t == StorageTier::Disk).count();
        let actions = build_actions(max_n, &storage, trajectory)?;
        Ok(MultiStageCheckpointSchedule {
            snapshots_in_ram,
            snapshots_on_disk,
            actions,
            cursor: 0,
            exhausted: false,
        })
    }
}

impl CheckpointSchedule for MultiStageCheckpointSchedule {
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
            StorageTier::Ram => self.snapshots_in_ram > 0,
            StorageTier::Disk => self.snapshots_on_disk > 0,
            StorageTier::Work => true,
            StorageTier::FwdRestart | StorageTier::AdjDeps | StorageTier::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_advance_minimal_storage_runs_all_but_one_step() {
        assert_eq!(n_advance(10, 1, Trajectory::Maximum).unwrap(), 9);
    }

    #[test]
    fn n_advance_maximal_storage_advances_one_step() {
        assert_eq!(n_advance(10, 9, Trajectory::Maximum).unwrap(), 1);
    }

    #[test]
    fn n_advance_rejects_zero_blocks_or_snapshots() {
        assert!(n_advance(0, 1, Trajectory::Maximum).is_err());
        assert!(n_advance(5, 0, Trajectory::Maximum).is_err());
    }

    #[test]
    fn multistage_runs_to_end_reverse() {
        let mut schedule = MultiStageCheckpointSchedule::new(20, 3, 2, Trajectory::Maximum).unwrap();
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
    }

    #[test]
    fn multistage_exhausted_after_end_reverse() {
        let mut schedule = MultiStageCheckpointSchedule::new(6, 2, 0, Trajectory::Revolve).unwrap();
        loop {
            match schedule.next().unwrap() {
                Action::EndReverse => break,
                _ => {}
            }
        }
        assert!(schedule.next().is_err());
    }

    #[test]
    fn multistage_rejects_zero_max_n() {
        assert!(MultiStageCheckpointSchedule::new(0, 1, 1, Trajectory::Maximum).is_err());
    }

    #[test]
    fn ram_only_construction_skips_allocation() {
        let schedule = MultiStageCheckpointSchedule::new(8, 3, 0, Trajectory::Maximum).unwrap();
        assert!(schedule.uses_storage(StorageTier::Ram));
        assert!(!schedule.uses_storage(StorageTier::Disk));
    }

    #[test]
    fn mixed_ram_and_disk_allocation_uses_both_tiers() {
        let schedule = MultiStageCheckpointSchedule::new(30, 3, 3, Trajectory::Maximum).unwrap();
        assert!(schedule.uses_storage(StorageTier::Ram));
        assert!(schedule.uses_storage(StorageTier::Disk));
    }

    #[test]
    fn allocate_snapshots_assigns_expected_slot_count() {
        let (weights, allocation) =
            allocate_snapshots(30, 3, 3, 1.0, 1.0, 0.0, Trajectory::Maximum).unwrap();
        assert_eq!(weights.len(), 6);
        assert_eq!(allocation.iter().filter(|&&t| t == StorageTier::Ram).count(), 3);
        assert_eq!(allocation.iter().filter(|&&t| t == StorageTier::Disk).count(), 3);
    }
}
