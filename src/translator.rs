//! The revolve-sequence translator (component E): turns a flat
//! [`Operation`] list, built once by one of the [`crate::revolve`] or
//! [`crate::hrevolve`] builders, into the public [`Action`] algebra.
//!
//! Grounded on spec.md §4.E's translation table. Does not port the
//! source's `off_revolver_iterators.py::RevolveCheckpointSchedule._iterator`
//! driver logic literally (it mixes driver-side assertions into the
//! translator in a way spec.md §9 calls out as a redesign target); this
//! engine instead derives write/read semantics purely from adjacency in
//! the flat operation stream.

use std::collections::VecDeque;

use crate::action::{Action, StorageTier};
use crate::error::ScheduleError;
use crate::operation::Operation;
use crate::schedule::CheckpointSchedule;
use crate::storage::SnapshotMirror;

fn tier_for_level(level: usize) -> StorageTier {
    if level == 0 {
        StorageTier::Ram
    } else {
        StorageTier::Disk
    }
}

/// Replays a precomputed [`Operation`] sequence, translating it into
/// [`Action`]s one at a time while tracking which checkpoints are live in
/// which tier.
///
/// Shared by [`crate::revolve::revolve`], [`crate::revolve::disk_revolve`],
/// [`crate::revolve::periodic_disk_revolve`], and [`crate::hrevolve::hrevolve`]
/// — each builds its own operation vector, then hands it to one
/// `RevolveEngine`. The one concrete instance of "replacing coroutines"
/// from spec.md §9: eager construction, then flat replay, instead of
/// nested generators.
pub struct RevolveEngine {
    ops: Vec<Operation>,
    cursor: usize,
    mirror: SnapshotMirror,
    pending: VecDeque<Action>,
    pending_write: Option<(StorageTier, usize)>,
    pending_write_forward: Option<usize>,
    forward_phase_done: bool,
    exhausted: bool,
}

impl RevolveEngine {
    pub fn new(ops: Vec<Operation>, ram_capacity: usize, disk_capacity: usize) -> Self {
        RevolveEngine {
            ops,
            cursor: 0,
            mirror: SnapshotMirror::new(ram_capacity, disk_capacity),
            pending: VecDeque::new(),
            pending_write: None,
            pending_write_forward: None,
            forward_phase_done: false,
            exhausted: false,
        }
    }

    fn write_tier_and_n(op: Operation) -> Option<(StorageTier, usize)> {
        match op {
            Operation::WriteMemory(n) => Some((StorageTier::Ram, n)),
            Operation::WriteDisk(n) => Some((StorageTier::Disk, n)),
            Operation::Write { level, n } => Some((tier_for_level(level), n)),
            _ => None,
        }
    }

    fn read_tier_and_n(op: Operation) -> Option<(StorageTier, usize)> {
        match op {
            Operation::ReadMemory(n) => Some((StorageTier::Ram, n)),
            Operation::ReadDisk(n) => Some((StorageTier::Disk, n)),
            Operation::Read { level, n } => Some((tier_for_level(level), n)),
            _ => None,
        }
    }

    fn discard_tier_and_n(op: Operation) -> Option<(StorageTier, usize)> {
        match op {
            Operation::DiscardMemory(n) => Some((StorageTier::Ram, n)),
            Operation::DiscardDisk(n) => Some((StorageTier::Disk, n)),
            Operation::Discard { level, n } => Some((tier_for_level(level), n)),
            _ => None,
        }
    }

    /// Whether `tier`/`n`'s next reference in the remaining stream is a
    /// `Discard` (the checkpoint will not be read again) rather than
    /// another `Read` (it will be).
    fn read_is_terminal(&self, tier: StorageTier, n: usize) -> bool {
        for &op in &self.ops[self.cursor..] {
            if let Some((t, m)) = Self::read_tier_and_n(op) {
                if t == tier && m == n {
                    return false;
                }
            }
            if let Some((t, m)) = Self::discard_tier_and_n(op) {
                if t == tier && m == n {
                    return true;
                }
            }
        }
        true
    }

    fn step(&mut self) -> Result<Action, ScheduleError> {
        loop {
            if self.cursor >= self.ops.len() {
                if !self.mirror.is_empty() {
                    return Err(ScheduleError::invalid_state(
                        "snapshot mirror is not empty at the end of the operation stream",
                    ));
                }
                self.exhausted = true;
                return Ok(Action::EndReverse);
            }
            let op = self.ops[self.cursor];
            self.cursor += 1;

            if let Some((tier, n)) = Self::write_tier_and_n(op) {
                if !self.mirror.insert(tier, n) {
                    return Err(ScheduleError::invalid_state(format!(
                        "{tier} is at capacity while writing step {n}"
                    )));
                }
                self.pending_write = Some((tier, n));
                continue;
            }

            if let Operation::WriteForwardMemory(n) = op {
                self.pending_write_forward = Some(n);
                continue;
            }

            if let Operation::Forward { n0, n1 } = op {
                if let Some((tier, wn)) = self.pending_write.take() {
                    if wn == n0 {
                        return Ok(Action::Forward {
                            n0,
                            n1,
                            write_ics: true,
                            write_adj_deps: false,
                            storage: tier,
                        });
                    }
                }
                if let Some(wn) = self.pending_write_forward.take() {
                    if wn == n1 {
                        return Ok(Action::Forward {
                            n0,
                            n1,
                            write_ics: false,
                            write_adj_deps: true,
                            storage: StorageTier::FwdRestart,
                        });
                    }
                }
                return Ok(Action::Forward {
                    n0,
                    n1,
                    write_ics: false,
                    write_adj_deps: false,
                    storage: StorageTier::None,
                });
            }

            if let Operation::Backward { n1, n0 } = op {
                let reverse = Action::Reverse {
                    n1,
                    n0,
                    clear_adj_deps: true,
                };
                if !self.forward_phase_done {
                    self.forward_phase_done = true;
                    self.pending.push_back(reverse);
                    return Ok(Action::EndForward);
                }
                return Ok(reverse);
            }

            if let Some((tier, n)) = Self::read_tier_and_n(op) {
                let delete = self.read_is_terminal(tier, n);
                if delete {
                    self.mirror.remove(tier, n);
                    return Ok(Action::Move {
                        n,
                        from: tier,
                        to: StorageTier::Work,
                    });
                }
                return Ok(Action::Copy {
                    n,
                    from: tier,
                    to: StorageTier::Work,
                });
            }

            if let Some((tier, n)) = Self::discard_tier_and_n(op) {
                self.mirror.remove(tier, n);
                continue;
            }

            // DiscardForwardMemory: the transient restart slot is freed by
            // construction once consumed; nothing further to bookkeep.
        }
    }
}

impl CheckpointSchedule for RevolveEngine {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        if let Some(action) = self.pending.pop_front() {
            return Ok(action);
        }
        if self.exhausted {
            return Err(ScheduleError::ScheduleExhausted);
        }
        self.step()
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted && self.pending.is_empty()
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        match tier {
            StorageTier::Ram => self.ops.iter().any(|op| {
                matches!(
                    op,
                    Operation::WriteMemory(_) | Operation::ReadMemory(_) | Operation::DiscardMemory(_)
                ) || matches!(op, Operation::Write { level: 0, .. } | Operation::Read { level: 0, .. } | Operation::Discard { level: 0, .. })
            }),
            StorageTier::Disk => self.ops.iter().any(|op| {
                matches!(
                    op,
                    Operation::WriteDisk(_) | Operation::ReadDisk(_) | Operation::DiscardDisk(_)
                ) || matches!(op, Operation::Write { level, .. } | Operation::Read { level, .. } | Operation::Discard { level, .. } if *level > 0)
            }),
            StorageTier::FwdRestart => self
                .ops
                .iter()
                .any(|op| matches!(op, Operation::WriteForwardMemory(_))),
            StorageTier::Work => self.ops.iter().any(|op| Self::read_tier_and_n(*op).is_some()),
            StorageTier::AdjDeps | StorageTier::None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Costs;
    use crate::cost_tables::Opt0Table;
    use crate::revolve::revolve;

    #[test]
    fn l_zero_schedule_ends_forward_then_reverse() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(0, 1, &costs);
        let ops = revolve(0, 1, &costs, &opt0).unwrap();
        let mut engine = RevolveEngine::new(ops, 1, 0);
        assert!(matches!(engine.next().unwrap(), Action::Forward { .. }));
        assert!(matches!(engine.next().unwrap(), Action::EndForward));
        assert!(matches!(engine.next().unwrap(), Action::Reverse { .. }));
        assert!(matches!(engine.next().unwrap(), Action::EndReverse));
        assert!(engine.is_exhausted());
        assert!(engine.next().is_err());
    }

    #[test]
    fn uses_storage_reports_ram_for_a_memory_only_schedule() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(0, 1, &costs);
        let ops = revolve(0, 1, &costs, &opt0).unwrap();
        let engine = RevolveEngine::new(ops, 1, 0);
        assert!(!engine.uses_storage(StorageTier::Disk));
    }
}
