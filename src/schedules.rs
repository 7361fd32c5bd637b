//! Public schedule constructors for components C (Revolve family) and D
//! (H-Revolve): `Revolve`, `DiskRevolve`, `PeriodicDiskRevolve`,
//! `HRevolve`. Each picks `l = max_n - 1`, builds the
//! DP tables its builder function needs, runs the builder once, and wraps
//! the resulting operation stream in a [`RevolveEngine`].
//!
//! Grounded on
//! `off_revolver_iterators.py::{Revolve, DiskRevolve, PeriodicDiskRevolve, HRevolve}`
//! and `revolvers.py`'s matching wrapper classes, which establish the
//! `l = max_n - 1` relationship and the disk capacity conventions used here
//! (`max_n - snap_ram` live disk slots for the two disk-only schedules, a
//! caller-given `snap_disk` for H-Revolve).

use crate::action::{Action, StorageTier};
use crate::config::Costs;
use crate::cost_tables::{Opt0Table, Opt1dTable, OptInfTable};
use crate::error::ScheduleError;
use crate::hrevolve::hrevolve;
use crate::revolve::{disk_revolve, periodic_disk_revolve, revolve};
use crate::revolve::periodic_disk_revolve::{compute_mmax, compute_mx, mx_close_formula, mxrr_close_formula};
use crate::schedule::CheckpointSchedule;
use crate::translator::RevolveEngine;

fn require_max_n(max_n: usize) -> Result<usize, ScheduleError> {
    if max_n == 0 {
        return Err(ScheduleError::invalid_argument("max_n must be positive"));
    }
    Ok(max_n - 1)
}

/// The binomial (Griewank-Walther) checkpointing schedule: `snap_ram`
/// in-memory checkpoints, no disk tier.
pub struct Revolve {
    engine: RevolveEngine,
}

impl Revolve {
    pub fn new(max_n: usize, snap_ram: usize, costs: Costs) -> Result<Self, ScheduleError> {
        let l = require_max_n(max_n)?;
        let opt0 = Opt0Table::build(l, snap_ram, &costs);
        let ops = revolve(l, snap_ram, &costs, &opt0)?;
        Ok(Revolve {
            engine: RevolveEngine::new(ops, snap_ram, 0),
        })
    }
}

impl CheckpointSchedule for Revolve {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        self.engine.next()
    }

    fn is_exhausted(&self) -> bool {
        self.engine.is_exhausted()
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        self.engine.uses_storage(tier)
    }
}

/// Disk-Revolve: an unbounded disk tier above `snap_ram` in-memory
/// checkpoints, each disk checkpoint read at most once
/// (`one_read_disk = true`) or re-derivable via 1D-Revolve
/// (`one_read_disk = false`).
pub struct DiskRevolve {
    engine: RevolveEngine,
}

impl DiskRevolve {
    pub fn new(
        max_n: usize,
        snap_ram: usize,
        costs: Costs,
        one_read_disk: bool,
    ) -> Result<Self, ScheduleError> {
        let l = require_max_n(max_n)?;
        let opt0 = Opt0Table::build(l, snap_ram, &costs);
        let opt1d = Opt1dTable::build(l, snap_ram, &costs, &opt0, one_read_disk);
        let opt_inf = OptInfTable::build(l, snap_ram, &costs, &opt0, Some(&opt1d), one_read_disk);
        let ops = disk_revolve(l, snap_ram, &costs, &opt0, &opt1d, &opt_inf, one_read_disk)?;
        Ok(DiskRevolve {
            engine: RevolveEngine::new(ops, snap_ram, max_n),
        })
    }
}

impl CheckpointSchedule for DiskRevolve {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        self.engine.next()
    }

    fn is_exhausted(&self) -> bool {
        self.engine.is_exhausted()
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        self.engine.uses_storage(tier)
    }
}

/// Periodic-Disk-Revolve: asymptotically optimal for unbounded-length AC
/// graphs, writing to disk every `mx` forward steps. `period` pins `mx`
/// explicitly; otherwise it is derived the way the period-search helpers in
/// [`crate::revolve::periodic_disk_revolve`] do, picking the closed-form
/// search when `fast` is set.
pub struct PeriodicDiskRevolve {
    engine: RevolveEngine,
}

impl PeriodicDiskRevolve {
    pub fn new(
        max_n: usize,
        snap_ram: usize,
        costs: Costs,
        one_read_disk: bool,
        fast: bool,
        period: Option<usize>,
    ) -> Result<Self, ScheduleError> {
        let l = require_max_n(max_n)?;
        let cm = snap_ram;

        let mx = match period {
            Some(0) => return Err(ScheduleError::invalid_argument("period must be positive")),
            Some(p) => p,
            None if one_read_disk => mxrr_close_formula(cm as u64, costs.uf(), costs.rd(), costs.wd()),
            None => {
                let mmax = compute_mmax(cm as u64, costs.wd(), costs.rd(), costs.uf()) as usize;
                let mmax = mmax.max(1);
                if fast {
                    mx_close_formula(cm as u64, &costs, mmax)
                } else {
                    let opt0 = Opt0Table::build(mmax, cm, &costs);
                    compute_mx(cm, &costs, mmax, &opt0)
                }
            }
        };

        let table_bound = l.max(mx);
        let opt0 = Opt0Table::build(table_bound, cm, &costs);
        let opt1d = if one_read_disk {
            None
        } else {
            Some(Opt1dTable::build(table_bound, cm, &costs, &opt0, one_read_disk))
        };
        let ops = periodic_disk_revolve(l, cm, &costs, &opt0, opt1d.as_ref(), mx, one_read_disk)?;
        Ok(PeriodicDiskRevolve {
            engine: RevolveEngine::new(ops, snap_ram, max_n),
        })
    }
}

impl CheckpointSchedule for PeriodicDiskRevolve {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        self.engine.next()
    }

    fn is_exhausted(&self) -> bool {
        self.engine.is_exhausted()
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        self.engine.uses_storage(tier)
    }
}

/// H-Revolve: a `K = 2` level hierarchy of `snap_ram` in-memory and
/// `snap_disk` on-disk checkpoints. Mirrors the source's convention of
/// costing RAM writes/reads at `0` and only charging for the disk level.
pub struct HRevolve {
    engine: RevolveEngine,
}

impl HRevolve {
    pub fn new(
        max_n: usize,
        snap_ram: usize,
        snap_disk: usize,
        costs: Costs,
    ) -> Result<Self, ScheduleError> {
        let l = require_max_n(max_n)?;
        let cvect = [snap_ram, snap_disk];
        let (rvect, wvect) = if costs.num_levels() >= 2 {
            (
                [costs.rd_levels()[0], costs.rd_levels()[1]],
                [costs.wd_levels()[0], costs.wd_levels()[1]],
            )
        } else {
            ([0.0, costs.rd()], [0.0, costs.wd()])
        };
        let ops = hrevolve(l, &cvect, &wvect, &rvect, costs.uf(), costs.ub())?;
        Ok(HRevolve {
            engine: RevolveEngine::new(ops, snap_ram, snap_disk),
        })
    }
}

impl CheckpointSchedule for HRevolve {
    fn next(&mut self) -> Result<Action, ScheduleError> {
        self.engine.next()
    }

    fn is_exhausted(&self) -> bool {
        self.engine.is_exhausted()
    }

    fn uses_storage(&self, tier: StorageTier) -> bool {
        self.engine.uses_storage(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revolve_rejects_zero_max_n() {
        assert!(Revolve::new(0, 2, Costs::unit()).is_err());
    }

    #[test]
    fn revolve_runs_to_end_reverse() {
        let mut schedule = Revolve::new(6, 2, Costs::unit()).unwrap();
        let mut saw_end_forward = false;
        let mut saw_end_reverse = false;
        for _ in 0..500 {
            match schedule.next() {
                Ok(Action::EndForward) => saw_end_forward = true,
                Ok(Action::EndReverse) => {
                    saw_end_reverse = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => panic!("schedule errored before EndReverse: {e}"),
            }
        }
        assert!(saw_end_forward);
        assert!(saw_end_reverse);
        assert!(schedule.is_exhausted());
    }

    #[test]
    fn disk_revolve_uses_the_disk_tier() {
        let schedule = DiskRevolve::new(8, 2, Costs::unit(), true).unwrap();
        assert!(schedule.uses_storage(StorageTier::Disk));
    }

    #[test]
    fn periodic_disk_revolve_runs_to_end_reverse() {
        let mut schedule =
            PeriodicDiskRevolve::new(20, 2, Costs::unit(), true, true, None).unwrap();
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
    }

    #[test]
    fn periodic_disk_revolve_rejects_zero_period() {
        assert!(PeriodicDiskRevolve::new(20, 2, Costs::unit(), true, true, Some(0)).is_err());
    }

    #[test]
    fn h_revolve_runs_to_end_reverse() {
        let mut schedule = HRevolve::new(10, 2, 2, Costs::unit()).unwrap();
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
    }

    #[test]
    fn h_revolve_reports_both_tiers() {
        let schedule = HRevolve::new(10, 2, 2, Costs::unit()).unwrap();
        assert!(schedule.uses_storage(StorageTier::Ram));
        assert!(schedule.uses_storage(StorageTier::Disk));
    }
}
