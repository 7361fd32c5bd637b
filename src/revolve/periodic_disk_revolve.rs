//! Periodic-Disk-Revolve: asymptotically optimal for unbounded-length AC
//! graphs, checkpointing to disk every `mx` forward steps.
//!
//! Grounded on
//! `hrevolve_sequences/periodic_disk_revolve.py::periodic_disk_revolve`
//! (Aupy & Herrmann, "Periodicity in optimal hierarchical checkpointing
//! schemes for adjoint computations", 2017).

use crate::combinatorics::beta;
use crate::config::Costs;
use crate::cost_tables::{Opt0Table, Opt1dTable};
use crate::error::ScheduleError;
use crate::operation::{shift_all, Operation};
use crate::revolve::revolve::revolve;
use crate::revolve::revolve_1d::revolve_1d;

/// Upper bound on the period worth searching, given `cm` in-memory slots
/// and the disk/forward cost ratios.
pub fn compute_mmax(cm: u64, wd: f64, rd: f64, uf: f64) -> u64 {
    let mut td1 = 0u64;
    while beta(cm, td1) as f64 <= (wd + rd) / uf {
        td1 += 1;
    }
    let mut td2 = 0u64;
    while beta(cm, td2) as f64 <= wd / uf {
        td2 += 1;
    }
    beta(cm, td1 + 1).max(2 * beta(cm, td2) + 1) as u64
}

fn rel_cost_x(m: usize, opt_1d_m_minus_1: f64, wd: f64, rd: f64) -> f64 {
    (wd + rd + opt_1d_m_minus_1) / m as f64
}

/// Search `m = 1..=mmax` directly for the period minimizing the relative
/// per-step cost of one write/forward/read cycle.
pub fn compute_mx(cm: usize, costs: &Costs, mmax: usize, opt0: &Opt0Table) -> usize {
    let opt1d = Opt1dTable::build(mmax, cm, costs, opt0, false);
    let mut mx = 1usize;
    let mut best = rel_cost_x(1, opt1d.get(0), costs.wd(), costs.rd());
    for candidate in 2..=mmax {
        let obj = rel_cost_x(candidate, opt1d.get(candidate - 1), costs.wd(), costs.rd());
        if obj <= best {
            best = obj;
            mx = candidate;
        }
    }
    mx
}

/// Closed-form candidate period search, used when disk checkpoints are
/// read at most once (`one_read_disk`), avoiding the linear scan in
/// [`compute_mx`].
pub fn mx_close_formula(cm: u64, costs: &Costs, opt0_hint_mmax: usize) -> usize {
    fn f(x: u64, y: u64, c: u64) -> u128 {
        let sum: u128 = (0..y).map(|k| beta(c, k)).sum();
        let lead = match (x + y).checked_sub(1) {
            Some(exp) => beta(c + 1, exp),
            None => 0,
        };
        lead - sum
    }
    let wd = costs.wd();
    let rd = costs.rd();

    let mut x = 0u64;
    while (rd as u128) >= beta(cm + 1, x) {
        x += 1;
    }
    let mut y = 0u64;
    while wd as u128 > (1..=y).map(|j| f(j, x, cm)).sum() {
        y += 1;
    }
    let mx = f(y, x, cm) as usize;
    let x2 = x + 1;
    let mut y2 = 0u64;
    while wd as u128 > (1..=y2).map(|j| f(j, x2, cm)).sum() {
        y2 += 1;
    }
    let mxalt = f(y2, x2, cm) as usize;

    let mmax = mx.max(mxalt).max(opt0_hint_mmax);
    let opt0 = Opt0Table::build(mmax, cm as usize, costs);
    let opt1d = Opt1dTable::build(mmax, cm as usize, costs, &opt0, true);
    if rel_cost_x(mx, opt1d.get(mx - 1), wd, rd) < rel_cost_x(mxalt, opt1d.get(mxalt - 1), wd, rd) {
        mx
    } else {
        mxalt
    }
}

/// Closed-form period for the `one_read_disk` case: minimizes the
/// asymptotic execution time directly, with no table search at all.
pub fn mxrr_close_formula(cm: u64, uf: f64, rd: f64, wd: f64) -> usize {
    let mut t = 0u64;
    while beta(cm + 1, t) as f64 <= (wd + rd) / uf {
        t += 1;
    }
    beta(cm, t) as usize
}

/// Build the periodic-disk-revolve operation sequence for an `l`-step AC
/// graph, with period `mx` (typically [`mxrr_close_formula`] or
/// [`compute_mx`]).
pub fn periodic_disk_revolve(
    l: usize,
    cm: usize,
    costs: &Costs,
    opt0: &Opt0Table,
    opt1d: Option<&Opt1dTable>,
    mx: usize,
    one_read_disk: bool,
) -> Result<Vec<Operation>, ScheduleError> {
    if mx == 0 {
        return Err(ScheduleError::invalid_argument("period must be positive"));
    }
    let mut ops = Vec::new();
    let mut current = 0usize;
    while l - current > mx {
        ops.push(Operation::WriteDisk(current));
        ops.push(Operation::Forward {
            n0: current,
            n1: current + mx,
        });
        current += mx;
    }

    let tail_len = l - current;
    let use_revolve = one_read_disk
        || opt1d
            .map(|table| table.get(tail_len) == opt0.get(cm, tail_len))
            .unwrap_or(true);
    if use_revolve {
        let mut tail = revolve(tail_len, cm, costs, opt0)?;
        shift_all(&mut tail, current);
        ops.extend(tail);
    } else {
        ops.push(Operation::WriteDisk(current));
        let mut tail = revolve_1d(tail_len, cm, costs, opt0, opt1d.unwrap(), one_read_disk)?;
        shift_all(&mut tail, current);
        ops.extend(tail);
    }

    while current > 0 {
        current -= mx;
        ops.push(Operation::ReadDisk(current));
        let mut tail = if one_read_disk {
            revolve(mx - 1, cm, costs, opt0)?
        } else {
            revolve_1d(mx - 1, cm, costs, opt0, opt1d.unwrap(), one_read_disk)?
        };
        shift_all(&mut tail, current);
        ops.extend(tail);
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mxrr_formula_is_at_least_one() {
        let mx = mxrr_close_formula(3, 1.0, 1.0, 1.0);
        assert!(mx >= 1);
    }

    #[test]
    fn periodic_schedule_covers_every_step_with_writes() {
        let costs = Costs::unit();
        let mx = mxrr_close_formula(2, costs.uf(), costs.rd(), costs.wd());
        let mmax = mx + 5;
        let opt0 = Opt0Table::build(mmax, 2, &costs);
        let ops = periodic_disk_revolve(10, 2, &costs, &opt0, None, mx, true).unwrap();
        assert!(ops.iter().any(|op| matches!(op, Operation::WriteDisk(0))));
    }
}
