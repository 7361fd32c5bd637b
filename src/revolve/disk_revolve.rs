//! The Disk-Revolve schedule: unboundedly many disk slots on top of an
//! in-memory pool, each disk checkpoint read at most once.
//!
//! Grounded on `hrevolve_sequences/disk_revolve.py::disk_revolve`.

use crate::combinatorics::last_argmin;
use crate::config::Costs;
use crate::cost_tables::{Opt0Table, Opt1dTable, OptInfTable};
use crate::error::ScheduleError;
use crate::operation::{shift_all, Operation};
use crate::revolve::revolve::revolve;
use crate::revolve::revolve_1d::revolve_1d;

#[allow(clippy::too_many_arguments)]
pub fn disk_revolve(
    l: usize,
    cm: usize,
    costs: &Costs,
    opt0: &Opt0Table,
    opt1d: &Opt1dTable,
    opt_inf: &OptInfTable,
    one_read_disk: bool,
) -> Result<Vec<Operation>, ScheduleError> {
    if l == 0 {
        return Ok(vec![
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
        ]);
    }
    if l == 1 {
        if cm == 0 {
            return Ok(vec![
                Operation::WriteDisk(0),
                Operation::Forward { n0: 0, n1: 1 },
                Operation::WriteForwardMemory(2),
                Operation::Forward { n0: 1, n1: 2 },
                Operation::Backward { n1: 2, n0: 1 },
                Operation::DiscardForwardMemory(2),
                Operation::ReadDisk(0),
                Operation::WriteForwardMemory(1),
                Operation::Forward { n0: 0, n1: 1 },
                Operation::Backward { n1: 1, n0: 0 },
                Operation::DiscardForwardMemory(1),
                Operation::DiscardDisk(0),
            ]);
        }
        return Ok(vec![
            Operation::WriteMemory(0),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::WriteForwardMemory(2),
            Operation::Forward { n0: 1, n1: 2 },
            Operation::Backward { n1: 2, n0: 1 },
            Operation::DiscardForwardMemory(2),
            Operation::ReadMemory(0),
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
            Operation::DiscardMemory(0),
        ]);
    }

    let uf = costs.uf();
    let rd = costs.rd();
    let wd = costs.wd();
    let list_mem: Vec<f64> = (1..l)
        .map(|j| {
            let tail = if one_read_disk {
                opt0.get(cm, j - 1)
            } else {
                opt1d.get(j - 1)
            };
            wd + j as f64 * uf + opt_inf.get(l - j) + rd + tail
        })
        .collect();
    let best = list_mem.iter().cloned().fold(f64::INFINITY, f64::min);

    if best < opt0.get(cm, l) {
        let jmin = last_argmin(&list_mem);
        let mut ops = vec![Operation::WriteDisk(0), Operation::Forward { n0: 0, n1: jmin }];
        let mut tail = disk_revolve(l - jmin, cm, costs, opt0, opt1d, opt_inf, one_read_disk)?;
        shift_all(&mut tail, jmin);
        ops.extend(tail);
        ops.push(Operation::ReadDisk(0));
        if one_read_disk {
            ops.extend(revolve(jmin - 1, cm, costs, opt0)?);
        } else {
            ops.extend(revolve_1d(jmin - 1, cm, costs, opt0, opt1d, one_read_disk)?);
        }
        Ok(ops)
    } else {
        revolve(l, cm, costs, opt0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l_zero_is_a_fixed_four_step_sequence() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(0, 1, &costs);
        let opt1d = Opt1dTable::build(0, 1, &costs, &opt0, true);
        let opt_inf = OptInfTable::build(0, 1, &costs, &opt0, None, true);
        let ops = disk_revolve(0, 1, &costs, &opt0, &opt1d, &opt_inf, true).unwrap();
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn l_one_cm_zero_uses_disk_for_both_ends() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(1, 0, &costs);
        let opt1d = Opt1dTable::build(1, 0, &costs, &opt0, true);
        let opt_inf = OptInfTable::build(1, 0, &costs, &opt0, None, true);
        let ops = disk_revolve(1, 0, &costs, &opt0, &opt1d, &opt_inf, true).unwrap();
        assert_eq!(ops[0], Operation::WriteDisk(0));
        assert_eq!(*ops.last().unwrap(), Operation::DiscardDisk(0));
    }
}
