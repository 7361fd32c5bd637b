//! The 1D-Revolve schedule: one in-memory pool plus a single disk slot,
//! with step 0 already resident on disk.
//!
//! Grounded on `hrevolve_sequences/revolve_1d.py::revolve_1d`. A subroutine
//! of Disk-Revolve.

use crate::combinatorics::last_argmin;
use crate::config::Costs;
use crate::cost_tables::{Opt0Table, Opt1dTable};
use crate::error::ScheduleError;
use crate::operation::{shift_all, Operation};
use crate::revolve::revolve::revolve;

#[allow(clippy::too_many_arguments)]
pub fn revolve_1d(
    l: usize,
    cm: usize,
    costs: &Costs,
    opt0: &Opt0Table,
    opt1d: &Opt1dTable,
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
    let list_mem: Vec<f64> = (1..l)
        .map(|j| {
            let tail = if one_read_disk {
                opt0.get(cm, j - 1)
            } else {
                opt1d.get(j - 1)
            };
            j as f64 * uf + opt0.get(cm, l - j) + rd + tail
        })
        .collect();
    let best = list_mem.iter().cloned().fold(f64::INFINITY, f64::min);

    if best < opt0.get(cm, l) {
        let jmin = last_argmin(&list_mem);
        let mut ops = vec![Operation::Forward { n0: 0, n1: jmin }];
        let mut tail = revolve(l - jmin, cm, costs, opt0)?;
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
        let ops = revolve_1d(0, 1, &costs, &opt0, &opt1d, true).unwrap();
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn l_one_cm_zero_reads_from_disk() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(1, 0, &costs);
        let opt1d = Opt1dTable::build(1, 0, &costs, &opt0, true);
        let ops = revolve_1d(1, 0, &costs, &opt0, &opt1d, true).unwrap();
        assert!(ops.contains(&Operation::ReadDisk(0)));
    }
}
