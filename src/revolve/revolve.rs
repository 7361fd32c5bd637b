//! The binomial (Griewank–Walther) checkpointing schedule.
//!
//! Grounded on `hrevolve_sequences/revolve.py::revolve`.

use crate::combinatorics::last_argmin;
use crate::config::Costs;
use crate::cost_tables::Opt0Table;
use crate::error::ScheduleError;
use crate::operation::{remove_useless_wm, shift_all, Operation};

/// Build the operation sequence for an `l`-step AC graph using `cm`
/// in-memory checkpoint slots.
///
/// Returns [`ScheduleError::InvalidArgument`] if `cm == 0` and `l > 0`
/// (there is nowhere to checkpoint a multi-step graph).
pub fn revolve(l: usize, cm: usize, costs: &Costs, opt0: &Opt0Table) -> Result<Vec<Operation>, ScheduleError> {
    if l == 0 {
        return Ok(vec![
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
            Operation::DiscardMemory(0),
        ]);
    }
    if cm == 0 {
        return Err(ScheduleError::invalid_argument(
            "cannot execute a multi-step AC graph with zero memory checkpoints",
        ));
    }
    if l == 1 {
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
    if cm == 1 {
        let mut ops = vec![Operation::WriteMemory(0)];
        for index in (0..l).rev() {
            if index != l - 1 {
                ops.push(Operation::ReadMemory(0));
            }
            ops.push(Operation::Forward {
                n0: 0,
                n1: index + 1,
            });
            ops.push(Operation::WriteForwardMemory(index + 2));
            ops.push(Operation::Forward {
                n0: index + 1,
                n1: index + 2,
            });
            ops.push(Operation::Backward {
                n1: index + 2,
                n0: index + 1,
            });
            ops.push(Operation::DiscardForwardMemory(index + 2));
        }
        ops.push(Operation::ReadMemory(0));
        ops.push(Operation::WriteForwardMemory(1));
        ops.push(Operation::Forward { n0: 0, n1: 1 });
        ops.push(Operation::Backward { n1: 1, n0: 0 });
        ops.push(Operation::DiscardForwardMemory(1));
        ops.push(Operation::DiscardMemory(0));
        return Ok(ops);
    }

    let list_mem: Vec<f64> = (1..l)
        .map(|j| j as f64 * costs.uf() + opt0.get(cm - 1, l - j) + opt0.get(cm, j - 1))
        .collect();
    let jmin = last_argmin(&list_mem);

    let mut ops = vec![Operation::WriteMemory(0), Operation::Forward { n0: 0, n1: jmin }];
    let mut tail = revolve(l - jmin, cm - 1, costs, opt0)?;
    shift_all(&mut tail, jmin);
    ops.extend(tail);
    ops.push(Operation::ReadMemory(0));
    ops.extend(remove_useless_wm(revolve(jmin - 1, cm, costs, opt0)?));
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l_zero_is_a_fixed_five_step_sequence() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(0, 1, &costs);
        let ops = revolve(0, 1, &costs, &opt0).unwrap();
        assert_eq!(ops.len(), 5);
    }

    #[test]
    fn zero_memory_on_multi_step_graph_is_an_error() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(2, 0, &costs);
        assert!(revolve(2, 0, &costs, &opt0).is_err());
    }

    #[test]
    fn general_case_writes_step_zero_first() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(5, 3, &costs);
        let ops = revolve(5, 3, &costs, &opt0).unwrap();
        assert_eq!(ops[0], Operation::WriteMemory(0));
    }
}
