//! H-Revolve: the optimal schedule for a `K`-level storage hierarchy
//! (restricted to `K = 2`: RAM and disk, in this crate).
//!
//! Grounded on
//! `hrevolve_sequences/hrevolve.py::{hrevolve, hrevolve_recurse, hrevolve_aux}`
//! (Herrmann & Pallez, "H-Revolve", ACM TOMS 2020).

use crate::combinatorics::last_argmin;
use crate::error::ScheduleError;
use crate::hopt_tables::HierarchicalTables;
use crate::operation::{shift_all, Operation};

/// Top-level entry point: build the H-Revolve sequence for an `l`-step AC
/// graph over the given per-level slot counts / write costs / read costs.
pub fn hrevolve(
    l: usize,
    cvect: &[usize],
    wvect: &[f64],
    rvect: &[f64],
    uf: f64,
    ub: f64,
) -> Result<Vec<Operation>, ScheduleError> {
    let tables = HierarchicalTables::build(l, cvect, wvect, rvect, uf, ub);
    hrevolve_recurse(l, cvect.len() - 1, cvect[cvect.len() - 1], cvect, wvect, rvect, uf, ub, &tables)
}

#[allow(clippy::too_many_arguments)]
pub fn hrevolve_recurse(
    l: usize,
    k: usize,
    cmem: usize,
    cvect: &[usize],
    wvect: &[f64],
    rvect: &[f64],
    uf: f64,
    ub: f64,
    tables: &HierarchicalTables,
) -> Result<Vec<Operation>, ScheduleError> {
    if l == 0 {
        return Ok(vec![
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
        ]);
    }
    if k == 0 && cmem == 0 {
        return Err(ScheduleError::invalid_argument(
            "cannot execute a multi-step AC graph with no RAM checkpoints",
        ));
    }
    if l == 1 {
        return Ok(vec![
            Operation::Write { level: 0, n: 0 },
            Operation::Forward { n0: 0, n1: 1 },
            Operation::WriteForwardMemory(2),
            Operation::Forward { n0: 1, n1: 2 },
            Operation::Backward { n1: 2, n0: 1 },
            Operation::DiscardForwardMemory(2),
            Operation::Read { level: 0, n: 0 },
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
            Operation::Discard { level: 0, n: 0 },
        ]);
    }
    if k == 0 {
        let mut ops = vec![Operation::Write { level: 0, n: 0 }];
        ops.extend(hrevolve_aux(l, 0, cmem, cvect, wvect, rvect, uf, ub, tables)?);
        return Ok(ops);
    }

    if wvect[k] + tables.optp(k, l, cmem) < tables.opt(k - 1, l, cvect[k - 1]) {
        let mut ops = vec![Operation::Write { level: k, n: 0 }];
        ops.extend(hrevolve_aux(l, k, cmem, cvect, wvect, rvect, uf, ub, tables)?);
        Ok(ops)
    } else {
        hrevolve_recurse(l, k - 1, cvect[k - 1], cvect, wvect, rvect, uf, ub, tables)
    }
}

#[allow(clippy::too_many_arguments)]
pub fn hrevolve_aux(
    l: usize,
    k: usize,
    cmem: usize,
    cvect: &[usize],
    wvect: &[f64],
    rvect: &[f64],
    uf: f64,
    ub: f64,
    tables: &HierarchicalTables,
) -> Result<Vec<Operation>, ScheduleError> {
    if cmem == 0 {
        return Err(ScheduleError::invalid_state("hrevolve_aux called with cmem = 0"));
    }
    if l == 0 {
        return Ok(vec![
            Operation::WriteForwardMemory(1),
            Operation::Forward { n0: 0, n1: 1 },
            Operation::Backward { n1: 1, n0: 0 },
            Operation::DiscardForwardMemory(1),
        ]);
    }
    if l == 1 {
        let read_from_level_zero = wvect[0] + rvect[0] < rvect[k];
        let mut ops = Vec::new();
        if read_from_level_zero {
            ops.push(Operation::Write { level: 0, n: 0 });
        }
        ops.push(Operation::Forward { n0: 0, n1: 1 });
        ops.push(Operation::WriteForwardMemory(2));
        ops.push(Operation::Forward { n0: 1, n1: 2 });
        ops.push(Operation::Backward { n1: 2, n0: 1 });
        ops.push(Operation::DiscardForwardMemory(2));
        if read_from_level_zero {
            ops.push(Operation::Read { level: 0, n: 0 });
        } else {
            ops.push(Operation::Read { level: k, n: 0 });
        }
        ops.push(Operation::WriteForwardMemory(1));
        ops.push(Operation::Forward { n0: 0, n1: 1 });
        ops.push(Operation::Backward { n1: 1, n0: 0 });
        ops.push(Operation::DiscardForwardMemory(1));
        ops.push(Operation::Discard { level: 0, n: 0 });
        return Ok(ops);
    }
    if k == 0 && cmem == 1 {
        let mut ops = Vec::new();
        for index in (0..l).rev() {
            if index != l - 1 {
                ops.push(Operation::Read { level: 0, n: 0 });
            }
            ops.push(Operation::Forward { n0: 0, n1: index + 1 });
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
        ops.push(Operation::Read { level: 0, n: 0 });
        ops.push(Operation::WriteForwardMemory(1));
        ops.push(Operation::Forward { n0: 0, n1: 1 });
        ops.push(Operation::Backward { n1: 1, n0: 0 });
        ops.push(Operation::DiscardForwardMemory(1));
        ops.push(Operation::Discard { level: 0, n: 0 });
        return Ok(ops);
    }
    if k == 0 {
        let list_mem: Vec<f64> = (1..l)
            .map(|j| {
                j as f64 * uf + tables.opt(0, l - j, cmem - 1) + rvect[0] + tables.optp(0, j - 1, cmem)
            })
            .collect();
        let best = list_mem.iter().cloned().fold(f64::INFINITY, f64::min);
        if best < tables.optp(0, l, 1) {
            let jmin = last_argmin(&list_mem);
            let mut ops = vec![Operation::Forward { n0: 0, n1: jmin }];
            let mut tail = hrevolve_recurse(l - jmin, 0, cmem - 1, cvect, wvect, rvect, uf, ub, tables)?;
            shift_all(&mut tail, jmin);
            ops.extend(tail);
            ops.push(Operation::Read { level: 0, n: 0 });
            ops.extend(hrevolve_aux(jmin - 1, 0, cmem, cvect, wvect, rvect, uf, ub, tables)?);
            if !matches!(ops.last(), Some(Operation::Discard { level: 0, n: 0 })) {
                ops.push(Operation::Discard { level: 0, n: 0 });
            }
            return Ok(ops);
        }
        return hrevolve_aux(l, 0, 1, cvect, wvect, rvect, uf, ub, tables);
    }

    let list_mem: Vec<f64> = (1..l)
        .map(|j| {
            j as f64 * uf + tables.opt(k, l - j, cmem - 1) + rvect[k] + tables.optp(k, j - 1, cmem)
        })
        .collect();
    let best = list_mem.iter().cloned().fold(f64::INFINITY, f64::min);
    if best < tables.opt(k - 1, l, cvect[k - 1]) {
        let jmin = last_argmin(&list_mem);
        let mut ops = vec![Operation::Forward { n0: 0, n1: jmin }];
        let mut tail = hrevolve_recurse(l - jmin, k, cmem - 1, cvect, wvect, rvect, uf, ub, tables)?;
        shift_all(&mut tail, jmin);
        ops.extend(tail);
        ops.push(Operation::Read { level: k, n: 0 });
        ops.extend(hrevolve_aux(jmin - 1, k, cmem, cvect, wvect, rvect, uf, ub, tables)?);
        Ok(ops)
    } else {
        hrevolve_recurse(l, k - 1, cvect[k - 1], cvect, wvect, rvect, uf, ub, tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l_zero_is_fixed() {
        let ops = hrevolve(0, &[2, 2], &[1.0, 2.0], &[1.0, 2.0], 1.0, 1.0).unwrap();
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn no_ram_on_multi_step_graph_is_an_error() {
        let ops = hrevolve(3, &[0, 2], &[1.0, 2.0], &[1.0, 2.0], 1.0, 1.0);
        assert!(ops.is_err());
    }

    #[test]
    fn two_level_schedule_builds_for_a_modest_graph() {
        let ops = hrevolve(6, &[2, 2], &[1.0, 4.0], &[1.0, 4.0], 1.0, 1.0).unwrap();
        assert!(!ops.is_empty());
    }
}
