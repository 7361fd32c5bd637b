//! Dynamic-programming cost tables underlying Revolve, 1D-Revolve, and
//! Disk-Revolve (component B).
//!
//! Grounded on
//! `hrevolve_sequences/revolve.py::get_opt_0_table`,
//! `hrevolve_sequences/revolve_1d.py::get_opt_1d_table`, and
//! `hrevolve_sequences/disk_revolve.py::get_opt_inf_table`.

use crate::config::Costs;

/// `opt0[m][l]`: optimal makespan of an `l`-step AC graph using `m`
/// in-memory checkpoint slots and no disk.
#[derive(Debug, Clone)]
pub struct Opt0Table {
    /// `table[m][l]`.
    table: Vec<Vec<f64>>,
}

impl Opt0Table {
    /// Build the table for `l = 0..=lmax`, `m = 0..=mmax`.
    pub fn build(lmax: usize, mmax: usize, costs: &Costs) -> Self {
        let uf = costs.uf();
        let ub = costs.ub();
        let mut table: Vec<Vec<f64>> = (0..=mmax).map(|_| Vec::with_capacity(lmax + 1)).collect();

        for row in table.iter_mut() {
            row.push(ub);
        }
        for row in table.iter_mut().skip(1) {
            if lmax >= 1 {
                row.push(uf + 2.0 * ub);
            }
        }
        for l in 2..=lmax {
            table[1].push((l as f64 + 1.0) * ub + (l * (l + 1)) as f64 / 2.0 * uf);
        }
        for m in 2..=mmax {
            for l in 2..=lmax {
                let value = (1..l)
                    .map(|j| {
                        j as f64 * uf + table[m - 1][l - j] + table[m][j - 1]
                    })
                    .fold(f64::INFINITY, f64::min);
                table[m].push(value);
            }
        }
        Opt0Table { table }
    }

    pub fn get(&self, m: usize, l: usize) -> f64 {
        self.table[m][l]
    }
}

/// `opt1d[l]`: optimal makespan of an `l`-step AC graph using `cm`
/// in-memory slots and a single disk slot, where step `0` is already on
/// disk.
#[derive(Debug, Clone)]
pub struct Opt1dTable {
    table: Vec<f64>,
}

impl Opt1dTable {
    pub fn build(lmax: usize, cm: usize, costs: &Costs, opt0: &Opt0Table, one_read_disk: bool) -> Self {
        let uf = costs.uf();
        let ub = costs.ub();
        let rd = costs.rd();
        let mut table = Vec::with_capacity(lmax + 1);
        table.push(ub);
        if lmax >= 1 {
            if cm == 0 {
                table.push(uf + 2.0 * ub + rd);
            } else {
                table.push(uf + 2.0 * ub);
            }
        }
        for l in 2..=lmax {
            let m = (1..l)
                .map(|j| {
                    let tail = if one_read_disk {
                        opt0.get(cm, j - 1)
                    } else {
                        table[j - 1]
                    };
                    j as f64 * uf + opt0.get(cm, l - j) + rd + tail
                })
                .fold(f64::INFINITY, f64::min);
            table.push(opt0.get(cm, l).min(m));
        }
        Opt1dTable { table }
    }

    pub fn get(&self, l: usize) -> f64 {
        self.table[l]
    }
}

/// `optInf[l]`: optimal makespan of an `l`-step AC graph using `cm`
/// in-memory slots and unboundedly many disk slots.
#[derive(Debug, Clone)]
pub struct OptInfTable {
    table: Vec<f64>,
}

impl OptInfTable {
    pub fn build(
        lmax: usize,
        cm: usize,
        costs: &Costs,
        opt0: &Opt0Table,
        opt1d: Option<&Opt1dTable>,
        one_read_disk: bool,
    ) -> Self {
        let uf = costs.uf();
        let ub = costs.ub();
        let rd = costs.rd();
        let wd = costs.wd();
        let mut table = Vec::with_capacity(lmax + 1);
        table.push(ub);
        if lmax >= 1 {
            if cm == 0 {
                table.push(wd + uf + 2.0 * ub + rd);
            } else {
                table.push(uf + 2.0 * ub);
            }
        }
        for l in 2..=lmax {
            let min_aux = (1..l)
                .map(|j| {
                    let tail = if one_read_disk {
                        opt0.get(cm, j - 1)
                    } else {
                        opt1d.expect("opt1d required when one_read_disk is false").get(j - 1)
                    };
                    wd + j as f64 * uf + table[l - j] + rd + tail
                })
                .fold(f64::INFINITY, f64::min);
            table.push(opt0.get(cm, l).min(min_aux));
        }
        OptInfTable { table }
    }

    pub fn get(&self, l: usize) -> f64 {
        self.table[l]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt0_base_cases_match_closed_form() {
        let costs = Costs::unit();
        let table = Opt0Table::build(3, 2, &costs);
        assert_eq!(table.get(0, 0), 1.0);
        assert_eq!(table.get(1, 0), 1.0);
        assert_eq!(table.get(1, 1), 3.0);
    }

    #[test]
    fn opt0_is_monotonic_in_l() {
        let costs = Costs::unit();
        let table = Opt0Table::build(6, 3, &costs);
        for l in 1..6 {
            assert!(table.get(3, l) <= table.get(3, l + 1));
        }
    }

    #[test]
    fn opt1d_never_exceeds_opt0() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(6, 2, &costs);
        let opt1d = Opt1dTable::build(6, 2, &costs, &opt0, true);
        for l in 0..=6 {
            assert!(opt1d.get(l) <= opt0.get(2, l) + 1e-9);
        }
    }

    #[test]
    fn opt_inf_never_exceeds_opt0() {
        let costs = Costs::unit();
        let opt0 = Opt0Table::build(6, 2, &costs);
        let opt_inf = OptInfTable::build(6, 2, &costs, &opt0, None, true);
        for l in 0..=6 {
            assert!(opt_inf.get(l) <= opt0.get(2, l) + 1e-9);
        }
    }
}
