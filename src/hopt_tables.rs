//! The H-Revolve hierarchical cost tables: `opt[k][l][m]` and
//! `optp[k][l][m]` for a `K`-level storage hierarchy.
//!
//! Grounded on `hrevolve_sequences/hrevolve.py::get_hopt_table` (Herrmann &
//! Pallez, "H-Revolve", ACM TOMS 2020). This crate only ever builds a
//! `K = 2` hierarchy (RAM, disk), but the table itself is `K`-generic, as
//! in the source.

/// `opt[k][l][m]`: optimal makespan of an `l`-step AC graph using `m`
/// slots at level `k` and unrestricted use of levels `0..k`.
/// `optp[k][l][m]`: the same, with step `0` additionally guaranteed to be
/// resident at level `k` on entry.
#[derive(Debug, Clone)]
pub struct HierarchicalTables {
    opt: Vec<Vec<Vec<f64>>>,
    optp: Vec<Vec<Vec<f64>>>,
    cvect: Vec<usize>,
}

impl HierarchicalTables {
    pub fn build(lmax: usize, cvect: &[usize], wvect: &[f64], rvect: &[f64], uf: f64, ub: f64) -> Self {
        let k_levels = cvect.len();
        assert_eq!(wvect.len(), k_levels);
        assert_eq!(rvect.len(), k_levels);

        let mut opt: Vec<Vec<Vec<f64>>> = (0..k_levels)
            .map(|k| vec![vec![f64::INFINITY; cvect[k] + 1]; lmax + 1])
            .collect();
        let mut optp = opt.clone();

        for k in 0..k_levels {
            let mmax = cvect[k];
            for m in 0..=mmax {
                opt[k][0][m] = ub;
                optp[k][0][m] = ub;
            }
            if lmax >= 1 {
                for m in 0..=mmax {
                    if m == 0 && k == 0 {
                        continue;
                    }
                    optp[k][1][m] = uf + 2.0 * ub + rvect[0];
                    opt[k][1][m] = wvect[0] + optp[k][1][m];
                }
            }
        }

        let mmax0 = cvect[0];
        for l in 2..=lmax {
            optp[0][l][1] = (l as f64 + 1.0) * ub + (l * (l + 1)) as f64 / 2.0 * uf + l as f64 * rvect[0];
            opt[0][l][1] = wvect[0] + optp[0][l][1];
        }
        for m in 2..=mmax0 {
            for l in 2..=lmax {
                let mut best = optp[0][l][1];
                for j in 1..l {
                    let value = j as f64 * uf + opt[0][l - j][m - 1] + rvect[0] + optp[0][j - 1][m];
                    if value < best {
                        best = value;
                    }
                }
                optp[0][l][m] = best;
                opt[0][l][m] = wvect[0] + best;
            }
        }

        for k in 1..k_levels {
            let mmax = cvect[k];
            for l in 2..=lmax {
                opt[k][l][0] = opt[k - 1][l][cvect[k - 1]];
            }
            for m in 1..=mmax {
                for l in 1..=lmax {
                    let mut best = opt[k - 1][l][cvect[k - 1]];
                    for j in 1..l {
                        let value = j as f64 * uf + opt[k][l - j][m - 1] + rvect[k] + optp[k][j - 1][m];
                        if value < best {
                            best = value;
                        }
                    }
                    optp[k][l][m] = best;
                    opt[k][l][m] = opt[k - 1][l][cvect[k - 1]].min(wvect[k] + best);
                }
            }
        }

        HierarchicalTables { opt, optp, cvect: cvect.to_vec() }
    }

    pub fn opt(&self, k: usize, l: usize, m: usize) -> f64 {
        self.opt[k][l][m]
    }

    pub fn optp(&self, k: usize, l: usize, m: usize) -> f64 {
        self.optp[k][l][m]
    }

    pub fn capacity(&self, k: usize) -> usize {
        self.cvect[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_matches_opt0_base_cases() {
        let tables = HierarchicalTables::build(3, &[2], &[1.0], &[1.0], 1.0, 1.0);
        assert_eq!(tables.opt(0, 0, 0), 1.0);
        assert_eq!(tables.opt(0, 0, 1), 1.0);
    }

    #[test]
    fn two_level_disk_opt_uses_ram_row_as_floor() {
        let tables = HierarchicalTables::build(5, &[2, 3], &[1.0, 2.0], &[1.0, 3.0], 1.0, 1.0);
        for l in 2..=5 {
            assert!(tables.opt(1, l, 0) == tables.opt(0, l, 2));
        }
    }
}
