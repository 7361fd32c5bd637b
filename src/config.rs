//! Cost parameters driving schedule construction: one forward-step cost,
//! one reverse-step cost, and per-storage-tier read/write costs.

use std::fmt::Display;
use std::sync::LazyLock;

use crate::toml::CostsToml;

/// Read config once, on first use.
pub static COSTS_TOML: LazyLock<CostsToml> = LazyLock::new(CostsToml::read_toml);

/// Cost parameters for the DP cost tables and the H-Revolve family.
///
/// `rd_levels`/`wd_levels` give the per-level read/write cost for the
/// hierarchical (H-Revolve) tables; for the flat Revolve/Disk-Revolve
/// tables only `rd`/`wd` (the single disk level) are used.
#[derive(Debug, Clone)]
pub struct Costs {
    /// Cost of one forward step.
    uf: f64,
    /// Cost of one reverse step.
    ub: f64,
    /// Cost of reading one checkpoint from disk.
    rd: f64,
    /// Cost of writing one checkpoint to disk.
    wd: f64,
    /// Read cost for each storage level beyond level 0 (RAM), used by
    /// H-Revolve; `rd_levels[0]` corresponds to the disk level (`rd`).
    rd_levels: Vec<f64>,
    /// Write cost for each storage level beyond level 0 (RAM).
    wd_levels: Vec<f64>,
}

impl Costs {
    /// Builder to initialize required values.
    pub fn builder() -> CostsBuilder {
        CostsBuilder::new()
    }

    /// Unit costs: one forward step, one reverse step, one disk
    /// read, one disk write all cost `1.0`. Convenient for tests and for
    /// schedules that only need relative cost ratios.
    pub fn unit() -> Self {
        Self {
            uf: 1.0,
            ub: 1.0,
            rd: 1.0,
            wd: 1.0,
            rd_levels: vec![1.0],
            wd_levels: vec![1.0],
        }
    }

    pub fn uf(&self) -> f64 {
        self.uf
    }

    pub fn ub(&self) -> f64 {
        self.ub
    }

    pub fn rd(&self) -> f64 {
        self.rd
    }

    pub fn wd(&self) -> f64 {
        self.wd
    }

    pub fn rd_levels(&self) -> &[f64] {
        &self.rd_levels
    }

    pub fn wd_levels(&self) -> &[f64] {
        &self.wd_levels
    }

    /// Number of disk-and-beyond levels this cost set describes (excludes
    /// the implicit RAM level 0).
    pub fn num_levels(&self) -> usize {
        self.rd_levels.len()
    }
}

impl Default for Costs {
    fn default() -> Self {
        Self::unit()
    }
}

impl Display for Costs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "uf={}, ub={}, rd={}, wd={}, levels={}",
            self.uf,
            self.ub,
            self.rd,
            self.wd,
            self.rd_levels.len()
        )
    }
}

#[derive(Default)]
pub struct CostsBuilder {
    uf: Option<f64>,
    ub: Option<f64>,
    rd: Option<f64>,
    wd: Option<f64>,
    rd_levels: Option<Vec<f64>>,
    wd_levels: Option<Vec<f64>>,
}

impl CostsBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn uf(mut self, value: f64) -> Self {
        self.uf = Some(value);
        self
    }

    pub fn ub(mut self, value: f64) -> Self {
        self.ub = Some(value);
        self
    }

    pub fn rd(mut self, value: f64) -> Self {
        self.rd = Some(value);
        self
    }

    pub fn wd(mut self, value: f64) -> Self {
        self.wd = Some(value);
        self
    }

    pub fn rd_levels(mut self, values: Vec<f64>) -> Self {
        self.rd_levels = Some(values);
        self
    }

    pub fn wd_levels(mut self, values: Vec<f64>) -> Self {
        self.wd_levels = Some(values);
        self
    }

    pub fn build(self) -> Costs {
        let unit = Costs::unit();
        let rd = self.rd.unwrap_or(unit.rd);
        let wd = self.wd.unwrap_or(unit.wd);
        Costs {
            uf: self.uf.unwrap_or(unit.uf),
            ub: self.ub.unwrap_or(unit.ub),
            rd,
            wd,
            rd_levels: self.rd_levels.unwrap_or_else(|| vec![rd]),
            wd_levels: self.wd_levels.unwrap_or_else(|| vec![wd]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_costs_are_all_one() {
        let costs = Costs::unit();
        assert_eq!(costs.uf(), 1.0);
        assert_eq!(costs.rd_levels(), &[1.0]);
    }

    #[test]
    fn builder_falls_back_to_unit_defaults() {
        let costs = Costs::builder().uf(2.0).build();
        assert_eq!(costs.uf(), 2.0);
        assert_eq!(costs.ub(), 1.0);
    }

    #[test]
    fn builder_derives_single_level_vectors_from_rd_wd() {
        let costs = Costs::builder().rd(3.0).wd(4.0).build();
        assert_eq!(costs.rd_levels(), &[3.0]);
        assert_eq!(costs.wd_levels(), &[4.0]);
    }
}
