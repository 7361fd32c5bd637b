//! The internal, pre-translation operation representation built by the
//! revolve-family DP recursions (components C and D) and consumed by the
//! translator (component E).
//!
//! This is a closed, typed replacement for the source's string-tagged
//! `Operation` class (`official_names`): every schedule-builder function in
//! [`crate::revolve`] and [`crate::hrevolve`] returns a flat `Vec<Operation>`
//! rather than a tree of nested `Sequence`/`Function` objects, so there is no
//! translation-time tree-walk — see spec.md §9 "Replacing coroutines".

/// One step in a built schedule, before translation into the public
/// [`crate::action::Action`] algebra.
///
/// `level` on the hierarchical variants (`Write`/`Read`/`Discard`) is `0` for
/// the first disk-and-beyond storage level and increases outward; RAM is
/// handled by the dedicated `*Memory` variants and is never given a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Advance the forward solver from step `n0` to step `n1`.
    Forward { n0: usize, n1: usize },
    /// Advance the adjoint from step `n1` to step `n0`.
    Backward { n1: usize, n0: usize },
    WriteMemory(usize),
    ReadMemory(usize),
    DiscardMemory(usize),
    /// Save restart data for a step about to be re-run forward, held in a
    /// transient restart slot rather than a numbered checkpoint tier.
    WriteForwardMemory(usize),
    DiscardForwardMemory(usize),
    WriteDisk(usize),
    ReadDisk(usize),
    DiscardDisk(usize),
    /// Hierarchical write/read/discard at storage level `level` (H-Revolve).
    Write { level: usize, n: usize },
    Read { level: usize, n: usize },
    Discard { level: usize, n: usize },
}

impl Operation {
    /// Shift every step index referenced by this operation by `size`.
    pub fn shifted(self, size: usize) -> Operation {
        match self {
            Operation::Forward { n0, n1 } => Operation::Forward {
                n0: n0 + size,
                n1: n1 + size,
            },
            Operation::Backward { n1, n0 } => Operation::Backward {
                n1: n1 + size,
                n0: n0 + size,
            },
            Operation::WriteMemory(n) => Operation::WriteMemory(n + size),
            Operation::ReadMemory(n) => Operation::ReadMemory(n + size),
            Operation::DiscardMemory(n) => Operation::DiscardMemory(n + size),
            Operation::WriteForwardMemory(n) => Operation::WriteForwardMemory(n + size),
            Operation::DiscardForwardMemory(n) => Operation::DiscardForwardMemory(n + size),
            Operation::WriteDisk(n) => Operation::WriteDisk(n + size),
            Operation::ReadDisk(n) => Operation::ReadDisk(n + size),
            Operation::DiscardDisk(n) => Operation::DiscardDisk(n + size),
            Operation::Write { level, n } => Operation::Write {
                level,
                n: n + size,
            },
            Operation::Read { level, n } => Operation::Read {
                level,
                n: n + size,
            },
            Operation::Discard { level, n } => Operation::Discard {
                level,
                n: n + size,
            },
        }
    }
}

/// Shift every operation in `ops` by `size`; the flat-`Vec` equivalent of
/// `Sequence::shift`.
pub fn shift_all(ops: &mut [Operation], size: usize) {
    for op in ops.iter_mut() {
        *op = op.shifted(size);
    }
}

/// Drop a leading `WriteMemory`, if present; the flat-`Vec` equivalent of
/// `Sequence::remove_useless_wm` for the RAM-only (Revolve/1D-Revolve) case.
pub fn remove_useless_wm(mut ops: Vec<Operation>) -> Vec<Operation> {
    if matches!(ops.first(), Some(Operation::WriteMemory(_))) {
        ops.remove(0);
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_both_forward_endpoints() {
        let op = Operation::Forward { n0: 2, n1: 5 };
        assert_eq!(op.shifted(3), Operation::Forward { n0: 5, n1: 8 });
    }

    #[test]
    fn remove_useless_wm_drops_only_a_leading_write() {
        let ops = vec![Operation::WriteMemory(0), Operation::Forward { n0: 0, n1: 1 }];
        let trimmed = remove_useless_wm(ops);
        assert_eq!(trimmed, vec![Operation::Forward { n0: 0, n1: 1 }]);

        let ops = vec![Operation::Forward { n0: 0, n1: 1 }, Operation::WriteMemory(1)];
        let trimmed = remove_useless_wm(ops.clone());
        assert_eq!(trimmed, ops);
    }
}
