//! The action algebra (component A): the closed set of instructions a
//! schedule hands to its driver, and the storage tiers they reference.

use std::fmt::Display;

/// Closed set of storage tiers a checkpoint (or transient solver state) may
/// live in.
///
/// `Ram` and `Disk` are persistent checkpoint tiers with capacity limits.
/// `FwdRestart` / `AdjDeps` / `Work` denote transient live state used by the
/// solvers; `None` means "do not store".
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum StorageTier {
    Ram,
    Disk,
    FwdRestart,
    AdjDeps,
    Work,
    #[default]
    None,
}

impl Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageTier::Ram => write!(f, "RAM"),
            StorageTier::Disk => write!(f, "DISK"),
            StorageTier::FwdRestart => write!(f, "FWD_RESTART"),
            StorageTier::AdjDeps => write!(f, "ADJ_DEPS"),
            StorageTier::Work => write!(f, "WORK"),
            StorageTier::None => write!(f, "NONE"),
        }
    }
}

/// Which execution kind a Mixed-schedule unit covers. Unused outside
/// [`crate::mixed`].
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum StepKind {
    #[default]
    None,
    Forward,
    ForwardReverse,
    WriteIcs,
    WriteData,
    ReadIcs,
    ReadData,
}

/// One instruction in the action stream a schedule yields to its driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Advance the forward solver from step `n0` to step `n1` (`n0 < n1`).
    /// If `write_ics`, save restart data for step `n0` into `storage`. If
    /// `write_adj_deps`, save adjoint-dependency data for step `n1 - 1` into
    /// `storage`.
    Forward {
        n0: usize,
        n1: usize,
        write_ics: bool,
        write_adj_deps: bool,
        storage: StorageTier,
    },
    /// Advance the adjoint from step `n1` to step `n0` (`n0 < n1`). If
    /// `clear_adj_deps`, the driver may discard its adjoint-dependency cache
    /// afterwards.
    Reverse {
        n1: usize,
        n0: usize,
        clear_adj_deps: bool,
    },
    /// Copy the checkpoint for step `n`; the source remains valid.
    Copy {
        n: usize,
        from: StorageTier,
        to: StorageTier,
    },
    /// Move the checkpoint for step `n`; the source becomes invalid.
    Move {
        n: usize,
        from: StorageTier,
        to: StorageTier,
    },
    /// Emitted exactly once: separates the forward phase from the reverse
    /// phase.
    EndForward,
    /// Emitted at the terminal state of a reverse pass.
    EndReverse,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Forward {
                n0,
                n1,
                write_ics,
                write_adj_deps,
                storage,
            } => write!(
                f,
                "Forward({n0} -> {n1}, write_ics={write_ics}, write_adj_deps={write_adj_deps}, storage={storage})"
            ),
            Action::Reverse {
                n1,
                n0,
                clear_adj_deps,
            } => write!(f, "Reverse({n1} -> {n0}, clear_adj_deps={clear_adj_deps})"),
            Action::Copy { n, from, to } => write!(f, "Copy({n}, {from} -> {to})"),
            Action::Move { n, from, to } => write!(f, "Move({n}, {from} -> {to})"),
            Action::EndForward => write!(f, "EndForward"),
            Action::EndReverse => write!(f, "EndReverse"),
        }
    }
}

/// Whether `action` writes to, reads from, or otherwise references `tier`.
/// Used by `uses_storage` implementations that derive their answer from an
/// already-built action stream rather than from construction parameters.
pub fn references_tier(action: &Action, tier: StorageTier) -> bool {
    match *action {
        Action::Forward { storage, .. } => storage == tier,
        Action::Copy { from, to, .. } | Action::Move { from, to, .. } => {
            from == tier || to == tier
        }
        Action::Reverse { .. } | Action::EndForward | Action::EndReverse => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_tier_display() {
        assert_eq!(StorageTier::Ram.to_string(), "RAM");
        assert_eq!(StorageTier::FwdRestart.to_string(), "FWD_RESTART");
    }

    #[test]
    fn references_tier_matches_forward_storage() {
        let action = Action::Forward {
            n0: 0,
            n1: 1,
            write_ics: true,
            write_adj_deps: false,
            storage: StorageTier::Disk,
        };
        assert!(references_tier(&action, StorageTier::Disk));
        assert!(!references_tier(&action, StorageTier::Ram));
    }

    #[test]
    fn references_tier_ignores_reverse_and_markers() {
        let reverse = Action::Reverse {
            n1: 4,
            n0: 3,
            clear_adj_deps: true,
        };
        assert!(!references_tier(&reverse, StorageTier::Ram));
        assert!(!references_tier(&Action::EndForward, StorageTier::Work));
    }

    #[test]
    fn forward_display_shows_fields() {
        let action = Action::Forward {
            n0: 3,
            n1: 7,
            write_ics: true,
            write_adj_deps: false,
            storage: StorageTier::Ram,
        };
        assert_eq!(
            action.to_string(),
            "Forward(3 -> 7, write_ics=true, write_adj_deps=false, storage=RAM)"
        );
    }
}
