//! Checkpointing schedules for reverse-mode algorithmic differentiation of
//! time-stepped simulations.
//!
//! This crate owns the decision logic only: when to advance the forward
//! solver, when to write or discard a checkpoint, when to reverse, and from
//! which storage tier. It does not run a solver, serialize bytes, or touch
//! disk itself — see [`schedule::CheckpointSchedule`] for the action
//! contract a driver must implement against.
//!
//! Nine schedule kinds are provided, grouped by the component that builds
//! them:
//! - binomial, memory-only or with a bounded/unbounded disk tier:
//!   [`revolve`] (`revolve`, `revolve_1d`, `disk_revolve`,
//!   `periodic_disk_revolve`), wrapped as public schedules by
//!   [`schedules::Revolve`], [`schedules::DiskRevolve`],
//!   [`schedules::PeriodicDiskRevolve`].
//! - multilevel hierarchical: [`hrevolve`], wrapped as
//!   [`schedules::HRevolve`].
//! - online/offline two-tier RAM+disk: [`multistage::MultiStageCheckpointSchedule`],
//!   [`two_level::TwoLevelCheckpointSchedule`].
//! - either-ICs-or-adjoint-deps: [`mixed::MixedCheckpointSchedule`].
//! - trivial: [`trivial::SingleMemoryCheckpointSchedule`],
//!   [`trivial::SingleDiskCheckpointSchedule`], [`trivial::NoneCheckpointSchedule`].

pub mod action;
pub mod combinatorics;
pub mod config;
pub mod cost_tables;
pub mod error;
pub mod hopt_tables;
pub mod hrevolve;
pub mod mixed;
pub mod multistage;
pub mod operation;
pub mod revolve;
pub mod schedule;
pub mod schedules;
pub mod storage;
pub mod toml;
pub mod translator;
pub mod trivial;
pub mod two_level;

pub use action::{Action, StepKind, StorageTier};
pub use config::Costs;
pub use error::ScheduleError;
pub use schedule::CheckpointSchedule;
