//! The Revolve family of offline DP schedule builders (component C):
//! Revolve, 1D-Revolve, Disk-Revolve, and Periodic-Disk-Revolve.
//!
//! Each builder returns a flat [`crate::operation::Operation`] sequence
//! rather than the source's nested `Sequence`/`Function` tree — see
//! spec.md §9.

pub mod disk_revolve;
pub mod periodic_disk_revolve;
pub mod revolve;
pub mod revolve_1d;

pub use disk_revolve::disk_revolve;
pub use periodic_disk_revolve::periodic_disk_revolve;
pub use revolve::revolve;
pub use revolve_1d::revolve_1d;
