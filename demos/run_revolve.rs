//! This example shows how to drive the Revolve family of schedules to
//! completion, printing each action as it is produced.
use checkpoint_schedules::{
    config::Costs,
    schedule::CheckpointSchedule,
    schedules::{DiskRevolve, HRevolve, Revolve},
};

fn main() {
    revolve_small_run();
    disk_revolve_small_run();
    hrevolve_small_run();
}

/// Ten forward steps, three in-memory snapshots, unit costs.
pub fn revolve_small_run() {
    let mut schedule = Revolve::new(10, 3, Costs::unit()).unwrap();
    println!("Revolve(max_n=10, snap_ram=3):");
    drain(&mut schedule);
}

/// Ten forward steps, two in-memory snapshots, an unbounded disk tier.
pub fn disk_revolve_small_run() {
    let mut schedule = DiskRevolve::new(10, 2, Costs::unit(), true).unwrap();
    println!("DiskRevolve(max_n=10, snap_ram=2, one_read_disk=true):");
    drain(&mut schedule);
}

/// Ten forward steps, two RAM snapshots, two disk snapshots.
pub fn hrevolve_small_run() {
    let mut schedule = HRevolve::new(10, 2, 2, Costs::unit()).unwrap();
    println!("HRevolve(max_n=10, snap_ram=2, snap_disk=2):");
    drain(&mut schedule);
}

fn drain(schedule: &mut dyn CheckpointSchedule) {
    while !schedule.is_exhausted() {
        match schedule.next() {
            Ok(action) => println!("  {action}"),
            Err(err) => {
                println!("  error: {err}");
                break;
            }
        }
    }
}
