//! This example drives the remaining schedule families (MultiStage,
//! Two-Level, Mixed, and the trivial baselines) to completion or through a
//! few reverse-pass cycles, printing each action as it is produced.
use checkpoint_schedules::{
    action::StorageTier,
    multistage::{MultiStageCheckpointSchedule, Trajectory},
    mixed::MixedCheckpointSchedule,
    schedule::CheckpointSchedule,
    trivial::{NoneCheckpointSchedule, SingleDiskCheckpointSchedule, SingleMemoryCheckpointSchedule},
    two_level::TwoLevelCheckpointSchedule,
};

fn main() {
    multistage_small_run();
    two_level_small_run();
    mixed_small_run();
    trivial_schedules_small_run();
}

/// Twelve forward steps, a two/two RAM/disk snapshot split.
pub fn multistage_small_run() {
    let mut schedule =
        MultiStageCheckpointSchedule::new(12, 2, 2, Trajectory::Maximum).unwrap();
    println!("MultiStage(max_n=12, snapshots_in_ram=2, snapshots_on_disk=2):");
    while !schedule.is_exhausted() {
        println!("  {}", schedule.next().unwrap());
    }
}

/// A period-4 disk checkpoint with a one-snapshot binomial fill, run through
/// two reverse-pass cycles.
pub fn two_level_small_run() {
    let mut schedule =
        TwoLevelCheckpointSchedule::new(4, 1, StorageTier::Ram, Trajectory::Maximum).unwrap();
    println!("TwoLevel(period=4, binomial_snapshots=1, binomial_storage=Ram):");
    let mut n = 0;
    loop {
        let action = schedule.next().unwrap();
        println!("  {action}");
        n += 4;
        if matches!(action, checkpoint_schedules::Action::EndForward) {
            break;
        }
        if n >= 16 {
            schedule.finalize(16).unwrap();
        }
    }
    let mut end_reverse_count = 0;
    while end_reverse_count < 2 {
        let action = schedule.next().unwrap();
        println!("  {action}");
        if matches!(action, checkpoint_schedules::Action::EndReverse) {
            end_reverse_count += 1;
        }
    }
}

/// Twelve forward steps, four disk snapshots.
pub fn mixed_small_run() {
    let mut schedule = MixedCheckpointSchedule::new(12, 4, StorageTier::Disk).unwrap();
    println!("Mixed(max_n=12, snapshots=4, storage=Disk):");
    while !schedule.is_exhausted() {
        println!("  {}", schedule.next().unwrap());
    }
}

/// The three fixed-discipline baselines: all-memory, all-disk, and no
/// adjoint calculation at all.
pub fn trivial_schedules_small_run() {
    println!("SingleMemory:");
    let mut schedule = SingleMemoryCheckpointSchedule::new();
    // One sentinel `Forward` action covers the whole forward sweep; the
    // driver runs its real forward solver to step 5 before finalizing.
    println!("  {}", schedule.next().unwrap());
    schedule.finalize(5).unwrap();
    for _ in 0..4 {
        println!("  {}", schedule.next().unwrap());
    }

    println!("SingleDisk (move_data=false):");
    let mut schedule = SingleDiskCheckpointSchedule::new(false);
    for _ in 0..5 {
        println!("  {}", schedule.next().unwrap());
    }
    schedule.finalize(5).unwrap();
    for _ in 0..12 {
        println!("  {}", schedule.next().unwrap());
    }

    println!("None:");
    let mut schedule = NoneCheckpointSchedule::new();
    println!("  {}", schedule.next().unwrap());
    schedule.finalize(5).unwrap();
    println!("  {}", schedule.next().unwrap());
}
