#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

use checkpoint_schedules::{
    action::StorageTier,
    config::Costs,
    cost_tables::Opt0Table,
    mixed::MixedCheckpointSchedule,
    multistage::{MultiStageCheckpointSchedule, Trajectory},
    schedule::CheckpointSchedule,
    schedules::{DiskRevolve, HRevolve, PeriodicDiskRevolve, Revolve},
};

const WARM_UP_TIME_MS: u64 = 500;
const MEASUREMENT_TIME_MS: u64 = 2000;
const SNAP_RAM: usize = 10;
const SNAP_DISK: usize = 10;

criterion_group!(
    benches,
    benchmark_opt0_table,
    benchmark_revolve_family,
    benchmark_mixed,
    benchmark_multistage,
);
criterion_main!(benches);

fn benchmark_opt0_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench Opt0 Table Construction");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.sample_size(10);

    for max_n in config_bench() {
        group.bench_function(format!("Opt0Table::build max_n={max_n}"), |b| {
            b.iter(|| bench_opt0_table(max_n))
        });
    }

    group.finish();
}

fn benchmark_revolve_family(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench Revolve Family Generation");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.measurement_time(Duration::from_millis(MEASUREMENT_TIME_MS));
    group.sample_size(10);

    for max_n in config_bench() {
        group.bench_function(format!("Revolve max_n={max_n}"), |b| {
            b.iter(|| bench_revolve(max_n))
        });
        group.bench_function(format!("DiskRevolve max_n={max_n}"), |b| {
            b.iter(|| bench_disk_revolve(max_n))
        });
        group.bench_function(format!("PeriodicDiskRevolve max_n={max_n}"), |b| {
            b.iter(|| bench_periodic_disk_revolve(max_n))
        });
        group.bench_function(format!("HRevolve max_n={max_n}"), |b| {
            b.iter(|| bench_hrevolve(max_n))
        });
    }

    group.finish();
}

fn benchmark_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench Mixed Generation");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.sample_size(10);

    for max_n in config_bench() {
        group.bench_function(format!("Mixed max_n={max_n}"), |b| {
            b.iter(|| bench_mixed(max_n))
        });
    }

    group.finish();
}

fn benchmark_multistage(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bench MultiStage Generation");

    group.warm_up_time(Duration::from_millis(WARM_UP_TIME_MS));
    group.sample_size(10);

    for max_n in config_bench() {
        group.bench_function(format!("MultiStage max_n={max_n}"), |b| {
            b.iter(|| bench_multistage(max_n))
        });
    }

    group.finish();
}

fn bench_opt0_table(max_n: usize) {
    let costs = Costs::unit();
    let _table = Opt0Table::build(max_n - 1, SNAP_RAM, &costs);
}

fn bench_revolve(max_n: usize) {
    let mut schedule = Revolve::new(max_n, SNAP_RAM, Costs::unit()).unwrap();
    drain(&mut schedule);
}

fn bench_disk_revolve(max_n: usize) {
    let mut schedule = DiskRevolve::new(max_n, SNAP_RAM, Costs::unit(), true).unwrap();
    drain(&mut schedule);
}

fn bench_periodic_disk_revolve(max_n: usize) {
    let mut schedule =
        PeriodicDiskRevolve::new(max_n, SNAP_RAM, Costs::unit(), true, true, None).unwrap();
    drain(&mut schedule);
}

fn bench_hrevolve(max_n: usize) {
    let mut schedule = HRevolve::new(max_n, SNAP_RAM, SNAP_DISK, Costs::unit()).unwrap();
    drain(&mut schedule);
}

fn bench_mixed(max_n: usize) {
    let snapshots = SNAP_DISK.min(max_n.saturating_sub(1)).max(1);
    let mut schedule = MixedCheckpointSchedule::new(max_n, snapshots, StorageTier::Disk).unwrap();
    drain(&mut schedule);
}

fn bench_multistage(max_n: usize) {
    let mut schedule =
        MultiStageCheckpointSchedule::new(max_n, SNAP_RAM, SNAP_DISK, Trajectory::Maximum)
            .unwrap();
    drain(&mut schedule);
}

fn drain(schedule: &mut dyn CheckpointSchedule) {
    while !schedule.is_exhausted() {
        schedule.next().unwrap();
    }
}

fn config_bench() -> Vec<usize> {
    vec![50, 200, 800]
}
