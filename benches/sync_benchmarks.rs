use beatsync::sync::clock::{self, Bpm, DriftLevel};
use beatsync::{FlashController, FlashPattern};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Benchmark the clock math the worker runs on every tick
fn bench_clock_math(c: &mut Criterion) {
    c.bench_function("first_beat_delay", |b| {
        b.iter(|| black_box(clock::first_beat_delay(black_box(12.345), black_box(0.5))));
    });

    c.bench_function("drift_check", |b| {
        b.iter(|| {
            let drift = clock::drift_seconds(black_box(128), black_box(0.5), black_box(64.031));
            black_box(DriftLevel::classify(drift))
        });
    });

    c.bench_function("bpm_interval", |b| {
        let bpm = Bpm::new(137).unwrap();
        b.iter(|| black_box(bpm.interval_seconds()));
    });
}

/// Benchmark frame computation per pattern (runs once per beat on the UI side)
fn bench_flash_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("flash_frame");

    for pattern in FlashPattern::ALL {
        let mut controller = FlashController::new();
        controller.set_pattern(pattern);
        controller.start();
        let event = controller.on_beat_trigger().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", pattern)),
            &event,
            |b, event| {
                b.iter(|| black_box(event.frame()));
            },
        );
    }
    group.finish();
}

/// Benchmark a full measure advance through the state machine
fn bench_flash_controller(c: &mut Criterion) {
    c.bench_function("measure_advance", |b| {
        let mut controller = FlashController::new();
        controller.set_pattern(FlashPattern::ProgressiveBar);
        controller.start();

        b.iter(|| {
            for _ in 0..4 {
                black_box(controller.on_beat_trigger());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_clock_math,
    bench_flash_frames,
    bench_flash_controller
);
criterion_main!(benches);
