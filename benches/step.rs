//! Benchmarks for the CPU reference pipeline and host-side helpers.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fluidbox::{make_sphere, spawn_particles, CpuBackend, Mat4, Pipeline, SimulationContext, Vec3};

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_frame");
    group.sample_size(20);

    for count in [256usize, 1024, 5000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let ctx = SimulationContext::default();
            let mut pipeline = Pipeline::new(CpuBackend::new(spawn_particles(count, 1, 4.0)));
            b.iter(|| black_box(pipeline.step_frame(&ctx, false)))
        });
    }

    group.finish();
}

fn bench_impulse_frame(c: &mut Criterion) {
    c.bench_function("cpu_frame_with_impulse_1024", |b| {
        let ctx = SimulationContext::default();
        let mut pipeline = Pipeline::new(CpuBackend::new(spawn_particles(1024, 1, 4.0)));
        b.iter(|| black_box(pipeline.step_frame(&ctx, true)))
    });
}

fn bench_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("math");

    group.bench_function("mat4_inverse", |b| {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::axis_angle(Vec3::Y, 0.7);
        b.iter(|| black_box(black_box(m).inverse()))
    });

    group.bench_function("make_sphere_16x16", |b| {
        b.iter(|| black_box(make_sphere(0.3, 16, 16)))
    });

    group.finish();
}

criterion_group!(benches, bench_frame, bench_impulse_frame, bench_math);
criterion_main!(benches);
