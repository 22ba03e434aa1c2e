//! End-to-end runs of the frame pipeline on the CPU backend.

use fluidbox::{
    Camera, ComputeBackend, CpuBackend, Particle, Pipeline, SimulationConfig, SimulationContext,
    Slot, Vec3,
};

fn unit_spaced_square() -> Vec<Particle> {
    [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
    ]
    .into_iter()
    .map(|p| Particle::new(p, Vec3::ZERO))
    .collect()
}

#[test]
fn test_four_particles_stay_finite() {
    let config = SimulationConfig {
        mass: 1.0,
        smoothing_radius: 4.0,
        target_density: 0.0,
        ..Default::default()
    };
    let ctx = SimulationContext::new(config, Camera::default());
    let mut pipeline = Pipeline::new(CpuBackend::new(unit_spaced_square()));

    for _ in 0..100 {
        assert!(pipeline.step_frame(&ctx, false).is_complete());
    }

    let half = config.bounding_box_size[0] / 2.0;
    for p in pipeline.backend().current() {
        assert!(p.position().is_finite(), "{:?}", p);
        assert!(p.velocity().is_finite(), "{:?}", p);
        assert!(p.density > 0.0, "{:?}", p);
        assert!(p.position.iter().all(|c| c.abs() <= half + 1e-5));
    }
    assert_eq!(pipeline.backend().swap_count(), 200);
    assert_eq!(pipeline.backend().current_slot(), Slot::A);
}

#[test]
fn test_runs_are_deterministic() {
    let run = || {
        let ctx = SimulationContext::default();
        let mut pipeline = Pipeline::new(CpuBackend::new(fluidbox::spawn_particles(128, 9, 4.0)));
        for _ in 0..20 {
            pipeline.step_frame(&ctx, false);
        }
        pipeline.backend().current().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_particles_settle_under_gravity() {
    let config = SimulationConfig {
        bounding_box_size: [4.0, 4.0, 4.0],
        ..Default::default()
    };
    let ctx = SimulationContext::new(config, Camera::default());
    let mut pipeline = Pipeline::new(CpuBackend::new(vec![Particle::new(Vec3::ZERO, Vec3::ZERO)]));
    for _ in 0..600 {
        pipeline.step_frame(&ctx, false);
    }
    let p = pipeline.backend().current()[0];
    assert!((p.position[1] + 2.0).abs() < 0.05, "{:?}", p);
}

#[test]
fn test_impulse_pushes_away_from_camera() {
    let config = SimulationConfig {
        smoothing_radius: 0.5,
        gravity: 0.0,
        ..Default::default()
    };
    let ctx = SimulationContext::new(config, Camera::new(Vec3::ZERO));
    let particles = vec![
        Particle::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO),
        Particle::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::ZERO),
    ];
    let mut pipeline = Pipeline::new(CpuBackend::new(particles));

    let report = pipeline.step_frame(&ctx, true);
    assert!(report.is_complete());
    assert_eq!(report.swaps, 3);

    let current = pipeline.backend().current();
    assert!((current[0].velocity[0] - 1.0).abs() < 1e-5);
    assert!((current[1].velocity[0] + 1.0).abs() < 1e-5);
    assert!(current[0].position[0] > 3.0);
    assert!(current[1].position[0] < -3.0);
}

#[test]
fn test_shrinking_box_pulls_particles_in() {
    let mut ctx = SimulationContext::default();
    let mut pipeline = Pipeline::new(CpuBackend::new(fluidbox::spawn_particles(64, 4, 4.0)));
    pipeline.step_frame(&ctx, false);

    ctx.config.bounding_box_size = [2.0, 2.0, 2.0];
    pipeline.step_frame(&ctx, false);
    for p in pipeline.backend().current() {
        assert!(p.position.iter().all(|c| c.abs() <= 1.0 + 1e-5));
    }
}
