//! Smoothed-particle-hydrodynamics kernels.
//!
//! These are the host versions of the per-particle units the WGSL compute
//! shaders in `gpu/shaders/` run. Both sides implement the same formulas:
//!
//! - density: poly6 kernel `315 / (64 pi h^9) (h^2 - r^2)^3`, self term included
//! - pressure: `(density - target_density) * pressure_multiplier`
//! - pressure acceleration: spiky gradient `-45 / (pi h^6) (h - r)^2 r_hat`,
//!   symmetrized as `-sum m (p_i + p_j) / (2 rho_j) grad W`
//! - gravity along -Y, semi-implicit Euler, then box containment
//!
//! The CPU backend calls [`density_unit`] and [`force_unit`] from a rayon
//! parallel iterator; each unit reads only the shared `current` slice.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::math::Vec3;
use crate::particles::Particle;

/// Pairs closer than this exert no force on each other.
pub const MIN_PAIR_DISTANCE: f32 = 1e-6;
/// Densities are floored at this before dividing.
pub const DENSITY_EPSILON: f32 = 1e-6;
/// Fraction of velocity kept when bouncing off a wall.
pub const RESTITUTION: f32 = 0.5;
/// Scale of the camera push impulse.
pub const IMPULSE_STRENGTH: f32 = 3.0;

/// Uniform block shared by both compute stages (binding 2).
///
/// Matches the WGSL `StageParams` struct; 48 bytes with `bounding_box_size`
/// on a 16-byte boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StageParams {
    pub mass: f32,
    pub smoothing_radius: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    pub bounding_box_size: [f32; 3],
    pub gravity: f32,
    pub time_step: f32,
    pub particle_count: u32,
    pub _pad: [u32; 2],
}

impl StageParams {
    /// Snapshot of the live config taken at the start of a stage.
    pub fn from_config(config: &SimulationConfig, particle_count: usize) -> Self {
        Self {
            mass: config.mass,
            smoothing_radius: config.smoothing_radius,
            target_density: config.target_density,
            pressure_multiplier: config.pressure_multiplier,
            bounding_box_size: config.bounding_box_size,
            gravity: config.gravity,
            time_step: config.time_step,
            particle_count: particle_count as u32,
            _pad: [0; 2],
        }
    }
}

/// Poly6 smoothing kernel evaluated at squared distance `r2`.
pub fn poly6(r2: f32, h: f32) -> f32 {
    let h2 = h * h;
    if r2 >= h2 {
        return 0.0;
    }
    let coeff = 315.0 / (64.0 * PI * h.powi(9));
    let diff = h2 - r2;
    coeff * diff * diff * diff
}

/// Gradient of the spiky kernel for offset `r = x_i - x_j`.
///
/// Points from `x_i` towards `x_j` (the kernel falls off with distance).
pub fn spiky_gradient(r: Vec3, h: f32) -> Vec3 {
    let dist = r.length();
    if dist >= h || dist < MIN_PAIR_DISTANCE {
        return Vec3::ZERO;
    }
    let coeff = -45.0 / (PI * h.powi(6));
    let falloff = h - dist;
    r / dist * (coeff * falloff * falloff)
}

pub fn pressure(density: f32, params: &StageParams) -> f32 {
    (density - params.target_density) * params.pressure_multiplier
}

/// Density at particle `i`, summed over every particle including itself.
pub fn density_at(i: usize, current: &[Particle], params: &StageParams) -> f32 {
    let pos = current[i].position();
    let h = params.smoothing_radius;
    current
        .iter()
        .map(|other| params.mass * poly6((pos - other.position()).length_squared(), h))
        .sum()
}

/// Density stage unit: copies particle `i` and fills in its density.
pub fn density_unit(i: usize, current: &[Particle], params: &StageParams) -> Particle {
    Particle {
        density: density_at(i, current, params),
        ..current[i]
    }
}

/// Pressure acceleration on particle `i`.
pub fn pressure_acceleration(i: usize, current: &[Particle], params: &StageParams) -> Vec3 {
    let me = &current[i];
    let pos = me.position();
    let p_i = pressure(me.density.max(DENSITY_EPSILON), params);
    let h = params.smoothing_radius;

    let mut accel = Vec3::ZERO;
    for (j, other) in current.iter().enumerate() {
        if j == i {
            continue;
        }
        let grad = spiky_gradient(pos - other.position(), h);
        if grad == Vec3::ZERO {
            continue;
        }
        let rho_j = other.density.max(DENSITY_EPSILON);
        let p_j = pressure(rho_j, params);
        accel -= grad * (params.mass * (p_i + p_j) / (2.0 * rho_j));
    }
    accel
}

/// Clamps `position` into the box centered on the origin and reflects the
/// velocity on every axis that was outside.
pub fn contain(position: &mut Vec3, velocity: &mut Vec3, box_size: [f32; 3]) {
    let pos = [&mut position.x, &mut position.y, &mut position.z];
    let vel = [&mut velocity.x, &mut velocity.y, &mut velocity.z];
    for ((p, v), size) in pos.into_iter().zip(vel).zip(box_size) {
        let half = size / 2.0;
        if *p > half {
            *p = half;
            *v = -v.abs() * RESTITUTION;
        } else if *p < -half {
            *p = -half;
            *v = v.abs() * RESTITUTION;
        }
    }
}

/// Force stage unit: pressure + gravity, integrate, contain.
pub fn force_unit(i: usize, current: &[Particle], params: &StageParams) -> Particle {
    let me = current[i];
    let mut accel = pressure_acceleration(i, current, params);
    accel.y -= params.gravity;

    let mut velocity = me.velocity() + accel * params.time_step;
    let mut position = me.position() + velocity * params.time_step;
    contain(&mut position, &mut velocity, params.bounding_box_size);

    Particle {
        position: position.to_array(),
        velocity: velocity.to_array(),
        ..me
    }
}

/// Pushes every particle away from `origin`, falling off with squared
/// distance. Particles exactly at `origin` are left alone.
pub fn apply_impulse(particles: &mut [Particle], origin: Vec3) {
    particles.par_iter_mut().for_each(|p| {
        let d = p.position() - origin;
        let dist2 = d.length_squared();
        if dist2 > 0.0 {
            p.velocity = (p.velocity() + d / dist2 * IMPULSE_STRENGTH).to_array();
        }
    });
}

/// Runs the density stage over all particles.
pub fn run_density(current: &[Particle], next: &mut [Particle], params: &StageParams) {
    next.par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = density_unit(i, current, params));
}

/// Runs the force/integration stage over all particles.
pub fn run_force(current: &[Particle], next: &mut [Particle], params: &StageParams) {
    next.par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = force_unit(i, current, params));
}
