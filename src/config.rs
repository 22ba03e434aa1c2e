//! Simulation and application configuration.
//!
//! [`SimulationConfig`] holds the live-tunable physics parameters and is
//! edited between frames by the UI and keyboard. [`AppConfig`] is read once
//! at startup, optionally from a JSON file.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MASS_RANGE: RangeInclusive<f32> = 0.1..=5.0;
pub const SMOOTHING_RADIUS_RANGE: RangeInclusive<f32> = 0.1..=2.0;
pub const TARGET_DENSITY_RANGE: RangeInclusive<f32> = 0.1..=5.0;
pub const PRESSURE_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.1..=1000.0;
pub const BOX_SIZE_RANGE: RangeInclusive<f32> = 1.0..=40.0;
pub const GRAVITY_RANGE: RangeInclusive<f32> = 0.0..=20.0;

/// Physical parameters read by the compute stages every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub mass: f32,
    pub smoothing_radius: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    /// Full extent of the box per axis, centered on the origin.
    pub bounding_box_size: [f32; 3],
    /// Downward acceleration along -Y.
    pub gravity: f32,
    /// Fixed integration step in seconds.
    pub time_step: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mass: 0.5,
            smoothing_radius: 1.2,
            target_density: 4.5,
            pressure_multiplier: 1000.0,
            bounding_box_size: [10.0, 10.0, 10.0],
            gravity: 9.81,
            time_step: 1.0 / 120.0,
        }
    }
}

fn clamp_field(name: &str, value: &mut f32, range: &RangeInclusive<f32>) -> bool {
    let clamped = if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    };
    if clamped != *value {
        log::warn!("{} = {} is outside {:?}, clamped to {}", name, value, range, clamped);
        *value = clamped;
        true
    } else {
        false
    }
}

impl SimulationConfig {
    /// Forces every parameter into the range the UI allows. Returns `true`
    /// if anything changed.
    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = false;
        changed |= clamp_field("mass", &mut self.mass, &MASS_RANGE);
        changed |= clamp_field("smoothing_radius", &mut self.smoothing_radius, &SMOOTHING_RADIUS_RANGE);
        changed |= clamp_field("target_density", &mut self.target_density, &TARGET_DENSITY_RANGE);
        changed |= clamp_field(
            "pressure_multiplier",
            &mut self.pressure_multiplier,
            &PRESSURE_MULTIPLIER_RANGE,
        );
        for (axis, size) in ["x", "y", "z"].iter().zip(self.bounding_box_size.iter_mut()) {
            changed |= clamp_field(&format!("bounding_box_size.{}", axis), size, &BOX_SIZE_RANGE);
        }
        changed |= clamp_field("gravity", &mut self.gravity, &GRAVITY_RANGE);
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            log::warn!("time_step = {} is not positive, reset to default", self.time_step);
            self.time_step = Self::default().time_step;
            changed = true;
        }
        changed
    }

    /// Grows or shrinks one box axis, staying within [`BOX_SIZE_RANGE`].
    pub fn resize_box(&mut self, axis: usize, delta: f32) {
        let size = &mut self.bounding_box_size[axis];
        *size = (*size + delta).clamp(*BOX_SIZE_RANGE.start(), *BOX_SIZE_RANGE.end());
    }
}

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub particle_count: usize,
    pub seed: u64,
    /// Particles are seeded uniformly in `[0, spawn_extent)^3`.
    pub spawn_extent: f32,
    pub sphere_radius: f32,
    pub sphere_theta_segments: u32,
    pub sphere_rho_segments: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub camera_position: [f32; 3],
    pub simulation: SimulationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            particle_count: 5000,
            seed: 0x5eed,
            spawn_extent: 4.0,
            sphere_radius: 0.3,
            sphere_theta_segments: 16,
            sphere_rho_segments: 16,
            window_width: 1280,
            window_height: 720,
            camera_position: [0.0, 2.0, -14.0],
            simulation: SimulationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads a JSON config. Missing fields take their defaults; physical
    /// parameters are clamped to their allowed ranges.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.simulation.clamp_to_ranges();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Rejects settings no simulation can start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be at least 1".into()));
        }
        if self.particle_count > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "particle_count {} does not fit a dispatch",
                self.particle_count
            )));
        }
        if self.sphere_theta_segments < 3 || self.sphere_rho_segments < 2 {
            return Err(ConfigError::Invalid(
                "sphere needs at least 3 theta and 2 rho segments".into(),
            ));
        }
        if !(self.sphere_radius > 0.0) {
            return Err(ConfigError::Invalid("sphere_radius must be positive".into()));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}
