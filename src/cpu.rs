//! Host compute backend.
//!
//! Runs the same per-particle units as the GPU kernels, spread over the
//! rayon thread pool. Each stage returns only after every unit finished,
//! so the rayon join already is the barrier.

use crate::error::DispatchError;
use crate::particles::{Particle, ParticleStore, Slot};
use crate::pipeline::{ComputeBackend, Stage};
use crate::sph::{self, StageParams};

pub struct CpuBackend {
    store: ParticleStore<Vec<Particle>>,
}

impl CpuBackend {
    /// Both buffers start as copies of `particles`.
    pub fn new(particles: Vec<Particle>) -> Self {
        Self::from_store(ParticleStore::mirrored(particles))
    }

    pub fn from_store(store: ParticleStore<Vec<Particle>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ParticleStore<Vec<Particle>> {
        &self.store
    }

    /// The last complete particle state.
    pub fn current(&self) -> &[Particle] {
        self.store.current()
    }
}

impl ComputeBackend for CpuBackend {
    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    fn current_slot(&self) -> Slot {
        self.store.current_slot()
    }

    fn swap_count(&self) -> u64 {
        self.store.swap_count()
    }

    fn swap(&mut self) {
        self.store.swap();
    }

    fn dispatch(&mut self, stage: Stage, params: &StageParams) -> Result<(), DispatchError> {
        let (current, next) = self.store.split_mut();
        match stage {
            Stage::Density => sph::run_density(current, next, params),
            Stage::Force => sph::run_force(current, next, params),
            Stage::Impulse => return Err(DispatchError::HostStage(stage)),
        }
        Ok(())
    }

    fn barrier(&mut self) {}

    fn readback(&mut self) -> Result<Vec<Particle>, DispatchError> {
        Ok(self.store.current().clone())
    }

    fn writeback(&mut self, particles: &[Particle]) -> Result<(), DispatchError> {
        if particles.len() != self.store.capacity() {
            return Err(DispatchError::CapacityMismatch {
                expected: self.store.capacity(),
                actual: particles.len(),
            });
        }
        self.store.next_mut().copy_from_slice(particles);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_writeback_targets_next() {
        let mut backend = CpuBackend::new(vec![Particle::default(); 3]);
        let mut data = backend.readback().unwrap();
        data[1].velocity = [1.0, 2.0, 3.0];
        backend.writeback(&data).unwrap();
        assert_eq!(backend.current()[1].velocity, [0.0; 3]);
        backend.swap();
        assert_eq!(backend.current()[1].velocity, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_writeback_rejects_wrong_length() {
        let mut backend = CpuBackend::new(vec![Particle::default(); 3]);
        let err = backend.writeback(&[Particle::default()]).unwrap_err();
        assert!(matches!(err, DispatchError::CapacityMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_impulse_is_not_dispatchable() {
        let mut backend = CpuBackend::new(vec![Particle::default(); 2]);
        let params = StageParams::from_config(&SimulationConfig::default(), 2);
        assert!(matches!(
            backend.dispatch(Stage::Impulse, &params),
            Err(DispatchError::HostStage(Stage::Impulse))
        ));
        assert_eq!(backend.swap_count(), 0);
    }
}
