//! Particle records and the double-buffered particle store.
//!
//! The store owns two equally sized buffers. One plays the role of
//! `current` (the last complete state, read by every stage and the
//! renderer), the other `next` (written by the running stage). Roles are
//! exchanged by flipping a single bit; storage is never moved or copied.

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::Vec3;

/// One fluid particle, laid out to match the WGSL `Particle` struct
/// (32 bytes, no implicit padding).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 3],
    /// Derived each frame by the density stage.
    pub density: f32,
    pub velocity: [f32; 3],
    pub _pad: f32,
}

impl Particle {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32];

    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position: position.to_array(),
            density: 0.0,
            velocity: velocity.to_array(),
            _pad: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from(self.velocity)
    }

    /// Per-instance layout: position at offset 0, density right after it.
    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Particle>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Seeds `count` particles uniformly in `[0, extent)^3` with zero velocity.
pub fn spawn_particles(count: usize, seed: u64, extent: f32) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.gen::<f32>() * extent,
                rng.gen::<f32>() * extent,
                rng.gen::<f32>() * extent,
            );
            Particle::new(position, Vec3::ZERO)
        })
        .collect()
}

/// Physical buffer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Logical role of a buffer within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Current,
    Next,
}

impl Role {
    /// Physical slot holding this role when `current` lives in `current_slot`.
    pub fn resolve(self, current_slot: Slot) -> Slot {
        match self {
            Role::Current => current_slot,
            Role::Next => current_slot.other(),
        }
    }
}

/// A pair of buffers plus the one-bit role index.
///
/// `B` is whatever holds the particle data: a `Vec<Particle>` on the host,
/// a `wgpu::Buffer` on the device.
#[derive(Debug)]
pub struct ParticleStore<B> {
    buffers: [B; 2],
    current: Slot,
    capacity: usize,
    swaps: u64,
}

impl<B> ParticleStore<B> {
    /// Wraps two buffers of `capacity` particles each. Slot A starts as
    /// `current`.
    pub fn from_buffers(a: B, b: B, capacity: usize) -> Self {
        Self {
            buffers: [a, b],
            current: Slot::A,
            capacity,
            swaps: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_slot(&self) -> Slot {
        self.current
    }

    pub fn role_of(&self, slot: Slot) -> Role {
        if slot == self.current {
            Role::Current
        } else {
            Role::Next
        }
    }

    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Exchanges the roles of the two buffers.
    pub fn swap(&mut self) {
        self.current = self.current.other();
        self.swaps += 1;
    }

    pub fn slot(&self, slot: Slot) -> &B {
        &self.buffers[slot.index()]
    }

    pub fn current(&self) -> &B {
        self.slot(self.current)
    }

    pub fn next(&self) -> &B {
        self.slot(self.current.other())
    }

    pub fn next_mut(&mut self) -> &mut B {
        &mut self.buffers[self.current.other().index()]
    }

    /// `current` for reading and `next` for writing at the same time.
    pub fn split_mut(&mut self) -> (&B, &mut B) {
        let [a, b] = &mut self.buffers;
        match self.current {
            Slot::A => (&*a, b),
            Slot::B => (&*b, a),
        }
    }
}

impl ParticleStore<Vec<Particle>> {
    /// Both buffers start with the same contents.
    pub fn mirrored(particles: Vec<Particle>) -> Self {
        let capacity = particles.len();
        Self::from_buffers(particles.clone(), particles, capacity)
    }

    /// Seeded random initial state, see [`spawn_particles`].
    pub fn initialize(count: usize, seed: u64, extent: f32) -> Self {
        Self::mirrored(spawn_particles(count, seed, extent))
    }
}
