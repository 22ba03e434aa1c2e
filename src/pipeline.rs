//! Per-frame simulation pipeline.
//!
//! A frame is an ordered list of stages. Every stage reads the `current`
//! buffer and writes the `next` one, then the roles are swapped. The
//! [`FramePlan`] turns that declaration into concrete steps, resolving roles
//! to physical slots and inserting a [`Step::Barrier`] wherever a step would
//! touch a slot another step has used since the last barrier. The result
//! for a frame with a push impulse is:
//!
//! ```text
//! Run(Impulse) Swap Barrier Run(Density) Swap Barrier Run(Force) Swap Barrier
//! ```
//!
//! Plans are executed against a [`ComputeBackend`]. There is no locking:
//! one writer and one reader per slot is guaranteed by the plan alone.

use std::fmt;

use crate::camera::Camera;
use crate::config::SimulationConfig;
use crate::error::DispatchError;
use crate::particles::{Particle, Role, Slot};
use crate::sph::{self, StageParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Host-side push away from the camera.
    Impulse,
    /// Density estimate per particle.
    Density,
    /// Pressure force, gravity, integration and box containment.
    Force,
}

impl Stage {
    /// Stages with a device kernel.
    pub const DEVICE_STAGES: [Stage; 2] = [Stage::Density, Stage::Force];

    /// Buffer roles the stage touches.
    pub fn access(self) -> StageAccess {
        StageAccess {
            reads: Role::Current,
            writes: Role::Next,
        }
    }

    /// Runs on the host through readback/writeback rather than a dispatch.
    pub fn is_host(self) -> bool {
        matches!(self, Stage::Impulse)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Impulse => "impulse",
            Stage::Density => "density",
            Stage::Force => "force",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAccess {
    pub reads: Role,
    pub writes: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Run { stage: Stage, reads: Slot, writes: Slot },
    Swap,
    Barrier,
}

/// Concrete step list for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    steps: Vec<Step>,
}

/// Which slots have been read or written since the last barrier.
#[derive(Default)]
struct Hazards {
    read: [bool; 2],
    written: [bool; 2],
}

impl Hazards {
    fn conflicts(&self, reads: Slot, writes: Slot) -> bool {
        self.written[reads.index()] || self.written[writes.index()] || self.read[writes.index()]
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl FramePlan {
    /// Plan for a normal frame, optionally starting with the push impulse.
    pub fn for_frame(impulse: bool, current_slot: Slot) -> Self {
        let stages = impulse
            .then_some(Stage::Impulse)
            .into_iter()
            .chain(Stage::DEVICE_STAGES);
        Self::plan(stages, current_slot)
    }

    /// Plans an arbitrary stage sequence starting with `current_slot` as
    /// `current`. The frame always ends with a barrier once anything was
    /// written, since the renderer reads `current` next.
    pub fn plan(stages: impl IntoIterator<Item = Stage>, current_slot: Slot) -> Self {
        let mut steps = Vec::new();
        let mut hazards = Hazards::default();
        let mut current = current_slot;

        for stage in stages {
            let access = stage.access();
            let reads = access.reads.resolve(current);
            let writes = access.writes.resolve(current);

            if hazards.conflicts(reads, writes) {
                steps.push(Step::Barrier);
                hazards.clear();
            }
            steps.push(Step::Run { stage, reads, writes });
            hazards.read[reads.index()] = true;
            hazards.written[writes.index()] = true;

            steps.push(Step::Swap);
            current = current.other();
        }

        if hazards.written.iter().any(|w| *w) {
            steps.push(Step::Barrier);
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.steps.iter().filter_map(|step| match step {
            Step::Run { stage, .. } => Some(*stage),
            _ => None,
        })
    }

    pub fn swap_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, Step::Swap)).count()
    }
}

/// Execution seam between the pipeline and where particle data lives.
///
/// A backend owns the two particle buffers and the role bit. `dispatch`
/// runs a device stage reading `current` and writing `next`; it must not
/// swap. `barrier` returns once every previously issued write is visible.
pub trait ComputeBackend {
    fn capacity(&self) -> usize;
    fn current_slot(&self) -> Slot;
    fn swap_count(&self) -> u64;
    fn swap(&mut self);
    fn dispatch(&mut self, stage: Stage, params: &StageParams) -> Result<(), DispatchError>;
    fn barrier(&mut self);
    /// Copies the whole `current` buffer to the host.
    fn readback(&mut self) -> Result<Vec<Particle>, DispatchError>;
    /// Overwrites the whole `next` buffer from the host.
    fn writeback(&mut self, particles: &[Particle]) -> Result<(), DispatchError>;
}

/// Live state owned by the application and handed to every frame.
#[derive(Debug, Clone, Default)]
pub struct SimulationContext {
    pub config: SimulationConfig,
    pub camera: Camera,
}

impl SimulationContext {
    pub fn new(config: SimulationConfig, camera: Camera) -> Self {
        Self { config, camera }
    }
}

/// Outcome of one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Stages that ran to completion and were swapped in.
    pub completed: Vec<Stage>,
    pub swaps: u32,
    pub barriers: u32,
    /// The failure that abandoned the frame, if any.
    pub error: Option<DispatchError>,
}

impl FrameReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Drives frames on a backend.
pub struct Pipeline<B: ComputeBackend> {
    backend: B,
    frames: u64,
}

impl<B: ComputeBackend> Pipeline<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, frames: 0 }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Plans and runs one frame. Failures are logged once and reported; the
    /// failing stage is never swapped in, so `current` always holds the
    /// output of the last stage that completed.
    pub fn step_frame(&mut self, ctx: &SimulationContext, impulse: bool) -> FrameReport {
        let plan = FramePlan::for_frame(impulse, self.backend.current_slot());
        let report = self.execute(&plan, ctx);
        self.frames += 1;
        if let Some(err) = &report.error {
            log::error!("frame {} abandoned: {}", self.frames, err);
        }
        report
    }

    /// Runs a prepared plan. Stops at the first failing step.
    pub fn execute(&mut self, plan: &FramePlan, ctx: &SimulationContext) -> FrameReport {
        let mut report = FrameReport::default();
        let mut pending: Option<Stage> = None;

        for step in plan.steps() {
            match *step {
                Step::Run { stage, reads, writes } => {
                    debug_assert_eq!(reads, self.backend.current_slot());
                    debug_assert_ne!(reads, writes);
                    let params = StageParams::from_config(&ctx.config, self.backend.capacity());
                    log::debug!("{} stage: {:?} -> {:?}", stage, reads, writes);
                    if let Err(err) = self.run_stage(stage, &params, ctx) {
                        report.error = Some(err);
                        return report;
                    }
                    pending = Some(stage);
                }
                Step::Swap => {
                    self.backend.swap();
                    report.swaps += 1;
                    if let Some(stage) = pending.take() {
                        report.completed.push(stage);
                    }
                }
                Step::Barrier => {
                    self.backend.barrier();
                    report.barriers += 1;
                }
            }
        }
        report
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        params: &StageParams,
        ctx: &SimulationContext,
    ) -> Result<(), DispatchError> {
        if stage.is_host() {
            let mut particles = self.backend.readback()?;
            sph::apply_impulse(&mut particles, ctx.camera.position);
            self.backend.writeback(&particles)
        } else {
            self.backend.dispatch(stage, params)
        }
    }
}
