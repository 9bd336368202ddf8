//! Fixed-timestep scheduling
//!
//! Decouples variable-rate rendering from fixed-rate simulation: each
//! driven frame runs one frame pass with the real elapsed time, then
//! drains the time accumulator in physics substeps of exactly the
//! configured step. Draw routing is switched at the phase boundaries so
//! frame-pass drawing is collected once per rendered frame and substep
//! drawing once per physics step.

use crate::application::{SimError, Simulation};
use crate::context::SimulationContext;

// A frame that drains this many substeps at once is almost certainly
// recovering from a stall; worth surfacing in the log.
const SUBSTEP_BURST_WARNING: u32 = 8;

/// Lifecycle of a scheduler instance. Stopping is final; a stopped
/// scheduler accepts no further frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed, no frame driven yet
    Created,
    /// At least one frame driven
    Running,
    /// Terminal; `advance` is a no-op
    Stopped,
}

/// Timing report for one driven frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Real elapsed time fed into this frame, in seconds
    pub frame_dt: f32,
    /// Number of physics substeps executed this frame
    pub substeps: u32,
}

/// Fixed-timestep loop driver.
///
/// Owns the time accumulator and the phase switching; the caller supplies
/// measured elapsed time per driven frame (wall clock in production,
/// synthetic values in tests).
pub struct FixedStepScheduler {
    physics_step: f32,
    accumulator: f32,
    state: SchedulerState,
}

impl FixedStepScheduler {
    /// Create a scheduler stepping simulation time in increments of
    /// `physics_step` seconds (validated by the config layer)
    pub fn new(physics_step: f32) -> Self {
        debug_assert!(physics_step > 0.0);
        Self {
            physics_step,
            accumulator: 0.0,
            state: SchedulerState::Created,
        }
    }

    /// Seconds of simulation time per physics substep
    pub fn physics_step(&self) -> f32 {
        self.physics_step
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Time currently banked toward the next substep, in seconds
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Stop the scheduler. Terminal: later `advance` calls do nothing.
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            log::info!("scheduler stopped");
            self.state = SchedulerState::Stopped;
        }
    }

    /// Drive one frame: frame pass, then zero or more physics substeps.
    ///
    /// `elapsed` is the measured real time since the previous frame. The
    /// frame pass runs first with `elapsed` as its delta, collecting its
    /// draw commands in the frame-phase queue; then the accumulator is
    /// drained in substeps of exactly [`physics_step`](Self::physics_step)
    /// seconds, each collecting into the update-phase queue. Substeps run
    /// to completion; stopping only takes effect between frames.
    ///
    /// # Errors
    /// Propagates the first hook error; the frame is abandoned at that
    /// point and the caller is expected to stop the loop.
    pub fn advance<S: Simulation + ?Sized>(
        &mut self,
        elapsed: f32,
        sim: &mut S,
        ctx: &mut SimulationContext,
    ) -> Result<FrameStats, SimError> {
        if self.state == SchedulerState::Stopped {
            log::warn!("advance called on a stopped scheduler; ignoring frame");
            return Ok(FrameStats::default());
        }
        self.state = SchedulerState::Running;

        self.accumulator += elapsed;

        // Frame pass: variable-rate logic and drawing, once per frame.
        ctx.draw_router_mut().begin_frame_pass();
        sim.on_frame(ctx, elapsed)?;

        // Physics pass: drain the accumulator in fixed steps. Each
        // substep rebuilds the update-phase queue, so the queue ends the
        // frame holding exactly one step's commands no matter how many
        // substeps ran.
        ctx.draw_router_mut().begin_physics_pass();
        let mut substeps = 0;
        while self.accumulator >= self.physics_step {
            ctx.draw_router_mut().begin_physics_step();
            sim.on_physics_step(ctx, self.physics_step)?;
            self.accumulator -= self.physics_step;
            substeps += 1;
        }
        ctx.draw_router_mut().end_physics_pass();

        if substeps >= SUBSTEP_BURST_WARNING {
            log::warn!(
                "frame drained {substeps} physics substeps ({elapsed:.4}s elapsed)"
            );
        }

        Ok(FrameStats {
            frame_dt: elapsed,
            substeps,
        })
    }
}
