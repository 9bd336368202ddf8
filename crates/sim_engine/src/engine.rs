//! Core engine implementation

use crate::application::{SimError, Simulation};
use crate::config::{ConfigError, EngineConfig};
use crate::context::SimulationContext;
use crate::foundation::time::Timer;
use crate::scheduler::{FixedStepScheduler, FrameStats, SchedulerState};
use thiserror::Error;

/// Main engine struct
///
/// The engine validates the configuration, owns the simulation context
/// and the fixed-step scheduler, and drives the loop: measure elapsed
/// wall-clock time, advance one frame (frame pass plus physics substeps),
/// then issue the draw hook.
pub struct Engine {
    context: SimulationContext,
    scheduler: FixedStepScheduler,
    timer: Timer,
}

impl Engine {
    /// Create a new engine instance from a validated configuration
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "initializing engine: physics step {:.5}s, window {}x{}",
            config.physics_step,
            config.window.width,
            config.window.height
        );

        let scheduler = FixedStepScheduler::new(config.physics_step);
        let context = SimulationContext::new(config);

        Ok(Self {
            context,
            scheduler,
            timer: Timer::new(),
        })
    }

    /// Run the main loop with the given simulation until it requests a
    /// stop or a hook fails
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for an invalid configuration and
    /// [`EngineError::Simulation`] when `setup` or a per-frame hook
    /// errors. Hook errors still run `teardown` before returning.
    pub fn run<S: Simulation>(config: EngineConfig, sim: &mut S) -> Result<(), EngineError> {
        let mut engine = Self::new(config)?;

        sim.setup(&mut engine.context)?;
        log::info!("starting main loop");

        let result = engine.main_loop(sim);

        sim.teardown(&mut engine.context);
        log::info!(
            "engine shutdown after {} frames ({:.1} fps average)",
            engine.timer.frame_count(),
            engine.timer.average_fps()
        );
        result
    }

    fn main_loop<S: Simulation>(&mut self, sim: &mut S) -> Result<(), EngineError> {
        while self.scheduler.state() != SchedulerState::Stopped {
            self.timer.tick();
            let stats = self
                .scheduler
                .advance(self.timer.delta_seconds(), sim, &mut self.context)?;
            log::trace!(
                "frame {}: {:.4}s, {} substep(s)",
                self.timer.frame_count(),
                stats.frame_dt,
                stats.substeps
            );

            sim.draw(&mut self.context)?;

            if self.context.stop_requested() {
                self.scheduler.stop();
            }
        }
        Ok(())
    }

    /// Drive exactly one frame with an externally measured elapsed time.
    ///
    /// Embedders that own their own outer loop (windowing callbacks,
    /// test harnesses) call this instead of [`run`](Self::run); `draw`
    /// is still issued once after the physics substeps.
    ///
    /// # Errors
    /// Returns [`EngineError::Simulation`] when a hook errors.
    pub fn drive_frame<S: Simulation>(
        &mut self,
        elapsed: f32,
        sim: &mut S,
    ) -> Result<FrameStats, EngineError> {
        let stats = self.scheduler.advance(elapsed, sim, &mut self.context)?;
        sim.draw(&mut self.context)?;
        if self.context.stop_requested() {
            self.scheduler.stop();
        }
        Ok(stats)
    }

    /// The simulation context
    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Mutable access to the simulation context
    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    /// The fixed-step scheduler
    pub fn scheduler(&self) -> &FixedStepScheduler {
        &self.scheduler
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected at startup
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error propagated from a simulation hook
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),
}
