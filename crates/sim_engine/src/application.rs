//! Simulation trait and lifecycle management

use crate::config::ConfigError;
use crate::context::SimulationContext;
use crate::physics::RegistrationError;
use thiserror::Error;

/// Simulation lifecycle trait
///
/// Implement this trait to drive your game or tool with the engine. The
/// scheduler calls the hooks in a fixed shape per driven frame: one
/// `on_frame` with the measured elapsed time, zero or more
/// `on_physics_step` calls each with the fixed step, then one `draw`.
/// Input polling, audio and similar subsystems are external collaborators
/// that the implementor advances from the hooks.
pub trait Simulation {
    /// Initialize the simulation
    ///
    /// Called once before the first frame. All collision pair-test
    /// registration belongs here; registrations are immutable once the
    /// loop is running.
    ///
    /// # Errors
    /// Returning an error aborts startup.
    fn setup(&mut self, ctx: &mut SimulationContext) -> Result<(), SimError>;

    /// Variable-rate update, called once per driven frame
    ///
    /// `delta_seconds` is the real elapsed time since the previous frame.
    /// Draw commands issued here land in the frame-phase queue.
    ///
    /// # Errors
    /// Returning an error stops the loop.
    fn on_frame(&mut self, ctx: &mut SimulationContext, delta_seconds: f32)
        -> Result<(), SimError>;

    /// Fixed-rate update, called zero or more times per driven frame
    ///
    /// `fixed_delta_seconds` is always the configured physics step. This
    /// is where simulation state advances and where
    /// [`CollisionWorld::step`](crate::physics::CollisionWorld::step) is
    /// expected to run. Draw commands issued here land in the
    /// update-phase queue.
    ///
    /// # Errors
    /// Returning an error stops the loop.
    fn on_physics_step(
        &mut self,
        ctx: &mut SimulationContext,
        fixed_delta_seconds: f32,
    ) -> Result<(), SimError>;

    /// Consume the routed draw queues, once per driven frame after all
    /// physics substeps
    ///
    /// The default implementation draws nothing; a real renderer is an
    /// external collaborator reading
    /// [`frame_commands`](crate::render::DrawQueueRouter::frame_commands)
    /// and
    /// [`update_commands`](crate::render::DrawQueueRouter::update_commands).
    ///
    /// # Errors
    /// Returning an error stops the loop.
    fn draw(&mut self, ctx: &mut SimulationContext) -> Result<(), SimError> {
        let _ = ctx;
        Ok(())
    }

    /// Shut the simulation down
    ///
    /// Called once after the loop stops, whether by request or by a hook
    /// error.
    fn teardown(&mut self, ctx: &mut SimulationContext) {
        let _ = ctx;
    }
}

/// Simulation-level errors
#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration error propagated from the config layer
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Collision registration rejected during setup
    #[error("Collision registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Custom simulation error
    #[error("Simulation error: {0}")]
    Custom(String),
}
