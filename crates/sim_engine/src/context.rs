//! Explicit simulation context
//!
//! Everything the update hooks may touch lives in one owned object with a
//! create/drop lifecycle; there is no process-wide engine state. The
//! driver creates the context, threads it through every hook, and drops
//! it when the loop ends.

use crate::config::EngineConfig;
use crate::physics::CollisionWorld;
use crate::render::DrawQueueRouter;

/// Mutable simulation facilities handed to every
/// [`Simulation`](crate::Simulation) hook.
pub struct SimulationContext {
    collision: CollisionWorld,
    draw: DrawQueueRouter,
    config: EngineConfig,
    stop_requested: bool,
}

impl SimulationContext {
    /// Create a context from an already validated configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            collision: CollisionWorld::new(),
            draw: DrawQueueRouter::new(),
            config,
            stop_requested: false,
        }
    }

    /// Read access to the collision world
    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    /// Mutable access to the collision world
    pub fn collision_mut(&mut self) -> &mut CollisionWorld {
        &mut self.collision
    }

    /// Read access to the draw queue router
    pub fn draw_router(&self) -> &DrawQueueRouter {
        &self.draw
    }

    /// Mutable access to the draw queue router
    pub fn draw_router_mut(&mut self) -> &mut DrawQueueRouter {
        &mut self.draw
    }

    /// The configuration this context was created from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ask the driver to stop the loop before the next frame begins.
    ///
    /// Steps never cancel mid-flight; the current frame always runs to
    /// completion.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Whether a stop has been requested
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_request_latches() {
        let mut ctx = SimulationContext::new(EngineConfig::default());
        assert!(!ctx.stop_requested());
        ctx.request_stop();
        assert!(ctx.stop_requested());
    }
}
