//! # Sim Engine
//!
//! The simulation core of a small real-time game engine: a fixed-timestep
//! update/render loop paired with a generic, type-safe collision
//! dispatcher.
//!
//! ## Features
//!
//! - **Fixed-timestep scheduling**: variable-rate frames drive zero or
//!   more fixed-rate physics substeps per frame
//! - **Draw-phase routing**: frame-pass drawing collected once per
//!   rendered frame, substep drawing once per physics step
//! - **Capability-based collision dispatch**: pair tests registered per
//!   ordered concrete type pair, no central type switch
//! - **Layer filtering**: 64-bit masks pre-filter candidate pairs
//! - **Trigger persistence**: "still colliding" state kept across steps
//!
//! Windowing, input, audio and GPU work are external collaborators; the
//! core calls out to them only through the [`Simulation`] hooks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sim_engine::prelude::*;
//!
//! struct MyGame {
//!     frames: u32,
//! }
//!
//! impl Simulation for MyGame {
//!     fn setup(&mut self, _ctx: &mut SimulationContext) -> Result<(), SimError> {
//!         // Register collision pair tests here
//!         Ok(())
//!     }
//!
//!     fn on_frame(&mut self, ctx: &mut SimulationContext, _dt: f32) -> Result<(), SimError> {
//!         self.frames += 1;
//!         if self.frames > 600 {
//!             ctx.request_stop();
//!         }
//!         Ok(())
//!     }
//!
//!     fn on_physics_step(&mut self, ctx: &mut SimulationContext, _dt: f32) -> Result<(), SimError> {
//!         // Advance simulation state, then resolve collisions
//!         ctx.collision_mut().step();
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut game = MyGame { frames: 0 };
//!     Engine::run(config, &mut game)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scheduler;

mod application;
mod context;
mod engine;

pub use application::{SimError, Simulation};
pub use context::SimulationContext;
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig, WindowConfig},
        foundation::{
            math::{Vec2, Vec4},
            time::Timer,
        },
        physics::{
            BodyKey, Collidable, CollisionDispatcher, CollisionWorld, ContactInfo, LayerMask,
            RegistrationError,
        },
        render::{DrawCommand, DrawPhase, DrawQueueRouter},
        scheduler::{FixedStepScheduler, FrameStats, SchedulerState},
        Engine, EngineError, SimError, Simulation, SimulationContext,
    };
}
