//! Collision detection and response
//!
//! Broad phase is a 64-bit layer-mask filter; narrow phase is whatever
//! test each pair registration supplies. The dispatcher matches pairs by
//! runtime type, the world runs the per-step resolution sweep, and the
//! trigger tracker keeps "still colliding" state between steps.

pub mod collider;
pub mod contact;
pub mod dispatcher;
pub mod layers;
pub mod triggers;
pub mod world;

pub use collider::Collidable;
pub use contact::ContactInfo;
pub use dispatcher::{CollisionDispatcher, PairOutcome, RegistrationError};
pub use layers::LayerMask;
pub use triggers::TriggerTracker;
pub use world::{BodyKey, CollisionWorld};
