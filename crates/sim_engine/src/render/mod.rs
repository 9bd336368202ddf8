//! Draw command collection
//!
//! Rendering itself is an external collaborator; this module only
//! collects and routes the commands a renderer consumes once per frame.

pub mod draw_queue;

pub use draw_queue::{DrawCommand, DrawPhase, DrawQueue, DrawQueueRouter};
