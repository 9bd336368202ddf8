//! Draw command queues and phase routing
//!
//! Gameplay code issues draw commands through one routing front; the
//! scheduler decides, per phase, which of two queues collects them. The
//! frame-phase queue is rebuilt once per rendered frame; the update-phase
//! queue is rebuilt once per physics step. A renderer (an external
//! collaborator of this core) consumes both queues once per rendered
//! frame, so substep-issued drawing is neither duplicated on
//! multi-substep frames nor missing on zero-substep frames.

use crate::foundation::math::{Vec2, Vec4};

/// A retained draw command, consumed by the external renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Circle outline or disc at `center`
    Circle {
        /// Center position
        center: Vec2,
        /// Radius in world units
        radius: f32,
        /// RGBA color
        color: Vec4,
    },

    /// Line segment from `start` to `end`
    Line {
        /// Segment start
        start: Vec2,
        /// Segment end
        end: Vec2,
        /// RGBA color
        color: Vec4,
    },

    /// Axis-aligned rectangle at `center` with half-extents
    Rect {
        /// Center position
        center: Vec2,
        /// Half width and half height
        half_extents: Vec2,
        /// RGBA color
        color: Vec4,
    },

    /// Point marker at `position`
    Point {
        /// Marker position
        position: Vec2,
        /// RGBA color
        color: Vec4,
    },
}

/// Which collection phase the router currently feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    /// Variable-rate frame pass; commands collected once per rendered
    /// frame
    Frame,
    /// Fixed-rate physics pass; commands collected once per physics step
    Update,
}

/// An ordered list of draw commands.
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    /// Append a command
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the queue holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Routes issued draw commands to the queue of the active phase.
///
/// Exactly one queue is active at a time; the scheduler switches phases
/// synchronously at its frame/substep boundaries. Not thread-safe by
/// design: issuance, stepping and switching all happen on the single
/// simulation thread.
#[derive(Debug)]
pub struct DrawQueueRouter {
    frame: DrawQueue,
    update: DrawQueue,
    active: DrawPhase,
}

impl Default for DrawQueueRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawQueueRouter {
    /// Create a router with both queues empty, routing to the frame phase
    pub fn new() -> Self {
        Self {
            frame: DrawQueue::default(),
            update: DrawQueue::default(),
            active: DrawPhase::Frame,
        }
    }

    /// Issue a draw command into the active phase's queue
    pub fn submit(&mut self, command: DrawCommand) {
        match self.active {
            DrawPhase::Frame => self.frame.push(command),
            DrawPhase::Update => self.update.push(command),
        }
    }

    /// The phase currently collecting commands
    pub fn active_phase(&self) -> DrawPhase {
        self.active
    }

    /// Commands collected during the frame pass of the current frame
    pub fn frame_commands(&self) -> &[DrawCommand] {
        self.frame.commands()
    }

    /// Commands collected during the most recent physics step
    pub fn update_commands(&self) -> &[DrawCommand] {
        self.update.commands()
    }

    /// Start the frame pass: route to the frame queue and drop last
    /// frame's commands. Called by the scheduler once per driven frame.
    pub fn begin_frame_pass(&mut self) {
        self.frame.clear();
        self.active = DrawPhase::Frame;
    }

    /// Enter the physics pass: route to the update queue. Called by the
    /// scheduler before draining the accumulator; the queue contents are
    /// kept so zero-substep frames still render the previous step's
    /// drawing.
    pub fn begin_physics_pass(&mut self) {
        self.active = DrawPhase::Update;
    }

    /// Start one physics substep's collection: drop the previous step's
    /// update commands so each physics step is collected exactly once.
    pub fn begin_physics_step(&mut self) {
        self.update.clear();
    }

    /// Leave the physics pass: route back to the frame queue
    pub fn end_physics_pass(&mut self) {
        self.active = DrawPhase::Frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32) -> DrawCommand {
        DrawCommand::Point {
            position: Vec2::new(x, 0.0),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn test_commands_route_to_active_phase() {
        let mut router = DrawQueueRouter::new();
        router.begin_frame_pass();
        router.submit(point(1.0));

        router.begin_physics_pass();
        router.begin_physics_step();
        router.submit(point(2.0));
        router.end_physics_pass();

        assert_eq!(router.frame_commands(), &[point(1.0)]);
        assert_eq!(router.update_commands(), &[point(2.0)]);

        // After the physics pass, issuance lands in the frame queue again.
        router.submit(point(3.0));
        assert_eq!(router.frame_commands(), &[point(1.0), point(3.0)]);
    }

    #[test]
    fn test_frame_queue_rebuilt_each_frame() {
        let mut router = DrawQueueRouter::new();
        router.begin_frame_pass();
        router.submit(point(1.0));

        router.begin_frame_pass();
        router.submit(point(2.0));
        assert_eq!(router.frame_commands(), &[point(2.0)]);
    }

    #[test]
    fn test_update_queue_holds_exactly_one_step() {
        let mut router = DrawQueueRouter::new();
        router.begin_physics_pass();

        // Three substeps in one frame: only the last step's commands
        // survive, so nothing is drawn twice.
        for step in 0..3 {
            router.begin_physics_step();
            router.submit(point(step as f32));
        }
        router.end_physics_pass();
        assert_eq!(router.update_commands(), &[point(2.0)]);
    }

    #[test]
    fn test_update_queue_survives_zero_substep_frames() {
        let mut router = DrawQueueRouter::new();
        router.begin_physics_pass();
        router.begin_physics_step();
        router.submit(point(7.0));
        router.end_physics_pass();

        // Next frame runs no substep: the previous step's commands are
        // still available to the renderer.
        router.begin_frame_pass();
        router.begin_physics_pass();
        router.end_physics_pass();
        assert_eq!(router.update_commands(), &[point(7.0)]);
    }
}
