//! Headless marbles demo
//!
//! Drives the simulation core end to end without a window: solid marbles
//! bounce around a square arena, non-solid sparks drift through trigger
//! zones, and both phases issue draw commands that a renderer would
//! consume. Frames are driven with a synthetic 1/60 s delta so a run is
//! deterministic apart from the random spawn state.

use rand::Rng;
use sim_engine::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

const FRAME_DT: f32 = 1.0 / 60.0;
const TOTAL_FRAMES: u32 = 600;
const ARENA_HALF_EXTENT: f32 = 20.0;

/// Solid marble: collides and is pushed apart on contact.
struct Marble {
    center: Vec2,
    radius: f32,
}

impl Collidable for Marble {
    fn blocks(&self) -> bool {
        true
    }
    fn layer(&self) -> LayerMask {
        LayerMask::single(0)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Non-solid spark: drifts through everything, reported by zones.
struct Spark {
    center: Vec2,
}

impl Collidable for Spark {
    fn blocks(&self) -> bool {
        false
    }
    fn layer(&self) -> LayerMask {
        LayerMask::single(1)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Non-solid trigger volume observing marbles and sparks.
struct Zone {
    center: Vec2,
    radius: f32,
}

impl Collidable for Zone {
    fn blocks(&self) -> bool {
        false
    }
    fn layer(&self) -> LayerMask {
        LayerMask::single(0) | LayerMask::single(1)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Contact detail shared by the circle/circle tests.
#[derive(Debug, Default, Clone, Copy)]
struct Contact {
    normal: Vec2,
    depth: f32,
}

fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Contact> {
    let offset = b - a;
    let reach = ra + rb;
    let distance_sq = offset.norm_squared();
    if distance_sq >= reach * reach {
        return None;
    }
    let distance = distance_sq.sqrt();
    if distance > f32::EPSILON {
        Some(Contact {
            normal: offset / distance,
            depth: reach - distance,
        })
    } else {
        // Coincident centers: pick an arbitrary separation axis.
        Some(Contact {
            normal: Vec2::new(1.0, 0.0),
            depth: reach,
        })
    }
}

fn bounce_off_walls(center: &mut Vec2, velocity: &mut Vec2) {
    for axis in 0..2 {
        if center[axis].abs() > ARENA_HALF_EXTENT {
            center[axis] = center[axis].clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
            velocity[axis] = -velocity[axis];
        }
    }
}

struct MarblesApp {
    frames: u32,
    bodies: Vec<BodyKey>,
    bounces: Rc<RefCell<u32>>,
    spark_sightings: Rc<RefCell<u32>>,
}

impl MarblesApp {
    fn new() -> Self {
        Self {
            frames: 0,
            bodies: Vec::new(),
            bounces: Rc::new(RefCell::new(0)),
            spark_sightings: Rc::new(RefCell::new(0)),
        }
    }
}

impl Simulation for MarblesApp {
    fn setup(&mut self, ctx: &mut SimulationContext) -> Result<(), SimError> {
        let world = ctx.collision_mut();

        // Solid marble pairs: separate and reflect on contact.
        let bounces = Rc::clone(&self.bounces);
        world.register_pair_test::<Marble, Marble, Contact>(
            |a, b, _vel| circle_contact(a.center, a.radius, b.center, b.radius),
            move |marble, velocity, contacts| {
                for contact in contacts {
                    marble.center -= contact.normal * contact.depth;
                    let approach = velocity.dot(&contact.normal);
                    if approach > 0.0 {
                        *velocity -= contact.normal * (2.0 * approach);
                    }
                    *bounces.borrow_mut() += 1;
                }
            },
        )?;

        // Spark-in-zone trigger: one batched report per step.
        let sightings = Rc::clone(&self.spark_sightings);
        world.register_pair_test::<Spark, Zone, Contact>(
            |spark, zone, _vel| circle_contact(spark.center, 0.1, zone.center, zone.radius),
            move |_, _, contacts| {
                *sightings.borrow_mut() += contacts.len() as u32;
            },
        )?;

        let mut rng = rand::thread_rng();
        let spread = ARENA_HALF_EXTENT - 2.0;

        for _ in 0..6 {
            let marble = Marble {
                center: Vec2::new(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread)),
                radius: rng.gen_range(0.8..1.6),
            };
            let velocity = Vec2::new(rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0));
            self.bodies.push(world.insert_body(marble, velocity));
        }

        for _ in 0..8 {
            let spark = Spark {
                center: Vec2::new(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread)),
            };
            let velocity = Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            self.bodies.push(world.insert_body(spark, velocity));
        }

        for x in [-10.0, 0.0, 10.0] {
            self.bodies
                .push(world.insert_body(Zone { center: Vec2::new(x, 0.0), radius: 4.0 }, Vec2::zeros()));
        }

        log::info!("spawned {} bodies", world.len());
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut SimulationContext, _dt: f32) -> Result<(), SimError> {
        self.frames += 1;

        // Frame-phase drawing: the arena border.
        ctx.draw_router_mut().submit(DrawCommand::Rect {
            center: Vec2::zeros(),
            half_extents: Vec2::new(ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
            color: Vec4::new(0.3, 0.3, 0.3, 1.0),
        });

        if self.frames % 120 == 0 {
            log::info!(
                "frame {}: {} marble bounces, {} spark sightings",
                self.frames,
                self.bounces.borrow(),
                self.spark_sightings.borrow()
            );
        }

        if self.frames >= TOTAL_FRAMES {
            ctx.request_stop();
        }
        Ok(())
    }

    fn on_physics_step(&mut self, ctx: &mut SimulationContext, dt: f32) -> Result<(), SimError> {
        let world = ctx.collision_mut();

        // Integrate positions and bounce off the arena walls.
        for &key in &self.bodies {
            let Some(mut velocity) = world.velocity(key) else { continue };
            if let Some(marble) = world.get_mut::<Marble>(key) {
                marble.center += velocity * dt;
                bounce_off_walls(&mut marble.center, &mut velocity);
            } else if let Some(spark) = world.get_mut::<Spark>(key) {
                spark.center += velocity * dt;
                bounce_off_walls(&mut spark.center, &mut velocity);
            } else {
                continue;
            }
            world.set_velocity(key, velocity);
        }

        world.step();

        // Update-phase drawing: one command set per physics step.
        for &key in &self.bodies {
            let command = if let Some(marble) = ctx.collision().get::<Marble>(key) {
                DrawCommand::Circle {
                    center: marble.center,
                    radius: marble.radius,
                    color: Vec4::new(0.9, 0.9, 1.0, 1.0),
                }
            } else if let Some(spark) = ctx.collision().get::<Spark>(key) {
                DrawCommand::Point {
                    position: spark.center,
                    color: Vec4::new(1.0, 0.8, 0.2, 1.0),
                }
            } else if let Some(zone) = ctx.collision().get::<Zone>(key) {
                DrawCommand::Circle {
                    center: zone.center,
                    radius: zone.radius,
                    color: Vec4::new(0.2, 0.8, 0.4, 0.5),
                }
            } else {
                continue;
            };
            ctx.draw_router_mut().submit(command);
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut SimulationContext) -> Result<(), SimError> {
        // A real renderer would consume both queues here.
        log::trace!(
            "draw: {} frame command(s), {} update command(s)",
            ctx.draw_router().frame_commands().len(),
            ctx.draw_router().update_commands().len()
        );
        Ok(())
    }

    fn teardown(&mut self, _ctx: &mut SimulationContext) {
        log::info!(
            "done after {} frames: {} bounces, {} sightings",
            self.frames,
            self.bounces.borrow(),
            self.spark_sightings.borrow()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    sim_engine::foundation::logging::init();

    let mut config = EngineConfig::default();
    config.window.title = String::from("marbles");
    config.validate()?;

    let mut engine = Engine::new(config)?;
    let mut app = MarblesApp::new();
    app.setup(engine.context_mut())?;

    // Synthetic frame times keep the run deterministic and headless.
    while engine.scheduler().state() != SchedulerState::Stopped {
        engine.drive_frame(FRAME_DT, &mut app)?;
    }

    app.teardown(engine.context_mut());
    Ok(())
}
