//! Body registry and per-step collision resolution
//!
//! [`CollisionWorld`] owns the registered bodies, the pair-test
//! dispatcher and the trigger history, and runs the once-per-physics-step
//! sweep: layer filtering, narrow-phase dispatch, immediate blocking
//! responses and batched trigger responses.

use crate::foundation::math::Vec2;
use crate::physics::collider::Collidable;
use crate::physics::contact::ContactInfo;
use crate::physics::dispatcher::{CollisionDispatcher, RegistrationError};
use crate::physics::layers::LayerMask;
use crate::physics::triggers::TriggerTracker;
use slotmap::SlotMap;
use std::any::TypeId;
use std::collections::HashMap;

slotmap::new_key_type! {
    /// Stable identity of a registered body; usable as a map key and safe
    /// against slot reuse after removal
    pub struct BodyKey;
}

/// One registered body: the boxed collision surface plus its velocity.
///
/// Velocity lives here so the sweep can hand each narrow-phase test the
/// pair's relative velocity and give response callbacks a mutable handle
/// for immediate velocity corrections.
struct Body {
    collidable: Box<dyn Collidable>,
    velocity: Vec2,
}

struct TriggerBatch {
    representative: BodyKey,
    infos: Vec<ContactInfo>,
}

/// Collision registry and per-step responder.
///
/// Pair tests are registered during setup; bodies come and go at runtime.
/// [`step`](Self::step) runs the resolution pass once per physics step:
///
/// - every unordered candidate pair, in stable insertion order, passing
///   symmetric layer filtering, is dispatched against the test registered
///   for its ordered concrete types (no automatic swap);
/// - blocking outcomes (either side solid) invoke the pair's response
///   immediately, before the next candidate pair is examined, so later
///   pairs observe the corrected state;
/// - trigger outcomes (neither side solid) update the overlap history and
///   are batched per ordered type pair; after the sweep each batch is
///   delivered in one response call, in registration order.
#[derive(Default)]
pub struct CollisionWorld {
    dispatcher: CollisionDispatcher,
    triggers: TriggerTracker,
    bodies: SlotMap<BodyKey, Body>,
    // Insertion order; drives the deterministic pair sweep.
    order: Vec<BodyKey>,
}

impl CollisionWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a narrow-phase test and response for the ordered type
    /// pair `(A, B)`; see [`CollisionDispatcher::register_pair_test`]
    ///
    /// # Errors
    /// Propagates [`RegistrationError`] from the dispatcher.
    pub fn register_pair_test<A, B, I>(
        &mut self,
        test: impl Fn(&A, &B, Vec2) -> Option<I> + 'static,
        respond: impl FnMut(&mut A, &mut Vec2, &[&I]) + 'static,
    ) -> Result<(), RegistrationError>
    where
        A: Collidable,
        B: Collidable,
        I: Default + 'static,
    {
        self.dispatcher.register_pair_test(test, respond)
    }

    /// Register a sustained-contact override for an existing pair; see
    /// [`CollisionDispatcher::register_sustained_test`]
    ///
    /// # Errors
    /// Propagates [`RegistrationError`] from the dispatcher.
    pub fn register_sustained_test<A, B, I>(
        &mut self,
        test: impl Fn(&A, &B, Vec2) -> Option<I> + 'static,
    ) -> Result<(), RegistrationError>
    where
        A: Collidable,
        B: Collidable,
        I: Default + 'static,
    {
        self.dispatcher.register_sustained_test(test)
    }

    /// Add a body and return its stable identity
    pub fn insert_body(&mut self, collidable: impl Collidable, velocity: Vec2) -> BodyKey {
        let key = self.bodies.insert(Body {
            collidable: Box::new(collidable),
            velocity,
        });
        self.order.push(key);
        key
    }

    /// Remove a body, pruning its trigger history entries.
    ///
    /// This is the explicit deregistration call owners must make before
    /// destroying an entity; the tracker performs no liveness checks.
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Box<dyn Collidable>> {
        let body = self.bodies.remove(key)?;
        self.order.retain(|&k| k != key);
        self.triggers.forget_body(key);
        Some(body.collidable)
    }

    /// Borrow a body's collision surface
    pub fn body(&self, key: BodyKey) -> Option<&dyn Collidable> {
        self.bodies.get(key).map(|b| b.collidable.as_ref())
    }

    /// Borrow a body as its concrete type
    pub fn get<T: Collidable>(&self, key: BodyKey) -> Option<&T> {
        self.bodies
            .get(key)
            .and_then(|b| b.collidable.as_any().downcast_ref())
    }

    /// Mutably borrow a body as its concrete type
    pub fn get_mut<T: Collidable>(&mut self, key: BodyKey) -> Option<&mut T> {
        self.bodies
            .get_mut(key)
            .and_then(|b| b.collidable.as_any_mut().downcast_mut())
    }

    /// A body's current velocity
    pub fn velocity(&self, key: BodyKey) -> Option<Vec2> {
        self.bodies.get(key).map(|b| b.velocity)
    }

    /// Overwrite a body's velocity
    pub fn set_velocity(&mut self, key: BodyKey, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(key) {
            body.velocity = velocity;
        }
    }

    /// Registered body keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.order.iter().copied()
    }

    /// Number of registered bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no body is registered
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Whether a trigger pair was overlapping at the end of the previous
    /// step
    pub fn was_colliding_last_step(&self, a: BodyKey, b: BodyKey) -> bool {
        self.triggers.was_colliding(a, b)
    }

    /// Read access to the dispatcher
    pub fn dispatcher(&self) -> &CollisionDispatcher {
        &self.dispatcher
    }

    /// Run one collision resolution pass; call once per physics step
    pub fn step(&mut self) {
        let keys = self.order.clone();
        let mut batches: HashMap<(TypeId, TypeId), TriggerBatch> = HashMap::new();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (ka, kb) = (keys[i], keys[j]);
                let Some(a) = self.bodies.get(ka) else { continue };
                let Some(b) = self.bodies.get(kb) else { continue };

                if !LayerMask::should_collide(a.collidable.layer(), b.collidable.layer()) {
                    continue;
                }

                let trigger_pair = !a.collidable.blocks() && !b.collidable.blocks();
                let relative_velocity = a.velocity - b.velocity;
                let type_key = (
                    a.collidable.as_any().type_id(),
                    b.collidable.as_any().type_id(),
                );
                let assume_overlapping = trigger_pair && self.triggers.was_colliding(ka, kb);

                // Unmatched ordered type pairs are a normal outcome:
                // nothing registered means "not colliding".
                let Some(outcome) = self.dispatcher.test_pair_with_history(
                    a.collidable.as_ref(),
                    b.collidable.as_ref(),
                    relative_velocity,
                    assume_overlapping,
                ) else {
                    continue;
                };

                if outcome.colliding {
                    if trigger_pair {
                        self.triggers.record(ka, kb, true);
                        batches
                            .entry(type_key)
                            .or_insert_with(|| TriggerBatch {
                                representative: ka,
                                infos: Vec::new(),
                            })
                            .infos
                            .push(outcome.info);
                    } else {
                        // Respond before the next candidate pair so later
                        // pairs see the corrected position and velocity.
                        let body = self
                            .bodies
                            .get_mut(ka)
                            .expect("body existed at the start of this pair");
                        let Body {
                            collidable,
                            velocity,
                        } = body;
                        self.dispatcher.respond(
                            type_key,
                            collidable.as_mut(),
                            velocity,
                            std::slice::from_ref(&outcome.info),
                        );
                    }
                } else if trigger_pair {
                    self.triggers.record(ka, kb, false);
                }
            }
        }

        // One batched response per matched trigger type pair, in
        // registration order.
        let order: Vec<(TypeId, TypeId)> = self.dispatcher.registration_order().to_vec();
        for type_key in order {
            let Some(batch) = batches.remove(&type_key) else {
                continue;
            };
            let Some(body) = self.bodies.get_mut(batch.representative) else {
                continue;
            };
            let Body {
                collidable,
                velocity,
            } = body;
            self.dispatcher
                .respond(type_key, collidable.as_mut(), velocity, &batch.infos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Zone {
        center: Vec2,
        radius: f32,
        layer: LayerMask,
    }

    impl Zone {
        fn at(x: f32, y: f32) -> Self {
            Self {
                center: Vec2::new(x, y),
                radius: 1.0,
                layer: LayerMask::ALL,
            }
        }
    }

    impl Collidable for Zone {
        fn blocks(&self) -> bool {
            false
        }
        fn layer(&self) -> LayerMask {
            self.layer
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Ball {
        id: u32,
        center: Vec2,
        radius: f32,
    }

    impl Collidable for Ball {
        fn blocks(&self) -> bool {
            true
        }
        fn layer(&self) -> LayerMask {
            LayerMask::ALL
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Debug, Default, Clone, Copy)]
    struct Overlap {
        depth: f32,
    }

    fn zone_overlap(a: &Zone, b: &Zone, _vel: Vec2) -> Option<Overlap> {
        let distance = (b.center - a.center).norm();
        let reach = a.radius + b.radius;
        (distance < reach).then_some(Overlap {
            depth: reach - distance,
        })
    }

    fn ball_overlap(a: &Ball, b: &Ball, _vel: Vec2) -> Option<Overlap> {
        let distance = (b.center - a.center).norm();
        let reach = a.radius + b.radius;
        (distance < reach).then_some(Overlap {
            depth: reach - distance,
        })
    }

    #[test]
    fn test_trigger_lifecycle_end_to_end() {
        let mut world = CollisionWorld::new();
        let batch_sizes = Rc::new(RefCell::new(Vec::new()));
        let sizes = Rc::clone(&batch_sizes);
        world
            .register_pair_test::<Zone, Zone, Overlap>(zone_overlap, move |_, _, infos| {
                sizes.borrow_mut().push(infos.len());
            })
            .unwrap();

        // Two unit-radius trigger volumes 1.5 apart: overlapping.
        let a = world.insert_body(Zone::at(0.0, 0.0), Vec2::zeros());
        let b = world.insert_body(Zone::at(1.5, 0.0), Vec2::zeros());

        // Steps 1-3: overlapping, one response per step with a single info.
        world.step();
        assert_eq!(*batch_sizes.borrow(), vec![1]);
        assert!(world.was_colliding_last_step(a, b));

        world.step();
        assert!(world.was_colliding_last_step(a, b));
        world.step();
        assert_eq!(*batch_sizes.borrow(), vec![1, 1, 1]);

        // Step 4: moved 3 apart, no longer overlapping.
        world.get_mut::<Zone>(b).unwrap().center = Vec2::new(3.0, 0.0);
        world.step();
        assert_eq!(*batch_sizes.borrow(), vec![1, 1, 1]);
        assert!(!world.was_colliding_last_step(a, b));

        // Step 5: history stays cleared.
        world.step();
        assert!(!world.was_colliding_last_step(a, b));
    }

    #[test]
    fn test_trigger_infos_batch_into_one_response() {
        let mut world = CollisionWorld::new();
        let batch_sizes = Rc::new(RefCell::new(Vec::new()));
        let sizes = Rc::clone(&batch_sizes);
        world
            .register_pair_test::<Zone, Zone, Overlap>(zone_overlap, move |_, _, infos| {
                sizes.borrow_mut().push(infos.len());
            })
            .unwrap();

        // Three mutually overlapping trigger volumes: pairs (a,b), (a,c),
        // (b,c) all match the same ordered type pair.
        world.insert_body(Zone::at(0.0, 0.0), Vec2::zeros());
        world.insert_body(Zone::at(1.0, 0.0), Vec2::zeros());
        world.insert_body(Zone::at(0.5, 0.5), Vec2::zeros());

        world.step();
        assert_eq!(*batch_sizes.borrow(), vec![3]);
    }

    #[test]
    fn test_blocking_response_is_immediate_and_ordered() {
        let mut world = CollisionWorld::new();
        let responded = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&responded);
        world
            .register_pair_test::<Ball, Ball, Overlap>(ball_overlap, move |body, _, infos| {
                log.borrow_mut().push(body.id);
                assert_eq!(infos.len(), 1);
                // Teleport the resolved body away; later candidate pairs
                // must observe the corrected position.
                body.center = Vec2::new(100.0, 100.0);
            })
            .unwrap();

        let ball = |id, x| Ball {
            id,
            center: Vec2::new(x, 0.0),
            radius: 1.0,
        };
        // Balls 1 and 2 overlap; ball 3 overlaps ball 1's starting spot
        // but not ball 2.
        world.insert_body(ball(1, 0.0), Vec2::zeros());
        world.insert_body(ball(2, 1.5), Vec2::zeros());
        world.insert_body(ball(3, -1.5), Vec2::zeros());

        world.step();
        // Pair (1,2) resolves first and moves ball 1 away, so pair (1,3)
        // no longer overlaps.
        assert_eq!(*responded.borrow(), vec![1]);
    }

    #[test]
    fn test_mixed_pair_resolves_as_blocking() {
        let mut world = CollisionWorld::new();
        let calls = Rc::new(RefCell::new(0));
        let count = Rc::clone(&calls);
        world
            .register_pair_test::<Ball, Zone, Overlap>(
                |ball, zone, _| {
                    let distance = (zone.center - ball.center).norm();
                    (distance < ball.radius + zone.radius).then_some(Overlap::default())
                },
                move |_, _, _| *count.borrow_mut() += 1,
            )
            .unwrap();

        let ball = world.insert_body(
            Ball {
                id: 1,
                center: Vec2::zeros(),
                radius: 1.0,
            },
            Vec2::zeros(),
        );
        let zone = world.insert_body(Zone::at(1.0, 0.0), Vec2::zeros());

        world.step();
        assert_eq!(*calls.borrow(), 1);
        // One side is solid, so no trigger history is kept for the pair.
        assert!(!world.was_colliding_last_step(ball, zone));
    }

    #[test]
    fn test_layer_filter_skips_pairs() {
        let mut world = CollisionWorld::new();
        let calls = Rc::new(RefCell::new(0));
        let count = Rc::clone(&calls);
        world
            .register_pair_test::<Zone, Zone, Overlap>(zone_overlap, move |_, _, _| {
                *count.borrow_mut() += 1;
            })
            .unwrap();

        let mut a = Zone::at(0.0, 0.0);
        a.layer = LayerMask::single(1);
        let mut b = Zone::at(1.0, 0.0);
        b.layer = LayerMask::single(2);
        let ka = world.insert_body(a, Vec2::zeros());
        let kb = world.insert_body(b, Vec2::zeros());

        world.step();
        assert_eq!(*calls.borrow(), 0);
        assert!(!world.was_colliding_last_step(ka, kb));
    }

    #[test]
    fn test_unregistered_pair_is_silently_skipped() {
        let mut world = CollisionWorld::new();
        world.insert_body(Zone::at(0.0, 0.0), Vec2::zeros());
        world.insert_body(
            Ball {
                id: 1,
                center: Vec2::zeros(),
                radius: 1.0,
            },
            Vec2::zeros(),
        );

        // No registration at all: stepping is a quiet no-op.
        world.step();
    }

    #[test]
    fn test_sustained_test_runs_after_first_overlap() {
        let mut world = CollisionWorld::new();
        let sustained_runs = Rc::new(RefCell::new(0));
        world
            .register_pair_test::<Zone, Zone, Overlap>(zone_overlap, |_, _, _| {})
            .unwrap();
        let runs = Rc::clone(&sustained_runs);
        world
            .register_sustained_test::<Zone, Zone, Overlap>(move |a, b, vel| {
                *runs.borrow_mut() += 1;
                zone_overlap(a, b, vel)
            })
            .unwrap();

        world.insert_body(Zone::at(0.0, 0.0), Vec2::zeros());
        world.insert_body(Zone::at(1.5, 0.0), Vec2::zeros());

        world.step();
        assert_eq!(*sustained_runs.borrow(), 0);
        world.step();
        assert_eq!(*sustained_runs.borrow(), 1);
        world.step();
        assert_eq!(*sustained_runs.borrow(), 2);
    }

    #[test]
    fn test_remove_body_prunes_history() {
        let mut world = CollisionWorld::new();
        world
            .register_pair_test::<Zone, Zone, Overlap>(zone_overlap, |_, _, _| {})
            .unwrap();

        let a = world.insert_body(Zone::at(0.0, 0.0), Vec2::zeros());
        let b = world.insert_body(Zone::at(1.5, 0.0), Vec2::zeros());

        world.step();
        assert!(world.was_colliding_last_step(a, b));

        world.remove_body(b);
        assert!(!world.was_colliding_last_step(a, b));
        assert_eq!(world.len(), 1);

        // Stepping with the body gone must not disturb anything.
        world.step();
    }

    #[test]
    fn test_relative_velocity_reaches_the_test() {
        let mut world = CollisionWorld::new();
        let seen = Rc::new(RefCell::new(Vec2::zeros()));
        let captured = Rc::clone(&seen);
        world
            .register_pair_test::<Zone, Zone, Overlap>(
                move |a, b, vel| {
                    *captured.borrow_mut() = vel;
                    zone_overlap(a, b, vel)
                },
                |_, _, _| {},
            )
            .unwrap();

        world.insert_body(Zone::at(0.0, 0.0), Vec2::new(2.0, 0.0));
        world.insert_body(Zone::at(1.5, 0.0), Vec2::new(-1.0, 0.0));

        world.step();
        assert_eq!(*seen.borrow(), Vec2::new(3.0, 0.0));
    }
}
