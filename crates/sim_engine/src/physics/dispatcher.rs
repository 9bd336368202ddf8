//! Capability-based collision dispatch
//!
//! Bridges an untyped collision query — two `&dyn Collidable` handles and
//! a relative velocity — to the statically typed narrow-phase test
//! registered for that ordered pair of concrete types. There is no
//! central switch over type pairs: new pair tests are added purely by
//! registration, and an unmatched pair is a normal "not colliding"
//! outcome, not an error.

use crate::foundation::math::Vec2;
use crate::physics::collider::Collidable;
use crate::physics::contact::ContactInfo;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while registering pair tests.
///
/// All of these are configuration mistakes: they surface during setup,
/// before any physics step runs, and are fatal to startup.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A test for this ordered pair of concrete types already exists
    #[error("a pair test for ({0}, {1}) is already registered")]
    DuplicatePair(&'static str, &'static str),

    /// A sustained-contact test needs a base pair test to attach to
    #[error("no base pair test registered for ({0}, {1})")]
    MissingBaseTest(&'static str, &'static str),

    /// A sustained-contact test for this pair already exists
    #[error("a sustained-contact test for ({0}, {1}) is already registered")]
    DuplicateSustainedTest(&'static str, &'static str),

    /// The sustained-contact test's info type differs from the base
    /// registration's info type
    #[error("sustained-contact test for ({0}, {1}) produces a different info type than the base test")]
    MismatchedInfoType(&'static str, &'static str),
}

/// Result of dispatching one matched pair.
#[derive(Debug)]
pub struct PairOutcome {
    /// Whether the narrow-phase test found the pair overlapping
    pub colliding: bool,
    /// Erased payload; the info type's `Default` value when not colliding
    pub info: ContactInfo,
}

type ErasedTest = Box<dyn Fn(&dyn Collidable, &dyn Collidable, Vec2) -> PairOutcome>;
type ErasedResponse = Box<dyn FnMut(&mut dyn Collidable, &mut Vec2, &[ContactInfo])>;

struct PairEntry {
    test: ErasedTest,
    sustained: Option<ErasedTest>,
    respond: ErasedResponse,
    info_type: TypeId,
    names: (&'static str, &'static str),
}

/// Registry and dispatcher for typed pair tests.
///
/// Each entry associates an *ordered* pair of concrete [`Collidable`]
/// types `(A, B)` and an info type `I` with a narrow-phase test and a
/// response callback. Matching is by runtime type query in the exact
/// registered order; no automatic pair swap happens, so a test meant to
/// also run for `(B, A)` must be registered separately for that order.
pub struct CollisionDispatcher {
    entries: HashMap<(TypeId, TypeId), PairEntry>,
    // Registration order; drives the deterministic order of batched
    // trigger responses.
    order: Vec<(TypeId, TypeId)>,
}

impl Default for CollisionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a narrow-phase test and its response for the ordered
    /// concrete type pair `(A, B)`.
    ///
    /// The test returns `Some(info)` when the pair overlaps and `None`
    /// otherwise; on `None` the dispatcher reports `colliding: false`
    /// together with `I::default()` so consumers never see an absent
    /// payload. The response receives the body being resolved, its
    /// velocity, and the batch of infos gathered for this type pair in
    /// the current physics step (a single-element batch for blocking
    /// pairs).
    ///
    /// # Errors
    /// Returns [`RegistrationError::DuplicatePair`] when a test for the
    /// same ordered pair is already registered.
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
        let key = (TypeId::of::<A>(), TypeId::of::<B>());
        let names = (type_name::<A>(), type_name::<B>());
        if self.entries.contains_key(&key) {
            return Err(RegistrationError::DuplicatePair(names.0, names.1));
        }

        let mut respond = respond;
        let entry = PairEntry {
            test: erase_test(test),
            sustained: None,
            respond: Box::new(move |body: &mut dyn Collidable, velocity: &mut Vec2, infos: &[ContactInfo]| {
                let body = body
                    .as_any_mut()
                    .downcast_mut::<A>()
                    .expect("response body type was checked at dispatch");
                let typed: Vec<&I> = infos
                    .iter()
                    .map(|info| {
                        info.downcast_ref::<I>()
                            .expect("info type is fixed by the registration that produced it")
                    })
                    .collect();
                respond(body, velocity, &typed);
            }),
            info_type: TypeId::of::<I>(),
            names,
        };

        log::debug!("registered pair test ({}, {})", names.0, names.1);
        self.entries.insert(key, entry);
        self.order.push(key);
        Ok(())
    }

    /// Register a sustained-contact test for an already registered pair.
    ///
    /// Some narrow-phase algorithms only detect *entering* overlap; their
    /// authors register a second test here that may assume the pair was
    /// already overlapping last step. When absent, the base test is used
    /// for sustained contact as well.
    ///
    /// # Errors
    /// Returns [`RegistrationError::MissingBaseTest`] when no base pair
    /// test exists, [`RegistrationError::DuplicateSustainedTest`] when a
    /// sustained test was already attached, and
    /// [`RegistrationError::MismatchedInfoType`] when `I` differs from the
    /// base registration's info type.
    pub fn register_sustained_test<A, B, I>(
        &mut self,
        test: impl Fn(&A, &B, Vec2) -> Option<I> + 'static,
    ) -> Result<(), RegistrationError>
    where
        A: Collidable,
        B: Collidable,
        I: Default + 'static,
    {
        let key = (TypeId::of::<A>(), TypeId::of::<B>());
        let names = (type_name::<A>(), type_name::<B>());
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(RegistrationError::MissingBaseTest(names.0, names.1))?;
        if entry.sustained.is_some() {
            return Err(RegistrationError::DuplicateSustainedTest(names.0, names.1));
        }
        if entry.info_type != TypeId::of::<I>() {
            return Err(RegistrationError::MismatchedInfoType(names.0, names.1));
        }

        entry.sustained = Some(erase_test(test));
        log::debug!("registered sustained-contact test ({}, {})", names.0, names.1);
        Ok(())
    }

    /// Dispatch the test registered for the concrete types of `a` and
    /// `b`, in that order.
    ///
    /// Returns `None` when no registered test covers the ordered pair;
    /// callers treat that as "not colliding".
    pub fn test_pair(
        &self,
        a: &dyn Collidable,
        b: &dyn Collidable,
        relative_velocity: Vec2,
    ) -> Option<PairOutcome> {
        self.test_pair_with_history(a, b, relative_velocity, false)
    }

    /// Like [`test_pair`](Self::test_pair), but selects the
    /// sustained-contact test when one is registered and the caller knows
    /// the pair was overlapping last step.
    pub fn test_pair_with_history(
        &self,
        a: &dyn Collidable,
        b: &dyn Collidable,
        relative_velocity: Vec2,
        assume_overlapping: bool,
    ) -> Option<PairOutcome> {
        let entry = self.entries.get(&pair_key(a, b))?;
        let test = if assume_overlapping {
            entry.sustained.as_ref().unwrap_or(&entry.test)
        } else {
            &entry.test
        };
        Some(test(a, b, relative_velocity))
    }

    /// Whether a test is registered for the ordered concrete types of
    /// `a` and `b`
    pub fn covers(&self, a: &dyn Collidable, b: &dyn Collidable) -> bool {
        self.entries.contains_key(&pair_key(a, b))
    }

    /// Number of registered pair tests
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair test is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type-pair keys in registration order
    pub(crate) fn registration_order(&self) -> &[(TypeId, TypeId)] {
        &self.order
    }

    /// Invoke the response callback registered for `key` with a batch of
    /// infos produced by that same registration.
    pub(crate) fn respond(
        &mut self,
        key: (TypeId, TypeId),
        body: &mut dyn Collidable,
        velocity: &mut Vec2,
        infos: &[ContactInfo],
    ) {
        let entry = self
            .entries
            .get_mut(&key)
            .expect("response key originates from a successful match");
        log::trace!(
            "collision response ({}, {}) with {} info(s)",
            entry.names.0,
            entry.names.1,
            infos.len()
        );
        (entry.respond)(body, velocity, infos);
    }
}

fn pair_key(a: &dyn Collidable, b: &dyn Collidable) -> (TypeId, TypeId) {
    (a.as_any().type_id(), b.as_any().type_id())
}

fn erase_test<A, B, I>(test: impl Fn(&A, &B, Vec2) -> Option<I> + 'static) -> ErasedTest
where
    A: Collidable,
    B: Collidable,
    I: Default + 'static,
{
    Box::new(move |a: &dyn Collidable, b: &dyn Collidable, relative_velocity: Vec2| {
        let a = a
            .as_any()
            .downcast_ref::<A>()
            .expect("concrete type of `a` was checked before dispatch");
        let b = b
            .as_any()
            .downcast_ref::<B>()
            .expect("concrete type of `b` was checked before dispatch");
        match test(a, b, relative_velocity) {
            Some(info) => PairOutcome {
                colliding: true,
                info: ContactInfo::new(info),
            },
            None => PairOutcome {
                colliding: false,
                info: ContactInfo::new(I::default()),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::layers::LayerMask;
    use std::any::Any;

    struct Ball {
        center: Vec2,
        radius: f32,
    }

    struct Wall {
        x: f32,
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

    impl Collidable for Wall {
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

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct WallHit {
        depth: f32,
    }

    fn ball_wall_test(ball: &Ball, wall: &Wall, _vel: Vec2) -> Option<WallHit> {
        let depth = ball.center.x + ball.radius - wall.x;
        (depth > 0.0).then_some(WallHit { depth })
    }

    fn register_ball_wall(dispatcher: &mut CollisionDispatcher) {
        dispatcher
            .register_pair_test::<Ball, Wall, WallHit>(ball_wall_test, |_, _, _| {})
            .unwrap();
    }

    #[test]
    fn test_matched_pair_dispatches() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let ball = Ball {
            center: Vec2::new(0.5, 0.0),
            radius: 1.0,
        };
        let wall = Wall { x: 1.0 };

        let outcome = dispatcher
            .test_pair(&ball, &wall, Vec2::zeros())
            .expect("pair is registered");
        assert!(outcome.colliding);
        let hit = outcome.info.downcast_ref::<WallHit>().unwrap();
        assert!((hit.depth - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_swapped_order_is_unmatched() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let ball = Ball {
            center: Vec2::zeros(),
            radius: 1.0,
        };
        let wall = Wall { x: 0.0 };

        // No automatic pair swap: (Wall, Ball) was never registered.
        assert!(dispatcher.test_pair(&wall, &ball, Vec2::zeros()).is_none());
        assert!(dispatcher.covers(&ball, &wall));
        assert!(!dispatcher.covers(&wall, &ball));
    }

    #[test]
    fn test_non_colliding_match_carries_default_info() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let ball = Ball {
            center: Vec2::new(-5.0, 0.0),
            radius: 1.0,
        };
        let wall = Wall { x: 1.0 };

        let outcome = dispatcher.test_pair(&ball, &wall, Vec2::zeros()).unwrap();
        assert!(!outcome.colliding);
        assert_eq!(outcome.info.downcast_ref::<WallHit>(), Some(&WallHit::default()));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let err = dispatcher
            .register_pair_test::<Ball, Wall, WallHit>(ball_wall_test, |_, _, _| {})
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicatePair(..)));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_sustained_test_selected_with_history() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);
        dispatcher
            .register_sustained_test::<Ball, Wall, WallHit>(|_, _, _| {
                Some(WallHit { depth: f32::MAX })
            })
            .unwrap();

        let ball = Ball {
            center: Vec2::new(-5.0, 0.0),
            radius: 1.0,
        };
        let wall = Wall { x: 1.0 };

        // Without history the base test runs and reports no overlap.
        let base = dispatcher
            .test_pair_with_history(&ball, &wall, Vec2::zeros(), false)
            .unwrap();
        assert!(!base.colliding);

        // With history the sustained test runs instead.
        let sustained = dispatcher
            .test_pair_with_history(&ball, &wall, Vec2::zeros(), true)
            .unwrap();
        assert!(sustained.colliding);
        assert_eq!(
            sustained.info.downcast_ref::<WallHit>().unwrap().depth,
            f32::MAX
        );
    }

    #[test]
    fn test_history_without_sustained_test_falls_back_to_base() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let ball = Ball {
            center: Vec2::new(0.5, 0.0),
            radius: 1.0,
        };
        let wall = Wall { x: 1.0 };

        let outcome = dispatcher
            .test_pair_with_history(&ball, &wall, Vec2::zeros(), true)
            .unwrap();
        assert!(outcome.colliding);
    }

    #[test]
    fn test_sustained_registration_errors() {
        let mut dispatcher = CollisionDispatcher::new();

        let err = dispatcher
            .register_sustained_test::<Ball, Wall, WallHit>(|_, _, _| None)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingBaseTest(..)));

        register_ball_wall(&mut dispatcher);
        dispatcher
            .register_sustained_test::<Ball, Wall, WallHit>(|_, _, _| None)
            .unwrap();

        let err = dispatcher
            .register_sustained_test::<Ball, Wall, WallHit>(|_, _, _| None)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateSustainedTest(..)));
    }

    #[test]
    fn test_sustained_info_type_must_match_base() {
        let mut dispatcher = CollisionDispatcher::new();
        register_ball_wall(&mut dispatcher);

        let err = dispatcher
            .register_sustained_test::<Ball, Wall, u32>(|_, _, _| None)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MismatchedInfoType(..)));
    }
}
