//! Type-erased contact payloads
//!
//! A narrow-phase test produces a payload describing the overlap (contact
//! normal, penetration depth, overlap region — whatever that test kind
//! defines). The dispatcher carries the payload as an erased box so that
//! unrelated pair tests can coexist in one registry; the typed response
//! callback recovers the concrete type on delivery.

use std::any::{Any, TypeId};
use std::fmt;

/// Erased per-pair payload produced by one narrow-phase test.
///
/// Created fresh for every test invocation and dropped after the response
/// that consumes it. When a pair matches a registered test but is not
/// colliding, the dispatcher wraps the info type's `Default` value here so
/// callers never have to branch on payload absence.
pub struct ContactInfo {
    payload: Box<dyn Any>,
}

impl ContactInfo {
    /// Erase a concrete info value
    pub fn new<I: Any>(info: I) -> Self {
        Self {
            payload: Box::new(info),
        }
    }

    /// Borrow the payload as a concrete info type
    pub fn downcast_ref<I: Any>(&self) -> Option<&I> {
        self.payload.downcast_ref()
    }

    /// Whether the payload is of the given concrete type
    pub fn is<I: Any>(&self) -> bool {
        self.payload.is::<I>()
    }

    /// `TypeId` of the concrete payload
    pub fn payload_type_id(&self) -> TypeId {
        self.payload.as_ref().type_id()
    }
}

impl fmt::Debug for ContactInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactInfo")
            .field("payload_type_id", &self.payload_type_id())
            .finish()
    }
}
