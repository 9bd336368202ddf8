//! Collision layer system for filtering collision detection
//!
//! Layer masks are the broad phase of this core: two bodies are only
//! handed to the narrow-phase dispatcher when their masks intersect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// 64-bit collision layer bitmask.
///
/// Bit `n` set means the owner belongs to (and observes) layer `n`.
/// Filtering between two collidables is symmetric: a pair is eligible for
/// narrow-phase testing when the two masks share at least one set bit.
/// One-directional setups are expressed by leaving bits out of one side's
/// mask.
///
/// # Example
/// ```
/// use sim_engine::physics::LayerMask;
///
/// let mut projectiles = LayerMask::NONE;
/// projectiles.set_bit(3, true);
///
/// let everything = LayerMask::ALL;
/// assert!(projectiles.get_bit(3));
/// assert!(projectiles.intersects(everything));
/// assert!(!projectiles.intersects(LayerMask::NONE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(u64);

impl LayerMask {
    /// Mask with no layers set; never intersects anything
    pub const NONE: Self = Self(0);

    /// Mask with every layer set; intersects any non-empty mask
    pub const ALL: Self = Self(u64::MAX);

    /// Build a mask from a raw 64-bit value
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw 64-bit value of this mask
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Mask with exactly one layer set
    ///
    /// # Panics
    /// Panics if `index` is 64 or greater.
    pub fn single(index: u32) -> Self {
        assert!(index < 64, "layer index {index} out of range");
        Self(1u64 << index)
    }

    /// Set or clear the layer bit at `index`
    ///
    /// # Panics
    /// Panics if `index` is 64 or greater.
    pub fn set_bit(&mut self, index: u32, value: bool) {
        assert!(index < 64, "layer index {index} out of range");
        if value {
            self.0 |= 1u64 << index;
        } else {
            self.0 &= !(1u64 << index);
        }
    }

    /// Whether the layer bit at `index` is set.
    ///
    /// The masked value is tested for non-zero; comparing against the
    /// literal `1` would misreport every bit above index 0.
    ///
    /// # Panics
    /// Panics if `index` is 64 or greater.
    pub fn get_bit(self, index: u32) -> bool {
        assert!(index < 64, "layer index {index} out of range");
        self.0 & (1u64 << index) != 0
    }

    /// Whether this mask shares at least one layer with `other`
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether two bodies' masks make them eligible for narrow-phase
    /// testing (symmetric AND-intersection)
    pub const fn should_collide(a: Self, b: Self) -> bool {
        a.intersects(b)
    }

    /// Whether no layer is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    /// Bodies observe every layer unless restricted
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for LayerMask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for LayerMask {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<u64> for LayerMask {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<LayerMask> for u64 {
    fn from(mask: LayerMask) -> Self {
        mask.0
    }
}

impl fmt::Binary for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}
