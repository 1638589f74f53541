//! Layer/Mask Filters
//!
//! Decides, before any shape test, whether two bodies may touch at all.
//! Filtering is symmetric: both bodies must accept each other.
//!
//! # Example
//!
//! ```
//! use lockstep_physics::filter::{layers, CollisionFilter};
//!
//! let player = CollisionFilter::new(layers::PLAYER, layers::ENEMY | layers::ENVIRONMENT);
//! let enemy = CollisionFilter::new(layers::ENEMY, layers::PLAYER | layers::PROJECTILE);
//! let ghost = CollisionFilter::new(layers::PLAYER, layers::NONE);
//!
//! assert!(CollisionFilter::can_collide(&player, &enemy));
//! assert!(!CollisionFilter::can_collide(&player, &ghost));
//! ```

/// Layer membership plus the layers a body accepts contacts from.
///
/// A pair passes when each body's layer is in the other's mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionFilter {
    /// Layers this body is on
    pub layer: u32,
    /// Layers this body accepts
    pub mask: u32,
}

impl CollisionFilter {
    /// Default filter: default layer, collides with everything
    pub const DEFAULT: Self = Self {
        layer: layers::DEFAULT,
        mask: layers::ALL,
    };

    /// On no layer, accepts nothing
    pub const NONE: Self = Self {
        layer: layers::NONE,
        mask: layers::NONE,
    };

    /// Filter from raw bitmasks
    #[inline]
    pub const fn new(layer: u32, mask: u32) -> Self {
        Self { layer, mask }
    }

    /// Check if the pair passes in both directions
    #[inline]
    pub fn can_collide(a: &Self, b: &Self) -> bool {
        (a.layer & b.mask) != 0 && (b.layer & a.mask) != 0
    }
}

impl Default for CollisionFilter {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Predefined collision layers for a combat game
pub mod layers {
    /// No layer
    pub const NONE: u32        = 0;
    /// Layer of bodies created without a filter
    pub const DEFAULT: u32     = 1 << 0;
    /// Player characters
    pub const PLAYER: u32      = 1 << 1;
    /// Enemy characters
    pub const ENEMY: u32       = 1 << 2;
    /// Static level geometry
    pub const ENVIRONMENT: u32 = 1 << 3;
    /// Bullets, thrown objects
    pub const PROJECTILE: u32  = 1 << 4;
    /// Hitboxes and trigger volumes
    pub const TRIGGER: u32     = 1 << 5;
    /// Every layer
    pub const ALL: u32         = u32::MAX;
}
