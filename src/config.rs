//! Physics Configuration
//!
//! All tunables of a [`PhysicsManager`](crate::manager::PhysicsManager) in
//! one plain struct. Build it with `Default` plus struct update syntax and
//! check it with [`PhysicsConfig::validate`]; every client in a lockstep
//! session must use a bit-identical configuration.
//!
//! ```
//! use lockstep_physics::config::PhysicsConfig;
//! use lockstep_physics::math::Fixed;
//!
//! let config = PhysicsConfig {
//!     max_bodies: 64,
//!     cell_size: Fixed::from_int(4),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::PhysicsError;
use crate::math::{Fixed, Vec3Fix};
use crate::shape::AABB;
use crate::sleeping::SleepConfig;

/// Timestep of 1/120 s in microseconds
pub const DEFAULT_TIMESTEP_MICROS: u32 = 8_333;

/// Default body capacity
pub const DEFAULT_MAX_BODIES: usize = 128;

/// Largest accepted body capacity
pub const MAX_BODIES_LIMIT: usize = 65_536;

/// Default per-step event buffer size
pub const DEFAULT_MAX_EVENTS: usize = 256;

/// Engine configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsConfig {
    /// Gravity acceleration (default: -9.81 on Y)
    pub gravity: Vec3Fix,
    /// Fixed step length in microseconds
    pub timestep_micros: u32,
    /// Maximum number of live bodies
    pub max_bodies: usize,
    /// Maximum steps per `update` call; leftover time is discarded
    pub max_steps_per_update: u32,
    /// Broad-phase cell size
    pub cell_size: Fixed,
    /// Speed clamp applied after drag
    pub max_velocity: Fixed,
    /// Optional arena bounds; bodies are clamped inside
    pub world_bounds: Option<AABB>,
    /// Sleep policy
    pub sleep: SleepConfig,
    /// Penetration allowed before positional correction kicks in
    pub contact_slop: Fixed,
    /// Fraction of excess penetration corrected per step
    pub correction_percent: Fixed,
    /// Capacity of the per-step event buffer
    pub max_events: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3Fix::new(Fixed::ZERO, Fixed::from_ratio(-981, 100), Fixed::ZERO),
            timestep_micros: DEFAULT_TIMESTEP_MICROS,
            max_bodies: DEFAULT_MAX_BODIES,
            max_steps_per_update: 4,
            cell_size: Fixed::from_int(2),
            max_velocity: Fixed::from_int(50),
            world_bounds: None,
            sleep: SleepConfig::default(),
            contact_slop: Fixed::from_ratio(1, 100),
            correction_percent: Fixed::from_ratio(8, 10),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl PhysicsConfig {
    /// Step length as a fixed-point number of seconds
    #[inline]
    pub fn dt(&self) -> Fixed {
        Fixed::from_micros(self.timestep_micros as i64)
    }

    /// Check every parameter's range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fail = |reason| Err(PhysicsError::InvalidConfiguration { reason });
        if self.timestep_micros == 0 {
            return fail("timestep_micros must be > 0");
        }
        if self.dt().is_zero() {
            return fail("timestep_micros is below fixed-point resolution");
        }
        if self.max_bodies == 0 || self.max_bodies > MAX_BODIES_LIMIT {
            return fail("max_bodies must be in 1..=65536");
        }
        if self.max_steps_per_update == 0 {
            return fail("max_steps_per_update must be > 0");
        }
        if !self.cell_size.is_positive() {
            return fail("cell_size must be > 0");
        }
        if !self.max_velocity.is_positive() {
            return fail("max_velocity must be > 0");
        }
        if let Some(bounds) = self.world_bounds {
            if bounds.min.x >= bounds.max.x || bounds.min.y >= bounds.max.y || bounds.min.z >= bounds.max.z {
                return fail("world_bounds min must be below max on every axis");
            }
        }
        if self.sleep.linear_threshold.is_negative() {
            return fail("sleep threshold must be >= 0");
        }
        if self.contact_slop.is_negative() {
            return fail("contact_slop must be >= 0");
        }
        if self.correction_percent.is_negative() || self.correction_percent > Fixed::ONE {
            return fail("correction_percent must be in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dt().raw, 546);
        assert_eq!(config.gravity.y.raw, -642_908);
    }

    #[test]
    fn test_rejects_zero_timestep() {
        let config = PhysicsConfig {
            timestep_micros: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let config = PhysicsConfig {
            cell_size: Fixed::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = PhysicsConfig {
            world_bounds: Some(AABB::new(Vec3Fix::from_int(10, 0, 0), Vec3Fix::from_int(-10, 10, 10))),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_correction_above_one() {
        let config = PhysicsConfig {
            correction_percent: Fixed::from_int(2),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_capacity() {
        let none = PhysicsConfig {
            max_bodies: 0,
            ..Default::default()
        };
        let huge = PhysicsConfig {
            max_bodies: MAX_BODIES_LIMIT + 1,
            ..Default::default()
        };
        assert!(none.validate().is_err());
        assert!(huge.validate().is_err());
    }
}
