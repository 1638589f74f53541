//! Force Fields
//!
//! World hazards and environmental effects that push bodies every step:
//! radial attractors (gravity wells, vortex pulls), radial repulsors
//! (explosions held over time) and directional wind.
//!
//! Fields act only on awake dynamic bodies. Their contribution is a force,
//! so it is scaled by inverse mass into the step's acceleration before
//! integration.

use crate::body::RigidBody;
use crate::math::{Fixed, Vec3Fix};
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Radial fields are ignored closer than sqrt of this (0.01 in Q32.32)
const MIN_DIST_SQ_WIDE: i128 = (1i128 << 32) / 100;

/// Inverse-square falloff is clamped to this value
const MAX_FALLOFF: Fixed = Fixed::from_int(100);

/// Force field type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceField {
    /// Pulls bodies toward `center` with inverse-square falloff
    RadialAttract {
        /// Attractor position
        center: Vec3Fix,
        /// Force at unit distance
        strength: Fixed,
        /// Bodies farther than this are unaffected (0 = unbounded)
        radius: Fixed,
    },
    /// Pushes bodies away from `center` with inverse-square falloff
    RadialRepel {
        /// Repulsor position
        center: Vec3Fix,
        /// Force at unit distance
        strength: Fixed,
        /// Bodies farther than this are unaffected (0 = unbounded)
        radius: Fixed,
    },
    /// Constant push along a direction
    Wind {
        /// Push direction (normalized on use)
        direction: Vec3Fix,
        /// Force magnitude
        strength: Fixed,
    },
}

/// A force field with optional body filter
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceFieldInstance {
    /// The force field definition
    pub field: ForceField,
    /// If Some, only affects bodies with these ids. If None, affects all bodies.
    pub affected_bodies: Option<Vec<u32>>,
    /// Whether this field is active
    pub enabled: bool,
}

impl ForceFieldInstance {
    /// Create a new force field instance affecting all bodies
    #[inline]
    #[must_use]
    pub fn new(field: ForceField) -> Self {
        Self {
            field,
            affected_bodies: None,
            enabled: true,
        }
    }

    /// Restrict this field to only affect specific bodies
    #[must_use]
    pub fn with_affected_bodies(mut self, ids: Vec<u32>) -> Self {
        self.affected_bodies = Some(ids);
        self
    }

    /// Check if this field affects a given body
    #[inline]
    fn affects(&self, id: u32) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.affected_bodies {
            None => true,
            Some(list) => list.contains(&id),
        }
    }
}

/// Radial force of magnitude `strength * min(1/d², 100)` along `delta`
fn radial(delta: Vec3Fix, strength: Fixed, radius: Fixed) -> Vec3Fix {
    let dist_sq = delta.length_squared_wide();
    if dist_sq <= MIN_DIST_SQ_WIDE {
        return Vec3Fix::ZERO;
    }
    if radius.is_positive() && dist_sq > radius.raw as i128 * radius.raw as i128 {
        return Vec3Fix::ZERO;
    }
    // 1.0 (Q16.16) / d² (Q32.32) = 2^48 / d²
    let falloff_raw = ((1i128 << 48) / dist_sq).min(MAX_FALLOFF.raw as i128);
    let falloff = Fixed::from_raw(falloff_raw as i32);
    delta.normalize() * strength.saturating_mul(falloff)
}

/// Compute the force a field exerts on a body
#[must_use]
pub fn compute_force(field: &ForceField, body: &RigidBody) -> Vec3Fix {
    match *field {
        ForceField::RadialAttract {
            center,
            strength,
            radius,
        } => radial(center - body.position, strength, radius),
        ForceField::RadialRepel {
            center,
            strength,
            radius,
        } => radial(body.position - center, strength, radius),
        ForceField::Wind {
            direction,
            strength,
        } => direction.normalize() * strength,
    }
}

/// Accumulate every enabled field's force into awake dynamic bodies.
pub fn apply_force_fields(fields: &[ForceFieldInstance], store: &mut BodyStore) {
    if fields.is_empty() {
        return;
    }
    store.for_each_mut(|body| {
        if !body.should_simulate() {
            return;
        }
        let mut total_force = Vec3Fix::ZERO;
        for instance in fields {
            if instance.affects(body.id) {
                total_force += compute_force(&instance.field, body);
            }
        }
        body.apply_force(total_force);
    });
}
