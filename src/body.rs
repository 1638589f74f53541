//! Rigid Bodies
//!
//! A body is plain data: kinematic state, a material, a shape and a handful
//! of flags. Bodies are created from a [`RigidBodySpec`] which is validated
//! once; nothing is re-validated during a step.

use crate::error::PhysicsError;
use crate::filter::CollisionFilter;
use crate::math::{Fixed, Vec3Fix};
use crate::shape::{Shape, AABB};

// ============================================================================
// Body Type
// ============================================================================

/// Type of rigid body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BodyType {
    /// Moved by physics (gravity, forces, impulses, contacts)
    #[default]
    Dynamic = 0,
    /// Never moves
    Static = 1,
    /// Moved only by `set_position` / `set_velocity`, pushes dynamic bodies
    /// but is not affected by them
    Kinematic = 2,
}

// ============================================================================
// Material
// ============================================================================

/// Surface and damping coefficients
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Static friction coefficient (>= kinetic)
    pub friction_static: Fixed,
    /// Kinetic friction coefficient (>= 0)
    pub friction_kinetic: Fixed,
    /// Coefficient of restitution in [0, 1]
    pub restitution: Fixed,
    /// Per-step velocity damping in [0, 1)
    pub drag: Fixed,
}

impl Material {
    /// Default material: friction 0.5/0.3, restitution 0.5, no drag
    pub const DEFAULT: Self = Self {
        friction_static: Fixed::from_ratio(1, 2),
        friction_kinetic: Fixed::from_ratio(3, 10),
        restitution: Fixed::from_ratio(1, 2),
        drag: Fixed::ZERO,
    };

    /// Bring coefficients into their documented ranges.
    ///
    /// Restitution is clamped to [0, 1] and friction to `static >= kinetic
    /// >= 0`. Drag outside [0, 1) is rejected since no clamp keeps it
    /// meaningful.
    pub fn sanitized(self) -> Result<Self, PhysicsError> {
        if self.drag.is_negative() || self.drag >= Fixed::ONE {
            return Err(PhysicsError::InvalidMaterial {
                reason: "drag must be in [0, 1)",
            });
        }
        let friction_kinetic = self.friction_kinetic.max(Fixed::ZERO);
        Ok(Self {
            friction_static: self.friction_static.max(friction_kinetic),
            friction_kinetic,
            restitution: self.restitution.clamp(Fixed::ZERO, Fixed::ONE),
            drag: self.drag,
        })
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// Body Spec
// ============================================================================

/// Creation parameters for a rigid body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidBodySpec {
    /// Dynamic, static or kinematic
    pub body_type: BodyType,
    /// Initial position (shape center)
    pub position: Vec3Fix,
    /// Initial velocity
    pub velocity: Vec3Fix,
    /// Mass (must be > 0 for dynamic bodies)
    pub mass: Fixed,
    /// Collision shape
    pub shape: Shape,
    /// Surface and damping coefficients
    pub material: Material,
    /// Reports overlaps but never receives a collision response
    pub is_trigger: bool,
    /// Layer/mask filter
    pub filter: CollisionFilter,
    /// Gravity multiplier (1 = normal, 0 = none)
    pub gravity_scale: Fixed,
}

impl RigidBodySpec {
    /// Dynamic body with the given mass
    pub fn dynamic(position: Vec3Fix, shape: Shape, mass: Fixed) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position,
            velocity: Vec3Fix::ZERO,
            mass,
            shape,
            material: Material::DEFAULT,
            is_trigger: false,
            filter: CollisionFilter::DEFAULT,
            gravity_scale: Fixed::ONE,
        }
    }

    /// Static (immovable) body
    pub fn fixed(position: Vec3Fix, shape: Shape) -> Self {
        Self {
            body_type: BodyType::Static,
            mass: Fixed::ZERO,
            gravity_scale: Fixed::ZERO,
            ..Self::dynamic(position, shape, Fixed::ZERO)
        }
    }

    /// Kinematic body (moved by user code, not physics)
    pub fn kinematic(position: Vec3Fix, shape: Shape) -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::fixed(position, shape)
        }
    }

    /// Static trigger volume (hitbox, hazard zone)
    pub fn trigger(position: Vec3Fix, shape: Shape) -> Self {
        Self {
            is_trigger: true,
            ..Self::fixed(position, shape)
        }
    }

    /// Set initial velocity
    pub fn with_velocity(mut self, velocity: Vec3Fix) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set restitution only
    pub fn with_restitution(mut self, restitution: Fixed) -> Self {
        self.material.restitution = restitution;
        self
    }

    /// Set drag only
    pub fn with_drag(mut self, drag: Fixed) -> Self {
        self.material.drag = drag;
        self
    }

    /// Set layer/mask filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set gravity multiplier
    pub fn with_gravity_scale(mut self, scale: Fixed) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Mark as trigger
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

// ============================================================================
// Rigid Body
// ============================================================================

/// Rigid body state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidBody {
    /// Stable handle (never 0)
    pub id: u32,
    /// Dynamic, static or kinematic
    pub body_type: BodyType,
    /// Position (shape center)
    pub position: Vec3Fix,
    /// Linear velocity
    pub velocity: Vec3Fix,
    /// Accumulated acceleration for the current step (cleared after integration)
    pub acceleration: Vec3Fix,
    /// Mass
    pub mass: Fixed,
    /// Inverse mass (0 = static/kinematic/infinite mass)
    pub inverse_mass: Fixed,
    /// Surface and damping coefficients
    pub material: Material,
    /// Collision shape
    pub shape: Shape,
    /// Reports overlaps but never receives a collision response
    pub is_trigger: bool,
    /// Skipped by the integrator until woken
    pub is_sleeping: bool,
    /// Layer/mask filter
    pub filter: CollisionFilter,
    /// Gravity multiplier
    pub gravity_scale: Fixed,
    /// Time spent continuously below the sleep threshold
    pub sleep_timer_micros: u32,
}

impl RigidBody {
    /// Validate a spec and build the body it describes.
    pub fn from_spec(id: u32, spec: &RigidBodySpec) -> Result<Self, PhysicsError> {
        spec.shape.validate()?;
        let material = spec.material.sanitized()?;

        let inverse_mass = match spec.body_type {
            BodyType::Dynamic => {
                if !spec.mass.is_positive() {
                    return Err(PhysicsError::InvalidMass);
                }
                Fixed::ONE
                    .checked_div(spec.mass)
                    .ok_or(PhysicsError::InvalidMass)?
            }
            BodyType::Static | BodyType::Kinematic => Fixed::ZERO,
        };

        let velocity = match spec.body_type {
            BodyType::Static => Vec3Fix::ZERO,
            _ => spec.velocity,
        };

        Ok(Self {
            id,
            body_type: spec.body_type,
            position: spec.position,
            velocity,
            acceleration: Vec3Fix::ZERO,
            mass: spec.mass,
            inverse_mass,
            material,
            shape: spec.shape,
            is_trigger: spec.is_trigger,
            is_sleeping: false,
            filter: spec.filter,
            gravity_scale: spec.gravity_scale,
            sleep_timer_micros: 0,
        })
    }

    /// Check if body is static
    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Check if body is kinematic
    #[inline]
    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    /// Check if body is dynamic
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Dynamic and awake: the integrator advances it this step
    #[inline]
    pub fn should_simulate(&self) -> bool {
        self.is_dynamic() && !self.is_sleeping
    }

    /// Can change position this step (awake dynamic or kinematic)
    #[inline]
    pub fn can_move(&self) -> bool {
        !self.is_static() && !self.is_sleeping
    }

    /// Awake, non-static and with speed at or above `threshold`
    #[inline]
    pub fn is_moving(&self, threshold: Fixed) -> bool {
        self.can_move() && !self.velocity.shorter_than(threshold)
    }

    /// Speed (velocity magnitude)
    #[inline]
    pub fn speed(&self) -> Fixed {
        self.velocity.length()
    }

    /// World-space bounding box
    #[inline]
    pub fn aabb(&self) -> AABB {
        self.shape.aabb(self.position)
    }

    /// Wake up and restart the sleep timer
    #[inline]
    pub fn wake(&mut self) {
        self.is_sleeping = false;
        self.sleep_timer_micros = 0;
    }

    /// Put to sleep with exactly zero motion
    #[inline]
    pub fn sleep(&mut self) {
        self.is_sleeping = true;
        self.velocity = Vec3Fix::ZERO;
        self.acceleration = Vec3Fix::ZERO;
    }

    /// Accumulate `force * inverse_mass` into this step's acceleration,
    /// saturating per axis
    pub fn apply_force(&mut self, force: Vec3Fix) {
        if self.is_dynamic() {
            self.acceleration = self.acceleration.saturating_add_scaled(force, self.inverse_mass);
        }
    }

    /// Accumulate a raw acceleration (force fields, mass independent)
    pub fn apply_acceleration(&mut self, accel: Vec3Fix) {
        if self.is_dynamic() {
            self.acceleration += accel;
        }
    }

    /// Add `impulse * inverse_mass` to velocity, saturating per axis
    pub fn apply_impulse(&mut self, impulse: Vec3Fix) {
        if self.is_dynamic() {
            self.velocity = self.velocity.saturating_add_scaled(impulse, self.inverse_mass);
        }
    }
}
