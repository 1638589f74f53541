//! Force Integrator
//!
//! Semi-implicit Euler over one fixed step, applied to every awake dynamic
//! body in store order:
//!
//! ```text
//! v += (gravity * gravity_scale + a) * dt
//! v *= 1 - drag
//! v  = clamp_length(v, max_velocity)
//! p += v * dt
//! a  = 0
//! ```
//!
//! Static, kinematic and sleeping bodies are skipped; their accumulated
//! acceleration is discarded so a force never outlives its step.

use crate::body::RigidBody;
use crate::config::PhysicsConfig;
use crate::math::{Fixed, Vec3Fix};
use crate::shape::AABB;
use crate::store::BodyStore;

/// Advance one body by `dt`. Returns `true` if the body was integrated.
pub fn integrate_body(body: &mut RigidBody, config: &PhysicsConfig, dt: Fixed) -> bool {
    if !body.should_simulate() {
        body.acceleration = Vec3Fix::ZERO;
        return false;
    }

    let accel = body.acceleration.saturating_add_scaled(config.gravity, body.gravity_scale);
    body.velocity = body.velocity.saturating_add_scaled(accel, dt);
    body.velocity *= Fixed::ONE - body.material.drag;

    if body.velocity.longer_than(config.max_velocity) {
        body.velocity = body.velocity.normalize() * config.max_velocity;
    }

    body.position += body.velocity * dt;
    body.acceleration = Vec3Fix::ZERO;

    if let Some(bounds) = config.world_bounds {
        apply_world_bounds(body, &bounds);
    }
    true
}

/// Clamp the body center into `bounds`, zeroing velocity on each axis that
/// hit a wall. A body that hit a wall is woken.
pub fn apply_world_bounds(body: &mut RigidBody, bounds: &AABB) -> bool {
    let mut hit = false;
    for axis in 0..3 {
        let p = body.position.axis(axis);
        let clamped = p.clamp(bounds.min.axis(axis), bounds.max.axis(axis));
        if clamped != p {
            body.position = body.position.with_axis(axis, clamped);
            body.velocity = body.velocity.with_axis(axis, Fixed::ZERO);
            hit = true;
        }
    }
    if hit {
        body.wake();
    }
    hit
}

/// Integrate every body in store order. Returns the number integrated.
pub fn integrate(store: &mut BodyStore, config: &PhysicsConfig) -> usize {
    let dt = config.dt();
    let mut advanced = 0;
    store.for_each_mut(|body| {
        if integrate_body(body, config, dt) {
            advanced += 1;
        }
    });
    advanced
}
