//! Sleeping
//!
//! Bodies whose speed stays below a threshold for a sustained period are
//! put to sleep: velocity and acceleration are forced to exact zero and the
//! integrator skips them until something wakes them.
//!
//! Wake sources are applied commands (force, impulse, velocity, position)
//! and contact with a partner that is awake and moving.

use crate::body::RigidBody;
use crate::math::Fixed;
use crate::store::BodyStore;

/// Configuration for the sleeping system
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SleepConfig {
    /// Disable to keep every body awake forever
    pub enabled: bool,
    /// Speed below which a body is considered idle
    pub linear_threshold: Fixed,
    /// Idle time required before sleeping (strictly exceeded)
    pub time_to_sleep_micros: u32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            linear_threshold: Fixed::from_ratio(1, 100), // 0.01 m/s
            time_to_sleep_micros: 1_000_000,             // 1 second
        }
    }
}

/// Advance one body's sleep timer by `dt_micros`.
///
/// Returns `true` if the body fell asleep on this call.
pub fn update_sleep(body: &mut RigidBody, config: &SleepConfig, dt_micros: u32) -> bool {
    if !config.enabled || !body.should_simulate() {
        return false;
    }
    if body.velocity.shorter_than(config.linear_threshold) {
        body.sleep_timer_micros = body.sleep_timer_micros.saturating_add(dt_micros);
        if body.sleep_timer_micros > config.time_to_sleep_micros {
            body.sleep();
            return true;
        }
    } else {
        body.sleep_timer_micros = 0;
    }
    false
}

/// Advance every body's sleep timer in store order.
///
/// Returns the number of bodies that fell asleep.
pub fn update_sleep_all(store: &mut BodyStore, config: &SleepConfig, dt_micros: u32) -> usize {
    let mut fell_asleep = 0;
    store.for_each_mut(|body| {
        if update_sleep(body, config, dt_micros) {
            fell_asleep += 1;
        }
    });
    fell_asleep
}

/// A sleeping body is woken by contact only from an awake, moving partner.
#[inline]
pub fn wakes_on_contact(partner: &RigidBody, config: &SleepConfig) -> bool {
    partner.is_moving(config.linear_threshold)
}

/// Number of sleeping bodies
pub fn sleeping_count(store: &BodyStore) -> usize {
    store.iter().filter(|b| b.is_sleeping).count()
}
