//! Mutation Commands
//!
//! External mutations (forces, impulses, velocity and position writes) are
//! queued between steps and applied at the start of the next step in call
//! order, so a step's outcome depends only on the state it starts from and
//! its command list. The same list is what a replay or a lockstep input
//! packet carries.

use crate::math::Vec3Fix;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// One queued mutation of a body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Add `force * inverse_mass` to acceleration for one step
    ApplyForce { id: u32, force: Vec3Fix },
    /// Add `impulse * inverse_mass` to velocity once
    ApplyImpulse { id: u32, impulse: Vec3Fix },
    /// Overwrite velocity (spawn/teleport use; ignored for static bodies)
    SetVelocity { id: u32, velocity: Vec3Fix },
    /// Overwrite position (teleport)
    SetPosition { id: u32, position: Vec3Fix },
}

impl Command {
    /// Target body id
    #[inline]
    pub fn target(&self) -> u32 {
        match *self {
            Self::ApplyForce { id, .. }
            | Self::ApplyImpulse { id, .. }
            | Self::SetVelocity { id, .. }
            | Self::SetPosition { id, .. } => id,
        }
    }

    /// Apply to the store. Every command wakes its target.
    ///
    /// Returns `false` if the target no longer exists.
    pub fn apply(&self, store: &mut BodyStore) -> bool {
        let Some(body) = store.get_mut(self.target()) else {
            log::trace!("command for missing body {} skipped", self.target());
            return false;
        };
        body.wake();
        match *self {
            Self::ApplyForce { force, .. } => body.apply_force(force),
            Self::ApplyImpulse { impulse, .. } => body.apply_impulse(impulse),
            Self::SetVelocity { velocity, .. } => {
                if !body.is_static() {
                    body.velocity = velocity;
                }
            }
            Self::SetPosition { position, .. } => body.position = position,
        }
        true
    }
}

/// Commands waiting for the next step, in call order
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command
    #[inline]
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Commands queued so far
    #[inline]
    pub fn pending(&self) -> &[Command] {
        &self.pending
    }

    /// Number of queued commands
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply and remove every queued command in call order.
    ///
    /// Returns the applied commands (missing targets included) so callers
    /// can record them.
    pub fn flush(&mut self, store: &mut BodyStore) -> Vec<Command> {
        let commands = core::mem::take(&mut self.pending);
        let applied = commands.iter().filter(|c| c.apply(store)).count();
        if applied != commands.len() {
            log::trace!("{} of {} commands had no target", commands.len() - applied, commands.len());
        }
        commands
    }

    /// Drop queued commands aimed at `id`. Returns how many were dropped.
    pub fn drop_target(&mut self, id: u32) -> usize {
        let before = self.pending.len();
        self.pending.retain(|c| c.target() != id);
        before - self.pending.len()
    }

    /// Drop every queued command
    #[inline]
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
