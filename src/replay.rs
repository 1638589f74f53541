//! Replay Recording/Playback
//!
//! A [`ReplayLog`] is the configuration plus, for every step, the ordered
//! list of inputs issued before it (creations, destructions, queued
//! commands, force field changes) and the checksum observed after it.
//! Feeding the same inputs to a fresh [`PhysicsManager`] reproduces every
//! step bit for bit, which is what lockstep peers rely on.
//!
//! # Example
//!
//! ```
//! use lockstep_physics::prelude::*;
//!
//! let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
//! physics.start_recording().unwrap();
//! let ball = physics.create_body(&RigidBodySpec::dynamic(
//!     Vec3Fix::from_int(0, 10, 0),
//!     Shape::sphere(Fixed::HALF),
//!     Fixed::ONE,
//! ));
//! for _ in 0..30 {
//!     physics.apply_force(ball, Vec3Fix::from_int(1, 0, 0));
//!     physics.step();
//! }
//! let log = physics.stop_recording().unwrap();
//!
//! let replayed = log.replay().unwrap();
//! assert_eq!(replayed.checksum(), physics.checksum());
//! assert_eq!(log.first_divergence().unwrap(), None);
//! ```

use crate::body::RigidBodySpec;
use crate::command::Command;
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::force::ForceFieldInstance;
use crate::manager::PhysicsManager;
use crate::snapshot::StateChecksum;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// One recorded input
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplayInput {
    /// Successful `create_body` and the id it returned
    CreateBody { spec: RigidBodySpec, id: u32 },
    /// Successful `destroy_body`
    DestroyBody { id: u32 },
    /// Queued mutation
    Command(Command),
    /// `add_force_field`
    AddForceField(ForceFieldInstance),
    /// `remove_force_field` of an existing index
    RemoveForceField { index: usize },
}

/// Inputs issued before one step and the state checksum after it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayFrame {
    pub inputs: Vec<ReplayInput>,
    pub checksum: StateChecksum,
}

/// Recorded run: configuration, per-step inputs and checksums
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayLog {
    config: PhysicsConfig,
    frames: Vec<ReplayFrame>,
    /// Inputs issued after the last step
    pending: Vec<ReplayInput>,
}

impl ReplayLog {
    /// Empty log for a world built from `config`
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Append an input to the step being recorded
    #[inline]
    pub fn record(&mut self, input: ReplayInput) {
        self.pending.push(input);
    }

    /// Close the current step with the checksum observed after it
    pub fn end_step(&mut self, checksum: StateChecksum) {
        self.frames.push(ReplayFrame {
            inputs: core::mem::take(&mut self.pending),
            checksum,
        });
    }

    /// Configuration the run was recorded with
    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Recorded steps
    #[inline]
    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// Inputs issued after the last recorded step
    #[inline]
    pub fn trailing_inputs(&self) -> &[ReplayInput] {
        &self.pending
    }

    /// Number of recorded steps
    #[inline]
    pub fn step_count(&self) -> usize {
        self.frames.len()
    }

    /// Rebuild the recorded world: every step is re-run and trailing inputs
    /// are applied without stepping.
    ///
    /// Fails with [`PhysicsError::ReplayDiverged`] if an input no longer
    /// applies the way it did when recorded (a different id is assigned,
    /// a destroyed body is missing).
    pub fn replay(&self) -> Result<PhysicsManager, PhysicsError> {
        let mut physics = PhysicsManager::new(self.config)?;
        for (step, frame) in self.frames.iter().enumerate() {
            apply_inputs(&mut physics, &frame.inputs, step as u64)?;
            physics.step();
        }
        apply_inputs(&mut physics, &self.pending, self.frames.len() as u64)?;
        Ok(physics)
    }

    /// Re-run the log and compare checksums step by step.
    ///
    /// Returns the index of the first step whose checksum differs from the
    /// recorded one, or `None` if the whole run reproduces.
    pub fn first_divergence(&self) -> Result<Option<u64>, PhysicsError> {
        let mut physics = PhysicsManager::new(self.config)?;
        for (step, frame) in self.frames.iter().enumerate() {
            apply_inputs(&mut physics, &frame.inputs, step as u64)?;
            physics.step();
            if physics.checksum() != frame.checksum {
                log::debug!("replay checksum mismatch at step {step}");
                return Ok(Some(step as u64));
            }
        }
        Ok(None)
    }
}

fn apply_inputs(physics: &mut PhysicsManager, inputs: &[ReplayInput], step: u64) -> Result<(), PhysicsError> {
    let diverged = PhysicsError::ReplayDiverged { step };
    for input in inputs {
        match input {
            ReplayInput::CreateBody { spec, id } => {
                if physics.try_create_body(spec).ok() != Some(*id) {
                    return Err(diverged);
                }
            }
            ReplayInput::DestroyBody { id } => {
                if !physics.destroy_body(*id) {
                    return Err(diverged);
                }
            }
            ReplayInput::Command(command) => physics.queue_command(*command),
            ReplayInput::AddForceField(field) => {
                physics.add_force_field(field.clone());
            }
            ReplayInput::RemoveForceField { index } => {
                if physics.remove_force_field(*index).is_none() {
                    return Err(diverged);
                }
            }
        }
    }
    Ok(())
}
