//! Physics Error Types
//!
//! Unified error type for the lockstep physics core. Fallible internal
//! operations (body creation, configuration validation, snapshot restore)
//! return `Result<T, PhysicsError>`; the sentinel-style public API
//! (`create_body` returning id 0) is a thin wrapper over them.

use core::fmt;

/// Unified error type for physics operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A dynamic body was created with zero or negative mass.
    InvalidMass,
    /// A shape dimension (radius, half extent, height) was not strictly positive.
    InvalidShape {
        /// Which dimension was rejected
        reason: &'static str,
    },
    /// A material coefficient could not be brought into range.
    InvalidMaterial {
        /// Which coefficient was rejected
        reason: &'static str,
    },
    /// A capacity limit was exceeded (bodies, id space).
    CapacityExceeded {
        /// What resource was exhausted
        resource: &'static str,
        /// The limit that was exceeded
        limit: usize,
    },
    /// Invalid configuration parameter.
    InvalidConfiguration {
        /// Description of the invalid configuration
        reason: &'static str,
    },
    /// State deserialization failed (corrupted or incompatible data).
    DeserializationFailed,
    /// No live body carries this id.
    BodyNotFound {
        /// The id that was looked up
        id: u32,
    },
    /// A replayed input produced a different result than when recorded.
    ReplayDiverged {
        /// Step index at which the replay diverged
        step: u64,
    },
    /// Recording can only start from an empty world at step 0.
    RecordingUnavailable,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMass => write!(f, "dynamic body requires mass > 0"),
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
            Self::InvalidMaterial { reason } => write!(f, "invalid material: {reason}"),
            Self::CapacityExceeded { resource, limit } => {
                write!(f, "{resource} capacity exceeded (limit={limit})")
            }
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::DeserializationFailed => write!(f, "state deserialization failed"),
            Self::BodyNotFound { id } => write!(f, "no body with id {id}"),
            Self::ReplayDiverged { step } => write!(f, "replay diverged at step {step}"),
            Self::RecordingUnavailable => write!(f, "recording must start from an empty world"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhysicsError {}

// ============================================================================
// Tests
// ============================================================================
