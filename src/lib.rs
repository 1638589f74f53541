//! # Lockstep Physics
//!
//! **Deterministic 16.16 Fixed-Point Rigid-Body Physics**
//!
//! A physics core for real-time combat games running lockstep multiplayer:
//! every client simulates the same steps from the same inputs and compares
//! checksums, so every result must be bit-identical across CPUs and builds.
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **Fixed-point math** | Q16.16 scalar, vectors and quaternions; no floats in the hot path |
//! | **Body store** | Dense array plus stable ids with swap-remove and id reuse |
//! | **Broad phase** | Uniform grid rebuilt every step, canonical sorted pairs |
//! | **Narrow phase** | Sphere, box and capsule pair tests, symmetric with fixed tie-breaks |
//! | **Resolution** | Sequential impulses with restitution, friction and positional correction |
//! | **Fixed timestep** | Integer microsecond accumulator with a max-steps clamp |
//! | **Determinism tooling** | State checksums, byte snapshots, replay logs |
//!
//! ## Design Principles
//!
//! - **Deterministic order**: every stage walks bodies in dense-array order;
//!   no hash map is ever iterated
//! - **Ids, not pointers**: gameplay code holds `u32` ids; 0 is never a body
//! - **Queued mutation**: forces, impulses and teleports apply at the start
//!   of the next step, in call order
//! - **no_std compatible**: only `alloc` is required
//!
//! ## Quick Start
//!
//! ```rust
//! use lockstep_physics::prelude::*;
//!
//! let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
//!
//! let floor = physics.create_body(&RigidBodySpec::fixed(
//!     Vec3Fix::from_int(0, -1, 0),
//!     Shape::cuboid(Vec3Fix::from_int(20, 1, 20)),
//! ));
//! let ball = physics.create_body(
//!     &RigidBodySpec::dynamic(Vec3Fix::from_int(0, 10, 0), Shape::sphere(Fixed::HALF), Fixed::ONE)
//!         .with_restitution(Fixed::from_ratio(8, 10)),
//! );
//! assert!(floor != 0 && ball != 0);
//!
//! // Feed variable frame times; the engine runs whole 1/120 s steps
//! for _ in 0..60 {
//!     physics.update(1.0 / 60.0);
//! }
//! let checksum = physics.checksum(); // compare with peers
//! # let _ = checksum;
//! ```
//!
//! ## Queries
//!
//! ```rust
//! use lockstep_physics::prelude::*;
//!
//! let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
//! let target = physics.create_body(&RigidBodySpec::fixed(
//!     Vec3Fix::from_int(5, 0, 0),
//!     Shape::sphere(Fixed::ONE),
//! ));
//!
//! let hits = physics.raycast(Vec3Fix::ZERO, Vec3Fix::UNIT_X, Fixed::from_int(10));
//! assert_eq!(hits, [target]);
//!
//! let nearby = physics.sphere_cast(Vec3Fix::from_int(5, 2, 0), Fixed::from_int(2));
//! assert_eq!(nearby, [target]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod body;
pub mod collider;
pub mod collision;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod force;
pub mod integrator;
pub mod manager;
pub mod math;
pub mod query;
pub mod raycast;
pub mod replay;
pub mod rng;
pub mod shape;
pub mod sleeping;
pub mod snapshot;
pub mod spatial;
pub mod store;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::body::{BodyType, Material, RigidBody, RigidBodySpec};
    pub use crate::collider::Contact;
    pub use crate::collision::CollisionStats;
    pub use crate::command::Command;
    pub use crate::config::PhysicsConfig;
    pub use crate::error::PhysicsError;
    pub use crate::event::{ContactEvent, ContactEventType, TriggerEvent};
    pub use crate::filter::{layers, CollisionFilter};
    pub use crate::force::{ForceField, ForceFieldInstance};
    pub use crate::manager::{PhysicsManager, StepStats};
    pub use crate::math::{Fixed, QuatFix, Vec2Fix, Vec3Fix};
    pub use crate::query::OverlapResult;
    pub use crate::raycast::RayHit;
    pub use crate::replay::ReplayLog;
    pub use crate::rng::DeterministicRng;
    pub use crate::shape::{Shape, AABB};
    pub use crate::sleeping::SleepConfig;
    pub use crate::snapshot::StateChecksum;
}

// Re-export main types at crate root
pub use prelude::*;
