//! Physics Manager
//!
//! The single host-owned entry point: owns the body store, the broad-phase
//! grid, the collision and event state and the command queue, and runs the
//! fixed-timestep loop.
//!
//! # Step Order
//!
//! ```text
//! commands -> force fields -> integrate -> grid -> collide -> sleep -> events
//! ```
//!
//! Every stage walks bodies in dense-array order. Mutations issued between
//! steps (`apply_force`, `apply_impulse`, `set_velocity`, `set_position`)
//! are queued and applied at the start of the next step in call order;
//! `create_body` and `destroy_body` take effect immediately.
//!
//! # Example
//!
//! ```
//! use lockstep_physics::prelude::*;
//!
//! let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
//! let ground = physics.create_body(&RigidBodySpec::fixed(
//!     Vec3Fix::from_int(0, -1, 0),
//!     Shape::cuboid(Vec3Fix::from_int(50, 1, 50)),
//! ));
//! let ball = physics.create_body(&RigidBodySpec::dynamic(
//!     Vec3Fix::from_int(0, 5, 0),
//!     Shape::sphere(Fixed::HALF),
//!     Fixed::ONE,
//! ));
//! assert!(ground != 0 && ball != 0);
//!
//! physics.update(1.0 / 60.0);
//! assert!(physics.get_body(ball).unwrap().position.y < Fixed::from_int(5));
//! ```

use crate::body::{RigidBody, RigidBodySpec};
use crate::collider::Contact;
use crate::collision::{CollisionManager, CollisionStats};
use crate::command::{Command, CommandQueue};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::event::EventCollector;
use crate::force::{apply_force_fields, ForceFieldInstance};
use crate::integrator::integrate;
use crate::math::{Fixed, Vec3Fix};
use crate::query::{overlap_sphere, sphere_cast, OverlapResult};
use crate::raycast::{raycast_all, Ray, RayHit};
use crate::replay::{ReplayInput, ReplayLog};
use crate::sleeping::{sleeping_count, update_sleep_all};
use crate::snapshot::{deserialize_state, serialize_state, StateChecksum};
use crate::spatial::SpatialGrid;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Counters of the last step plus running totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Steps run since creation or the last reset
    pub steps: u64,
    /// Live bodies
    pub bodies: usize,
    /// Bodies advanced by the integrator in the last step
    pub integrated: usize,
    /// Bodies asleep after the last step
    pub sleeping: usize,
    /// Commands applied in the last step
    pub commands: usize,
    /// Collision counters of the last step
    pub collision: CollisionStats,
    /// Accumulated time thrown away by the max-steps clamp
    pub discarded_micros: u64,
}

/// Deterministic physics world
pub struct PhysicsManager {
    config: PhysicsConfig,
    store: BodyStore,
    grid: SpatialGrid,
    collisions: CollisionManager,
    events: EventCollector,
    commands: CommandQueue,
    force_fields: Vec<ForceFieldInstance>,
    accumulator_micros: u64,
    stats: StepStats,
    recording: Option<ReplayLog>,
}

impl PhysicsManager {
    /// Create an empty world. Fails if the configuration does not validate.
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            store: BodyStore::new(config.max_bodies),
            grid: SpatialGrid::new(config.cell_size),
            collisions: CollisionManager::new(),
            events: EventCollector::new(config.max_events),
            commands: CommandQueue::new(),
            force_fields: Vec::new(),
            accumulator_micros: 0,
            stats: StepStats::default(),
            recording: None,
        })
    }

    /// Active configuration
    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a body, returning its id or the reason it was rejected
    pub fn try_create_body(&mut self, spec: &RigidBodySpec) -> Result<u32, PhysicsError> {
        let id = self.store.insert(spec)?;
        self.rebuild_grid();
        self.record(ReplayInput::CreateBody { spec: *spec, id });
        Ok(id)
    }

    /// Create a body. Returns 0 if the spec is invalid or the store is full.
    pub fn create_body(&mut self, spec: &RigidBodySpec) -> u32 {
        match self.try_create_body(spec) {
            Ok(id) => id,
            Err(err) => {
                log::debug!("create_body rejected: {err}");
                0
            }
        }
    }

    /// Destroy a body and drop any commands still queued for it, so a
    /// recycled id never inherits them.
    pub fn try_destroy_body(&mut self, id: u32) -> Result<(), PhysicsError> {
        self.store.remove(id).ok_or(PhysicsError::BodyNotFound { id })?;
        let dropped = self.commands.drop_target(id);
        if dropped > 0 {
            log::trace!("destroy_body({id}): dropped {dropped} queued commands");
        }
        self.rebuild_grid();
        self.record(ReplayInput::DestroyBody { id });
        Ok(())
    }

    /// Destroy a body. Unknown ids are ignored; returns whether a body was
    /// removed.
    pub fn destroy_body(&mut self, id: u32) -> bool {
        match self.try_destroy_body(id) {
            Ok(()) => true,
            Err(err) => {
                log::trace!("destroy_body: {err}");
                false
            }
        }
    }

    /// Drop every body, queued command and force field and restart the
    /// clock. Stops any recording.
    pub fn reset(&mut self) {
        self.store.clear();
        self.grid.clear();
        self.collisions.clear();
        self.events.clear();
        self.commands.clear();
        self.force_fields.clear();
        self.accumulator_micros = 0;
        self.stats = StepStats::default();
        if self.recording.take().is_some() {
            log::debug!("reset stopped an active recording");
        }
    }

    // ========================================================================
    // Mutation (queued)
    // ========================================================================

    /// Queue a command for the next step
    pub fn queue_command(&mut self, command: Command) {
        self.record(ReplayInput::Command(command));
        self.commands.push(command);
    }

    /// Apply a force for exactly one step
    #[inline]
    pub fn apply_force(&mut self, id: u32, force: Vec3Fix) {
        self.queue_command(Command::ApplyForce { id, force });
    }

    /// Apply an instantaneous impulse
    #[inline]
    pub fn apply_impulse(&mut self, id: u32, impulse: Vec3Fix) {
        self.queue_command(Command::ApplyImpulse { id, impulse });
    }

    /// Overwrite a body's velocity (spawn/teleport)
    #[inline]
    pub fn set_velocity(&mut self, id: u32, velocity: Vec3Fix) {
        self.queue_command(Command::SetVelocity { id, velocity });
    }

    /// Teleport a body
    #[inline]
    pub fn set_position(&mut self, id: u32, position: Vec3Fix) {
        self.queue_command(Command::SetPosition { id, position });
    }

    /// Commands waiting for the next step
    #[inline]
    pub fn pending_commands(&self) -> &[Command] {
        self.commands.pending()
    }

    // ========================================================================
    // Force Fields
    // ========================================================================

    /// Add a force field; returns its index
    pub fn add_force_field(&mut self, field: ForceFieldInstance) -> usize {
        self.record(ReplayInput::AddForceField(field.clone()));
        self.force_fields.push(field);
        self.force_fields.len() - 1
    }

    /// Remove the force field at `index`; later fields shift down
    pub fn remove_force_field(&mut self, index: usize) -> Option<ForceFieldInstance> {
        if index >= self.force_fields.len() {
            return None;
        }
        self.record(ReplayInput::RemoveForceField { index });
        Some(self.force_fields.remove(index))
    }

    /// Active force fields in application order
    #[inline]
    pub fn force_fields(&self) -> &[ForceFieldInstance] {
        &self.force_fields
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advance by a variable frame time in seconds. Returns the number of
    /// fixed steps run.
    ///
    /// The float is converted to whole microseconds once, at the boundary;
    /// nothing downstream sees floating point. Non-positive or NaN input
    /// runs nothing.
    pub fn update(&mut self, dt_seconds: f32) -> u32 {
        if dt_seconds.is_nan() || dt_seconds <= 0.0 {
            return 0;
        }
        self.update_micros((dt_seconds * 1_000_000.0) as u32)
    }

    /// Advance by `micros` microseconds of frame time.
    ///
    /// Runs at most `max_steps_per_update` steps; whole steps beyond that
    /// are discarded, the sub-step remainder is kept.
    pub fn update_micros(&mut self, micros: u32) -> u32 {
        let step_micros = self.config.timestep_micros as u64;
        self.accumulator_micros += micros as u64;

        let mut steps = 0;
        while self.accumulator_micros >= step_micros && steps < self.config.max_steps_per_update {
            self.step();
            self.accumulator_micros -= step_micros;
            steps += 1;
        }

        if self.accumulator_micros >= step_micros {
            let kept = self.accumulator_micros % step_micros;
            let discarded = self.accumulator_micros - kept;
            self.accumulator_micros = kept;
            self.stats.discarded_micros += discarded;
            log::debug!("step budget exhausted, discarded {discarded} us of simulation time");
        }
        steps
    }

    /// Run exactly one fixed step
    pub fn step(&mut self) {
        self.events.begin_frame();

        let commands = self.commands.flush(&mut self.store).len();
        apply_force_fields(&self.force_fields, &mut self.store);
        let integrated = integrate(&mut self.store, &self.config);

        self.rebuild_grid();
        let collision = self
            .collisions
            .detect_and_resolve(&mut self.store, &self.grid, &self.config, &mut self.events);

        update_sleep_all(&mut self.store, &self.config.sleep, self.config.timestep_micros);
        self.events.end_frame();

        // Queries between steps see post-resolution positions
        self.rebuild_grid();

        self.stats = StepStats {
            steps: self.stats.steps + 1,
            bodies: self.store.len(),
            integrated,
            sleeping: sleeping_count(&self.store),
            commands,
            collision,
            discarded_micros: self.stats.discarded_micros,
        };

        if let Some(replay) = self.recording.as_mut() {
            replay.end_step(StateChecksum::from_store(&self.store));
        }
        log::trace!(
            "step {}: {} bodies, {} integrated, {} contacts",
            self.stats.steps,
            self.stats.bodies,
            integrated,
            collision.contacts
        );
    }

    /// Steps run since creation or the last reset
    #[inline]
    pub fn step_count(&self) -> u64 {
        self.stats.steps
    }

    /// Frame time carried over to the next `update`
    #[inline]
    pub fn accumulator_micros(&self) -> u64 {
        self.accumulator_micros
    }

    /// Counters of the last step
    #[inline]
    pub fn stats(&self) -> StepStats {
        self.stats
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get body by id
    #[inline]
    pub fn get_body(&self, id: u32) -> Option<&RigidBody> {
        self.store.get(id)
    }

    /// All live bodies in dense order
    #[inline]
    pub fn bodies(&self) -> &[RigidBody] {
        self.store.as_slice()
    }

    /// Number of live bodies
    #[inline]
    pub fn body_count(&self) -> usize {
        self.store.len()
    }

    /// Ids of bodies hit by a ray, nearest first (ties by id)
    pub fn raycast(&self, origin: Vec3Fix, direction: Vec3Fix, max_distance: Fixed) -> Vec<u32> {
        self.raycast_hits(origin, direction, max_distance)
            .into_iter()
            .map(|hit| hit.body_id)
            .collect()
    }

    /// Full hit records of a ray, nearest first (ties by id)
    pub fn raycast_hits(&self, origin: Vec3Fix, direction: Vec3Fix, max_distance: Fixed) -> Vec<RayHit> {
        raycast_all(&self.store, &self.grid, &Ray::new(origin, direction), max_distance)
    }

    /// Ids of bodies overlapping a sphere, ascending
    #[inline]
    pub fn sphere_cast(&self, center: Vec3Fix, radius: Fixed) -> Vec<u32> {
        sphere_cast(&self.store, &self.grid, center, radius)
    }

    /// Bodies overlapping a sphere with their overlap depth, ascending ids
    #[inline]
    pub fn overlap_sphere(&self, center: Vec3Fix, radius: Fixed) -> Vec<OverlapResult> {
        overlap_sphere(&self.store, &self.grid, center, radius)
    }

    /// Broad-phase candidates near a point (unconfirmed, ascending ids)
    #[inline]
    pub fn query_region(&self, center: Vec3Fix, radius: Fixed) -> Vec<u32> {
        self.grid.query_region(center, radius)
    }

    /// Contacts of the last step involving `id` (triggers included)
    #[inline]
    pub fn get_contacts_for_body(&self, id: u32) -> Vec<Contact> {
        self.collisions.contacts_for_body(id)
    }

    /// All contacts of the last step, in discovery order
    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        self.collisions.contacts()
    }

    /// Contact and trigger events of the last step
    #[inline]
    pub fn events(&self) -> &EventCollector {
        &self.events
    }

    /// Mutable event access for draining
    #[inline]
    pub fn events_mut(&mut self) -> &mut EventCollector {
        &mut self.events
    }

    // ========================================================================
    // Determinism Tooling
    // ========================================================================

    /// Checksum of all body state, for cross-client comparison
    #[inline]
    pub fn checksum(&self) -> StateChecksum {
        StateChecksum::from_store(&self.store)
    }

    /// Snapshot the per-step state of every body
    pub fn save_state(&self) -> Vec<u8> {
        serialize_state(&self.store, self.stats.steps)
    }

    /// Roll back to a snapshot taken with [`save_state`](Self::save_state)
    /// on the same body set. Clears queued commands, events and carried
    /// frame time, and stops any recording.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), PhysicsError> {
        let step = deserialize_state(&mut self.store, data)?;
        self.stats.steps = step;
        self.commands.clear();
        self.collisions.clear();
        self.events.clear();
        self.accumulator_micros = 0;
        self.rebuild_grid();
        if self.recording.take().is_some() {
            log::debug!("load_state stopped an active recording");
        }
        Ok(())
    }

    /// Start recording every input into a [`ReplayLog`].
    ///
    /// Only possible on an empty world at step 0, so the log fully
    /// describes the run.
    pub fn start_recording(&mut self) -> Result<(), PhysicsError> {
        if !self.store.is_empty()
            || self.stats.steps != 0
            || !self.force_fields.is_empty()
            || !self.commands.is_empty()
        {
            return Err(PhysicsError::RecordingUnavailable);
        }
        self.recording = Some(ReplayLog::new(self.config));
        Ok(())
    }

    /// Stop recording and hand back the log
    pub fn stop_recording(&mut self) -> Option<ReplayLog> {
        self.recording.take()
    }

    /// Check if inputs are being recorded
    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn record(&mut self, input: ReplayInput) {
        if let Some(replay) = self.recording.as_mut() {
            replay.record(input);
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.rebuild(self.store.iter().map(|b| (b.id, b.aabb())));
    }
}
