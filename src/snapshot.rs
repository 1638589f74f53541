//! State Checksums and Snapshots
//!
//! Lockstep clients compare a [`StateChecksum`] after each step to detect
//! desyncs, and can save/restore the mutable per-step state of every body
//! as bytes for rollback.
//!
//! # Format
//!
//! All integers little-endian, fixed-point values as their raw `i32`:
//!
//! ```text
//! u64 step | u32 count | count x BodyState
//! BodyState = u32 id | 3 x i32 position | 3 x i32 velocity
//!           | 3 x i32 acceleration | u8 sleeping | u32 sleep_timer_micros
//! ```
//!
//! Only state that changes during a step is stored. Restoring requires the
//! same live bodies (ids, in dense order); shapes, masses and materials are
//! part of the scene, not the snapshot.

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::math::Vec3Fix;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Encoded size of one [`BodyState`]
pub const BODY_STATE_BYTES: usize = 4 + 12 * 3 + 1 + 4;

const HEADER_BYTES: usize = 8 + 4;

// ============================================================================
// Checksum
// ============================================================================

/// XOR rolling checksum over the raw integers of all bodies.
///
/// Two simulations fed identical inputs produce identical checksums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateChecksum(pub u64);

impl StateChecksum {
    /// Checksum of a body slice in dense order.
    ///
    /// XOR-rotate mixing per body with a position-dependent seed, so
    /// reordering bodies changes the result.
    pub fn from_bodies(bodies: &[RigidBody]) -> Self {
        let mut hash: u64 = 0;
        for (i, body) in bodies.iter().enumerate() {
            let mut h: u64 = ((i as u64) << 32) | body.id as u64;
            let [px, py, pz] = body.position.to_raw();
            let [vx, vy, vz] = body.velocity.to_raw();
            h ^= (px as u32 as u64).rotate_left(5);
            h ^= (py as u32 as u64).rotate_left(17);
            h ^= (pz as u32 as u64).rotate_left(29);
            h ^= (vx as u32 as u64).rotate_left(41);
            h ^= (vy as u32 as u64).rotate_left(47);
            h ^= (vz as u32 as u64).rotate_left(53);
            h ^= (body.is_sleeping as u64).rotate_left(61);
            // Avalanche (SplitMix64 finalizer)
            h = (h ^ (h >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            h = (h ^ (h >> 27)).wrapping_mul(0x94d049bb133111eb);
            h ^= h >> 31;
            hash ^= h;
        }
        Self(hash)
    }

    /// Checksum of every live body
    #[inline]
    pub fn from_store(store: &BodyStore) -> Self {
        Self::from_bodies(store.as_slice())
    }
}

// ============================================================================
// Body State
// ============================================================================

/// Per-step mutable state of one body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyState {
    pub id: u32,
    pub position: Vec3Fix,
    pub velocity: Vec3Fix,
    pub acceleration: Vec3Fix,
    pub is_sleeping: bool,
    pub sleep_timer_micros: u32,
}

impl BodyState {
    /// Capture a body's state
    pub fn from_body(body: &RigidBody) -> Self {
        Self {
            id: body.id,
            position: body.position,
            velocity: body.velocity,
            acceleration: body.acceleration,
            is_sleeping: body.is_sleeping,
            sleep_timer_micros: body.sleep_timer_micros,
        }
    }

    /// Write this state back into a body
    pub fn apply_to(&self, body: &mut RigidBody) {
        body.position = self.position;
        body.velocity = self.velocity;
        body.acceleration = self.acceleration;
        body.is_sleeping = self.is_sleeping;
        body.sleep_timer_micros = self.sleep_timer_micros;
    }

    /// Append the encoded state to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_le_bytes());
        for v in [self.position, self.velocity, self.acceleration] {
            for raw in v.to_raw() {
                out.extend_from_slice(&raw.to_le_bytes());
            }
        }
        out.push(self.is_sleeping as u8);
        out.extend_from_slice(&self.sleep_timer_micros.to_le_bytes());
    }

    /// Decode one state from the front of `data`
    pub fn read_from(data: &[u8]) -> Result<Self, PhysicsError> {
        let mut reader = Reader::new(data);
        let id = reader.u32()?;
        let position = reader.vec3()?;
        let velocity = reader.vec3()?;
        let acceleration = reader.vec3()?;
        let is_sleeping = match reader.u8()? {
            0 => false,
            1 => true,
            _ => return Err(PhysicsError::DeserializationFailed),
        };
        let sleep_timer_micros = reader.u32()?;
        Ok(Self {
            id,
            position,
            velocity,
            acceleration,
            is_sleeping,
            sleep_timer_micros,
        })
    }
}

/// Bounds-checked little-endian cursor
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], PhysicsError> {
        let end = self.offset.checked_add(N).ok_or(PhysicsError::DeserializationFailed)?;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(PhysicsError::DeserializationFailed)?;
        self.offset = end;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, PhysicsError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, PhysicsError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn u64(&mut self) -> Result<u64, PhysicsError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, PhysicsError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn vec3(&mut self) -> Result<Vec3Fix, PhysicsError> {
        Ok(Vec3Fix::from_raw([self.i32()?, self.i32()?, self.i32()?]))
    }
}

// ============================================================================
// World State
// ============================================================================

/// Serialize the state of every live body (dense order)
pub fn serialize_state(store: &BodyStore, step: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_BYTES + store.len() * BODY_STATE_BYTES);
    data.extend_from_slice(&step.to_le_bytes());
    data.extend_from_slice(&(store.len() as u32).to_le_bytes());
    for body in store.iter() {
        BodyState::from_body(body).write_to(&mut data);
    }
    data
}

/// Restore body states written by [`serialize_state`]. Returns the step
/// counter stored with them.
///
/// The buffer is fully validated before any body is touched: a count or
/// id mismatch, truncation, or trailing bytes leave `store` unchanged.
pub fn deserialize_state(store: &mut BodyStore, data: &[u8]) -> Result<u64, PhysicsError> {
    let mut reader = Reader::new(data);
    let step = reader.u64()?;
    let count = reader.u32()? as usize;
    if count != store.len() || data.len() != HEADER_BYTES + count * BODY_STATE_BYTES {
        return Err(PhysicsError::DeserializationFailed);
    }

    let states = data[HEADER_BYTES..]
        .chunks_exact(BODY_STATE_BYTES)
        .map(BodyState::read_from)
        .collect::<Result<Vec<_>, _>>()?;
    if states.iter().zip(store.iter()).any(|(s, b)| s.id != b.id) {
        return Err(PhysicsError::DeserializationFailed);
    }

    let mut states = states.into_iter();
    store.for_each_mut(|body| {
        if let Some(state) = states.next() {
            state.apply_to(body);
        }
    });
    Ok(step)
}
