//! Rigid Body Store
//!
//! Dense array of bodies plus an id → index slot table.
//!
//! - Iteration always follows the dense array (insertion order, modified
//!   only by swap-remove). Every simulation stage walks bodies this way.
//! - Ids are in `1..=capacity`. The slot table is indexed directly by id,
//!   so lookups are O(1) without hashing.
//! - Freed ids are reused first-in first-out, and only after destruction.

use crate::body::{RigidBody, RigidBodySpec};
use crate::error::PhysicsError;

#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;
#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::VecDeque;

/// Owner of every live body
#[derive(Clone, Debug)]
pub struct BodyStore {
    bodies: Vec<RigidBody>,
    /// `slots[id]` = dense index of the body with that id
    slots: Vec<Option<u32>>,
    free_ids: VecDeque<u32>,
    next_id: u32,
    capacity: usize,
}

impl BodyStore {
    /// Create an empty store holding at most `capacity` bodies
    pub fn new(capacity: usize) -> Self {
        Self {
            bodies: Vec::with_capacity(capacity),
            slots: vec![None; capacity + 1],
            free_ids: VecDeque::new(),
            next_id: 1,
            capacity,
        }
    }

    /// Validate `spec`, assign an id and append the body.
    pub fn insert(&mut self, spec: &RigidBodySpec) -> Result<u32, PhysicsError> {
        if self.bodies.len() >= self.capacity {
            return Err(PhysicsError::CapacityExceeded {
                resource: "bodies",
                limit: self.capacity,
            });
        }
        // Validate before consuming an id
        let mut body = RigidBody::from_spec(0, spec)?;
        let id = self.allocate_id()?;
        body.id = id;
        self.slots[id as usize] = Some(self.bodies.len() as u32);
        self.bodies.push(body);
        Ok(id)
    }

    fn allocate_id(&mut self) -> Result<u32, PhysicsError> {
        if let Some(id) = self.free_ids.pop_front() {
            return Ok(id);
        }
        if self.next_id as usize > self.capacity {
            return Err(PhysicsError::CapacityExceeded {
                resource: "body ids",
                limit: self.capacity,
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    /// Swap-remove a body. Unknown ids return `None`.
    pub fn remove(&mut self, id: u32) -> Option<RigidBody> {
        let index = self.index_of(id)?;
        let removed = self.bodies.swap_remove(index);
        if let Some(moved) = self.bodies.get(index) {
            self.slots[moved.id as usize] = Some(index as u32);
        }
        self.slots[id as usize] = None;
        self.free_ids.push_back(id);
        Some(removed)
    }

    /// Dense index of a live id
    #[inline]
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.slots
            .get(id as usize)
            .copied()
            .flatten()
            .map(|index| index as usize)
    }

    /// Check if an id is live
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.index_of(id).is_some()
    }

    /// Get body by id
    #[inline]
    pub fn get(&self, id: u32) -> Option<&RigidBody> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    /// Get mutable body by id
    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut RigidBody> {
        let index = self.index_of(id)?;
        self.bodies.get_mut(index)
    }

    /// Two distinct bodies at once
    pub fn get_pair_mut(&mut self, a: u32, b: u32) -> Option<(&mut RigidBody, &mut RigidBody)> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (lo, hi) = self.bodies.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.bodies.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    /// Visit every body mutably in dense-array order
    pub fn for_each_mut<F: FnMut(&mut RigidBody)>(&mut self, mut f: F) {
        for body in &mut self.bodies {
            f(body);
        }
    }

    /// Iterate bodies in dense-array order
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, RigidBody> {
        self.bodies.iter()
    }

    /// Bodies as a slice in dense-array order
    #[inline]
    pub fn as_slice(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Number of live bodies
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if no bodies are live
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Maximum number of live bodies
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every body and restart id allocation from 1
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.free_ids.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Fixed, Vec3Fix};
    use crate::shape::Shape;

    fn spec_at(x: i32) -> RigidBodySpec {
        RigidBodySpec::dynamic(Vec3Fix::from_int(x, 0, 0), Shape::sphere(Fixed::HALF), Fixed::ONE)
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut store = BodyStore::new(4);
        assert_eq!(store.insert(&spec_at(0)).unwrap(), 1);
        assert_eq!(store.insert(&spec_at(1)).unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(0));
    }

    #[test]
    fn test_swap_remove_keeps_lookup_valid() {
        let mut store = BodyStore::new(4);
        let a = store.insert(&spec_at(0)).unwrap();
        let b = store.insert(&spec_at(1)).unwrap();
        let c = store.insert(&spec_at(2)).unwrap();

        let removed = store.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert!(store.get(a).is_none());
        assert_eq!(store.get(c).unwrap().position, Vec3Fix::from_int(2, 0, 0));
        assert_eq!(store.get(b).unwrap().position, Vec3Fix::from_int(1, 0, 0));
        // c moved into slot 0
        assert_eq!(store.index_of(c), Some(0));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = BodyStore::new(2);
        let a = store.insert(&spec_at(0)).unwrap();
        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
        assert!(store.remove(999).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_exhaustion() {
        let mut store = BodyStore::new(2);
        store.insert(&spec_at(0)).unwrap();
        store.insert(&spec_at(1)).unwrap();
        assert!(matches!(
            store.insert(&spec_at(2)),
            Err(PhysicsError::CapacityExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn test_ids_reused_fifo_after_destroy() {
        let mut store = BodyStore::new(3);
        let a = store.insert(&spec_at(0)).unwrap();
        let b = store.insert(&spec_at(1)).unwrap();
        let c = store.insert(&spec_at(2)).unwrap();
        store.remove(b);
        store.remove(a);
        assert_eq!(store.insert(&spec_at(3)).unwrap(), b);
        assert_eq!(store.insert(&spec_at(4)).unwrap(), a);
        assert!(store.contains(c));
    }

    #[test]
    fn test_invalid_spec_does_not_consume_id() {
        let mut store = BodyStore::new(2);
        let bad = RigidBodySpec::dynamic(Vec3Fix::ZERO, Shape::sphere(Fixed::ONE), Fixed::ZERO);
        assert!(store.insert(&bad).is_err());
        assert_eq!(store.insert(&spec_at(0)).unwrap(), 1);
    }

    #[test]
    fn test_get_pair_mut() {
        let mut store = BodyStore::new(3);
        let a = store.insert(&spec_at(0)).unwrap();
        let b = store.insert(&spec_at(5)).unwrap();
        let (ba, bb) = store.get_pair_mut(b, a).unwrap();
        assert_eq!(ba.id, b);
        assert_eq!(bb.id, a);
        assert!(store.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut store = BodyStore::new(8);
        for x in 0..5 {
            store.insert(&spec_at(x)).unwrap();
        }
        let ids: Vec<u32> = store.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let mut visited = Vec::new();
        store.for_each_mut(|b| visited.push(b.id));
        assert_eq!(visited, ids);
    }

    #[test]
    fn test_clear_restarts_ids() {
        let mut store = BodyStore::new(2);
        store.insert(&spec_at(0)).unwrap();
        store.insert(&spec_at(1)).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.insert(&spec_at(0)).unwrap(), 1);
    }
}
