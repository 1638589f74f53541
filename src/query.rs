//! Overlap Queries
//!
//! Spatial queries for game logic (hazard volumes, area damage, "who is
//! nearby"). Grid-accelerated broad phase with an exact narrow phase, so
//! results are confirmed overlaps, not candidates.
//!
//! Results are sorted by body id.

use crate::collider::collide;
use crate::math::{Fixed, Vec3Fix};
use crate::shape::{Shape, AABB};
use crate::spatial::SpatialGrid;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Result of an overlap query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlapResult {
    /// Id of the overlapping body
    pub body_id: u32,
    /// Overlap depth (penetration distance)
    pub depth: Fixed,
}

/// Bodies whose shape overlaps the volume `shape` centred at `center`
pub fn overlap_shape(store: &BodyStore, grid: &SpatialGrid, shape: &Shape, center: Vec3Fix) -> Vec<OverlapResult> {
    grid.query_aabb(&shape.aabb(center))
        .into_iter()
        .filter_map(|id| store.get(id))
        .filter_map(|body| {
            collide(shape, center, &body.shape, body.position).map(|contact| OverlapResult {
                body_id: body.id,
                depth: contact.penetration,
            })
        })
        .collect()
}

/// Bodies overlapping a sphere (touching counts)
#[inline]
pub fn overlap_sphere(store: &BodyStore, grid: &SpatialGrid, center: Vec3Fix, radius: Fixed) -> Vec<OverlapResult> {
    if radius.is_negative() {
        return Vec::new();
    }
    overlap_shape(store, grid, &Shape::sphere(radius), center)
}

/// Bodies overlapping an axis-aligned box
pub fn overlap_aabb(store: &BodyStore, grid: &SpatialGrid, aabb: &AABB) -> Vec<OverlapResult> {
    let half = (aabb.max - aabb.min).scale(Fixed::HALF);
    if half.x.is_negative() || half.y.is_negative() || half.z.is_negative() {
        return Vec::new();
    }
    let center = aabb.min + half;
    overlap_shape(store, grid, &Shape::cuboid(half), center)
}

/// Ids of bodies overlapping a sphere
#[inline]
pub fn sphere_cast(store: &BodyStore, grid: &SpatialGrid, center: Vec3Fix, radius: Fixed) -> Vec<u32> {
    overlap_sphere(store, grid, center, radius)
        .into_iter()
        .map(|r| r.body_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBodySpec;

    fn world() -> (BodyStore, SpatialGrid, [u32; 4]) {
        let mut store = BodyStore::new(8);
        let mut ids = [0u32; 4];
        for (slot, pos) in ids
            .iter_mut()
            .zip([(0, 0, 0), (5, 0, 0), (10, 0, 0), (0, 5, 0)])
        {
            let spec = RigidBodySpec::fixed(Vec3Fix::from_int(pos.0, pos.1, pos.2), Shape::sphere(Fixed::ONE));
            *slot = store.insert(&spec).unwrap();
        }
        let mut grid = SpatialGrid::new(Fixed::from_int(2));
        grid.rebuild(store.iter().map(|b| (b.id, b.aabb())));
        (store, grid, ids)
    }

    #[test]
    fn test_overlap_sphere() {
        let (store, grid, ids) = world();
        let results = overlap_sphere(&store, &grid, Vec3Fix::ZERO, Fixed::from_int(3));
        // (5,0,0) is 5 away, combined radius 4
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].body_id, ids[0]);
        assert_eq!(results[0].depth, Fixed::from_int(4));
    }

    #[test]
    fn test_overlap_sphere_multiple_sorted() {
        let (store, grid, ids) = world();
        let found = sphere_cast(&store, &grid, Vec3Fix::from_int(2, 0, 0), Fixed::from_int(5));
        // (0,0,0): 2, (5,0,0): 3, (0,5,0): ~5.39, all within 6; (10,0,0): 8
        assert_eq!(found, [ids[0], ids[1], ids[3]]);
    }

    #[test]
    fn test_broad_phase_candidates_are_confirmed() {
        let (store, grid, _) = world();
        // Same grid ring as the body at the origin, but not touching it
        assert!(sphere_cast(&store, &grid, Vec3Fix::from_int(2, 2, 2), Fixed::HALF).is_empty());
    }

    #[test]
    fn test_overlap_aabb() {
        let (store, grid, ids) = world();
        let aabb = AABB::new(Vec3Fix::from_int(-1, -1, -1), Vec3Fix::from_int(6, 1, 1));
        let found: Vec<u32> = overlap_aabb(&store, &grid, &aabb).iter().map(|r| r.body_id).collect();
        assert_eq!(found, [ids[0], ids[1]]);
    }

    #[test]
    fn test_inverted_aabb_is_empty() {
        let (store, grid, _) = world();
        let aabb = AABB::new(Vec3Fix::from_int(1, 1, 1), Vec3Fix::from_int(-1, -1, -1));
        assert!(overlap_aabb(&store, &grid, &aabb).is_empty());
    }
}
