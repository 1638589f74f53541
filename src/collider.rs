//! Narrow Phase Shape-Pair Tests
//!
//! Exact overlap tests for every pair of [`Shape`] variants, dispatched by
//! an exhaustive `match` in [`collide`].
//!
//! # Conventions
//!
//! - The normal points from shape A toward shape B and has unit length.
//! - Penetration is `>= 0`; touching shapes produce a zero-depth contact.
//! - When several axes give the same minimum penetration the earliest axis
//!   wins: X, then Y, then Z.
//! - Every test is symmetric: `collide(b, a)` is `collide(a, b)` with the
//!   normal negated, bit for bit. Mixed pairs are evaluated in one canonical
//!   direction and flipped; same-shape pairs are ordered by position first.
//! - Coincident sphere centers fall back to the +X normal.

use crate::math::{Fixed, Vec3Fix};
use crate::shape::Shape;

// ============================================================================
// Contact
// ============================================================================

/// Geometry of one shape-pair overlap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactGeometry {
    /// World-space contact point
    pub point: Vec3Fix,
    /// Unit normal from A toward B
    pub normal: Vec3Fix,
    /// Overlap depth along the normal (>= 0)
    pub penetration: Fixed,
}

impl ContactGeometry {
    /// Same contact seen from the other body
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Contact between two bodies, rebuilt every step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    /// First body id
    pub body_a: u32,
    /// Second body id
    pub body_b: u32,
    /// World-space contact point
    pub point: Vec3Fix,
    /// Unit normal from A toward B
    pub normal: Vec3Fix,
    /// Overlap depth along the normal (>= 0)
    pub penetration: Fixed,
}

impl Contact {
    /// Attach body ids to a contact geometry
    #[inline]
    pub fn new(body_a: u32, body_b: u32, geometry: ContactGeometry) -> Self {
        Self {
            body_a,
            body_b,
            point: geometry.point,
            normal: geometry.normal,
            penetration: geometry.penetration,
        }
    }

    /// Check if a body takes part in this contact
    #[inline]
    pub fn involves(&self, id: u32) -> bool {
        self.body_a == id || self.body_b == id
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Test shape `a` at `pa` against shape `b` at `pb`.
pub fn collide(a: &Shape, pa: Vec3Fix, b: &Shape, pb: Vec3Fix) -> Option<ContactGeometry> {
    use Shape::*;
    match (*a, *b) {
        (Sphere { radius: ra }, Sphere { radius: rb }) => {
            if ordered(pa, pb) {
                sphere_sphere(pa, ra, pb, rb)
            } else {
                sphere_sphere(pb, rb, pa, ra).map(ContactGeometry::flipped)
            }
        }
        (Box { half_extents: ha }, Box { half_extents: hb }) => {
            if ordered(pa, pb) {
                box_box(pa, ha, pb, hb)
            } else {
                box_box(pb, hb, pa, ha).map(ContactGeometry::flipped)
            }
        }
        (Capsule { radius: ra, height: ha }, Capsule { radius: rb, height: hb }) => {
            if ordered(pa, pb) {
                capsule_capsule(pa, ra, ha, pb, rb, hb)
            } else {
                capsule_capsule(pb, rb, hb, pa, ra, ha).map(ContactGeometry::flipped)
            }
        }
        (Sphere { radius }, Box { half_extents }) => sphere_box(pa, radius, pb, half_extents),
        (Box { half_extents }, Sphere { radius }) => {
            sphere_box(pb, radius, pa, half_extents).map(ContactGeometry::flipped)
        }
        (Capsule { radius, height }, Box { half_extents }) => {
            capsule_box(pa, radius, height, pb, half_extents)
        }
        (Box { half_extents }, Capsule { radius, height }) => {
            capsule_box(pb, radius, height, pa, half_extents).map(ContactGeometry::flipped)
        }
        (Capsule { radius, height }, Sphere { radius: rs }) => {
            capsule_sphere(pa, radius, height, pb, rs)
        }
        (Sphere { radius: rs }, Capsule { radius, height }) => {
            capsule_sphere(pb, radius, height, pa, rs).map(ContactGeometry::flipped)
        }
    }
}

/// Canonical order for same-shape pairs
#[inline]
fn ordered(pa: Vec3Fix, pb: Vec3Fix) -> bool {
    pa.to_raw() <= pb.to_raw()
}

/// Pick the smallest of three values; earlier axes win ties.
#[inline]
fn min_axis(values: [Fixed; 3]) -> usize {
    let mut best = 0;
    for axis in 1..3 {
        if values[axis] < values[best] {
            best = axis;
        }
    }
    best
}

/// +1 for non-negative, -1 for negative
#[inline]
fn sign(v: Fixed) -> Fixed {
    if v.is_negative() {
        Fixed::NEG_ONE
    } else {
        Fixed::ONE
    }
}

/// Unit vector along `axis` with the given sign
#[inline]
fn axis_normal(axis: usize, s: Fixed) -> Vec3Fix {
    Vec3Fix::ZERO.with_axis(axis, s)
}

/// Closest point on the vertical interval `[lo, hi]` to `[other_lo,
/// other_hi]`: midpoint of the overlap, else the nearest endpoint.
#[inline]
fn closest_y(lo: Fixed, hi: Fixed, other_lo: Fixed, other_hi: Fixed) -> Fixed {
    let overlap_lo = lo.max(other_lo);
    let overlap_hi = hi.min(other_hi);
    if overlap_lo <= overlap_hi {
        overlap_lo + (overlap_hi - overlap_lo).half()
    } else if other_hi < lo {
        lo
    } else {
        hi
    }
}

// ============================================================================
// Pair Tests
// ============================================================================

/// Sphere vs sphere
pub fn sphere_sphere(pa: Vec3Fix, ra: Fixed, pb: Vec3Fix, rb: Fixed) -> Option<ContactGeometry> {
    let delta = pb - pa;
    let radius_sum = ra + rb;
    let sum_sq = radius_sum.raw as i128 * radius_sum.raw as i128;
    if delta.length_squared_wide() > sum_sq {
        return None;
    }
    let dist = delta.length();
    let normal = if dist.is_zero() {
        Vec3Fix::UNIT_X
    } else {
        delta / dist
    };
    let penetration = (radius_sum - dist).max(Fixed::ZERO);
    Some(ContactGeometry {
        point: pa + normal * (ra - penetration.half()),
        normal,
        penetration,
    })
}

/// Sphere (A) vs axis-aligned box (B)
pub fn sphere_box(ps: Vec3Fix, radius: Fixed, pb: Vec3Fix, half: Vec3Fix) -> Option<ContactGeometry> {
    let local = ps - pb;
    let clamped = local.clamp(-half, half);

    if clamped != local {
        // Center outside: closest point on the surface
        let delta = clamped - local;
        if delta.length_squared_wide() > radius.raw as i128 * radius.raw as i128 {
            return None;
        }
        let dist = delta.length();
        return Some(ContactGeometry {
            point: pb + clamped,
            normal: delta / dist,
            penetration: (radius - dist).max(Fixed::ZERO),
        });
    }

    // Center inside: push out through the nearest face
    let depth = [
        half.x - local.x.abs(),
        half.y - local.y.abs(),
        half.z - local.z.abs(),
    ];
    let axis = min_axis(depth);
    let s = sign(local.axis(axis));
    Some(ContactGeometry {
        point: pb + local.with_axis(axis, half.axis(axis) * s),
        normal: -axis_normal(axis, s),
        penetration: radius + depth[axis],
    })
}

/// Axis-aligned box vs axis-aligned box
pub fn box_box(pa: Vec3Fix, ha: Vec3Fix, pb: Vec3Fix, hb: Vec3Fix) -> Option<ContactGeometry> {
    let delta = pb - pa;
    let overlap = [
        ha.x + hb.x - delta.x.abs(),
        ha.y + hb.y - delta.y.abs(),
        ha.z + hb.z - delta.z.abs(),
    ];
    if overlap.iter().any(|o| o.is_negative()) {
        return None;
    }
    let axis = min_axis(overlap);

    let lo = (pa - ha).max(pb - hb);
    let hi = (pa + ha).min(pb + hb);
    let point = Vec3Fix::new(
        lo.x + (hi.x - lo.x).half(),
        lo.y + (hi.y - lo.y).half(),
        lo.z + (hi.z - lo.z).half(),
    );

    Some(ContactGeometry {
        point,
        normal: axis_normal(axis, sign(delta.axis(axis))),
        penetration: overlap[axis],
    })
}

/// Vertical capsule (A) vs axis-aligned box (B)
pub fn capsule_box(
    pc: Vec3Fix,
    radius: Fixed,
    height: Fixed,
    pb: Vec3Fix,
    half: Vec3Fix,
) -> Option<ContactGeometry> {
    let seg_lo = pc.y - height.half();
    let seg_hi = pc.y + height.half();
    let y = closest_y(seg_lo, seg_hi, pb.y - half.y, pb.y + half.y);
    sphere_box(Vec3Fix::new(pc.x, y, pc.z), radius, pb, half)
}

/// Vertical capsule (A) vs sphere (B)
pub fn capsule_sphere(
    pc: Vec3Fix,
    radius: Fixed,
    height: Fixed,
    ps: Vec3Fix,
    rs: Fixed,
) -> Option<ContactGeometry> {
    let y = ps.y.clamp(pc.y - height.half(), pc.y + height.half());
    sphere_sphere(Vec3Fix::new(pc.x, y, pc.z), radius, ps, rs)
}

/// Vertical capsule vs vertical capsule
pub fn capsule_capsule(
    pa: Vec3Fix,
    ra: Fixed,
    ha: Fixed,
    pb: Vec3Fix,
    rb: Fixed,
    hb: Fixed,
) -> Option<ContactGeometry> {
    let (a_lo, a_hi) = (pa.y - ha.half(), pa.y + ha.half());
    let (b_lo, b_hi) = (pb.y - hb.half(), pb.y + hb.half());
    let ya = closest_y(a_lo, a_hi, b_lo, b_hi);
    let yb = closest_y(b_lo, b_hi, a_lo, a_hi);
    sphere_sphere(Vec3Fix::new(pa.x, ya, pa.z), ra, Vec3Fix::new(pb.x, yb, pb.z), rb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(r: Fixed) -> Shape {
        Shape::sphere(r)
    }

    fn cube(h: i32) -> Shape {
        Shape::cuboid(Vec3Fix::from_int(h, h, h))
    }

    #[test]
    fn test_spheres_colliding() {
        let c = collide(&sphere(Fixed::ONE), Vec3Fix::ZERO, &sphere(Fixed::ONE), Vec3Fix::from_int(1, 0, 0))
            .unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_X);
        assert_eq!(c.penetration, Fixed::ONE);
        assert_eq!(c.point, Vec3Fix::new(Fixed::HALF, Fixed::ZERO, Fixed::ZERO));
    }

    #[test]
    fn test_spheres_separated() {
        let c = collide(&sphere(Fixed::ONE), Vec3Fix::ZERO, &sphere(Fixed::ONE), Vec3Fix::from_int(3, 0, 0));
        assert!(c.is_none());
    }

    #[test]
    fn test_spheres_touching() {
        let c = collide(&sphere(Fixed::ONE), Vec3Fix::ZERO, &sphere(Fixed::ONE), Vec3Fix::from_int(0, 2, 0))
            .unwrap();
        assert_eq!(c.penetration, Fixed::ZERO);
        assert_eq!(c.normal, Vec3Fix::UNIT_Y);
    }

    #[test]
    fn test_coincident_spheres_use_x() {
        let c = collide(&sphere(Fixed::ONE), Vec3Fix::ZERO, &sphere(Fixed::HALF), Vec3Fix::ZERO).unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_X);
        assert_eq!(c.penetration, Fixed::from_ratio(3, 2));
    }

    #[test]
    fn test_sphere_resting_on_box() {
        // Box top at y = 0, sphere center at y = 0.4
        let ground = Shape::cuboid(Vec3Fix::from_int(10, 1, 10));
        let c = collide(
            &sphere(Fixed::HALF),
            Vec3Fix::new(Fixed::ZERO, Fixed::from_ratio(2, 5), Fixed::ZERO),
            &ground,
            Vec3Fix::from_int(0, -1, 0),
        )
        .unwrap();
        assert_eq!(c.normal, -Vec3Fix::UNIT_Y);
        assert_eq!(c.penetration, Fixed::HALF - Fixed::from_ratio(2, 5));
        assert_eq!(c.point.y, Fixed::ZERO);
    }

    #[test]
    fn test_sphere_center_inside_box() {
        let c = collide(&sphere(Fixed::HALF), Vec3Fix::from_int(0, 0, 0), &cube(2), Vec3Fix::from_int(0, 1, 0))
            .unwrap();
        // Nearest face is the bottom one (distance 1); sphere pushed down
        assert_eq!(c.normal, Vec3Fix::UNIT_Y);
        assert_eq!(c.penetration, Fixed::from_ratio(3, 2));
    }

    #[test]
    fn test_box_box_min_axis() {
        let c = collide(&cube(1), Vec3Fix::ZERO, &cube(1), Vec3Fix::new(Fixed::from_ratio(3, 2), Fixed::HALF, Fixed::ZERO))
            .unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_X);
        assert_eq!(c.penetration, Fixed::HALF);
    }

    #[test]
    fn test_box_box_tie_breaks_x_then_y() {
        // Equal overlap on every axis
        let c = collide(&cube(1), Vec3Fix::ZERO, &cube(1), Vec3Fix::from_int(1, 1, 1)).unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_X);
        let c = collide(&cube(1), Vec3Fix::ZERO, &cube(1), Vec3Fix::from_int(0, -1, -1)).unwrap();
        // X overlap is 2, Y and Z tie at 1
        assert_eq!(c.normal, -Vec3Fix::UNIT_Y);
    }

    #[test]
    fn test_box_box_separated() {
        assert!(collide(&cube(1), Vec3Fix::ZERO, &cube(1), Vec3Fix::from_int(0, 3, 0)).is_none());
    }

    #[test]
    fn test_capsule_on_box() {
        // Capsule bottom hemisphere center at y = 1, radius 0.5, box top at 0.75
        let capsule = Shape::capsule(Fixed::HALF, Fixed::from_int(2));
        let ground = Shape::cuboid(Vec3Fix::new(Fixed::from_int(5), Fixed::from_ratio(3, 4), Fixed::from_int(5)));
        let c = collide(&capsule, Vec3Fix::from_int(0, 2, 0), &ground, Vec3Fix::ZERO).unwrap();
        assert_eq!(c.normal, -Vec3Fix::UNIT_Y);
        assert_eq!(c.penetration, Fixed::from_ratio(1, 4));
    }

    #[test]
    fn test_capsule_side_hits_sphere() {
        let capsule = Shape::capsule(Fixed::HALF, Fixed::from_int(4));
        let c = collide(&capsule, Vec3Fix::ZERO, &sphere(Fixed::HALF), Vec3Fix::from_int(0, 1, 0) + Vec3Fix::new(Fixed::HALF, Fixed::ZERO, Fixed::ZERO))
            .unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_X);
        assert_eq!(c.penetration, Fixed::HALF);
    }

    #[test]
    fn test_capsule_capsule_stacked() {
        let capsule = Shape::capsule(Fixed::HALF, Fixed::from_int(2));
        // Segments [−1, 1] and [1.5, 3.5]; hemisphere centers 0.5 apart
        let c = collide(&capsule, Vec3Fix::ZERO, &capsule, Vec3Fix::new(Fixed::ZERO, Fixed::from_ratio(5, 2), Fixed::ZERO))
            .unwrap();
        assert_eq!(c.normal, Vec3Fix::UNIT_Y);
        assert_eq!(c.penetration, Fixed::HALF);
    }

    #[test]
    fn test_symmetry_all_pairs() {
        let shapes = [
            sphere(Fixed::from_ratio(3, 4)),
            Shape::cuboid(Vec3Fix::new(Fixed::ONE, Fixed::HALF, Fixed::from_ratio(3, 4))),
            Shape::capsule(Fixed::HALF, Fixed::from_ratio(3, 2)),
        ];
        let offsets = [
            Vec3Fix::from_raw([40_000, 12_345, -7_000]),
            Vec3Fix::from_raw([-3_000, -70_000, 20_000]),
            Vec3Fix::from_raw([0, 0, 65_536]),
        ];
        let pa = Vec3Fix::from_raw([1_000, 2_000, 3_000]);
        for a in &shapes {
            for b in &shapes {
                for off in &offsets {
                    let pb = pa + *off;
                    let ab = collide(a, pa, b, pb);
                    let ba = collide(b, pb, a, pa);
                    assert_eq!(ab.map(ContactGeometry::flipped), ba, "{a:?} vs {b:?} at {off:?}");
                }
            }
        }
    }

    #[test]
    fn test_normals_are_unit() {
        let c = collide(&sphere(Fixed::ONE), Vec3Fix::ZERO, &sphere(Fixed::ONE), Vec3Fix::from_int(1, 1, 0)).unwrap();
        let len = c.normal.length();
        assert!((len - Fixed::ONE).abs() <= Fixed::from_raw(4));
    }

    #[test]
    fn test_contact_involves() {
        let c = Contact::new(
            3,
            9,
            ContactGeometry {
                point: Vec3Fix::ZERO,
                normal: Vec3Fix::UNIT_Y,
                penetration: Fixed::ZERO,
            },
        );
        assert!(c.involves(3));
        assert!(c.involves(9));
        assert!(!c.involves(4));
    }
}
