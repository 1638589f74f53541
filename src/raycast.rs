//! Raycasting
//!
//! Deterministic ray queries against body shapes.
//!
//! # Features
//!
//! - Ray-Sphere, Ray-AABB (slab), Ray-Capsule intersection
//! - Grid-accelerated queries over a [`BodyStore`]
//!
//! Quadratic terms are evaluated in the widened Q32.32 domain so that long
//! rays and distant bodies do not overflow Q16.16 intermediates.

use crate::body::RigidBody;
use crate::math::{isqrt, Fixed, Vec3Fix};
use crate::shape::{Shape, AABB};
use crate::spatial::SpatialGrid;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3Fix,
    /// Ray direction (unit length)
    pub direction: Vec3Fix,
}

impl Ray {
    /// Create a new ray (direction is normalized; a zero direction is +X)
    #[inline]
    pub fn new(origin: Vec3Fix, direction: Vec3Fix) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec3Fix::UNIT_X),
        }
    }

    /// Point along the ray at parameter t
    #[inline]
    pub fn at(&self, t: Fixed) -> Vec3Fix {
        self.origin + self.direction * t
    }

    /// Bounding box of the segment `[0, max_t]`, saturating at the edge of
    /// the representable range
    pub fn segment_aabb(&self, max_t: Fixed) -> AABB {
        let mut end = [0i32; 3];
        for (axis, slot) in end.iter_mut().enumerate() {
            let o = self.origin.axis(axis).raw as i64;
            let d = self.direction.axis(axis).raw as i64;
            let reach = (d * max_t.raw as i64) >> Fixed::FRAC_BITS;
            *slot = (o + reach).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        }
        let end = Vec3Fix::from_raw(end);
        AABB::new(self.origin.min(end), self.origin.max(end))
    }
}

/// Result of a ray intersection test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// Distance from the origin along the ray
    pub t: Fixed,
    /// World-space hit point
    pub point: Vec3Fix,
    /// Surface normal at hit point
    pub normal: Vec3Fix,
    /// Id of the hit body (0 for raw shape tests)
    pub body_id: u32,
}

impl RayHit {
    fn new(ray: &Ray, t: Fixed, normal: Vec3Fix) -> Self {
        Self {
            t,
            point: ray.at(t),
            normal,
            body_id: 0,
        }
    }
}

#[inline]
fn narrow(wide: i128) -> Fixed {
    Fixed::from_raw(wide.clamp(i32::MIN as i128, i32::MAX as i128) as i32)
}

/// Ray-Sphere intersection
///
/// Returns the nearest hit with `0 <= t <= max_t`. A ray starting inside
/// the sphere reports the exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3Fix, radius: Fixed, max_t: Fixed) -> Option<RayHit> {
    let oc = ray.origin - center;
    // b and c in Q32.32, direction is unit length
    let b = oc.dot_wide(ray.direction);
    let c = oc.length_squared_wide() - radius.raw as i128 * radius.raw as i128;
    let b16 = b >> Fixed::FRAC_BITS;
    let discriminant = b16 * b16 - c;
    if discriminant < 0 {
        return None;
    }
    let sqrt_d = isqrt(discriminant as u128) as i128;

    for t_wide in [-b16 - sqrt_d, -b16 + sqrt_d] {
        let t = narrow(t_wide);
        if !t.is_negative() && t <= max_t {
            let normal = (ray.at(t) - center).normalize_or(-ray.direction);
            return Some(RayHit::new(ray, t, normal));
        }
    }
    None
}

/// `num / den` saturated to Q16.16, used for slab parameters
#[inline]
fn slab_div(num: Fixed, den: Fixed) -> Fixed {
    let wide = ((num.raw as i64) << Fixed::FRAC_BITS) / den.raw as i64;
    Fixed::from_raw(wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Ray-AABB intersection interval (slab method)
fn ray_aabb_interval(ray: &Ray, aabb: &AABB) -> Option<(Fixed, Fixed, usize)> {
    let mut t_min = Fixed::MIN;
    let mut t_max = Fixed::MAX;
    let mut entry_axis = 0;

    for axis in 0..3 {
        let o = ray.origin.axis(axis);
        let d = ray.direction.axis(axis);
        let lo = aabb.min.axis(axis);
        let hi = aabb.max.axis(axis);
        if d.is_zero() {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let mut t0 = slab_div(lo - o, d);
        let mut t1 = slab_div(hi - o, d);
        if t0 > t1 {
            core::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_min {
            t_min = t0;
            entry_axis = axis;
        }
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    Some((t_min, t_max, entry_axis))
}

/// Ray-AABB intersection
pub fn ray_aabb(ray: &Ray, aabb: &AABB, max_t: Fixed) -> Option<RayHit> {
    let (t_min, t_max, axis) = ray_aabb_interval(ray, aabb)?;
    if t_min > max_t || t_max.is_negative() {
        return None;
    }
    if !t_min.is_negative() {
        // Entering face opposes the ray on the entry axis
        let s = if ray.direction.axis(axis).is_negative() {
            Fixed::ONE
        } else {
            Fixed::NEG_ONE
        };
        return Some(RayHit::new(ray, t_min, Vec3Fix::ZERO.with_axis(axis, s)));
    }
    // Origin inside: report the exit
    if t_max > max_t {
        return None;
    }
    let exit = ray.at(t_max);
    Some(RayHit::new(ray, t_max, exit_normal(exit, aabb)))
}

/// Normal of the face nearest to a point on the box surface, X before Y before Z
fn exit_normal(point: Vec3Fix, aabb: &AABB) -> Vec3Fix {
    let mut best = 0;
    let mut best_gap = Fixed::MAX;
    let mut sign = Fixed::ONE;
    for axis in 0..3 {
        let to_min = (point.axis(axis) - aabb.min.axis(axis)).abs();
        let to_max = (aabb.max.axis(axis) - point.axis(axis)).abs();
        let (gap, s) = if to_max <= to_min {
            (to_max, Fixed::ONE)
        } else {
            (to_min, Fixed::NEG_ONE)
        };
        if gap < best_gap {
            best = axis;
            best_gap = gap;
            sign = s;
        }
    }
    Vec3Fix::ZERO.with_axis(best, sign)
}

/// Ray against a vertical capsule centred at `center`
pub fn ray_capsule(ray: &Ray, center: Vec3Fix, radius: Fixed, height: Fixed, max_t: Fixed) -> Option<RayHit> {
    let half = height.half();
    let bottom = center - Vec3Fix::UNIT_Y * half;
    let top = center + Vec3Fix::UNIT_Y * half;

    // Infinite cylinder around the Y axis, solved in the XZ plane:
    // a t^2 + 2 b t + c = 0, all terms Q32.32
    let d = Vec3Fix::new(ray.direction.x, Fixed::ZERO, ray.direction.z);
    let o = Vec3Fix::new(ray.origin.x - center.x, Fixed::ZERO, ray.origin.z - center.z);
    let a = d.length_squared_wide();
    let b = d.dot_wide(o);
    let c = o.length_squared_wide() - radius.raw as i128 * radius.raw as i128;

    let mut side: Option<RayHit> = None;
    if a > 0 {
        // b^2 - a c in Q64.64; scale down to keep headroom
        let disc = (b >> 16) * (b >> 16) - (a >> 16) * (c >> 16);
        if disc >= 0 {
            let root = isqrt(disc as u128) as i128;
            // (-b/2^16 -+ root) / (a/2^16) in Q16.16
            let a16 = (a >> 16).max(1);
            for num in [-(b >> 16) - root, -(b >> 16) + root] {
                let t = narrow((num << Fixed::FRAC_BITS) / a16);
                if t.is_negative() || t > max_t {
                    continue;
                }
                let point = ray.at(t);
                if point.y >= bottom.y && point.y <= top.y {
                    let axis_point = Vec3Fix::new(center.x, point.y, center.z);
                    let normal = (point - axis_point).normalize_or(-ray.direction);
                    side = Some(RayHit::new(ray, t, normal));
                }
                break;
            }
        }
    }

    let cap_bottom = ray_sphere(ray, bottom, radius, max_t);
    let cap_top = ray_sphere(ray, top, radius, max_t);
    closer_hit(closer_hit(side, cap_bottom), cap_top)
}

/// Ray against any shape centred at `center`
pub fn ray_shape(ray: &Ray, shape: &Shape, center: Vec3Fix, max_t: Fixed) -> Option<RayHit> {
    match *shape {
        Shape::Sphere { radius } => ray_sphere(ray, center, radius, max_t),
        Shape::Box { half_extents } => ray_aabb(ray, &AABB::from_center_half(center, half_extents), max_t),
        Shape::Capsule { radius, height } => ray_capsule(ray, center, radius, height, max_t),
    }
}

/// Ray against one body
#[inline]
pub fn ray_body(ray: &Ray, body: &RigidBody, max_t: Fixed) -> Option<RayHit> {
    ray_shape(ray, &body.shape, body.position, max_t).map(|hit| RayHit {
        body_id: body.id,
        ..hit
    })
}

/// Return the closer of two optional hits (first wins ties)
#[inline]
fn closer_hit(a: Option<RayHit>, b: Option<RayHit>) -> Option<RayHit> {
    match (a, b) {
        (Some(ha), Some(hb)) => Some(if hb.t < ha.t { hb } else { ha }),
        (Some(h), None) | (None, Some(h)) => Some(h),
        (None, None) => None,
    }
}

/// All bodies hit by the ray within `max_t`, sorted by distance then id.
///
/// Candidates come from the grid cells the segment's bounding box covers;
/// each is confirmed with an exact shape test.
pub fn raycast_all(store: &BodyStore, grid: &SpatialGrid, ray: &Ray, max_t: Fixed) -> Vec<RayHit> {
    if max_t.is_negative() {
        return Vec::new();
    }
    let mut hits: Vec<RayHit> = grid
        .query_aabb(&ray.segment_aabb(max_t))
        .into_iter()
        .filter_map(|id| store.get(id))
        .filter_map(|body| ray_body(ray, body, max_t))
        .collect();
    hits.sort_unstable_by_key(|h| (h.t, h.body_id));
    hits
}

/// Closest body hit by the ray within `max_t`
pub fn raycast_closest(store: &BodyStore, grid: &SpatialGrid, ray: &Ray, max_t: Fixed) -> Option<RayHit> {
    raycast_all(store, grid, ray, max_t).into_iter().next()
}
