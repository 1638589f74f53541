//! Collision Shapes
//!
//! Closed set of primitive shapes a body can carry. Shapes are stored by
//! value inside the body and dispatched with an exhaustive `match` in the
//! narrow phase, so adding a variant is a compile error everywhere a pair
//! test is missing.
//!
//! All shapes are axis aligned: boxes never rotate and capsules stand along
//! the world Y axis.

use crate::error::PhysicsError;
use crate::math::{Fixed, Vec3Fix};

// ============================================================================
// Shape
// ============================================================================

/// Primitive collision shape (centered on the body position)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Sphere of the given radius
    Sphere {
        /// Radius (> 0)
        radius: Fixed,
    },
    /// Axis-aligned box
    Box {
        /// Half extent along each axis (each > 0)
        half_extents: Vec3Fix,
    },
    /// Vertical capsule: a Y-axis segment swept by a sphere
    Capsule {
        /// Radius of the swept sphere (> 0)
        radius: Fixed,
        /// Distance between the two hemisphere centers (> 0)
        height: Fixed,
    },
}

impl Shape {
    /// Sphere shape
    #[inline]
    pub const fn sphere(radius: Fixed) -> Self {
        Self::Sphere { radius }
    }

    /// Box shape from half extents
    #[inline]
    pub const fn cuboid(half_extents: Vec3Fix) -> Self {
        Self::Box { half_extents }
    }

    /// Vertical capsule shape
    #[inline]
    pub const fn capsule(radius: Fixed, height: Fixed) -> Self {
        Self::Capsule { radius, height }
    }

    /// Reject non-positive dimensions
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Self::Sphere { radius } if !radius.is_positive() => Err(PhysicsError::InvalidShape {
                reason: "sphere radius must be > 0",
            }),
            Self::Box { half_extents: h }
                if !(h.x.is_positive() && h.y.is_positive() && h.z.is_positive()) =>
            {
                Err(PhysicsError::InvalidShape {
                    reason: "box half extents must be > 0",
                })
            }
            Self::Capsule { radius, .. } if !radius.is_positive() => {
                Err(PhysicsError::InvalidShape {
                    reason: "capsule radius must be > 0",
                })
            }
            Self::Capsule { height, .. } if !height.is_positive() => {
                Err(PhysicsError::InvalidShape {
                    reason: "capsule height must be > 0",
                })
            }
            _ => Ok(()),
        }
    }

    /// Half extents of the bounding box around the shape
    pub fn half_extents(&self) -> Vec3Fix {
        match *self {
            Self::Sphere { radius } => Vec3Fix::new(radius, radius, radius),
            Self::Box { half_extents } => half_extents,
            Self::Capsule { radius, height } => Vec3Fix::new(radius, height.half() + radius, radius),
        }
    }

    /// World-space bounding box for a shape centered at `center`
    #[inline]
    pub fn aabb(&self, center: Vec3Fix) -> AABB {
        AABB::from_center_half(center, self.half_extents())
    }

    /// Radius of a sphere enclosing the shape
    pub fn bounding_radius(&self) -> Fixed {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Box { half_extents } => half_extents.length(),
            Self::Capsule { radius, height } => height.half() + radius,
        }
    }

    /// Endpoints of the inner segment of a capsule centered at `center`
    /// (bottom, top). Other shapes return the center twice.
    pub fn segment(&self, center: Vec3Fix) -> (Vec3Fix, Vec3Fix) {
        match *self {
            Self::Capsule { height, .. } => {
                let h = Vec3Fix::new(Fixed::ZERO, height.half(), Fixed::ZERO);
                (center - h, center + h)
            }
            _ => (center, center),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Sphere {
            radius: Fixed::HALF,
        }
    }
}

// ============================================================================
// Axis-Aligned Bounding Box
// ============================================================================

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3Fix,
    /// Maximum corner
    pub max: Vec3Fix,
}

impl AABB {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3Fix, max: Vec3Fix) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half(center: Vec3Fix, half: Vec3Fix) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Check if two AABBs intersect (touching counts)
    #[inline]
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Check if a point lies inside (inclusive)
    #[inline]
    pub fn contains(&self, p: Vec3Fix) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Closest point inside the box
    #[inline]
    pub fn clamp_point(&self, p: Vec3Fix) -> Vec3Fix {
        p.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_radius() {
        assert!(Shape::sphere(Fixed::ZERO).validate().is_err());
        assert!(Shape::sphere(Fixed::NEG_ONE).validate().is_err());
        assert!(Shape::sphere(Fixed::ONE).validate().is_ok());
    }

    #[test]
    fn test_validate_box_and_capsule() {
        let flat = Shape::cuboid(Vec3Fix::new(Fixed::ONE, Fixed::ZERO, Fixed::ONE));
        assert!(flat.validate().is_err());
        assert!(Shape::cuboid(Vec3Fix::from_int(1, 1, 1)).validate().is_ok());
        assert!(Shape::capsule(Fixed::ONE, Fixed::ZERO).validate().is_err());
        assert!(Shape::capsule(Fixed::ZERO, Fixed::ONE).validate().is_err());
        assert!(Shape::capsule(Fixed::HALF, Fixed::ONE).validate().is_ok());
    }

    #[test]
    fn test_capsule_aabb() {
        let c = Shape::capsule(Fixed::HALF, Fixed::from_int(2));
        let aabb = c.aabb(Vec3Fix::from_int(0, 5, 0));
        assert_eq!(aabb.min, Vec3Fix::new(-Fixed::HALF, Fixed::from_ratio(7, 2), -Fixed::HALF));
        assert_eq!(aabb.max, Vec3Fix::new(Fixed::HALF, Fixed::from_ratio(13, 2), Fixed::HALF));
    }

    #[test]
    fn test_capsule_segment() {
        let c = Shape::capsule(Fixed::HALF, Fixed::from_int(2));
        let (a, b) = c.segment(Vec3Fix::ZERO);
        assert_eq!(a, Vec3Fix::from_int(0, -1, 0));
        assert_eq!(b, Vec3Fix::from_int(0, 1, 0));
    }

    #[test]
    fn test_aabb_intersection() {
        let a = AABB::new(Vec3Fix::from_int(0, 0, 0), Vec3Fix::from_int(2, 2, 2));
        let b = AABB::new(Vec3Fix::from_int(1, 1, 1), Vec3Fix::from_int(3, 3, 3));
        let c = AABB::new(Vec3Fix::from_int(5, 5, 5), Vec3Fix::from_int(6, 6, 6));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Vec3Fix::from_int(2, 0, 1)));
        assert_eq!(a.clamp_point(Vec3Fix::from_int(9, -3, 1)), Vec3Fix::from_int(2, 0, 1));
    }
}
