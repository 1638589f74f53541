//! Deterministic Fixed-Point Mathematics
//!
//! > "Same raw integers in, same raw integers out."
//!
//! # Overview
//!
//! Every physics quantity in this crate is a [`Fixed`]: a 32-bit signed
//! integer read as 16 integer bits and 16 fractional bits. All arithmetic is
//! defined over the raw integer, so two clients on different CPUs, compilers
//! or WASM runtimes produce bit-identical results. No IEEE 754 operation
//! appears on any simulation path.
//!
//! # Types
//!
//! - `Fixed` (Q16.16): range ±32767.9999, resolution 1/65536
//! - `Vec3Fix`: 3D vector of `Fixed` components
//! - `Vec2Fix`: 2D vector of `Fixed` components (top-down gameplay space)
//! - `QuatFix`: rotation quaternion of `Fixed` components
//!
//! # Overflow
//!
//! Multiplication and division go through a 64-bit intermediate. A result
//! that does not fit back into 32 bits is a precondition violation: debug
//! builds assert, release builds saturate to [`Fixed::MIN`]/[`Fixed::MAX`].
//! Silent wraparound is never allowed.
//!
//! Dot products and squared lengths are accumulated in a widened Q32.32
//! domain (`i128`) so squaring a distance of a few hundred units is safe.

use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Newton-Raphson iterations used by every square root.
///
/// Fixed regardless of input magnitude so the execution path is identical
/// for all inputs.
pub const SQRT_ITERATIONS: u32 = 10;

// ============================================================================
// Fixed (Q16.16)
// ============================================================================

/// 32-bit fixed-point number (16 integer bits, 16 fractional bits)
///
/// Internal representation: `value = raw / 65536`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct Fixed {
    /// Raw two's-complement bits
    pub raw: i32,
}

impl Fixed {
    /// Number of fractional bits
    pub const FRAC_BITS: u32 = 16;

    /// Zero constant
    pub const ZERO: Self = Self { raw: 0 };

    /// One constant (1.0)
    pub const ONE: Self = Self { raw: 1 << 16 };

    /// Negative one (-1.0)
    pub const NEG_ONE: Self = Self { raw: -(1 << 16) };

    /// One half (0.5)
    pub const HALF: Self = Self { raw: 1 << 15 };

    /// Largest representable value (≈ 32767.99998)
    pub const MAX: Self = Self { raw: i32::MAX };

    /// Smallest representable value (-32768.0)
    pub const MIN: Self = Self { raw: i32::MIN };

    /// Smallest positive value (1/65536)
    pub const EPSILON: Self = Self { raw: 1 };

    /// Create from raw bits
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self { raw }
    }

    /// Create from integer, saturating outside ±32767
    #[inline]
    pub const fn from_int(n: i32) -> Self {
        Self::from_wide_const((n as i64) << Self::FRAC_BITS)
    }

    /// Create from fraction (numerator / denominator)
    ///
    /// Truncates toward zero. A zero denominator yields zero.
    pub const fn from_ratio(num: i32, denom: i32) -> Self {
        if denom == 0 {
            return Self::ZERO;
        }
        Self::from_wide_const(((num as i64) << Self::FRAC_BITS) / denom as i64)
    }

    /// Create from a microsecond count (1_000_000 µs = 1.0)
    pub const fn from_micros(micros: i64) -> Self {
        Self::from_wide_const((micros << Self::FRAC_BITS) / 1_000_000)
    }

    /// Create from f32 (host boundary / initialization only)
    ///
    /// The conversion is exact up to truncation but must never run inside
    /// the simulation step.
    #[inline]
    pub fn from_f32(f: f32) -> Self {
        Self {
            raw: (f * 65536.0) as i32,
        }
    }

    /// Convert to f32 (debugging and rendering only)
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.raw as f32 / 65536.0
    }

    /// Integer part, rounded toward negative infinity
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.raw >> Self::FRAC_BITS
    }

    /// Narrow a widened raw value back to 32 bits.
    ///
    /// Out-of-range values assert in debug builds and saturate otherwise.
    #[inline]
    pub(crate) fn from_wide(wide: i64) -> Self {
        debug_assert!(
            wide >= i32::MIN as i64 && wide <= i32::MAX as i64,
            "fixed-point overflow: raw {wide} does not fit in Q16.16"
        );
        Self::from_wide_const(wide)
    }

    #[inline]
    const fn from_wide_const(wide: i64) -> Self {
        if wide > i32::MAX as i64 {
            Self::MAX
        } else if wide < i32::MIN as i64 {
            Self::MIN
        } else {
            Self { raw: wide as i32 }
        }
    }

    /// Check if zero
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.raw == 0
    }

    /// Check if negative
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.raw < 0
    }

    /// Check if strictly positive
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.raw > 0
    }

    /// Absolute value (saturates `MIN` to `MAX`)
    #[inline]
    pub const fn abs(self) -> Self {
        Self {
            raw: self.raw.saturating_abs(),
        }
    }

    /// Smaller of two values
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self.raw <= other.raw {
            self
        } else {
            other
        }
    }

    /// Larger of two values
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self.raw >= other.raw {
            self
        } else {
            other
        }
    }

    /// Clamp into `[lo, hi]`
    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// Divide by 2 (arithmetic shift, rounds toward negative infinity)
    #[inline]
    pub const fn half(self) -> Self {
        Self { raw: self.raw >> 1 }
    }

    /// Product with a 64-bit intermediate, `None` if it leaves Q16.16
    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let wide = (self.raw as i64 * rhs.raw as i64) >> Self::FRAC_BITS;
        i32::try_from(wide).ok().map(Self::from_raw)
    }

    /// Quotient via left-shift-then-divide, `None` on a zero divisor or
    /// when the result leaves Q16.16
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.raw == 0 {
            return None;
        }
        let wide = ((self.raw as i64) << Self::FRAC_BITS) / rhs.raw as i64;
        i32::try_from(wide).ok().map(Self::from_raw)
    }

    /// Saturating product (never asserts)
    #[inline]
    pub fn saturating_mul(self, rhs: Self) -> Self {
        Self::from_wide_const((self.raw as i64 * rhs.raw as i64) >> Self::FRAC_BITS)
    }

    /// Saturating sum (never asserts)
    #[inline]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self { raw: self.raw.saturating_add(rhs.raw) }
    }

    /// Square root using Newton-Raphson iteration
    ///
    /// Deterministic: exactly [`SQRT_ITERATIONS`] iterations. Negative input
    /// yields zero.
    pub fn sqrt(self) -> Self {
        if self.raw <= 0 {
            return Self::ZERO;
        }
        // sqrt(raw / 2^16) * 2^16 == sqrt(raw * 2^16)
        let root = isqrt((self.raw as u128) << Self::FRAC_BITS);
        Self::from_wide(root as i64)
    }
}

/// Integer square root (floor) with a fixed iteration count.
///
/// Starts from a power of two at or above the root, so every iteration moves
/// monotonically toward `floor(sqrt(n))`.
pub fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1u128 << ((bits + 1) / 2);
    for _ in 0..SQRT_ITERATIONS {
        let next = (x + n / x) >> 1;
        if next < x {
            x = next;
        }
    }
    x
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_wide(self.raw as i64 + rhs.raw as i64)
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_wide(self.raw as i64 - rhs.raw as i64)
    }
}

impl Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::from_wide((self.raw as i64 * rhs.raw as i64) >> Self::FRAC_BITS)
    }
}

impl Div for Fixed {
    type Output = Self;

    /// Division by zero asserts in debug builds and yields zero otherwise;
    /// use [`Fixed::checked_div`] where the divisor is not known non-zero.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        debug_assert!(rhs.raw != 0, "fixed-point division by zero");
        if rhs.raw == 0 {
            return Self::ZERO;
        }
        Self::from_wide(((self.raw as i64) << Self::FRAC_BITS) / rhs.raw as i64)
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::from_wide(-(self.raw as i64))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// ============================================================================
// Vec3Fix - 3D Vector with Fixed-Point Components
// ============================================================================

/// 3D vector using `Fixed` components
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vec3Fix {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
}

impl Vec3Fix {
    /// Zero vector
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);

    /// Unit X vector
    pub const UNIT_X: Self = Self::new(Fixed::ONE, Fixed::ZERO, Fixed::ZERO);

    /// Unit Y vector
    pub const UNIT_Y: Self = Self::new(Fixed::ZERO, Fixed::ONE, Fixed::ZERO);

    /// Unit Z vector
    pub const UNIT_Z: Self = Self::new(Fixed::ZERO, Fixed::ZERO, Fixed::ONE);

    /// Create new vector
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Create from integers
    #[inline]
    pub const fn from_int(x: i32, y: i32, z: i32) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y), Fixed::from_int(z))
    }

    /// Create from raw component bits
    #[inline]
    pub const fn from_raw(raw: [i32; 3]) -> Self {
        Self::new(
            Fixed::from_raw(raw[0]),
            Fixed::from_raw(raw[1]),
            Fixed::from_raw(raw[2]),
        )
    }

    /// Raw component bits
    #[inline]
    pub const fn to_raw(self) -> [i32; 3] {
        [self.x.raw, self.y.raw, self.z.raw]
    }

    /// Create from f32 components (initialization only)
    #[inline]
    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self::new(Fixed::from_f32(x), Fixed::from_f32(y), Fixed::from_f32(z))
    }

    /// Component by axis index (0 = X, 1 = Y, 2 = Z)
    #[inline]
    pub fn axis(self, index: usize) -> Fixed {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Copy with one component replaced
    #[inline]
    pub fn with_axis(mut self, index: usize, value: Fixed) -> Self {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            _ => self.z = value,
        }
        self
    }

    /// Dot product
    #[inline]
    pub fn dot(self, rhs: Self) -> Fixed {
        Fixed::from_wide((self.dot_wide(rhs) >> Fixed::FRAC_BITS) as i64)
    }

    /// Dot product in the widened Q32.32 domain (never overflows)
    #[inline]
    pub fn dot_wide(self, rhs: Self) -> i128 {
        self.x.raw as i128 * rhs.x.raw as i128
            + self.y.raw as i128 * rhs.y.raw as i128
            + self.z.raw as i128 * rhs.z.raw as i128
    }

    /// Cross product
    #[inline]
    pub fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Squared length (no sqrt)
    #[inline]
    pub fn length_squared(self) -> Fixed {
        self.dot(self)
    }

    /// Squared length in the widened Q32.32 domain
    #[inline]
    pub fn length_squared_wide(self) -> i128 {
        self.dot_wide(self)
    }

    /// Length (magnitude), saturating at `Fixed::MAX`
    #[inline]
    pub fn length(self) -> Fixed {
        let root = isqrt(self.length_squared_wide() as u128);
        Fixed::from_raw(root.min(i32::MAX as u128) as i32)
    }

    /// Normalize to unit length (zero vector stays zero)
    pub fn normalize(self) -> Self {
        self.normalize_or(Self::ZERO)
    }

    /// Normalize to unit length, or return `fallback` for a zero vector.
    ///
    /// The length stays in the widened domain, so any representable vector
    /// normalizes even when its length does not fit Q16.16.
    pub fn normalize_or(self, fallback: Self) -> Self {
        let len = isqrt(self.length_squared_wide() as u128) as i64;
        if len == 0 {
            return fallback;
        }
        // |component| <= len, so every quotient fits
        let unit = |c: Fixed| Fixed::from_wide(((c.raw as i64) << Fixed::FRAC_BITS) / len);
        Self::new(unit(self.x), unit(self.y), unit(self.z))
    }

    /// Check if the length is strictly less than `limit`, compared without
    /// narrowing the length to Q16.16
    #[inline]
    pub fn shorter_than(self, limit: Fixed) -> bool {
        !limit.is_negative() && self.length_squared_wide() < limit.raw as i128 * limit.raw as i128
    }

    /// Check if the length is strictly greater than `limit`, compared
    /// without narrowing the length to Q16.16
    #[inline]
    pub fn longer_than(self, limit: Fixed) -> bool {
        limit.is_negative() || self.length_squared_wide() > limit.raw as i128 * limit.raw as i128
    }

    /// Scale by scalar
    #[inline]
    pub fn scale(self, s: Fixed) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// `self + v * s` per axis, saturating instead of overflowing
    #[inline]
    pub fn saturating_add_scaled(self, v: Self, s: Fixed) -> Self {
        Self {
            x: self.x.saturating_add(v.x.saturating_mul(s)),
            y: self.y.saturating_add(v.y.saturating_mul(s)),
            z: self.z.saturating_add(v.z.saturating_mul(s)),
        }
    }

    /// Componentwise product
    #[inline]
    pub fn mul_elem(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Componentwise absolute value
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Componentwise minimum
    #[inline]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    /// Componentwise maximum
    #[inline]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    /// Componentwise clamp into `[lo, hi]`
    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// Check if every component is exactly zero
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }

    /// Project onto the XY plane
    #[inline]
    pub fn xy(self) -> Vec2Fix {
        Vec2Fix::new(self.x, self.y)
    }
}

impl Add for Vec3Fix {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3Fix {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<Fixed> for Vec3Fix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Fixed) -> Self {
        self.scale(rhs)
    }
}

impl Div<Fixed> for Vec3Fix {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Fixed) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3Fix {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vec3Fix {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec3Fix {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<Fixed> for Vec3Fix {
    #[inline]
    fn mul_assign(&mut self, rhs: Fixed) {
        *self = *self * rhs;
    }
}

// ============================================================================
// Vec2Fix - 2D Vector
// ============================================================================

/// 2D vector using `Fixed` components
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vec2Fix {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vec2Fix {
    /// Zero vector
    pub const ZERO: Self = Self::new(Fixed::ZERO, Fixed::ZERO);

    /// Create new vector
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create from integers
    #[inline]
    pub const fn from_int(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    /// Dot product
    #[inline]
    pub fn dot(self, rhs: Self) -> Fixed {
        let wide = self.x.raw as i64 * rhs.x.raw as i64 + self.y.raw as i64 * rhs.y.raw as i64;
        Fixed::from_wide(wide >> Fixed::FRAC_BITS)
    }

    /// 2D cross product (z component of the 3D cross)
    #[inline]
    pub fn perp_dot(self, rhs: Self) -> Fixed {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Length (magnitude)
    #[inline]
    pub fn length(self) -> Fixed {
        let wide = self.x.raw as i128 * self.x.raw as i128 + self.y.raw as i128 * self.y.raw as i128;
        Fixed::from_wide(isqrt(wide as u128) as i64)
    }

    /// Normalize to unit length (zero vector stays zero)
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_zero() {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Lift into 3D with the given Z
    #[inline]
    pub fn extend(self, z: Fixed) -> Vec3Fix {
        Vec3Fix::new(self.x, self.y, z)
    }
}

impl Add for Vec2Fix {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2Fix {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Fixed> for Vec2Fix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Fixed) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2Fix {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

// ============================================================================
// QuatFix - Quaternion with Fixed-Point Components
// ============================================================================

/// Quaternion using `Fixed` components (for rotations)
///
/// Stored as (x, y, z, w) where w is the scalar part
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct QuatFix {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub w: Fixed,
}

impl QuatFix {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO, Fixed::ONE);

    /// Create new quaternion
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed, w: Fixed) -> Self {
        Self { x, y, z, w }
    }

    /// Quaternion multiplication (composition of rotations)
    pub fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }

    /// Conjugate (inverse for unit quaternions)
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Magnitude
    pub fn length(self) -> Fixed {
        let wide = [self.x, self.y, self.z, self.w]
            .iter()
            .map(|c| c.raw as i128 * c.raw as i128)
            .sum::<i128>();
        Fixed::from_wide(isqrt(wide as u128) as i64)
    }

    /// Normalize to unit quaternion
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_zero() {
            Self::IDENTITY
        } else {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec(self, v: Vec3Fix) -> Vec3Fix {
        // q * v * q^-1
        let qv = QuatFix::new(v.x, v.y, v.z, Fixed::ZERO);
        let result = self.mul(qv).mul(self.conjugate());
        Vec3Fix::new(result.x, result.y, result.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_basic_ops() {
        let a = Fixed::from_int(5);
        let b = Fixed::from_int(3);

        assert_eq!((a + b).raw, 8 << 16);
        assert_eq!((a - b).raw, 2 << 16);
        assert_eq!((a * b).raw, 15 << 16);
        assert_eq!((-a).raw, -5 << 16);
    }

    #[test]
    fn test_fixed_mul_is_shifted_product() {
        let a = Fixed::from_raw(98_304); // 1.5
        let b = Fixed::from_raw(-43_691); // ≈ -0.6667
        let expected = ((98_304i64 * -43_691i64) >> 16) as i32;
        assert_eq!((a * b).raw, expected);
    }

    #[test]
    fn test_fixed_div() {
        let a = Fixed::from_int(42);
        let b = Fixed::from_int(6);
        assert_eq!((a / b).raw, 7 << 16);
        assert_eq!(Fixed::ONE.checked_div(Fixed::from_int(4)), Some(Fixed::from_raw(16_384)));
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert_eq!(Fixed::ONE.checked_div(Fixed::ZERO), None);
    }

    #[test]
    fn test_checked_mul_overflow() {
        let big = Fixed::from_int(30_000);
        assert_eq!(big.checked_mul(big), None);
        assert_eq!(big.saturating_mul(big), Fixed::MAX);
        assert_eq!(big.saturating_mul(-big), Fixed::MIN);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "fixed-point overflow")]
    fn test_mul_overflow_asserts_in_debug() {
        let big = Fixed::from_int(30_000);
        let _ = big * big;
    }

    #[test]
    fn test_from_ratio_truncates_toward_zero() {
        assert_eq!(Fixed::from_ratio(1, 3).raw, 21_845);
        assert_eq!(Fixed::from_ratio(-1, 3).raw, -21_845);
        assert_eq!(Fixed::from_ratio(5, 0), Fixed::ZERO);
    }

    #[test]
    fn test_from_micros() {
        assert_eq!(Fixed::from_micros(1_000_000), Fixed::ONE);
        // 1/120 s
        assert_eq!(Fixed::from_micros(8_333).raw, 546);
    }

    #[test]
    fn test_sqrt_exact_squares() {
        assert_eq!(Fixed::from_int(16).sqrt(), Fixed::from_int(4));
        assert_eq!(Fixed::from_int(10_000).sqrt(), Fixed::from_int(100));
        assert_eq!(Fixed::ZERO.sqrt(), Fixed::ZERO);
        assert_eq!(Fixed::NEG_ONE.sqrt(), Fixed::ZERO);
    }

    #[test]
    fn test_sqrt_two() {
        let root = Fixed::from_int(2).sqrt();
        // floor(sqrt(2) * 65536) = 92681
        assert_eq!(root.raw, 92_681);
    }

    #[test]
    fn test_isqrt_floor() {
        for n in [1u128, 2, 3, 4, 15, 16, 17, 99, 1 << 40, (1 << 62) + 12_345, u64::MAX as u128] {
            let r = isqrt(n);
            assert!(r * r <= n, "isqrt({n}) = {r} too large");
            assert!((r + 1) * (r + 1) > n, "isqrt({n}) = {r} too small");
        }
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3Fix::from_int(1, 2, 3);
        let b = Vec3Fix::from_int(4, 5, 6);
        // 1*4 + 2*5 + 3*6 = 32
        assert_eq!(a.dot(b), Fixed::from_int(32));
    }

    #[test]
    fn test_vec3_cross() {
        let z = Vec3Fix::UNIT_X.cross(Vec3Fix::UNIT_Y);
        assert_eq!(z, Vec3Fix::UNIT_Z);
    }

    #[test]
    fn test_vec3_length_large_components() {
        // 300^2 would overflow Q16.16, the widened path must not
        let v = Vec3Fix::from_int(300, 400, 0);
        assert_eq!(v.length(), Fixed::from_int(500));
    }

    #[test]
    fn test_vec3_normalize() {
        let n = Vec3Fix::from_int(0, 0, -7).normalize();
        assert_eq!(n, -Vec3Fix::UNIT_Z);
        assert_eq!(Vec3Fix::ZERO.normalize(), Vec3Fix::ZERO);
        assert_eq!(Vec3Fix::ZERO.normalize_or(Vec3Fix::UNIT_X), Vec3Fix::UNIT_X);
    }

    #[test]
    fn test_length_compare_beyond_q16_range() {
        // |v| is about 42426, past i16 range, while every component fits
        let v = Vec3Fix::from_int(30_000, 30_000, 0);
        assert!(v.longer_than(Fixed::from_int(50)));
        assert!(!v.shorter_than(Fixed::MAX));
        assert!(Vec3Fix::from_int(3, 4, 0).shorter_than(Fixed::from_raw(5 * 65_536 + 1)));
        assert!(!Vec3Fix::from_int(3, 4, 0).shorter_than(Fixed::from_int(5)));
        assert!(!Vec3Fix::from_int(3, 4, 0).longer_than(Fixed::from_int(5)));
        assert!(!Vec3Fix::ZERO.shorter_than(Fixed::ZERO));
        assert_eq!(v.length(), Fixed::MAX);
    }

    #[test]
    fn test_normalize_huge_vector() {
        let n = Vec3Fix::from_int(30_000, 0, -30_000).normalize();
        let expected = Fixed::from_raw(46_340); // 1/sqrt(2)
        assert!((n.x - expected).abs() <= Fixed::from_raw(2));
        assert_eq!(n.z, -n.x);
        assert_eq!(n.y, Fixed::ZERO);
        assert_eq!(Vec3Fix::new(Fixed::MAX, Fixed::ZERO, Fixed::ZERO).normalize(), Vec3Fix::UNIT_X);
    }

    #[test]
    fn test_normalize_is_antisymmetric() {
        let v = Vec3Fix::from_raw([123_457, -98_765, 4_321]);
        assert_eq!((-v).normalize(), -v.normalize());
    }

    #[test]
    fn test_vec2_ops() {
        let a = Vec2Fix::from_int(3, 4);
        assert_eq!(a.length(), Fixed::from_int(5));
        assert_eq!(a.dot(Vec2Fix::from_int(1, 1)), Fixed::from_int(7));
        assert_eq!(a.perp_dot(Vec2Fix::from_int(1, 0)), Fixed::from_int(-4));
        assert_eq!(a.extend(Fixed::ONE), Vec3Fix::from_int(3, 4, 1));
    }

    #[test]
    fn test_quat_identity() {
        let v = Vec3Fix::from_int(1, 2, 3);
        assert_eq!(QuatFix::IDENTITY.rotate_vec(v), v);
    }

    #[test]
    fn test_quat_half_turn_about_y() {
        // 180° about Y: (0, 1, 0, 0)
        let q = QuatFix::new(Fixed::ZERO, Fixed::ONE, Fixed::ZERO, Fixed::ZERO);
        let r = q.rotate_vec(Vec3Fix::from_int(1, 2, 3));
        assert_eq!(r, Vec3Fix::from_int(-1, 2, -3));
        assert_eq!(q.mul(q.conjugate()), QuatFix::IDENTITY);
    }

    #[test]
    fn test_determinism() {
        let a = Fixed::from_raw(1_234_567);
        let b = Fixed::from_raw(-89_012);

        let result1 = (a * b) + (a - b);
        let result2 = (a * b) + (a - b);

        assert_eq!(result1.raw, result2.raw);
    }
}
