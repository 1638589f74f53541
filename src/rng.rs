//! Seeded PCG Generator
//!
//! PCG (Permuted Congruential Generator) with fixed-point output.
//! Bit-exact across all platforms, so a logged seed reproduces the same
//! input sequence for replay and fuzzing.
//!
//! # Example
//!
//! ```
//! use lockstep_physics::rng::DeterministicRng;
//! use lockstep_physics::math::Fixed;
//!
//! let mut rng = DeterministicRng::new(42);
//! let val = rng.next_fixed(); // [0, 1) deterministic
//! assert!(val >= Fixed::ZERO && val < Fixed::ONE);
//! ```

use crate::math::{Fixed, Vec3Fix};

/// PCG-XSH-RR, 64-bit state and 32-bit output. Integer-only.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: u64,
    inc: u64,
}

impl DeterministicRng {
    const MULTIPLIER: u64 = 6364136223846793005;

    /// Generator whose stream is derived from the seed
    pub fn new(seed: u64) -> Self {
        Self::new_with_stream(seed, seed)
    }

    /// Generator on an explicit stream; streams with the same seed never
    /// overlap
    pub fn new_with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = Self {
            state: 0,
            inc: (stream << 1) | 1, // Must be odd
        };
        rng.next_u32();
        rng.state = rng.state.wrapping_add(seed);
        rng.next_u32();
        rng
    }

    /// Advance and return 32 output bits
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(Self::MULTIPLIER).wrapping_add(self.inc);
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Two outputs, high word first
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    /// Generate a value in [0, 1)
    #[inline]
    pub fn next_fixed(&mut self) -> Fixed {
        Fixed::from_raw((self.next_u32() >> 16) as i32)
    }

    /// Generate a value in [lo, hi)
    pub fn next_fixed_range(&mut self, lo: Fixed, hi: Fixed) -> Fixed {
        let span = hi.raw as i64 - lo.raw as i64;
        if span <= 0 {
            return lo;
        }
        let t = self.next_fixed().raw as i64;
        Fixed::from_raw((lo.raw as i64 + ((span * t) >> Fixed::FRAC_BITS)) as i32)
    }

    /// Generate a vector with each component in [-extent, extent)
    pub fn next_vec3(&mut self, extent: Fixed) -> Vec3Fix {
        let lo = -extent;
        Vec3Fix::new(
            self.next_fixed_range(lo, extent),
            self.next_fixed_range(lo, extent),
            self.next_fixed_range(lo, extent),
        )
    }

    /// Generate random value in [0, max) as u32
    #[inline]
    pub fn next_bounded(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Reject the biased low range
        let threshold = max.wrapping_neg() % max;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return r % max;
            }
        }
    }

    /// Generate a boolean that is `true` with probability `num / den`
    #[inline]
    pub fn chance(&mut self, num: u32, den: u32) -> bool {
        self.next_bounded(den) < num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DeterministicRng::new(0xC0FFEE);
        let mut b = a.clone();
        let xs: Vec<u64> = (0..64).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..64).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
        assert_eq!(DeterministicRng::new(5).next_u32(), DeterministicRng::new(5).next_u32());
    }

    #[test]
    fn test_seeds_diverge() {
        let mut a = DeterministicRng::new(1);
        let mut b = DeterministicRng::new(2);
        let equal = (0..100).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(equal < 5);
    }

    #[test]
    fn test_fixed_unit_range() {
        let mut rng = DeterministicRng::new(42);
        for _ in 0..100 {
            let val = rng.next_fixed();
            assert!(val >= Fixed::ZERO);
            assert!(val < Fixed::ONE);
        }
    }

    #[test]
    fn test_fixed_range() {
        let mut rng = DeterministicRng::new(7);
        let lo = Fixed::from_int(-3);
        let hi = Fixed::from_int(5);
        for _ in 0..200 {
            let val = rng.next_fixed_range(lo, hi);
            assert!(val >= lo && val < hi);
        }
        assert_eq!(rng.next_fixed_range(hi, lo), hi);
    }

    #[test]
    fn test_full_range_does_not_overflow() {
        let mut rng = DeterministicRng::new(3);
        for _ in 0..100 {
            let _ = rng.next_fixed_range(Fixed::MIN, Fixed::MAX);
        }
    }

    #[test]
    fn test_bounded_and_chance() {
        let mut rng = DeterministicRng::new(99);
        assert!((0..100).all(|_| rng.next_bounded(10) < 10));
        assert_eq!(rng.next_bounded(0), 0);
        assert!((0..20).all(|_| rng.chance(1, 1)));
        assert!((0..20).all(|_| !rng.chance(0, 7)));
    }

    #[test]
    fn test_streams_differ() {
        let mut a = DeterministicRng::new_with_stream(42, 1);
        let mut b = DeterministicRng::new_with_stream(42, 2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_vec3_extent() {
        let mut rng = DeterministicRng::new(777);
        let extent = Fixed::from_int(4);
        for _ in 0..20 {
            let v = rng.next_vec3(extent);
            for axis in 0..3 {
                assert!(v.axis(axis).abs() <= extent);
            }
        }
    }
}
