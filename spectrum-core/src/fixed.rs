//! # Fixed-Point Sample Module
//!
//! Signed fractional samples stored in a narrow integer. A Q7 sample maps
//! `-128..=127` onto roughly `[-1.0, 1.0)`, a Q15 sample does the same with
//! `-32768..=32767`. No exponent is carried per sample; any scaling is
//! tracked by the transform that produced the data.
//!
//! All arithmetic widens to `i32`, so a product of two samples can never
//! overflow before it is rescaled. Narrowing back to the sample width
//! saturates at the type bounds.

use std::fmt::Debug;

use crate::twiddle::{SINE_Q15, SINE_Q7, TABLE_LEN};

/// A fixed-point fractional sample type usable by the transforms.
pub trait Fixed: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Number of fractional bits (7 for Q7, 15 for Q15).
    const FRAC_BITS: u32;

    /// Largest positive value, the fixed-point encoding of ~1.0.
    const FULL_SCALE: i32;

    /// Inverse transforms rescale a pass when any magnitude exceeds this.
    const QUARTER_SCALE: i32;

    /// Sine table at this width.
    fn sine_table() -> &'static [Self; TABLE_LEN];

    /// Widens the sample to `i32`.
    fn widen(self) -> i32;

    /// Narrows an `i32` back to the sample width, saturating at the bounds.
    fn narrow(value: i32) -> Self;
}

/// Q7 sample, the native width of the analyzer pipeline.
pub type Q7 = i8;

/// Q15 sample.
pub type Q15 = i16;

impl Fixed for i8 {
    const FRAC_BITS: u32 = 7;
    const FULL_SCALE: i32 = i8::MAX as i32;
    const QUARTER_SCALE: i32 = 63;

    #[inline]
    fn sine_table() -> &'static [Self; TABLE_LEN] {
        &SINE_Q7
    }

    #[inline]
    fn widen(self) -> i32 {
        self as i32
    }

    #[inline]
    fn narrow(value: i32) -> Self {
        value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }
}

impl Fixed for i16 {
    const FRAC_BITS: u32 = 15;
    const FULL_SCALE: i32 = i16::MAX as i32;
    const QUARTER_SCALE: i32 = 16383;

    #[inline]
    fn sine_table() -> &'static [Self; TABLE_LEN] {
        &SINE_Q15
    }

    #[inline]
    fn widen(self) -> i32 {
        self as i32
    }

    #[inline]
    fn narrow(value: i32) -> Self {
        value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// Multiplies two fractional samples and rescales the product to the
/// sample width, rounding to nearest.
///
/// The double-width product is shifted right one bit short of the
/// fractional bit count; the bit that the final shift drops is added back
/// as the rounding bit.
#[inline]
pub fn fixmul<T: Fixed>(a: T, b: T) -> T {
    let c = (a.widen() * b.widen()) >> (T::FRAC_BITS - 1);
    T::narrow((c >> 1) + (c & 0x01))
}

/// Multiplies by a fractional weight and truncates toward negative infinity.
///
/// Used by the spectrum unpacking step, where every term is a plain
/// arithmetic shift of the widened product.
#[inline]
pub(crate) fn mul_trunc<T: Fixed>(a: T, weight: i32) -> i32 {
    (a.widen() * weight) >> T::FRAC_BITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixmul_q7_rounding() {
        assert_eq!(fixmul::<i8>(127, 127), 126);
        assert_eq!(fixmul::<i8>(64, 64), 32);
        assert_eq!(fixmul::<i8>(-64, 64), -32);
        assert_eq!(fixmul::<i8>(3, 5), 0);
        assert_eq!(fixmul::<i8>(100, 50), 39);
        assert_eq!(fixmul::<i8>(96, -96), -72);
    }

    #[test]
    fn fixmul_q7_rounds_the_dropped_bit() {
        // 127 * 1 >> 6 = 1: the dropped bit rounds the half up to 1.
        assert_eq!(fixmul::<i8>(127, 1), 1);
        // -127 >> 6 = -2 (arithmetic shift), halved to -1 with no carry.
        assert_eq!(fixmul::<i8>(-127, 1), -1);
        assert_eq!(fixmul::<i8>(1, 1), 0);
        assert_eq!(fixmul::<i8>(-1, 1), 0);
    }

    #[test]
    fn fixmul_saturates_instead_of_wrapping() {
        // -1.0 * -1.0 is +1.0, which is one step past the largest sample.
        assert_eq!(fixmul::<i8>(-128, -128), 127);
        assert_eq!(fixmul::<i16>(-32768, -32768), 32767);
    }

    #[test]
    fn fixmul_q15() {
        assert_eq!(fixmul::<i16>(16384, 16384), 8192);
        assert_eq!(fixmul::<i16>(32767, 32767), 32766);
        assert_eq!(fixmul::<i16>(3, 16384), 2);
        assert_eq!(fixmul::<i16>(-1, 16384), 0);
    }

    #[test]
    fn narrow_clamps_to_type_bounds() {
        assert_eq!(i8::narrow(300), 127);
        assert_eq!(i8::narrow(-300), -128);
        assert_eq!(i16::narrow(-40_000), -32768);
        assert_eq!(i16::narrow(1234), 1234);
    }

    #[test]
    fn mul_trunc_floors() {
        assert_eq!(mul_trunc::<i8>(50, 63), 24);
        assert_eq!(mul_trunc::<i8>(50, -63), -25);
    }
}
