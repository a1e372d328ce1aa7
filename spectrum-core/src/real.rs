//! # Real-Signal FFT Module
//!
//! Transforms `n` real samples with an `n/2`-point complex FFT. The samples
//! are rearranged so that the complex engine sees the even samples as its
//! real part and the odd samples as its imaginary part, both held in the
//! caller's single buffer:
//!
//! ```text
//! [x0 x1 x2 x3 x4 x5 x6 x7]  ->  [x0 x2 x4 x6 | x1 x3 x5 x7]
//!                                 real half     imaginary half
//! ```
//!
//! The packed half-size spectrum is not yet the spectrum of the real
//! signal; [`split`] unmixes it.

use crate::error::FftError;
use crate::fft::{fix_fft, transform_len, Direction};
use crate::fixed::{mul_trunc, Fixed};
use crate::twiddle::{cosine, sine, N_WAVE};

/// Forward or inverse real FFT of `2^order` samples, in place.
///
/// Forward output is the packed half-size spectrum (real parts in the first
/// half, imaginary parts in the second); pass it through [`split`] to get
/// the true bins. Inverse input is a packed spectrum in that same layout,
/// and the output is the interleaved time signal.
///
/// # Returns
/// * `Ok(shift)` - left shift needed to restore true amplitude (0 for forward)
/// * `Err(FftError::OrderTooSmall)` - `order == 0`
/// * `Err(FftError::LengthExceeded)` - `2^order > N_WAVE`
/// * `Err(FftError::BufferLength)` - `samples` is not exactly `2^order` long
pub fn fix_fftr<T: Fixed>(
    samples: &mut [T],
    order: u32,
    direction: Direction,
) -> Result<u32, FftError> {
    if order == 0 {
        return Err(FftError::OrderTooSmall);
    }
    let n = transform_len(order)?;
    if samples.len() != n {
        return Err(FftError::BufferLength {
            expected: n,
            found: samples.len(),
        });
    }

    match direction {
        Direction::Forward => forward_path(samples, order),
        Direction::Inverse => inverse_path(samples, order),
    }
}

/// Deinterleave first, then transform.
fn forward_path<T: Fixed>(samples: &mut [T], order: u32) -> Result<u32, FftError> {
    deinterleave(samples);
    let (re, im) = samples.split_at_mut(samples.len() / 2);
    fix_fft(re, im, order - 1, Direction::Forward)
}

/// Transform first, then interleave back into time order.
fn inverse_path<T: Fixed>(samples: &mut [T], order: u32) -> Result<u32, FftError> {
    let (re, im) = samples.split_at_mut(samples.len() / 2);
    let shift = fix_fft(re, im, order - 1, Direction::Inverse)?;
    interleave(samples);
    Ok(shift)
}

/// Moves even samples to the first half and odd samples to the second.
fn deinterleave<T: Fixed>(samples: &mut [T]) {
    let half = samples.len() / 2;
    let mut evens = [T::default(); N_WAVE / 2];
    let mut odds = [T::default(); N_WAVE / 2];

    for (i, pair) in samples.chunks_exact(2).enumerate() {
        evens[i] = pair[0];
        odds[i] = pair[1];
    }
    samples[..half].copy_from_slice(&evens[..half]);
    samples[half..].copy_from_slice(&odds[..half]);
}

/// Inverse of [`deinterleave`].
fn interleave<T: Fixed>(samples: &mut [T]) {
    let half = samples.len() / 2;
    let mut evens = [T::default(); N_WAVE / 2];
    let mut odds = [T::default(); N_WAVE / 2];
    evens[..half].copy_from_slice(&samples[..half]);
    odds[..half].copy_from_slice(&samples[half..]);

    for (i, pair) in samples.chunks_exact_mut(2).enumerate() {
        pair[0] = evens[i];
        pair[1] = odds[i];
    }
}

/// Unpacks the forward output of [`fix_fftr`] into the first `n/2` bins of
/// the spectrum of the original `n` real samples.
///
/// With `Z` the packed half-size spectrum and `W = e^(-2πi·k/n)`:
///
/// ```text
/// X[k] = Z[k]·A[k] + conj(Z[n/2 - k])·B[k]
/// A[k] = (1 - iW) / 2
/// B[k] = (1 + iW) / 2
/// ```
///
/// `Z[n/2]` wraps around to `Z[0]`. Both buffers use the packed layout:
/// real parts in `[0, n/2)`, imaginary parts in `[n/2, n)`.
///
/// The output carries a gain of `2/n` against the exact transform, so bin 0
/// comes out at twice the mean of the input. A DC level above half of full
/// scale saturates at `FULL_SCALE`.
pub fn split<T: Fixed>(packed: &[T], output: &mut [T], n: usize) -> Result<(), FftError> {
    if n < 2 || !n.is_power_of_two() {
        return Err(FftError::UnsupportedLength { len: n });
    }
    if n > N_WAVE {
        return Err(FftError::LengthExceeded {
            order: n.trailing_zeros(),
        });
    }
    for len in [packed.len(), output.len()] {
        if len != n {
            return Err(FftError::BufferLength { expected: n, found: len });
        }
    }

    let half = n / 2;
    let step = N_WAVE / n;
    let table = T::sine_table();
    let (xr, xi) = packed.split_at(half);
    let (gr, gi) = output.split_at_mut(half);

    for i in 0..half {
        let s = sine(table, i * step).widen();
        let c = cosine(table, i * step).widen();
        let ar = (T::FULL_SCALE - s) >> 1;
        let ai = (-c) >> 1;
        let br = (T::FULL_SCALE + s) >> 1;
        let bi = c >> 1;

        let mirror = (half - i) % half;
        gr[i] = T::narrow(
            mul_trunc(xr[i], ar) - mul_trunc(xi[i], ai)
                + mul_trunc(xr[mirror], br)
                + mul_trunc(xi[mirror], bi),
        );
        gi[i] = T::narrow(
            mul_trunc(xi[i], ar) + mul_trunc(xr[i], ai) + mul_trunc(xr[mirror], bi)
                - mul_trunc(xi[mirror], br),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleave_and_interleave_are_inverse() {
        let mut samples: Vec<i8> = (0..8).collect();
        deinterleave(&mut samples);
        assert_eq!(samples, [0, 2, 4, 6, 1, 3, 5, 7]);
        interleave(&mut samples);
        assert_eq!(samples, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn order_zero_is_rejected() {
        let mut samples = [1i8];
        assert_eq!(
            fix_fftr(&mut samples, 0, Direction::Forward),
            Err(FftError::OrderTooSmall)
        );
    }

    #[test]
    fn oversized_order_leaves_samples_untouched() {
        let mut samples = vec![3i16; 512];
        assert_eq!(
            fix_fftr(&mut samples, 9, Direction::Forward),
            Err(FftError::LengthExceeded { order: 9 })
        );
        assert!(samples.iter().all(|&v| v == 3));
    }

    #[test]
    fn forward_constant_reconstructs_dc() {
        let mut samples = [50i8; 128];
        let mut bins = [0i8; 128];

        fix_fftr(&mut samples, 7, Direction::Forward).unwrap();
        split(&samples, &mut bins, 128).unwrap();

        assert_eq!(bins[0], 97);
        assert_eq!(bins[64], -1);
        assert!(bins[1..].iter().all(|v| v.abs() <= 1), "{:?}", bins);
    }

    #[test]
    fn dc_above_half_scale_saturates() {
        let unpack = |level: i8| {
            let mut samples = [level; 16];
            let mut bins = [0i8; 16];
            fix_fftr(&mut samples, 4, Direction::Forward).unwrap();
            split(&samples, &mut bins, 16).unwrap();
            bins
        };

        assert_eq!(unpack(60)[0], 117);
        assert_eq!(unpack(120)[0], i8::MAX);
        assert!(unpack(120)[1..8].iter().all(|&b| b == 0));
    }

    #[test]
    fn split_rejects_bad_lengths() {
        let packed = [0i8; 12];
        let mut out = [0i8; 12];
        assert_eq!(
            split(&packed, &mut out, 12),
            Err(FftError::UnsupportedLength { len: 12 })
        );
        assert_eq!(
            split(&packed[..8], &mut out, 8),
            Err(FftError::BufferLength { expected: 8, found: 12 })
        );
    }

    #[test]
    fn split_wraps_mirror_of_bin_zero() {
        // Packed DC term only: Z[0] = 0.5 + 0i.
        let mut packed = [0i16; 8];
        packed[0] = 16384;
        let mut out = [0i16; 8];

        split(&packed, &mut out, 8).unwrap();

        // X[0] = Re Z0 + Im Z0, everything else stays near zero.
        assert!((out[0] as i32 - 16384).abs() <= 2, "{:?}", out);
        assert!(out[1..].iter().all(|v| v.abs() <= 2), "{:?}", out);
    }
}
