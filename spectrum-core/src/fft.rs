//! # Fixed-Point Complex FFT Module
//!
//! In-place radix-2 decimation-in-time FFT over parallel real/imaginary
//! arrays of fixed-point samples.
//!
//! ## Scaling
//! - **Forward**: every operand is halved on every pass. With `log2(n)`
//!   passes the output is the true transform divided by `n`, and the
//!   rounding error is spread across the passes. The returned shift is
//!   always 0.
//! - **Inverse**: fixed scaling is not possible, since two full-scale
//!   coefficients sum past the sample range. Before each pass the data is
//!   scanned and halved only if some magnitude exceeds a quarter of full
//!   scale. The number of halvings is returned; the true output is the
//!   result multiplied by `2^shift`.

use crate::error::FftError;
use crate::fixed::{fixmul, Fixed};
use crate::twiddle::{cosine, sine, LOG2_N_WAVE, N_WAVE};

/// Transform direction. Selects the scaling policy and the twiddle sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Time to frequency, fixed `1/n` scaling.
    Forward,
    /// Frequency to time, data-dependent scaling.
    Inverse,
}

/// Checks that `order` is supported and returns the transform length.
pub(crate) fn transform_len(order: u32) -> Result<usize, FftError> {
    if order > LOG2_N_WAVE {
        return Err(FftError::LengthExceeded { order });
    }
    Ok(1 << order)
}

/// Performs a forward or inverse FFT of length `2^order` in place.
///
/// `re` and `im` hold the real and imaginary parts, both as input and as
/// result, in natural order.
///
/// # Returns
/// * `Ok(shift)` - left shift needed to restore true amplitude (0 for forward)
/// * `Err(FftError::LengthExceeded)` - `2^order > N_WAVE`
/// * `Err(FftError::BufferLength)` - a slice is not exactly `2^order` long
pub fn fix_fft<T: Fixed>(
    re: &mut [T],
    im: &mut [T],
    order: u32,
    direction: Direction,
) -> Result<u32, FftError> {
    let n = transform_len(order)?;
    for len in [re.len(), im.len()] {
        if len != n {
            return Err(FftError::BufferLength { expected: n, found: len });
        }
    }

    bit_reverse(re, im);
    Ok(butterfly_passes(re, im, direction))
}

/// Reorders both arrays so element `i` lands at the bit reversal of `i`.
///
/// `mr` carries the reversed counterpart of `m`; each step adds one at the
/// top bit and propagates the carry downward.
fn bit_reverse<T: Fixed>(re: &mut [T], im: &mut [T]) {
    let n = re.len();
    let nn = n - 1;
    let mut mr = 0;

    for m in 1..=nn {
        let mut l = n;
        loop {
            l >>= 1;
            if mr + l <= nn {
                break;
            }
        }
        mr = (mr & (l - 1)) + l;

        if mr > m {
            re.swap(m, mr);
            im.swap(m, mr);
        }
    }
}

/// True when an inverse pass has to halve the data to stay in range.
fn needs_rescale<T: Fixed>(re: &[T], im: &[T]) -> bool {
    re.iter()
        .zip(im)
        .any(|(r, i)| r.widen().abs() > T::QUARTER_SCALE || i.widen().abs() > T::QUARTER_SCALE)
}

fn butterfly_passes<T: Fixed>(re: &mut [T], im: &mut [T], direction: Direction) -> u32 {
    let n = re.len();
    let table = T::sine_table();
    let mut scale = 0;

    let mut l = 1;
    // Twiddle index step for the current pass is `1 << k`.
    let mut k = LOG2_N_WAVE - 1;
    while l < n {
        let shift = match direction {
            Direction::Forward => true,
            Direction::Inverse => {
                let shift = needs_rescale(re, im);
                if shift {
                    scale += 1;
                }
                shift
            }
        };

        // Every sample is halved exactly once during a shifted pass: once
        // as the upper operand directly, once as the lower operand through
        // the halved twiddle.
        let istep = l << 1;
        for m in 0..l {
            let w = m << k;
            debug_assert!(w < N_WAVE / 2);
            let mut wr = cosine(table, w).widen();
            let mut wi = -sine(table, w).widen();
            if direction == Direction::Inverse {
                wi = -wi;
            }
            if shift {
                wr >>= 1;
                wi >>= 1;
            }
            let (wr, wi) = (T::narrow(wr), T::narrow(wi));

            for i in (m..n).step_by(istep) {
                let j = i + l;
                let tr = T::narrow(fixmul(wr, re[j]).widen() - fixmul(wi, im[j]).widen());
                let ti = T::narrow(fixmul(wr, im[j]).widen() + fixmul(wi, re[j]).widen());
                let (tr, ti) = (tr.widen(), ti.widen());
                let mut qr = re[i].widen();
                let mut qi = im[i].widen();
                if shift {
                    qr >>= 1;
                    qi >>= 1;
                }
                re[j] = T::narrow(qr - tr);
                im[j] = T::narrow(qi - ti);
                re[i] = T::narrow(qr + tr);
                im[i] = T::narrow(qi + ti);
            }
        }
        k = k.saturating_sub(1);
        l = istep;
    }

    scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_rate_cosine_lands_in_bins_two_and_six() {
        let mut re: [i8; 8] = [100, 0, -100, 0, 100, 0, -100, 0];
        let mut im = [0i8; 8];

        let shift = fix_fft(&mut re, &mut im, 3, Direction::Forward).unwrap();

        assert_eq!(shift, 0);
        assert_eq!(re, [0, 0, 49, 0, 0, 0, 49, 0]);
        assert!(im.iter().all(|v| v.abs() <= 1), "imag: {:?}", im);
    }

    #[test]
    fn constant_input_goes_to_dc() {
        let mut re = [80i8; 16];
        let mut im = [0i8; 16];

        fix_fft(&mut re, &mut im, 4, Direction::Forward).unwrap();

        assert_eq!(re[0], 76);
        assert!(re[1..].iter().all(|&v| v == 0));
        assert!(im.iter().all(|&v| v == 0));
    }

    #[test]
    fn length_one_is_identity() {
        let mut re = [55i8];
        let mut im = [-3i8];
        assert_eq!(fix_fft(&mut re, &mut im, 0, Direction::Forward), Ok(0));
        assert_eq!(fix_fft(&mut re, &mut im, 0, Direction::Inverse), Ok(0));
        assert_eq!((re[0], im[0]), (55, -3));
    }

    #[test]
    fn oversized_order_leaves_buffers_untouched() {
        let mut re = [7i8; 8];
        let mut im = [-7i8; 8];

        let err = fix_fft(&mut re, &mut im, LOG2_N_WAVE + 1, Direction::Forward).unwrap_err();

        assert_eq!(err, FftError::LengthExceeded { order: LOG2_N_WAVE + 1 });
        assert_eq!(re, [7; 8]);
        assert_eq!(im, [-7; 8]);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let mut re = [1i16; 8];
        let mut im = [1i16; 4];
        assert_eq!(
            fix_fft(&mut re, &mut im, 3, Direction::Forward),
            Err(FftError::BufferLength { expected: 8, found: 4 })
        );
        assert_eq!(re, [1; 8]);
    }

    #[test]
    fn inverse_reports_shift_and_restores_q7_signal() {
        let input: [i8; 8] = [90, -40, 12, 70, -100, 33, 5, -64];
        let mut re = input;
        let mut im = [0i8; 8];

        fix_fft(&mut re, &mut im, 3, Direction::Forward).unwrap();
        let shift = fix_fft(&mut re, &mut im, 3, Direction::Inverse).unwrap();

        assert_eq!(shift, 1);
        for (out, orig) in re.iter().zip(input) {
            let restored = (*out as i32) << shift;
            assert!((restored - orig as i32).abs() <= 8, "{} vs {}", restored, orig);
        }
        assert!(im.iter().all(|&v| v == 0));
    }

    #[test]
    fn bit_reverse_permutes_indices() {
        let mut re: Vec<i16> = (0..16).collect();
        let mut im: Vec<i16> = (0..16).map(|v| -v).collect();

        bit_reverse(&mut re, &mut im);

        assert_eq!(re, [0, 8, 4, 12, 2, 10, 6, 14, 1, 9, 5, 13, 3, 11, 7, 15]);
        assert_eq!(im[1], -8);
    }

    #[test]
    fn inverse_of_small_spectrum_needs_no_shift() {
        let mut re = [10i16, 0, 0, 0];
        let mut im = [0i16; 4];
        let shift = fix_fft(&mut re, &mut im, 2, Direction::Inverse).unwrap();
        assert_eq!(shift, 0);
        assert_eq!(re, [10, 10, 10, 10]);
    }
}
