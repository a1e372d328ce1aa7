//! # Twiddle Table Module
//!
//! Read-only sine tables shared by every transform in this crate.
//!
//! Only three quarters of one period are stored: a cosine is read
//! `N_WAVE / 4` entries ahead of the sine at the same argument, and the
//! butterfly passes never need an angle beyond half a period.

/// Length of a full sine period in table steps. This is also the largest
/// transform length supported by [`crate::fft::fix_fft`].
pub const N_WAVE: usize = 256;

/// `log2(N_WAVE)`, the largest supported transform order.
pub const LOG2_N_WAVE: u32 = 8;

/// Number of stored sine samples (`N_WAVE - N_WAVE / 4`).
pub const TABLE_LEN: usize = N_WAVE - N_WAVE / 4;

/// `round(127 * sin(2πk / N_WAVE))` for `k` in `0..TABLE_LEN`.
#[rustfmt::skip]
pub static SINE_Q7: [i8; TABLE_LEN] = [
       0,    3,    6,    9,   12,   16,   19,   22,
      25,   28,   31,   34,   37,   40,   43,   46,
      49,   51,   54,   57,   60,   63,   65,   68,
      71,   73,   76,   78,   81,   83,   85,   88,
      90,   92,   94,   96,   98,  100,  102,  104,
     106,  107,  109,  111,  112,  113,  115,  116,
     117,  118,  120,  121,  122,  122,  123,  124,
     125,  125,  126,  126,  126,  127,  127,  127,
     127,  127,  127,  127,  126,  126,  126,  125,
     125,  124,  123,  122,  122,  121,  120,  118,
     117,  116,  115,  113,  112,  111,  109,  107,
     106,  104,  102,  100,   98,   96,   94,   92,
      90,   88,   85,   83,   81,   78,   76,   73,
      71,   68,   65,   63,   60,   57,   54,   51,
      49,   46,   43,   40,   37,   34,   31,   28,
      25,   22,   19,   16,   12,    9,    6,    3,
       0,   -3,   -6,   -9,  -12,  -16,  -19,  -22,
     -25,  -28,  -31,  -34,  -37,  -40,  -43,  -46,
     -49,  -51,  -54,  -57,  -60,  -63,  -65,  -68,
     -71,  -73,  -76,  -78,  -81,  -83,  -85,  -88,
     -90,  -92,  -94,  -96,  -98, -100, -102, -104,
    -106, -107, -109, -111, -112, -113, -115, -116,
    -117, -118, -120, -121, -122, -122, -123, -124,
    -125, -125, -126, -126, -126, -127, -127, -127,];

/// `round(32767 * sin(2πk / N_WAVE))` for `k` in `0..TABLE_LEN`.
#[rustfmt::skip]
pub static SINE_Q15: [i16; TABLE_LEN] = [
         0,    804,   1608,   2410,   3212,   4011,   4808,   5602,
      6393,   7179,   7962,   8739,   9512,  10278,  11039,  11793,
     12539,  13279,  14010,  14732,  15446,  16151,  16846,  17530,
     18204,  18868,  19519,  20159,  20787,  21403,  22005,  22594,
     23170,  23731,  24279,  24811,  25329,  25832,  26319,  26790,
     27245,  27683,  28105,  28510,  28898,  29268,  29621,  29956,
     30273,  30571,  30852,  31113,  31356,  31580,  31785,  31971,
     32137,  32285,  32412,  32521,  32609,  32678,  32728,  32757,
     32767,  32757,  32728,  32678,  32609,  32521,  32412,  32285,
     32137,  31971,  31785,  31580,  31356,  31113,  30852,  30571,
     30273,  29956,  29621,  29268,  28898,  28510,  28105,  27683,
     27245,  26790,  26319,  25832,  25329,  24811,  24279,  23731,
     23170,  22594,  22005,  21403,  20787,  20159,  19519,  18868,
     18204,  17530,  16846,  16151,  15446,  14732,  14010,  13279,
     12539,  11793,  11039,  10278,   9512,   8739,   7962,   7179,
      6393,   5602,   4808,   4011,   3212,   2410,   1608,    804,
         0,   -804,  -1608,  -2410,  -3212,  -4011,  -4808,  -5602,
     -6393,  -7179,  -7962,  -8739,  -9512, -10278, -11039, -11793,
    -12539, -13279, -14010, -14732, -15446, -16151, -16846, -17530,
    -18204, -18868, -19519, -20159, -20787, -21403, -22005, -22594,
    -23170, -23731, -24279, -24811, -25329, -25832, -26319, -26790,
    -27245, -27683, -28105, -28510, -28898, -29268, -29621, -29956,
    -30273, -30571, -30852, -31113, -31356, -31580, -31785, -31971,
    -32137, -32285, -32412, -32521, -32609, -32678, -32728, -32757,];

/// Sine of `2πk / N_WAVE` from `table`.
///
/// # Panics
/// * If `k >= TABLE_LEN`
#[inline]
pub fn sine<T: Copy>(table: &[T; TABLE_LEN], k: usize) -> T {
    table[k]
}

/// Cosine of `2πk / N_WAVE` from `table`, valid for `k < N_WAVE / 2`.
#[inline]
pub fn cosine<T: Copy>(table: &[T; TABLE_LEN], k: usize) -> T {
    table[k + N_WAVE / 4]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_hit_full_scale_at_quarter_period() {
        assert_eq!(SINE_Q7[0], 0);
        assert_eq!(SINE_Q7[N_WAVE / 4], 127);
        assert_eq!(SINE_Q7[N_WAVE / 2], 0);
        assert_eq!(SINE_Q15[N_WAVE / 4], 32767);
        assert_eq!(SINE_Q15[TABLE_LEN - 1], -32757);
    }

    #[test]
    fn cosine_reads_a_quarter_period_ahead() {
        assert_eq!(cosine(&SINE_Q7, 0), 127);
        assert_eq!(cosine(&SINE_Q7, N_WAVE / 4), 0);
        assert_eq!(cosine(&SINE_Q15, N_WAVE / 8), sine(&SINE_Q15, N_WAVE / 8));
    }

    #[test]
    fn second_half_period_mirrors_the_first() {
        for k in 0..N_WAVE / 4 {
            assert_eq!(SINE_Q7[k + N_WAVE / 2], -SINE_Q7[k]);
            assert_eq!(SINE_Q15[k + N_WAVE / 2], -SINE_Q15[k]);
        }
    }
}
