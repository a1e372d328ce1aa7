use thiserror::Error;

use crate::twiddle::LOG2_N_WAVE;

/// Errors the transform functions can return.
///
/// A failed call never touches the caller's buffers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// `2^order` is larger than the twiddle table supports.
    #[error("transform order {order} exceeds the maximum of {max}", max = LOG2_N_WAVE)]
    LengthExceeded { order: u32 },
    /// The real-signal transform needs at least two samples.
    #[error("real transform order must be at least 1")]
    OrderTooSmall,
    /// The spectrum length is not a power of two of at least 2.
    #[error("unsupported spectrum length {len}")]
    UnsupportedLength { len: usize },
    /// A buffer does not hold exactly the number of samples the transform needs.
    #[error("expected a buffer of {expected} samples, got {found}")]
    BufferLength { expected: usize, found: usize },
}
