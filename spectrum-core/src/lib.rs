// spectrum-core/src/lib.rs

//! The core logic for the fixed-point spectrum analyzer.
//! This crate is responsible for the integer FFT engine, spectrum
//! unpacking, bar metering and audio acquisition. It is completely
//! headless and contains no GUI code.
//!
//! The transforms never allocate and hold no state between calls; all
//! buffers belong to the caller.

pub mod analysis;
pub mod audio;
pub mod bars;
pub mod config;
pub mod error;
pub mod fft;
pub mod fixed;
pub mod real;
pub mod twiddle;

pub use error::FftError;
pub use fft::{fix_fft, Direction};
pub use fixed::{fixmul, Fixed, Q15, Q7};
pub use real::{fix_fftr, split};

/// Represents the result of analyzing a single audio frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpectrum {
    /// Unpacked spectrum in the packed layout: real parts of bins
    /// `0..n/2`, followed by their imaginary parts. Scaled by `2/n`; DC
    /// above half of full scale clips at 127.
    pub bins: Vec<i8>,
    /// One display bar per bin.
    pub bars: Vec<bars::Bar>,
}
