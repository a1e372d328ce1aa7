//! # Frame Analysis Module
//!
//! One step of the display loop: transform a captured frame, unpack the
//! real spectrum and update the bar meter.

use crate::bars::BarMeter;
use crate::config::AnalyzerConfig;
use crate::error::FftError;
use crate::fft::Direction;
use crate::real::{fix_fftr, split};
use crate::FrameSpectrum;

/// Reusable per-session analysis state.
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzer {
    order: u32,
    power_shift: u32,
    scratch: Vec<i8>,
    bins: Vec<i8>,
    meter: BarMeter,
}

impl SpectrumAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            order: config.order,
            power_shift: config.power_shift,
            scratch: Vec::new(),
            bins: Vec::new(),
            meter: BarMeter::new(0, config.power_shift, config.peak_decay_step),
        }
    }

    /// Analyzes one frame of `2^order` Q7 samples.
    ///
    /// On a transform error nothing is updated; the caller should skip the
    /// display refresh for this frame.
    pub fn process_frame(&mut self, frame: &[i8]) -> Result<FrameSpectrum, FftError> {
        let n = frame.len();
        self.scratch.clear();
        self.scratch.extend_from_slice(frame);

        let transformed = fix_fftr(&mut self.scratch, self.order, Direction::Forward)
            .and_then(|_| {
                self.bins.resize(n, 0);
                split(&self.scratch, &mut self.bins, n)
            });
        if let Err(err) = transformed {
            tracing::warn!(order = self.order, len = n, %err, "transform failed, skipping frame");
            return Err(err);
        }

        if self.meter.bars().len() != n / 2 {
            self.meter = BarMeter::new(n / 2, self.power_shift, self.meter.decay_step());
        }
        let bars = self.meter.update(&self.bins).to_vec();

        Ok(FrameSpectrum {
            bins: self.bins.clone(),
            bars,
        })
    }

    pub fn set_decay_step(&mut self, decay_step: u8) {
        self.meter.set_decay_step(decay_step);
    }

    /// Clears the peak markers.
    pub fn reset(&mut self) {
        self.meter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bars::MAX_LEVEL;

    fn tone(n: usize, bin: usize, amplitude: f32) -> Vec<i8> {
        (0..n)
            .map(|t| {
                let phase = 2.0 * std::f32::consts::PI * (bin * t) as f32 / n as f32;
                (amplitude * phase.cos()).round() as i8
            })
            .collect()
    }

    #[test]
    fn tone_raises_its_own_bar() {
        let config = AnalyzerConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config);

        let spectrum = analyzer.process_frame(&tone(128, 10, 100.0)).unwrap();

        assert_eq!(spectrum.bars.len(), 64);
        assert_eq!(spectrum.bins.len(), 128);
        let loudest = spectrum
            .bars
            .iter()
            .enumerate()
            .max_by_key(|(_, bar)| bar.level)
            .map(|(i, _)| i);
        assert_eq!(loudest, Some(10));
        assert_eq!(spectrum.bars[10].level, MAX_LEVEL);
        assert!(spectrum.bars[20].level <= 6);
    }

    #[test]
    fn wrong_frame_length_is_skipped() {
        let config = AnalyzerConfig::default();
        let mut analyzer = SpectrumAnalyzer::new(&config);

        assert_eq!(
            analyzer.process_frame(&[0; 64]),
            Err(FftError::BufferLength { expected: 128, found: 64 })
        );
    }

    #[test]
    fn oversized_order_is_skipped() {
        let config = AnalyzerConfig {
            order: 9,
            ..AnalyzerConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(&config);

        assert_eq!(
            analyzer.process_frame(&[0; 512]),
            Err(FftError::LengthExceeded { order: 9 })
        );
    }

    #[test]
    fn peaks_decay_between_frames() {
        let config = AnalyzerConfig {
            peak_decay_step: 4,
            ..AnalyzerConfig::default()
        };
        let mut analyzer = SpectrumAnalyzer::new(&config);

        analyzer.process_frame(&tone(128, 5, 100.0)).unwrap();
        let quiet = analyzer.process_frame(&[0; 128]).unwrap();

        assert_eq!(quiet.bars[5].level, 1);
        assert_eq!(quiet.bars[5].peak, MAX_LEVEL - 4);
    }
}
