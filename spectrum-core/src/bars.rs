//! # Bar Meter Module
//!
//! Turns a Q7 spectrum into display bars: per-bin power, log compression
//! to decibels and a decaying peak marker per bar.

use once_cell::sync::Lazy;

/// Highest compressed level, `round(20·log10(256))`.
pub const MAX_LEVEL: u8 = 48;

/// `max(1, round(20·log10(x + 1)))` for every `u8` power value.
///
/// Computed once on first use.
static DB_TABLE: Lazy<[u8; 256]> = Lazy::new(|| {
    let mut table = [0u8; 256];
    for (x, entry) in table.iter_mut().enumerate() {
        let db = (20.0 * ((x + 1) as f32).log10()).round() as u8;
        *entry = db.max(1);
    }
    table
});

/// A single display bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bar {
    /// Compressed level of the latest frame, `1..=MAX_LEVEL`.
    pub level: u8,
    /// Peak marker, held above the level and decaying frame by frame.
    pub peak: u8,
}

/// Power of one bin: `(re² >> shift) + (im² >> shift)`, saturated to `u8`.
pub fn bin_power(re: i8, im: i8, shift: u32) -> u8 {
    let re = re as i32;
    let im = im as i32;
    let power = ((re * re) >> shift) + ((im * im) >> shift);
    power.min(u8::MAX as i32) as u8
}

/// Log-compresses a power value to a bar level in decibels.
#[inline]
pub fn compress(power: u8) -> u8 {
    DB_TABLE[power as usize]
}

/// Keeps one [`Bar`] per spectrum bin across frames.
#[derive(Debug, Clone)]
pub struct BarMeter {
    bars: Vec<Bar>,
    power_shift: u32,
    decay_step: u8,
}

impl BarMeter {
    pub fn new(bins: usize, power_shift: u32, decay_step: u8) -> Self {
        Self {
            bars: vec![Bar::default(); bins],
            power_shift,
            decay_step,
        }
    }

    /// Feeds one frame of bins in the packed layout (real parts in the first
    /// half, imaginary parts in the second).
    pub fn update(&mut self, spectrum: &[i8]) -> &[Bar] {
        let (re, im) = spectrum.split_at(spectrum.len() / 2);

        for ((bar, &re), &im) in self.bars.iter_mut().zip(re).zip(im) {
            bar.level = compress(bin_power(re, im, self.power_shift));
            if bar.level > bar.peak {
                bar.peak = bar.level;
            } else if bar.peak > 1 {
                // Never decays into the bar.
                bar.peak = bar.peak.saturating_sub(self.decay_step).max(bar.level);
            } else {
                bar.peak = 0;
            }
        }

        &self.bars
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn decay_step(&self) -> u8 {
        self.decay_step
    }

    pub fn set_decay_step(&mut self, decay_step: u8) {
        self.decay_step = decay_step;
    }

    /// Drops all levels and peaks, e.g. after an input switch.
    pub fn reset(&mut self) {
        self.bars.fill(Bar::default());
    }
}
