//! # Analyzer Configuration Module
//!
//! Settings shared by the acquisition thread, the analyzer and the display,
//! persisted as JSON.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::twiddle::LOG2_N_WAVE;

/// Which input the analyzer listens to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Microphone, first input channel.
    #[default]
    Mic,
    /// Line input, second input channel.
    Aux,
}

impl InputSource {
    /// Input channel carrying this source.
    pub fn channel(self) -> usize {
        match self {
            InputSource::Mic => 0,
            InputSource::Aux => 1,
        }
    }

    /// Label drawn in the corner of the display.
    pub fn label(self) -> &'static str {
        match self {
            InputSource::Mic => "mic",
            InputSource::Aux => "aux",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InputSource::Mic => InputSource::Aux,
            InputSource::Aux => InputSource::Mic,
        }
    }
}

/// Configuration of one analyzer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Frame length is `2^order` samples.
    pub order: u32,
    /// Requested capture rate in Hz.
    pub sample_rate: u32,
    /// How far a peak marker falls per frame.
    pub peak_decay_step: u8,
    /// Right shift applied to each squared component before summing.
    pub power_shift: u32,
    pub source: InputSource,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            order: 7,
            sample_rate: 44_100,
            peak_decay_step: 1,
            power_shift: 5,
            source: InputSource::Mic,
        }
    }
}

impl AnalyzerConfig {
    /// Samples per frame.
    pub fn frame_len(&self) -> usize {
        1 << self.order
    }

    /// Spectrum bins per frame.
    pub fn bin_count(&self) -> usize {
        self.frame_len() / 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.order == 0 || self.order > LOG2_N_WAVE {
            bail!(
                "order {} is outside the supported range 1..={}",
                self.order,
                LOG2_N_WAVE
            );
        }
        if self.sample_rate == 0 {
            bail!("sample rate must be positive");
        }
        if self.power_shift > 15 {
            bail!("power shift {} is larger than 15", self.power_shift);
        }
        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: AnalyzerConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }
}
