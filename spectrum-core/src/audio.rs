//! # Audio Capture Module
//!
//! Captures audio through CPAL and delivers fixed-length frames of
//! zero-centred Q7 samples to the analysis thread.
//!
//! ## Buffering
//! The capture callback fills one frame while the previous frame is owned
//! by the consumer. Finished frames move through a bounded channel, which
//! doubles as the buffer-ready flag, and spent frames come back on a
//! recycle channel. A buffer is only ever reachable from one side at a
//! time. If the consumer still holds an unread frame when the next one
//! completes, the new frame is dropped and counted as an overrun.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, RecvError, Sender, TrySendError};

use crate::config::{AnalyzerConfig, InputSource};

/// Converts a float sample in `[-1.0, 1.0]` to a zero-centred Q7 sample.
pub fn quantize(sample: f32) -> i8 {
    (sample * 128.0).round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Input source shared between the GUI and the capture callback.
#[derive(Debug, Clone, Default)]
pub struct SourceSelector(Arc<AtomicU8>);

impl SourceSelector {
    pub fn new(source: InputSource) -> Self {
        let selector = Self::default();
        selector.set(source);
        selector
    }

    pub fn get(&self) -> InputSource {
        match self.0.load(Ordering::Relaxed) {
            0 => InputSource::Mic,
            _ => InputSource::Aux,
        }
    }

    pub fn set(&self, source: InputSource) {
        self.0.store(source.channel() as u8, Ordering::Relaxed);
    }
}

/// Producer half of the frame channel, owned by the capture callback.
#[derive(Debug)]
pub struct FrameAssembler {
    frame_len: usize,
    filling: Vec<i8>,
    ready_tx: Sender<Vec<i8>>,
    recycle_rx: Receiver<Vec<i8>>,
    overruns: u64,
}

/// Consumer half of the frame channel.
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    ready_rx: Receiver<Vec<i8>>,
    recycle_tx: Sender<Vec<i8>>,
}

/// Spare buffers circulating besides the one being filled.
const SPARE_FRAMES: usize = 2;

/// Creates a connected assembler/receiver pair for frames of `frame_len`.
///
/// All frame buffers are allocated here, so the capture callback never
/// allocates.
pub fn frame_channel(frame_len: usize) -> (FrameAssembler, FrameReceiver) {
    let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
    let (recycle_tx, recycle_rx) = crossbeam_channel::bounded(SPARE_FRAMES);
    for _ in 0..SPARE_FRAMES {
        let _ = recycle_tx.try_send(Vec::with_capacity(frame_len));
    }
    let assembler = FrameAssembler {
        frame_len,
        filling: Vec::with_capacity(frame_len),
        ready_tx,
        recycle_rx,
        overruns: 0,
    };
    (assembler, FrameReceiver { ready_rx, recycle_tx })
}

impl FrameAssembler {
    /// Appends one sample, handing the frame over once it is full.
    pub fn push(&mut self, sample: i8) {
        self.filling.push(sample);
        if self.filling.len() == self.frame_len {
            self.flush();
        }
    }

    /// Appends the samples of `channel` from interleaved float data.
    /// Falls back to the first channel when `channel` does not exist.
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize, channel: usize) {
        let channels = channels.max(1);
        let channel = if channel < channels { channel } else { 0 };
        for frame in data.chunks_exact(channels) {
            self.push(quantize(frame[channel]));
        }
    }

    /// Frames dropped because the consumer had not taken the previous one.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    fn flush(&mut self) {
        if self.ready_tx.is_full() {
            self.drop_frame("consumer busy, dropping frame");
            return;
        }

        // All spares are still with the consumer.
        let Ok(mut spare) = self.recycle_rx.try_recv() else {
            self.drop_frame("no spare buffer, dropping frame");
            return;
        };
        spare.clear();
        let full = std::mem::replace(&mut self.filling, spare);

        match self.ready_tx.try_send(full) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.overruns += 1,
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("frame receiver dropped");
            }
        }
    }

    fn drop_frame(&mut self, reason: &'static str) {
        self.overruns += 1;
        tracing::debug!(overruns = self.overruns, "{}", reason);
        self.filling.clear();
    }
}

impl FrameReceiver {
    /// Blocks until the next frame is ready.
    pub fn recv(&self) -> Result<Vec<i8>, RecvError> {
        self.ready_rx.recv()
    }

    /// The raw ready channel, for use in `crossbeam_channel::select!`.
    pub fn ready(&self) -> &Receiver<Vec<i8>> {
        &self.ready_rx
    }

    /// Returns a spent frame buffer to the producer.
    pub fn recycle(&self, frame: Vec<i8>) {
        let _ = self.recycle_tx.try_send(frame);
    }
}

/// Starts audio capture from the default input device.
///
/// # Returns
/// * `Ok((stream, sample_rate, frames))` - stream handle, actual rate and
///   the receiving end of the frame channel
/// * `Err(e)` - no usable input device or configuration
pub fn start_audio_capture(
    config: &AnalyzerConfig,
    selector: SourceSelector,
) -> Result<(cpal::Stream, u32, FrameReceiver)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    let device_name = device.name()?;
    tracing::info!(device = %device_name, "using audio input device");

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, config.sample_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = config.sample_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let stream_config: cpal::StreamConfig =
        supported_config.with_sample_rate(cpal::SampleRate(rate)).into();
    let channels = stream_config.channels as usize;

    tracing::info!(sample_rate = rate, channels, "selected input format");
    if channels < 2 {
        tracing::info!("mono input, aux source reads the only channel");
    }

    let (mut assembler, frames) = frame_channel(config.frame_len());
    let err_fn = |err| tracing::error!("audio stream error: {}", err);

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let channel = selector.get().channel();
            assembler.push_interleaved(data, channels, channel);
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, rate, frames))
}

/// Picks the f32 configuration whose rate range lies nearest to
/// `target_rate`, preferring configurations with a second channel.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let rate_miss = if target_rate < c.min_sample_rate().0 {
                c.min_sample_rate().0 - target_rate
            } else {
                target_rate.saturating_sub(c.max_sample_rate().0)
            };
            (rate_miss, c.channels() < 2, c.channels())
        })
}
