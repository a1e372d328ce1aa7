//! # Fixed-Point Spectrum Analyzer GUI
//!
//! Real-time bar display of the integer FFT running on live input.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: captures Q7 frames and runs the fixed-point analyzer
//! - **Communication**: Crossbeam channels for thread-safe data exchange
//! - **Updates**: 60 FPS continuous updates via subscription system

mod ui;

use anyhow::Context;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use iced::{Element, Subscription, Task, Theme};
use spectrum_core::audio::{self, SourceSelector};
use spectrum_core::bars::Bar;
use spectrum_core::config::{AnalyzerConfig, InputSource};
use spectrum_core::{analysis::SpectrumAnalyzer, FrameSpectrum};
use std::thread::{self, JoinHandle};
use tracing_subscriber::EnvFilter;
use ui::main_display::create_main_view;

const CONFIG_PATH: &str = "analyzer_config.json";

/// Used when `RUST_LOG` is unset or does not parse.
const DEFAULT_LOG_FILTER: &str = "spectrum_core=info,spectrum_gui=info";

pub fn main() -> iced::Result {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    eprintln!("[MAIN] Starting spectrum analyzer...");
    let result = iced::application("Fixed-Point Spectrum", SpectrumApp::update, SpectrumApp::view)
        .subscription(SpectrumApp::subscription)
        .theme(SpectrumApp::theme)
        .run();
    eprintln!("[MAIN] Application finished with result: {:?}", result);
    result
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[derive(Debug, Clone)]
pub enum Message {
    ToggleSource,
    SaveConfig,
    LoadConfig,
    Exit,
    Tick,
}

/// Events posted by the audio thread.
#[derive(Debug)]
enum WorkerEvent {
    Started { sample_rate: u32 },
    Frame(FrameSpectrum),
}

/// Requests from the GUI to the audio thread.
#[derive(Debug, Clone, Copy)]
enum WorkerCommand {
    ResetMeter,
    SetDecayStep(u8),
}

/// Everything the view needs to draw a frame.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub audio_worker_active: bool,
    pub source: InputSource,
    pub sample_rate: Option<u32>,
    pub frame_len: usize,
    pub bars: Vec<Bar>,
    pub frames_shown: u64,
}

#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    command_tx: Sender<WorkerCommand>,
    events_rx: Receiver<WorkerEvent>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                eprintln!("[MAIN] Audio thread panicked during shutdown");
            }
        }
    }
}

struct SpectrumApp {
    config: AnalyzerConfig,
    selector: SourceSelector,
    audio_worker: Option<AudioWorker>,
    display_data: AppDisplayData,
}

impl Default for SpectrumApp {
    fn default() -> Self {
        eprintln!("[MAIN] Creating SpectrumApp...");
        let config = match AnalyzerConfig::load(CONFIG_PATH) {
            Ok(config) => {
                eprintln!("[MAIN] Loaded configuration from {}", CONFIG_PATH);
                config
            }
            Err(e) => {
                eprintln!("[MAIN] Using default configuration: {:#}", e);
                AnalyzerConfig::default()
            }
        };

        let mut app = Self {
            selector: SourceSelector::new(config.source),
            display_data: AppDisplayData {
                audio_worker_active: false,
                source: config.source,
                sample_rate: None,
                frame_len: config.frame_len(),
                bars: Vec::new(),
                frames_shown: 0,
            },
            config,
            audio_worker: None,
        };

        app.start_audio_processing();
        app
    }
}

impl SpectrumApp {
    fn start_audio_processing(&mut self) {
        match spawn_audio_worker(self.config.clone(), self.selector.clone()) {
            Ok(worker) => {
                self.audio_worker = Some(worker);
                self.display_data.audio_worker_active = true;
            }
            Err(e) => eprintln!("[MAIN] Could not start audio worker: {:#}", e),
        }
    }

    fn stop_audio_processing(&mut self) {
        if let Some(worker) = self.audio_worker.take() {
            eprintln!("[MAIN] Shutting down audio worker...");
            worker.stop();
        }
        self.display_data.audio_worker_active = false;
        self.display_data.sample_rate = None;
    }

    fn send_command(&self, command: WorkerCommand) {
        if let Some(worker) = &self.audio_worker {
            if worker.command_tx.send(command).is_err() {
                eprintln!("[MAIN] Audio thread is gone, dropping {:?}", command);
            }
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Exit => {
                eprintln!("[MAIN] Exit requested - starting cleanup...");
                self.stop_audio_processing();
                return iced::exit();
            }
            Message::ToggleSource => {
                let source = self.selector.get().toggled();
                eprintln!("[MAIN] Switching input to {}", source.label());
                self.selector.set(source);
                self.config.source = source;
                self.display_data.source = source;
                self.send_command(WorkerCommand::ResetMeter);
            }
            Message::SaveConfig => match self.config.save(CONFIG_PATH) {
                Ok(()) => eprintln!("[MAIN] Configuration saved to {}", CONFIG_PATH),
                Err(e) => eprintln!("[MAIN] Error saving configuration: {:#}", e),
            },
            Message::LoadConfig => match AnalyzerConfig::load(CONFIG_PATH) {
                Ok(config) => self.apply_config(config),
                Err(e) => eprintln!("[MAIN] Error loading configuration: {:#}", e),
            },
            Message::Tick => {
                let events: Vec<WorkerEvent> = match &self.audio_worker {
                    Some(worker) => worker.events_rx.try_iter().collect(),
                    None => Vec::new(),
                };
                for event in events {
                    self.process_worker_event(event);
                }
            }
        }
        Task::none()
    }

    /// Applies a freshly loaded configuration. Frame geometry and capture
    /// settings need a new audio thread; source and decay apply live.
    fn apply_config(&mut self, config: AnalyzerConfig) {
        let restart = config.order != self.config.order
            || config.sample_rate != self.config.sample_rate
            || config.power_shift != self.config.power_shift;

        self.selector.set(config.source);
        self.display_data.source = config.source;
        self.display_data.frame_len = config.frame_len();
        self.config = config;

        if restart {
            eprintln!("[MAIN] Capture settings changed, restarting audio worker");
            self.stop_audio_processing();
            self.display_data.bars.clear();
            self.start_audio_processing();
        } else {
            self.send_command(WorkerCommand::SetDecayStep(self.config.peak_decay_step));
            self.send_command(WorkerCommand::ResetMeter);
        }
        eprintln!("[MAIN] Configuration loaded from {}", CONFIG_PATH);
    }

    fn process_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Started { sample_rate } => {
                self.display_data.sample_rate = Some(sample_rate);
            }
            WorkerEvent::Frame(spectrum) => {
                self.display_data.bars = spectrum.bars;
                self.display_data.frames_shown += 1;
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Spawns the thread that owns the input stream and the analyzer.
///
/// Frames that fail analysis are reported and skipped; the display keeps
/// the previous bars.
fn spawn_audio_worker(
    config: AnalyzerConfig,
    selector: SourceSelector,
) -> anyhow::Result<AudioWorker> {
    config.validate()?;

    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<WorkerCommand>();
    let (events_tx, events_rx) = crossbeam_channel::unbounded::<WorkerEvent>();

    let thread_handle = thread::Builder::new()
        .name("audio-worker".into())
        .spawn(move || {
            eprintln!("[AUDIO-THREAD] Starting audio thread...");
            let (stream, sample_rate, frames) =
                match audio::start_audio_capture(&config, selector) {
                    Ok(started) => started,
                    Err(e) => {
                        eprintln!("[AUDIO-THREAD] Fatal Error starting audio: {:#}", e);
                        return;
                    }
                };
            eprintln!("[AUDIO-THREAD] Capturing at {} Hz", sample_rate);
            if events_tx.send(WorkerEvent::Started { sample_rate }).is_err() {
                return;
            }

            let mut analyzer = SpectrumAnalyzer::new(&config);
            loop {
                crossbeam_channel::select! {
                    recv(frames.ready()) -> msg => match msg {
                        Ok(frame) => {
                            let result = analyzer.process_frame(&frame);
                            frames.recycle(frame);
                            match result {
                                Ok(spectrum) => {
                                    if events_tx.send(WorkerEvent::Frame(spectrum)).is_err() {
                                        eprintln!("[AUDIO-THREAD] GUI receiver dropped");
                                        break;
                                    }
                                }
                                Err(e) => eprintln!("[AUDIO-THREAD] Skipping frame: {}", e),
                            }
                        }
                        Err(_) => {
                            eprintln!("[AUDIO-THREAD] Audio channel closed");
                            break;
                        }
                    },
                    recv(command_rx) -> msg => match msg {
                        Ok(WorkerCommand::ResetMeter) => analyzer.reset(),
                        Ok(WorkerCommand::SetDecayStep(step)) => analyzer.set_decay_step(step),
                        Err(_) => break,
                    },
                    recv(shutdown_rx) -> _ => {
                        eprintln!("[AUDIO-THREAD] Received shutdown signal");
                        break;
                    },
                }
            }

            if let Err(e) = stream.pause() {
                eprintln!("[AUDIO-THREAD] Error pausing stream: {}", e);
            }
            drop(stream);
            eprintln!("[AUDIO-THREAD] Audio thread finished");
        })
        .context("spawning audio thread")?;

    Ok(AudioWorker {
        shutdown_tx,
        command_tx,
        events_rx,
        thread_handle: Some(thread_handle),
    })
}
