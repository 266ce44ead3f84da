//! `rodio` implementation of the playback backend.
//!
//! Each binding opens its own `OutputStream` and `Sink`, so a failed rung
//! drops everything it created. Stop events do not exist in rodio; they are
//! derived from the sink draining and from the stream error callback.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::cpal::traits::HostTrait;
use rodio::cpal::{self, BufferSize};
use rodio::source::UniformSourceIterator;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::library::Track;

use super::backend::{AudioBackend, BindStrategy, DecodedSource, OutputHandle, StopEvent};
use super::error::PlaybackError;

type FileDecoder = Decoder<BufReader<File>>;
type DeviceErrors = Arc<Mutex<Option<String>>>;

fn open_decoder(path: &Path) -> Result<FileDecoder, PlaybackError> {
    if !path.exists() {
        return Err(PlaybackError::FileMissing(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| PlaybackError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// How the decoder is wrapped before it reaches the sink.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Native,
    /// Stereo at the given rate, or at the source's own rate when `None`.
    Stereo(Option<u32>),
}

impl Shape {
    fn append(self, sink: &Sink, decoder: FileDecoder) {
        match self {
            Shape::Native => sink.append(decoder),
            Shape::Stereo(rate) => {
                let rate = rate.unwrap_or_else(|| decoder.sample_rate());
                sink.append(UniformSourceIterator::new(decoder, 2, rate));
            }
        }
    }
}

/// A file checked to be decodable. The probing decoder is kept for the
/// first binding attempt; later attempts reopen the file.
pub struct RodioSource {
    path: PathBuf,
    duration: Duration,
    pending: Option<FileDecoder>,
}

impl RodioSource {
    fn take_decoder(&mut self) -> Result<FileDecoder, PlaybackError> {
        match self.pending.take() {
            Some(decoder) => Ok(decoder),
            None => open_decoder(&self.path),
        }
    }
}

impl DecodedSource for RodioSource {
    fn duration(&self) -> Duration {
        self.duration
    }
}

/// Turns raw sink observations into stop events.
///
/// A drain is reported once, with the position the sink had reached, and a
/// device error is reported once per output however often the stream keeps
/// failing.
#[derive(Debug, Default)]
struct StopTracker {
    drained_at: Option<Duration>,
    failed: bool,
}

impl StopTracker {
    fn drained(&self) -> bool {
        self.drained_at.is_some()
    }

    fn observe(
        &mut self,
        device_error: Option<String>,
        sink_empty: bool,
        position: Duration,
    ) -> Option<StopEvent> {
        if let Some(error) = device_error.filter(|_| !self.failed) {
            self.failed = true;
            return Some(StopEvent { error: Some(error) });
        }

        if !self.drained() && sink_empty {
            self.drained_at = Some(position);
            return Some(StopEvent::default());
        }
        None
    }

    fn refilled(&mut self) {
        self.drained_at = None;
    }
}

pub struct RodioOutput {
    _stream: OutputStream,
    sink: Sink,
    path: PathBuf,
    shape: Shape,
    errors: DeviceErrors,
    stops: StopTracker,
}

impl RodioOutput {
    /// Put a fresh decoder in a sink that has played to the end.
    fn refill(&mut self) -> Result<(), PlaybackError> {
        if !self.stops.drained() {
            return Ok(());
        }
        let decoder = open_decoder(&self.path)?;
        self.shape.append(&self.sink, decoder);
        self.stops.refilled();
        Ok(())
    }
}

impl OutputHandle for RodioOutput {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.refill()?;
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.sink.pause();
        Ok(())
    }

    // `Sink::stop` empties the queue, so stopping is a pause plus rewind.
    fn stop(&mut self) -> Result<(), PlaybackError> {
        self.sink.pause();
        if self.stops.drained() {
            return self.refill();
        }
        self.seek(Duration::ZERO)
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        self.refill()?;
        self.sink
            .try_seek(to)
            .map_err(|e| PlaybackError::Device(format!("seek failed: {e}")))
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.stops.drained_at.unwrap_or_else(|| self.sink.get_pos())
    }

    fn poll_stopped(&mut self) -> Option<StopEvent> {
        let device_error = self.errors.lock().ok().and_then(|mut slot| slot.take());
        let event = self
            .stops
            .observe(device_error, self.sink.empty(), self.sink.get_pos())?;
        if event.error.is_some() {
            self.sink.pause();
        }
        Some(event)
    }

    fn release(self) -> Result<(), PlaybackError> {
        self.sink.stop();
        Ok(())
    }
}

/// Backend playing through `rodio`/`cpal`.
pub struct RodioBackend {
    host: Option<cpal::Host>,
    resample_rate: u32,
    relaxed_buffer_frames: u32,
}

impl RodioBackend {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            host: Some(cpal::default_host()),
            resample_rate: settings.resample_rate,
            relaxed_buffer_frames: settings.relaxed_buffer_frames,
        }
    }

    fn first_device_builder(&mut self) -> Result<OutputStreamBuilder, String> {
        let host = self.host.get_or_insert_with(cpal::default_host);
        let device = host
            .output_devices()
            .map_err(|e| e.to_string())?
            .next()
            .ok_or_else(|| "host has no output devices".to_string())?;
        OutputStreamBuilder::from_device(device).map_err(|e| e.to_string())
    }

    fn open_stream(
        &mut self,
        strategy: BindStrategy,
        errors: &DeviceErrors,
    ) -> Result<OutputStream, String> {
        let on_error = {
            let errors = errors.clone();
            move |e: cpal::StreamError| {
                warn!("audio stream error: {e}");
                if let Ok(mut slot) = errors.lock() {
                    *slot = Some(e.to_string());
                }
            }
        };

        let default = || OutputStreamBuilder::from_default_device().map_err(|e| e.to_string());

        let stream = match strategy {
            BindStrategy::DefaultDevice | BindStrategy::ChannelAdapter => default()?
                .with_error_callback(on_error)
                .open_stream_or_fallback(),
            BindStrategy::FirstDevice => self
                .first_device_builder()?
                .with_error_callback(on_error)
                .open_stream(),
            BindStrategy::Resampled => default()?
                .with_sample_rate(self.resample_rate)
                .with_channels(2)
                .with_error_callback(on_error)
                .open_stream(),
            BindStrategy::RelaxedLatency => default()?
                .with_buffer_size(BufferSize::Fixed(self.relaxed_buffer_frames))
                .with_error_callback(on_error)
                .open_stream_or_fallback(),
        };
        stream.map_err(|e| e.to_string())
    }

    fn shape_for(&self, strategy: BindStrategy) -> Shape {
        match strategy {
            BindStrategy::Resampled => Shape::Stereo(Some(self.resample_rate)),
            BindStrategy::ChannelAdapter => Shape::Stereo(None),
            _ => Shape::Native,
        }
    }
}

impl AudioBackend for RodioBackend {
    type Source = RodioSource;
    type Output = RodioOutput;

    fn open_source(&mut self, track: &Track) -> Result<RodioSource, PlaybackError> {
        let decoder = open_decoder(&track.path)?;
        let duration = decoder.total_duration().unwrap_or(track.duration);
        Ok(RodioSource {
            path: track.path.clone(),
            duration,
            pending: Some(decoder),
        })
    }

    fn bind(
        &mut self,
        source: &mut RodioSource,
        strategy: BindStrategy,
    ) -> Result<RodioOutput, PlaybackError> {
        let errors: DeviceErrors = Arc::new(Mutex::new(None));
        let mut stream = self
            .open_stream(strategy, &errors)
            .map_err(|reason| PlaybackError::Bind { strategy, reason })?;
        stream.log_on_drop(false);

        let decoder = source.take_decoder()?;
        let shape = self.shape_for(strategy);
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        shape.append(&sink, decoder);
        debug!(%strategy, path = %source.path.display(), "sink ready");

        Ok(RodioOutput {
            _stream: stream,
            sink,
            path: source.path.clone(),
            shape,
            errors,
            stops: StopTracker::default(),
        })
    }

    fn shutdown(&mut self) -> Result<(), PlaybackError> {
        self.host = None;
        Ok(())
    }
}
