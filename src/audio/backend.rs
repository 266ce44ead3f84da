//! The device side of playback: decoded sources, output handles and the
//! ordered ladder of strategies used to connect one to the other.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::library::Track;

use super::error::PlaybackError;

/// One way of connecting a decoded source to an output device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindStrategy {
    /// The system default output device.
    DefaultDevice,
    /// The first output device the host enumerates.
    FirstDevice,
    /// Default device, source converted to a canonical stereo PCM format.
    Resampled,
    /// Default device, source channel layout adapted to stereo.
    ChannelAdapter,
    /// Default device with a large fixed buffer.
    RelaxedLatency,
}

impl BindStrategy {
    /// Every strategy, in the order they are tried by default.
    pub const LADDER: [BindStrategy; 5] = [
        BindStrategy::DefaultDevice,
        BindStrategy::FirstDevice,
        BindStrategy::Resampled,
        BindStrategy::ChannelAdapter,
        BindStrategy::RelaxedLatency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BindStrategy::DefaultDevice => "default-device",
            BindStrategy::FirstDevice => "first-device",
            BindStrategy::Resampled => "resampled",
            BindStrategy::ChannelAdapter => "channel-adapter",
            BindStrategy::RelaxedLatency => "relaxed-latency",
        }
    }
}

impl fmt::Display for BindStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an output stopped on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopEvent {
    /// Set when the device reported a failure.
    pub error: Option<String>,
}

/// A track opened for decoding but not yet bound to an output.
pub trait DecodedSource {
    /// Total length; zero when unknown.
    fn duration(&self) -> Duration;
}

/// A live binding of a source to an output device.
///
/// Position, seeking and volume live here because the source is owned by
/// the output once bound.
pub trait OutputHandle {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    /// Halt output. The position afterwards is backend specific; the
    /// session rewinds explicitly.
    fn stop(&mut self) -> Result<(), PlaybackError>;
    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    /// Report a stop that happened since the last call, at most once per stop.
    fn poll_stopped(&mut self) -> Option<StopEvent>;
    /// Tear the binding down.
    fn release(self) -> Result<(), PlaybackError>
    where
        Self: Sized;
}

/// Decoder and output capability the session is built on.
pub trait AudioBackend {
    type Source: DecodedSource;
    type Output: OutputHandle;

    fn open_source(&mut self, track: &Track) -> Result<Self::Source, PlaybackError>;

    /// Try one strategy. A failing attempt must release whatever it created
    /// before returning.
    fn bind(
        &mut self,
        source: &mut Self::Source,
        strategy: BindStrategy,
    ) -> Result<Self::Output, PlaybackError>;

    /// Release backend-wide resources acquired at construction.
    fn shutdown(&mut self) -> Result<(), PlaybackError>;
}

/// Walk `ladder` until a strategy binds `source`.
///
/// Every failed rung is logged; if none succeeds the last error is folded
/// into [`PlaybackError::BindExhausted`].
pub fn bind_with_fallback<B: AudioBackend>(
    backend: &mut B,
    source: &mut B::Source,
    track: &Track,
    ladder: &[BindStrategy],
) -> Result<(B::Output, BindStrategy), PlaybackError> {
    let mut last = String::from("no binding strategy configured");

    for (attempt, &strategy) in ladder.iter().enumerate() {
        match backend.bind(source, strategy) {
            Ok(output) => {
                info!(%strategy, attempt = attempt + 1, path = %track.path.display(), "output bound");
                return Ok((output, strategy));
            }
            Err(e) => {
                warn!(%strategy, path = %track.path.display(), "binding attempt failed: {e}");
                last = e.to_string();
            }
        }
    }

    Err(PlaybackError::BindExhausted {
        path: track.path.clone(),
        attempts: ladder.len(),
        last,
    })
}
