use serde::Deserialize;

use crate::audio::BindStrategy;
use crate::encoding::{DEFAULT_CANDIDATES, DEFAULT_PLATFORM_ENCODING};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lyra/config.toml` or `~/.config/lyra/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYRA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub recovery: RecoverySettings,
    pub library: LibrarySettings,
    pub lyrics: LyricsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume in `0.0..=1.0`.
    pub volume: f32,
    /// Cadence of position notifications while playing (milliseconds).
    pub poll_interval_ms: u64,
    /// A stop this close to the end of the track counts as end-of-track (milliseconds).
    pub finish_tolerance_ms: u64,
    /// Output binding strategies, tried in order until one succeeds.
    pub bind_strategies: Vec<BindStrategy>,
    /// Sample rate targeted by the `resampled` strategy.
    pub resample_rate: u32,
    /// Device buffer size (frames) used by the `relaxed-latency` strategy.
    pub relaxed_buffer_frames: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            poll_interval_ms: 100,
            finish_tolerance_ms: 1000,
            bind_strategies: BindStrategy::LADDER.to_vec(),
            resample_rate: 44_100,
            relaxed_buffer_frames: 8192,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    /// Run tag text through encoding recovery when scanning.
    pub enabled: bool,
    /// Candidate legacy encodings (WHATWG labels), most specific first.
    pub candidates: Vec<String>,
    /// Encoding used for the "platform default" re-encode pass.
    pub platform_encoding: String,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            platform_encoding: DEFAULT_PLATFORM_ENCODING.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    pub enabled: bool,
    /// Fall back to the embedded lyrics tag when no `.lrc` file sits next to the track.
    pub embedded: bool,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            embedded: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
