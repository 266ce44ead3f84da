use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use tracing::debug;

use crate::config::LyricsSettings;
use crate::encoding::TextRecovery;

use super::track::{LyricLine, parse_lrc};

/// Produces the lyric lines for an audio file.
pub trait LyricSource {
    /// Lines for the track at `path`, sorted by time. Empty when the track
    /// has no lyrics; lookup failures are not errors.
    fn load(&self, path: &Path) -> Vec<LyricLine>;
}

/// Source used when lyrics are switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLyrics;

impl LyricSource for NoLyrics {
    fn load(&self, _path: &Path) -> Vec<LyricLine> {
        Vec::new()
    }
}

/// Sidecar `.lrc` files with an embedded-tag fallback.
#[derive(Debug, Clone)]
pub struct LrcLyrics {
    recovery: TextRecovery,
    embedded: bool,
}

impl LrcLyrics {
    pub fn new(recovery: TextRecovery, embedded: bool) -> Self {
        Self { recovery, embedded }
    }

    pub fn from_settings(settings: &LyricsSettings, recovery: TextRecovery) -> Self {
        Self::new(recovery, settings.embedded)
    }

    fn from_sidecar(&self, path: &Path) -> Option<Vec<LyricLine>> {
        let lrc = path.with_extension("lrc");
        let bytes = std::fs::read(&lrc).ok()?;
        debug!(path = %lrc.display(), "loaded sidecar lyrics");
        Some(parse_lrc(&self.recovery.decode_bytes(&bytes)))
    }

    fn from_tags(&self, path: &Path) -> Vec<LyricLine> {
        let tagged = match lofty::read_from_path(path) {
            Ok(tagged) => tagged,
            Err(e) => {
                debug!(path = %path.display(), "no embedded lyrics: {e}");
                return Vec::new();
            }
        };

        tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .and_then(|tag| tag.get_string(&ItemKey::Lyrics))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| {
                vec![LyricLine {
                    time: Duration::ZERO,
                    text: self.recovery.recover(text).into_owned(),
                }]
            })
            .unwrap_or_default()
    }
}

impl LyricSource for LrcLyrics {
    fn load(&self, path: &Path) -> Vec<LyricLine> {
        if let Some(lines) = self.from_sidecar(path) {
            return lines;
        }
        if self.embedded {
            self.from_tags(path)
        } else {
            Vec::new()
        }
    }
}
