use std::path::{Path, PathBuf};
use std::time::Duration;

/// One playable audio item.
///
/// Tracks are compared by `path`: two entries with the same file are the
/// same track regardless of their metadata.
#[derive(Debug, Clone)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Duration,
    pub cover_art: Option<PathBuf>,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Track {}

impl Track {
    /// A track with no metadata besides its path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            duration: Duration::ZERO,
            cover_art: None,
        }
    }

    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            file_stem(&self.path)
        } else {
            self.title.clone()
        }
    }

    pub fn display_artist(&self) -> &str {
        non_empty_or(&self.artist, "Unknown Artist")
    }

    pub fn display_album(&self) -> &str {
        non_empty_or(&self.album, "Unknown Album")
    }

    /// `mm:ss` rendering of the tag duration.
    pub fn duration_string(&self) -> String {
        let secs = self.duration.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// "Artist - Title" line for now-playing output.
    pub fn display(&self) -> String {
        format!("{} - {}", self.display_artist(), self.display_title())
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}
