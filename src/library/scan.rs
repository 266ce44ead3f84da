use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::LibrarySettings;
use crate::encoding::TextRecovery;

use super::model::Track;
use super::tags::read_tags;

const COVER_NAMES: &[&str] = &["cover", "folder", "front", "album"];
const COVER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Lower-cased extension set built once per scan.
struct ExtensionFilter(HashSet<String>);

impl ExtensionFilter {
    fn new(settings: &LibrarySettings) -> Self {
        Self(
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.0.contains(&ext.to_ascii_lowercase()))
    }
}

fn is_dotfile(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn walker_for(dir: &Path, settings: &LibrarySettings) -> WalkDir {
    let walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    match (settings.recursive, settings.max_depth) {
        (false, _) => walker.max_depth(1),
        (true, Some(depth)) => walker.max_depth(depth),
        (true, None) => walker,
    }
}

fn collect_audio_paths(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let filter = ExtensionFilter::new(settings);

    walker_for(dir, settings)
        .into_iter()
        // The root is always walked, even when its own name starts with a dot.
        .filter_entry(|entry| settings.include_hidden || entry.depth() == 0 || !is_dotfile(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() || entry.path().is_file())
        .map(DirEntry::into_path)
        .filter(|path| filter.accepts(path))
        .collect()
}

/// Image next to the track that looks like album art (`cover.jpg`, `folder.png`, ...).
pub(super) fn find_cover_art(track_path: &Path) -> Option<PathBuf> {
    let dir = track_path.parent()?;
    COVER_NAMES.iter().find_map(|name| {
        COVER_EXTENSIONS.iter().find_map(|ext| {
            [ext.to_string(), ext.to_ascii_uppercase()]
                .into_iter()
                .map(|ext| dir.join(format!("{name}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    })
}

fn build_track(path: &Path, recovery: Option<&TextRecovery>) -> Track {
    let mut track = Track::from_path(path);

    if let Some(tags) = read_tags(path) {
        let tags = match recovery {
            Some(recovery) => tags.recovered(recovery),
            None => tags,
        };
        track.title = tags.title;
        track.artist = tags.artist;
        track.album = tags.album;
        track.duration = tags.duration;
    }
    track.cover_art = find_cover_art(path);
    track
}

/// Drop later entries that point at an already-seen file.
pub fn dedup_by_path(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.path.clone());
            if !fresh {
                debug!(path = %t.path.display(), "skipping duplicate track");
            }
            fresh
        })
        .collect()
}

/// Scan `dir` for audio files and build tracks from their tags.
///
/// Tag reads run on the rayon pool, which caps concurrency at the number of
/// available cores. The result keeps the (file-name sorted) walk order and
/// holds each path once.
pub fn scan(dir: &Path, settings: &LibrarySettings, recovery: Option<&TextRecovery>) -> Vec<Track> {
    let paths = collect_audio_paths(dir, settings);

    let tracks: Vec<Track> = paths
        .par_iter()
        .map(|path| build_track(path, recovery))
        .collect();

    let tracks = dedup_by_path(tracks);
    info!(dir = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}
