//! Playlist with a playback cursor.

use crate::library::Track;

/// Ordered tracks plus the index of the current one.
///
/// The cursor is `None` exactly when nothing has been selected yet or the
/// playlist is empty; otherwise it is a valid index.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    /// Append `track`; returns `true` if it became the current track.
    pub fn push(&mut self, track: Track) -> bool {
        self.tracks.push(track);
        if self.cursor.is_none() {
            self.cursor = Some(self.tracks.len() - 1);
            return true;
        }
        false
    }

    /// Point the cursor at `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.cursor = Some(index);
        self.tracks.get(index)
    }

    /// Remove the entry at `index`.
    ///
    /// A cursor at or after the removed entry moves back by one unless it is
    /// already at the front; emptying the playlist clears it.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);

        if let Some(cursor) = self.cursor {
            if cursor >= index && cursor > 0 {
                self.cursor = Some(cursor - 1);
            }
        }
        if self.tracks.is_empty() {
            self.cursor = None;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Index after the cursor, wrapping to the front. No cursor means 0.
    pub fn next_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(match self.cursor {
            Some(i) => (i + 1) % self.tracks.len(),
            None => 0,
        })
    }

    /// Index before the cursor, wrapping to the back.
    pub fn previous_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(match self.cursor {
            Some(i) if i > 0 => i - 1,
            _ => self.tracks.len() - 1,
        })
    }
}
