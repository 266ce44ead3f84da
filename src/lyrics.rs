//! Time-synced lyrics.
//!
//! Lyrics come from a sidecar `.lrc` file next to the track or, failing
//! that, from the embedded lyrics tag. The session owns one [`LyricTrack`]
//! per loaded track and asks it for the current line on every position
//! update.

mod source;
mod track;

pub use source::{LrcLyrics, LyricSource, NoLyrics};
pub use track::{LyricLine, LyricTrack, parse_lrc};
