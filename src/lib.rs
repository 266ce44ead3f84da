//! Playback core for a desktop music player: a single-track session engine
//! with automatic advance and output-binding fallback, plus recovery of
//! mis-decoded tag text.

pub mod audio;
pub mod config;
pub mod encoding;
pub mod library;
pub mod lyrics;
pub mod runtime;
