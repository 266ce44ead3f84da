//! Playback engine.
//!
//! A [`Session`] owns the playlist, the decoded source and the output it is
//! bound to. It runs on a dedicated audio thread behind an [`AudioPlayer`]
//! handle: commands go in over a channel, [`PlayerEvent`]s come out to every
//! subscriber, and a [`SessionSnapshot`] is kept up to date for readers.
//!
//! The device side is abstracted behind [`AudioBackend`]; [`RodioBackend`]
//! is the real implementation.

mod backend;
mod error;
mod guard;
mod player;
mod queue;
mod session;
mod sink;
mod thread;
mod types;

pub use backend::{
    AudioBackend, BindStrategy, DecodedSource, OutputHandle, StopEvent, bind_with_fallback,
};
pub use error::PlaybackError;
pub use player::AudioPlayer;
pub use queue::Playlist;
pub use session::Session;
pub use sink::RodioBackend;
pub use types::{AudioCmd, EventBus, Phase, PlayerEvent, SessionSnapshot, SnapshotHandle};

#[cfg(test)]
mod tests;
