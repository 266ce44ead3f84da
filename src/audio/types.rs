//! Commands, notifications and shared handles of the audio subsystem.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::library::Track;
use crate::lyrics::LyricLine;

/// Playback phase of the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing is bound to an output.
    #[default]
    Idle,
    /// A source is bound and stopped.
    Loaded,
    Playing,
    Paused,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Start or resume playback of the current track.
    Play,
    Pause,
    /// Stop and rewind the current track.
    Stop,
    Next,
    Previous,
    /// Jump to an absolute position in the current track.
    Seek(Duration),
    /// Set the output volume; clamped to `0.0..=1.0`.
    SetVolume(f32),
    /// Select a track already in the playlist and load it without playing.
    PlayTrack(Track),
    /// Append a track to the playlist.
    Add(Track),
    /// Remove the playlist entry at the given index.
    Remove(usize),
    /// Empty the playlist and stop.
    Clear,
    /// Reply once every command sent before this one has been handled.
    Sync(Sender<()>),
    /// Tear the session down and end the audio thread.
    Quit,
}

/// Notification emitted by the session.
///
/// Every subscriber sees the same ordered stream. A successful load always
/// produces `Duration`, `CurrentTrack`, `Position` and `Playing`, in that
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Duration(Duration),
    CurrentTrack(Option<Track>),
    Position(Duration),
    Playing(bool),
    Lyric(Option<LyricLine>),
}

/// Read-only view of the session shared with other threads.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub tracks: Vec<Track>,
    pub current_index: Option<usize>,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            tracks: Vec::new(),
            current_index: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
        }
    }
}

impl SessionSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }
}

pub type SnapshotHandle = Arc<Mutex<SessionSnapshot>>;

/// Fan-out of [`PlayerEvent`]s to any number of subscribers.
///
/// Subscribers whose receiver has been dropped are pruned on the next emit.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<PlayerEvent>>>>,
}

impl EventBus {
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn emit(&self, event: PlayerEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
