use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendError, Sender};
use tracing::{debug, info, warn};

use crate::config::AudioSettings;
use crate::library::{PlaylistStore, Track, dedup_by_path};
use crate::lyrics::LyricSource;

use super::backend::AudioBackend;
use super::sink::RodioBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, EventBus, PlayerEvent, SessionSnapshot, SnapshotHandle};

/// Handle to the audio thread.
///
/// Commands are queued and handled in order; none of the methods wait for
/// the device. Dropping the handle shuts the thread down.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: EventBus,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Player backed by the system audio device.
    pub fn new(settings: AudioSettings, lyric_source: Box<dyn LyricSource + Send>) -> Self {
        let backend_settings = settings.clone();
        Self::with_backend(move || RodioBackend::new(&backend_settings), settings, lyric_source)
    }

    /// Player with a custom backend, constructed on the audio thread.
    pub fn with_backend<B, F>(
        make_backend: F,
        settings: AudioSettings,
        lyric_source: Box<dyn LyricSource + Send>,
    ) -> Self
    where
        B: AudioBackend,
        F: FnOnce() -> B + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<AudioCmd>();
        let events = EventBus::default();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(SessionSnapshot::default()));

        let join = spawn_audio_thread(
            make_backend,
            settings,
            lyric_source,
            rx,
            events.clone(),
            snapshot.clone(),
        );

        Self {
            tx,
            events,
            snapshot,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    fn dispatch(&self, cmd: AudioCmd) {
        if let Err(SendError(cmd)) = self.send(cmd) {
            debug!(?cmd, "audio thread is gone, dropping command");
        }
    }

    pub fn play(&self) {
        self.dispatch(AudioCmd::Play);
    }

    pub fn pause(&self) {
        self.dispatch(AudioCmd::Pause);
    }

    pub fn stop(&self) {
        self.dispatch(AudioCmd::Stop);
    }

    pub fn next(&self) {
        self.dispatch(AudioCmd::Next);
    }

    pub fn previous(&self) {
        self.dispatch(AudioCmd::Previous);
    }

    pub fn seek(&self, to: Duration) {
        self.dispatch(AudioCmd::Seek(to));
    }

    pub fn set_volume(&self, volume: f32) {
        self.dispatch(AudioCmd::SetVolume(volume));
    }

    pub fn play_track(&self, track: Track) {
        self.dispatch(AudioCmd::PlayTrack(track));
    }

    pub fn add(&self, track: Track) {
        self.dispatch(AudioCmd::Add(track));
    }

    pub fn remove(&self, index: usize) {
        self.dispatch(AudioCmd::Remove(index));
    }

    pub fn clear(&self) {
        self.dispatch(AudioCmd::Clear);
    }

    /// A new receiver for every event emitted from now on.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Block until the audio thread has handled every command sent so far.
    ///
    /// Returns `false` if the thread is no longer running.
    pub fn sync(&self) -> bool {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.send(AudioCmd::Sync(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// Add the tracks kept in `store`, skipping files that no longer exist.
    /// Returns how many tracks were queued.
    pub fn restore(&self, store: &dyn PlaylistStore) -> usize {
        let tracks = match store.load() {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("could not restore playlist: {e}");
                return 0;
            }
        };

        let tracks: Vec<Track> = dedup_by_path(tracks)
            .into_iter()
            .filter(|t| {
                let exists = t.path.exists();
                if !exists {
                    debug!(path = %t.path.display(), "dropping missing file from saved playlist");
                }
                exists
            })
            .collect();

        let count = tracks.len();
        for track in tracks {
            self.add(track);
        }
        info!(count, "playlist restored");
        count
    }

    /// Save the current playlist to `store`. Failures are logged.
    pub fn persist(&self, store: &dyn PlaylistStore) {
        self.sync();
        let tracks = self.snapshot().tracks;
        match store.save(&tracks) {
            Ok(()) => debug!(count = tracks.len(), "playlist saved"),
            Err(e) => warn!("could not save playlist: {e}"),
        }
    }

    /// Stop the audio thread and wait for it. Later calls do nothing.
    pub fn shutdown(&self) {
        let handle = self
            .join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            let _ = self.send(AudioCmd::Quit);
            if handle.join().is_err() {
                warn!("audio thread panicked");
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
