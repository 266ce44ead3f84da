use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::library::Track;
use crate::lyrics::{LyricSource, LyricTrack};

use super::backend::{
    AudioBackend, BindStrategy, DecodedSource, OutputHandle, StopEvent, bind_with_fallback,
};
use super::error::PlaybackError;
use super::guard::AdvanceGuard;
use super::queue::Playlist;
use super::types::{AudioCmd, EventBus, Phase, PlayerEvent, SessionSnapshot};

/// Source and output for the loaded track. They are created and dropped
/// together; a track change replaces the whole pair.
struct Bound<B: AudioBackend> {
    source: B::Source,
    output: B::Output,
    duration: Duration,
    strategy: BindStrategy,
}

/// Playback state machine.
///
/// Owns the playlist and the bound source/output pair. Every operation
/// absorbs its own failures: errors are logged and the session settles in
/// `Idle` or `Loaded` rather than surfacing them.
pub struct Session<B: AudioBackend> {
    backend: B,
    ladder: Vec<BindStrategy>,
    finish_tolerance: Duration,
    playlist: Playlist,
    phase: Phase,
    volume: f32,
    guard: AdvanceGuard,
    bound: Option<Bound<B>>,
    lyric_source: Box<dyn LyricSource + Send>,
    lyrics: LyricTrack,
    events: EventBus,
}

impl<B: AudioBackend> Session<B> {
    pub fn new(
        backend: B,
        settings: &AudioSettings,
        lyric_source: Box<dyn LyricSource + Send>,
        events: EventBus,
    ) -> Self {
        Self {
            backend,
            ladder: settings.bind_strategies.clone(),
            finish_tolerance: Duration::from_millis(settings.finish_tolerance_ms),
            playlist: Playlist::new(),
            phase: Phase::Idle,
            volume: clamp_volume(settings.volume).unwrap_or(1.0),
            guard: AdvanceGuard::default(),
            bound: None,
            lyric_source,
            lyrics: LyricTrack::default(),
            events,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn duration(&self) -> Duration {
        self.bound.as_ref().map_or(Duration::ZERO, |b| b.duration)
    }

    pub fn position(&self) -> Duration {
        self.bound
            .as_ref()
            .map_or(Duration::ZERO, |b| b.output.position())
    }

    /// Strategy that bound the current output, if any.
    pub fn bound_strategy(&self) -> Option<BindStrategy> {
        self.bound.as_ref().map(|b| b.strategy)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot {
            tracks: self.playlist.tracks().to_vec(),
            ..SessionSnapshot::default()
        };
        self.write_progress(&mut snapshot);
        snapshot
    }

    /// Refresh everything in `snapshot` except the track list.
    pub fn write_progress(&self, snapshot: &mut SessionSnapshot) {
        snapshot.phase = self.phase;
        snapshot.current_index = self.playlist.cursor();
        snapshot.position = self.position();
        snapshot.duration = self.duration();
        snapshot.volume = self.volume;
    }

    /// Run one command. `Quit` and `Sync` belong to the audio thread and are
    /// ignored here.
    pub fn apply(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => self.pause(),
            AudioCmd::Stop => self.stop(),
            AudioCmd::Next => self.next(),
            AudioCmd::Previous => self.previous(),
            AudioCmd::Seek(to) => self.seek(to),
            AudioCmd::SetVolume(v) => self.set_volume(v),
            AudioCmd::PlayTrack(track) => self.play_track(&track),
            AudioCmd::Add(track) => self.add(track),
            AudioCmd::Remove(index) => self.remove(index),
            AudioCmd::Clear => self.clear(),
            AudioCmd::Sync(_) | AudioCmd::Quit => {}
        }
    }

    /// Replace the bound pair with one for `track`.
    ///
    /// On success the session is `Loaded` and emits duration, current track,
    /// position zero and playing=false. On failure it is `Idle` and emits
    /// nothing. Returns whether the track was loaded.
    pub fn load(&mut self, track: &Track) -> bool {
        self.guard.arm();
        self.release_bound();
        let had_line = self.lyrics.current().is_some();
        self.lyrics = LyricTrack::default();

        let mut bound = match self.open_and_bind(track) {
            Ok(bound) => bound,
            Err(e) => {
                if matches!(e, PlaybackError::FileMissing(_)) {
                    warn!(path = %track.path.display(), "skipping track: {e}");
                } else {
                    error!(path = %track.path.display(), "cannot load track: {e}");
                }
                self.phase = Phase::Idle;
                return false;
            }
        };

        bound.output.set_volume(self.volume);
        let duration = bound.duration;
        self.bound = Some(bound);
        self.phase = Phase::Loaded;
        self.lyrics = LyricTrack::new(self.lyric_source.load(&track.path));

        info!(path = %track.path.display(), ?duration, "track loaded");
        self.emit(PlayerEvent::Duration(duration));
        self.emit(PlayerEvent::CurrentTrack(Some(track.clone())));
        self.emit(PlayerEvent::Position(Duration::ZERO));
        self.emit(PlayerEvent::Playing(false));

        if had_line {
            self.emit(PlayerEvent::Lyric(None));
        }
        self.refresh_lyrics(Duration::ZERO);
        true
    }

    fn open_and_bind(&mut self, track: &Track) -> Result<Bound<B>, PlaybackError> {
        let mut source = self.backend.open_source(track)?;
        let (output, strategy) =
            bind_with_fallback(&mut self.backend, &mut source, track, &self.ladder)?;
        let duration = source.duration();
        Ok(Bound {
            source,
            output,
            duration,
            strategy,
        })
    }

    /// Stop and drop the current pair. Failures are logged and the handle
    /// is discarded either way.
    fn release_bound(&mut self) {
        let Some(Bound {
            source, mut output, ..
        }) = self.bound.take()
        else {
            return;
        };

        if let Err(e) = output.stop() {
            warn!("stopping previous output failed: {e}");
        }
        if let Err(e) = output.release() {
            warn!("discarding output that failed to release: {e}");
        }
        drop(source);
    }

    /// Start or resume playback.
    ///
    /// From `Idle` the current track is loaded first.
    pub fn play(&mut self) {
        match self.phase {
            Phase::Playing => {}
            Phase::Loaded | Phase::Paused => self.start_output(),
            Phase::Idle => {
                let Some(track) = self.playlist.current().cloned() else {
                    debug!("play ignored: nothing selected");
                    return;
                };
                if self.load(&track) {
                    self.start_output();
                }
            }
        }
    }

    fn start_output(&mut self) {
        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        self.guard.disarm();
        match bound.output.play() {
            Ok(()) => {
                self.phase = Phase::Playing;
                self.emit(PlayerEvent::Playing(true));
            }
            Err(e) => warn!("output refused to start: {e}"),
        }
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(bound) = self.bound.as_mut() else {
            return;
        };

        self.guard.arm();
        if let Err(e) = bound.output.pause() {
            warn!("output refused to pause: {e}");
            self.guard.disarm();
            return;
        }
        self.phase = Phase::Paused;
        self.emit(PlayerEvent::Playing(false));
    }

    /// Stop and rewind to the start of the track.
    pub fn stop(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        let Some(bound) = self.bound.as_mut() else {
            return;
        };

        self.guard.arm();
        if let Err(e) = bound.output.stop() {
            warn!("output refused to stop: {e}");
        }
        if let Err(e) = bound.output.seek(Duration::ZERO) {
            warn!("rewinding after stop failed: {e}");
        }
        self.phase = Phase::Loaded;
        self.emit(PlayerEvent::Position(Duration::ZERO));
        self.emit(PlayerEvent::Playing(false));
        self.refresh_lyrics(Duration::ZERO);
    }

    /// Jump to `to`. Ignored when nothing is loaded or `to` is past the end.
    pub fn seek(&mut self, to: Duration) {
        let Some(bound) = self.bound.as_mut() else {
            debug!(?to, "seek ignored: nothing loaded");
            return;
        };
        if to > bound.duration {
            debug!(?to, duration = ?bound.duration, "seek ignored: out of range");
            return;
        }

        match bound.output.seek(to) {
            Ok(()) => {
                self.emit(PlayerEvent::Position(to));
                self.refresh_lyrics(to);
            }
            Err(e) => warn!(?to, "seek failed: {e}"),
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let Some(volume) = clamp_volume(volume) else {
            debug!("ignoring NaN volume");
            return;
        };
        self.volume = volume;
        if let Some(bound) = self.bound.as_mut() {
            bound.output.set_volume(volume);
        }
    }

    pub fn next(&mut self) {
        match self.playlist.next_index() {
            Some(index) => self.switch_to(index, self.phase == Phase::Playing),
            None => debug!("next ignored: playlist is empty"),
        }
    }

    pub fn previous(&mut self) {
        match self.playlist.previous_index() {
            Some(index) => self.switch_to(index, self.phase == Phase::Playing),
            None => debug!("previous ignored: playlist is empty"),
        }
    }

    fn switch_to(&mut self, index: usize, resume: bool) {
        let Some(track) = self.playlist.select(index).cloned() else {
            return;
        };
        info!(index, path = %track.path.display(), "switching track");
        if self.load(&track) && resume {
            self.play();
        }
    }

    /// Make `track` current and load it. Never starts playback.
    pub fn play_track(&mut self, track: &Track) {
        let Some(index) = self.playlist.position_of(track) else {
            warn!(path = %track.path.display(), "track is not in the playlist");
            return;
        };
        self.playlist.select(index);
        self.load(track);
    }

    /// Append `track`. The first track of an empty playlist becomes current
    /// and is loaded straight away.
    pub fn add(&mut self, track: Track) {
        if self.playlist.push(track.clone()) {
            self.emit(PlayerEvent::CurrentTrack(Some(track.clone())));
            self.load(&track);
        }
    }

    /// Drop the entry at `index`. Playback of a removed current track is
    /// left running.
    pub fn remove(&mut self, index: usize) {
        if self.playlist.remove(index).is_none() {
            debug!(index, "remove ignored: index out of range");
        }
    }

    pub fn clear(&mut self) {
        self.playlist.clear();
        self.stop();
        self.emit(PlayerEvent::CurrentTrack(None));
    }

    /// Periodic work: pick up stop events from the output and, while
    /// playing, report the position.
    pub fn tick(&mut self) {
        let stopped = self.bound.as_mut().and_then(|b| b.output.poll_stopped());
        if let Some(event) = stopped {
            self.on_output_stopped(event);
        }

        if self.phase == Phase::Playing {
            let position = self.position();
            self.emit(PlayerEvent::Position(position));
            self.refresh_lyrics(position);
        }
    }

    fn on_output_stopped(&mut self, event: StopEvent) {
        if self.guard.consume() {
            debug!("ignoring stop event caused by the session");
            return;
        }
        let Some(bound) = self.bound.as_ref() else {
            return;
        };
        let position = bound.output.position();
        let duration = bound.duration;

        let was_playing = self.phase == Phase::Playing;
        if matches!(self.phase, Phase::Playing | Phase::Paused) {
            self.phase = Phase::Loaded;
            self.emit(PlayerEvent::Playing(false));
        }

        if let Some(reason) = event.error {
            warn!(?position, "output stopped with an error: {reason}");
            return;
        }

        let finished = !duration.is_zero() && duration.abs_diff(position) < self.finish_tolerance;
        if !finished {
            info!(?position, ?duration, "output stopped before the end of the track");
            return;
        }

        match self.playlist.next_index() {
            Some(index) => {
                info!(index, "track finished, advancing");
                self.switch_to(index, was_playing);
            }
            None => debug!("track finished with an empty playlist"),
        }
    }

    /// Release the output, the source and the backend. Consumes the session.
    pub fn dispose(mut self) {
        self.release_bound();
        if let Err(e) = self.backend.shutdown() {
            warn!("audio backend shutdown failed: {e}");
        }
        self.phase = Phase::Idle;
        debug!("session disposed");
    }

    fn refresh_lyrics(&mut self, position: Duration) {
        if let Some(line) = self.lyrics.update_current(position) {
            let line = line.cloned();
            self.emit(PlayerEvent::Lyric(line));
        }
    }

    fn emit(&self, event: PlayerEvent) {
        self.events.emit(event);
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    (!volume.is_nan()).then(|| volume.clamp(0.0, 1.0))
}
