use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::Receiver;

use super::guard::AdvanceGuard;
use super::*;
use crate::config::AudioSettings;
use crate::library::{MemoryStore, Track};
use crate::lyrics::{LyricLine, LyricSource, NoLyrics};

type Shared<T> = Arc<Mutex<T>>;

#[derive(Debug, Default)]
struct OutputState {
    playing: bool,
    position: Duration,
    volume: f32,
    pending: Option<StopEvent>,
    released: bool,
}

#[derive(Debug, Default)]
struct World {
    /// Files that exist, with their duration.
    files: HashMap<PathBuf, Duration>,
    broken_strategies: HashSet<BindStrategy>,
    unbindable: HashSet<PathBuf>,
    attempts: Vec<(PathBuf, BindStrategy)>,
    outputs: Vec<Shared<OutputState>>,
    release_fails: bool,
    shutdowns: usize,
}

impl World {
    fn last_output(&self) -> Shared<OutputState> {
        self.outputs.last().expect("no output bound").clone()
    }
}

struct FakeBackend {
    world: Shared<World>,
}

struct FakeSource {
    path: PathBuf,
    duration: Duration,
}

impl DecodedSource for FakeSource {
    fn duration(&self) -> Duration {
        self.duration
    }
}

struct FakeOutput {
    state: Shared<OutputState>,
    release_fails: bool,
}

impl OutputHandle for FakeOutput {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.state.lock().unwrap().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        self.state.lock().unwrap().position = to;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn poll_stopped(&mut self) -> Option<StopEvent> {
        self.state.lock().unwrap().pending.take()
    }

    fn release(self) -> Result<(), PlaybackError> {
        if self.release_fails {
            return Err(PlaybackError::Release("device busy".to_string()));
        }
        self.state.lock().unwrap().released = true;
        Ok(())
    }
}

impl AudioBackend for FakeBackend {
    type Source = FakeSource;
    type Output = FakeOutput;

    fn open_source(&mut self, track: &Track) -> Result<FakeSource, PlaybackError> {
        let world = self.world.lock().unwrap();
        let duration = world
            .files
            .get(&track.path)
            .copied()
            .ok_or_else(|| PlaybackError::FileMissing(track.path.clone()))?;
        Ok(FakeSource {
            path: track.path.clone(),
            duration,
        })
    }

    fn bind(
        &mut self,
        source: &mut FakeSource,
        strategy: BindStrategy,
    ) -> Result<FakeOutput, PlaybackError> {
        let mut world = self.world.lock().unwrap();
        world.attempts.push((source.path.clone(), strategy));
        if world.broken_strategies.contains(&strategy) || world.unbindable.contains(&source.path) {
            return Err(PlaybackError::Bind {
                strategy,
                reason: "unsupported format".to_string(),
            });
        }
        let state = Arc::new(Mutex::new(OutputState::default()));
        world.outputs.push(state.clone());
        Ok(FakeOutput {
            state,
            release_fails: world.release_fails,
        })
    }

    fn shutdown(&mut self) -> Result<(), PlaybackError> {
        self.world.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}

struct FixedLyrics(Vec<LyricLine>);

impl LyricSource for FixedLyrics {
    fn load(&self, _path: &Path) -> Vec<LyricLine> {
        self.0.clone()
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn track(name: &str) -> Track {
    let mut t = Track::from_path(format!("/music/{name}.mp3"));
    t.title = name.to_string();
    t
}

fn world_with(files: &[(&str, u64)]) -> Shared<World> {
    let mut world = World::default();
    for (name, len) in files {
        world.files.insert(track(name).path, secs(*len));
    }
    Arc::new(Mutex::new(world))
}

fn session_with_lyrics(
    world: &Shared<World>,
    lyrics: Box<dyn LyricSource + Send>,
) -> (Session<FakeBackend>, Receiver<PlayerEvent>) {
    let events = EventBus::default();
    let rx = events.subscribe();
    let backend = FakeBackend {
        world: world.clone(),
    };
    let session = Session::new(backend, &AudioSettings::default(), lyrics, events);
    (session, rx)
}

fn session(world: &Shared<World>) -> (Session<FakeBackend>, Receiver<PlayerEvent>) {
    session_with_lyrics(world, Box::new(NoLyrics))
}

/// Session holding the named tracks (all present on disk), first one loaded.
fn loaded(names: &[&str]) -> (Session<FakeBackend>, Receiver<PlayerEvent>, Shared<World>) {
    let files: Vec<(&str, u64)> = names.iter().map(|n| (*n, 180)).collect();
    let world = world_with(&files);
    let (mut s, rx) = session(&world);
    for name in names {
        s.add(track(name));
    }
    drain(&rx);
    (s, rx, world)
}

fn drain(rx: &Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    rx.try_iter().collect()
}

fn finish_current(world: &Shared<World>, error: Option<&str>) {
    let output = world.lock().unwrap().last_output();
    let mut state = output.lock().unwrap();
    state.position = secs(180);
    state.pending = Some(StopEvent {
        error: error.map(str::to_string),
    });
}

#[test]
fn guard_is_consumed_once() {
    let mut guard = AdvanceGuard::default();
    assert!(!guard.consume());
    guard.arm();
    assert!(guard.consume());
    assert!(!guard.consume());

    // Arming twice still covers a single stop event.
    guard.arm();
    guard.arm();
    assert!(guard.consume());
    assert!(!guard.consume());

    guard.arm();
    guard.disarm();
    assert!(!guard.consume());
}

#[test]
fn load_emits_duration_before_current_track_position_and_playing() {
    let world = world_with(&[("a", 180)]);
    let (mut s, rx) = session(&world);

    s.add(track("a"));

    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::CurrentTrack(Some(track("a"))),
            PlayerEvent::Duration(secs(180)),
            PlayerEvent::CurrentTrack(Some(track("a"))),
            PlayerEvent::Position(Duration::ZERO),
            PlayerEvent::Playing(false),
        ]
    );
    assert_eq!(s.phase(), Phase::Loaded);
    assert_eq!(s.duration(), secs(180));
    assert_eq!(s.bound_strategy(), Some(BindStrategy::DefaultDevice));
}

#[test]
fn missing_file_leaves_session_idle() {
    let world = world_with(&[]);
    let (mut s, rx) = session(&world);

    assert!(!s.load(&track("ghost")));

    assert_eq!(s.phase(), Phase::Idle);
    assert!(drain(&rx).is_empty());
    assert!(world.lock().unwrap().attempts.is_empty());
}

#[test]
fn ladder_is_walked_in_order_until_a_strategy_binds() {
    let world = world_with(&[("a", 180)]);
    world.lock().unwrap().broken_strategies = [
        BindStrategy::DefaultDevice,
        BindStrategy::FirstDevice,
        BindStrategy::Resampled,
    ]
    .into_iter()
    .collect();
    let (mut s, _rx) = session(&world);

    assert!(s.load(&track("a")));

    let tried: Vec<BindStrategy> = world.lock().unwrap().attempts.iter().map(|a| a.1).collect();
    assert_eq!(
        tried,
        vec![
            BindStrategy::DefaultDevice,
            BindStrategy::FirstDevice,
            BindStrategy::Resampled,
            BindStrategy::ChannelAdapter,
        ]
    );
    assert_eq!(s.bound_strategy(), Some(BindStrategy::ChannelAdapter));
    assert_eq!(s.phase(), Phase::Loaded);
}

#[test]
fn exhausted_ladder_leaves_idle_without_notifications() {
    let world = world_with(&[("x", 180)]);
    world.lock().unwrap().broken_strategies = BindStrategy::LADDER.into_iter().collect();
    let (mut s, rx) = session(&world);

    assert!(!s.load(&track("x")));

    assert_eq!(s.phase(), Phase::Idle);
    assert!(drain(&rx).is_empty());
    let w = world.lock().unwrap();
    assert_eq!(w.attempts.len(), 5);
    assert!(w.outputs.is_empty());
}

#[test]
fn bind_with_fallback_reports_the_last_error() {
    let world = world_with(&[("x", 180)]);
    world.lock().unwrap().broken_strategies = BindStrategy::LADDER.into_iter().collect();
    let mut backend = FakeBackend {
        world: world.clone(),
    };
    let mut source = backend.open_source(&track("x")).unwrap();

    let err = match bind_with_fallback(
        &mut backend,
        &mut source,
        &track("x"),
        &[BindStrategy::FirstDevice, BindStrategy::RelaxedLatency],
    ) {
        Err(e) => e,
        Ok(_) => panic!("binding should fail"),
    };

    match err {
        PlaybackError::BindExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert!(last.contains("relaxed-latency"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn next_then_previous_returns_to_the_same_index() {
    for len in 2..=5 {
        let names: Vec<String> = (0..len).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        for start in 0..len {
            let (mut s, _rx, _world) = loaded(&refs);
            s.play_track(&track(refs[start]));
            s.next();
            assert_eq!(s.playlist().cursor(), Some((start + 1) % len));
            s.previous();
            assert_eq!(s.playlist().cursor(), Some(start), "len {len}, start {start}");
        }
    }
}

#[test]
fn navigation_wraps_both_ways() {
    let (mut s, _rx, _world) = loaded(&["a", "b", "c"]);
    s.previous();
    assert_eq!(s.playlist().cursor(), Some(2));
    s.next();
    assert_eq!(s.playlist().cursor(), Some(0));
}

#[test]
fn navigation_keeps_the_playing_state() {
    let (mut s, _rx, _world) = loaded(&["a", "b"]);

    s.next();
    assert_eq!(s.phase(), Phase::Loaded);

    s.play();
    s.next();
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.playlist().cursor(), Some(0));
}

#[test]
fn natural_end_advances_and_keeps_playing() {
    let (mut s, rx, world) = loaded(&["a", "b", "c"]);
    s.play();
    drain(&rx);

    finish_current(&world, None);
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(1));
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::Playing(false),
            PlayerEvent::Duration(secs(180)),
            PlayerEvent::CurrentTrack(Some(track("b"))),
            PlayerEvent::Position(Duration::ZERO),
            PlayerEvent::Playing(false),
            PlayerEvent::Playing(true),
            PlayerEvent::Position(Duration::ZERO),
        ]
    );
}

#[test]
fn natural_end_of_last_track_wraps_to_first() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);
    s.play_track(&track("b"));
    s.play();

    finish_current(&world, None);
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn stop_event_after_user_stop_does_not_advance() {
    let (mut s, rx, world) = loaded(&["a", "b"]);
    s.play();
    s.stop();
    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::Playing(true),
            PlayerEvent::Position(Duration::ZERO),
            PlayerEvent::Playing(false),
        ]
    );

    finish_current(&world, None);
    s.tick();
    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Loaded);
    assert!(drain(&rx).is_empty());

    // The guard only swallows one event.
    finish_current(&world, None);
    s.tick();
    assert_eq!(s.playlist().cursor(), Some(1));
    assert_eq!(s.phase(), Phase::Loaded);
}

#[test]
fn stop_event_after_pause_does_not_advance() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);
    s.play();
    s.pause();
    assert_eq!(s.phase(), Phase::Paused);

    finish_current(&world, None);
    s.tick();
    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Paused);
}

#[test]
fn device_error_is_not_end_of_track() {
    let (mut s, rx, world) = loaded(&["a", "b"]);
    s.play();
    drain(&rx);

    finish_current(&world, Some("device unplugged"));
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Loaded);
    assert_eq!(drain(&rx), vec![PlayerEvent::Playing(false)]);
}

#[test]
fn early_stop_is_not_end_of_track() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);
    s.play();

    let output = world.lock().unwrap().last_output();
    {
        let mut state = output.lock().unwrap();
        state.position = secs(175);
        state.pending = Some(StopEvent::default());
    }
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Loaded);
}

#[test]
fn unknown_duration_never_counts_as_finished() {
    let world = world_with(&[("a", 0), ("b", 180)]);
    let (mut s, _rx) = session(&world);
    s.add(track("a"));
    s.add(track("b"));
    s.play();

    let output = world.lock().unwrap().last_output();
    output.lock().unwrap().pending = Some(StopEvent::default());
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.phase(), Phase::Loaded);
}

#[test]
fn bind_failure_during_auto_advance_leaves_idle() {
    let (mut s, _rx, world) = loaded(&["a", "b", "c"]);
    world.lock().unwrap().unbindable.insert(track("b").path);
    s.play();

    finish_current(&world, None);
    s.tick();

    assert_eq!(s.playlist().cursor(), Some(1));
    assert_eq!(s.phase(), Phase::Idle);

    let attempts = world.lock().unwrap().attempts.len();
    s.tick();
    s.tick();
    assert_eq!(world.lock().unwrap().attempts.len(), attempts);
}

#[test]
fn seek_is_bounded_by_the_duration() {
    let world = world_with(&[("a", 180)]);
    let (mut s, rx) = session(&world);

    s.seek(secs(10));
    assert!(drain(&rx).is_empty());

    s.add(track("a"));
    drain(&rx);

    s.seek(secs(181));
    assert!(drain(&rx).is_empty());
    assert_eq!(s.position(), Duration::ZERO);

    s.seek(secs(30));
    assert_eq!(drain(&rx), vec![PlayerEvent::Position(secs(30))]);
    assert_eq!(s.position(), secs(30));

    s.seek(secs(180));
    assert_eq!(drain(&rx), vec![PlayerEvent::Position(secs(180))]);
}

#[test]
fn volume_is_clamped_and_carried_to_new_outputs() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);

    s.set_volume(1.5);
    assert_eq!(s.volume(), 1.0);
    s.set_volume(-0.5);
    assert_eq!(s.volume(), 0.0);
    s.set_volume(0.4);
    s.set_volume(f32::NAN);
    assert_eq!(s.volume(), 0.4);
    assert_eq!(world.lock().unwrap().last_output().lock().unwrap().volume, 0.4);

    s.next();
    assert_eq!(world.lock().unwrap().last_output().lock().unwrap().volume, 0.4);
}

#[test]
fn only_the_first_added_track_is_loaded() {
    let world = world_with(&[("a", 180), ("b", 180)]);
    let (mut s, rx) = session(&world);

    s.add(track("a"));
    drain(&rx);
    s.add(track("b"));

    assert!(drain(&rx).is_empty());
    assert_eq!(world.lock().unwrap().attempts.len(), 1);
    assert_eq!(s.playlist().len(), 2);
    assert_eq!(s.playlist().cursor(), Some(0));
}

#[test]
fn remove_keeps_the_cursor_on_a_valid_entry() {
    let (mut s, _rx, _world) = loaded(&["a", "b", "c"]);
    s.play_track(&track("c"));

    s.remove(0);
    assert_eq!(s.playlist().cursor(), Some(1));
    assert_eq!(s.playlist().current(), Some(&track("c")));

    s.remove(7);
    assert_eq!(s.playlist().len(), 2);

    s.remove(1);
    assert_eq!(s.playlist().cursor(), Some(0));

    s.remove(0);
    assert_eq!(s.playlist().cursor(), None);
    assert!(s.playlist().is_empty());
}

#[test]
fn removing_before_a_front_cursor_keeps_it_at_zero() {
    let (mut s, _rx, _world) = loaded(&["a", "b"]);
    s.remove(0);
    assert_eq!(s.playlist().cursor(), Some(0));
    assert_eq!(s.playlist().current(), Some(&track("b")));
}

#[test]
fn clear_empties_stops_and_reports_no_track() {
    let (mut s, rx, _world) = loaded(&["a", "b"]);
    s.play();
    drain(&rx);

    s.clear();

    assert!(s.playlist().is_empty());
    assert_eq!(s.playlist().cursor(), None);
    assert_eq!(s.phase(), Phase::Loaded);
    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::Position(Duration::ZERO),
            PlayerEvent::Playing(false),
            PlayerEvent::CurrentTrack(None),
        ]
    );
}

#[test]
fn play_track_selects_and_loads_without_playing() {
    let (mut s, rx, _world) = loaded(&["a", "b", "c"]);
    s.play();
    drain(&rx);

    s.play_track(&track("c"));
    assert_eq!(s.playlist().cursor(), Some(2));
    assert_eq!(s.phase(), Phase::Loaded);
    assert_eq!(drain(&rx).last(), Some(&PlayerEvent::Playing(false)));

    s.play_track(&track("elsewhere"));
    assert_eq!(s.playlist().cursor(), Some(2));
    assert!(drain(&rx).is_empty());
}

#[test]
fn play_from_idle_loads_the_current_track() {
    let world = world_with(&[]);
    let (mut s, _rx) = session(&world);

    s.play();
    assert_eq!(s.phase(), Phase::Idle);

    s.add(track("late"));
    assert_eq!(s.phase(), Phase::Idle);

    world.lock().unwrap().files.insert(track("late").path, secs(60));
    s.play();
    assert_eq!(s.phase(), Phase::Playing);
    assert!(world.lock().unwrap().last_output().lock().unwrap().playing);
}

#[test]
fn loading_releases_the_previous_output() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);
    let first = world.lock().unwrap().last_output();

    s.next();

    assert!(first.lock().unwrap().released);
    assert_eq!(world.lock().unwrap().outputs.len(), 2);
}

#[test]
fn release_failure_does_not_block_the_next_load() {
    let (mut s, _rx, world) = loaded(&["a", "b"]);
    world.lock().unwrap().release_fails = true;
    s.next();
    s.next();
    assert_eq!(s.phase(), Phase::Loaded);
    assert_eq!(s.playlist().cursor(), Some(0));
}

#[test]
fn dispose_releases_output_and_backend() {
    let (s, _rx, world) = loaded(&["a"]);
    let output = world.lock().unwrap().last_output();

    s.dispose();

    assert!(output.lock().unwrap().released);
    assert_eq!(world.lock().unwrap().shutdowns, 1);
}

#[test]
fn positions_are_only_reported_while_playing() {
    let (mut s, rx, world) = loaded(&["a"]);

    s.tick();
    assert!(drain(&rx).is_empty());

    s.play();
    world.lock().unwrap().last_output().lock().unwrap().position = secs(3);
    s.tick();
    assert_eq!(
        drain(&rx),
        vec![PlayerEvent::Playing(true), PlayerEvent::Position(secs(3))]
    );

    s.pause();
    s.tick();
    assert_eq!(drain(&rx), vec![PlayerEvent::Playing(false)]);
}

#[test]
fn lyric_changes_follow_ticks_and_seeks() {
    let world = world_with(&[("a", 180)]);
    let lines = vec![
        LyricLine {
            time: secs(2),
            text: "first".into(),
        },
        LyricLine {
            time: secs(10),
            text: "second".into(),
        },
    ];
    let (mut s, rx) = session_with_lyrics(&world, Box::new(FixedLyrics(lines.clone())));
    s.add(track("a"));
    s.play();
    drain(&rx);

    world.lock().unwrap().last_output().lock().unwrap().position = secs(3);
    s.tick();
    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::Position(secs(3)),
            PlayerEvent::Lyric(Some(lines[0].clone())),
        ]
    );

    s.tick();
    assert_eq!(drain(&rx), vec![PlayerEvent::Position(secs(3))]);

    s.seek(secs(11));
    assert_eq!(
        drain(&rx),
        vec![
            PlayerEvent::Position(secs(11)),
            PlayerEvent::Lyric(Some(lines[1].clone())),
        ]
    );

    s.seek(secs(1));
    assert_eq!(
        drain(&rx),
        vec![PlayerEvent::Position(secs(1)), PlayerEvent::Lyric(None)]
    );
}

fn fast_settings() -> AudioSettings {
    AudioSettings {
        poll_interval_ms: 5,
        ..AudioSettings::default()
    }
}

fn player(world: &Shared<World>) -> AudioPlayer {
    let world = world.clone();
    AudioPlayer::with_backend(
        move || FakeBackend { world },
        fast_settings(),
        Box::new(NoLyrics),
    )
}

#[test]
fn player_runs_commands_and_publishes_snapshots() {
    let world = world_with(&[("a", 180), ("b", 200)]);
    let player = player(&world);
    let rx = player.subscribe();

    player.add(track("a"));
    player.add(track("b"));
    player.next();
    player.play();
    player.set_volume(0.5);
    assert!(player.sync());

    let snap = player.snapshot();
    assert_eq!(snap.phase, Phase::Playing);
    assert_eq!(snap.tracks.len(), 2);
    assert_eq!(snap.current_index, Some(1));
    assert_eq!(snap.current_track(), Some(&track("b")));
    assert_eq!(snap.duration, secs(200));
    assert_eq!(snap.volume, 0.5);

    let events: Vec<PlayerEvent> = rx.try_iter().collect();
    assert!(events.contains(&PlayerEvent::Playing(true)));
}

#[test]
fn player_reports_positions_while_playing() {
    let world = world_with(&[("a", 180)]);
    let player = player(&world);
    let rx = player.subscribe();

    player.add(track("a"));
    player.play();
    assert!(player.sync());

    let saw_position = (0..200)
        .filter_map(|_| rx.recv_timeout(Duration::from_millis(20)).ok())
        .any(|e| matches!(e, PlayerEvent::Position(_)));
    assert!(saw_position);
}

#[test]
fn shutdown_disposes_exactly_once() {
    let world = world_with(&[("a", 180)]);
    let player = player(&world);
    player.add(track("a"));

    player.shutdown();
    player.shutdown();
    assert!(!player.sync());
    assert_eq!(world.lock().unwrap().shutdowns, 1);

    drop(player);
    assert_eq!(world.lock().unwrap().shutdowns, 1);
}

#[test]
fn dropping_the_player_stops_the_thread() {
    let world = world_with(&[("a", 180)]);
    let player = player(&world);
    player.add(track("a"));
    drop(player);

    let w = world.lock().unwrap();
    assert_eq!(w.shutdowns, 1);
    assert!(w.outputs[0].lock().unwrap().released);
}

#[test]
fn restore_skips_missing_files_and_persist_saves_the_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let present = Track::from_path(dir.path().join("present.mp3"));
    std::fs::write(&present.path, b"fake").unwrap();
    let gone = Track::from_path(dir.path().join("gone.mp3"));

    let mut w = World::default();
    w.files.insert(present.path.clone(), secs(90));
    let world = Arc::new(Mutex::new(w));
    let player = player(&world);

    let saved = MemoryStore::with_tracks(vec![present.clone(), gone, present.clone()]);
    assert_eq!(player.restore(&saved), 1);

    let out = MemoryStore::default();
    player.persist(&out);
    assert_eq!(out.saved(), vec![present]);
    assert_eq!(player.snapshot().phase, Phase::Loaded);
}

#[test]
fn store_failures_are_absorbed() {
    let world = world_with(&[]);
    let player = player(&world);
    let broken = MemoryStore::failing();

    assert_eq!(player.restore(&broken), 0);
    player.persist(&broken);
    assert!(player.sync());
}
