//! Headless runner: scan a folder, play it, and take commands on stdin.

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use tracing::{info, warn};

use crate::audio::{AudioPlayer, PlayerEvent, SessionSnapshot};
use crate::encoding::TextRecovery;
use crate::library::{PlaylistStore, Track, scan};
use crate::lyrics::{LrcLyrics, LyricSource, NoLyrics};

mod commands;
mod logging;
mod settings;

pub use commands::{Command, parse as parse_command};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    run_with_store(None)
}

/// [`run`] with a playlist store: the saved playlist is restored at
/// startup and written back after the folder scan and again on exit.
pub fn run_with_store(store: Option<&dyn PlaylistStore>) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, problem) = settings::load_settings();
    logging::init(&settings.logging.filter);
    if let Some(problem) = problem {
        warn!("{problem}");
    }

    let recovery = TextRecovery::from_settings(&settings.recovery).unwrap_or_default();
    let lyric_source: Box<dyn LyricSource + Send> = if settings.lyrics.enabled {
        Box::new(LrcLyrics::from_settings(&settings.lyrics, recovery.clone()))
    } else {
        Box::new(NoLyrics)
    };

    let player = AudioPlayer::new(settings.audio.clone(), lyric_source);
    let printer = spawn_printer(player.subscribe());

    if let Some(store) = store {
        player.restore(store);
    }

    if let Some(dir) = env::args_os().nth(1).map(PathBuf::from) {
        let tag_recovery = settings.recovery.enabled.then_some(&recovery);
        let tracks = scan(&dir, &settings.library, tag_recovery);
        if tracks.is_empty() {
            println!("no audio files found in {}", dir.display());
        }
        ingest(&player, tracks, store);
    }
    println!("{}", commands::HELP);

    for line in io::stdin().lock().lines() {
        let line = line?;
        match commands::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => execute(&player, cmd),
            Err(msg) => println!("{msg}"),
        }
    }

    info!("shutting down");
    if let Some(store) = store {
        player.persist(store);
    }
    // The printer ends once the last event sender goes away with the player.
    drop(player);
    let _ = printer.join();
    Ok(())
}

/// Queue scanned tracks that are not in the playlist yet, then save it.
fn ingest(player: &AudioPlayer, tracks: Vec<Track>, store: Option<&dyn PlaylistStore>) {
    player.sync();
    let known = player.snapshot().tracks;
    let fresh: Vec<Track> = tracks.into_iter().filter(|t| !known.contains(t)).collect();
    info!(added = fresh.len(), already_queued = known.len(), "queueing scanned tracks");

    for track in fresh {
        player.add(track);
    }
    if let Some(store) = store {
        player.persist(store);
    }
}

fn execute(player: &AudioPlayer, cmd: Command) {
    match cmd {
        Command::Play => player.play(),
        Command::Pause => player.pause(),
        Command::Stop => player.stop(),
        Command::Next => player.next(),
        Command::Previous => player.previous(),
        Command::Seek(to) => player.seek(to),
        Command::Volume(v) => player.set_volume(v),
        Command::Select(index) => {
            player.sync();
            match player.snapshot().tracks.get(index) {
                Some(track) => {
                    player.play_track(track.clone());
                    player.play();
                }
                None => println!("no track number {}", index + 1),
            }
        }
        Command::Remove(index) => player.remove(index),
        Command::Clear => player.clear(),
        Command::List => {
            player.sync();
            print!("{}", render_list(&player.snapshot()));
        }
        Command::Quit => {}
    }
}

fn render_list(snapshot: &SessionSnapshot) -> String {
    if snapshot.tracks.is_empty() {
        return "playlist is empty\n".to_string();
    }
    let mut out = String::new();
    for (i, track) in snapshot.tracks.iter().enumerate() {
        let marker = if snapshot.current_index == Some(i) { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker} {:>3}. {} [{}]\n",
            i + 1,
            track.display(),
            track.duration_string(),
        ));
    }
    out
}

fn spawn_printer(events: Receiver<PlayerEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in events {
            match event {
                PlayerEvent::CurrentTrack(Some(track)) => {
                    println!("now playing: {}", track.display());
                }
                PlayerEvent::CurrentTrack(None) => println!("playlist cleared"),
                PlayerEvent::Playing(playing) => {
                    println!("{}", if playing { "[playing]" } else { "[stopped]" });
                }
                PlayerEvent::Lyric(Some(line)) if !line.text.is_empty() => {
                    println!("  ♪ {}", line.text);
                }
                _ => {}
            }
        }
    })
}
