use std::sync::PoisonError;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, select};
use tracing::debug;

use crate::config::AudioSettings;
use crate::lyrics::LyricSource;

use super::backend::AudioBackend;
use super::session::Session;
use super::types::{AudioCmd, EventBus, Phase, SnapshotHandle};

/// Spawn the audio thread.
///
/// The backend is built on the thread itself, so device handles never cross
/// threads. The loop serves commands and a position tick until `Quit`
/// arrives or every sender is gone, then disposes the session.
pub(super) fn spawn_audio_thread<B, F>(
    make_backend: F,
    settings: AudioSettings,
    lyric_source: Box<dyn LyricSource + Send>,
    rx: Receiver<AudioCmd>,
    events: EventBus,
    snapshot: SnapshotHandle,
) -> JoinHandle<()>
where
    B: AudioBackend,
    F: FnOnce() -> B + Send + 'static,
{
    thread::spawn(move || {
        let poll_interval = Duration::from_millis(settings.poll_interval_ms.max(1));
        let mut session = Session::new(make_backend(), &settings, lyric_source, events);
        let ticker = crossbeam_channel::tick(poll_interval);

        publish(&session, &snapshot);

        loop {
            select! {
                recv(rx) -> msg => match msg {
                    Ok(AudioCmd::Quit) | Err(_) => break,
                    Ok(AudioCmd::Sync(ack)) => {
                        let _ = ack.send(());
                    }
                    Ok(cmd) => {
                        session.apply(cmd);
                        publish(&session, &snapshot);
                    }
                },
                recv(ticker) -> _ => {
                    session.tick();
                    let mut snap = snapshot.lock().unwrap_or_else(PoisonError::into_inner);
                    session.write_progress(&mut snap);
                }
            }
        }

        session.dispose();
        if let Ok(mut snap) = snapshot.lock() {
            snap.phase = Phase::Idle;
            snap.position = Duration::ZERO;
        }
        debug!("audio thread stopped");
    })
}

fn publish<B: AudioBackend>(session: &Session<B>, snapshot: &SnapshotHandle) {
    let fresh = session.snapshot();
    *snapshot.lock().unwrap_or_else(PoisonError::into_inner) = fresh;
}
