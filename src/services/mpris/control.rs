use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::{
    properties::repeat_mode_for,
    types::{LoopStatus, MAXIMUM_RATE, MINIMUM_RATE},
};
use crate::services::session::{Capability, MediaSession, SessionSupervisor};

/// Translates MPRIS transport commands into session commands.
///
/// Every command runs on the session's home thread and is gated on the
/// matching capability, queried at call time. Commands the session cannot
/// perform, and hand-offs that fail, are silently dropped.
pub struct CommandDispatcher {
    supervisor: Arc<dyn SessionSupervisor>,
}

impl CommandDispatcher {
    /// Create a dispatcher driving whatever session `supervisor` reports.
    pub fn new(supervisor: Arc<dyn SessionSupervisor>) -> Self {
        Self { supervisor }
    }

    fn run<F>(&self, command: &'static str, job: F)
    where
        F: FnOnce(&dyn MediaSession) + Send + 'static,
    {
        let Some(host) = self.supervisor.current_session() else {
            debug!(command, "No session bound, ignoring command");
            return;
        };

        if let Err(e) = host.call(job) {
            warn!(command, error = %e, "Session command dropped");
        }
    }

    fn gated<F>(&self, command: &'static str, capability: Capability, action: F)
    where
        F: FnOnce(&dyn MediaSession) + Send + 'static,
    {
        self.run(command, move |session| {
            if session.is_available(capability) {
                action(session);
            } else {
                debug!(command, ?capability, "Capability unavailable");
            }
        });
    }

    /// Start playback.
    #[instrument(skip(self))]
    pub fn play(&self) {
        self.gated("Play", Capability::Play, |session| session.play());
    }

    /// Pause playback.
    #[instrument(skip(self))]
    pub fn pause(&self) {
        self.gated("Pause", Capability::Pause, |session| session.pause());
    }

    /// Pause when playing, play otherwise. The decision and the command run
    /// in the same home-thread job.
    #[instrument(skip(self))]
    pub fn play_pause(&self) {
        self.run("PlayPause", |session| {
            let (capability, playing) = if session.is_playing() {
                (Capability::Pause, true)
            } else {
                (Capability::Play, false)
            };

            if !session.is_available(capability) {
                debug!(?capability, "Capability unavailable");
                return;
            }

            if playing {
                session.pause();
            } else {
                session.play();
            }
        });
    }

    /// Stop playback, or pause when the session cannot stop.
    #[instrument(skip(self))]
    pub fn stop(&self) {
        self.run("Stop", |session| {
            if session.is_available(Capability::Stop) {
                session.stop();
            } else if session.is_available(Capability::Pause) {
                debug!("Stop unavailable, pausing instead");
                session.pause();
            }
        });
    }

    /// Skip to the next item.
    #[instrument(skip(self))]
    pub fn next(&self) {
        self.gated("Next", Capability::GoNext, |session| session.seek_to_next());
    }

    /// Go back to the previous item.
    #[instrument(skip(self))]
    pub fn previous(&self) {
        self.gated("Previous", Capability::GoPrevious, |session| {
            session.seek_to_previous();
        });
    }

    /// Seek relative to the current position. Results before the start of
    /// the item seek to the start.
    #[instrument(skip(self))]
    pub fn seek(&self, offset_us: i64) {
        self.gated("Seek", Capability::Seek, move |session| {
            let target_ms = session
                .current_position_ms()
                .saturating_add(offset_us / 1000)
                .max(0);
            session.seek_to(target_ms);
        });
    }

    /// Seek to an absolute position. The track id is not checked against
    /// the current item; negative positions are ignored.
    #[instrument(skip(self))]
    pub fn set_position(&self, track_id: &str, position_us: i64) {
        if position_us < 0 {
            debug!("Ignoring negative position");
            return;
        }

        self.gated("SetPosition", Capability::Seek, move |session| {
            session.seek_to(position_us / 1000);
        });
    }

    /// Change the playback rate. Rates outside the advertised range are
    /// ignored.
    #[instrument(skip(self))]
    pub fn set_rate(&self, rate: f64) {
        if !rate.is_finite() || !(MINIMUM_RATE..=MAXIMUM_RATE).contains(&rate) {
            debug!("Ignoring out-of-range rate");
            return;
        }

        self.gated("SetRate", Capability::SetSpeed, move |session| {
            session.set_playback_speed(rate as f32);
        });
    }

    /// Enable or disable shuffle.
    #[instrument(skip(self))]
    pub fn set_shuffle(&self, shuffle: bool) {
        self.gated("SetShuffle", Capability::SetShuffle, move |session| {
            session.set_shuffle_enabled(shuffle);
        });
    }

    /// Change the loop status.
    #[instrument(skip(self))]
    pub fn set_loop_status(&self, status: LoopStatus) {
        let code = repeat_mode_for(status).code();
        self.gated("SetLoopStatus", Capability::SetRepeat, move |session| {
            session.set_repeat_mode(code);
        });
    }

    /// Change the volume, clamped to `0.0..=1.0`.
    #[instrument(skip(self))]
    pub fn set_volume(&self, volume: f64) {
        if !volume.is_finite() {
            debug!("Ignoring non-finite volume");
            return;
        }

        let volume = volume.clamp(0.0, 1.0) as f32;
        self.gated("SetVolume", Capability::SetVolume, move |session| {
            session.set_volume(volume);
        });
    }

    /// Accepted and ignored; the session has no way to open URIs.
    #[instrument(skip(self))]
    pub fn open_uri(&self, uri: &str) {
        debug!("OpenUri is not supported by the session");
    }

    /// Accepted and ignored.
    pub fn raise(&self) {
        debug!("Raise ignored");
    }

    /// Accepted and ignored.
    pub fn quit(&self) {
        debug!("Quit ignored");
    }
}
