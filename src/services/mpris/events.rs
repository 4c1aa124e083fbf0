use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{
    properties::read_player_values,
    types::{BusSignal, PlayerProperty},
};
use crate::services::session::{SessionEvent, SessionListener, SessionSupervisor, WeakSessionHost};

/// Sending half of the outbound signal queue.
pub type SignalSender = mpsc::UnboundedSender<BusSignal>;

/// Receiving half of the outbound signal queue.
pub type SignalReceiver = mpsc::UnboundedReceiver<BusSignal>;

const PLAYBACK_STATUS: &[PlayerProperty] = &[PlayerProperty::PlaybackStatus];
const METADATA: &[PlayerProperty] = &[PlayerProperty::Metadata];
const VOLUME: &[PlayerProperty] = &[PlayerProperty::Volume];
const CAPABILITIES: &[PlayerProperty] = &PlayerProperty::CAPABILITIES;
const LOOP_STATUS: &[PlayerProperty] = &[PlayerProperty::LoopStatus];
const SHUFFLE: &[PlayerProperty] = &[PlayerProperty::Shuffle];
const RATE: &[PlayerProperty] = &[PlayerProperty::Rate];

/// Turns session notifications into queued bus signals.
///
/// Registered as a listener on the session, so it runs on the home thread.
/// Values are re-read from the session when the notification arrives rather
/// than taken from the notification payload. Notifications from a session
/// that is no longer the supervisor's current one are dropped.
pub struct EventBridge {
    host: WeakSessionHost,
    supervisor: Arc<dyn SessionSupervisor>,
    signals: SignalSender,
}

impl EventBridge {
    /// Bridge notifications of the session behind `host` into `signals`.
    pub fn new(
        host: WeakSessionHost,
        supervisor: Arc<dyn SessionSupervisor>,
        signals: SignalSender,
    ) -> Self {
        Self {
            host,
            supervisor,
            signals,
        }
    }

    fn is_current(&self) -> bool {
        match (self.host.upgrade(), self.supervisor.current_session()) {
            (Some(host), Some(current)) => host == current,
            _ => false,
        }
    }

    /// Properties announced for a notification, or `None` when it maps to
    /// something other than a property change.
    pub fn changed_properties(event: &SessionEvent) -> Option<&'static [PlayerProperty]> {
        match event {
            SessionEvent::PositionDiscontinuity { .. } => None,
            SessionEvent::IsPlayingChanged(_)
            | SessionEvent::PlayWhenReadyChanged(_)
            | SessionEvent::PlaybackStateChanged(_) => Some(PLAYBACK_STATUS),
            SessionEvent::MediaItemTransition | SessionEvent::MediaMetadataChanged => {
                Some(METADATA)
            }
            SessionEvent::VolumeChanged(_) => Some(VOLUME),
            SessionEvent::AvailableCommandsChanged => Some(CAPABILITIES),
            SessionEvent::RepeatModeChanged(_) => Some(LOOP_STATUS),
            SessionEvent::ShuffleModeChanged(_) => Some(SHUFFLE),
            SessionEvent::PlaybackSpeedChanged(_) => Some(RATE),
        }
    }

    fn queue(&self, signal: BusSignal) {
        if self.signals.send(signal).is_err() {
            debug!("Signal queue closed, dropping signal");
        }
    }

    fn announce(&self, properties: &'static [PlayerProperty]) {
        let Some(host) = self.host.upgrade() else {
            debug!("Session host gone, dropping notification");
            return;
        };

        match host.call(move |session| read_player_values(Some(session), properties)) {
            Ok(Ok(changed)) => self.queue(BusSignal::PropertiesChanged { changed }),
            Ok(Err(e)) => warn!(error = %e, "Cannot announce property change"),
            Err(e) => warn!(error = %e, "Session hand-off failed while announcing change"),
        }
    }
}

impl SessionListener for EventBridge {
    fn on_event(&self, event: &SessionEvent) {
        if !self.is_current() {
            debug!(?event, "Ignoring notification from inactive session");
            return;
        }

        if let SessionEvent::PositionDiscontinuity { new_position_ms } = event {
            self.queue(BusSignal::Seeked {
                position_us: new_position_ms.saturating_mul(1000),
            });
            return;
        }

        if let Some(properties) = Self::changed_properties(event) {
            self.announce(properties);
        }
    }
}
