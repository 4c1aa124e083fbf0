//! Unit tests for the session layer
//!
//! Covers the home-thread hand-off, the supervisor slot and the in-memory
//! session's transport behaviour.

#![allow(clippy::unwrap_used)]

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use futures::StreamExt;

use super::{
    Capability, HandoffError, MediaItem, MediaSession, MemorySession, ReadyState, RepeatMode,
    SessionEvent, SessionHost, SessionListener, SessionSlot, SessionSupervisor, WeakSessionHost,
};

const TIMEOUT: Duration = Duration::from_secs(2);

fn item(id: &str) -> MediaItem {
    MediaItem {
        media_id: id.to_string(),
        title: Some(format!("Title {id}")),
        ..MediaItem::default()
    }
}

fn spawn_default() -> SessionHost {
    SessionHost::spawn("test", TIMEOUT, || {
        MemorySession::builder("com.example.player")
            .queue(vec![item("a"), item("b")])
            .build()
    })
    .unwrap()
}

struct Recorder {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl SessionListener for Recorder {
    fn on_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct QueryOnEvent {
    host: WeakSessionHost,
    seen: Arc<Mutex<Vec<bool>>>,
}

impl SessionListener for QueryOnEvent {
    fn on_event(&self, event: &SessionEvent) {
        if !matches!(event, SessionEvent::IsPlayingChanged(_)) {
            return;
        }
        if let Some(host) = self.host.upgrade() {
            let playing = host.call(|session| session.is_playing()).unwrap();
            self.seen.lock().unwrap().push(playing);
        }
    }
}

#[test]
fn call_runs_on_home_thread() {
    let host = spawn_default();

    let on_home = {
        let probe = host.clone();
        host.call(move |_| probe.is_home_thread()).unwrap()
    };

    assert!(on_home);
    assert!(!host.is_home_thread());
    host.shutdown();
}

#[test]
fn call_returns_session_values() {
    let host = spawn_default();

    let namespace = host.call(|session| session.package_namespace()).unwrap();
    let title = host
        .call(|session| session.current_item().and_then(|item| item.title))
        .unwrap();

    assert_eq!(namespace, "com.example.player");
    assert_eq!(title.as_deref(), Some("Title a"));
    host.shutdown();
}

#[test]
fn nested_call_from_home_thread_runs_inline() {
    let host = spawn_default();

    let inner = host.clone();
    let nested = host
        .call(move |_| inner.call(|session| session.volume()))
        .unwrap();

    assert_eq!(nested, Ok(1.0));
    host.shutdown();
}

#[test]
fn listener_can_query_session_without_deadlock() {
    let host = spawn_default();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let weak = host.downgrade();
    let sink = Arc::clone(&seen);
    host.call(move |session| {
        session.add_listener(Box::new(QueryOnEvent { host: weak, seen: sink }));
    })
    .unwrap();

    host.call(|session| session.play()).unwrap();
    host.call(|session| session.pause()).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    host.shutdown();
}

#[test]
fn call_after_shutdown_reports_session_gone() {
    let host = spawn_default();
    host.shutdown();

    assert_eq!(
        host.call(|session| session.is_playing()),
        Err(HandoffError::SessionGone)
    );
}

#[test]
fn host_runs_until_shutdown() {
    let host = spawn_default();
    assert!(host.is_running());

    host.shutdown();

    assert!(!host.is_running());
}

#[test]
fn slow_job_times_out() {
    let timeout = Duration::from_millis(50);
    let host = SessionHost::spawn("slow", timeout, || {
        MemorySession::builder("com.example.slow").build()
    })
    .unwrap();

    let result = host.call(|_| thread::sleep(Duration::from_millis(300)));

    assert_eq!(result, Err(HandoffError::TimedOut(timeout)));
    host.shutdown();
}

#[test]
fn weak_host_does_not_outlive_shutdown_handle() {
    let host = spawn_default();
    let weak = host.downgrade();

    assert_eq!(weak.upgrade(), Some(host.clone()));

    host.shutdown();
    drop(host);

    assert!(weak.upgrade().is_none());
}

#[test]
fn slot_starts_empty_and_binds() {
    let slot = SessionSlot::new();
    assert!(slot.current_session().is_none());

    let host = spawn_default();
    slot.bind(host.clone());
    assert_eq!(slot.current_session(), Some(host.clone()));

    slot.clear();
    assert!(slot.current_session().is_none());
    host.shutdown();
}

#[tokio::test]
async fn slot_watch_reports_rebinding() {
    let slot = SessionSlot::new();
    let mut updates = slot.watch();

    assert_eq!(updates.next().await, Some(None));

    let host = spawn_default();
    slot.bind(host.clone());
    assert_eq!(updates.next().await, Some(Some(host.clone())));

    slot.clear();
    assert_eq!(updates.next().await, Some(None));
    host.shutdown();
}

#[test]
fn memory_session_defaults() {
    let session = MemorySession::builder("com.example.player").build();

    assert!(!session.is_playing());
    assert!(!session.play_when_ready());
    assert_eq!(session.playback_state(), ReadyState::Ready.code());
    assert_eq!(session.repeat_mode(), RepeatMode::Off.code());
    assert_eq!(session.playback_speed(), 1.0);
    assert_eq!(session.volume(), 1.0);
    assert!(session.current_item().is_none());
    assert!(Capability::ALL.iter().all(|c| session.is_available(*c)));
}

#[test]
fn memory_session_play_pause_emit_transitions() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a")])
        .build();
    let events = Arc::new(Mutex::new(Vec::new()));
    session.add_listener(Box::new(Recorder {
        events: Arc::clone(&events),
    }));

    session.play();
    assert!(session.is_playing());
    session.pause();
    assert!(!session.is_playing());

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            SessionEvent::PlayWhenReadyChanged(true),
            SessionEvent::IsPlayingChanged(true),
            SessionEvent::PlayWhenReadyChanged(false),
            SessionEvent::IsPlayingChanged(false),
        ]
    );
}

#[test]
fn memory_session_stop_goes_idle_and_play_recovers() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a")])
        .play_when_ready(true)
        .build();

    session.stop();
    assert_eq!(session.playback_state(), ReadyState::Idle.code());
    assert!(!session.is_playing());

    session.play();
    assert_eq!(session.playback_state(), ReadyState::Ready.code());
    assert!(session.is_playing());
}

#[test]
fn memory_session_buffering_is_not_playing() {
    let session = MemorySession::builder("com.example.player")
        .ready_state(ReadyState::Buffering)
        .play_when_ready(true)
        .build();

    assert!(!session.is_playing());
    assert!(session.play_when_ready());
}

#[test]
fn memory_session_seek_clamps_and_reports_discontinuity() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a")])
        .duration_ms(10_000)
        .build();
    let events = Arc::new(Mutex::new(Vec::new()));
    session.add_listener(Box::new(Recorder {
        events: Arc::clone(&events),
    }));

    session.seek_to(7_000);
    assert_eq!(session.current_position_ms(), 7_000);
    session.seek_to(50_000);
    assert_eq!(session.current_position_ms(), 10_000);
    session.seek_to(-5);
    assert_eq!(session.current_position_ms(), 0);

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            SessionEvent::PositionDiscontinuity { new_position_ms: 7_000 },
            SessionEvent::PositionDiscontinuity { new_position_ms: 10_000 },
            SessionEvent::PositionDiscontinuity { new_position_ms: 0 },
        ]
    );
}

#[test]
fn memory_session_paused_position_holds() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a")])
        .position_ms(4_000)
        .build();

    thread::sleep(Duration::from_millis(20));

    assert_eq!(session.current_position_ms(), 4_000);
}

#[test]
fn memory_session_walks_queue() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a"), item("b")])
        .position_ms(3_000)
        .build();

    session.seek_to_next();
    assert_eq!(session.current_item().unwrap().media_id, "b");
    assert_eq!(session.current_position_ms(), 0);

    session.seek_to_next();
    assert_eq!(session.current_item().unwrap().media_id, "b");

    session.seek_to_previous();
    assert_eq!(session.current_item().unwrap().media_id, "a");
}

#[test]
fn memory_session_repeat_all_wraps() {
    let session = MemorySession::builder("com.example.player")
        .queue(vec![item("a"), item("b")])
        .repeat_mode(RepeatMode::All)
        .build();

    session.seek_to_next();
    session.seek_to_next();

    assert_eq!(session.current_item().unwrap().media_id, "a");
}

#[test]
fn memory_session_setters_report_only_changes() {
    let session = MemorySession::builder("com.example.player").build();
    let events = Arc::new(Mutex::new(Vec::new()));
    session.add_listener(Box::new(Recorder {
        events: Arc::clone(&events),
    }));

    session.set_volume(1.0);
    session.set_volume(0.5);
    session.set_shuffle_enabled(true);
    session.set_repeat_mode(RepeatMode::One.code());
    session.set_playback_speed(1.5);
    session.set_available(Capability::Seek, true);
    session.set_available(Capability::Seek, false);

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            SessionEvent::VolumeChanged(0.5),
            SessionEvent::ShuffleModeChanged(true),
            SessionEvent::RepeatModeChanged(1),
            SessionEvent::PlaybackSpeedChanged(1.5),
            SessionEvent::AvailableCommandsChanged,
        ]
    );
    assert!(!session.is_available(Capability::Seek));
}

#[test]
fn memory_session_downcasts_from_dyn() {
    let session = MemorySession::builder("com.example.player").build();
    let dynamic: &dyn MediaSession = &session;

    assert!(MemorySession::from_dyn(dynamic).is_some());
}

#[test]
fn native_codes_round_trip() {
    for mode in [RepeatMode::Off, RepeatMode::One, RepeatMode::All] {
        assert_eq!(RepeatMode::try_from(mode.code()), Ok(mode));
    }
    assert_eq!(RepeatMode::try_from(7), Err(7));
    assert_eq!(ReadyState::try_from(0), Err(0));
}
