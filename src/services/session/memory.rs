use std::{
    any::Any,
    cell::RefCell,
    collections::HashSet,
    time::Instant,
};

use super::{
    Capability, MediaItem, MediaSession, ReadyState, RepeatMode, SessionEvent, SessionListener,
};

/// Plain description of a [`MemorySession`], built off the home thread and
/// turned into a session on it.
#[derive(Debug, Clone)]
pub struct MemorySessionBuilder {
    namespace: String,
    queue: Vec<MediaItem>,
    index: usize,
    capabilities: HashSet<Capability>,
    ready_code: i32,
    play_when_ready: bool,
    repeat_code: i32,
    shuffle: bool,
    speed: f32,
    volume: f32,
    position_ms: i64,
    duration_ms: Option<i64>,
}

impl MemorySessionBuilder {
    /// Queue of items; the first one becomes current.
    pub fn queue(mut self, items: Vec<MediaItem>) -> Self {
        self.queue = items;
        self.index = 0;
        self
    }

    /// Make exactly these capabilities available.
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    /// Remove one capability.
    pub fn without(mut self, capability: Capability) -> Self {
        self.capabilities.remove(&capability);
        self
    }

    /// Initial ready-state.
    pub fn ready_state(mut self, state: ReadyState) -> Self {
        self.ready_code = state.code();
        self
    }

    /// Initial play-when-ready flag.
    pub fn play_when_ready(mut self, play_when_ready: bool) -> Self {
        self.play_when_ready = play_when_ready;
        self
    }

    /// Initial repeat mode.
    pub fn repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.repeat_code = mode.code();
        self
    }

    /// Initial raw repeat-mode code, including codes no mode maps to.
    pub fn repeat_code(mut self, code: i32) -> Self {
        self.repeat_code = code;
        self
    }

    /// Initial shuffle flag.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Initial playback speed.
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Initial volume.
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Initial position in milliseconds.
    pub fn position_ms(mut self, position_ms: i64) -> Self {
        self.position_ms = position_ms;
        self
    }

    /// Duration of every queued item in milliseconds.
    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Build the session. Call this on the home thread.
    pub fn build(self) -> MemorySession {
        let state = MemoryState {
            queue: self.queue,
            index: self.index,
            capabilities: self.capabilities,
            ready_code: self.ready_code,
            play_when_ready: self.play_when_ready,
            repeat_code: self.repeat_code,
            shuffle: self.shuffle,
            speed: self.speed,
            volume: self.volume,
            position_ms: self.position_ms,
            playing_since: None,
            duration_ms: self.duration_ms,
        };

        let session = MemorySession {
            namespace: self.namespace,
            state: RefCell::new(state),
            listeners: RefCell::new(Vec::new()),
        };
        session.state.borrow_mut().sync_clock();
        session
    }
}

struct MemoryState {
    queue: Vec<MediaItem>,
    index: usize,
    capabilities: HashSet<Capability>,
    ready_code: i32,
    play_when_ready: bool,
    repeat_code: i32,
    shuffle: bool,
    speed: f32,
    volume: f32,
    position_ms: i64,
    playing_since: Option<Instant>,
    duration_ms: Option<i64>,
}

impl MemoryState {
    fn is_playing(&self) -> bool {
        self.play_when_ready && self.ready_code == ReadyState::Ready.code()
    }

    fn position_ms(&self) -> i64 {
        match self.playing_since {
            Some(since) => {
                let elapsed = since.elapsed().as_millis() as f64 * f64::from(self.speed);
                let position = self.position_ms + elapsed as i64;
                match self.duration_ms {
                    Some(duration) => position.min(duration),
                    None => position,
                }
            }
            None => self.position_ms,
        }
    }

    /// Fold elapsed play time into the stored position and restart the clock
    /// if still playing.
    fn sync_clock(&mut self) {
        self.position_ms = self.position_ms();
        self.playing_since = self.is_playing().then(Instant::now);
    }
}

/// In-memory media session.
///
/// Behaves like a simple queue player: play/pause toggle play-when-ready,
/// stop returns to idle, next/previous walk the queue, and the position
/// advances with wall-clock time while playing. Capabilities are whatever
/// the builder or [`MemorySession::set_available`] says.
pub struct MemorySession {
    namespace: String,
    state: RefCell<MemoryState>,
    listeners: RefCell<Vec<Box<dyn SessionListener>>>,
}

impl MemorySession {
    /// Start describing a session owned by `namespace`.
    pub fn builder(namespace: impl Into<String>) -> MemorySessionBuilder {
        MemorySessionBuilder {
            namespace: namespace.into(),
            queue: Vec::new(),
            index: 0,
            capabilities: Capability::ALL.into_iter().collect(),
            ready_code: ReadyState::Ready.code(),
            play_when_ready: false,
            repeat_code: RepeatMode::Off.code(),
            shuffle: false,
            speed: 1.0,
            volume: 1.0,
            position_ms: 0,
            duration_ms: None,
        }
    }

    /// Downcast a session reference to a memory session.
    pub fn from_dyn(session: &dyn MediaSession) -> Option<&MemorySession> {
        session.as_any().downcast_ref::<MemorySession>()
    }

    /// Change a capability, notifying listeners when it actually changes.
    pub fn set_available(&self, capability: Capability, available: bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            if available {
                state.capabilities.insert(capability)
            } else {
                state.capabilities.remove(&capability)
            }
        };

        if changed {
            self.notify(&[SessionEvent::AvailableCommandsChanged]);
        }
    }

    /// Replace the current item, as if the owning app loaded new media.
    pub fn replace_item(&self, item: MediaItem) {
        {
            let mut state = self.state.borrow_mut();
            let index = state.index;
            if index < state.queue.len() {
                state.queue[index] = item;
            } else {
                state.queue.push(item);
                state.index = state.queue.len() - 1;
            }
            state.position_ms = 0;
            state.playing_since = state.is_playing().then(Instant::now);
        }

        self.notify(&[
            SessionEvent::MediaItemTransition,
            SessionEvent::PositionDiscontinuity { new_position_ms: 0 },
        ]);
    }

    /// Change the ready-state, as if the player finished buffering or ended.
    pub fn set_ready_state(&self, state: ReadyState) {
        let events = self.transition(|s| s.ready_code = state.code());
        self.notify(&events);
    }

    fn notify(&self, events: &[SessionEvent]) {
        let listeners = self.listeners.borrow();
        for event in events {
            for listener in listeners.iter() {
                listener.on_event(event);
            }
        }
    }

    /// Apply a change to play-when-ready / ready-state and report the
    /// resulting notifications in the order a player emits them.
    fn transition(&self, change: impl FnOnce(&mut MemoryState)) -> Vec<SessionEvent> {
        let mut state = self.state.borrow_mut();
        let was_playing = state.is_playing();
        let old_pwr = state.play_when_ready;
        let old_ready = state.ready_code;

        state.sync_clock();
        change(&mut *state);
        state.sync_clock();

        let mut events = Vec::new();
        if state.play_when_ready != old_pwr {
            events.push(SessionEvent::PlayWhenReadyChanged(state.play_when_ready));
        }
        if state.ready_code != old_ready {
            events.push(SessionEvent::PlaybackStateChanged(state.ready_code));
        }
        if state.is_playing() != was_playing {
            events.push(SessionEvent::IsPlayingChanged(state.is_playing()));
        }
        events
    }

    fn move_to(&self, index: usize) {
        {
            let mut state = self.state.borrow_mut();
            state.index = index;
            state.position_ms = 0;
            state.playing_since = state.is_playing().then(Instant::now);
        }

        self.notify(&[
            SessionEvent::MediaItemTransition,
            SessionEvent::PositionDiscontinuity { new_position_ms: 0 },
        ]);
    }
}

impl MediaSession for MemorySession {
    fn is_playing(&self) -> bool {
        self.state.borrow().is_playing()
    }

    fn play_when_ready(&self) -> bool {
        self.state.borrow().play_when_ready
    }

    fn playback_state(&self) -> i32 {
        self.state.borrow().ready_code
    }

    fn repeat_mode(&self) -> i32 {
        self.state.borrow().repeat_code
    }

    fn shuffle_enabled(&self) -> bool {
        self.state.borrow().shuffle
    }

    fn playback_speed(&self) -> f32 {
        self.state.borrow().speed
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn current_position_ms(&self) -> i64 {
        self.state.borrow().position_ms()
    }

    fn duration_ms(&self) -> Option<i64> {
        self.state.borrow().duration_ms
    }

    fn package_namespace(&self) -> String {
        self.namespace.clone()
    }

    fn current_item(&self) -> Option<MediaItem> {
        let state = self.state.borrow();
        state.queue.get(state.index).cloned()
    }

    fn is_available(&self, capability: Capability) -> bool {
        self.state.borrow().capabilities.contains(&capability)
    }

    fn play(&self) {
        let events = self.transition(|state| {
            state.play_when_ready = true;
            let idle = state.ready_code == ReadyState::Idle.code();
            let ended = state.ready_code == ReadyState::Ended.code();
            if (idle || ended) && !state.queue.is_empty() {
                if ended {
                    state.position_ms = 0;
                }
                state.ready_code = ReadyState::Ready.code();
            }
        });
        self.notify(&events);
    }

    fn pause(&self) {
        let events = self.transition(|state| state.play_when_ready = false);
        self.notify(&events);
    }

    fn stop(&self) {
        let events = self.transition(|state| {
            state.play_when_ready = false;
            state.ready_code = ReadyState::Idle.code();
        });
        self.notify(&events);
    }

    fn seek_to(&self, position_ms: i64) {
        let new_position_ms = {
            let mut state = self.state.borrow_mut();
            let clamped = match state.duration_ms {
                Some(duration) => position_ms.clamp(0, duration),
                None => position_ms.max(0),
            };
            state.position_ms = clamped;
            state.playing_since = state.is_playing().then(Instant::now);
            clamped
        };

        self.notify(&[SessionEvent::PositionDiscontinuity { new_position_ms }]);
    }

    fn seek_to_next(&self) {
        let next = {
            let state = self.state.borrow();
            let last = state.queue.len().saturating_sub(1);
            if state.index < last {
                Some(state.index + 1)
            } else if state.repeat_code == RepeatMode::All.code() && !state.queue.is_empty() {
                Some(0)
            } else {
                None
            }
        };

        if let Some(index) = next {
            self.move_to(index);
        }
    }

    fn seek_to_previous(&self) {
        let previous = {
            let state = self.state.borrow();
            state.index.checked_sub(1)
        };

        match previous {
            Some(index) => self.move_to(index),
            None => self.seek_to(0),
        }
    }

    fn set_repeat_mode(&self, code: i32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.repeat_code != code;
            state.repeat_code = code;
            changed
        };

        if changed {
            self.notify(&[SessionEvent::RepeatModeChanged(code)]);
        }
    }

    fn set_shuffle_enabled(&self, enabled: bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.shuffle != enabled;
            state.shuffle = enabled;
            changed
        };

        if changed {
            self.notify(&[SessionEvent::ShuffleModeChanged(enabled)]);
        }
    }

    fn set_playback_speed(&self, speed: f32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            state.sync_clock();
            let changed = (state.speed - speed).abs() > f32::EPSILON;
            state.speed = speed;
            changed
        };

        if changed {
            self.notify(&[SessionEvent::PlaybackSpeedChanged(speed)]);
        }
    }

    fn set_volume(&self, volume: f32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = (state.volume - volume).abs() > f32::EPSILON;
            state.volume = volume;
            changed
        };

        if changed {
            self.notify(&[SessionEvent::VolumeChanged(volume)]);
        }
    }

    fn add_listener(&self, listener: Box<dyn SessionListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
