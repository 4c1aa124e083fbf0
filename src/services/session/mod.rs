//! Platform media session boundary.
//!
//! [`MediaSession`] mirrors the native control API of the session the
//! adapter is bound to. Sessions are single-threaded: each one lives on the
//! home thread of a [`SessionHost`] and every read or write reaches it
//! through that host.

mod error;
/// Home-thread actor owning a session.
pub mod host;
/// In-memory reference session.
pub mod memory;
/// Current-session slot handed out by the supervisor.
pub mod supervisor;

#[cfg(test)]
mod tests;

use std::any::Any;

pub use error::HandoffError;
pub use host::{SessionHost, WeakSessionHost};
pub use memory::{MemorySession, MemorySessionBuilder};
pub use supervisor::{SessionSlot, SessionSupervisor};

/// Session capability flags, queried at call time and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Skip to the next item.
    GoNext,
    /// Return to the previous item.
    GoPrevious,
    /// Start playback.
    Play,
    /// Pause playback.
    Pause,
    /// Stop playback and release the item.
    Stop,
    /// Seek within the current item.
    Seek,
    /// The session accepts remote control at all.
    Control,
    /// Change shuffle mode.
    SetShuffle,
    /// Change playback speed.
    SetSpeed,
    /// Change volume.
    SetVolume,
    /// Change repeat mode.
    SetRepeat,
}

impl Capability {
    /// Every capability flag.
    pub const ALL: [Capability; 11] = [
        Capability::GoNext,
        Capability::GoPrevious,
        Capability::Play,
        Capability::Pause,
        Capability::Stop,
        Capability::Seek,
        Capability::Control,
        Capability::SetShuffle,
        Capability::SetSpeed,
        Capability::SetVolume,
        Capability::SetRepeat,
    ];
}

/// Native repeat mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    /// Play through once.
    Off,
    /// Repeat the current item.
    One,
    /// Repeat the whole queue.
    All,
}

impl RepeatMode {
    /// Native integer code.
    pub fn code(self) -> i32 {
        match self {
            RepeatMode::Off => 0,
            RepeatMode::One => 1,
            RepeatMode::All => 2,
        }
    }
}

impl TryFrom<i32> for RepeatMode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RepeatMode::Off),
            1 => Ok(RepeatMode::One),
            2 => Ok(RepeatMode::All),
            other => Err(other),
        }
    }
}

/// Native ready-state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// No media loaded, or playback was stopped.
    Idle,
    /// Waiting for data before playback can continue.
    Buffering,
    /// Able to play immediately.
    Ready,
    /// Reached the end of the queue.
    Ended,
}

impl ReadyState {
    /// Native integer code.
    pub fn code(self) -> i32 {
        match self {
            ReadyState::Idle => 1,
            ReadyState::Buffering => 2,
            ReadyState::Ready => 3,
            ReadyState::Ended => 4,
        }
    }
}

impl TryFrom<i32> for ReadyState {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ReadyState::Idle),
            2 => Ok(ReadyState::Buffering),
            3 => Ok(ReadyState::Ready),
            4 => Ok(ReadyState::Ended),
            other => Err(other),
        }
    }
}

/// The item a session is currently playing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaItem {
    /// Session-assigned media identifier.
    pub media_id: String,
    /// Display title.
    pub title: Option<String>,
    /// Track artist.
    pub artist: Option<String>,
    /// Album name.
    pub album: Option<String>,
    /// Album artist.
    pub album_artist: Option<String>,
    /// Artwork location.
    pub art_uri: Option<String>,
}

/// State-change notifications a session delivers on its home thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The position jumped, e.g. after a seek or an item transition.
    PositionDiscontinuity {
        /// Position after the jump, in milliseconds.
        new_position_ms: i64,
    },
    /// Whether the session is actually playing changed.
    IsPlayingChanged(bool),
    /// The play-when-ready flag changed.
    PlayWhenReadyChanged(bool),
    /// The native ready-state code changed.
    PlaybackStateChanged(i32),
    /// A different item became current.
    MediaItemTransition,
    /// The current item's descriptive metadata changed.
    MediaMetadataChanged,
    /// The volume changed.
    VolumeChanged(f32),
    /// The set of available capabilities changed.
    AvailableCommandsChanged,
    /// The native repeat-mode code changed.
    RepeatModeChanged(i32),
    /// Shuffle was toggled.
    ShuffleModeChanged(bool),
    /// The playback speed changed.
    PlaybackSpeedChanged(f32),
}

/// Receives session notifications on the session's home thread.
pub trait SessionListener {
    /// Called once per notification, after the session state has changed.
    fn on_event(&self, event: &SessionEvent);
}

/// Native control API of a platform media session.
///
/// Implementations are single-threaded and only ever touched from their
/// host's home thread, so methods take `&self` and use interior mutability.
/// Ready-state and repeat mode are reported as native integer codes; the
/// bridge decodes them with [`ReadyState`] and [`RepeatMode`].
pub trait MediaSession {
    /// Whether media is actually playing right now.
    fn is_playing(&self) -> bool;
    /// Whether playback proceeds as soon as the session is ready.
    fn play_when_ready(&self) -> bool;
    /// Native ready-state code.
    fn playback_state(&self) -> i32;
    /// Native repeat-mode code.
    fn repeat_mode(&self) -> i32;
    /// Whether shuffle is enabled.
    fn shuffle_enabled(&self) -> bool;
    /// Playback speed, 1.0 being normal.
    fn playback_speed(&self) -> f32;
    /// Volume between 0.0 and 1.0.
    fn volume(&self) -> f32;
    /// Position in the current item, in milliseconds.
    fn current_position_ms(&self) -> i64;
    /// Duration of the current item in milliseconds, when known.
    fn duration_ms(&self) -> Option<i64>;
    /// Package namespace of the application owning the session.
    fn package_namespace(&self) -> String;
    /// Current item, if any.
    fn current_item(&self) -> Option<MediaItem>;
    /// Whether a capability is currently available.
    fn is_available(&self, capability: Capability) -> bool;

    /// Start or resume playback.
    fn play(&self);
    /// Pause playback.
    fn pause(&self);
    /// Stop playback.
    fn stop(&self);
    /// Seek to an absolute position in milliseconds.
    fn seek_to(&self, position_ms: i64);
    /// Skip to the next item.
    fn seek_to_next(&self);
    /// Go back to the previous item.
    fn seek_to_previous(&self);
    /// Set the native repeat-mode code.
    fn set_repeat_mode(&self, code: i32);
    /// Enable or disable shuffle.
    fn set_shuffle_enabled(&self, enabled: bool);
    /// Set the playback speed.
    fn set_playback_speed(&self, speed: f32);
    /// Set the volume.
    fn set_volume(&self, volume: f32);

    /// Register a listener for state-change notifications.
    fn add_listener(&self, listener: Box<dyn SessionListener>);

    /// Concrete access for hosts that know the implementation.
    fn as_any(&self) -> &dyn Any;
}
