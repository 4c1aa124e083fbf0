use std::collections::BTreeMap;
use std::fmt;

/// Identity interface name.
pub const ROOT_INTERFACE: &str = "org.mpris.MediaPlayer2";

/// Transport interface name.
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Standard properties interface name.
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Standard introspection interface name.
pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";

/// Standard peer interface name.
pub const PEER_INTERFACE: &str = "org.freedesktop.DBus.Peer";

/// Object path the player is exported at.
pub const PLAYER_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Track id reported when nothing is playing.
pub const NO_TRACK_PATH: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

/// Slowest playback rate the adapter accepts.
pub const MINIMUM_RATE: f64 = 0.25;

/// Fastest playback rate the adapter accepts.
pub const MAXIMUM_RATE: f64 = 2.0;

/// The two MPRIS property interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MprisInterface {
    /// `org.mpris.MediaPlayer2`
    Root,
    /// `org.mpris.MediaPlayer2.Player`
    Player,
}

impl MprisInterface {
    /// Parse a bus interface name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ROOT_INTERFACE => Some(Self::Root),
            PLAYER_INTERFACE => Some(Self::Player),
            _ => None,
        }
    }

    /// Bus interface name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Root => ROOT_INTERFACE,
            Self::Player => PLAYER_INTERFACE,
        }
    }
}

/// Properties of the identity interface.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootProperty {
    CanQuit,
    Fullscreen,
    CanSetFullscreen,
    CanRaise,
    HasTrackList,
    Identity,
    SupportedUriSchemes,
    SupportedMimeTypes,
}

impl RootProperty {
    /// Every identity property, in reporting order.
    pub const ALL: [RootProperty; 8] = [
        Self::CanQuit,
        Self::Fullscreen,
        Self::CanSetFullscreen,
        Self::CanRaise,
        Self::HasTrackList,
        Self::Identity,
        Self::SupportedUriSchemes,
        Self::SupportedMimeTypes,
    ];

    /// Parse a property name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }

    /// Property name on the bus.
    pub fn name(self) -> &'static str {
        match self {
            Self::CanQuit => "CanQuit",
            Self::Fullscreen => "Fullscreen",
            Self::CanSetFullscreen => "CanSetFullscreen",
            Self::CanRaise => "CanRaise",
            Self::HasTrackList => "HasTrackList",
            Self::Identity => "Identity",
            Self::SupportedUriSchemes => "SupportedUriSchemes",
            Self::SupportedMimeTypes => "SupportedMimeTypes",
        }
    }
}

/// Properties of the transport interface.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerProperty {
    PlaybackStatus,
    LoopStatus,
    Rate,
    Shuffle,
    Metadata,
    Volume,
    Position,
    MinimumRate,
    MaximumRate,
    CanGoNext,
    CanGoPrevious,
    CanPlay,
    CanPause,
    CanSeek,
    CanControl,
}

impl PlayerProperty {
    /// Every transport property.
    pub const ALL: [PlayerProperty; 15] = [
        Self::PlaybackStatus,
        Self::LoopStatus,
        Self::Rate,
        Self::Shuffle,
        Self::Metadata,
        Self::Volume,
        Self::Position,
        Self::MinimumRate,
        Self::MaximumRate,
        Self::CanGoNext,
        Self::CanGoPrevious,
        Self::CanPlay,
        Self::CanPause,
        Self::CanSeek,
        Self::CanControl,
    ];

    /// Properties reported by `GetAll`. `Position` is left out: it changes
    /// continuously and peers fetch it on demand.
    pub const GET_ALL: [PlayerProperty; 14] = [
        Self::PlaybackStatus,
        Self::LoopStatus,
        Self::Rate,
        Self::Shuffle,
        Self::Metadata,
        Self::Volume,
        Self::MinimumRate,
        Self::MaximumRate,
        Self::CanGoNext,
        Self::CanGoPrevious,
        Self::CanPlay,
        Self::CanPause,
        Self::CanSeek,
        Self::CanControl,
    ];

    /// Capability properties re-announced when the session's available
    /// commands change.
    pub const CAPABILITIES: [PlayerProperty; 6] = [
        Self::CanGoNext,
        Self::CanGoPrevious,
        Self::CanPlay,
        Self::CanPause,
        Self::CanSeek,
        Self::CanControl,
    ];

    /// Parse a property name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }

    /// Property name on the bus.
    pub fn name(self) -> &'static str {
        match self {
            Self::PlaybackStatus => "PlaybackStatus",
            Self::LoopStatus => "LoopStatus",
            Self::Rate => "Rate",
            Self::Shuffle => "Shuffle",
            Self::Metadata => "Metadata",
            Self::Volume => "Volume",
            Self::Position => "Position",
            Self::MinimumRate => "MinimumRate",
            Self::MaximumRate => "MaximumRate",
            Self::CanGoNext => "CanGoNext",
            Self::CanGoPrevious => "CanGoPrevious",
            Self::CanPlay => "CanPlay",
            Self::CanPause => "CanPause",
            Self::CanSeek => "CanSeek",
            Self::CanControl => "CanControl",
        }
    }
}

/// Methods of the identity interface.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMethod {
    Raise,
    Quit,
}

impl RootMethod {
    /// Parse a method name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Raise" => Some(Self::Raise),
            "Quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Methods of the transport interface, without their arguments.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMethod {
    Next,
    Previous,
    Pause,
    PlayPause,
    Stop,
    Play,
    Seek,
    SetPosition,
    OpenUri,
}

impl PlayerMethod {
    /// Parse a method name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Next" => Some(Self::Next),
            "Previous" => Some(Self::Previous),
            "Pause" => Some(Self::Pause),
            "PlayPause" => Some(Self::PlayPause),
            "Stop" => Some(Self::Stop),
            "Play" => Some(Self::Play),
            "Seek" => Some(Self::Seek),
            "SetPosition" => Some(Self::SetPosition),
            "OpenUri" => Some(Self::OpenUri),
            _ => None,
        }
    }
}

/// Value of the `PlaybackStatus` property.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `LoopStatus` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Play through once.
    None,
    /// Repeat the current track.
    Track,
    /// Repeat the whole playlist.
    Playlist,
}

impl LoopStatus {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Track => "Track",
            Self::Playlist => "Playlist",
        }
    }

    /// Parse the wire representation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "None" => Some(Self::None),
            "Track" => Some(Self::Track),
            "Playlist" => Some(Self::Playlist),
            _ => None,
        }
    }
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value, independent of the bus encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `b`
    Bool(bool),
    /// `d`
    Double(f64),
    /// `x`
    Int64(i64),
    /// `s`
    Str(String),
    /// `as`
    StrList(Vec<String>),
    /// `o`
    ObjectPath(String),
    /// `a{sv}`
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) | Self::ObjectPath(value) => Some(value),
            _ => None,
        }
    }

    /// The map, if this is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A signal queued for the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusSignal {
    /// `org.freedesktop.DBus.Properties.PropertiesChanged` on the transport
    /// interface, with an empty invalidated list.
    PropertiesChanged {
        /// Changed properties with their freshly computed values.
        changed: Vec<(PlayerProperty, PropertyValue)>,
    },
    /// `org.mpris.MediaPlayer2.Player.Seeked`.
    Seeked {
        /// New position in microseconds.
        position_us: i64,
    },
}
