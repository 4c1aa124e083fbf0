use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, error, warn};

use super::{
    MprisError,
    identifiers::track_object_path,
    types::{
        LoopStatus, MAXIMUM_RATE, MINIMUM_RATE, MprisInterface, NO_TRACK_PATH, PlaybackStatus,
        PlayerProperty, PropertyValue, RootProperty,
    },
};
use crate::services::session::{
    Capability, MediaSession, ReadyState, RepeatMode, SessionSupervisor,
};

/// Serves `org.freedesktop.DBus.Properties` reads for both MPRIS interfaces.
///
/// Transport values are read from the current session on its home thread;
/// when there is no session, or the hand-off fails, the no-session defaults
/// are reported instead.
pub struct PropertyTable {
    supervisor: Arc<dyn SessionSupervisor>,
    identity: String,
}

impl PropertyTable {
    /// Create a table reporting `identity` as the player name.
    pub fn new(supervisor: Arc<dyn SessionSupervisor>, identity: impl Into<String>) -> Self {
        Self {
            supervisor,
            identity: identity.into(),
        }
    }

    /// Current value of one property.
    ///
    /// # Errors
    /// Returns `MprisError::UnknownProperty` for an unrecognised interface or
    /// property name, and `MprisError::UnexpectedSessionValue` if the session
    /// reported a code with no MPRIS equivalent
    pub fn get(&self, interface: &str, property: &str) -> Result<PropertyValue, MprisError> {
        let unknown = || MprisError::UnknownProperty {
            interface: interface.to_string(),
            property: property.to_string(),
        };

        match MprisInterface::from_name(interface).ok_or_else(unknown)? {
            MprisInterface::Root => {
                let property = RootProperty::from_name(property).ok_or_else(unknown)?;
                Ok(self.root_value(property))
            }
            MprisInterface::Player => {
                let property = PlayerProperty::from_name(property).ok_or_else(unknown)?;
                self.player_value(property)
            }
        }
    }

    /// Every reported property of an interface, keyed by name.
    ///
    /// An unrecognised interface yields an empty map.
    ///
    /// # Errors
    /// Returns `MprisError::UnexpectedSessionValue` if the session reported a
    /// code with no MPRIS equivalent
    pub fn get_all(&self, interface: &str) -> Result<BTreeMap<String, PropertyValue>, MprisError> {
        let values = match MprisInterface::from_name(interface) {
            Some(MprisInterface::Root) => RootProperty::ALL
                .into_iter()
                .map(|property| (property.name().to_string(), self.root_value(property)))
                .collect(),
            Some(MprisInterface::Player) => self
                .player_values(&PlayerProperty::GET_ALL)?
                .into_iter()
                .map(|(property, value)| (property.name().to_string(), value))
                .collect(),
            None => {
                debug!(interface, "GetAll on unknown interface");
                BTreeMap::new()
            }
        };

        Ok(values)
    }

    /// Writes through the properties interface are always refused.
    ///
    /// # Errors
    /// Always returns `MprisError::PropertyReadOnly`
    pub fn set(&self, interface: &str, property: &str) -> Result<(), MprisError> {
        debug!(interface, property, "Refusing property write");
        Err(MprisError::PropertyReadOnly {
            interface: interface.to_string(),
            property: property.to_string(),
        })
    }

    /// Value of an identity property.
    pub fn root_value(&self, property: RootProperty) -> PropertyValue {
        match property {
            RootProperty::CanQuit
            | RootProperty::Fullscreen
            | RootProperty::CanSetFullscreen
            | RootProperty::CanRaise
            | RootProperty::HasTrackList => PropertyValue::Bool(false),
            RootProperty::Identity => PropertyValue::Str(self.identity.clone()),
            RootProperty::SupportedUriSchemes | RootProperty::SupportedMimeTypes => {
                PropertyValue::StrList(Vec::new())
            }
        }
    }

    /// Value of one transport property.
    ///
    /// # Errors
    /// Returns `MprisError::UnexpectedSessionValue` if the session reported a
    /// code with no MPRIS equivalent
    pub fn player_value(&self, property: PlayerProperty) -> Result<PropertyValue, MprisError> {
        let mut values = self.player_values(&[property])?;
        Ok(values
            .pop()
            .map_or_else(|| default_value(property), |(_, value)| value))
    }

    /// Values of several transport properties, read in a single hand-off so
    /// they describe one consistent session state.
    ///
    /// # Errors
    /// Returns `MprisError::UnexpectedSessionValue` if the session reported a
    /// code with no MPRIS equivalent
    pub fn player_values(
        &self,
        properties: &[PlayerProperty],
    ) -> Result<Vec<(PlayerProperty, PropertyValue)>, MprisError> {
        let Some(host) = self.supervisor.current_session() else {
            return read_player_values(None, properties);
        };

        let requested = properties.to_vec();
        match host.call(move |session| read_player_values(Some(session), &requested)) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Falling back to default property values");
                read_player_values(None, properties)
            }
        }
    }
}

/// Read transport properties from `session`, or report the no-session
/// defaults when it is `None`. Runs on the session's home thread.
///
/// # Errors
/// Returns `MprisError::UnexpectedSessionValue` if the session reported a
/// code with no MPRIS equivalent
pub fn read_player_values(
    session: Option<&dyn MediaSession>,
    properties: &[PlayerProperty],
) -> Result<Vec<(PlayerProperty, PropertyValue)>, MprisError> {
    properties
        .iter()
        .map(|&property| {
            let value = match session {
                Some(session) => read_player_value(session, property)?,
                None => default_value(property),
            };
            Ok((property, value))
        })
        .collect()
}

fn read_player_value(
    session: &dyn MediaSession,
    property: PlayerProperty,
) -> Result<PropertyValue, MprisError> {
    let value = match property {
        PlayerProperty::PlaybackStatus => playback_status(session)?.as_str().into(),
        PlayerProperty::LoopStatus => loop_status(session)?.as_str().into(),
        PlayerProperty::Rate => f64::from(session.playback_speed()).into(),
        PlayerProperty::Shuffle => session.shuffle_enabled().into(),
        PlayerProperty::Metadata => metadata(session),
        PlayerProperty::Volume => f64::from(session.volume()).into(),
        PlayerProperty::Position => session.current_position_ms().saturating_mul(1000).into(),
        PlayerProperty::MinimumRate => MINIMUM_RATE.into(),
        PlayerProperty::MaximumRate => MAXIMUM_RATE.into(),
        PlayerProperty::CanGoNext => session.is_available(Capability::GoNext).into(),
        PlayerProperty::CanGoPrevious => session.is_available(Capability::GoPrevious).into(),
        PlayerProperty::CanPlay => session.is_available(Capability::Play).into(),
        PlayerProperty::CanPause => session.is_available(Capability::Pause).into(),
        PlayerProperty::CanSeek => session.is_available(Capability::Seek).into(),
        PlayerProperty::CanControl => session.is_available(Capability::Control).into(),
    };

    Ok(value)
}

/// Value reported when no session is bound.
pub fn default_value(property: PlayerProperty) -> PropertyValue {
    match property {
        PlayerProperty::PlaybackStatus => PlaybackStatus::Stopped.as_str().into(),
        PlayerProperty::LoopStatus => LoopStatus::None.as_str().into(),
        PlayerProperty::Rate => PropertyValue::Double(1.0),
        PlayerProperty::Shuffle => PropertyValue::Bool(false),
        PlayerProperty::Metadata => no_track_metadata(),
        PlayerProperty::Volume => PropertyValue::Double(0.0),
        PlayerProperty::Position => PropertyValue::Int64(0),
        PlayerProperty::MinimumRate => PropertyValue::Double(MINIMUM_RATE),
        PlayerProperty::MaximumRate => PropertyValue::Double(MAXIMUM_RATE),
        PlayerProperty::CanGoNext
        | PlayerProperty::CanGoPrevious
        | PlayerProperty::CanPlay
        | PlayerProperty::CanPause
        | PlayerProperty::CanSeek
        | PlayerProperty::CanControl => PropertyValue::Bool(false),
    }
}

fn decode_ready_state(code: i32) -> Result<ReadyState, MprisError> {
    ReadyState::try_from(code).map_err(|code| {
        error!(code, "Session reported unknown ready state");
        MprisError::UnexpectedSessionValue {
            what: "ready state",
            code,
        }
    })
}

fn decode_repeat_mode(code: i32) -> Result<RepeatMode, MprisError> {
    RepeatMode::try_from(code).map_err(|code| {
        error!(code, "Session reported unknown repeat mode");
        MprisError::UnexpectedSessionValue {
            what: "repeat mode",
            code,
        }
    })
}

/// Playback status derived from the session's flags.
///
/// # Errors
/// Returns `MprisError::UnexpectedSessionValue` for an unknown ready-state
pub fn playback_status(session: &dyn MediaSession) -> Result<PlaybackStatus, MprisError> {
    let state = decode_ready_state(session.playback_state())?;

    let buffering_to_play = state == ReadyState::Buffering && session.play_when_ready();
    if session.is_playing() || buffering_to_play {
        return Ok(PlaybackStatus::Playing);
    }

    Ok(match state {
        ReadyState::Idle | ReadyState::Ended => PlaybackStatus::Stopped,
        ReadyState::Buffering | ReadyState::Ready => PlaybackStatus::Paused,
    })
}

/// Loop status matching the session's repeat mode.
///
/// # Errors
/// Returns `MprisError::UnexpectedSessionValue` for an unknown repeat mode
pub fn loop_status(session: &dyn MediaSession) -> Result<LoopStatus, MprisError> {
    Ok(match decode_repeat_mode(session.repeat_mode())? {
        RepeatMode::Off => LoopStatus::None,
        RepeatMode::One => LoopStatus::Track,
        RepeatMode::All => LoopStatus::Playlist,
    })
}

/// Repeat mode a loop status asks for.
pub fn repeat_mode_for(status: LoopStatus) -> RepeatMode {
    match status {
        LoopStatus::None => RepeatMode::Off,
        LoopStatus::Track => RepeatMode::One,
        LoopStatus::Playlist => RepeatMode::All,
    }
}

fn no_track_metadata() -> PropertyValue {
    let mut map = BTreeMap::new();
    map.insert(
        "mpris:trackid".to_string(),
        PropertyValue::ObjectPath(NO_TRACK_PATH.to_string()),
    );
    PropertyValue::Map(map)
}

fn metadata(session: &dyn MediaSession) -> PropertyValue {
    let Some(item) = session.current_item() else {
        return no_track_metadata();
    };

    let namespace = session.package_namespace();
    let title = item.title.clone().unwrap_or_default();
    let track = track_object_path(&namespace, &title, &item.media_id);

    let mut map = BTreeMap::new();
    map.insert("mpris:trackid".to_string(), PropertyValue::ObjectPath(track));

    if let Some(title) = item.title {
        map.insert("xesam:title".to_string(), PropertyValue::Str(title));
    }
    if let Some(artist) = item.artist {
        map.insert("xesam:artist".to_string(), PropertyValue::StrList(vec![artist]));
    }
    if let Some(album) = item.album {
        map.insert("xesam:album".to_string(), PropertyValue::Str(album));
    }
    if let Some(album_artist) = item.album_artist {
        map.insert(
            "xesam:albumArtist".to_string(),
            PropertyValue::StrList(vec![album_artist]),
        );
    }
    if let Some(duration_ms) = session.duration_ms() {
        map.insert(
            "mpris:length".to_string(),
            PropertyValue::Int64(duration_ms.saturating_mul(1000)),
        );
    }
    if let Some(art_uri) = item.art_uri {
        map.insert("mpris:artUrl".to_string(), PropertyValue::Str(art_uri));
    }

    PropertyValue::Map(map)
}
