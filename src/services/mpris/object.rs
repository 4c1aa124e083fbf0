use std::{collections::BTreeMap, sync::Arc};

use tracing::debug;

use super::{
    MprisError,
    control::CommandDispatcher,
    properties::PropertyTable,
    types::{PropertyValue, RootMethod},
};
use crate::services::session::SessionSupervisor;

/// Introspection data for the object at `/org/mpris/MediaPlayer2`.
pub const INTROSPECTION_XML: &str = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <interface name="org.freedesktop.DBus.Introspectable">
    <method name="Introspect">
      <arg name="xml_data" type="s" direction="out"/>
    </method>
  </interface>
  <interface name="org.freedesktop.DBus.Peer">
    <method name="Ping"/>
    <method name="GetMachineId">
      <arg name="machine_uuid" type="s" direction="out"/>
    </method>
  </interface>
  <interface name="org.freedesktop.DBus.Properties">
    <method name="Get">
      <arg name="interface_name" type="s" direction="in"/>
      <arg name="property_name" type="s" direction="in"/>
      <arg name="value" type="v" direction="out"/>
    </method>
    <method name="GetAll">
      <arg name="interface_name" type="s" direction="in"/>
      <arg name="properties" type="a{sv}" direction="out"/>
    </method>
    <method name="Set">
      <arg name="interface_name" type="s" direction="in"/>
      <arg name="property_name" type="s" direction="in"/>
      <arg name="value" type="v" direction="in"/>
    </method>
    <signal name="PropertiesChanged">
      <arg name="interface_name" type="s"/>
      <arg name="changed_properties" type="a{sv}"/>
      <arg name="invalidated_properties" type="as"/>
    </signal>
  </interface>
  <interface name="org.mpris.MediaPlayer2">
    <method name="Raise"/>
    <method name="Quit"/>
    <property name="CanQuit" type="b" access="read"/>
    <property name="Fullscreen" type="b" access="read"/>
    <property name="CanSetFullscreen" type="b" access="read"/>
    <property name="CanRaise" type="b" access="read"/>
    <property name="HasTrackList" type="b" access="read"/>
    <property name="Identity" type="s" access="read"/>
    <property name="SupportedUriSchemes" type="as" access="read"/>
    <property name="SupportedMimeTypes" type="as" access="read"/>
  </interface>
  <interface name="org.mpris.MediaPlayer2.Player">
    <method name="Next"/>
    <method name="Previous"/>
    <method name="Pause"/>
    <method name="PlayPause"/>
    <method name="Stop"/>
    <method name="Play"/>
    <method name="Seek">
      <arg name="Offset" type="x" direction="in"/>
    </method>
    <method name="SetPosition">
      <arg name="TrackId" type="o" direction="in"/>
      <arg name="Position" type="x" direction="in"/>
    </method>
    <method name="OpenUri">
      <arg name="Uri" type="s" direction="in"/>
    </method>
    <signal name="Seeked">
      <arg name="Position" type="x"/>
    </signal>
    <property name="PlaybackStatus" type="s" access="read"/>
    <property name="LoopStatus" type="s" access="read"/>
    <property name="Rate" type="d" access="read"/>
    <property name="Shuffle" type="b" access="read"/>
    <property name="Metadata" type="a{sv}" access="read"/>
    <property name="Volume" type="d" access="read"/>
    <property name="Position" type="x" access="read"/>
    <property name="MinimumRate" type="d" access="read"/>
    <property name="MaximumRate" type="d" access="read"/>
    <property name="CanGoNext" type="b" access="read"/>
    <property name="CanGoPrevious" type="b" access="read"/>
    <property name="CanPlay" type="b" access="read"/>
    <property name="CanPause" type="b" access="read"/>
    <property name="CanSeek" type="b" access="read"/>
    <property name="CanControl" type="b" access="read"/>
  </interface>
</node>
"#;

/// Transport method with its decoded arguments.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Next,
    Previous,
    Pause,
    PlayPause,
    Stop,
    Play,
    /// Relative seek in microseconds.
    Seek { offset_us: i64 },
    /// Absolute seek in microseconds.
    SetPosition { track_id: String, position_us: i64 },
    OpenUri { uri: String },
}

/// A decoded method call addressed to the player object.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum MethodCall {
    /// `Properties.Get`
    Get { interface: String, property: String },
    /// `Properties.GetAll`
    GetAll { interface: String },
    /// `Properties.Set`; the value is never used.
    Set { interface: String, property: String },
    /// `Introspectable.Introspect`
    Introspect,
    /// `Peer.Ping`
    Ping,
    /// `Peer.GetMachineId`
    GetMachineId,
    /// A method of `org.mpris.MediaPlayer2`.
    Root(RootMethod),
    /// A method of `org.mpris.MediaPlayer2.Player`.
    Player(PlayerCall),
}

/// Reply body for a dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// No return value.
    Empty,
    /// A single variant.
    Value(PropertyValue),
    /// An `a{sv}` map.
    Values(BTreeMap<String, PropertyValue>),
    /// A string.
    Text(String),
}

/// The object exported at `/org/mpris/MediaPlayer2`.
///
/// Decoding from and encoding to the wire happens in the bus layer;
/// [`PlayerObject::dispatch`] only sees decoded calls. Dispatch blocks on
/// session hand-offs, so async callers run it on a blocking thread.
pub struct PlayerObject {
    properties: PropertyTable,
    commands: CommandDispatcher,
}

impl PlayerObject {
    /// Build the object for sessions handed out by `supervisor`.
    pub fn new(supervisor: Arc<dyn SessionSupervisor>, identity: impl Into<String>) -> Self {
        Self {
            properties: PropertyTable::new(Arc::clone(&supervisor), identity),
            commands: CommandDispatcher::new(supervisor),
        }
    }

    /// Property reads.
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Transport commands.
    pub fn commands(&self) -> &CommandDispatcher {
        &self.commands
    }

    /// Serve one method call.
    ///
    /// # Errors
    /// Returns the protocol error to send back to the caller
    pub fn dispatch(&self, call: MethodCall) -> Result<Reply, MprisError> {
        debug!(?call, "Dispatching bus call");

        match call {
            MethodCall::Get {
                interface,
                property,
            } => self.properties.get(&interface, &property).map(Reply::Value),
            MethodCall::GetAll { interface } => {
                self.properties.get_all(&interface).map(Reply::Values)
            }
            MethodCall::Set {
                interface,
                property,
            } => self
                .properties
                .set(&interface, &property)
                .map(|()| Reply::Empty),
            MethodCall::Introspect => Ok(Reply::Text(INTROSPECTION_XML.to_string())),
            MethodCall::Ping => Ok(Reply::Empty),
            MethodCall::GetMachineId => Err(MprisError::NotSupported(
                "GetMachineId".to_string(),
            )),
            MethodCall::Root(RootMethod::Raise) => {
                self.commands.raise();
                Ok(Reply::Empty)
            }
            MethodCall::Root(RootMethod::Quit) => {
                self.commands.quit();
                Ok(Reply::Empty)
            }
            MethodCall::Player(call) => {
                self.dispatch_player(call);
                Ok(Reply::Empty)
            }
        }
    }

    fn dispatch_player(&self, call: PlayerCall) {
        match call {
            PlayerCall::Next => self.commands.next(),
            PlayerCall::Previous => self.commands.previous(),
            PlayerCall::Pause => self.commands.pause(),
            PlayerCall::PlayPause => self.commands.play_pause(),
            PlayerCall::Stop => self.commands.stop(),
            PlayerCall::Play => self.commands.play(),
            PlayerCall::Seek { offset_us } => self.commands.seek(offset_us),
            PlayerCall::SetPosition {
                track_id,
                position_us,
            } => self.commands.set_position(&track_id, position_us),
            PlayerCall::OpenUri { uri } => self.commands.open_uri(&uri),
        }
    }
}
