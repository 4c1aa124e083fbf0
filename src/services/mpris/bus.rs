use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Write as _,
    sync::Arc,
};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info, instrument, trace, warn};
use zbus::{
    Connection, Message, MessageStream, fdo,
    message::{Flags, Header, Type as MessageType},
    names::BusName,
    zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value},
};

use super::{
    MprisError,
    events::SignalReceiver,
    object::{MethodCall, PlayerCall, PlayerObject, Reply},
    types::{
        BusSignal, INTROSPECTABLE_INTERFACE, PEER_INTERFACE, PLAYER_INTERFACE,
        PLAYER_OBJECT_PATH, PROPERTIES_INTERFACE, PlayerMethod, PropertyValue, ROOT_INTERFACE,
        RootMethod,
    },
};

/// Message-bus operations the adapter needs.
///
/// The production implementation is [`ZbusConnection`]; tests substitute a
/// recording implementation.
#[async_trait]
pub trait BusConnection: Send + Sync {
    /// Acquire a well-known name.
    async fn request_name(&self, name: &str) -> Result<(), MprisError>;

    /// Release a well-known name. Releasing a name not owned is a no-op.
    async fn release_name(&self, name: &str) -> Result<(), MprisError>;

    /// Start serving `object` at `path`.
    async fn export(&self, path: &str, object: Arc<PlayerObject>) -> Result<(), MprisError>;

    /// Stop serving whatever is at `path`. Unexporting nothing is a no-op.
    async fn unexport(&self, path: &str) -> Result<(), MprisError>;

    /// Broadcast a signal from `path`.
    async fn emit(&self, path: &str, signal: &BusSignal) -> Result<(), MprisError>;
}

type Exports = Arc<RwLock<HashMap<String, Arc<PlayerObject>>>>;

/// [`BusConnection`] over a zbus connection.
///
/// Incoming method calls are read off the connection's message stream and
/// answered directly, so property semantics are fully under the adapter's
/// control. Calls are served one at a time, in arrival order.
pub struct ZbusConnection {
    connection: Connection,
    exports: Exports,
    router: JoinHandle<()>,
}

impl ZbusConnection {
    /// Connect to the session bus.
    ///
    /// # Errors
    /// Returns `MprisError::Bus` if the session bus is unreachable
    pub async fn session() -> Result<Self, MprisError> {
        let connection = Connection::session().await?;
        Ok(Self::new(connection))
    }

    /// Serve exported objects on an existing connection. Must be called
    /// inside a tokio runtime.
    pub fn new(connection: Connection) -> Self {
        let exports: Exports = Arc::new(RwLock::new(HashMap::new()));
        let router = tokio::spawn(route_calls(connection.clone(), Arc::clone(&exports)));

        Self {
            connection,
            exports,
            router,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl Drop for ZbusConnection {
    fn drop(&mut self) {
        self.router.abort();
    }
}

#[async_trait]
impl BusConnection for ZbusConnection {
    #[instrument(skip(self))]
    async fn request_name(&self, name: &str) -> Result<(), MprisError> {
        self.connection.request_name(name).await?;
        info!("Acquired bus name");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn release_name(&self, name: &str) -> Result<(), MprisError> {
        let released = self.connection.release_name(name).await?;
        if released {
            info!("Released bus name");
        } else {
            debug!("Bus name was not owned");
        }
        Ok(())
    }

    async fn export(&self, path: &str, object: Arc<PlayerObject>) -> Result<(), MprisError> {
        ObjectPath::try_from(path)?;
        self.exports.write().await.insert(path.to_string(), object);
        debug!(path, "Exported object");
        Ok(())
    }

    async fn unexport(&self, path: &str) -> Result<(), MprisError> {
        if self.exports.write().await.remove(path).is_some() {
            debug!(path, "Unexported object");
        }
        Ok(())
    }

    async fn emit(&self, path: &str, signal: &BusSignal) -> Result<(), MprisError> {
        match signal {
            BusSignal::PropertiesChanged { changed } => {
                let changed = changed
                    .iter()
                    .map(|(property, value)| Ok((property.name().to_string(), to_value(value)?)))
                    .collect::<Result<HashMap<_, _>, MprisError>>()?;
                let invalidated: Vec<String> = Vec::new();

                self.connection
                    .emit_signal(
                        None::<BusName<'_>>,
                        path,
                        PROPERTIES_INTERFACE,
                        "PropertiesChanged",
                        &(PLAYER_INTERFACE, changed, invalidated),
                    )
                    .await?;
            }
            BusSignal::Seeked { position_us } => {
                self.connection
                    .emit_signal(None::<BusName<'_>>, path, PLAYER_INTERFACE, "Seeked", position_us)
                    .await?;
            }
        }

        Ok(())
    }
}

async fn route_calls(connection: Connection, exports: Exports) {
    let mut messages = MessageStream::from(&connection);

    while let Some(message) = messages.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to read bus message");
                continue;
            }
        };

        let header = message.header();
        if header.message_type() != MessageType::MethodCall {
            continue;
        }
        let Some(path) = header.path().map(|path| path.as_str().to_string()) else {
            continue;
        };

        let result = serve_call(&exports, &path, &header, &message).await;
        if !expects_reply(&header) {
            trace!(path, "Caller expects no reply");
            continue;
        }
        if let Err(e) = send_reply(&connection, &header, result).await {
            warn!(error = %e, path, "Failed to send reply");
        }
    }

    debug!("Bus message stream ended");
}

async fn serve_call(
    exports: &Exports,
    path: &str,
    header: &Header<'_>,
    message: &Message,
) -> Result<Reply, MprisError> {
    let call = decode_call(header, message)?;
    if call == MethodCall::Ping {
        return Ok(Reply::Empty);
    }

    let object = {
        let exports = exports.read().await;
        match exports.get(path) {
            Some(object) => Arc::clone(object),
            None => {
                let children = child_nodes(path, exports.keys().map(String::as_str));
                return match call {
                    MethodCall::Introspect if !children.is_empty() => {
                        Ok(Reply::Text(node_xml(&children)))
                    }
                    _ => Err(MprisError::UnknownObject(path.to_string())),
                };
            }
        }
    };

    tokio::task::spawn_blocking(move || object.dispatch(call))
        .await
        .map_err(|e| MprisError::Dispatch(e.to_string()))?
}

async fn send_reply(
    connection: &Connection,
    header: &Header<'_>,
    result: Result<Reply, MprisError>,
) -> Result<(), MprisError> {
    match result {
        Ok(Reply::Empty) => connection.reply(header, &()).await.map(|_| ())?,
        Ok(Reply::Value(value)) => connection.reply(header, &to_value(&value)?).await.map(|_| ())?,
        Ok(Reply::Values(values)) => connection
            .reply(header, &to_dict(&values)?)
            .await
            .map(|_| ())?,
        Ok(Reply::Text(text)) => connection.reply(header, &text).await.map(|_| ())?,
        Err(e) => {
            debug!(error = %e, "Replying with error");
            connection
                .reply_dbus_error(header, fdo::Error::from(e))
                .await
                .map(|_| ())?;
        }
    }

    Ok(())
}

/// Whether the caller of a method call wants a reply.
pub fn expects_reply(header: &Header<'_>) -> bool {
    !header.primary().flags().contains(Flags::NoReplyExpected)
}

/// First path segments below `path` that lead to an exported object.
///
/// Empty when nothing is exported underneath `path`.
pub fn child_nodes<'a>(path: &str, exported: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let prefix = if path == "/" {
        "/".to_string()
    } else {
        format!("{path}/")
    };

    exported
        .into_iter()
        .filter_map(|object| object.strip_prefix(prefix.as_str()))
        .filter_map(|rest| rest.split('/').next())
        .filter(|child| !child.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Introspection data for an intermediate node listing only its children.
pub fn node_xml(children: &[String]) -> String {
    let mut xml = String::from(
        "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n \"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n<node>\n",
    );
    for child in children {
        let _ = writeln!(xml, "  <node name=\"{child}\"/>");
    }
    xml.push_str("</node>\n");
    xml
}

fn invalid_args(error: zbus::Error) -> MprisError {
    MprisError::InvalidArgs(error.to_string())
}

/// Decode the target and arguments of a method call.
///
/// # Errors
/// Returns `MprisError::UnknownMethod` for members the object does not
/// implement and `MprisError::InvalidArgs` when the body does not match
pub fn decode_call(header: &Header<'_>, message: &Message) -> Result<MethodCall, MprisError> {
    let interface = header.interface().map(|i| i.as_str()).unwrap_or_default();
    let member = header.member().map(|m| m.as_str()).unwrap_or_default();
    let body = message.body();

    let unknown = || MprisError::UnknownMethod {
        interface: interface.to_string(),
        member: member.to_string(),
    };

    let call = match (interface, member) {
        (PROPERTIES_INTERFACE, "Get") => {
            let (interface, property): (String, String) =
                body.deserialize().map_err(invalid_args)?;
            MethodCall::Get {
                interface,
                property,
            }
        }
        (PROPERTIES_INTERFACE, "GetAll") => {
            let interface: String = body.deserialize().map_err(invalid_args)?;
            MethodCall::GetAll { interface }
        }
        (PROPERTIES_INTERFACE, "Set") => {
            let (interface, property, _value): (String, String, OwnedValue) =
                body.deserialize().map_err(invalid_args)?;
            MethodCall::Set {
                interface,
                property,
            }
        }
        (INTROSPECTABLE_INTERFACE, "Introspect") => MethodCall::Introspect,
        (PEER_INTERFACE, "Ping") => MethodCall::Ping,
        (PEER_INTERFACE, "GetMachineId") => MethodCall::GetMachineId,
        (ROOT_INTERFACE, member) => MethodCall::Root(RootMethod::from_name(member).ok_or_else(unknown)?),
        (PLAYER_INTERFACE, member) => {
            let method = PlayerMethod::from_name(member).ok_or_else(unknown)?;
            MethodCall::Player(decode_player_call(method, message)?)
        }
        _ => return Err(unknown()),
    };

    Ok(call)
}

fn decode_player_call(method: PlayerMethod, message: &Message) -> Result<PlayerCall, MprisError> {
    let body = message.body();

    let call = match method {
        PlayerMethod::Next => PlayerCall::Next,
        PlayerMethod::Previous => PlayerCall::Previous,
        PlayerMethod::Pause => PlayerCall::Pause,
        PlayerMethod::PlayPause => PlayerCall::PlayPause,
        PlayerMethod::Stop => PlayerCall::Stop,
        PlayerMethod::Play => PlayerCall::Play,
        PlayerMethod::Seek => PlayerCall::Seek {
            offset_us: body.deserialize().map_err(invalid_args)?,
        },
        PlayerMethod::SetPosition => {
            let (track_id, position_us): (OwnedObjectPath, i64) =
                body.deserialize().map_err(invalid_args)?;
            PlayerCall::SetPosition {
                track_id: track_id.as_str().to_string(),
                position_us,
            }
        }
        PlayerMethod::OpenUri => PlayerCall::OpenUri {
            uri: body.deserialize().map_err(invalid_args)?,
        },
    };

    Ok(call)
}

/// Encode a property value as a bus variant.
///
/// # Errors
/// Returns `MprisError::InvalidValue` if an object path is malformed
pub fn to_value(value: &PropertyValue) -> Result<Value<'static>, MprisError> {
    let value = match value {
        PropertyValue::Bool(b) => Value::from(*b),
        PropertyValue::Double(d) => Value::from(*d),
        PropertyValue::Int64(i) => Value::from(*i),
        PropertyValue::Str(s) => Value::from(s.clone()),
        PropertyValue::StrList(list) => Value::from(list.clone()),
        PropertyValue::ObjectPath(path) => Value::from(ObjectPath::try_from(path.clone())?),
        PropertyValue::Map(map) => Value::from(to_dict(map)?),
    };

    Ok(value)
}

/// Encode a property map as `a{sv}`.
///
/// # Errors
/// Returns `MprisError::InvalidValue` if an object path is malformed
pub fn to_dict(
    values: &BTreeMap<String, PropertyValue>,
) -> Result<HashMap<String, Value<'static>>, MprisError> {
    values
        .iter()
        .map(|(key, value)| Ok((key.clone(), to_value(value)?)))
        .collect()
}

/// Drain the outbound signal queue onto the bus until it closes.
///
/// Transmission failures are logged and the signal is dropped.
pub async fn forward_signals(mut signals: SignalReceiver, connection: Arc<dyn BusConnection>) {
    while let Some(signal) = signals.recv().await {
        if let Err(e) = connection.emit(PLAYER_OBJECT_PATH, &signal).await {
            warn!(error = %e, ?signal, "Failed to emit signal");
        }
    }

    debug!("Signal queue closed");
}
