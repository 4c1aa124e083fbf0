use std::{collections::HashMap, pin::pin, sync::Arc};

use futures::{Stream, StreamExt};
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

use super::{
    MprisError,
    bus::BusConnection,
    control::CommandDispatcher,
    events::{EventBridge, SignalReceiver, SignalSender},
    identifiers::BusIdentity,
    object::PlayerObject,
    properties::PropertyTable,
    types::{BusSignal, PLAYER_OBJECT_PATH, PlayerProperty},
};
use crate::{
    config::Config,
    services::session::{SessionHost, SessionSupervisor, WeakSessionHost},
};

/// MPRIS presence of one media session on the bus.
///
/// Owns the bus identity and the exported player object. Registration is
/// explicit: nothing is visible on the bus between construction and
/// [`MprisAdapter::sync`], or after [`MprisAdapter::unsync`].
#[derive(Clone)]
pub struct MprisAdapter {
    identity: BusIdentity,
    bus_name: String,
    object: Arc<PlayerObject>,
    supervisor: Arc<dyn SessionSupervisor>,
    connection: Arc<dyn BusConnection>,
    signals: SignalSender,
    registered: Arc<Mutex<bool>>,
}

impl MprisAdapter {
    /// Create an adapter with a fresh bus identity.
    ///
    /// Returns the receiving end of the outbound signal queue; drain it with
    /// [`forward_signals`](super::forward_signals).
    pub fn new(
        config: &Config,
        supervisor: Arc<dyn SessionSupervisor>,
        connection: Arc<dyn BusConnection>,
    ) -> (Self, SignalReceiver) {
        Self::with_identity(config, BusIdentity::generate(), supervisor, connection)
    }

    /// Create an adapter with a known bus identity.
    pub fn with_identity(
        config: &Config,
        identity: BusIdentity,
        supervisor: Arc<dyn SessionSupervisor>,
        connection: Arc<dyn BusConnection>,
    ) -> (Self, SignalReceiver) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let bus_name = identity.bus_name(&config.bus.name_prefix);
        let object = Arc::new(PlayerObject::new(
            Arc::clone(&supervisor),
            config.player.identity.clone(),
        ));

        debug!(bus_name, "Created MPRIS adapter");

        let adapter = Self {
            identity,
            bus_name,
            object,
            supervisor,
            connection,
            signals,
            registered: Arc::new(Mutex::new(false)),
        };

        (adapter, receiver)
    }

    /// Well-known name requested on [`MprisAdapter::sync`].
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Bus identity generated at construction.
    pub fn identity(&self) -> &BusIdentity {
        &self.identity
    }

    /// The exported object.
    pub fn object(&self) -> &Arc<PlayerObject> {
        &self.object
    }

    /// Property reads, as served to peers.
    pub fn properties(&self) -> &PropertyTable {
        self.object.properties()
    }

    /// Transport commands, including the setters peers cannot reach
    /// through the properties interface.
    pub fn commands(&self) -> &CommandDispatcher {
        self.object.commands()
    }

    /// Whether the name is held and the object exported.
    pub async fn is_registered(&self) -> bool {
        *self.registered.lock().await
    }

    /// Request the bus name, then export the player object. Does nothing
    /// when already registered.
    ///
    /// # Errors
    /// Returns `MprisError::Bus` if the name cannot be acquired or the
    /// object cannot be exported; a name acquired before a failed export is
    /// released again
    #[instrument(skip(self), fields(bus_name = %self.bus_name))]
    pub async fn sync(&self) -> Result<(), MprisError> {
        let mut registered = self.registered.lock().await;
        if *registered {
            debug!("Already registered");
            return Ok(());
        }

        self.connection.request_name(&self.bus_name).await?;

        let object = Arc::clone(&self.object);
        if let Err(e) = self.connection.export(PLAYER_OBJECT_PATH, object).await {
            warn!(error = %e, "Export failed, releasing bus name");
            if let Err(release) = self.connection.release_name(&self.bus_name).await {
                warn!(error = %release, "Failed to release bus name");
            }
            return Err(e);
        }

        *registered = true;
        info!("MPRIS player registered");
        Ok(())
    }

    /// Unexport the player object, then release the bus name.
    ///
    /// # Errors
    /// Returns `MprisError::Bus` if the connection fails either step
    #[instrument(skip(self), fields(bus_name = %self.bus_name))]
    pub async fn unsync(&self) -> Result<(), MprisError> {
        let mut registered = self.registered.lock().await;
        if !*registered {
            debug!("Not registered, delegating to connection");
        }

        self.connection.unexport(PLAYER_OBJECT_PATH).await?;
        self.connection.release_name(&self.bus_name).await?;

        *registered = false;
        info!("MPRIS player unregistered");
        Ok(())
    }

    /// Announce the current metadata, for when the session behind the
    /// adapter was reset or replaced. Registration is left alone.
    pub async fn on_reset(&self) {
        let object = Arc::clone(&self.object);
        let values = tokio::task::spawn_blocking(move || {
            object.properties().player_values(&[PlayerProperty::Metadata])
        })
        .await;

        match values {
            Ok(Ok(changed)) => {
                if self
                    .signals
                    .send(BusSignal::PropertiesChanged { changed })
                    .is_err()
                {
                    debug!("Signal queue closed, dropping reset");
                }
            }
            Ok(Err(e)) => warn!(error = %e, "Cannot announce session reset"),
            Err(e) => warn!(error = %e, "Reset task failed"),
        }
    }

    /// Register the event bridge on a session. Blocks on the hand-off.
    ///
    /// # Errors
    /// Returns `MprisError::Handoff` if the session cannot be reached
    pub fn attach_session(&self, host: &SessionHost) -> Result<(), MprisError> {
        let bridge = host.downgrade();
        let supervisor = Arc::clone(&self.supervisor);
        let signals = self.signals.clone();

        host.call(move |session| {
            session.add_listener(Box::new(EventBridge::new(bridge, supervisor, signals)));
        })?;

        debug!(host = host.id(), "Attached event bridge");
        Ok(())
    }

    /// Track the sessions a supervisor binds.
    ///
    /// Every newly bound session gets the event bridge attached once, and
    /// each change of binding is announced with [`MprisAdapter::on_reset`].
    pub fn follow<S>(&self, sessions: S) -> JoinHandle<()>
    where
        S: Stream<Item = Option<SessionHost>> + Send + 'static,
    {
        let adapter = self.clone();

        tokio::spawn(async move {
            let mut sessions = pin!(sessions);
            let mut current: Option<u64> = None;
            let mut attached = AttachedSessions::default();

            while let Some(session) = sessions.next().await {
                let id = session.as_ref().map(SessionHost::id);
                if id == current {
                    continue;
                }
                current = id;
                attached.prune();

                if let Some(host) = session {
                    if attached.insert(&host) {
                        let attaching = adapter.clone();
                        let result =
                            tokio::task::spawn_blocking(move || attaching.attach_session(&host))
                                .await;
                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => warn!(error = %e, "Cannot attach to session"),
                            Err(e) => warn!(error = %e, "Attach task failed"),
                        }
                    }
                }

                adapter.on_reset().await;
            }

            debug!("Session stream ended");
        })
    }
}

/// Sessions that already carry this adapter's event bridge.
///
/// Entries whose home thread has stopped are dropped on [`prune`], so a
/// supervisor cycling through many sessions does not grow the set.
///
/// [`prune`]: AttachedSessions::prune
#[derive(Default)]
pub(crate) struct AttachedSessions {
    hosts: HashMap<u64, WeakSessionHost>,
}

impl AttachedSessions {
    /// Record `host`; false if it was already attached.
    pub(crate) fn insert(&mut self, host: &SessionHost) -> bool {
        self.hosts.insert(host.id(), host.downgrade()).is_none()
    }

    pub(crate) fn prune(&mut self) {
        self.hosts.retain(|_, weak| weak.upgrade().is_some_and(|host| host.is_running()));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.hosts.len()
    }
}
