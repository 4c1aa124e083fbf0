use futures::Stream;
use tracing::info;

use super::SessionHost;
use crate::services::common::Property;

/// Supplies the session the adapter is currently bound to.
pub trait SessionSupervisor: Send + Sync {
    /// The current session, or `None` when no session is active.
    fn current_session(&self) -> Option<SessionHost>;
}

/// Single-session slot that a supervisor binds and clears.
///
/// Binding a different session is observable through [`SessionSlot::watch`],
/// which the adapter uses to re-announce metadata.
#[derive(Clone, Debug)]
pub struct SessionSlot {
    current: Property<Option<SessionHost>>,
}

impl SessionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            current: Property::new(None),
        }
    }

    /// Bind a session, replacing any previous one.
    pub fn bind(&self, host: SessionHost) {
        info!(?host, "Binding media session");
        self.current.set(Some(host));
    }

    /// Unbind the current session.
    pub fn clear(&self) {
        info!("Clearing media session");
        self.current.set(None);
    }

    /// Stream of bound sessions, starting with the current one.
    pub fn watch(&self) -> impl Stream<Item = Option<SessionHost>> + Send + use<> {
        self.current.watch()
    }
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSupervisor for SessionSlot {
    fn current_session(&self) -> Option<SessionHost> {
        self.current.get()
    }
}
