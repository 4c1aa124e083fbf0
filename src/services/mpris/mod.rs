//! MPRIS player surface for a single media session.
//!
//! Peers see a standard `org.mpris.MediaPlayer2` player at
//! `/org/mpris/MediaPlayer2`. Reads go through [`PropertyTable`], transport
//! methods through [`CommandDispatcher`], and session notifications come
//! back out as signals through [`EventBridge`].

/// Registration lifecycle
pub mod adapter;
/// Bus collaborator and the zbus implementation
pub mod bus;
/// Transport command translation
pub mod control;
mod error;
/// Session notifications to bus signals
pub mod events;
/// Bus-name suffixes and track ids
pub mod identifiers;
/// Exported object and call dispatch
pub mod object;
/// Property reads
pub mod properties;
/// Interface, property and value types
pub mod types;

#[cfg(test)]
mod tests;

pub use adapter::MprisAdapter;
pub use bus::{BusConnection, ZbusConnection, forward_signals};
pub use control::CommandDispatcher;
pub use error::MprisError;
pub use events::{EventBridge, SignalReceiver, SignalSender};
pub use identifiers::{BusIdentity, track_object_path};
pub use object::{MethodCall, PlayerCall, PlayerObject, Reply};
pub use properties::PropertyTable;
pub use types::*;
