/// Shared reactive building blocks
pub mod common;
/// MPRIS player surface on D-Bus
pub mod mpris;
/// Platform media session boundary
pub mod session;

pub use mpris::{MprisAdapter, MprisError};
pub use session::{MediaSession, SessionHost, SessionSlot, SessionSupervisor};
