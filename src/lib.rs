//! remote-mpris - MPRIS adapter for a single platform media session.
//!
//! The adapter exposes one media session as an `org.mpris.MediaPlayer2`
//! player on D-Bus:
//!
//! - Property reads are answered from the live session state
//! - Transport methods become session commands, gated on its capabilities
//! - Session notifications are re-announced as `PropertiesChanged` and
//!   `Seeked` signals
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use remote_mpris::{
//!     config::Config,
//!     services::{
//!         mpris::{MprisAdapter, ZbusConnection, forward_signals},
//!         session::SessionSlot,
//!     },
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let slot = Arc::new(SessionSlot::new());
//! let connection = Arc::new(ZbusConnection::session().await?);
//!
//! let (adapter, signals) = MprisAdapter::new(&config, slot.clone(), connection.clone());
//! tokio::spawn(forward_signals(signals, connection));
//! adapter.follow(slot.watch());
//! adapter.sync().await?;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Media session and MPRIS services.
pub mod services;

/// Logging setup.
pub mod tracing_config;

pub use core::{RemoteMprisError, Result};
