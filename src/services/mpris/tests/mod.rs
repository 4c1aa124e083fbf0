//! Unit tests for the MPRIS surface
//!
//! Sessions are in-memory sessions on real home threads, bound through a
//! session slot, so every read and command goes through the hand-off.

#![allow(clippy::unwrap_used)]

mod bus;
mod identifiers;
mod types;

use std::{sync::Arc, time::Duration};

use crate::services::session::{
    MediaItem, MemorySession, MemorySessionBuilder, SessionHost, SessionSlot,
};

const NAMESPACE: &str = "com.example.player";
const TIMEOUT: Duration = Duration::from_secs(2);

fn song(id: &str, title: &str) -> MediaItem {
    MediaItem {
        media_id: id.to_string(),
        title: Some(title.to_string()),
        ..MediaItem::default()
    }
}

fn session() -> MemorySessionBuilder {
    MemorySession::builder(NAMESPACE).queue(vec![song("id-1", "First"), song("id-2", "Second")])
}

fn bind(builder: MemorySessionBuilder) -> (Arc<SessionSlot>, SessionHost) {
    let host = SessionHost::spawn("mpris-test", TIMEOUT, move || builder.build()).unwrap();
    let slot = Arc::new(SessionSlot::new());
    slot.bind(host.clone());
    (slot, host)
}

fn with_memory<R, F>(host: &SessionHost, f: F) -> R
where
    R: Send + 'static,
    F: FnOnce(&MemorySession) -> R + Send + 'static,
{
    host.call(move |session| f(MemorySession::from_dyn(session).unwrap()))
        .unwrap()
}
