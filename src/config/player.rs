use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Exported player configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Value of the `Identity` property.
    pub identity: String,

    /// Upper bound, in milliseconds, a bus call waits for the session's home
    /// thread before falling back to the no-session default.
    pub handoff_timeout_ms: u64,
}

impl PlayerConfig {
    /// Hand-off timeout as a [`Duration`].
    pub fn handoff_timeout(&self) -> Duration {
        Duration::from_millis(self.handoff_timeout_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            identity: "Remote Media".to_string(),
            handoff_timeout_ms: 2000,
        }
    }
}
