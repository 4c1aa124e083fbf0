use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Well-known name prefix every MPRIS player claims under.
pub const MPRIS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2";

/// Bus naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    /// Prefix of the claimed bus name. The adapter appends `.x<suffix>`
    /// with a per-instance suffix.
    pub name_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name_prefix: MPRIS_NAME_PREFIX.to_string(),
        }
    }
}
