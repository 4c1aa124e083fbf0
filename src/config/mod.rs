//! Configuration schema definitions and loading.
//!
//! Defines the configuration structure for remote-mpris: logging, the bus
//! name prefix and the identity/timeouts of the exported player. All
//! sections are serializable to/from TOML and every field has a default.

mod bus;
mod general;
mod loading;
mod paths;
mod player;

#[cfg(test)]
mod tests;

pub use bus::{BusConfig, MPRIS_NAME_PREFIX};
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use player::PlayerConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{RemoteMprisError, Result};

/// Main configuration structure for remote-mpris.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Bus naming settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// Settings of the exported media player object.
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Config {
    /// Renders the JSON schema of the configuration file.
    ///
    /// # Errors
    /// Returns error if the schema cannot be serialized
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).map_err(|e| RemoteMprisError::Serialization {
            what: "configuration schema".to_string(),
            details: e.to_string(),
        })
    }
}
