use std::{fs, path::Path};

use tracing::{debug, info, instrument};

use zbus::names::WellKnownName;

use super::{Config, ConfigPaths};
use crate::{RemoteMprisError, Result};

const DEFAULT_CONFIG_HEADER: &str = "# remote-mpris configuration file\n";

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A commented, empty file is created when none exists, so every value
    /// falls back to its default.
    ///
    /// # Errors
    /// Returns error if the config directory is unknown, the file cannot be
    /// created or read, or its TOML is invalid
    pub fn load() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    /// Loads a configuration file, creating a default one when missing.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read, its TOML is
    /// invalid, or a value fails [`Config::validate`]
    #[instrument]
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            create_default_config_file(path)?;
        }

        let content = fs::read_to_string(path).map_err(|e| RemoteMprisError::io(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| RemoteMprisError::toml_parse(e, Some(path)))?;
        config.validate()?;

        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns the TOML deserialization error when the text is invalid
    pub fn from_toml_str(content: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(content)
    }

    /// Checks values that parse but cannot work at runtime.
    ///
    /// # Errors
    /// Returns `RemoteMprisError::ConfigValidation` for a zero hand-off
    /// timeout or a bus name prefix that is not a valid well-known name
    pub fn validate(&self) -> Result<()> {
        if self.player.handoff_timeout_ms == 0 {
            return Err(RemoteMprisError::ConfigValidation {
                component: "player.handoff_timeout_ms".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        WellKnownName::try_from(self.bus.name_prefix.as_str()).map_err(|e| {
            RemoteMprisError::ConfigValidation {
                component: "bus.name_prefix".to_string(),
                details: format!("'{}' is not a valid bus name: {e}", self.bus.name_prefix),
            }
        })?;

        Ok(())
    }
}

fn create_default_config_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RemoteMprisError::io(e, parent))?;
    }

    fs::write(path, DEFAULT_CONFIG_HEADER).map_err(|e| RemoteMprisError::io(e, path))?;
    info!("Created default configuration file at {}", path.display());

    Ok(())
}
