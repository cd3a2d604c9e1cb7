//! Loading `MissionConfig` from TOML.

use std::path::Path;

use tracing::debug;

use spear_contracts::error::{MissionError, MissionResult};

use crate::model::MissionConfig;

impl MissionConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `MissionError::ConfigError` if the TOML is malformed, does not
    /// match the schema, or names an empty endpoint.
    pub fn from_toml_str(s: &str) -> MissionResult<Self> {
        let config: MissionConfig = toml::from_str(s).map_err(|e| MissionError::ConfigError {
            reason: format!("failed to parse mission config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> MissionResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MissionError::ConfigError {
            reason: format!("failed to read mission config '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), server = %config.navigation.server, "mission config loaded");
        Ok(config)
    }

    fn validate(&self) -> MissionResult<()> {
        let required = [
            ("navigation.server", &self.navigation.server),
            ("navigation.relative_frame", &self.navigation.relative_frame),
            ("navigation.gps_frame", &self.navigation.gps_frame),
            ("transform.service", &self.transform.service),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(MissionError::ConfigError {
                    reason: format!("'{}' must not be empty", key),
                });
            }
        }
        Ok(())
    }
}
