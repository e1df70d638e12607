//! Configuration file loading.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Loads `<project_dir>/silica.toml` if it exists.
///
/// A missing file is not an error; it yields the default configuration.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("silica.toml");
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}
