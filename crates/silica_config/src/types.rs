//! Configuration types deserialized from `silica.toml`.

use serde::Deserialize;

/// The project configuration parsed from `silica.toml`.
///
/// Every field is optional; an absent configuration file is equivalent to an
/// empty one, and the command line overrides anything set here.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Project settings.
    #[serde(default)]
    pub project: ProjectSection,
    /// Output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// The `[project]` section.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectSection {
    /// The name of the top module to elaborate. Defaults to the first
    /// module in the source file.
    #[serde(default)]
    pub top: Option<String>,
}

/// The `[output]` section.
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Path of the BLIF file to write.
    #[serde(default)]
    pub blif: Option<String>,
    /// Directory for per-stage debug dumps, if dumping is enabled.
    #[serde(default)]
    pub debug_dir: Option<String>,
}
