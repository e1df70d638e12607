//! Parsing of `silica.toml` project configuration files.
//!
//! The configuration file is optional: it can pin the top-module name and
//! default output paths for a project so they need not be repeated on the
//! command line. Command-line flags always win over file settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
