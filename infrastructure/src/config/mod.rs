//! Configuration file loading for crossdesk
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./crossdesk.toml` or `./.crossdesk.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/crossdesk/config.toml`
//! 4. Fallback: `~/.config/crossdesk/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileEngineConfig, FileModelConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;
