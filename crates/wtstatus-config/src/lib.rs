//! # wtstatus-config
//!
//! TOML configuration types, loading, and validation for wtstatus.
//!
//! Single source of truth for `StatusConfig` and the `~/.wtstatus/` path layout.

mod loading;
mod validation;

pub mod errors;
pub mod paths;
pub mod types;

// Public API re-exports
pub use errors::ConfigError;
pub use loading::{load_config_file, load_hierarchy, load_with_override, merge_configs};
pub use paths::{PathError, StatusPaths};
pub use types::{FilterConfig, GitConfig, StatusConfig, StoreConfig, WatchConfig};
pub use validation::validate_config;

impl StatusConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
