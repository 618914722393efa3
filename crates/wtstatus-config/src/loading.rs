//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.wtstatus/config.toml` (global user preferences)
//! 3. **Project config** - `./.wtstatus/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority, applied by the caller)

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::ConfigError;
use crate::paths::StatusPaths;
use crate::types::{FilterConfig, GitConfig, StatusConfig, StoreConfig, WatchConfig};
use crate::validation::validate_config;

/// Load configuration from the hierarchy of config files.
///
/// Loads and merges configuration from:
/// 1. Default values
/// 2. User config (`~/.wtstatus/config.toml`)
/// 3. Project config (`./.wtstatus/config.toml`)
///
/// # Errors
///
/// Returns an error if a file exists but cannot be parsed, or if validation
/// fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<StatusConfig, ConfigError> {
    load_with_override(None)
}

/// Like [`load_hierarchy`], but an explicit file replaces the project config.
pub fn load_with_override(explicit: Option<&Path>) -> Result<StatusConfig, ConfigError> {
    let mut config = StatusConfig::default();

    let paths = StatusPaths::resolve()?;
    config = merge_optional(config, load_config_file(&paths.user_config()))?;

    let project_config = match explicit {
        Some(path) => load_config_file(path),
        None => {
            let project_root = std::env::current_dir()?;
            load_config_file(&StatusPaths::project_config(&project_root))
        }
    };
    // An explicitly named file must exist.
    if explicit.is_some() {
        config = merge_configs(config, project_config?);
    } else {
        config = merge_optional(config, project_config)?;
    }

    validate_config(&config)?;

    Ok(config)
}

fn merge_optional(
    base: StatusConfig,
    loaded: Result<StatusConfig, ConfigError>,
) -> Result<StatusConfig, ConfigError> {
    match loaded {
        Ok(found) => Ok(merge_configs(base, found)),
        Err(e) if e.is_not_found() => Ok(base),
        Err(e) => Err(e),
    }
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<StatusConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| std::io::Error::new(e.kind(), format!("'{}': {}", path.display(), e)))?;
    let config: StatusConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    debug!(event = "config.file_loaded", path = %path.display());

    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: StatusConfig, override_config: StatusConfig) -> StatusConfig {
    StatusConfig {
        store: StoreConfig::merge(&base.store, &override_config.store),
        filter: FilterConfig::merge(&base.filter, &override_config.filter),
        watch: WatchConfig::merge(&base.watch, &override_config.watch),
        git: GitConfig::merge(&base.git, &override_config.git),
    }
}
