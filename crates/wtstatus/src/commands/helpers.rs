use std::path::Path;
use std::sync::Arc;

use clap::ArgMatches;
use tracing::{error, warn};

use wtstatus_config::StatusConfig;
use wtstatus_core::{InvalidationBus, StatusStore, StoreError, StoreSettings, VisibilitySignal};
use wtstatus_git::GitStatusProvider;

use crate::color;

/// Load configuration for a command.
///
/// A file named with `--config` must load; any failure is reported and
/// returned. Without it, the hierarchy is loaded and a broken file only
/// produces a warning before falling back to defaults.
pub(crate) fn load_config(
    matches: &ArgMatches,
) -> Result<StatusConfig, Box<dyn std::error::Error>> {
    let Some(explicit) = matches.get_one::<String>("config") else {
        return Ok(load_config_with_warning());
    };

    wtstatus_config::load_with_override(Some(Path::new(explicit))).map_err(|e| {
        eprintln!(
            "{} Could not load config '{}': {}",
            color::error("Error:"),
            explicit,
            e
        );
        error!(
            event = "cli.config.load_failed",
            path = explicit.as_str(),
            error = %e
        );
        e.into()
    })
}

/// Load the config hierarchy, falling back to defaults on failure.
///
/// Notifies the user via a stderr message and a `cli.config.load_failed` event.
pub(crate) fn load_config_with_warning() -> StatusConfig {
    match StatusConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} Could not load config: {}. Using defaults.\n{}",
                color::warning("Warning:"),
                e,
                color::hint(
                    "Tip: Check ~/.wtstatus/config.toml and ./.wtstatus/config.toml \
                     for syntax errors."
                )
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            StatusConfig::default()
        }
    }
}

/// Canonical form of a workspace argument, used as the store key.
///
/// Two spellings of the same directory must share one cache entry.
pub(crate) fn resolve_workspace(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved.display().to_string()),
        Err(e) => {
            eprintln!("{} Cannot open workspace '{}': {}", color::error("Error:"), path, e);
            error!(event = "cli.workspace.resolve_failed", path = path, error = %e);
            Err(e.into())
        }
    }
}

pub(crate) fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// A store backed by the git provider. Must be called inside the runtime.
pub(crate) fn build_store(
    config: &StatusConfig,
    include_diff: bool,
    visibility: &VisibilitySignal,
    invalidations: &InvalidationBus,
) -> Result<StatusStore, StoreError> {
    StatusStore::new(
        Arc::new(GitStatusProvider::new(include_diff)),
        StoreSettings::from_config(config),
        visibility,
        invalidations,
    )
}
