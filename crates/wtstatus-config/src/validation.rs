//! Configuration validation logic.

use crate::errors::ConfigError;
use crate::types::StatusConfig;

/// Validate a StatusConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - `min_poll_interval_ms` must be greater than zero
/// - `default_poll_interval_ms` must not be below `min_poll_interval_ms`
/// - Reserved filter names must be non-empty relative names without `..`
/// - `debounce_ms` must be greater than zero
pub fn validate_config(config: &StatusConfig) -> Result<(), ConfigError> {
    let min = config.store.min_poll_interval_ms();
    if min == 0 {
        return Err(invalid("min_poll_interval_ms must be greater than 0"));
    }

    let default = config.store.default_poll_interval_ms();
    if default < min {
        return Err(invalid(format!(
            "default_poll_interval_ms ({}) is below min_poll_interval_ms ({})",
            default, min
        )));
    }

    validate_reserved_name("internal_dir", config.filter.internal_dir())?;
    validate_reserved_name("plan_file", config.filter.plan_file())?;

    if config.watch.debounce_ms() == 0 {
        return Err(invalid("debounce_ms must be greater than 0"));
    }

    Ok(())
}

fn validate_reserved_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim_matches('/');
    if trimmed.is_empty() {
        return Err(invalid(format!("{} must not be empty", field)));
    }
    if trimmed.split(['/', '\\']).any(|part| part == "..") {
        return Err(invalid(format!(
            "{} '{}' must not contain '..'",
            field, value
        )));
    }
    if value.starts_with('/') {
        return Err(invalid(format!(
            "{} '{}' must be relative to the workspace root",
            field, value
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.into(),
    }
}
