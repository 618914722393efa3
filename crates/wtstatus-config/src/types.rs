//! Configuration types.
//!
//! Every field is optional in TOML so that partial user/project files can be
//! merged; accessors supply the built-in defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_MIN_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_INTERNAL_DIR: &str = ".internal";
pub const DEFAULT_PLAN_FILE: &str = "PLAN.md";
pub const DEFAULT_WATCH_DEBOUNCE_MS: u64 = 150;

/// Top-level configuration, one table per concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub git: GitConfig,
}

/// `[store]` — polling cadence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Interval used when a subscriber does not request one.
    pub default_poll_interval_ms: Option<u64>,
    /// Requested intervals below this are clamped up.
    pub min_poll_interval_ms: Option<u64>,
}

impl StoreConfig {
    pub fn default_poll_interval_ms(&self) -> u64 {
        self.default_poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
    }

    pub fn min_poll_interval_ms(&self) -> u64 {
        self.min_poll_interval_ms
            .unwrap_or(DEFAULT_MIN_POLL_INTERVAL_MS)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            default_poll_interval_ms: override_config
                .default_poll_interval_ms
                .or(base.default_poll_interval_ms),
            min_poll_interval_ms: override_config
                .min_poll_interval_ms
                .or(base.min_poll_interval_ms),
        }
    }
}

/// `[filter]` — bookkeeping paths never exposed in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Reserved internal directory, relative to the workspace root.
    pub internal_dir: Option<String>,
    /// Reserved top-level planning file name.
    pub plan_file: Option<String>,
}

impl FilterConfig {
    pub fn internal_dir(&self) -> &str {
        self.internal_dir.as_deref().unwrap_or(DEFAULT_INTERNAL_DIR)
    }

    pub fn plan_file(&self) -> &str {
        self.plan_file.as_deref().unwrap_or(DEFAULT_PLAN_FILE)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            internal_dir: override_config
                .internal_dir
                .clone()
                .or_else(|| base.internal_dir.clone()),
            plan_file: override_config
                .plan_file
                .clone()
                .or_else(|| base.plan_file.clone()),
        }
    }
}

/// `[watch]` — filesystem watcher feeding the invalidation channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub enabled: Option<bool>,
    pub debounce_ms: Option<u64>,
}

impl WatchConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms.unwrap_or(DEFAULT_WATCH_DEBOUNCE_MS)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            enabled: override_config.enabled.or(base.enabled),
            debounce_ms: override_config.debounce_ms.or(base.debounce_ms),
        }
    }
}

/// `[git]` — git provider behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Attach per-file patch text to each change.
    pub include_diff: Option<bool>,
}

impl GitConfig {
    pub fn include_diff(&self) -> bool {
        self.include_diff.unwrap_or(true)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            include_diff: override_config.include_diff.or(base.include_diff),
        }
    }
}
