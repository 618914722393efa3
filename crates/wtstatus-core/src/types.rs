//! Published data model: changes, snapshots, and subscriber options.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One modified path in a working tree.
///
/// `path` is the identity: a snapshot holds at most one change per path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStatusChange {
    /// Path relative to the workspace root.
    pub path: String,
    /// Change kind (`added`, `modified`, `deleted`, `renamed`, ...). Open-ended.
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub is_staged: bool,
    /// Textual patch, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// The published status view of one workspace path.
///
/// Replaced wholesale on every fetch completion and shared behind an `Arc`,
/// so observers never see a half-updated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStatusSnapshot {
    pub workspace_path: String,
    pub changes: Vec<GitStatusChange>,
    /// True only while a fetch that opted into loading UI is outstanding.
    pub is_loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Completion time of the last fetch attempt, success or failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl GitStatusSnapshot {
    /// Placeholder for a path that has never been fetched.
    pub fn empty(workspace_path: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            changes: Vec::new(),
            is_loading: false,
            error: None,
            last_updated: None,
        }
    }

    /// Result of a successful fetch.
    pub fn loaded(
        workspace_path: impl Into<String>,
        changes: Vec<GitStatusChange>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            changes,
            is_loading: false,
            error: None,
            last_updated: Some(at),
        }
    }

    /// Result of a failed fetch: no changes, error set.
    pub fn failed(
        workspace_path: impl Into<String>,
        error: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            changes: Vec::new(),
            is_loading: false,
            error: Some(error.into()),
            last_updated: Some(at),
        }
    }

    /// Same changes, marked loading, error cleared.
    pub fn to_loading(&self) -> Self {
        Self {
            is_loading: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn total_additions(&self) -> u64 {
        self.changes.iter().map(|c| c.additions).sum()
    }

    pub fn total_deletions(&self) -> u64 {
        self.changes.iter().map(|c| c.deletions).sum()
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Unique, never reused subscriber identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub(crate) u64);

impl SubscriberId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-subscriber preferences given at subscribe time.
///
/// Unset fields fall back to "active" and the store's default interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub is_active: Option<bool>,
    pub poll_interval: Option<Duration>,
}

impl SubscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// A viewer that wants the current data but does not drive polling.
    pub fn passive() -> Self {
        Self {
            is_active: Some(false),
            poll_interval: None,
        }
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(path: &str, additions: u64, deletions: u64) -> GitStatusChange {
        GitStatusChange {
            path: path.to_string(),
            status: "modified".to_string(),
            additions,
            deletions,
            is_staged: false,
            diff: None,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = GitStatusSnapshot::empty("/repo");
        assert_eq!(snapshot.workspace_path, "/repo");
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert!(snapshot.last_updated.is_none());
        assert!(!snapshot.has_changes());
    }

    #[test]
    fn test_to_loading_keeps_changes_and_clears_error() {
        let mut snapshot =
            GitStatusSnapshot::loaded("/repo", vec![change("a.ts", 3, 1)], Utc::now());
        snapshot.error = Some("stale".to_string());

        let loading = snapshot.to_loading();
        assert!(loading.is_loading);
        assert!(loading.error.is_none());
        assert_eq!(loading.changes, snapshot.changes);
        assert_eq!(loading.last_updated, snapshot.last_updated);
    }

    #[test]
    fn test_failed_snapshot_has_no_changes() {
        let snapshot = GitStatusSnapshot::failed("/repo", "ECONNRESET", Utc::now());
        assert!(snapshot.changes.is_empty());
        assert_eq!(snapshot.error.as_deref(), Some("ECONNRESET"));
        assert!(!snapshot.is_loading);
        assert!(snapshot.last_updated.is_some());
    }

    #[test]
    fn test_totals() {
        let snapshot = GitStatusSnapshot::loaded(
            "/repo",
            vec![change("a.ts", 3, 1), change("b.ts", 10, 4)],
            Utc::now(),
        );
        assert_eq!(snapshot.total_additions(), 13);
        assert_eq!(snapshot.total_deletions(), 5);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = GitStatusSnapshot::loaded("/repo", vec![change("a.ts", 3, 1)], Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["workspacePath"], "/repo");
        assert_eq!(json["isLoading"], false);
        assert_eq!(json["changes"][0]["isStaged"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_subscribe_options_builders() {
        let options = SubscribeOptions::new().poll_interval(Duration::from_secs(5));
        assert_eq!(options.is_active, None);
        assert_eq!(options.poll_interval, Some(Duration::from_secs(5)));

        let passive = SubscribeOptions::passive();
        assert_eq!(passive.is_active, Some(false));
        assert_eq!(SubscribeOptions::new().active(true).is_active, Some(true));
    }
}
