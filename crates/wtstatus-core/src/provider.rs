//! Boundary to the external status provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// One raw change as reported by a provider. Counts may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub path: String,
    pub status: String,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    #[serde(default)]
    pub is_staged: Option<bool>,
    #[serde(default)]
    pub diff: Option<String>,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    pub fn with_counts(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self
    }

    pub fn staged(mut self, is_staged: bool) -> Self {
        self.is_staged = Some(is_staged);
        self
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }
}

/// Provider reply. `success: true` without a `changes` list is malformed
/// and treated as a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub changes: Option<Vec<ChangeRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok(changes: Vec<ChangeRecord>) -> Self {
        Self {
            success: true,
            changes: Some(changes),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            changes: None,
            error: Some(error.into()),
        }
    }
}

/// Computes the working-tree status of a path.
///
/// Called at most once concurrently per workspace path. The call always runs
/// to completion; a returned `Err` (or a panic) is treated like
/// `success: false`.
#[async_trait]
pub trait StatusProvider: Send + Sync + 'static {
    async fn get_status(&self, workspace_path: &str) -> Result<StatusResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_parses_partial_records() {
        let json = r#"{
            "success": true,
            "changes": [
                {"path": "a.ts", "status": "modified", "additions": 3},
                {"path": "b.ts", "status": "added", "isStaged": true}
            ]
        }"#;
        let response: StatusResponse = serde_json::from_str(json).unwrap();
        let changes = response.changes.unwrap();
        assert_eq!(changes[0].additions, Some(3));
        assert_eq!(changes[0].deletions, None);
        assert_eq!(changes[1].is_staged, Some(true));
    }

    #[test]
    fn test_status_response_without_changes_is_malformed_shape() {
        let response: StatusResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.changes.is_none());
    }

    #[test]
    fn test_change_record_builders() {
        let record = ChangeRecord::new("a.ts", "modified")
            .with_counts(3, 1)
            .staged(true)
            .with_diff("@@ -1 +1 @@");
        assert_eq!(record.additions, Some(3));
        assert_eq!(record.deletions, Some(1));
        assert_eq!(record.is_staged, Some(true));
        assert!(record.diff.is_some());
    }
}
