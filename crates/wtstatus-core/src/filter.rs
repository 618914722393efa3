//! Normalization of provider change lists before they are published.

use std::collections::HashSet;

use tracing::debug;
use wtstatus_config::FilterConfig;

use crate::provider::ChangeRecord;
use crate::types::GitStatusChange;

/// Bookkeeping paths that must never appear in a published snapshot:
/// everything under the internal directory, and the top-level plan file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedPaths {
    internal_dir: String,
    plan_file: String,
}

impl ReservedPaths {
    pub fn new(internal_dir: impl AsRef<str>, plan_file: impl AsRef<str>) -> Self {
        Self {
            internal_dir: normalize_path(internal_dir.as_ref())
                .trim_end_matches('/')
                .to_string(),
            plan_file: normalize_path(plan_file.as_ref()),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.internal_dir(), config.plan_file())
    }

    pub fn is_reserved(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if path == self.plan_file || path == self.internal_dir {
            return true;
        }
        path.strip_prefix(self.internal_dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for ReservedPaths {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// Forward slashes, no leading `./`.
fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// Turn raw provider records into publishable changes.
///
/// Reserved paths are dropped, unknown counts default to zero, and only the
/// first record for any path is kept.
pub fn normalize_changes(
    records: Vec<ChangeRecord>,
    reserved: &ReservedPaths,
) -> Vec<GitStatusChange> {
    let mut seen = HashSet::new();
    let mut changes = Vec::with_capacity(records.len());

    for record in records {
        if reserved.is_reserved(&record.path) {
            continue;
        }
        if !seen.insert(record.path.clone()) {
            debug!(
                event = "core.filter.duplicate_path_dropped",
                path = %record.path
            );
            continue;
        }
        changes.push(GitStatusChange {
            path: record.path,
            status: record.status,
            additions: record.additions.unwrap_or(0),
            deletions: record.deletions.unwrap_or(0),
            is_staged: record.is_staged.unwrap_or(false),
            diff: record.diff,
        });
    }

    changes
}
