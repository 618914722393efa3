use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;
use wtstatus_config::GitConfig;
use wtstatus_core::{ProviderError, StatusProvider, StatusResponse};

use crate::status::collect_changes;

/// Status provider backed by the local git repository at each workspace path.
///
/// git2 is blocking, so every call runs on tokio's blocking pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitStatusProvider {
    include_diff: bool,
}

impl GitStatusProvider {
    pub fn new(include_diff: bool) -> Self {
        Self { include_diff }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self::new(config.include_diff())
    }

    pub fn include_diff(&self) -> bool {
        self.include_diff
    }
}

impl Default for GitStatusProvider {
    fn default() -> Self {
        Self::from_config(&GitConfig::default())
    }
}

#[async_trait]
impl StatusProvider for GitStatusProvider {
    async fn get_status(&self, workspace_path: &str) -> Result<StatusResponse, ProviderError> {
        let path = PathBuf::from(workspace_path);
        let include_diff = self.include_diff;

        let result = tokio::task::spawn_blocking(move || collect_changes(&path, include_diff))
            .await
            .map_err(|e| ProviderError::Worker(e.to_string()))?;

        match result {
            Ok(changes) => Ok(StatusResponse::ok(changes)),
            Err(e) => {
                warn!(
                    event = "git.status.collect_failed",
                    path = workspace_path,
                    error = %e,
                );
                Ok(StatusResponse::failed(e.to_string()))
            }
        }
    }
}
