use std::sync::Arc;
use std::time::Duration;

use super::StatusStore;
use crate::types::{GitStatusSnapshot, SubscriberId};

struct Handle {
    store: StatusStore,
    workspace_path: String,
    id: SubscriberId,
}

/// A live registration returned by [`StatusStore::subscribe`].
///
/// Dropping it unsubscribes. Keeps the store alive while held. An inert
/// subscription (empty path) ignores every call.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    handle: Option<Handle>,
}

impl Subscription {
    pub(super) fn new(store: StatusStore, workspace_path: String, id: SubscriberId) -> Self {
        Self {
            handle: Some(Handle {
                store,
                workspace_path,
                id,
            }),
        }
    }

    pub(super) fn inert() -> Self {
        Self { handle: None }
    }

    pub fn is_inert(&self) -> bool {
        self.handle.is_none()
    }

    pub fn id(&self) -> Option<SubscriberId> {
        self.handle.as_ref().map(|h| h.id)
    }

    pub fn workspace_path(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.workspace_path.as_str())
    }

    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Toggle whether this subscriber drives polling. Unchanged values are ignored.
    pub fn set_active(&self, is_active: bool) {
        let Some(handle) = &self.handle else {
            return;
        };
        handle
            .store
            .inner
            .update_subscriber(&handle.workspace_path, handle.id, |record| {
                if record.is_active == is_active {
                    return false;
                }
                record.is_active = is_active;
                true
            });
    }

    /// Change this subscriber's desired cadence. Unchanged values are ignored.
    pub fn set_poll_interval(&self, interval: Duration) {
        let Some(handle) = &self.handle else {
            return;
        };
        let interval = handle.store.settings().clamp_interval(interval);
        handle
            .store
            .inner
            .update_subscriber(&handle.workspace_path, handle.id, |record| {
                if record.poll_interval == interval {
                    return false;
                }
                record.poll_interval = interval;
                true
            });
    }

    /// Force one loading fetch for this path and wait for the result.
    pub async fn refresh(&self) -> Arc<GitStatusSnapshot> {
        match &self.handle {
            Some(handle) => {
                handle
                    .store
                    .refresh_git_status(&handle.workspace_path, true)
                    .await
            }
            None => Arc::new(GitStatusSnapshot::empty("")),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle
                .store
                .inner
                .remove_subscriber(&handle.workspace_path, handle.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("workspace_path", &self.workspace_path())
            .field("id", &self.id())
            .finish()
    }
}
