use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::StoreInner;
use super::registry::{EntryId, StoreEntry};
use crate::errors::ProviderError;
use crate::filter::{ReservedPaths, normalize_changes};
use crate::provider::StatusResponse;
use crate::types::GitStatusSnapshot;

pub(crate) const FETCH_FAILED_FALLBACK: &str = "Failed to fetch git status";

/// Claim on an entry's single in-flight slot.
#[derive(Debug)]
pub(crate) struct FetchTicket {
    entry_id: EntryId,
    workspace_path: String,
}

type ProviderOutcome = Result<Result<StatusResponse, ProviderError>, Box<dyn Any + Send>>;

impl StoreInner {
    /// Take the in-flight slot, or mark a follow-up if it is already taken.
    ///
    /// Must be called under the registry lock. The loading snapshot, when
    /// requested, is published before the provider is called.
    pub(crate) fn begin_fetch(
        &self,
        entry: &mut StoreEntry,
        show_loading: bool,
    ) -> Option<FetchTicket> {
        if entry.in_flight {
            entry.pending_fetch = true;
            debug!(
                event = "core.store.fetch_coalesced",
                workspace = %entry.workspace_path,
            );
            return None;
        }

        entry.in_flight = true;
        if show_loading {
            let loading = Arc::new(entry.snapshot.to_loading());
            entry.publish(loading, &self.deliveries);
        }

        debug!(
            event = "core.store.fetch_started",
            workspace = %entry.workspace_path,
            show_loading = show_loading,
        );

        Some(FetchTicket {
            entry_id: entry.id,
            workspace_path: entry.workspace_path.clone(),
        })
    }

    /// Run the provider call on the runtime. Resolves to the fetched snapshot.
    pub(crate) fn spawn_fetch(
        self: &Arc<Self>,
        ticket: FetchTicket,
    ) -> JoinHandle<Arc<GitStatusSnapshot>> {
        let store = Arc::clone(self);
        self.runtime.spawn(async move { store.run_fetch(ticket).await })
    }

    async fn run_fetch(self: Arc<Self>, ticket: FetchTicket) -> Arc<GitStatusSnapshot> {
        let outcome = AssertUnwindSafe(self.provider.get_status(&ticket.workspace_path))
            .catch_unwind()
            .await;
        let snapshot = snapshot_from_outcome(
            &ticket.workspace_path,
            outcome,
            &self.settings.reserved,
            Utc::now(),
        );
        self.complete_fetch(ticket, snapshot)
    }

    /// Apply a finished fetch: release the slot, publish, and start at most
    /// one follow-up if more requests arrived meanwhile.
    ///
    /// The result goes back to the caller even when the entry is gone and
    /// nothing was published.
    fn complete_fetch(
        self: &Arc<Self>,
        ticket: FetchTicket,
        snapshot: GitStatusSnapshot,
    ) -> Arc<GitStatusSnapshot> {
        let snapshot = Arc::new(snapshot);

        let (follow_up, dead_entry) = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            let visible = registry.visible;

            let entry = match registry.get_mut(&ticket.workspace_path) {
                Some(entry) if entry.id == ticket.entry_id => entry,
                _ => {
                    debug!(
                        event = "core.store.fetch_discarded",
                        workspace = %ticket.workspace_path,
                        entry = ticket.entry_id.get(),
                    );
                    return snapshot;
                }
            };

            entry.in_flight = false;
            entry.last_fetch_at = snapshot.last_updated;
            entry.publish(Arc::clone(&snapshot), &self.deliveries);

            let mut follow_up = None;
            if entry.pending_fetch {
                entry.pending_fetch = false;
                if entry.should_poll(visible) {
                    follow_up = self.begin_fetch(entry, false);
                }
            }

            // Transient entries created by a one-shot refresh.
            let dead_entry = if entry.subscribers.is_empty() && follow_up.is_none() {
                registry.remove(&ticket.workspace_path)
            } else {
                None
            };
            (follow_up, dead_entry)
        };

        drop(dead_entry);
        if let Some(ticket) = follow_up {
            self.spawn_fetch(ticket);
        }
        snapshot
    }
}

fn snapshot_from_outcome(
    workspace_path: &str,
    outcome: ProviderOutcome,
    reserved: &ReservedPaths,
    at: DateTime<Utc>,
) -> GitStatusSnapshot {
    let error = match outcome {
        Ok(Ok(StatusResponse {
            success: true,
            changes: Some(records),
            ..
        })) => {
            let changes = normalize_changes(records, reserved);
            debug!(
                event = "core.store.fetch_completed",
                workspace = workspace_path,
                changes = changes.len(),
            );
            return GitStatusSnapshot::loaded(workspace_path, changes, at);
        }
        Ok(Ok(response)) => response.error.unwrap_or_default(),
        Ok(Err(e)) => e.to_string(),
        Err(panic) => format!("status provider panicked: {}", panic_message(&*panic)),
    };

    let error = if error.is_empty() {
        FETCH_FAILED_FALLBACK.to_string()
    } else {
        error
    };
    warn!(
        event = "core.store.fetch_failed",
        workspace = workspace_path,
        error = %error,
    );
    GitStatusSnapshot::failed(workspace_path, error, at)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
