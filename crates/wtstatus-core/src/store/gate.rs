use std::sync::{Arc, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::StoreInner;
use super::fetch::FetchTicket;
use super::registry::Registry;
use crate::signals::Invalidation;

impl StoreInner {
    /// Spawn the visibility and invalidation listeners if not yet running.
    ///
    /// Called under the lock whenever an entry is about to be created.
    pub(crate) fn ensure_listeners(self: &Arc<Self>, registry: &mut Registry) {
        if !registry.listeners.visibility {
            registry.listeners.visibility = true;
            let mut rx = self.visibility.subscribe();
            registry.visible = *rx.borrow_and_update();
            self.runtime.spawn(visibility_listener(
                Arc::downgrade(self),
                rx,
                self.shutdown.clone(),
            ));
            debug!(event = "core.gate.visibility_listener_attached");
        }

        if !registry.listeners.invalidation {
            registry.listeners.invalidation = true;
            let rx = self.invalidations.subscribe();
            self.runtime.spawn(invalidation_listener(
                Arc::downgrade(self),
                rx,
                self.shutdown.clone(),
            ));
            debug!(event = "core.gate.invalidation_listener_attached");
        }
    }

    /// Flip the global flag, then recompute every entry.
    pub(crate) fn apply_visibility(self: &Arc<Self>, visible: bool) {
        let tickets: Vec<FetchTicket> = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            if registry.visible == visible {
                return;
            }
            registry.visible = visible;
            info!(
                event = "core.gate.visibility_changed",
                visible = visible,
                entries = registry.len(),
            );
            registry
                .entries_mut()
                .filter_map(|entry| self.recompute(entry, visible))
                .collect()
        };

        for ticket in tickets {
            self.spawn_fetch(ticket);
        }
    }

    /// Out-of-band refresh for exactly one known path while visible.
    pub(crate) fn apply_invalidation(self: &Arc<Self>, invalidation: &Invalidation) {
        let ticket = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            if !registry.visible {
                return;
            }
            match registry.get_mut(&invalidation.task_path) {
                Some(entry) => self.begin_fetch(entry, false),
                None => return,
            }
        };

        debug!(
            event = "core.gate.invalidation_applied",
            workspace = %invalidation.task_path,
            fetched = ticket.is_some(),
        );
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }

    /// Events were dropped; refresh every entry since any of them may be stale.
    fn apply_missed_invalidations(self: &Arc<Self>, missed: u64) {
        let tickets: Vec<FetchTicket> = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            if !registry.visible {
                return;
            }
            registry
                .entries_mut()
                .filter_map(|entry| self.begin_fetch(entry, false))
                .collect()
        };

        warn!(
            event = "core.gate.invalidations_lagged",
            missed = missed,
            refreshed = tickets.len(),
        );
        for ticket in tickets {
            self.spawn_fetch(ticket);
        }
    }
}

async fn visibility_listener(
    store: Weak<StoreInner>,
    mut rx: watch::Receiver<bool>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let visible = *rx.borrow_and_update();
        let Some(store) = store.upgrade() else {
            break;
        };
        store.apply_visibility(visible);
    }
}

async fn invalidation_listener(
    store: Weak<StoreInner>,
    mut rx: broadcast::Receiver<Invalidation>,
    shutdown: CancellationToken,
) {
    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = rx.recv() => received,
        };
        let Some(store) = store.upgrade() else {
            break;
        };
        match received {
            Ok(invalidation) => store.apply_invalidation(&invalidation),
            Err(RecvError::Lagged(missed)) => store.apply_missed_invalidations(missed),
            Err(RecvError::Closed) => break,
        }
    }
}
