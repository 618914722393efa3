use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::StoreInner;
use super::fetch::FetchTicket;
use super::registry::{EntryId, StoreEntry};

/// Repeating poll task owned by one entry. Dropping it stops the task.
#[derive(Debug)]
pub(crate) struct PollTimer {
    interval: Duration,
    cancel: CancellationToken,
}

impl PollTimer {
    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl StoreInner {
    /// Bring the entry's timer in line with its subscribers and the
    /// visibility flag. Returns a fetch to spawn once the lock is released.
    pub(crate) fn recompute(
        self: &Arc<Self>,
        entry: &mut StoreEntry,
        visible: bool,
    ) -> Option<FetchTicket> {
        let desired = entry.desired_interval().filter(|_| visible);

        let Some(interval) = desired else {
            if entry.timer.take().is_some() {
                debug!(
                    event = "core.scheduler.timer_disarmed",
                    workspace = %entry.workspace_path,
                );
            }
            // First paint for passive-only entries.
            if visible && entry.last_fetch_at.is_none() && !entry.subscribers.is_empty() {
                return self.begin_fetch(entry, true);
            }
            return None;
        };

        let had_timer = match entry.poll_interval() {
            Some(current) if current == interval => return None,
            Some(_) => true,
            None => false,
        };

        entry.timer = Some(self.arm_timer(entry, interval));

        if had_timer {
            return None;
        }
        let show_loading = entry.last_fetch_at.is_none();
        self.begin_fetch(entry, show_loading)
    }

    fn arm_timer(self: &Arc<Self>, entry: &StoreEntry, interval: Duration) -> PollTimer {
        let cancel = self.shutdown.child_token();
        let token = cancel.clone();
        let store = Arc::downgrade(self);
        let entry_id = entry.id;
        let workspace_path = entry.workspace_path.clone();

        debug!(
            event = "core.scheduler.timer_armed",
            workspace = %workspace_path,
            interval_ms = interval.as_millis() as u64,
        );

        self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.on_tick(entry_id, &workspace_path, &token);
            }
        });

        PollTimer { interval, cancel }
    }

    fn on_tick(
        self: &Arc<Self>,
        entry_id: EntryId,
        workspace_path: &str,
        token: &CancellationToken,
    ) {
        let ticket = {
            let mut registry = self.lock();
            // A timer replaced while this tick was pending must not fetch.
            if token.is_cancelled() {
                return;
            }
            match registry.get_mut(workspace_path) {
                Some(entry) if entry.id == entry_id => self.begin_fetch(entry, false),
                _ => None,
            }
        };
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }
}
