use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use super::scheduler::PollTimer;
use crate::observer::{Delivery, DeliverySender, StatusObserver};
use crate::types::{GitStatusSnapshot, SubscriberId};

/// Identity of one entry incarnation. A path that is torn down and
/// subscribed again gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntryId(u64);

impl EntryId {
    pub(crate) fn get(self) -> u64 {
        self.0
    }
}

/// Which process-wide listeners have been spawned for this store.
#[derive(Debug, Default)]
pub(crate) struct ListenerFlags {
    pub(crate) visibility: bool,
    pub(crate) invalidation: bool,
}

/// One observer's registration.
pub(crate) struct SubscriberRecord {
    pub(crate) observer: Arc<dyn StatusObserver>,
    pub(crate) alive: Arc<AtomicBool>,
    pub(crate) is_active: bool,
    pub(crate) poll_interval: Duration,
}

impl SubscriberRecord {
    pub(crate) fn new(
        observer: Arc<dyn StatusObserver>,
        is_active: bool,
        poll_interval: Duration,
    ) -> Self {
        Self {
            observer,
            alive: Arc::new(AtomicBool::new(true)),
            is_active,
            poll_interval,
        }
    }

    pub(crate) fn delivery(
        &self,
        id: SubscriberId,
        snapshot: Arc<GitStatusSnapshot>,
    ) -> Delivery {
        Delivery {
            subscriber: id,
            alive: Arc::clone(&self.alive),
            observer: Arc::clone(&self.observer),
            snapshot,
        }
    }
}

impl Drop for SubscriberRecord {
    fn drop(&mut self) {
        // Queued deliveries for a removed subscriber are skipped.
        self.alive.store(false, Ordering::Release);
    }
}

/// Cache line for one workspace path.
pub(crate) struct StoreEntry {
    pub(crate) id: EntryId,
    pub(crate) workspace_path: String,
    pub(crate) snapshot: Arc<GitStatusSnapshot>,
    pub(crate) subscribers: BTreeMap<SubscriberId, SubscriberRecord>,
    /// Present iff visible and at least one subscriber is active.
    pub(crate) timer: Option<PollTimer>,
    pub(crate) in_flight: bool,
    pub(crate) pending_fetch: bool,
    /// Completion time of the last fetch attempt; `None` until the first one lands.
    pub(crate) last_fetch_at: Option<DateTime<Utc>>,
}

impl StoreEntry {
    fn new(id: EntryId, workspace_path: &str) -> Self {
        Self {
            id,
            workspace_path: workspace_path.to_string(),
            snapshot: Arc::new(GitStatusSnapshot::empty(workspace_path)),
            subscribers: BTreeMap::new(),
            timer: None,
            in_flight: false,
            pending_fetch: false,
            last_fetch_at: None,
        }
    }

    /// Fastest interval among active subscribers.
    pub(crate) fn desired_interval(&self) -> Option<Duration> {
        self.subscribers
            .values()
            .filter(|s| s.is_active)
            .map(|s| s.poll_interval)
            .min()
    }

    pub(crate) fn should_poll(&self, visible: bool) -> bool {
        visible && self.desired_interval().is_some()
    }

    pub(crate) fn poll_interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(PollTimer::interval)
    }

    /// Replace the snapshot and queue it for every current subscriber.
    pub(crate) fn publish(
        &mut self,
        snapshot: Arc<GitStatusSnapshot>,
        deliveries: &DeliverySender,
    ) {
        self.snapshot = snapshot;
        for (id, record) in &self.subscribers {
            deliveries.send(record.delivery(*id, Arc::clone(&self.snapshot)));
        }
    }

    /// Queue the current snapshot for one subscriber only.
    pub(crate) fn deliver_current(&self, id: SubscriberId, deliveries: &DeliverySender) {
        if let Some(record) = self.subscribers.get(&id) {
            deliveries.send(record.delivery(id, Arc::clone(&self.snapshot)));
        }
    }
}

/// The path → entry map plus the global flags guarded with it.
pub(crate) struct Registry {
    entries: HashMap<String, StoreEntry>,
    pub(crate) visible: bool,
    pub(crate) listeners: ListenerFlags,
    next_subscriber_id: u64,
    next_entry_id: u64,
}

impl Registry {
    pub(crate) fn new(visible: bool) -> Self {
        Self {
            entries: HashMap::new(),
            visible,
            listeners: ListenerFlags::default(),
            next_subscriber_id: 1,
            next_entry_id: 1,
        }
    }

    pub(crate) fn next_subscriber_id(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        id
    }

    pub(crate) fn contains(&self, workspace_path: &str) -> bool {
        self.entries.contains_key(workspace_path)
    }

    pub(crate) fn get_or_create(&mut self, workspace_path: &str) -> &mut StoreEntry {
        let next_entry_id = &mut self.next_entry_id;
        self.entries
            .entry(workspace_path.to_string())
            .or_insert_with(|| {
                let id = EntryId(*next_entry_id);
                *next_entry_id += 1;
                info!(
                    event = "core.store.entry_created",
                    workspace = workspace_path,
                    entry = id.get(),
                );
                StoreEntry::new(id, workspace_path)
            })
    }

    pub(crate) fn get(&self, workspace_path: &str) -> Option<&StoreEntry> {
        self.entries.get(workspace_path)
    }

    pub(crate) fn get_mut(&mut self, workspace_path: &str) -> Option<&mut StoreEntry> {
        self.entries.get_mut(workspace_path)
    }

    /// Detach the entry and stop its timer. Missing paths are ignored.
    ///
    /// The entry still owns its subscriber records, and with them the
    /// observers. Drop it only after the registry lock is released.
    #[must_use = "drop the removed entry outside the registry lock"]
    pub(crate) fn remove(&mut self, workspace_path: &str) -> Option<StoreEntry> {
        let mut entry = self.entries.remove(workspace_path)?;
        entry.timer = None;
        info!(
            event = "core.store.entry_destroyed",
            workspace = workspace_path,
            entry = entry.id.get(),
        );
        Some(entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut StoreEntry> {
        self.entries.values_mut()
    }
}
