//! The status store: one cache entry per workspace path, shared by every
//! subscriber of that path, with deduplicated fetches and adaptive polling.

mod fetch;
mod gate;
mod registry;
mod scheduler;
mod subscription;

pub use subscription::Subscription;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wtstatus_config::StatusConfig;

use crate::errors::StoreError;
use crate::filter::ReservedPaths;
use crate::observer::{DeliverySender, StatusObserver, spawn_dispatcher};
use crate::provider::StatusProvider;
use crate::signals::{InvalidationBus, VisibilitySignal};
use crate::types::{GitStatusSnapshot, SubscribeOptions, SubscriberId};
use registry::{Registry, SubscriberRecord};

/// Tunables resolved from [`StatusConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Interval for subscribers that do not ask for one.
    pub default_poll_interval: Duration,
    /// Requested intervals below this are raised to it.
    pub min_poll_interval: Duration,
    pub reserved: ReservedPaths,
}

impl StoreSettings {
    pub fn from_config(config: &StatusConfig) -> Self {
        Self {
            default_poll_interval: Duration::from_millis(config.store.default_poll_interval_ms()),
            min_poll_interval: Duration::from_millis(config.store.min_poll_interval_ms()),
            reserved: ReservedPaths::from_config(&config.filter),
        }
    }

    pub fn clamp_interval(&self, interval: Duration) -> Duration {
        interval.max(self.min_poll_interval)
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from_config(&StatusConfig::default())
    }
}

pub(crate) struct StoreInner {
    state: Mutex<Registry>,
    provider: Arc<dyn StatusProvider>,
    settings: StoreSettings,
    runtime: Handle,
    deliveries: DeliverySender,
    visibility: VisibilitySignal,
    invalidations: InvalidationBus,
    /// Parent of every timer token; stops listeners when the store goes away.
    shutdown: CancellationToken,
}

impl StoreInner {
    /// Never held across an `.await`.
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Listeners go up together with the first entry.
    fn prepare_entry(self: &Arc<Self>, registry: &mut Registry, workspace_path: &str) {
        if !registry.contains(workspace_path) {
            self.ensure_listeners(registry);
        }
    }

    /// Observers may own subscriptions of their own, so removed records and
    /// entries are dropped only after the lock is released.
    fn remove_subscriber(self: &Arc<Self>, workspace_path: &str, id: SubscriberId) {
        let (removed, dead_entry, ticket) = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            let visible = registry.visible;
            let Some(entry) = registry.get_mut(workspace_path) else {
                return;
            };
            let Some(removed) = entry.subscribers.remove(&id) else {
                return;
            };
            debug!(
                event = "core.store.unsubscribed",
                workspace = workspace_path,
                subscriber = %id,
                remaining = entry.subscribers.len(),
            );
            if entry.subscribers.is_empty() {
                (removed, registry.remove(workspace_path), None)
            } else {
                let ticket = self.recompute(entry, visible);
                (removed, None, ticket)
            }
        };
        drop(removed);
        drop(dead_entry);
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }

    fn update_subscriber(
        self: &Arc<Self>,
        workspace_path: &str,
        id: SubscriberId,
        update: impl FnOnce(&mut SubscriberRecord) -> bool,
    ) {
        let ticket = {
            let mut guard = self.lock();
            let registry = &mut *guard;
            let visible = registry.visible;
            let Some(entry) = registry.get_mut(workspace_path) else {
                return;
            };
            let Some(record) = entry.subscribers.get_mut(&id) else {
                return;
            };
            if !update(record) {
                return;
            }
            self.recompute(entry, visible)
        };
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Shared, deduplicating cache of working-tree status per workspace path.
///
/// Cheap to clone; clones share the same registry. Must be created inside a
/// tokio runtime, which then hosts the store's timers, fetches and listeners.
#[derive(Clone)]
pub struct StatusStore {
    inner: Arc<StoreInner>,
}

impl StatusStore {
    pub fn new(
        provider: Arc<dyn StatusProvider>,
        settings: StoreSettings,
        visibility: &VisibilitySignal,
        invalidations: &InvalidationBus,
    ) -> Result<Self, StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let deliveries = spawn_dispatcher(&runtime);

        let inner = StoreInner {
            state: Mutex::new(Registry::new(visibility.is_visible())),
            provider,
            settings,
            runtime,
            deliveries,
            visibility: visibility.clone(),
            invalidations: invalidations.clone(),
            shutdown: CancellationToken::new(),
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.inner.settings
    }

    /// Register `observer` for `workspace_path`.
    ///
    /// The observer first receives the entry's current snapshot, then every
    /// later publish. An empty path yields an inert subscription.
    pub fn subscribe(
        &self,
        workspace_path: impl Into<String>,
        observer: impl StatusObserver,
        options: SubscribeOptions,
    ) -> Subscription {
        let workspace_path = workspace_path.into();
        if workspace_path.is_empty() {
            return Subscription::inert();
        }

        let inner = &self.inner;
        let is_active = options.is_active.unwrap_or(true);
        let poll_interval = inner
            .settings
            .clamp_interval(options.poll_interval.unwrap_or(inner.settings.default_poll_interval));
        let record = SubscriberRecord::new(Arc::new(observer), is_active, poll_interval);

        let (id, ticket) = {
            let mut guard = inner.lock();
            let registry = &mut *guard;
            inner.prepare_entry(registry, &workspace_path);
            let visible = registry.visible;
            let id = registry.next_subscriber_id();
            let entry = registry.get_or_create(&workspace_path);
            entry.subscribers.insert(id, record);
            entry.deliver_current(id, &inner.deliveries);

            debug!(
                event = "core.store.subscribed",
                workspace = %workspace_path,
                subscriber = %id,
                active = is_active,
                interval_ms = poll_interval.as_millis() as u64,
            );
            (id, inner.recompute(entry, visible))
        };

        if let Some(ticket) = ticket {
            inner.spawn_fetch(ticket);
        }
        Subscription::new(self.clone(), workspace_path, id)
    }

    /// Current snapshot, or an empty placeholder when nobody watches the path.
    pub fn get_snapshot(&self, workspace_path: &str) -> Arc<GitStatusSnapshot> {
        self.inner
            .lock()
            .get(workspace_path)
            .map(|entry| Arc::clone(&entry.snapshot))
            .unwrap_or_else(|| Arc::new(GitStatusSnapshot::empty(workspace_path)))
    }

    /// Force one fetch regardless of polling state and wait for its result.
    ///
    /// Creates a transient entry when the path has no subscribers; it is
    /// removed again once the result is published. If a fetch is already in
    /// flight, a follow-up is queued and the current snapshot is returned.
    pub async fn refresh_git_status(
        &self,
        workspace_path: &str,
        show_loading: bool,
    ) -> Arc<GitStatusSnapshot> {
        if workspace_path.is_empty() {
            return Arc::new(GitStatusSnapshot::empty(workspace_path));
        }

        let ticket = {
            let mut guard = self.inner.lock();
            let registry = &mut *guard;
            self.inner.prepare_entry(registry, workspace_path);
            let entry = registry.get_or_create(workspace_path);
            self.inner.begin_fetch(entry, show_loading)
        };

        let Some(ticket) = ticket else {
            return self.get_snapshot(workspace_path);
        };
        match self.inner.spawn_fetch(ticket).await {
            Ok(snapshot) => snapshot,
            Err(_) => self.get_snapshot(workspace_path),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn subscriber_count(&self, workspace_path: &str) -> usize {
        self.inner
            .lock()
            .get(workspace_path)
            .map_or(0, |entry| entry.subscribers.len())
    }

    /// Whether a poll timer is armed for the path.
    pub fn is_polling(&self, workspace_path: &str) -> bool {
        self.poll_interval(workspace_path).is_some()
    }

    /// Interval of the armed poll timer, if any.
    pub fn poll_interval(&self, workspace_path: &str) -> Option<Duration> {
        self.inner
            .lock()
            .get(workspace_path)
            .and_then(|entry| entry.poll_interval())
    }

    /// The visibility flag as last applied by the store.
    pub fn is_visible(&self) -> bool {
        let registry = self.inner.lock();
        if registry.listeners.visibility {
            registry.visible
        } else {
            self.inner.visibility.is_visible()
        }
    }
}

impl std::fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStore")
            .field("entries", &self.entry_count())
            .field("settings", &self.inner.settings)
            .finish()
    }
}
