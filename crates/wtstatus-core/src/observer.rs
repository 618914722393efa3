//! Observer interface and the per-store delivery queue.
//!
//! Publishes are enqueued in registry-lock order and drained by a single
//! dispatcher task, so every observer sees snapshots in publish order and
//! may call back into the store from `notify`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{GitStatusSnapshot, SubscriberId};

/// Receives every snapshot published for the subscribed path.
///
/// Runs on the store's dispatcher task. Keep it short; hand heavy work off
/// to a channel. Panics are caught and logged.
///
/// Every observer of a store shares one unbounded delivery queue, so a
/// stalled observer delays all paths and the queue grows until it returns.
/// Each time the backlog crosses a multiple of 1024 a
/// `core.observer.backlog` warning is logged.
pub trait StatusObserver: Send + Sync + 'static {
    fn notify(&self, snapshot: &Arc<GitStatusSnapshot>);
}

impl<F> StatusObserver for F
where
    F: Fn(&Arc<GitStatusSnapshot>) + Send + Sync + 'static,
{
    fn notify(&self, snapshot: &Arc<GitStatusSnapshot>) {
        self(snapshot)
    }
}

/// Observer that forwards snapshots into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Arc<GitStatusSnapshot>>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Arc<GitStatusSnapshot>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusObserver for ChannelObserver {
    fn notify(&self, snapshot: &Arc<GitStatusSnapshot>) {
        // Receiver gone means the consumer stopped listening.
        let _ = self.tx.send(Arc::clone(snapshot));
    }
}

/// One queued notification.
pub(crate) struct Delivery {
    pub(crate) subscriber: SubscriberId,
    /// Cleared when the subscriber is removed; stale deliveries are skipped.
    pub(crate) alive: Arc<AtomicBool>,
    pub(crate) observer: Arc<dyn StatusObserver>,
    pub(crate) snapshot: Arc<GitStatusSnapshot>,
}

impl Delivery {
    fn deliver(self) {
        if !self.alive.load(Ordering::Acquire) {
            return;
        }
        let observer = self.observer;
        let snapshot = self.snapshot;
        if catch_unwind(AssertUnwindSafe(|| observer.notify(&snapshot))).is_err() {
            warn!(
                event = "core.observer.panicked",
                subscriber = %self.subscriber,
                workspace = %snapshot.workspace_path,
            );
        }
    }
}

/// Backlog size at which (and at each multiple of which) a warning is logged.
const BACKLOG_WARN_THRESHOLD: usize = 1024;

/// Sending half of the delivery queue, tracking how many deliveries are
/// queued but not yet handed to their observer.
#[derive(Clone)]
pub(crate) struct DeliverySender {
    tx: mpsc::UnboundedSender<Delivery>,
    depth: Arc<AtomicUsize>,
}

impl DeliverySender {
    fn channel() -> (Self, mpsc::UnboundedReceiver<Delivery>, Arc<AtomicUsize>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));
        let sender = Self {
            tx,
            depth: Arc::clone(&depth),
        };
        (sender, rx, depth)
    }

    pub(crate) fn send(&self, delivery: Delivery) {
        let depth = self.depth.fetch_add(1, Ordering::AcqRel) + 1;
        if depth % BACKLOG_WARN_THRESHOLD == 0 {
            warn!(
                event = "core.observer.backlog",
                queued = depth,
                workspace = %delivery.snapshot.workspace_path,
                "Observers are not keeping up with published snapshots"
            );
        }
        // Dispatcher gone means the runtime is shutting down.
        if self.tx.send(delivery).is_err() {
            self.depth.fetch_sub(1, Ordering::AcqRel);
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }
}

/// Start the dispatcher. It exits once every sender is dropped.
pub(crate) fn spawn_dispatcher(runtime: &Handle) -> DeliverySender {
    let (tx, mut rx, depth) = DeliverySender::channel();
    runtime.spawn(async move {
        while let Some(delivery) = rx.recv().await {
            delivery.deliver();
            depth.fetch_sub(1, Ordering::AcqRel);
        }
    });
    tx
}
