//! External signals the store listens to: surface visibility and
//! "something changed at path P" invalidations.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

/// Global "is the consuming surface visible" flag.
///
/// Cloneable; all clones drive the same flag. Only transitions wake the
/// store, setting the current value again is a no-op.
#[derive(Debug, Clone)]
pub struct VisibilitySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl VisibilitySignal {
    pub fn new(visible: bool) -> Self {
        let (tx, _rx) = watch::channel(visible);
        Self { tx: Arc::new(tx) }
    }

    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Live receivers; a store holds one once its first entry exists.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for VisibilitySignal {
    fn default() -> Self {
        Self::new(true)
    }
}

/// "Something changed at this workspace path."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub task_path: String,
}

/// Broadcast channel for invalidation events.
///
/// Thin wrapper over [`tokio::sync::broadcast`]: publishing never blocks,
/// events with no receiver are dropped, lagging receivers skip ahead.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    tx: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    pub const DEFAULT_CAPACITY: usize = 64;

    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, task_path: impl Into<String>) {
        let _ = self.tx.send(Invalidation {
            task_path: task_path.into(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
