//! Filesystem watcher for workspace trees.
//!
//! Bridges `notify` events into tokio, absorbs bursts, and publishes one
//! invalidation per workspace so the store refetches without waiting for
//! the next poll tick.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};
use wtstatus_core::InvalidationBus;

/// Decides which events can change the working-tree status.
#[derive(Debug, Clone)]
pub struct EventFilter {
    ignored: Vec<PathBuf>,
}

impl EventFilter {
    /// Git object storage, reflogs and the reserved internal directory are noise.
    pub fn new(root: &Path, internal_dir: &str) -> Self {
        Self {
            ignored: vec![
                root.join(".git").join("objects"),
                root.join(".git").join("logs"),
                root.join(internal_dir),
            ],
        }
    }

    pub fn is_relevant(&self, event: &Event) -> bool {
        let is_relevant_kind = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        );

        is_relevant_kind && event.paths.iter().any(|p| !self.is_ignored(p))
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.iter().any(|dir| path.starts_with(dir))
    }
}

/// Recursive watch on one workspace. Dropping it stops the forwarding task.
pub struct WorkspaceWatcher {
    /// The underlying notify watcher. Must be kept alive.
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Start watching `workspace`. Must be called inside a tokio runtime.
    ///
    /// Returns `None` if the watch cannot be registered; polling still
    /// covers the workspace in that case.
    pub fn start(
        workspace: &str,
        filter: EventFilter,
        bus: InvalidationBus,
        debounce: Duration,
    ) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = match notify::recommended_watcher(
            move |res: Result<Event, notify::Error>| {
                // Receiver gone means the forwarding task already stopped.
                let _ = tx.send(res);
            },
        ) {
            Ok(w) => w,
            Err(e) => {
                warn!(
                    event = "cli.watcher.create_failed",
                    workspace = workspace,
                    error = %e,
                    "File watcher unavailable - relying on polling"
                );
                return None;
            }
        };

        if let Err(e) = watcher.watch(Path::new(workspace), RecursiveMode::Recursive) {
            warn!(
                event = "cli.watcher.watch_failed",
                workspace = workspace,
                error = %e,
                "Cannot watch workspace - relying on polling"
            );
            return None;
        }

        info!(event = "cli.watcher.started", workspace = workspace);

        tokio::spawn(forward_events(
            rx,
            workspace.to_string(),
            filter,
            bus,
            debounce,
        ));

        Some(Self { _watcher: watcher })
    }
}

/// Publish one invalidation per burst of relevant events.
///
/// A burst ends once no event arrives for `debounce`. Exits when the
/// notify side hangs up.
async fn forward_events(
    mut rx: UnboundedReceiver<Result<Event, notify::Error>>,
    workspace: String,
    filter: EventFilter,
    bus: InvalidationBus,
    debounce: Duration,
) {
    while let Some(received) = rx.recv().await {
        match received {
            Ok(event) if filter.is_relevant(&event) => {
                debug!(
                    event = "cli.watcher.event_detected",
                    kind = ?event.kind,
                    paths = ?event.paths
                );
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(event = "cli.watcher.event_error", workspace = %workspace, error = %e);
                continue;
            }
        }

        let mut closed = false;
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }

        debug!(event = "cli.watcher.invalidated", workspace = %workspace);
        bus.publish(workspace.clone());

        if closed {
            break;
        }
    }

    debug!(event = "cli.watcher.stopped", workspace = %workspace);
}
