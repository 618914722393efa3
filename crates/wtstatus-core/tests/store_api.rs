//! Integration tests for the public store API on a multi-threaded runtime.
//!
//! These drive real timers and real task scheduling; the provider sleeps
//! briefly so that overlapping triggers actually overlap.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use wtstatus_core::{
    ChangeRecord, ChannelObserver, InvalidationBus, ProviderError, StatusProvider, StatusResponse,
    StatusStore, StoreSettings, SubscribeOptions, VisibilitySignal,
};

/// Records how many calls overlap.
#[derive(Default)]
struct ProbeProvider {
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

#[async_trait]
impl StatusProvider for ProbeProvider {
    async fn get_status(&self, workspace_path: &str) -> Result<StatusResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(StatusResponse::ok(vec![
            ChangeRecord::new(format!("{}.rs", workspace_path.trim_start_matches('/')), "added")
                .with_counts(10, 0),
        ]))
    }
}

fn build(provider: Arc<ProbeProvider>) -> (StatusStore, VisibilitySignal, InvalidationBus) {
    let visibility = VisibilitySignal::default();
    let bus = InvalidationBus::default();
    let store = StatusStore::new(provider, StoreSettings::default(), &visibility, &bus).unwrap();
    (store, visibility, bus)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_fetch_at_a_time_per_path() {
    let provider = Arc::new(ProbeProvider::default());
    let (store, _visibility, bus) = build(Arc::clone(&provider));

    let mut receivers = Vec::new();
    let mut subscriptions = Vec::new();
    for _ in 0..8 {
        let (observer, rx) = ChannelObserver::new();
        subscriptions.push(store.subscribe("/repo", observer, SubscribeOptions::new()));
        receivers.push(rx);
    }
    assert_eq!(store.entry_count(), 1);
    assert_eq!(store.subscriber_count("/repo"), 8);

    for _ in 0..50 {
        bus.publish("/repo");
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(provider.max_running.load(Ordering::SeqCst), 1);
    assert!(provider.calls.load(Ordering::SeqCst) >= 2);

    let snapshot = store.get_snapshot("/repo");
    assert_eq!(snapshot.changes.len(), 1);
    assert_eq!(snapshot.total_additions(), 10);
    assert!(!snapshot.is_loading);

    // Every observer saw the same final snapshot.
    for rx in &mut receivers {
        let mut last = None;
        while let Ok(s) = rx.try_recv() {
            last = Some(s);
        }
        assert_eq!(last.unwrap().changes, snapshot.changes);
    }

    drop(subscriptions);
    assert_eq!(store.entry_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_one_shot_refreshes_leave_no_entries() {
    let provider = Arc::new(ProbeProvider::default());
    let (store, _visibility, _bus) = build(Arc::clone(&provider));

    let mut handles = Vec::new();
    for path in ["/alpha", "/beta", "/gamma"] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.refresh_git_status(path, true).await
        }));
    }

    for handle in handles {
        let snapshot = handle.await.unwrap();
        assert_eq!(snapshot.changes.len(), 1);
        assert!(snapshot.error.is_none());
    }
    assert_eq!(store.entry_count(), 0);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_first_snapshot_arrives_through_channel() {
    let provider = Arc::new(ProbeProvider::default());
    let (store, _visibility, _bus) = build(provider);
    let (observer, mut rx) = ChannelObserver::new();

    let _sub = store.subscribe("/repo", observer, SubscribeOptions::passive());

    let first = rx.recv().await.unwrap();
    assert!(first.changes.is_empty());

    let loaded = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = rx.recv().await.unwrap();
            if snapshot.last_updated.is_some() {
                return snapshot;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(loaded.changes[0].path, "repo.rs");
    assert!(!store.is_polling("/repo"));
}
