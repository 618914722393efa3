//! # wtstatus-core
//!
//! Shared, deduplicating cache of working-tree status per workspace path.
//!
//! Many observers subscribe to the same path; the store runs at most one
//! provider call per path at a time, polls at the fastest interval any
//! active observer asked for, and stops all work while hidden or unwatched.

pub mod errors;
pub mod filter;
pub mod logging;
pub mod observer;
pub mod provider;
pub mod signals;
pub mod store;
pub mod types;

pub use errors::{ProviderError, StoreError};
pub use filter::{ReservedPaths, normalize_changes};
pub use observer::{ChannelObserver, StatusObserver};
pub use provider::{ChangeRecord, StatusProvider, StatusResponse};
pub use signals::{Invalidation, InvalidationBus, VisibilitySignal};
pub use store::{StatusStore, StoreSettings, Subscription};
pub use types::{GitStatusChange, GitStatusSnapshot, SubscribeOptions, SubscriberId};

// Re-export logging initialization
pub use logging::init_logging;
