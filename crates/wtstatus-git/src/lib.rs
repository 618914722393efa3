//! # wtstatus-git
//!
//! git2-backed status provider: computes the merged staged and unstaged
//! change list of a working tree.

pub mod errors;
pub mod provider;
pub mod status;
pub mod test_support;
pub mod types;

pub use errors::GitError;
pub use provider::GitStatusProvider;
pub use status::collect_changes;
pub use types::ChangeKind;
