mod worktree;

pub use worktree::collect_changes;

#[cfg(test)]
mod tests;
