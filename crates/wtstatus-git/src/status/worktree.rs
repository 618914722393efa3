use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use git2::{Diff, DiffFindOptions, DiffOptions, ErrorCode, Patch, Repository, Tree};
use tracing::debug;
use wtstatus_core::ChangeRecord;

use crate::errors::GitError;
use crate::types::ChangeKind;

/// Collect the working-tree status of a repository as one record per path.
///
/// Staged changes (HEAD → index) and unstaged changes (index → workdir,
/// untracked files included) are merged: line counts add up, `is_staged` is
/// set when any part of the change is staged, and the staged kind wins
/// unless the path is conflicted. Records are sorted by path.
///
/// # Errors
///
/// Returns `GitError::InvalidPath` when the path is not a directory,
/// `GitError::RepositoryNotFound` when it is not a repository root, and
/// `GitError::Git2Error` if a diff cannot be computed.
pub fn collect_changes(
    workspace_path: &Path,
    include_diff: bool,
) -> Result<Vec<ChangeRecord>, GitError> {
    if !workspace_path.is_dir() {
        return Err(GitError::InvalidPath {
            path: workspace_path.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let repo = Repository::open(workspace_path).map_err(|e| GitError::RepositoryNotFound {
        path: workspace_path.display().to_string(),
        message: e.message().to_string(),
    })?;

    let head_tree = head_tree(&repo)?;
    let mut merged = BTreeMap::new();

    let mut staged = repo.diff_tree_to_index(head_tree.as_ref(), None, None)?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    staged.find_similar(Some(&mut find))?;
    merge_diff(&staged, true, include_diff, &mut merged)?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    let unstaged = repo.diff_index_to_workdir(None, Some(&mut opts))?;
    merge_diff(&unstaged, false, include_diff, &mut merged)?;

    debug!(
        event = "git.status.collected",
        path = %workspace_path.display(),
        changes = merged.len(),
    );

    Ok(merged.into_values().collect())
}

/// HEAD's tree, or `None` on an unborn branch.
fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_tree()?)),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn merge_diff(
    diff: &Diff<'_>,
    staged: bool,
    include_diff: bool,
    merged: &mut BTreeMap<String, ChangeRecord>,
) -> Result<(), GitError> {
    for (idx, delta) in diff.deltas().enumerate() {
        let Some(kind) = ChangeKind::from_delta(delta.status()) else {
            continue;
        };
        let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
            continue;
        };
        let path = path.to_string_lossy().into_owned();

        let (additions, deletions, text) = match Patch::from_diff(diff, idx)? {
            Some(mut patch) => {
                let (_, additions, deletions) = patch.line_stats()?;
                let text = if include_diff {
                    let buf = patch.to_buf()?;
                    Some(String::from_utf8_lossy(&buf).into_owned())
                } else {
                    None
                };
                (additions as u64, deletions as u64, text)
            }
            // Binary or otherwise unpatchable.
            None => (0, 0, None),
        };

        match merged.entry(path) {
            Entry::Vacant(slot) => {
                let mut record = ChangeRecord::new(slot.key().clone(), kind.as_str())
                    .with_counts(additions, deletions)
                    .staged(staged);
                record.diff = text;
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                record.additions = Some(record.additions.unwrap_or(0) + additions);
                record.deletions = Some(record.deletions.unwrap_or(0) + deletions);
                if staged {
                    record.is_staged = Some(true);
                }
                if kind == ChangeKind::Conflicted {
                    record.status = kind.as_str().to_string();
                }
                if let Some(text) = text {
                    record.diff.get_or_insert_with(String::new).push_str(&text);
                }
            }
        }
    }
    Ok(())
}
