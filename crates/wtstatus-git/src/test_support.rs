//! Test helpers for creating git repositories with tracked and staged files.
//!
//! These functions wrap git2 operations so test code outside the `status/`
//! module doesn't need to import git2 directly.

use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};

use crate::errors::GitError;

fn signature(repo: &Repository) -> Result<Signature<'static>, GitError> {
    match repo.signature() {
        Ok(sig) => Ok(sig),
        Err(_) => Ok(Signature::now("Test", "test@test.com")?),
    }
}

/// Initialize a new git repository at the given path with an empty initial commit.
pub fn init_repo_with_commit(path: &Path) -> Result<(), GitError> {
    let repo = Repository::init(path)?;
    let sig = signature(&repo)?;
    let tree_id = repo.index()?.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])?;
    Ok(())
}

/// Write `contents` to `relative` inside the repository, creating parent dirs.
pub fn write_file(repo_path: &Path, relative: &str, contents: &str) -> Result<(), GitError> {
    let target = repo_path.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, contents)?;
    Ok(())
}

/// Stage one path (the `git add <path>` equivalent).
pub fn stage(repo_path: &Path, relative: &str) -> Result<(), GitError> {
    let repo = Repository::open(repo_path)?;
    let mut index = repo.index()?;
    index.add_path(Path::new(relative))?;
    index.write()?;
    Ok(())
}

/// Stage everything and commit on top of HEAD.
pub fn commit_all(repo_path: &Path, message: &str) -> Result<(), GitError> {
    let repo = Repository::open(repo_path)?;
    let mut index = repo.index()?;
    index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"], None)?;
    index.write()?;

    let tree = repo.find_tree(index.write_tree()?)?;
    let sig = signature(&repo)?;
    let parent = repo.head()?.peel_to_commit()?;
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
    Ok(())
}
