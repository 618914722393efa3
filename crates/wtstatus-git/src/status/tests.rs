use tempfile::TempDir;

use super::*;
use crate::errors::GitError;
use crate::test_support::{commit_all, init_repo_with_commit, stage, write_file};

fn repo_with_file(relative: &str, contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    write_file(dir.path(), relative, contents).unwrap();
    commit_all(dir.path(), "add file").unwrap();
    dir
}

#[test]
fn test_clean_repo_has_no_changes() {
    let dir = repo_with_file("a.txt", "one\n");
    let changes = collect_changes(dir.path(), true).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_untracked_file_is_added_with_line_count() {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    write_file(dir.path(), "new.txt", "one\ntwo\n").unwrap();

    let changes = collect_changes(dir.path(), false).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path, "new.txt");
    assert_eq!(changes[0].status, "added");
    assert_eq!(changes[0].additions, Some(2));
    assert_eq!(changes[0].deletions, Some(0));
    assert_eq!(changes[0].is_staged, Some(false));
    assert!(changes[0].diff.is_none());
}

#[test]
fn test_non_utf8_file_still_has_a_diff() {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    std::fs::write(dir.path().join("latin1.txt"), b"caf\xe9\nna\xefve\n").unwrap();

    let changes = collect_changes(dir.path(), true).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].additions, Some(2));
    let diff = changes[0].diff.as_deref().unwrap();
    assert!(diff.contains("latin1.txt"));
    assert!(diff.contains("+caf\u{FFFD}"));
}

#[test]
fn test_untracked_directories_are_expanded() {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    write_file(dir.path(), "dir/sub/file.txt", "x\n").unwrap();

    let changes = collect_changes(dir.path(), false).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path, "dir/sub/file.txt");
}

#[test]
fn test_unstaged_modification() {
    let dir = repo_with_file("a.txt", "one\n");
    write_file(dir.path(), "a.txt", "uno\n").unwrap();

    let changes = collect_changes(dir.path(), true).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, "modified");
    assert_eq!(changes[0].additions, Some(1));
    assert_eq!(changes[0].deletions, Some(1));
    assert_eq!(changes[0].is_staged, Some(false));

    let diff = changes[0].diff.as_deref().unwrap();
    assert!(diff.contains("-one"));
    assert!(diff.contains("+uno"));
}

#[test]
fn test_staged_new_file() {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    write_file(dir.path(), "staged.txt", "a\nb\nc\n").unwrap();
    stage(dir.path(), "staged.txt").unwrap();

    let changes = collect_changes(dir.path(), false).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, "added");
    assert_eq!(changes[0].additions, Some(3));
    assert_eq!(changes[0].is_staged, Some(true));
}

#[test]
fn test_staged_and_unstaged_parts_merge_into_one_record() {
    let dir = repo_with_file("a.txt", "one\n");
    write_file(dir.path(), "a.txt", "one\ntwo\n").unwrap();
    stage(dir.path(), "a.txt").unwrap();
    write_file(dir.path(), "a.txt", "one\ntwo\nthree\n").unwrap();

    let changes = collect_changes(dir.path(), true).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, "modified");
    assert_eq!(changes[0].additions, Some(2));
    assert_eq!(changes[0].deletions, Some(0));
    assert_eq!(changes[0].is_staged, Some(true));

    let diff = changes[0].diff.as_deref().unwrap();
    assert!(diff.contains("+two"));
    assert!(diff.contains("+three"));
}

#[test]
fn test_deleted_file() {
    let dir = repo_with_file("gone.txt", "one\ntwo\n");
    std::fs::remove_file(dir.path().join("gone.txt")).unwrap();

    let changes = collect_changes(dir.path(), false).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path, "gone.txt");
    assert_eq!(changes[0].status, "deleted");
    assert_eq!(changes[0].deletions, Some(2));
}

#[test]
fn test_changes_are_sorted_by_path() {
    let dir = TempDir::new().unwrap();
    init_repo_with_commit(dir.path()).unwrap();
    write_file(dir.path(), "b.txt", "b\n").unwrap();
    write_file(dir.path(), "a.txt", "a\n").unwrap();
    write_file(dir.path(), "c.txt", "c\n").unwrap();

    let paths: Vec<_> = collect_changes(dir.path(), false)
        .unwrap()
        .into_iter()
        .map(|c| c.path)
        .collect();
    assert_eq!(paths, vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn test_unborn_head_reports_staged_files() {
    let dir = TempDir::new().unwrap();
    git2::Repository::init(dir.path()).unwrap();
    write_file(dir.path(), "first.txt", "hello\n").unwrap();
    stage(dir.path(), "first.txt").unwrap();

    let changes = collect_changes(dir.path(), false).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].status, "added");
    assert_eq!(changes[0].is_staged, Some(true));
}

#[test]
fn test_plain_directory_is_not_a_repository() {
    let dir = TempDir::new().unwrap();
    let result = collect_changes(dir.path(), false);
    assert!(matches!(result, Err(GitError::RepositoryNotFound { .. })));
}

#[test]
fn test_missing_path_is_invalid() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let result = collect_changes(&missing, false);
    assert!(matches!(result, Err(GitError::InvalidPath { .. })));
}
