use chrono::Local;
use unicode_width::UnicodeWidthStr;

use wtstatus_core::{GitStatusChange, GitStatusSnapshot};

use crate::color;

/// Column layout for a list of changes.
pub struct ChangeTable {
    status_width: usize,
    additions_width: usize,
    deletions_width: usize,
}

impl ChangeTable {
    pub fn new(changes: &[GitStatusChange]) -> Self {
        // Minimum widths = header label lengths
        let mut status_width = "Status".len();
        let mut additions_width = "Add".len();
        let mut deletions_width = "Del".len();

        for change in changes {
            status_width = status_width.max(display_width(&change.status));
            additions_width = additions_width.max(display_width(&additions(change)));
            deletions_width = deletions_width.max(display_width(&deletions(change)));
        }

        Self {
            status_width,
            additions_width,
            deletions_width,
        }
    }

    /// Header plus one line per change.
    pub fn render(&self, changes: &[GitStatusChange]) -> Vec<String> {
        let mut lines = Vec::with_capacity(changes.len() + 1);
        lines.push(self.header_row());
        lines.extend(changes.iter().map(|change| self.format_row(change)));
        lines
    }

    fn header_row(&self) -> String {
        format!(
            "  {}  {}  {}  {}  {}",
            color::bold(&pad("Status", self.status_width)),
            color::bold(&pad_left("Add", self.additions_width)),
            color::bold(&pad_left("Del", self.deletions_width)),
            color::bold("S"),
            color::bold("Path"),
        )
    }

    fn format_row(&self, change: &GitStatusChange) -> String {
        let staged = if change.is_staged { "●" } else { " " };
        format!(
            "  {}  {}  {}  {}  {}",
            color::change_kind(&pad(&change.status, self.status_width)),
            color::added(&pad_left(&additions(change), self.additions_width)),
            color::removed(&pad_left(&deletions(change), self.deletions_width)),
            color::added(staged),
            change.path,
        )
    }
}

fn additions(change: &GitStatusChange) -> String {
    format!("+{}", change.additions)
}

fn deletions(change: &GitStatusChange) -> String {
    format!("-{}", change.deletions)
}

/// One-line state of a snapshot: loading, error, clean, or totals.
pub fn summary_line(snapshot: &GitStatusSnapshot) -> String {
    if snapshot.is_loading {
        return color::changed("loading…");
    }
    if let Some(ref error) = snapshot.error {
        return color::removed(&format!("error: {}", error));
    }
    if snapshot.last_updated.is_none() {
        return color::muted("not fetched yet");
    }
    if !snapshot.has_changes() {
        return color::muted("clean");
    }

    let files = snapshot.changes.len();
    format!(
        "{} {} changed, {} {}",
        files,
        if files == 1 { "file" } else { "files" },
        color::added(&format!("+{}", snapshot.total_additions())),
        color::removed(&format!("-{}", snapshot.total_deletions())),
    )
}

/// Workspace heading, summary and, when there is something to show, the table.
pub fn render_snapshot(snapshot: &GitStatusSnapshot) -> String {
    let updated = snapshot.last_updated.map_or_else(String::new, |at| {
        color::muted(&format!(
            " (updated {})",
            at.with_timezone(&Local).format("%H:%M:%S")
        ))
    });

    let mut lines = vec![format!(
        "{}  {}{}",
        color::accent(&snapshot.workspace_path),
        summary_line(snapshot),
        updated
    )];
    if snapshot.has_changes() {
        lines.extend(ChangeTable::new(&snapshot.changes).render(&snapshot.changes));
    }
    lines.join("\n")
}

/// Compute the terminal display width of a string.
///
/// Wide characters (CJK, emoji) count as 2 columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string on the right to a minimum display width without truncating.
pub(crate) fn pad(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(min_width - width))
    }
}

/// Pad a string on the left, for right-aligned numeric columns.
pub(crate) fn pad_left(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(min_width - width), s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn change(path: &str, status: &str, additions: u64, deletions: u64) -> GitStatusChange {
        GitStatusChange {
            path: path.to_string(),
            status: status.to_string(),
            additions,
            deletions,
            is_staged: false,
            diff: None,
        }
    }

    #[test]
    fn test_pad_shorter_than_width() {
        assert_eq!(pad("hi", 5), "hi   ");
    }

    #[test]
    fn test_pad_exact_width() {
        assert_eq!(pad("hello", 5), "hello");
    }

    #[test]
    fn test_pad_left_right_aligns() {
        assert_eq!(pad_left("+3", 4), "  +3");
        assert_eq!(pad_left("+1234", 4), "+1234");
    }

    #[test]
    fn test_display_width_counts_wide_characters() {
        assert_eq!(display_width("文件"), 4);
        assert_eq!(pad("文件", 6), "文件  ");
    }

    #[test]
    fn test_widths_follow_longest_value() {
        let changes = vec![
            change("a.rs", "typechange", 12345, 0),
            change("b.rs", "added", 1, 0),
        ];
        let table = ChangeTable::new(&changes);
        assert_eq!(table.status_width, "typechange".len());
        assert_eq!(table.additions_width, "+12345".len());
        assert_eq!(table.deletions_width, "Del".len());
    }

    #[test]
    fn test_render_has_header_and_one_row_per_change() {
        let changes = vec![
            change("src/lib.rs", "modified", 3, 1),
            change("README.md", "added", 10, 0),
        ];
        let lines = ChangeTable::new(&changes).render(&changes);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Status"));
        assert!(lines[1].ends_with("src/lib.rs"));
        assert!(lines[2].ends_with("README.md"));
    }

    #[test]
    fn test_summary_line_states() {
        let empty = GitStatusSnapshot::empty("/repo");
        assert!(summary_line(&empty).contains("not fetched yet"));
        assert!(summary_line(&empty.to_loading()).contains("loading"));

        let failed = GitStatusSnapshot::failed("/repo", "ECONNRESET", Utc::now());
        assert!(summary_line(&failed).contains("error: ECONNRESET"));

        let clean = GitStatusSnapshot::loaded("/repo", Vec::new(), Utc::now());
        assert!(summary_line(&clean).contains("clean"));
    }

    #[test]
    fn test_summary_line_totals() {
        let snapshot = GitStatusSnapshot::loaded(
            "/repo",
            vec![change("a.rs", "modified", 3, 1), change("b.rs", "added", 10, 0)],
            Utc::now(),
        );
        let line = summary_line(&snapshot);
        assert!(line.contains("2 files changed"));
        assert!(line.contains("+13"));
        assert!(line.contains("-1"));
    }

    #[test]
    fn test_render_snapshot_without_changes_is_one_line() {
        let snapshot = GitStatusSnapshot::loaded("/repo", Vec::new(), Utc::now());
        let rendered = render_snapshot(&snapshot);
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("/repo"));
    }
}
