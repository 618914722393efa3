use std::fmt;

use git2::Delta;

/// Kind of change reported for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChange,
    Conflicted,
}

impl ChangeKind {
    /// `None` for deltas that are not changes (unmodified, ignored, unreadable).
    pub fn from_delta(delta: Delta) -> Option<Self> {
        match delta {
            Delta::Added | Delta::Untracked => Some(ChangeKind::Added),
            Delta::Modified => Some(ChangeKind::Modified),
            Delta::Deleted => Some(ChangeKind::Deleted),
            Delta::Renamed => Some(ChangeKind::Renamed),
            Delta::Copied => Some(ChangeKind::Copied),
            Delta::Typechange => Some(ChangeKind::TypeChange),
            Delta::Conflicted => Some(ChangeKind::Conflicted),
            Delta::Unmodified | Delta::Ignored | Delta::Unreadable => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Copied => "copied",
            ChangeKind::TypeChange => "typechange",
            ChangeKind::Conflicted => "conflicted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
