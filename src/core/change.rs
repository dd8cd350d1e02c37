use std::{
    hash::{Hash, Hasher},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::core::{ChangeViewError, Result};

/* ============================== Change records ============================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChangeState {
    #[default]
    None,
    Modified,
    TypeChanged,
    Added,
    Deleted,
    Renamed,
    Copied,
    Untracked,
    Conflicted,
}

impl ChangeState {
    /// Maps a porcelain status letter (`X` or `Y` of `XY path`).
    pub fn from_code(code: char) -> Result<Self> {
        let state = match code {
            ' ' | '.' => Self::None,
            'M' => Self::Modified,
            'T' => Self::TypeChanged,
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            '?' => Self::Untracked,
            'U' => Self::Conflicted,
            other => return Err(ChangeViewError::UnknownStatus(other)),
        };
        Ok(state)
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "Unknown",
            Self::Modified => "Modified",
            Self::TypeChanged => "Type Changed",
            Self::Added => "Added",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
            Self::Copied => "Copied",
            Self::Untracked => "Untracked",
            Self::Conflicted => "Conflict",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConflictReason {
    #[default]
    None,
    BothDeleted,
    AddedByUs,
    DeletedByThem,
    AddedByThem,
    DeletedByUs,
    BothAdded,
    BothModified,
}

impl ConflictReason {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::None => "",
            Self::BothDeleted => "DD",
            Self::AddedByUs => "AU",
            Self::DeletedByThem => "UD",
            Self::AddedByThem => "UA",
            Self::DeletedByUs => "DU",
            Self::BothAdded => "AA",
            Self::BothModified => "UU",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "",
            Self::BothDeleted => "Both deleted",
            Self::AddedByUs => "Added by us",
            Self::DeletedByThem => "Deleted by them",
            Self::AddedByThem => "Added by them",
            Self::DeletedByUs => "Deleted by us",
            Self::BothAdded => "Both added",
            Self::BothModified => "Both modified",
        }
    }

    /// Parses a two-letter conflict marker such as `UU`.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        let reason = match marker {
            "DD" => Self::BothDeleted,
            "AU" => Self::AddedByUs,
            "UD" => Self::DeletedByThem,
            "UA" => Self::AddedByThem,
            "DU" => Self::DeletedByUs,
            "AA" => Self::BothAdded,
            "UU" => Self::BothModified,
            _ => return None,
        };
        Some(reason)
    }
}

/// One changed file. Immutable once shared; the views hold it behind an `Rc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Repository-relative path using forward slashes.
    pub path: String,
    #[serde(default)]
    pub original_path: Option<String>,
    #[serde(default)]
    pub index: ChangeState,
    #[serde(default)]
    pub work_tree: ChangeState,
    #[serde(default)]
    pub conflict: ConflictReason,
}

pub type SharedChange = Rc<ChangeRecord>;

impl ChangeRecord {
    pub fn new(path: impl Into<String>, status: ChangeState) -> Self {
        Self {
            path: path.into(),
            work_tree: status,
            ..Self::default()
        }
    }

    /// Builds a record from a raw status path. Rename/copy sources are split
    /// off `old\tnew` or `old -> new`, and quoted paths are unquoted.
    pub fn with_states(raw_path: &str, index: ChangeState, work_tree: ChangeState) -> Self {
        let mut path = raw_path.to_string();
        let mut original_path = None;

        if index == ChangeState::Renamed || work_tree == ChangeState::Renamed {
            let split = raw_path
                .split_once('\t')
                .or_else(|| raw_path.split_once(" -> "));
            if let Some((from, to)) = split {
                original_path = Some(unquote(from).to_string());
                path = to.to_string();
            }
        }

        Self {
            path: unquote(&path).to_string(),
            original_path,
            index,
            work_tree,
            conflict: ConflictReason::None,
        }
    }

    #[must_use]
    pub fn with_conflict(mut self, reason: ConflictReason) -> Self {
        self.conflict = reason;
        if reason != ConflictReason::None {
            self.work_tree = ChangeState::Conflicted;
        }
        self
    }

    /// Work-tree state when present, otherwise the index state.
    #[must_use]
    pub fn status(&self) -> ChangeState {
        if self.work_tree == ChangeState::None {
            self.index
        } else {
            self.work_tree
        }
    }

    #[must_use]
    pub fn is_conflicted(&self) -> bool {
        self.work_tree == ChangeState::Conflicted
    }

    /// Last path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    #[must_use]
    pub fn shared(self) -> SharedChange {
        Rc::new(self)
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Identity handle for a shared record: two handles are equal only when they
/// point at the same allocation, never when two records merely look alike.
#[derive(Debug, Clone)]
pub struct ChangeRef(pub SharedChange);

impl ChangeRef {
    #[must_use]
    pub fn new(change: &SharedChange) -> Self {
        Self(Rc::clone(change))
    }

    #[must_use]
    pub fn change(&self) -> &SharedChange {
        &self.0
    }
}

impl PartialEq for ChangeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ChangeRef {}

impl Hash for ChangeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

/// Set-wise comparison by identity; order and duplicates are ignored.
#[must_use]
pub fn same_changes(a: &[SharedChange], b: &[SharedChange]) -> bool {
    let left: std::collections::HashSet<ChangeRef> = a.iter().map(ChangeRef::new).collect();
    let right: std::collections::HashSet<ChangeRef> = b.iter().map(ChangeRef::new).collect();
    left == right
}
