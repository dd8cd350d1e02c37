use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::{ChangeRecord, ChangeState, SharedChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChangeSortMode {
    #[default]
    Path,
    Status,
}

/// Which side of the index a change list describes; status priorities differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusContext {
    #[default]
    Unstaged,
    Staged,
}

/// Natural ordering: runs of digits compare by value, everything else ordinally.
/// Any Unicode numeric character counts as a digit.
#[must_use]
pub fn numeric_compare(a: &str, b: &str) -> Ordering {
    let left = split_digit_runs(a);
    let right = split_digit_runs(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let l_digit = l.starts_with(char::is_numeric);
        let r_digit = r.starts_with(char::is_numeric);
        if l_digit != r_digit {
            return l.cmp(r);
        }

        let ord = if l_digit {
            l.chars().count().cmp(&r.chars().count()).then_with(|| l.cmp(r))
        } else {
            l.cmp(r)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.len().cmp(&b.len())
}

fn split_digit_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;

    for (i, ch) in s.char_indices() {
        let is_digit = ch.is_numeric();
        if prev.is_some_and(|p| p != is_digit) {
            runs.push(&s[start..i]);
            start = i;
        }
        prev = Some(is_digit);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

/// Lower values sort first.
#[must_use]
pub const fn status_sort_priority(change: &ChangeRecord, context: StatusContext) -> u8 {
    match context {
        StatusContext::Unstaged => match change.work_tree {
            ChangeState::Conflicted => 1,
            ChangeState::Modified => 2,
            ChangeState::TypeChanged => 3,
            ChangeState::Deleted => 4,
            ChangeState::Renamed => 5,
            ChangeState::Copied => 6,
            ChangeState::Untracked => 7,
            _ => 10,
        },
        StatusContext::Staged => match change.index {
            ChangeState::Modified => 1,
            ChangeState::TypeChanged => 2,
            ChangeState::Renamed => 3,
            ChangeState::Copied => 4,
            ChangeState::Added => 5,
            ChangeState::Deleted => 6,
            _ => 10,
        },
    }
}

/// Re-sorts a change list before it is handed to a view. Views keep whatever
/// order they are given.
pub fn sort_changes(changes: &mut [SharedChange], mode: ChangeSortMode, context: StatusContext) {
    match mode {
        ChangeSortMode::Path => changes.sort_by(|l, r| numeric_compare(&l.path, &r.path)),
        ChangeSortMode::Status => changes.sort_by(|l, r| {
            status_sort_priority(l, context)
                .cmp(&status_sort_priority(r, context))
                .then_with(|| numeric_compare(&l.path, &r.path))
        }),
    }
}
