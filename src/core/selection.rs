use std::hash::Hash;

use indexmap::IndexSet;

use crate::core::{ChangeRef, NodeKey};

/// Selection state over the rows of one projection.
///
/// Every mutator reports whether the selection actually changed; a `true`
/// return is the model's "selection changed" notification and bumps
/// [`SelectionModel::revision`].
pub trait SelectionModel {
    type Row;

    fn single_select(&self) -> bool;
    fn is_selected(&self, row: &Self::Row) -> bool;
    fn selected(&self) -> Vec<Self::Row>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a row. In single-select mode this replaces the prior selection.
    fn select(&mut self, row: Self::Row) -> bool;
    fn deselect(&mut self, row: &Self::Row) -> bool;
    fn toggle(&mut self, row: Self::Row) -> bool;
    /// Replaces the whole selection in one step, raising at most one notification.
    fn replace(&mut self, rows: Vec<Self::Row>) -> bool;
    fn clear(&mut self) -> bool;

    fn revision(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct RowSelection<K> {
    rows: IndexSet<K>,
    single_select: bool,
    revision: u64,
}

/// Tree mode: rows are nodes, folders included.
pub type TreeSelection = RowSelection<NodeKey>;
/// List and grid modes: rows are the records themselves.
pub type FlatSelection = RowSelection<ChangeRef>;

impl<K: Hash + Eq + Clone> RowSelection<K> {
    #[must_use]
    pub fn new(single_select: bool) -> Self {
        Self {
            rows: IndexSet::new(),
            single_select,
            revision: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.rows.iter()
    }

    fn changed(&mut self, changed: bool) -> bool {
        if changed {
            self.revision += 1;
        }
        changed
    }
}

impl<K: Hash + Eq + Clone> SelectionModel for RowSelection<K> {
    type Row = K;

    fn single_select(&self) -> bool {
        self.single_select
    }

    fn is_selected(&self, row: &K) -> bool {
        self.rows.contains(row)
    }

    fn selected(&self) -> Vec<K> {
        self.rows.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn select(&mut self, row: K) -> bool {
        if self.single_select {
            if self.rows.len() == 1 && self.rows.contains(&row) {
                return false;
            }
            self.rows.clear();
            self.rows.insert(row);
            return self.changed(true);
        }
        let inserted = self.rows.insert(row);
        self.changed(inserted)
    }

    fn deselect(&mut self, row: &K) -> bool {
        let removed = self.rows.shift_remove(row);
        self.changed(removed)
    }

    fn toggle(&mut self, row: K) -> bool {
        if self.rows.contains(&row) {
            self.deselect(&row)
        } else {
            self.select(row)
        }
    }

    fn replace(&mut self, rows: Vec<K>) -> bool {
        let mut next: IndexSet<K> = rows.into_iter().collect();
        if self.single_select {
            next.truncate(1);
        }
        if next == self.rows {
            return false;
        }
        self.rows = next;
        self.changed(true)
    }

    fn clear(&mut self) -> bool {
        let had_rows = !self.rows.is_empty();
        self.rows.clear();
        self.changed(had_rows)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
