use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use serde::{Deserialize, Serialize};

use crate::core::{
    ChangeRef, FlatSelection, FoldState, Node, NodeKey, RowSelection, SelectionModel,
    SharedChange, TreeSelection, ViewSettings, build_tree_with_folds, collect_changes,
    collect_leaves, folded_paths, index_tree, node_at, node_at_mut, visible_rows,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    List,
    Grid,
    #[default]
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Node(NodeKey),
    Change(ChangeRef),
}

/// Renderer-neutral description of one visible row.
#[derive(Debug, Clone)]
pub struct RowView {
    pub key: RowKey,
    pub name: String,
    pub full_path: String,
    pub depth: usize,
    pub is_folder: bool,
    pub expanded: bool,
    pub change: Option<SharedChange>,
    pub selected: bool,
}

/// Visible rows of a projection paired with the selection over them.
pub trait RowSource {
    type Row: Hash + Eq + Clone;

    fn row_count(&self) -> usize;
    fn row(&self, index: usize) -> Option<Self::Row>;
    fn selection(&self) -> &RowSelection<Self::Row>;
    fn selection_mut(&mut self) -> &mut RowSelection<Self::Row>;
}

/* ================================ Tree mode ================================ */

#[derive(Debug, Clone)]
pub struct TreeProjection {
    root: Node,
    index: HashMap<NodeKey, Vec<usize>>,
    rows: Vec<NodeKey>,
    selection: TreeSelection,
}

impl TreeProjection {
    #[must_use]
    pub fn build(changes: &[SharedChange], settings: &ViewSettings, folds: &FoldState) -> Self {
        let root = build_tree_with_folds(changes, settings.expand_all_by_default, folds);
        let index = index_tree(&root);
        let rows = visible_rows(&root);
        Self {
            root,
            index,
            rows,
            selection: TreeSelection::new(settings.single_select),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        let slot = self.index.get(key)?;
        node_at(&self.root, slot)
    }

    #[must_use]
    pub fn visible(&self) -> &[NodeKey] {
        &self.rows
    }

    /// Flips a folder's expansion and recomputes the visible rows. Selection
    /// is left alone, hidden rows stay selected. Returns the new state, or
    /// `None` when `key` is not a folder of this tree.
    pub fn toggle_expanded(&mut self, key: &NodeKey) -> Option<bool> {
        if !key.is_folder {
            return None;
        }
        let slot = self.index.get(key)?;
        let node = node_at_mut(&mut self.root, slot)?;
        node.expanded = !node.expanded;
        let expanded = node.expanded;
        self.rows = visible_rows(&self.root);
        Some(expanded)
    }

    #[must_use]
    pub fn folded_paths(&self) -> HashSet<String> {
        folded_paths(&self.root)
    }

    #[must_use]
    pub fn fold_state(&self) -> FoldState {
        FoldState::capture(&self.root)
    }

    /// Re-applies remembered folds to every folder, the same way a build would.
    pub fn apply_folds(&mut self, folds: &FoldState, expand_all_by_default: bool) {
        fn rec(node: &mut Node, folds: &FoldState, expand: bool) {
            for child in node.children.iter_mut().filter(|c| c.is_folder) {
                child.expanded = folds.is_expanded(&child.full_path, expand);
                rec(child, folds, expand);
            }
        }

        rec(&mut self.root, folds, expand_all_by_default);
        self.rows = visible_rows(&self.root);
    }

    /// Expands each selected row: a leaf yields its change, a folder yields
    /// every change below it. In single-select mode a selected folder yields
    /// only its first change.
    #[must_use]
    pub fn selected_changes(&self) -> Vec<SharedChange> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for key in self.selection.iter() {
            if let Some(node) = self.node(key) {
                collect_changes(node, &mut seen, &mut out);
            }
        }
        if self.selection.single_select() {
            out.truncate(1);
        }
        out
    }

    /// Selects exactly the leaves whose change is in `members`. Folders are
    /// never selected here, even when all their leaves are.
    pub(crate) fn apply_changes(&mut self, members: &HashSet<ChangeRef>) -> bool {
        let mut leaves = Vec::new();
        collect_leaves(&self.root, &mut leaves);
        let rows: Vec<NodeKey> = leaves
            .into_iter()
            .filter(|leaf| {
                leaf.change
                    .as_ref()
                    .is_some_and(|c| members.contains(&ChangeRef::new(c)))
            })
            .map(Node::key)
            .collect();
        self.selection.replace(rows)
    }

    fn row_view(&self, key: &NodeKey) -> Option<RowView> {
        let node = self.node(key)?;
        Some(RowView {
            key: RowKey::Node(key.clone()),
            name: node.name.clone(),
            full_path: node.full_path.clone(),
            depth: node.depth,
            is_folder: node.is_folder,
            expanded: node.expanded,
            change: node.change.clone(),
            selected: self.selection.is_selected(key),
        })
    }
}

impl RowSource for TreeProjection {
    type Row = NodeKey;

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<NodeKey> {
        self.rows.get(index).cloned()
    }

    fn selection(&self) -> &TreeSelection {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut TreeSelection {
        &mut self.selection
    }
}

/* ============================ List and grid modes ============================ */

#[derive(Debug, Clone)]
pub struct FlatProjection {
    changes: Vec<SharedChange>,
    selection: FlatSelection,
}

impl FlatProjection {
    #[must_use]
    pub fn build(changes: &[SharedChange], settings: &ViewSettings) -> Self {
        Self {
            changes: changes.to_vec(),
            selection: FlatSelection::new(settings.single_select),
        }
    }

    #[must_use]
    pub fn changes(&self) -> &[SharedChange] {
        &self.changes
    }

    #[must_use]
    pub fn selected_changes(&self) -> Vec<SharedChange> {
        self.selection.iter().map(|r| SharedChange::clone(r.change())).collect()
    }

    pub(crate) fn apply_changes(&mut self, members: &HashSet<ChangeRef>) -> bool {
        let rows: Vec<ChangeRef> = self
            .changes
            .iter()
            .map(ChangeRef::new)
            .filter(|r| members.contains(r))
            .collect();
        self.selection.replace(rows)
    }

    fn row_view(&self, change: &SharedChange) -> RowView {
        let key = ChangeRef::new(change);
        RowView {
            name: change.file_name().to_string(),
            full_path: change.path.clone(),
            depth: 0,
            is_folder: false,
            expanded: false,
            change: Some(SharedChange::clone(change)),
            selected: self.selection.is_selected(&key),
            key: RowKey::Change(key),
        }
    }
}

impl RowSource for FlatProjection {
    type Row = ChangeRef;

    fn row_count(&self) -> usize {
        self.changes.len()
    }

    fn row(&self, index: usize) -> Option<ChangeRef> {
        self.changes.get(index).map(ChangeRef::new)
    }

    fn selection(&self) -> &FlatSelection {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut FlatSelection {
        &mut self.selection
    }
}

/* ============================ Row-level verbs ============================= */

fn select_only<P: RowSource>(p: &mut P, index: usize) -> bool {
    let Some(row) = p.row(index) else {
        return false;
    };
    p.selection_mut().replace(vec![row])
}

fn toggle_row<P: RowSource>(p: &mut P, index: usize) -> bool {
    let Some(row) = p.row(index) else {
        return false;
    };
    let selection = p.selection_mut();
    if selection.single_select() && !selection.is_selected(&row) {
        return selection.replace(vec![row]);
    }
    selection.toggle(row)
}

fn select_range<P: RowSource>(p: &mut P, anchor: usize, index: usize) -> bool {
    if p.selection().single_select() {
        return select_only(p, index);
    }
    let (lo, hi) = if anchor <= index {
        (anchor, index)
    } else {
        (index, anchor)
    };
    let rows: Vec<P::Row> = (lo..=hi).filter_map(|i| p.row(i)).collect();
    p.selection_mut().replace(rows)
}

fn select_all<P: RowSource>(p: &mut P) -> bool {
    if p.selection().single_select() {
        return false;
    }
    let rows: Vec<P::Row> = (0..p.row_count()).filter_map(|i| p.row(i)).collect();
    p.selection_mut().replace(rows)
}

fn is_row_selected<P: RowSource>(p: &P, index: usize) -> bool {
    p.row(index).is_some_and(|row| p.selection().is_selected(&row))
}

/* =============================== Projection =============================== */

/// The active read model. List and grid share one representation and differ
/// only in how a renderer lays the rows out.
#[derive(Debug, Clone)]
pub enum Projection {
    Tree(TreeProjection),
    List(FlatProjection),
    Grid(FlatProjection),
}

macro_rules! each_projection {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Projection::Tree($p) => $body,
            Projection::List($p) | Projection::Grid($p) => $body,
        }
    };
}

impl Projection {
    #[must_use]
    pub fn build(changes: &[SharedChange], settings: &ViewSettings, folds: &FoldState) -> Self {
        match settings.view_mode {
            ViewMode::Tree => Self::Tree(TreeProjection::build(changes, settings, folds)),
            ViewMode::List => Self::List(FlatProjection::build(changes, settings)),
            ViewMode::Grid => Self::Grid(FlatProjection::build(changes, settings)),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        match self {
            Self::Tree(_) => ViewMode::Tree,
            Self::List(_) => ViewMode::List,
            Self::Grid(_) => ViewMode::Grid,
        }
    }

    #[must_use]
    pub const fn as_tree(&self) -> Option<&TreeProjection> {
        match self {
            Self::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut TreeProjection> {
        match self {
            Self::Tree(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        each_projection!(self, p => p.row_count())
    }

    #[must_use]
    pub fn row_key(&self, index: usize) -> Option<RowKey> {
        match self {
            Self::Tree(t) => t.row(index).map(RowKey::Node),
            Self::List(f) | Self::Grid(f) => f.row(index).map(RowKey::Change),
        }
    }

    #[must_use]
    pub fn row_view(&self, index: usize) -> Option<RowView> {
        match self {
            Self::Tree(t) => t.rows.get(index).and_then(|k| t.row_view(k)),
            Self::List(f) | Self::Grid(f) => f.changes.get(index).map(|c| f.row_view(c)),
        }
    }

    #[must_use]
    pub fn rows(&self) -> Vec<RowView> {
        match self {
            Self::Tree(t) => t.rows.iter().filter_map(|k| t.row_view(k)).collect(),
            Self::List(f) | Self::Grid(f) => f.changes.iter().map(|c| f.row_view(c)).collect(),
        }
    }

    #[must_use]
    pub fn selected_changes(&self) -> Vec<SharedChange> {
        each_projection!(self, p => p.selected_changes())
    }

    #[must_use]
    pub fn selected_row_count(&self) -> usize {
        each_projection!(self, p => p.selection().len())
    }

    #[must_use]
    pub fn selection_revision(&self) -> u64 {
        each_projection!(self, p => p.selection().revision())
    }

    #[must_use]
    pub fn is_row_selected(&self, index: usize) -> bool {
        each_projection!(self, p => is_row_selected(p, index))
    }

    pub(crate) fn apply_changes(&mut self, members: &HashSet<ChangeRef>) -> bool {
        each_projection!(self, p => p.apply_changes(members))
    }

    pub(crate) fn select_only(&mut self, index: usize) -> bool {
        each_projection!(self, p => select_only(p, index))
    }

    pub(crate) fn toggle_row(&mut self, index: usize) -> bool {
        each_projection!(self, p => toggle_row(p, index))
    }

    pub(crate) fn select_range(&mut self, anchor: usize, index: usize) -> bool {
        each_projection!(self, p => select_range(p, anchor, index))
    }

    pub(crate) fn select_all(&mut self) -> bool {
        each_projection!(self, p => select_all(p))
    }

    pub(crate) fn clear_selection(&mut self) -> bool {
        each_projection!(self, p => p.selection_mut().clear())
    }
}
