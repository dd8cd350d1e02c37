use std::collections::{HashMap, HashSet};

use crate::core::{ChangeRef, SharedChange};

/// A folder or a changed file in a change tree. The synthetic root is a folder
/// with an empty name and path; its children sit at depth 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub full_path: String,
    pub is_folder: bool,
    pub depth: usize,
    pub children: Vec<Node>,
    /// Set on leaves only.
    pub change: Option<SharedChange>,
    pub expanded: bool,
}

/// Row identity inside one tree. A leaf and a folder may share a path, so the
/// kind is part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub path: String,
    pub is_folder: bool,
}

impl NodeKey {
    #[must_use]
    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: true,
        }
    }

    #[must_use]
    pub fn leaf(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
        }
    }
}

impl Node {
    fn root(expanded: bool) -> Self {
        Self {
            name: String::new(),
            full_path: String::new(),
            is_folder: true,
            depth: 0,
            children: Vec::new(),
            change: None,
            expanded,
        }
    }

    fn folder(name: &str, full_path: String, depth: usize, expanded: bool) -> Self {
        Self {
            name: name.to_string(),
            full_path,
            is_folder: true,
            depth,
            children: Vec::new(),
            change: None,
            expanded,
        }
    }

    fn leaf(name: &str, change: &SharedChange, depth: usize) -> Self {
        Self {
            name: name.to_string(),
            full_path: change.path.clone(),
            is_folder: false,
            depth,
            children: Vec::new(),
            change: Some(SharedChange::clone(change)),
            expanded: false,
        }
    }

    #[must_use]
    pub fn key(&self) -> NodeKey {
        NodeKey {
            path: self.full_path.clone(),
            is_folder: self.is_folder,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.change.is_some()
    }
}

/* ================================ Building ================================= */

#[must_use]
pub fn build_tree(changes: &[SharedChange], expand_all_by_default: bool) -> Node {
    build_tree_with_folded(changes, expand_all_by_default, &HashSet::new())
}

/// Folders listed in `folded` start collapsed regardless of the default.
#[must_use]
pub fn build_tree_with_folded<S: ::std::hash::BuildHasher>(
    changes: &[SharedChange],
    expand_all_by_default: bool,
    folded: &HashSet<String, S>,
) -> Node {
    build(changes, expand_all_by_default, |path| {
        expand_all_by_default && !folded.contains(path)
    })
}

/// Folders remembered in `folds` keep their state; the rest take the default.
#[must_use]
pub fn build_tree_with_folds(
    changes: &[SharedChange],
    expand_all_by_default: bool,
    folds: &FoldState,
) -> Node {
    build(changes, expand_all_by_default, |path| {
        folds.is_expanded(path, expand_all_by_default)
    })
}

/// Builds the tree in one pass. Children keep the order in which their
/// subtree first appears in `changes`.
fn build(
    changes: &[SharedChange],
    expand_all_by_default: bool,
    expanded_at: impl Fn(&str) -> bool,
) -> Node {
    let mut root = Node::root(expand_all_by_default);
    // Folder path -> child-index path from the root.
    let mut folders: HashMap<String, Vec<usize>> = HashMap::new();

    for change in changes {
        let segments: Vec<&str> = change.path.split('/').filter(|s| !s.is_empty()).collect();
        let (leaf_name, dirs) = match segments.split_last() {
            Some((last, dirs)) => (*last, dirs),
            None => ("", &[][..]),
        };

        let mut slot: Vec<usize> = Vec::with_capacity(dirs.len());
        let mut prefix = String::new();
        for (depth, seg) in dirs.iter().enumerate() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(seg);

            if let Some(existing) = folders.get(&prefix) {
                slot.clone_from(existing);
                continue;
            }

            let expanded = expanded_at(&prefix);
            let parent = descend_mut(&mut root, &slot);
            parent
                .children
                .push(Node::folder(seg, prefix.clone(), depth, expanded));
            slot.push(parent.children.len() - 1);
            folders.insert(prefix.clone(), slot.clone());
        }

        let parent = descend_mut(&mut root, &slot);
        parent.children.push(Node::leaf(leaf_name, change, dirs.len()));
    }

    root
}

fn descend_mut<'a>(node: &'a mut Node, slot: &[usize]) -> &'a mut Node {
    slot.iter().fold(node, |n, &i| &mut n.children[i])
}

/* ================================ Traversal ================================ */

/// Index of every node below `root`, keyed by row identity, valued by its
/// child-index path.
#[must_use]
pub fn index_tree(root: &Node) -> HashMap<NodeKey, Vec<usize>> {
    fn rec(node: &Node, slot: &mut Vec<usize>, out: &mut HashMap<NodeKey, Vec<usize>>) {
        for (i, child) in node.children.iter().enumerate() {
            slot.push(i);
            out.insert(child.key(), slot.clone());
            rec(child, slot, out);
            slot.pop();
        }
    }

    let mut out = HashMap::new();
    rec(root, &mut Vec::new(), &mut out);
    out
}

#[must_use]
pub fn node_at<'a>(root: &'a Node, slot: &[usize]) -> Option<&'a Node> {
    slot.iter()
        .try_fold(root, |n, &i| n.children.get(i))
}

pub fn node_at_mut<'a>(root: &'a mut Node, slot: &[usize]) -> Option<&'a mut Node> {
    slot.iter()
        .try_fold(root, |n, &i| n.children.get_mut(i))
}

/// Rows a renderer shows: pre-order below the root, not descending into
/// collapsed folders.
#[must_use]
pub fn visible_rows(root: &Node) -> Vec<NodeKey> {
    fn rec(nodes: &[Node], out: &mut Vec<NodeKey>) {
        for node in nodes {
            out.push(node.key());
            if node.is_folder && node.expanded {
                rec(&node.children, out);
            }
        }
    }

    let mut out = Vec::new();
    rec(&root.children, &mut out);
    out
}

/// Every leaf below `node` in pre-order.
pub fn collect_leaves<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if node.is_leaf() {
        out.push(node);
        return;
    }
    for child in &node.children {
        collect_leaves(child, out);
    }
}

/// Appends the change behind every leaf below `node`, skipping ones already seen.
pub fn collect_changes(node: &Node, seen: &mut HashSet<ChangeRef>, out: &mut Vec<SharedChange>) {
    if let Some(change) = &node.change {
        if seen.insert(ChangeRef::new(change)) {
            out.push(SharedChange::clone(change));
        }
        return;
    }
    for child in &node.children {
        collect_changes(child, seen, out);
    }
}

#[must_use]
pub fn folded_paths(root: &Node) -> HashSet<String> {
    fn rec(node: &Node, out: &mut HashSet<String>) {
        for child in &node.children {
            if child.is_folder {
                if !child.expanded {
                    out.insert(child.full_path.clone());
                }
                rec(child, out);
            }
        }
    }

    let mut out = HashSet::new();
    rec(root, &mut out);
    out
}

/// Folder expansion carried from one tree to the next, keyed by folder path.
/// Paths in neither set take the default of the tree being built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    pub collapsed: HashSet<String>,
    pub expanded: HashSet<String>,
}

impl FoldState {
    /// Records the state of every folder below `root`.
    #[must_use]
    pub fn capture(root: &Node) -> Self {
        fn rec(node: &Node, out: &mut FoldState) {
            for child in node.children.iter().filter(|c| c.is_folder) {
                let set = if child.expanded {
                    &mut out.expanded
                } else {
                    &mut out.collapsed
                };
                set.insert(child.full_path.clone());
                rec(child, out);
            }
        }

        let mut out = Self::default();
        rec(root, &mut out);
        out
    }

    #[must_use]
    pub fn is_expanded(&self, path: &str, default: bool) -> bool {
        if self.collapsed.contains(path) {
            false
        } else if self.expanded.contains(path) {
            true
        } else {
            default
        }
    }
}

#[must_use]
pub fn leaf_count(node: &Node) -> usize {
    if node.is_leaf() {
        return 1;
    }
    node.children.iter().map(leaf_count).sum()
}

/// Box-drawing rendering of the tree, one node per line, folders suffixed
/// with `/`. The root line is `root_name` when given.
#[must_use]
pub fn render_node_tree(root: &Node, root_name: Option<&str>) -> String {
    fn render(node: &Node, prefix: &mut String, out: &mut String) {
        let len = node.children.len();
        for (idx, child) in node.children.iter().enumerate() {
            let last = idx + 1 == len;
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&child.name);
            if child.is_folder {
                out.push('/');
            }
            out.push('\n');

            if !child.children.is_empty() {
                let saved = prefix.len();
                prefix.push_str(if last { "    " } else { "│   " });
                render(child, prefix, out);
                prefix.truncate(saved);
            }
        }
    }

    let mut out = String::new();
    if let Some(name) = root_name {
        out.push_str(name);
        out.push('\n');
    }
    let mut prefix = String::new();
    render(root, &mut prefix, &mut out);
    out
}
