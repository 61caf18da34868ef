//! Work breakdown tree model.
//!
//! Backs the drag-and-drop WBS editor: flattens the node collection into the
//! `(id, parent)` shape tree widgets expect, validates reparent/reorder drops
//! and applies them to a fresh copy of the collection.
//!
//! Nodes live in a flat slice and reference their parent by id. [`TreeArena`]
//! indexes that slice by id so ancestor walks are plain loops bounded by the
//! number of nodes, even when the input is corrupt.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{EntityKind, ViewError, ViewResult};
use crate::models::{Dependency, TreeNode};

/// Parent key used for root nodes in flattened output.
///
/// Tree widgets generally refuse `null` as a node id, so roots hang off this
/// sentinel instead. Node ids must not collide with it.
pub const ROOT_KEY: &str = "0";

/// Map a caller-supplied parent to the stored representation.
///
/// Both `None` and the sentinel root key mean "no parent".
pub fn normalize_parent(parent: Option<&str>) -> Option<&str> {
    parent.filter(|p| *p != ROOT_KEY)
}

// ========================================
// Flattening
// ========================================

/// A node paired with its UI-facing parent key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatEntry<'a> {
    /// The node id.
    pub id: &'a str,
    /// Parent id, or [`ROOT_KEY`] for a root.
    pub parent: &'a str,
    /// The node itself.
    pub node: &'a TreeNode,
}

impl<'a> FlatEntry<'a> {
    fn from_node(node: &'a TreeNode) -> Self {
        Self {
            id: node.id.as_str(),
            parent: node.parent_id.as_deref().unwrap_or(ROOT_KEY),
            node,
        }
    }
}

/// Lazy iterator returned by [`flatten`].
///
/// Clone it to walk the remaining entries again, or call [`flatten`] for a
/// fresh pass.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    nodes: std::slice::Iter<'a, TreeNode>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(FlatEntry::from_node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl ExactSizeIterator for Flatten<'_> {}

/// Flatten nodes into `(id, parent, node)` entries, in input order.
pub fn flatten(nodes: &[TreeNode]) -> Flatten<'_> {
    Flatten {
        nodes: nodes.iter(),
    }
}

/// Rebuild owned nodes from flattened entries.
///
/// Inverse of [`flatten`]: the sentinel root key maps back to `None`.
pub fn nest<'a>(entries: impl IntoIterator<Item = FlatEntry<'a>>) -> Vec<TreeNode> {
    entries
        .into_iter()
        .map(|entry| {
            let mut node = entry.node.clone();
            node.parent_id = normalize_parent(Some(entry.parent)).map(str::to_string);
            node
        })
        .collect()
}

// ========================================
// Arena
// ========================================

/// Id index over a node slice.
///
/// Children are kept sorted by `(order, input position)`. Nodes whose parent
/// id is unknown are treated as roots so they stay reachable.
#[derive(Debug)]
pub struct TreeArena<'a> {
    nodes: &'a [TreeNode],
    index: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> TreeArena<'a> {
    /// Index the given nodes. The first occurrence of a duplicated id wins.
    pub fn new(nodes: &'a [TreeNode]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }

        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent_id.as_deref() {
                Some(parent) if index.contains_key(parent) => {
                    children.entry(parent).or_default().push(i)
                }
                _ => roots.push(i),
            }
        }

        let by_order = |&i: &usize| (nodes[i].order, i);
        roots.sort_by_key(by_order);
        for list in children.values_mut() {
            list.sort_by_key(by_order);
        }

        Self {
            nodes,
            index,
            children,
            roots,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Slice position of a node.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Root nodes in sibling order.
    pub fn roots(&self) -> impl Iterator<Item = &'a TreeNode> + '_ {
        let nodes = self.nodes;
        self.roots.iter().map(move |&i| &nodes[i])
    }

    /// Direct children of a node in sibling order.
    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &'a TreeNode> + '_ {
        let nodes = self.nodes;
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &nodes[i])
    }

    fn parent_position(&self, i: usize) -> Option<usize> {
        self.nodes[i]
            .parent_id
            .as_deref()
            .and_then(|parent| self.index.get(parent).copied())
    }

    /// Check whether `ancestor` appears on the parent chain of `id`.
    ///
    /// A node counts as its own ancestor. The walk stops at a root, at an
    /// unknown parent, or after visiting every node once.
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let Some(mut current) = self.position(id) else {
            return false;
        };

        for _ in 0..=self.nodes.len() {
            trace!("Ancestor walk visiting: {}", self.nodes[current].id);
            if self.nodes[current].id == ancestor {
                return true;
            }
            match self.parent_position(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }

        warn!("Ancestor walk from '{}' exceeded {} steps", id, self.nodes.len());
        false
    }

    /// Number of ancestors above a node (0 for a root).
    ///
    /// Returns `None` for unknown ids or when the chain never reaches a root.
    pub fn depth(&self, id: &str) -> Option<usize> {
        let mut current = self.position(id)?;
        for depth in 0..=self.nodes.len() {
            match self.parent_position(current) {
                Some(parent) => current = parent,
                None => return Some(depth),
            }
        }
        None
    }
}

// ========================================
// Moves
// ========================================

/// Check that moving `node_id` under `new_parent_id` keeps the tree valid.
///
/// `None` or [`ROOT_KEY`] as parent moves the node to the top level.
///
/// # Errors
///
/// Returns `ViewError::NotFound` if the node or the new parent is absent.
/// Returns `ViewError::Cycle` if the new parent is the node itself or one of
/// its descendants.
pub fn validate_move(
    node_id: &str,
    new_parent_id: Option<&str>,
    nodes: &[TreeNode],
) -> ViewResult<()> {
    let arena = TreeArena::new(nodes);
    check_move(&arena, node_id, normalize_parent(new_parent_id))
}

fn check_move(arena: &TreeArena<'_>, node_id: &str, parent: Option<&str>) -> ViewResult<()> {
    if !arena.contains(node_id) {
        return Err(ViewError::not_found(EntityKind::Node, node_id));
    }

    let Some(parent) = parent else {
        return Ok(());
    };

    let cycle = || ViewError::Cycle {
        node_id: node_id.to_string(),
        parent_id: parent.to_string(),
    };

    if parent == node_id {
        return Err(cycle());
    }
    if !arena.contains(parent) {
        return Err(ViewError::not_found(EntityKind::Parent, parent));
    }
    if arena.is_ancestor(node_id, parent) {
        return Err(cycle());
    }

    Ok(())
}

/// Move a node under a new parent at the given sibling position.
///
/// Returns a new collection in the same input order. The node's siblings
/// under both the old and the new parent are renumbered `0..k-1`, with the
/// moved node placed at `order` (clamped to the valid range).
///
/// # Errors
///
/// Same as [`validate_move`]; nothing is produced when the move is rejected.
pub fn apply_move(
    node_id: &str,
    new_parent_id: Option<&str>,
    order: i64,
    nodes: &[TreeNode],
) -> ViewResult<Vec<TreeNode>> {
    let parent = normalize_parent(new_parent_id);
    let arena = TreeArena::new(nodes);
    check_move(&arena, node_id, parent)?;

    let Some(moved) = arena.position(node_id) else {
        return Err(ViewError::not_found(EntityKind::Node, node_id));
    };

    debug!(
        "Moving node: {} under {} at {}",
        node_id,
        parent.unwrap_or(ROOT_KEY),
        order
    );

    let mut result = nodes.to_vec();
    let old_parent = result[moved].parent_id.take();
    let new_parent = parent.map(str::to_string);
    result[moved].parent_id = new_parent.clone();

    if old_parent != new_parent {
        renumber_siblings(&mut result, old_parent.as_deref(), None);
    }
    renumber_siblings(&mut result, new_parent.as_deref(), Some((moved, order)));

    Ok(result)
}

/// Densely renumber the children of `parent`, optionally placing one node at
/// a given position first.
fn renumber_siblings(nodes: &mut [TreeNode], parent: Option<&str>, placed: Option<(usize, i64)>) {
    let mut siblings: Vec<usize> = (0..nodes.len())
        .filter(|&i| nodes[i].parent_id.as_deref() == parent)
        .filter(|&i| placed.is_none_or(|(moved, _)| moved != i))
        .collect();
    siblings.sort_by_key(|&i| (nodes[i].order, i));

    if let Some((moved, order)) = placed {
        let at = usize::try_from(order).unwrap_or(0).min(siblings.len());
        siblings.insert(at, moved);
    }

    for (position, i) in siblings.into_iter().enumerate() {
        nodes[i].order = position as i64;
    }
}

// ========================================
// Dependencies
// ========================================

/// Check that `predecessors` can replace the predecessor set of `node_id`.
///
/// Empty ids are ignored and repeated ids collapse to their first
/// occurrence; the cleaned list is returned in input order.
///
/// # Errors
///
/// Returns `ViewError::NotFound` if the node or any predecessor is absent.
/// Returns `ViewError::DependencyCycle` if a predecessor is the node itself
/// or is already reachable from it through successor links.
pub fn validate_dependencies(
    node_id: &str,
    predecessors: &[String],
    nodes: &[TreeNode],
    edges: &[Dependency],
) -> ViewResult<Vec<String>> {
    let mut seen = HashSet::new();
    let desired: Vec<String> = predecessors
        .iter()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let cycle = |predecessor: &str| ViewError::DependencyCycle {
        node_id: node_id.to_string(),
        predecessor_id: predecessor.to_string(),
    };

    if desired.iter().any(|id| id == node_id) {
        return Err(cycle(node_id));
    }

    let arena = TreeArena::new(nodes);
    if !arena.contains(node_id) {
        return Err(ViewError::not_found(EntityKind::Node, node_id));
    }
    if let Some(missing) = desired.iter().find(|id| !arena.contains(id)) {
        return Err(ViewError::not_found(EntityKind::Predecessor, missing.as_str()));
    }

    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        successors
            .entry(edge.predecessor_id.as_str())
            .or_default()
            .push(edge.successor_id.as_str());
    }

    if let Some(looping) = desired
        .iter()
        .find(|id| reaches(&successors, node_id, id.as_str()))
    {
        return Err(cycle(looping.as_str()));
    }

    Ok(desired)
}

/// Replace the predecessor set of `node_id` and return the new edge list.
///
/// Edges not ending at `node_id` keep their position; the node's surviving
/// edges follow, then the new ones in request order.
///
/// # Errors
///
/// Same as [`validate_dependencies`].
pub fn apply_dependencies(
    node_id: &str,
    predecessors: &[String],
    nodes: &[TreeNode],
    edges: &[Dependency],
) -> ViewResult<Vec<Dependency>> {
    let desired = validate_dependencies(node_id, predecessors, nodes, edges)?;

    let current: HashSet<&str> = edges
        .iter()
        .filter(|edge| edge.successor_id == node_id)
        .map(|edge| edge.predecessor_id.as_str())
        .collect();
    let wanted: HashSet<&str> = desired.iter().map(String::as_str).collect();

    debug!(
        "Setting {} predecessors on {} (had {})",
        desired.len(),
        node_id,
        current.len()
    );

    let mut result: Vec<Dependency> = edges
        .iter()
        .filter(|edge| edge.successor_id != node_id)
        .cloned()
        .collect();
    result.extend(
        edges
            .iter()
            .filter(|edge| edge.successor_id == node_id)
            .filter(|edge| wanted.contains(edge.predecessor_id.as_str()))
            .cloned(),
    );
    result.extend(
        desired
            .iter()
            .filter(|id| !current.contains(id.as_str()))
            .map(|id| Dependency::new(id.as_str(), node_id)),
    );

    Ok(result)
}

/// Depth-first search over successor links. Each id is expanded at most once.
fn reaches(successors: &HashMap<&str, Vec<&str>>, start: &str, target: &str) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        trace!("Dependency walk visiting: {}", current);
        if let Some(next) = successors.get(current) {
            stack.extend(next.iter().filter(|id| !visited.contains(*id)));
        }
    }

    false
}

// ========================================
// Outline
// ========================================

/// Outline code of a node, such as `1.2.3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WbsCode {
    /// The node id.
    pub id: String,
    /// Dotted outline code, 1-based per level.
    pub code: String,
    /// Depth of the node (0 = root).
    pub level: usize,
}

/// Compute outline codes for every node reachable from a root.
///
/// Codes are emitted in outline (depth-first) order. Siblings are numbered by
/// `order`, then by input position.
pub fn wbs_codes(nodes: &[TreeNode]) -> Vec<WbsCode> {
    let arena = TreeArena::new(nodes);
    let mut codes = Vec::with_capacity(nodes.len());
    let mut visited: HashSet<&str> = HashSet::with_capacity(nodes.len());

    let mut stack: Vec<(&TreeNode, String)> = arena
        .roots()
        .enumerate()
        .map(|(i, node)| (node, (i + 1).to_string()))
        .collect();
    stack.reverse();

    while let Some((node, code)) = stack.pop() {
        if !visited.insert(node.id.as_str()) {
            continue;
        }

        let children: Vec<&TreeNode> = arena.children_of(&node.id).collect();
        for (i, child) in children.into_iter().enumerate().rev() {
            stack.push((child, format!("{}.{}", code, i + 1)));
        }

        let level = code.matches('.').count();
        codes.push(WbsCode {
            id: node.id.clone(),
            code,
            level,
        });
    }

    codes
}

/// A node with its children, for outline rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeView {
    /// The node.
    pub node: TreeNode,
    /// Children in sibling order.
    pub children: Vec<TreeView>,
}

impl TreeView {
    /// Check if this node has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Nest the flat collection into a forest sorted by sibling order.
pub fn build_forest(nodes: &[TreeNode]) -> Vec<TreeView> {
    let arena = TreeArena::new(nodes);
    let mut visited = HashSet::with_capacity(nodes.len());
    arena
        .roots()
        .filter_map(|root| build_view(&arena, root, &mut visited))
        .collect()
}

fn build_view<'a>(
    arena: &TreeArena<'a>,
    node: &'a TreeNode,
    visited: &mut HashSet<&'a str>,
) -> Option<TreeView> {
    if !visited.insert(node.id.as_str()) {
        return None;
    }

    let children = arena
        .children_of(&node.id)
        .filter_map(|child| build_view(arena, child, visited))
        .collect();

    Some(TreeView {
        node: node.clone(),
        children,
    })
}
