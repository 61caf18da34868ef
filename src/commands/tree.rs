//! Tree commands for the work breakdown structure
//!
//! Implements `pb tree flatten`, `pb tree show`, `pb tree move` and
//! `pb tree depend`.

use std::fmt;

use clap::{Args, Subcommand};
use planboard_views::{
    Dependency, FlatEntry, TreeNode, TreeView, WbsCode, apply_dependencies, apply_move,
    build_forest, flatten, tree, validate_dependencies, validate_move, wbs_codes,
};
use serde::Serialize;
use tracing::debug;

use crate::error::CliResult;
use crate::output::{format_flat_entries, format_outline, render};
use crate::snapshot::Snapshot;

/// Work breakdown tree operations
#[derive(Debug, Subcommand)]
pub enum TreeCommand {
    /// List nodes in flat form with their parent keys
    Flatten,
    /// Show the tree as an outline with WBS codes
    Show,
    /// Reparent and/or reorder a node
    Move(TreeMoveCommand),
    /// Replace the predecessors of a node
    Depend(TreeDependCommand),
}

/// Move a node under a new parent
#[derive(Debug, Args)]
pub struct TreeMoveCommand {
    /// Id of the node to move
    pub node: String,

    /// New parent id; omit (or pass "0") to move the node to the root
    #[arg(long)]
    pub parent: Option<String>,

    /// Position among the new siblings (clamped to the sibling count)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub order: i64,

    /// Only check whether the move is allowed
    #[arg(long)]
    pub dry_run: bool,
}

/// Set the finish-to-start predecessors of a node
#[derive(Debug, Args)]
pub struct TreeDependCommand {
    /// Id of the successor node
    pub node: String,

    /// Predecessor id (repeatable); omit to clear all predecessors
    #[arg(long = "after", value_name = "ID")]
    pub predecessors: Vec<String>,

    /// Only check whether the links are allowed
    #[arg(long)]
    pub dry_run: bool,
}

/// Result of `pb tree flatten`
#[derive(Debug, Serialize)]
pub struct FlattenResult<'a> {
    /// One entry per node, in input order
    pub entries: Vec<FlatEntry<'a>>,
}

impl fmt::Display for FlattenResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_flat_entries(&self.entries))
    }
}

/// Result of `pb tree show`
#[derive(Debug, Serialize)]
pub struct OutlineResult {
    /// Outline codes in depth-first order
    pub codes: Vec<WbsCode>,
    /// Nested nodes
    pub forest: Vec<TreeView>,
}

impl OutlineResult {
    /// Build the outline of a node collection.
    pub fn new(nodes: &[TreeNode]) -> Self {
        Self {
            codes: wbs_codes(nodes),
            forest: build_forest(nodes),
        }
    }
}

impl fmt::Display for OutlineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_outline(&self.forest, &self.codes))
    }
}

/// Result of `pb tree move`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeMoveResult {
    /// The moved node
    pub node_id: String,
    /// The new parent, `None` for the root
    pub parent_id: Option<String>,
    /// Whether the move was applied (false for a dry run)
    pub applied: bool,
    /// The updated collection; the input collection for a dry run
    pub nodes: Vec<TreeNode>,
}

impl fmt::Display for TreeMoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.parent_id {
            Some(parent) => format!("under '{}'", parent),
            None => "to the root".to_string(),
        };

        if !self.applied {
            return write!(f, "Move of '{}' {} is allowed", self.node_id, target);
        }

        let position = self
            .nodes
            .iter()
            .find(|node| node.id == self.node_id)
            .map_or(0, |node| node.order);
        writeln!(
            f,
            "Moved '{}' {} at position {}",
            self.node_id, target, position
        )?;
        write!(f, "{}", OutlineResult::new(&self.nodes))
    }
}

/// Result of `pb tree depend`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDependResult {
    /// The successor node
    pub node_id: String,
    /// Its predecessors after the change, in request order
    pub predecessors: Vec<String>,
    /// Whether the change was applied (false for a dry run)
    pub applied: bool,
    /// The updated edge list; the input list for a dry run
    pub dependencies: Vec<Dependency>,
}

impl fmt::Display for TreeDependResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listed = if self.predecessors.is_empty() {
            "no predecessors".to_string()
        } else {
            self.predecessors.join(", ")
        };

        if self.applied {
            write!(f, "'{}' now follows {}", self.node_id, listed)
        } else {
            write!(f, "'{}' may follow {}", self.node_id, listed)
        }
    }
}

impl TreeCommand {
    /// Execute the tree command against a snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - The loaded snapshot; `nodes` and `dependencies` are used
    /// * `json` - Emit JSON instead of text
    ///
    /// # Errors
    ///
    /// Returns `CliError::View` if a move or dependency change is rejected
    /// and `CliError::Encode` if JSON output fails.
    pub fn execute(&self, snapshot: &Snapshot, json: bool) -> CliResult<String> {
        let nodes = &snapshot.nodes;
        match self {
            TreeCommand::Flatten => {
                let result = FlattenResult {
                    entries: flatten(nodes).collect(),
                };
                render(&result, json)
            }
            TreeCommand::Show => render(&OutlineResult::new(nodes), json),
            TreeCommand::Move(cmd) => render(&cmd.execute(nodes)?, json),
            TreeCommand::Depend(cmd) => {
                render(&cmd.execute(nodes, &snapshot.dependencies)?, json)
            }
        }
    }
}

impl TreeMoveCommand {
    /// Validate, and unless this is a dry run apply, the move.
    ///
    /// # Errors
    ///
    /// Returns `CliError::View` with the rejection if the move is not allowed.
    pub fn execute(&self, nodes: &[TreeNode]) -> CliResult<TreeMoveResult> {
        let parent = tree::normalize_parent(self.parent.as_deref());
        debug!(
            "Tree move requested: {} -> {:?} at {}",
            self.node, parent, self.order
        );

        let nodes = if self.dry_run {
            validate_move(&self.node, parent, nodes)?;
            nodes.to_vec()
        } else {
            apply_move(&self.node, parent, self.order, nodes)?
        };

        Ok(TreeMoveResult {
            node_id: self.node.clone(),
            parent_id: parent.map(str::to_string),
            applied: !self.dry_run,
            nodes,
        })
    }
}

impl TreeDependCommand {
    /// Validate, and unless this is a dry run apply, the new predecessor set.
    ///
    /// # Errors
    ///
    /// Returns `CliError::View` with the rejection if a link is not allowed.
    pub fn execute(
        &self,
        nodes: &[TreeNode],
        dependencies: &[Dependency],
    ) -> CliResult<TreeDependResult> {
        debug!(
            "Dependency change requested: {} after {:?}",
            self.node, self.predecessors
        );

        let predecessors =
            validate_dependencies(&self.node, &self.predecessors, nodes, dependencies)?;
        let dependencies = if self.dry_run {
            dependencies.to_vec()
        } else {
            apply_dependencies(&self.node, &predecessors, nodes, dependencies)?
        };

        Ok(TreeDependResult {
            node_id: self.node.clone(),
            predecessors,
            applied: !self.dry_run,
            dependencies,
        })
    }
}
