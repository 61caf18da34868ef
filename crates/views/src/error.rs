use std::fmt;
use thiserror::Error;

/// Kind of record a `NotFound` rejection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A tree node being moved
    Node,
    /// The requested new parent of a tree node
    Parent,
    /// A board column
    Column,
    /// A task on the board
    Task,
    /// A node named as a dependency predecessor
    Predecessor,
}

impl EntityKind {
    /// Returns the lowercase name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Parent => "parent",
            EntityKind::Column => "column",
            EntityKind::Task => "task",
            EntityKind::Predecessor => "predecessor",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejections produced by the view models
///
/// Every variant is returned by a validating call before any output is built,
/// so callers can treat each operation as all-or-nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Moving the node would make it its own ancestor
    #[error("Cannot move '{node_id}' under '{parent_id}': it would create a cycle")]
    Cycle { node_id: String, parent_id: String },

    /// The predecessor already depends on the node, directly or through others
    #[error("Cannot make '{node_id}' depend on '{predecessor_id}': it would create a dependency cycle")]
    DependencyCycle {
        node_id: String,
        predecessor_id: String,
    },

    /// A referenced id is absent from the input
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// The destination column would exceed its WIP limit
    #[error("Column '{column_id}' would exceed its WIP limit of {limit} ({count} tasks)")]
    Capacity {
        column_id: String,
        limit: u32,
        count: usize,
    },
}

impl ViewError {
    /// Shorthand for building a `NotFound` rejection.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        ViewError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for view model operations
pub type ViewResult<T> = Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_display() {
        let err = ViewError::Cycle {
            node_id: "a".to_string(),
            parent_id: "b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot move 'a' under 'b': it would create a cycle"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ViewError::not_found(EntityKind::Column, "doing");
        assert_eq!(err.to_string(), "column 'doing' not found");
    }

    #[test]
    fn test_capacity_error_display() {
        let err = ViewError::Capacity {
            column_id: "IN_PROGRESS".to_string(),
            limit: 2,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column 'IN_PROGRESS' would exceed its WIP limit of 2 (3 tasks)"
        );
    }

    #[test]
    fn test_dependency_cycle_error_display() {
        let err = ViewError::DependencyCycle {
            node_id: "a".to_string(),
            predecessor_id: "c".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot make 'a' depend on 'c': it would create a dependency cycle"
        );
        assert_eq!(
            ViewError::not_found(EntityKind::Predecessor, "zz").to_string(),
            "predecessor 'zz' not found"
        );
    }

    #[test]
    fn test_not_found_error_debug() {
        let err = ViewError::not_found(EntityKind::Node, "xyz789");
        let debug_str = format!("{:?}", err);
        assert!(
            debug_str.contains("NotFound") && debug_str.contains("xyz789"),
            "Debug output should contain NotFound and the id"
        );
    }

    #[test]
    fn test_view_result_type_alias() {
        let ok_result: ViewResult<i32> = Ok(42);
        assert_eq!(ok_result.unwrap(), 42);

        let err_result: ViewResult<i32> = Err(ViewError::not_found(EntityKind::Parent, "p"));
        assert!(err_result.is_err());
    }
}
