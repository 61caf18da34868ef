//! Snapshot input for the `pb` commands
//!
//! A snapshot is one JSON document carrying whatever records a command needs.
//! Every key is optional, so a file holding only `nodes` works for the tree
//! commands.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use planboard_views::{
    BoardColumn, BoardTask, Dependency, GanttMilestone, GanttTask, TreeNode, group_by_column,
    standard_columns,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Where the snapshot is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A JSON file on disk
    File(PathBuf),
}

impl InputSource {
    /// Interpret a path argument, treating `-` as standard input.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path == Path::new("-") {
            InputSource::Stdin
        } else {
            InputSource::File(path)
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "stdin"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Records a command operates on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Work-breakdown nodes
    pub nodes: Vec<TreeNode>,
    /// Finish-to-start links between work-breakdown nodes
    pub dependencies: Vec<Dependency>,
    /// Board tasks, grouped into `columns` by status
    pub tasks: Vec<BoardTask>,
    /// Board columns; the standard workflow columns are used when empty
    pub columns: Vec<BoardColumn>,
    /// Timeline tasks
    pub gantt_tasks: Vec<GanttTask>,
    /// Timeline milestones
    pub milestones: Vec<GanttMilestone>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Parse` if the text is not a valid snapshot.
    pub fn from_json(text: &str, origin: &str) -> CliResult<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(text).map_err(|source| CliError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        debug!(
            "Loaded snapshot from {}: {} nodes, {} dependencies, {} tasks, {} columns, {} timeline tasks, {} milestones",
            origin,
            snapshot.nodes.len(),
            snapshot.dependencies.len(),
            snapshot.tasks.len(),
            snapshot.columns.len(),
            snapshot.gantt_tasks.len(),
            snapshot.milestones.len()
        );

        Ok(snapshot)
    }

    /// Read and parse a snapshot from `reader`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Read` on I/O failure and `CliError::Parse` on bad JSON.
    pub fn read_from(mut reader: impl Read, origin: &str) -> CliResult<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read {
                path: origin.to_string(),
                source,
            })?;
        Self::from_json(&text, origin)
    }

    /// Load a snapshot from the given source.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Read` if the source cannot be read and
    /// `CliError::Parse` if its contents are not a valid snapshot.
    pub fn load(source: &InputSource) -> CliResult<Self> {
        let origin = source.to_string();
        match source {
            InputSource::Stdin => Self::read_from(std::io::stdin().lock(), &origin),
            InputSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: origin.clone(),
                    source,
                })?;
                Self::from_json(&text, &origin)
            }
        }
    }

    /// Declared board columns, or the standard workflow columns when the
    /// snapshot declares none.
    pub fn declared_columns(&self) -> Vec<BoardColumn> {
        if self.columns.is_empty() {
            standard_columns(&[])
        } else {
            self.columns.clone()
        }
    }

    /// Board columns ready for a transition.
    ///
    /// When the snapshot lists loose `tasks`, they are grouped into the
    /// [declared columns](Self::declared_columns) by status; otherwise the
    /// columns keep the tasks they carry.
    pub fn board_columns(&self) -> Vec<BoardColumn> {
        let columns = self.declared_columns();

        if self.tasks.is_empty() {
            columns
        } else {
            group_by_column(&self.tasks, &columns).columns
        }
    }
}

static_assertions::assert_impl_all!(Snapshot: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_source_dash_is_stdin() {
        assert_eq!(InputSource::from_path("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_path("plan.json"),
            InputSource::File(PathBuf::from("plan.json"))
        );
    }

    #[test]
    fn test_input_source_display() {
        assert_eq!(InputSource::Stdin.to_string(), "stdin");
        assert_eq!(
            InputSource::File(PathBuf::from("/tmp/plan.json")).to_string(),
            "/tmp/plan.json"
        );
    }

    #[test]
    fn test_empty_object_is_empty_snapshot() {
        let snapshot = Snapshot::from_json("{}", "test").unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let json = r#"{
            "nodes": [{"id": "a", "parentId": null, "order": 0, "title": "Root"}],
            "ganttTasks": [{"id": "g1", "title": "Design", "startDate": "2024-01-01", "endDate": "2024-01-05"}],
            "milestones": [{"name": "Launch", "dueDate": "2024-02-01"}]
        }"#;
        let snapshot = Snapshot::from_json(json, "test").unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.gantt_tasks.len(), 1);
        assert!(snapshot.gantt_tasks[0].is_dated());
        assert!(snapshot.milestones[0].due_date.is_some());
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn test_invalid_json_reports_origin() {
        let err = Snapshot::from_json("[1, 2]", "plan.json").unwrap_err();
        match err {
            CliError::Parse { origin, .. } => assert_eq!(origin, "plan.json"),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_from_reader() {
        let json = br#"{"tasks": [{"id": "t1", "title": "Write", "status": "BACKLOG"}]}"#;
        let snapshot = Snapshot::read_from(&json[..], "bytes").unwrap();
        assert_eq!(snapshot.tasks[0].id, "t1");
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let source = InputSource::File(PathBuf::from("/nonexistent/planboard/snapshot.json"));
        let err = Snapshot::load(&source).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn test_declared_columns_fallback() {
        let standard = Snapshot::default().declared_columns();
        assert_eq!(standard, standard_columns(&[]));

        let custom = Snapshot {
            columns: vec![BoardColumn::new("todo", "To do")],
            ..Default::default()
        };
        assert_eq!(custom.declared_columns(), custom.columns);
    }

    #[test]
    fn test_snapshot_reads_dependencies() {
        let json = r#"{"dependencies": [{"predecessorId": "a", "successorId": "b"}]}"#;
        let snapshot = Snapshot::from_json(json, "test").unwrap();
        assert_eq!(snapshot.dependencies, vec![Dependency::new("a", "b")]);
    }

    #[test]
    fn test_board_columns_default_to_workflow() {
        let snapshot = Snapshot {
            tasks: vec![BoardTask::new("t1", "Write", "REVIEW")],
            ..Default::default()
        };
        let columns = snapshot.board_columns();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[4].id, "REVIEW");
        assert_eq!(columns[4].tasks[0].id, "t1");
    }

    #[test]
    fn test_board_columns_keep_embedded_tasks_without_loose_tasks() {
        let column = BoardColumn::new("todo", "To do").with_task(BoardTask::new("t1", "A", "todo"));
        let snapshot = Snapshot {
            columns: vec![column.clone()],
            ..Default::default()
        };
        assert_eq!(snapshot.board_columns(), vec![column]);
    }
}
