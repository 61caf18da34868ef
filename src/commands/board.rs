//! Board commands for the Kanban view
//!
//! Implements `pb board group`, `pb board move` and `pb board columns`.

use std::fmt;

use clap::{Args, Subcommand};
use planboard_views::{BoardColumn, BoardMove, Grouping, Status, group_by_column, standard_columns};
use serde::Serialize;
use tracing::debug;

use crate::error::CliResult;
use crate::output::{format_board, format_columns, render};
use crate::snapshot::Snapshot;

/// Kanban board operations
#[derive(Debug, Subcommand)]
pub enum BoardCommand {
    /// Group tasks into columns by status
    Group,
    /// Move a task between columns or within one
    Move(BoardMoveCommand),
    /// List the standard workflow columns
    Columns(ColumnsCommand),
}

/// Move a task to a position in a column
#[derive(Debug, Args)]
pub struct BoardMoveCommand {
    /// Id of the task to move
    pub task: String,

    /// Column the task is currently in
    #[arg(long)]
    pub from: String,

    /// Destination column
    #[arg(long)]
    pub to: String,

    /// Position in the destination column (clamped to its length)
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Only check whether the move is allowed
    #[arg(long)]
    pub dry_run: bool,
}

/// Show the standard workflow columns
#[derive(Debug, Args)]
pub struct ColumnsCommand {
    /// WIP limit for a status, as STATUS=LIMIT (repeatable)
    #[arg(long = "wip", value_parser = parse_wip_limit)]
    pub wip: Vec<(Status, u32)>,
}

/// Parse a `STATUS=LIMIT` pair.
fn parse_wip_limit(value: &str) -> Result<(Status, u32), String> {
    let (name, limit) = value
        .split_once('=')
        .ok_or_else(|| format!("expected STATUS=LIMIT, got '{}'", value))?;
    let status = Status::parse(name).ok_or_else(|| format!("unknown status '{}'", name))?;
    let limit = limit
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid limit '{}': {}", limit, e))?;
    Ok((status, limit))
}

/// Result of `pb board group`
#[derive(Debug, Serialize)]
pub struct GroupResult {
    /// Columns with their tasks, plus unplaced task ids
    #[serde(flatten)]
    pub grouping: Grouping,
}

impl fmt::Display for GroupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_board(&self.grouping.columns, &self.grouping.orphaned)
        )
    }
}

/// Result of `pb board move`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMoveResult {
    /// The requested move
    #[serde(rename = "move")]
    pub request: BoardMove,
    /// Whether the move was applied (false for a dry run)
    pub applied: bool,
    /// The updated columns; the input columns for a dry run
    pub columns: Vec<BoardColumn>,
}

impl fmt::Display for BoardMoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = &self.request;
        if !self.applied {
            return write!(
                f,
                "Move of task '{}' from '{}' to '{}' is allowed",
                request.task_id, request.from_column_id, request.to_column_id
            );
        }

        let position = self
            .columns
            .iter()
            .find(|column| column.id == request.to_column_id)
            .and_then(|column| column.position_of(&request.task_id))
            .unwrap_or(request.destination_index);
        writeln!(
            f,
            "Moved task '{}' from '{}' to '{}' at position {}",
            request.task_id, request.from_column_id, request.to_column_id, position
        )?;
        write!(f, "{}", format_board(&self.columns, &[]))
    }
}

/// Result of `pb board columns`
#[derive(Debug, Serialize)]
pub struct ColumnsResult {
    /// Columns in workflow order
    pub columns: Vec<BoardColumn>,
}

impl fmt::Display for ColumnsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_columns(&self.columns))
    }
}

impl BoardCommand {
    /// Whether the command reads the snapshot.
    pub fn needs_snapshot(&self) -> bool {
        !matches!(self, BoardCommand::Columns(_))
    }

    /// Execute the board command against a snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - The loaded snapshot; `tasks` and `columns` are used
    /// * `json` - Emit JSON instead of text
    ///
    /// # Errors
    ///
    /// Returns `CliError::View` if a move is rejected and `CliError::Encode`
    /// if JSON output fails.
    pub fn execute(&self, snapshot: &Snapshot, json: bool) -> CliResult<String> {
        match self {
            BoardCommand::Group => {
                let grouping = group_by_column(&snapshot.tasks, &snapshot.declared_columns());
                render(&GroupResult { grouping }, json)
            }
            BoardCommand::Move(cmd) => render(&cmd.execute(&snapshot.board_columns())?, json),
            BoardCommand::Columns(cmd) => {
                let result = ColumnsResult {
                    columns: standard_columns(&cmd.wip),
                };
                render(&result, json)
            }
        }
    }
}

impl BoardMoveCommand {
    /// Build the move this command describes.
    pub fn to_move(&self) -> BoardMove {
        BoardMove::new(&self.task, &self.from, &self.to, self.index)
    }

    /// Validate, and unless this is a dry run apply, the move.
    ///
    /// # Errors
    ///
    /// Returns `CliError::View` with the rejection if the move is not allowed.
    pub fn execute(&self, columns: &[BoardColumn]) -> CliResult<BoardMoveResult> {
        let request = self.to_move();
        debug!(
            "Board move requested: {} from {} to {} at {}",
            request.task_id, request.from_column_id, request.to_column_id, request.destination_index
        );

        let columns = if self.dry_run {
            request.validate(columns)?;
            columns.to_vec()
        } else {
            request.apply(columns)?
        };

        Ok(BoardMoveResult {
            request,
            applied: !self.dry_run,
            columns,
        })
    }
}
