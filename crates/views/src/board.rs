//! Kanban board model.
//!
//! Groups tasks into ordered columns and applies drag-and-drop transitions
//! between columns, enforcing each column's WIP limit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EntityKind, ViewError, ViewResult};
use crate::models::{BoardColumn, BoardTask, Status};

/// Result of [`group_by_column`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grouping {
    /// Declared columns, each holding its tasks in source order
    pub columns: Vec<BoardColumn>,
    /// Ids of tasks whose status matched no column
    pub orphaned: Vec<String>,
}

impl Grouping {
    /// Number of tasks that could not be placed.
    pub fn orphan_count(&self) -> usize {
        self.orphaned.len()
    }
}

/// Partition tasks into the declared columns.
///
/// Columns keep their declared order and tasks keep their relative order from
/// `tasks`. Any tasks already present in `columns` are replaced. When two
/// columns share an id, the first one receives the tasks.
pub fn group_by_column(tasks: &[BoardTask], columns: &[BoardColumn]) -> Grouping {
    let mut grouped: Vec<BoardColumn> = columns
        .iter()
        .map(|column| BoardColumn {
            tasks: Vec::new(),
            ..column.clone()
        })
        .collect();
    let mut orphaned = Vec::new();

    for task in tasks {
        match grouped.iter_mut().find(|column| column.id == task.status) {
            Some(column) => column.tasks.push(task.clone()),
            None => orphaned.push(task.id.clone()),
        }
    }

    if !orphaned.is_empty() {
        debug!("Tasks without a matching column: {}", orphaned.len());
    }

    Grouping {
        columns: grouped,
        orphaned,
    }
}

/// The six workflow columns, empty, in workflow order.
///
/// A status listed in `wip_limits` gets that limit; the last entry for a
/// status wins. All other columns are unlimited.
pub fn standard_columns(wip_limits: &[(Status, u32)]) -> Vec<BoardColumn> {
    Status::WORKFLOW
        .iter()
        .map(|status| {
            let column = BoardColumn::new(status.as_str(), status.label());
            match wip_limits.iter().rev().find(|(s, _)| s == status) {
                Some((_, limit)) => column.with_wip_limit(*limit),
                None => column,
            }
        })
        .collect()
}

/// Fill level of a column, used to pick the empty-state or limit marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ColumnState {
    /// No tasks and room for one; render the empty-state marker
    Empty,
    /// Room left; `remaining` is `None` for unlimited columns
    Open { remaining: Option<u32> },
    /// Exactly at the WIP limit
    AtLimit,
    /// Above the WIP limit (only possible if the input already was)
    OverLimit,
}

impl ColumnState {
    /// Compute the state of a column.
    pub fn of(column: &BoardColumn) -> Self {
        let count = column.tasks.len();
        let limit = column.limit();
        if count == 0 && limit != Some(0) {
            return ColumnState::Empty;
        }

        match limit {
            None => ColumnState::Open { remaining: None },
            Some(limit) => {
                let limit_len = limit as usize;
                if count < limit_len {
                    let remaining = u32::try_from(limit_len - count).unwrap_or(limit);
                    ColumnState::Open {
                        remaining: Some(remaining),
                    }
                } else if count == limit_len {
                    ColumnState::AtLimit
                } else {
                    ColumnState::OverLimit
                }
            }
        }
    }

    /// Check if the column accepts one more task from another column.
    pub fn accepts_more(&self) -> bool {
        matches!(self, ColumnState::Empty | ColumnState::Open { .. })
    }
}

/// A card drop reported by the drag-and-drop layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMove {
    /// Dragged task
    pub task_id: String,
    /// Column the drag started in
    pub from_column_id: String,
    /// Column the task was dropped on
    pub to_column_id: String,
    /// Position in the destination column, counted after removal from the source
    pub destination_index: usize,
}

impl BoardMove {
    /// Create a move.
    pub fn new(
        task_id: impl Into<String>,
        from_column_id: impl Into<String>,
        to_column_id: impl Into<String>,
        destination_index: usize,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            from_column_id: from_column_id.into(),
            to_column_id: to_column_id.into(),
            destination_index,
        }
    }

    /// See [`validate_transition`].
    pub fn validate(&self, columns: &[BoardColumn]) -> ViewResult<()> {
        validate_transition(
            &self.task_id,
            &self.from_column_id,
            &self.to_column_id,
            self.destination_index,
            columns,
        )
    }

    /// See [`apply_transition`].
    pub fn apply(&self, columns: &[BoardColumn]) -> ViewResult<Vec<BoardColumn>> {
        apply_transition(
            &self.task_id,
            &self.from_column_id,
            &self.to_column_id,
            self.destination_index,
            columns,
        )
    }
}

/// Resolved positions of a validated transition
struct Resolved {
    from: usize,
    to: usize,
    source_index: usize,
    noop: bool,
}

fn find_column(columns: &[BoardColumn], id: &str) -> ViewResult<usize> {
    columns
        .iter()
        .position(|column| column.id == id)
        .ok_or_else(|| ViewError::not_found(EntityKind::Column, id))
}

fn resolve(
    task_id: &str,
    from_column_id: &str,
    to_column_id: &str,
    destination_index: usize,
    columns: &[BoardColumn],
) -> ViewResult<Resolved> {
    let from = find_column(columns, from_column_id)?;
    let to = find_column(columns, to_column_id)?;
    let source_index = columns[from]
        .position_of(task_id)
        .ok_or_else(|| ViewError::not_found(EntityKind::Task, task_id))?;

    if from == to {
        // Reordering inside a column never changes its count.
        return Ok(Resolved {
            from,
            to,
            source_index,
            noop: destination_index == source_index,
        });
    }

    let destination = &columns[to];
    if let Some(limit) = destination.limit() {
        let count = destination.tasks.len() + 1;
        if count > limit as usize {
            debug!(
                "Rejecting move of {} into {}: {} > {}",
                task_id, destination.id, count, limit
            );
            return Err(ViewError::Capacity {
                column_id: destination.id.clone(),
                limit,
                count,
            });
        }
    }

    Ok(Resolved {
        from,
        to,
        source_index,
        noop: false,
    })
}

/// Check that a task can be dropped at `destination_index` of another column.
///
/// Dropping a task back where it started is accepted as a no-op.
///
/// # Errors
///
/// Returns `ViewError::NotFound` for an unknown column, or when the task is
/// not in the source column.
/// Returns `ViewError::Capacity` when the destination declares a WIP limit
/// and would hold more tasks than that after the move.
pub fn validate_transition(
    task_id: &str,
    from_column_id: &str,
    to_column_id: &str,
    destination_index: usize,
    columns: &[BoardColumn],
) -> ViewResult<()> {
    resolve(
        task_id,
        from_column_id,
        to_column_id,
        destination_index,
        columns,
    )
    .map(|_| ())
}

/// Move a task between (or within) columns.
///
/// Returns a new column set with the task removed from its source column,
/// inserted at `destination_index` (clamped to the column length) in the
/// destination, and its status set to the destination column id.
///
/// # Errors
///
/// Same as [`validate_transition`]; nothing is produced when the move is
/// rejected.
pub fn apply_transition(
    task_id: &str,
    from_column_id: &str,
    to_column_id: &str,
    destination_index: usize,
    columns: &[BoardColumn],
) -> ViewResult<Vec<BoardColumn>> {
    let resolved = resolve(
        task_id,
        from_column_id,
        to_column_id,
        destination_index,
        columns,
    )?;

    let mut result = columns.to_vec();
    if resolved.noop {
        return Ok(result);
    }

    debug!(
        "Moving task: {} from {} to {} at {}",
        task_id, from_column_id, to_column_id, destination_index
    );

    let mut task = result[resolved.from].tasks.remove(resolved.source_index);
    let destination = &mut result[resolved.to];
    task.status = destination.id.clone();
    let at = destination_index.min(destination.tasks.len());
    destination.tasks.insert(at, task);

    Ok(result)
}
