//! Data records for the planboard views
//!
//! Plain serde records exchanged with the UI layer and the backend. Field
//! names are camelCase on the wire to match the JSON the backend produces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow status
///
/// The standard board has one column per status, in the order of
/// [`Status::WORKFLOW`]. Records keep their status as a plain string so that
/// statuses outside this vocabulary survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Backlog,
    InProgress,
    Delayed,
    Risk,
    Review,
    Done,
}

impl Status {
    /// Column order of the standard board
    pub const WORKFLOW: [Status; 6] = [
        Status::Backlog,
        Status::InProgress,
        Status::Delayed,
        Status::Risk,
        Status::Review,
        Status::Done,
    ];

    /// Returns the identifier used on the wire and as column id
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Backlog => "BACKLOG",
            Status::InProgress => "IN_PROGRESS",
            Status::Delayed => "DELAYED",
            Status::Risk => "RISK",
            Status::Review => "REVIEW",
            Status::Done => "DONE",
        }
    }

    /// Human-readable column label
    pub fn label(&self) -> &'static str {
        match self {
            Status::Backlog => "Backlog",
            Status::InProgress => "In progress",
            Status::Delayed => "Delayed",
            Status::Risk => "At risk",
            Status::Review => "Review",
            Status::Done => "Done",
        }
    }

    /// Parse a wire identifier, case-insensitively.
    pub fn parse(value: &str) -> Option<Status> {
        Status::WORKFLOW
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Returns the identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status given to records that arrive without one.
fn default_status() -> String {
    Status::Backlog.as_str().to_string()
}

/// A node of the work breakdown structure
///
/// Nodes reference their parent by id; `None` marks a root. The parent
/// relation must stay acyclic, which `tree::apply_move` guarantees for every
/// move it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Unique node id
    pub id: String,

    /// Parent node id, `None` for a root
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Sort key among siblings
    #[serde(default)]
    pub order: i64,

    /// Display title
    pub title: String,

    /// Free-form node type (deliverable, work package, ...)
    #[serde(rename = "type", default)]
    pub node_type: String,

    /// Workflow status, backlog when absent
    #[serde(default = "default_status")]
    pub status: String,
}

impl TreeNode {
    /// Create a root node with default type and backlog status.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            order: 0,
            title: title.into(),
            node_type: "task".to_string(),
            status: default_status(),
        }
    }

    /// Set the parent of this node.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the sibling order of this node.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Set the node type.
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Set the status of this node.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Check if this node is a root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A finish-to-start link between two WBS nodes
///
/// The successor may not start before the predecessor ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub predecessor_id: String,
    pub successor_id: String,
}

impl Dependency {
    pub fn new(predecessor_id: impl Into<String>, successor_id: impl Into<String>) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
        }
    }
}

/// A card on the Kanban board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTask {
    /// Unique task id
    pub id: String,

    /// Card title
    pub title: String,

    /// Status; equals the id of the column holding the task
    pub status: String,

    /// Optional priority badge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl BoardTask {
    /// Create a task with the given status and no priority.
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: status.into(),
            priority: None,
        }
    }

    /// Set the priority of this task.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A Kanban column with an optional WIP limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    /// Column id; tasks in this column carry it as their status
    pub id: String,

    /// Column header label
    pub label: String,

    /// Maximum number of tasks, `None` for unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,

    /// Tasks in display order
    #[serde(default)]
    pub tasks: Vec<BoardTask>,
}

impl BoardColumn {
    /// Create an empty, unlimited column.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            wip_limit: None,
            tasks: Vec::new(),
        }
    }

    /// Set the WIP limit. A zero limit admits no tasks.
    pub fn with_wip_limit(mut self, limit: u32) -> Self {
        self.wip_limit = Some(limit);
        self
    }

    /// Add a task to the end of the column.
    pub fn with_task(mut self, task: BoardTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// The declared WIP limit, `None` for unlimited.
    pub fn limit(&self) -> Option<u32> {
        self.wip_limit
    }

    /// Check if the column holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of a task in this column.
    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

/// A task plotted on the Gantt timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttTask {
    /// Unique task id
    pub id: String,

    /// Row label
    pub title: String,

    /// Workflow status, backlog when absent
    #[serde(default = "default_status")]
    pub status: String,

    /// First day of the task
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the task
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl GanttTask {
    /// Create an undated task.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: default_status(),
            start_date: None,
            end_date: None,
        }
    }

    /// Set both bounds of the task.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Set the start date only.
    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Set the status of this task.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Check if both bounds are known.
    pub fn is_dated(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }
}

/// A dated project marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttMilestone {
    /// Milestone name
    pub name: String,

    /// Due date
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl GanttMilestone {
    /// Create a milestone due on the given date.
    pub fn new(name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            due_date: Some(due_date),
        }
    }

    /// Create a milestone without a due date.
    pub fn undated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            due_date: None,
        }
    }
}
