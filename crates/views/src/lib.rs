//! View models for Planboard
//!
//! Pure, deterministic logic behind the three planning views: the
//! work-breakdown tree, the Kanban board and the Gantt timeline. Every
//! operation takes a borrowed snapshot and returns a fresh value, so the
//! caller owns persistence and rendering.

pub mod board;
pub mod error;
pub mod models;
pub mod timeline;
pub mod tree;

pub use board::{
    BoardMove, ColumnState, Grouping, apply_transition, group_by_column, standard_columns,
    validate_transition,
};
pub use error::{EntityKind, ViewError, ViewResult};
pub use models::{
    BoardColumn, BoardTask, Dependency, GanttMilestone, GanttTask, Priority, Status, TreeNode,
};
pub use timeline::{
    AxisTick, MIN_WIDTH_PERCENT, MilestoneMarker, TaskBar, TimelineLayout, ZoomLevel,
    compute_layout, format_milestone, milestone_summary,
};
pub use tree::{
    FlatEntry, Flatten, ROOT_KEY, TreeArena, TreeView, WbsCode, apply_dependencies, apply_move,
    build_forest, flatten, nest, validate_dependencies, validate_move, wbs_codes,
};

// Snapshots are shared freely between threads by callers.
static_assertions::assert_impl_all!(TreeNode: Send, Sync);
static_assertions::assert_impl_all!(BoardColumn: Send, Sync);
static_assertions::assert_impl_all!(GanttTask: Send, Sync);
static_assertions::assert_impl_all!(TimelineLayout: Send, Sync);
static_assertions::assert_impl_all!(ViewError: Send, Sync);
