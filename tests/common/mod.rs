//! Test infrastructure for integration tests
//!
//! Provides isolated snapshot directories and command builder helpers.
//! Each test gets its own temp directory to ensure no shared state.

use std::path::PathBuf;

use chrono::NaiveDate;
use planboard::commands::{BoardMoveCommand, TreeDependCommand, TreeMoveCommand};
use planboard::{InputSource, Snapshot};
use planboard_views::{BoardColumn, BoardTask, GanttMilestone, GanttTask, TreeNode};

/// Test context owning an isolated temp directory
pub struct TestContext {
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context with an isolated directory.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "pb-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&temp_dir).unwrap();

        Self { temp_dir }
    }

    /// Write a snapshot as JSON and return its input source.
    pub fn write_snapshot(&self, name: &str, snapshot: &Snapshot) -> InputSource {
        let json = serde_json::to_string_pretty(snapshot).unwrap();
        self.write_raw(name, &json)
    }

    /// Write arbitrary text to a snapshot file and return its input source.
    pub fn write_raw(&self, name: &str, contents: &str) -> InputSource {
        let path = self.temp_dir.join(name);
        std::fs::write(&path, contents).unwrap();
        InputSource::File(path)
    }

    /// Load a snapshot written earlier.
    pub fn load(&self, source: &InputSource) -> Snapshot {
        Snapshot::load(source).unwrap()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Auto-cleanup on drop
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Fixture Helpers
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A two-root work breakdown:
///
/// ```text
/// 1 Platform (a)
/// ├── 1.1 API (b)
/// │   └── 1.1.1 Auth (d)
/// └── 1.2 UI (c)
/// 2 Ops (e)
/// ```
pub fn wbs_snapshot() -> Snapshot {
    Snapshot {
        nodes: vec![
            TreeNode::new("a", "Platform").with_type("deliverable"),
            TreeNode::new("b", "API").with_parent("a").with_order(0),
            TreeNode::new("c", "UI").with_parent("a").with_order(1),
            TreeNode::new("d", "Auth").with_parent("b"),
            TreeNode::new("e", "Ops").with_order(1),
        ],
        ..Default::default()
    }
}

/// Todo holds T3; Doing (WIP 2) holds T1 and T2; Done is empty.
pub fn board_snapshot() -> Snapshot {
    Snapshot {
        tasks: vec![
            BoardTask::new("T1", "API", "doing"),
            BoardTask::new("T2", "UI", "doing"),
            BoardTask::new("T3", "Docs", "todo"),
        ],
        columns: vec![
            BoardColumn::new("todo", "Todo"),
            BoardColumn::new("doing", "Doing").with_wip_limit(2),
            BoardColumn::new("done", "Done"),
        ],
        ..Default::default()
    }
}

pub fn timeline_snapshot() -> Snapshot {
    Snapshot {
        gantt_tasks: vec![
            GanttTask::new("1", "Design").with_dates(date(2024, 1, 1), date(2024, 1, 5)),
            GanttTask::new("2", "Review").with_dates(date(2024, 1, 3), date(2024, 1, 3)),
            GanttTask::new("3", "Unscheduled"),
        ],
        milestones: vec![GanttMilestone::new("Launch", date(2024, 1, 5))],
        ..Default::default()
    }
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

/// Create a TreeMoveCommand that applies the move.
pub fn tree_move(node: &str, parent: Option<&str>, order: i64) -> TreeMoveCommand {
    TreeMoveCommand {
        node: node.to_string(),
        parent: parent.map(String::from),
        order,
        dry_run: false,
    }
}

/// Create a TreeDependCommand that applies the new predecessor set.
pub fn depend(node: &str, after: &[&str]) -> TreeDependCommand {
    TreeDependCommand {
        node: node.to_string(),
        predecessors: after.iter().map(|id| id.to_string()).collect(),
        dry_run: false,
    }
}

/// Create a BoardMoveCommand that applies the move.
pub fn board_move(task: &str, from: &str, to: &str, index: usize) -> BoardMoveCommand {
    BoardMoveCommand {
        task: task.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        index,
        dry_run: false,
    }
}
