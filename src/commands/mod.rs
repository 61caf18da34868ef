//! CLI commands for Planboard
//!
//! This module contains all subcommand implementations for the pb CLI.

pub mod board;
pub mod timeline;
pub mod tree;

pub use board::{BoardCommand, BoardMoveCommand, ColumnsCommand};
pub use timeline::TimelineCommand;
pub use tree::{TreeCommand, TreeDependCommand, TreeMoveCommand};

use crate::error::CliResult;
use crate::snapshot::Snapshot;
use clap::Subcommand;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work breakdown tree: flatten, outline, move, depend
    #[command(subcommand)]
    Tree(TreeCommand),
    /// Kanban board: group, move, columns
    #[command(subcommand)]
    Board(BoardCommand),
    /// Gantt timeline layout
    Timeline(TimelineCommand),
}

impl Command {
    /// Whether the command reads a snapshot.
    pub fn needs_snapshot(&self) -> bool {
        match self {
            Command::Board(cmd) => cmd.needs_snapshot(),
            Command::Tree(_) | Command::Timeline(_) => true,
        }
    }

    /// Execute the command against a loaded snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Records to operate on
    /// * `json` - Emit JSON instead of text
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the command is rejected or its output cannot be
    /// encoded.
    pub fn execute(&self, snapshot: &Snapshot, json: bool) -> CliResult<String> {
        match self {
            Command::Tree(cmd) => cmd.execute(snapshot, json),
            Command::Board(cmd) => cmd.execute(snapshot, json),
            Command::Timeline(cmd) => cmd.execute(snapshot, json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use planboard_views::Status;

    /// Test struct to parse commands
    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_command_tree_flatten_parses() {
        let cli = TestCli::try_parse_from(["test", "tree", "flatten"]).unwrap();
        assert!(matches!(cli.command, Command::Tree(TreeCommand::Flatten)));
    }

    #[test]
    fn test_command_tree_move_parses() {
        let cli = TestCli::try_parse_from([
            "test", "tree", "move", "b", "--parent", "a", "--order", "2",
        ])
        .unwrap();
        match cli.command {
            Command::Tree(TreeCommand::Move(cmd)) => {
                assert_eq!(cmd.node, "b");
                assert_eq!(cmd.parent.as_deref(), Some("a"));
                assert_eq!(cmd.order, 2);
                assert!(!cmd.dry_run);
            }
            other => panic!("Expected tree move, got {:?}", other),
        }
    }

    #[test]
    fn test_command_tree_move_defaults_to_root() {
        let cli = TestCli::try_parse_from(["test", "tree", "move", "b", "--order", "-1"]).unwrap();
        match cli.command {
            Command::Tree(TreeCommand::Move(cmd)) => {
                assert!(cmd.parent.is_none());
                assert_eq!(cmd.order, -1);
            }
            other => panic!("Expected tree move, got {:?}", other),
        }
    }

    #[test]
    fn test_command_tree_depend_parses() {
        let cli = TestCli::try_parse_from([
            "test", "tree", "depend", "c", "--after", "a", "--after", "b",
        ])
        .unwrap();
        match cli.command {
            Command::Tree(TreeCommand::Depend(cmd)) => {
                assert_eq!(cmd.node, "c");
                assert_eq!(cmd.predecessors, vec!["a", "b"]);
                assert!(!cmd.dry_run);
            }
            other => panic!("Expected tree depend, got {:?}", other),
        }
    }

    #[test]
    fn test_command_board_move_parses() {
        let cli = TestCli::try_parse_from([
            "test", "board", "move", "t3", "--from", "todo", "--to", "doing", "--index", "1",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Command::Board(BoardCommand::Move(cmd)) => {
                assert_eq!(cmd.task, "t3");
                assert_eq!(cmd.from, "todo");
                assert_eq!(cmd.to, "doing");
                assert_eq!(cmd.index, 1);
                assert!(cmd.dry_run);
            }
            other => panic!("Expected board move, got {:?}", other),
        }
    }

    #[test]
    fn test_command_board_move_requires_columns() {
        let cli = TestCli::try_parse_from(["test", "board", "move", "t3", "--to", "doing"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_command_board_columns_parses_limits() {
        let cli = TestCli::try_parse_from([
            "test",
            "board",
            "columns",
            "--wip",
            "IN_PROGRESS=2",
            "--wip",
            "review=1",
        ])
        .unwrap();
        match &cli.command {
            Command::Board(BoardCommand::Columns(cmd)) => {
                assert_eq!(cmd.wip, vec![(Status::InProgress, 2), (Status::Review, 1)]);
            }
            other => panic!("Expected board columns, got {:?}", other),
        }
        assert!(!cli.command.needs_snapshot());
    }

    #[test]
    fn test_command_board_columns_rejects_unknown_status() {
        let cli = TestCli::try_parse_from(["test", "board", "columns", "--wip", "LATER=1"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_command_timeline_parses() {
        let cli = TestCli::try_parse_from(["test", "timeline", "--ticks"]).unwrap();
        match &cli.command {
            Command::Timeline(cmd) => assert!(cmd.ticks),
            other => panic!("Expected timeline, got {:?}", other),
        }
        assert!(cli.command.needs_snapshot());
    }
}
