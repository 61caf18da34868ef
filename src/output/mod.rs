//! Output formatting module for Planboard
//!
//! Provides table, outline and timeline-track formatting for CLI output, plus
//! the JSON encoder used by `--json`.

use std::collections::HashMap;
use std::fmt::Display;

use planboard_views::{BoardColumn, ColumnState, FlatEntry, TimelineLayout, TreeView, WbsCode};
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// Maximum width for the title column before truncation
const MAX_TITLE_WIDTH: usize = 30;

/// Number of cells in a rendered timeline track
const TRACK_WIDTH: usize = 40;

/// Visual prefix characters for tree structure.
mod tree_chars {
    /// Branch connector for intermediate items.
    pub const BRANCH: &str = "\u{251C}\u{2500}\u{2500} "; // ├──
    /// Last item connector.
    pub const LAST_BRANCH: &str = "\u{2514}\u{2500}\u{2500} "; // └──
    /// Vertical line for continuing structure.
    pub const VERTICAL: &str = "\u{2502}   "; // │
    /// Empty space for alignment.
    pub const SPACE: &str = "    ";
}

/// Cells of a timeline track.
mod track_chars {
    /// Cell covered by a bar.
    pub const FILLED: char = '\u{2588}'; // █
    /// Cell outside the bar.
    pub const EMPTY: char = '\u{00B7}'; // ·
}

/// Encode a command result as pretty-printed JSON.
///
/// # Errors
///
/// Returns `CliError::Encode` if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(CliError::Encode)
}

/// Render a command result as text, or as JSON when `json` is set.
///
/// # Errors
///
/// Returns `CliError::Encode` if JSON serialization fails.
pub fn render<T: Serialize + Display>(value: &T, json: bool) -> CliResult<String> {
    if json {
        to_json(value)
    } else {
        Ok(value.to_string())
    }
}

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{}...", head)
    }
}

/// Format rows into an aligned table string.
///
/// Column widths follow the widest cell or header. A dashed separator row
/// sits under the headers and trailing spaces are trimmed from every line.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str), &widths));
    }

    lines.join("\n")
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

// ========================================
// Tree output
// ========================================

/// Format flattened tree entries as a table.
pub fn format_flat_entries(entries: &[FlatEntry<'_>]) -> String {
    if entries.is_empty() {
        return "No nodes found.".to_string();
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.id.to_string(),
                entry.parent.to_string(),
                entry.node.order.to_string(),
                entry.node.status.clone(),
                truncate(&entry.node.title, MAX_TITLE_WIDTH),
            ]
        })
        .collect();

    format_table(&["ID", "Parent", "Order", "Status", "Title"], &rows)
}

/// Build the connector prefix for a node line.
///
/// `prefix_parts` holds one flag per ancestor below the root: `true` when the
/// ancestor has later siblings and needs a continuing vertical line.
fn build_prefix(prefix_parts: &[bool], is_last: bool) -> String {
    let mut prefix = String::new();

    for &has_vertical in prefix_parts {
        if has_vertical {
            prefix.push_str(tree_chars::VERTICAL);
        } else {
            prefix.push_str(tree_chars::SPACE);
        }
    }

    if is_last {
        prefix.push_str(tree_chars::LAST_BRANCH);
    } else {
        prefix.push_str(tree_chars::BRANCH);
    }

    prefix
}

/// Format a forest as an outline with WBS codes.
///
/// Produces output in the format:
/// ```text
/// 1 Platform [IN_PROGRESS]
/// ├── 1.1 API [BACKLOG]
/// │   └── 1.1.1 Auth [DONE]
/// └── 1.2 UI [REVIEW]
/// ```
pub fn format_outline(forest: &[TreeView], codes: &[WbsCode]) -> String {
    if forest.is_empty() {
        return "No nodes found.".to_string();
    }

    let codes: HashMap<&str, &str> = codes
        .iter()
        .map(|c| (c.id.as_str(), c.code.as_str()))
        .collect();

    let mut lines = Vec::new();
    let mut prefix_parts = Vec::new();
    for root in forest {
        lines.push(outline_line("", root, &codes));
        push_children(&mut lines, root, &codes, &mut prefix_parts);
    }

    lines.join("\n")
}

fn push_children(
    lines: &mut Vec<String>,
    view: &TreeView,
    codes: &HashMap<&str, &str>,
    prefix_parts: &mut Vec<bool>,
) {
    let count = view.children.len();
    for (i, child) in view.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let prefix = build_prefix(prefix_parts, is_last);
        lines.push(outline_line(&prefix, child, codes));

        prefix_parts.push(!is_last);
        push_children(lines, child, codes, prefix_parts);
        prefix_parts.pop();
    }
}

fn outline_line(prefix: &str, view: &TreeView, codes: &HashMap<&str, &str>) -> String {
    let code = codes.get(view.node.id.as_str()).copied().unwrap_or("-");
    format!(
        "{}{} {} [{}]",
        prefix,
        code,
        truncate(&view.node.title, MAX_TITLE_WIDTH),
        view.node.status
    )
}

// ========================================
// Board output
// ========================================

fn column_header(column: &BoardColumn) -> String {
    let count = match column.limit() {
        Some(limit) => format!("{}/{}", column.tasks.len(), limit),
        None => column.tasks.len().to_string(),
    };
    let marker = match ColumnState::of(column) {
        ColumnState::AtLimit => " (at limit)",
        ColumnState::OverLimit => " (over limit)",
        _ => "",
    };
    format!("{} [{}] {}{}", column.label, column.id, count, marker)
}

/// Format board columns with their cards.
///
/// Empty columns show an explicit `(no tasks)` line; orphaned task ids are
/// listed at the end.
pub fn format_board(columns: &[BoardColumn], orphaned: &[String]) -> String {
    if columns.is_empty() {
        return "No columns found.".to_string();
    }

    let mut lines = Vec::new();
    for column in columns {
        lines.push(column_header(column));
        if column.is_empty() {
            lines.push("  (no tasks)".to_string());
        }
        for task in &column.tasks {
            let priority = task
                .priority
                .map(|p| format!(" [{}]", p.as_str()))
                .unwrap_or_default();
            lines.push(format!(
                "  - {}  {}{}",
                task.id,
                truncate(&task.title, MAX_TITLE_WIDTH),
                priority
            ));
        }
    }

    if !orphaned.is_empty() {
        lines.push(format!("Orphaned: {}", orphaned.join(", ")));
    }

    lines.join("\n")
}

/// Format the column definitions as a table.
pub fn format_columns(columns: &[BoardColumn]) -> String {
    let rows: Vec<Vec<String>> = columns
        .iter()
        .map(|column| {
            vec![
                column.id.clone(),
                column.label.clone(),
                column
                    .limit()
                    .map_or_else(|| "-".to_string(), |limit| limit.to_string()),
            ]
        })
        .collect();

    format_table(&["ID", "Label", "WIP"], &rows)
}

// ========================================
// Timeline output
// ========================================

/// Render a bar as a fixed-width track of cells.
///
/// Every bar covers at least one cell, even when the bar sits on the right
/// edge of the window.
fn render_track(offset_percent: f64, width_percent: f64) -> String {
    let cells = TRACK_WIDTH as f64;
    let start = ((offset_percent / 100.0 * cells).round() as usize).min(TRACK_WIDTH - 1);
    let len = (width_percent / 100.0 * cells).round().max(1.0) as usize;
    let end = (start + len).min(TRACK_WIDTH);

    (0..TRACK_WIDTH)
        .map(|cell| {
            if (start..end).contains(&cell) {
                track_chars::FILLED
            } else {
                track_chars::EMPTY
            }
        })
        .collect()
}

/// Format a timeline layout with one track per task.
pub fn format_timeline(layout: &TimelineLayout, show_ticks: bool) -> String {
    let mut lines = vec![format!(
        "Timeline {} to {} ({} days)",
        layout.min_date, layout.max_date, layout.total_days
    )];

    if !layout.bars.is_empty() {
        let rows: Vec<Vec<String>> = layout
            .bars
            .iter()
            .map(|bar| {
                vec![
                    bar.id.clone(),
                    truncate(&bar.title, MAX_TITLE_WIDTH),
                    bar.status.clone(),
                    format!("{:.1}%", bar.offset_percent),
                    format!("{:.1}%", bar.width_percent),
                    render_track(bar.offset_percent, bar.width_percent),
                ]
            })
            .collect();
        lines.push(format_table(
            &["ID", "Title", "Status", "Offset", "Width", "Track"],
            &rows,
        ));
    }

    if show_ticks {
        let ticks = layout
            .ticks()
            .iter()
            .map(|tick| format!("{}@{:.0}%", tick.label, tick.offset_percent))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Ticks: {}", ticks));
    }

    lines.push(format!("Milestones: {}", layout.milestone_summary()));
    lines.join("\n")
}
