//! Timeline command for the Gantt view
//!
//! Implements `pb timeline`.

use std::fmt;

use clap::Args;
use planboard_views::{AxisTick, TimelineLayout, compute_layout, milestone_summary};
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{format_timeline, render};
use crate::snapshot::Snapshot;

/// Lay out timeline tasks and milestones
#[derive(Debug, Args)]
pub struct TimelineCommand {
    /// Include axis ticks for the chosen zoom level
    #[arg(long)]
    pub ticks: bool,
}

/// Result of `pb timeline`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResult {
    /// The layout, absent when nothing carries a date
    pub layout: Option<TimelineLayout>,
    /// Axis ticks, when requested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<AxisTick>,
    /// Comma-separated milestone labels
    pub milestone_summary: String,
    #[serde(skip)]
    show_ticks: bool,
}

impl fmt::Display for TimelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layout {
            Some(layout) => write!(f, "{}", format_timeline(layout, self.show_ticks)),
            None => write!(
                f,
                "No dated tasks or milestones.\nMilestones: {}",
                self.milestone_summary
            ),
        }
    }
}

impl TimelineCommand {
    /// Compute the layout for the snapshot's timeline records.
    pub fn layout(&self, snapshot: &Snapshot) -> TimelineResult {
        let layout = compute_layout(&snapshot.gantt_tasks, &snapshot.milestones);
        let ticks = match (&layout, self.ticks) {
            (Some(layout), true) => layout.ticks(),
            _ => Vec::new(),
        };

        TimelineResult {
            layout,
            ticks,
            milestone_summary: milestone_summary(&snapshot.milestones),
            show_ticks: self.ticks,
        }
    }

    /// Execute the timeline command against a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Encode` if JSON output fails.
    pub fn execute(&self, snapshot: &Snapshot, json: bool) -> CliResult<String> {
        render(&self.layout(snapshot), json)
    }
}
