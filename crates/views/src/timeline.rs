//! Gantt timeline layout.
//!
//! Maps task date ranges and milestones onto a horizontal axis expressed in
//! percent of the visible window, so any renderer can scale it to its own
//! width. The window spans the earliest to the latest date found among task
//! bounds and milestone due dates.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::{GanttMilestone, GanttTask};

/// Width given to undated or very short bars so they stay visible.
pub const MIN_WIDTH_PERCENT: f64 = 5.0;

/// Date format used in milestone labels.
const MILESTONE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Zoom level for the axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    /// Show individual days (for ranges < 14 days).
    Days,
    /// Show weeks (for ranges 14-90 days).
    Weeks,
    /// Show months (for ranges > 90 days).
    Months,
}

impl ZoomLevel {
    /// Determine the appropriate zoom level based on the number of days.
    pub fn from_days(days: i64) -> Self {
        if days < 14 {
            ZoomLevel::Days
        } else if days < 90 {
            ZoomLevel::Weeks
        } else {
            ZoomLevel::Months
        }
    }
}

/// Horizontal placement of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBar {
    /// Task id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Task status.
    pub status: String,
    /// Left edge, in percent of the window.
    pub offset_percent: f64,
    /// Bar width, in percent of the window (at least [`MIN_WIDTH_PERCENT`]).
    pub width_percent: f64,
    /// Whether a bound was missing and the bar is a placeholder.
    pub undated: bool,
}

/// A milestone with its label and axis position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneMarker {
    /// Milestone name.
    pub name: String,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Display label, e.g. `Launch (15/03/2024)`.
    pub label: String,
    /// Position on the axis; `None` when undated.
    pub offset_percent: Option<f64>,
}

/// A labelled grid line on the axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTick {
    /// Label to display at this tick.
    pub label: String,
    /// Position in percent of the window.
    pub offset_percent: f64,
}

/// Computed timeline layout for one snapshot of tasks and milestones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLayout {
    /// Earliest date in the window.
    pub min_date: NaiveDate,
    /// Latest date in the window.
    pub max_date: NaiveDate,
    /// Window length in days, never below 1.
    pub total_days: i64,
    /// One bar per task, in input order.
    pub bars: Vec<TaskBar>,
    /// One marker per milestone, in input order.
    pub milestones: Vec<MilestoneMarker>,
}

/// Compute the layout, or `None` when no task or milestone carries a date.
pub fn compute_layout(
    tasks: &[GanttTask],
    milestones: &[GanttMilestone],
) -> Option<TimelineLayout> {
    let dates = tasks
        .iter()
        .flat_map(|task| [task.start_date, task.end_date])
        .chain(milestones.iter().map(|milestone| milestone.due_date))
        .flatten();

    let (min_date, max_date) = dates.fold(None, |range, date| match range {
        None => Some((date, date)),
        Some((min, max)) => Some((date.min(min), date.max(max))),
    })?;

    let total_days = (max_date - min_date).num_days().max(1);
    debug!(
        "Timeline window: {} to {} ({} days)",
        min_date, max_date, total_days
    );

    let mut layout = TimelineLayout {
        min_date,
        max_date,
        total_days,
        bars: Vec::with_capacity(tasks.len()),
        milestones: Vec::with_capacity(milestones.len()),
    };

    layout.bars = tasks
        .iter()
        .map(|task| TaskBar {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.clone(),
            offset_percent: layout.offset_percent(task.start_date),
            width_percent: layout.width_percent(task.start_date, task.end_date),
            undated: !task.is_dated(),
        })
        .collect();

    layout.milestones = milestones
        .iter()
        .map(|milestone| MilestoneMarker {
            name: milestone.name.clone(),
            due_date: milestone.due_date,
            label: format_milestone(milestone),
            offset_percent: milestone.due_date.map(|due| layout.offset_percent(Some(due))),
        })
        .collect();

    Some(layout)
}

/// Format a milestone as `Name (dd/mm/yyyy)`, or `Name (N/A)` when undated.
pub fn format_milestone(milestone: &GanttMilestone) -> String {
    match milestone.due_date {
        Some(due) => format!(
            "{} ({})",
            milestone.name,
            due.format(MILESTONE_DATE_FORMAT)
        ),
        None => format!("{} (N/A)", milestone.name),
    }
}

/// Comma-separated milestone labels in input order.
pub fn milestone_summary(milestones: &[GanttMilestone]) -> String {
    join_labels(milestones.iter().map(format_milestone))
}

fn join_labels<S: AsRef<str>>(labels: impl Iterator<Item = S>) -> String {
    let labels: Vec<S> = labels.collect();
    if labels.is_empty() {
        return "No milestones".to_string();
    }
    labels
        .iter()
        .map(|label| label.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

impl TimelineLayout {
    /// Share of the window covered by `days`, in percent.
    fn percent_of_window(&self, days: i64) -> f64 {
        days as f64 * 100.0 / self.total_days as f64
    }

    /// Left edge of a date in percent, clamped to `[0, 100]`.
    ///
    /// A missing date sits at the window start.
    pub fn offset_percent(&self, date: Option<NaiveDate>) -> f64 {
        match date {
            Some(date) => self
                .percent_of_window((date - self.min_date).num_days())
                .clamp(0.0, 100.0),
            None => 0.0,
        }
    }

    /// Width of a date range in percent, at least [`MIN_WIDTH_PERCENT`].
    ///
    /// If either bound is missing the bar is a fixed-width placeholder.
    pub fn width_percent(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> f64 {
        match (start, end) {
            (Some(start), Some(end)) => {
                self.percent_of_window((end - start).num_days())
                    .max(MIN_WIDTH_PERCENT)
            }
            _ => MIN_WIDTH_PERCENT,
        }
    }

    /// Look up the bar of a task.
    pub fn bar(&self, id: &str) -> Option<&TaskBar> {
        self.bars.iter().find(|bar| bar.id == id)
    }

    /// Zoom level matching the window length.
    pub fn zoom_level(&self) -> ZoomLevel {
        ZoomLevel::from_days(self.total_days)
    }

    /// Labels joined as in [`milestone_summary`].
    pub fn milestone_summary(&self) -> String {
        join_labels(self.milestones.iter().map(|marker| marker.label.as_str()))
    }

    /// Axis ticks for the current zoom level.
    pub fn ticks(&self) -> Vec<AxisTick> {
        match self.zoom_level() {
            ZoomLevel::Days => self.day_ticks(),
            ZoomLevel::Weeks => self.week_ticks(),
            ZoomLevel::Months => self.month_ticks(),
        }
    }

    fn tick(&self, label: String, date: NaiveDate) -> AxisTick {
        AxisTick {
            label,
            offset_percent: self.offset_percent(Some(date)),
        }
    }

    fn day_ticks(&self) -> Vec<AxisTick> {
        (0..=self.total_days as u64)
            .map_while(|day_offset| self.min_date.checked_add_days(Days::new(day_offset)))
            .map(|date| self.tick(date.format("%m/%d").to_string(), date))
            .collect()
    }

    fn week_ticks(&self) -> Vec<AxisTick> {
        let mut ticks = Vec::new();

        // Find the first Monday on or after the window start
        let days_until_monday = (7 - self.min_date.weekday().num_days_from_monday()) % 7;
        let mut week_start = self
            .min_date
            .checked_add_days(Days::new(u64::from(days_until_monday)));

        // Partial leading week
        if week_start != Some(self.min_date) {
            ticks.push(self.tick(self.min_date.format("%m/%d").to_string(), self.min_date));
        }

        // Stops at the end of the window or of the calendar
        while let Some(monday) = week_start
            && monday <= self.max_date
        {
            let label = format!("W{}", monday.iso_week().week());
            ticks.push(self.tick(label, monday));
            week_start = monday.checked_add_days(Days::new(7));
        }

        ticks
    }

    fn month_ticks(&self) -> Vec<AxisTick> {
        let mut ticks = Vec::new();

        let mut month_start =
            NaiveDate::from_ymd_opt(self.min_date.year(), self.min_date.month(), 1)
                .unwrap_or(self.min_date);

        while month_start <= self.max_date {
            let next = if month_start.month() == 12 {
                NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
            };

            let visible_start = month_start.max(self.min_date);
            ticks.push(self.tick(month_start.format("%b").to_string(), visible_start));

            match next {
                Some(next) => month_start = next,
                None => break,
            }
        }

        ticks
    }
}
