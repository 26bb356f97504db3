// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Presentation math for the calendar and list views.
//!
//! Everything here is recomputed from the in-memory task list on each
//! render; nothing is persisted and there is no failure mode beyond
//! absent data. A task whose `end_hour` sorts before its `start_hour`
//! is treated as spanning past midnight into the following day.

use crate::Task;
use chrono::{Datelike, NaiveDate, Weekday};

/// Number of hour rows the calendar can scroll through.
pub const HOURS_PER_DAY: usize = 24;

/// Number of hour rows visible at once.
pub const HOUR_WINDOW: usize = 5;

/// Tasks shown per page in the list view.
pub const TASKS_PER_PAGE: usize = 7;

/// The label of an hour row, e.g. `hour_label(9) == "09:00"`.
pub fn hour_label(index: usize) -> String {
    format!("{:02}:00", index)
}

/// Index of a label among the 24 hour rows. Anything that is not an
/// exact label (minutes, garbage, out of range) maps to `None` and
/// never occupies a cell.
pub fn hour_index(label: &str) -> Option<usize> {
    (0..HOURS_PER_DAY).find(|&i| hour_label(i) == label)
}

/// The visible hour labels for a window starting at `window_start`.
/// The start is clamped so the window always holds `HOUR_WINDOW` rows.
pub fn visible_hours(window_start: usize) -> Vec<String> {
    let start = window_start.min(HOURS_PER_DAY - HOUR_WINDOW);
    (start..start + HOUR_WINDOW).map(hour_label).collect()
}

/// First day of the week containing `date`. Weeks start on Saturday.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Sat).first_day()
}

/// The seven day columns of the week starting at `week_start`.
pub fn week_days(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .map(|i| week_start + chrono::Duration::days(i))
        .collect()
}

/// Whether `task` visually occupies the cell at (`day`, `hour`).
///
/// Same-day tasks cover `[start, end)`. When the end sorts before the
/// start the interval wraps midnight: on the task's own day it covers
/// every row from the start down, and on the immediately following day
/// the rows before the end.
pub fn occupies_cell(task: &Task, day: NaiveDate, hour: &str) -> bool {
    let (Some(start), Some(end), Some(cell)) = (
        hour_index(&task.start_hour),
        hour_index(&task.end_hour),
        hour_index(hour),
    ) else {
        return false;
    };

    if task.date == day {
        if end < start {
            cell >= start
        } else {
            cell >= start && cell < end
        }
    } else if task.date.succ_opt() == Some(day) {
        end < start && cell < end
    } else {
        false
    }
}

/// All tasks occupying the cell at (`day`, `hour`), in input order.
pub fn tasks_in_cell<'a>(tasks: &'a [Task], day: NaiveDate, hour: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| occupies_cell(t, day, hour))
        .collect()
}

/// Date ranges selectable in the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFilter {
    Week,
    Month,
    Year,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl RangeFilter {
    /// Inclusive (start, end) bounds of the filter relative to `today`.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            RangeFilter::Week => {
                let week = today.week(Weekday::Sat);
                (week.first_day(), week.last_day())
            }
            RangeFilter::Month => {
                let first = today.with_day(1).expect("day 1 exists in every month");
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                let last = next_month
                    .and_then(|d| d.pred_opt())
                    .expect("month end exists");
                (first, last)
            }
            RangeFilter::Year => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1 exists"),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).expect("dec 31 exists"),
            ),
            RangeFilter::Custom { start, end } => (start, end),
        }
    }
}

/// Tasks whose date falls within `filter`'s bounds, in input order.
pub fn filter_by_range<'a>(
    tasks: &'a [Task],
    filter: RangeFilter,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let (start, end) = filter.bounds(today);
    tasks
        .iter()
        .filter(|t| t.date >= start && t.date <= end)
        .collect()
}

/// Number of pages needed for `len` tasks.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(TASKS_PER_PAGE)
}

/// The slice of `tasks` shown on `page` (1-indexed).
pub fn paginate<T>(tasks: &[T], page: usize) -> &[T] {
    let start = page.saturating_sub(1) * TASKS_PER_PAGE;
    if start >= tasks.len() {
        return &[];
    }
    let end = (start + TASKS_PER_PAGE).min(tasks.len());
    &tasks[start..end]
}
