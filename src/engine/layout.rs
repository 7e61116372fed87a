//! Bar and delay-segment geometry.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::mapper::CoordinateMapper;
use crate::model::{Task, User, UserId, ZoomLevel};

/// Horizontal extent in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarExtent {
    pub left: f64,
    pub width: f64,
}

impl BarExtent {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.left && x <= self.right()
    }
}

/// Time elapsed past the due date, for overdue or late-completed work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayInfo {
    /// Completion day for completed tasks, today for ongoing ones.
    pub end: NaiveDate,
    pub days: i64,
    pub ongoing: bool,
}

/// Vertical metrics, which vary with zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub row_height: f64,
    pub bar_height: f64,
    pub header_height: f64,
}

impl RowMetrics {
    pub fn for_zoom(zoom: ZoomLevel) -> Self {
        let (row_height, bar_height) = if zoom == ZoomLevel::Month {
            (64.0, 40.0)
        } else {
            (70.0, 48.0)
        };
        Self {
            row_height,
            bar_height,
            header_height: if zoom == ZoomLevel::Day { 64.0 } else { 32.0 },
        }
    }

    pub fn bar_top(&self, row: usize) -> f64 {
        row as f64 * self.row_height + ((self.row_height - self.bar_height) / 2.0).round()
    }

    /// Rows to paint: at least enough to fill `viewport_height`.
    pub fn filler_rows(&self, visible: usize, viewport_height: f64) -> usize {
        let fit = ((viewport_height - self.header_height).max(0.0) / self.row_height).ceil();
        visible.max(fit as usize)
    }
}

/// Delay for a task whose effective due date is `due`.
///
/// Completed tasks are late only when completion lands on a later calendar
/// day than due; ongoing tasks are late once `today` is past due.
pub fn delay_info(task: &Task, due: NaiveDate, today: NaiveDate) -> Option<DelayInfo> {
    if task.is_completed() {
        let done = task.completion_day()?;
        (done > due).then(|| DelayInfo {
            end: done,
            days: (done - due).num_days(),
            ongoing: false,
        })
    } else {
        (today > due).then(|| DelayInfo {
            end: today,
            days: (today - due).num_days(),
            ongoing: true,
        })
    }
}

/// Main bar: from the left edge of `start` to the end of the unit holding `due`.
pub fn bar_extent(
    mapper: &CoordinateMapper,
    start: NaiveDate,
    due: NaiveDate,
    min_width: f64,
) -> BarExtent {
    let left = mapper.left_px(start);
    let width = mapper.left_px(mapper.unit_end(due)) - left;
    BarExtent {
        left,
        width: width.max(min_width),
    }
}

/// Delay overlay, attached to the right edge of the main bar.
///
/// Ongoing delays never extend past the today marker; an overlay clamped to
/// nothing is not drawn.
pub fn delay_extent(
    mapper: &CoordinateMapper,
    bar: &BarExtent,
    due: NaiveDate,
    delay: &DelayInfo,
    now: NaiveDateTime,
) -> Option<BarExtent> {
    let left = bar.right();
    let mut width = mapper.left_px(delay.end) - mapper.left_px(due);
    if delay.ongoing {
        width = width.min(mapper.marker_px(now) - left);
    }
    (width > 0.0).then_some(BarExtent { left, width })
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeChip {
    pub user_id: UserId,
    pub initial: char,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Avatar chips shown inside a bar: the first two assignees and an overflow count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssigneeChips {
    pub chips: Vec<AssigneeChip>,
    pub overflow: usize,
}

const MAX_CHIPS: usize = 2;

fn chip_min_bar_width(zoom: ZoomLevel) -> f64 {
    match zoom {
        ZoomLevel::Day => 100.0,
        ZoomLevel::Week | ZoomLevel::Month => 140.0,
        ZoomLevel::Year => 180.0,
    }
}

pub fn assignee_chips(
    task: &Task,
    roster: &HashMap<UserId, User>,
    bar_width: f64,
    zoom: ZoomLevel,
) -> AssigneeChips {
    if bar_width < chip_min_bar_width(zoom) {
        return AssigneeChips::default();
    }
    let chips = task
        .assigned_user_ids
        .iter()
        .take(MAX_CHIPS)
        .map(|id| {
            let user = roster.get(id);
            AssigneeChip {
                user_id: *id,
                initial: user
                    .and_then(|u| u.name.chars().next())
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('U'),
                name: user.map(|u| u.name.clone()),
                avatar_url: user.and_then(|u| u.avatar_url.clone()),
            }
        })
        .collect();
    AssigneeChips {
        chips,
        overflow: task.assigned_user_ids.len().saturating_sub(MAX_CHIPS),
    }
}
