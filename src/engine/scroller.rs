//! Free-running horizontal scroll and virtualized column generation.

use std::time::{Duration, Instant};

use chrono::{Datelike, Duration as Days, NaiveDate};

use super::mapper::{week_start, CoordinateMapper};
use crate::model::{ViewportState, ZoomLevel};

/// Below this vertical magnitude, any horizontal component claims the wheel event.
const SMALL_VERTICAL_DELTA: f64 = 5.0;
/// Columns generated around the viewport for the month band row.
const MONTH_BAND_BUFFER: i64 = 30;

/// Raw wheel event in browser convention: positive x scrolls content left.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    pub shift: bool,
}

impl WheelInput {
    pub fn is_horizontal(&self) -> bool {
        self.shift
            || self.delta_x.abs() > self.delta_y.abs()
            || (self.delta_x != 0.0 && self.delta_y.abs() < SMALL_VERTICAL_DELTA)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Scroll offset changed this frame.
    Scrolled,
    /// Accumulated; applied on the next animation frame.
    Deferred,
    /// Vertical intent: leave the event to the page.
    PassThrough,
    /// Consumed without effect (a drag is in progress).
    Suppressed,
}

/// Coalesces scroll input to at most one viewport change per frame.
///
/// `target` accumulates every delta immediately; the viewport only sees it
/// when a frame boundary has passed.
#[derive(Debug, Clone)]
pub struct Scroller {
    target: f64,
    last_commit: Option<Instant>,
    frame_pending: bool,
    frame_interval: Duration,
}

impl Scroller {
    pub fn new(viewport: &ViewportState, frame_interval: Duration) -> Self {
        Self {
            target: viewport.scroll_offset,
            last_commit: None,
            frame_pending: false,
            frame_interval,
        }
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending
    }

    pub fn wheel(&mut self, viewport: &mut ViewportState, input: WheelInput, now: Instant) -> WheelOutcome {
        if !input.is_horizontal() {
            return WheelOutcome::PassThrough;
        }
        let delta = if input.delta_x != 0.0 {
            input.delta_x
        } else {
            input.delta_y
        };
        self.target += delta;

        let due = self
            .last_commit
            .map_or(true, |last| now.saturating_duration_since(last) >= self.frame_interval);
        if due {
            self.commit(viewport, now);
            WheelOutcome::Scrolled
        } else {
            self.frame_pending = true;
            WheelOutcome::Deferred
        }
    }

    /// Animation-frame callback: flush any deferred wheel input.
    pub fn on_frame(&mut self, viewport: &mut ViewportState, now: Instant) -> bool {
        if !self.frame_pending {
            return false;
        }
        self.commit(viewport, now);
        true
    }

    /// Forget wheel input that has not reached the viewport yet.
    pub fn discard_pending(&mut self, viewport: &ViewportState) {
        self.target = viewport.scroll_offset;
        self.frame_pending = false;
    }

    /// Immediate scroll used by auto-scroll and the prev/next commands.
    pub fn scroll_by(&mut self, viewport: &mut ViewportState, delta: f64) {
        self.target += delta;
        viewport.scroll_offset = self.target;
    }

    pub fn scroll_to(&mut self, viewport: &mut ViewportState, offset: f64) {
        self.target = offset;
        self.frame_pending = false;
        viewport.scroll_offset = offset;
    }

    fn commit(&mut self, viewport: &mut ViewportState, now: Instant) {
        viewport.scroll_offset = self.target;
        self.last_commit = Some(now);
        self.frame_pending = false;
    }
}

/// One generated time column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub index: i64,
    pub date: NaiveDate,
    /// Viewport x of the column's left edge.
    pub left: f64,
    pub label: String,
}

pub fn column_label(zoom: ZoomLevel, date: NaiveDate) -> String {
    match zoom {
        ZoomLevel::Day => date.format("%a %-d").to_string(),
        ZoomLevel::Week => {
            let monday = week_start(date);
            let sunday = monday + Days::days(6);
            format!("{}-{}", monday.format("%b %-d"), sunday.format("%-d"))
        }
        ZoomLevel::Month => date.format("%b").to_string(),
        ZoomLevel::Year => date.format("%Y").to_string(),
    }
}

/// Columns covering the viewport plus `buffer` on each side.
pub fn visible_columns(mapper: &CoordinateMapper, viewport: &ViewportState, buffer: usize) -> Vec<Column> {
    let first = viewport.first_column();
    let buffer = buffer as i64;
    let width = viewport.column_width;
    (first - buffer..first + viewport.visible_columns as i64 + buffer)
        .map(|index| {
            let date = mapper.column_start(index);
            Column {
                index,
                date,
                left: index as f64 * width - viewport.scroll_offset,
                label: column_label(mapper.zoom(), date),
            }
        })
        .collect()
}

/// A run of day columns sharing one calendar month (day zoom's upper header).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBand {
    pub left: f64,
    pub width: f64,
    pub date: NaiveDate,
    pub label: String,
}

pub fn month_bands(mapper: &CoordinateMapper, viewport: &ViewportState) -> Vec<MonthBand> {
    if mapper.zoom() != ZoomLevel::Day {
        return Vec::new();
    }
    let first = viewport.first_column();
    let width = viewport.column_width;
    let mut bands: Vec<MonthBand> = Vec::new();
    for index in first - MONTH_BAND_BUFFER..first + viewport.visible_columns as i64 + MONTH_BAND_BUFFER {
        let date = mapper.column_start(index);
        let left = index as f64 * width - viewport.scroll_offset;
        match bands.last_mut() {
            Some(band) if (band.date.year(), band.date.month()) == (date.year(), date.month()) => {
                band.width = left + width - band.left;
            }
            _ => bands.push(MonthBand {
                left,
                width,
                date,
                label: date.format("%B %Y").to_string(),
            }),
        }
    }
    bands
}
