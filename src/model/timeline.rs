use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar granularity represented by one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl ZoomLevel {
    pub const ALL: [ZoomLevel; 4] = [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month, ZoomLevel::Year];

    /// One step finer, saturating at day.
    pub fn zoomed_in(self) -> Self {
        match self {
            ZoomLevel::Day | ZoomLevel::Week => ZoomLevel::Day,
            ZoomLevel::Month => ZoomLevel::Week,
            ZoomLevel::Year => ZoomLevel::Month,
        }
    }

    /// One step coarser, saturating at year.
    pub fn zoomed_out(self) -> Self {
        match self {
            ZoomLevel::Day => ZoomLevel::Week,
            ZoomLevel::Week => ZoomLevel::Month,
            ZoomLevel::Month | ZoomLevel::Year => ZoomLevel::Year,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoomLevel::Day => "Day",
            ZoomLevel::Week => "Week",
            ZoomLevel::Month => "Month",
            ZoomLevel::Year => "Year",
        }
    }
}

/// Horizontal viewport of the timeline.
///
/// Column index 0 starts at `reference`; `scroll_offset` is a free-running
/// pixel value that is never snapped to calendar boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub reference: NaiveDate,
    pub scroll_offset: f64,
    pub column_width: f64,
    pub visible_columns: usize,
    /// Measured width of the chart area; defaults to `visible_columns * column_width`.
    pub container_width: f64,
}

impl ViewportState {
    pub fn new(reference: NaiveDate, column_width: f64, visible_columns: usize) -> Self {
        Self {
            reference,
            scroll_offset: Self::centered_offset(column_width, visible_columns),
            column_width,
            visible_columns,
            container_width: column_width * visible_columns as f64,
        }
    }

    /// Scroll offset that places `reference` in the middle of the viewport.
    pub fn centered_offset(column_width: f64, visible_columns: usize) -> f64 {
        -(visible_columns as f64 / 2.0) * column_width
    }

    /// Index of the left-most column touched by the viewport.
    pub fn first_column(&self) -> i64 {
        (self.scroll_offset / self.column_width).floor() as i64
    }
}
