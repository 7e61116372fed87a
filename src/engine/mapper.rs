//! Bidirectional date ↔ pixel transform.
//!
//! All per-zoom arithmetic lives in [`STRATEGIES`], one entry per
//! [`ZoomLevel`]. Month and year lengths are always the real calendar
//! lengths of the period involved.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};

use crate::model::{ViewportState, ZoomLevel};

/// Tolerance used when flooring fractional offsets back to whole units.
const EPSILON: f64 = 1e-6;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(date.year()) => 29,
        _ => 28,
    }
}

pub fn days_in_year(date: NaiveDate) -> u32 {
    if is_leap_year(date.year()) {
        366
    } else {
        365
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

/// Shift by whole months, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, months: i64) -> NaiveDate {
    let Ok(magnitude) = u32::try_from(months.unsigned_abs()) else {
        return date;
    };
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    };
    shifted.unwrap_or(date)
}

pub fn shift_years(date: NaiveDate, years: i64) -> NaiveDate {
    shift_months(date, years.saturating_mul(12))
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Completed anniversaries of `reference` up to `date`, floored for negative spans.
pub fn years_between(date: NaiveDate, reference: NaiveDate) -> i64 {
    let mut years = (date.year() - reference.year()) as i64;
    if (date.month(), date.day()) < (reference.month(), reference.day()) {
        years -= 1;
    }
    years
}

/// Per-zoom calendar arithmetic.
pub struct ZoomStrategy {
    pub zoom: ZoomLevel,
    /// Fractional column index of `date` relative to `reference`.
    pub to_offset: fn(NaiveDate, NaiveDate) -> f64,
    /// Inverse of `to_offset`, resolved to the zoom's granularity.
    pub from_offset: fn(f64, NaiveDate) -> NaiveDate,
    /// Pixels covered by one day around `anchor`, given a column width.
    pub pixels_per_day: fn(f64, NaiveDate) -> f64,
    /// Exclusive end of the time unit that contains the inclusive due date.
    pub unit_end: fn(NaiveDate) -> NaiveDate,
    /// First date shown in column `index`.
    pub column_start: fn(i64, NaiveDate) -> NaiveDate,
    /// Offset of the live "today" marker. Week and month columns are too
    /// coarse for a time of day, so the marker sits at the end of today.
    pub marker_offset: fn(NaiveDateTime, NaiveDate) -> f64,
}

pub static STRATEGIES: [ZoomStrategy; 4] = [
    ZoomStrategy {
        zoom: ZoomLevel::Day,
        to_offset: |date, reference| (date - reference).num_days() as f64,
        from_offset: |offset, reference| {
            reference + Duration::days((offset + EPSILON).floor() as i64)
        },
        pixels_per_day: |width, _| width,
        unit_end: |due| due + Duration::days(1),
        column_start: |index, reference| reference + Duration::days(index),
        marker_offset: |now, reference| {
            let within = now.time().num_seconds_from_midnight() as f64 / 86_400.0;
            (now.date() - reference).num_days() as f64 + within
        },
    },
    ZoomStrategy {
        zoom: ZoomLevel::Week,
        to_offset: |date, reference| {
            let weeks = (week_start(date) - week_start(reference)).num_days() / 7;
            weeks as f64 + date.weekday().num_days_from_monday() as f64 / 7.0
        },
        from_offset: |offset, reference| {
            let weeks = (offset + EPSILON).floor();
            let day = (((offset - weeks) * 7.0 + EPSILON).floor() as i64).clamp(0, 6);
            week_start(reference) + Duration::days(weeks as i64 * 7 + day)
        },
        pixels_per_day: |width, _| width / 7.0,
        unit_end: |due| due + Duration::days(1),
        column_start: |index, reference| week_start(reference) + Duration::weeks(index),
        marker_offset: |now, reference| {
            (STRATEGIES[1].to_offset)(now.date() + Duration::days(1), reference)
        },
    },
    ZoomStrategy {
        zoom: ZoomLevel::Month,
        to_offset: |date, reference| {
            let months = month_index(date) - month_index(reference);
            months as f64 + date.day0() as f64 / days_in_month(date) as f64
        },
        from_offset: |offset, reference| {
            let months = (offset + EPSILON).floor();
            let start = shift_months(month_start(reference), months as i64);
            let length = days_in_month(start) as i64;
            let day = (((offset - months) * length as f64 + EPSILON).floor() as i64)
                .clamp(0, length - 1);
            start + Duration::days(day)
        },
        pixels_per_day: |width, anchor| width / days_in_month(anchor) as f64,
        unit_end: |due| due + Duration::days(1),
        column_start: |index, reference| shift_months(month_start(reference), index),
        marker_offset: |now, reference| {
            (STRATEGIES[2].to_offset)(now.date() + Duration::days(1), reference)
        },
    },
    ZoomStrategy {
        zoom: ZoomLevel::Year,
        to_offset: |date, reference| years_between(date, reference) as f64,
        from_offset: |offset, reference| {
            shift_years(reference, (offset + EPSILON).floor() as i64)
        },
        pixels_per_day: |width, anchor| width / days_in_year(anchor) as f64,
        unit_end: |due| shift_years(due, 1),
        column_start: |index, reference| shift_years(reference, index),
        marker_offset: |now, reference| (STRATEGIES[3].to_offset)(now.date(), reference),
    },
];

pub fn strategy(zoom: ZoomLevel) -> &'static ZoomStrategy {
    match zoom {
        ZoomLevel::Day => &STRATEGIES[0],
        ZoomLevel::Week => &STRATEGIES[1],
        ZoomLevel::Month => &STRATEGIES[2],
        ZoomLevel::Year => &STRATEGIES[3],
    }
}

/// Maps dates to viewport pixels for one zoom level and viewport snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    zoom: ZoomLevel,
    reference: NaiveDate,
    scroll_offset: f64,
    column_width: f64,
}

impl CoordinateMapper {
    pub fn new(zoom: ZoomLevel, viewport: &ViewportState) -> Self {
        Self {
            zoom,
            reference: viewport.reference,
            scroll_offset: viewport.scroll_offset,
            column_width: viewport.column_width,
        }
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Fractional column index of `date`.
    pub fn offset(&self, date: NaiveDate) -> f64 {
        (strategy(self.zoom).to_offset)(date, self.reference)
    }

    /// Viewport x of the left edge of `date`.
    pub fn left_px(&self, date: NaiveDate) -> f64 {
        self.offset(date) * self.column_width - self.scroll_offset
    }

    /// Date under viewport x `px`.
    pub fn date_at(&self, px: f64) -> NaiveDate {
        let offset = (px + self.scroll_offset) / self.column_width;
        (strategy(self.zoom).from_offset)(offset, self.reference)
    }

    /// Exclusive end of the unit containing `due`.
    pub fn unit_end(&self, due: NaiveDate) -> NaiveDate {
        (strategy(self.zoom).unit_end)(due)
    }

    pub fn pixels_per_day(&self, anchor: NaiveDate) -> f64 {
        (strategy(self.zoom).pixels_per_day)(self.column_width, anchor)
    }

    /// Viewport x of the "today" marker.
    pub fn marker_px(&self, now: NaiveDateTime) -> f64 {
        (strategy(self.zoom).marker_offset)(now, self.reference) * self.column_width
            - self.scroll_offset
    }

    pub fn column_start(&self, index: i64) -> NaiveDate {
        (strategy(self.zoom).column_start)(index, self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mapper(zoom: ZoomLevel, reference: NaiveDate, scroll: f64) -> CoordinateMapper {
        let mut vp = ViewportState::new(reference, 120.0, 12);
        vp.scroll_offset = scroll;
        CoordinateMapper::new(zoom, &vp)
    }

    #[test]
    fn strategy_table_is_keyed_by_zoom() {
        for zoom in ZoomLevel::ALL {
            assert_eq!(strategy(zoom).zoom, zoom);
        }
    }

    #[test]
    fn calendar_lengths_are_exact() {
        assert_eq!(days_in_month(day(2024, 2, 10)), 29);
        assert_eq!(days_in_month(day(2023, 2, 10)), 28);
        assert_eq!(days_in_month(day(1900, 2, 1)), 28);
        assert_eq!(days_in_month(day(2000, 2, 1)), 29);
        assert_eq!(days_in_month(day(2024, 4, 30)), 30);
        assert_eq!(days_in_year(day(2024, 7, 1)), 366);
        assert_eq!(days_in_year(day(2023, 7, 1)), 365);
    }

    #[test]
    fn day_offset_counts_days() {
        let m = mapper(ZoomLevel::Day, day(2024, 1, 1), 0.0);
        assert_eq!(m.offset(day(2024, 1, 11)), 10.0);
        assert_eq!(m.offset(day(2023, 12, 30)), -2.0);
        assert_eq!(m.left_px(day(2024, 1, 3)), 240.0);
    }

    #[test]
    fn week_offset_is_monday_based_and_fractional() {
        let m = mapper(ZoomLevel::Week, day(2024, 1, 1), 0.0);
        assert!((m.offset(day(2024, 1, 3)) - 2.0 / 7.0).abs() < 1e-12);
        assert!((m.offset(day(2024, 1, 14)) - (1.0 + 6.0 / 7.0)).abs() < 1e-12);
        // reference mid-week still anchors on its Monday
        let mid = mapper(ZoomLevel::Week, day(2024, 1, 4), 0.0);
        assert_eq!(mid.offset(day(2024, 1, 1)), 0.0);
    }

    #[test]
    fn month_offset_uses_the_months_own_length() {
        let m = mapper(ZoomLevel::Month, day(2024, 1, 15), 0.0);
        assert_eq!(m.offset(day(2024, 1, 1)), 0.0);
        assert!((m.offset(day(2024, 2, 15)) - (1.0 + 14.0 / 29.0)).abs() < 1e-12);
        assert!((m.offset(day(2023, 2, 15)) - (-11.0 + 14.0 / 28.0)).abs() < 1e-12);
    }

    #[test]
    fn year_offset_is_whole_anniversaries() {
        let reference = day(2024, 6, 15);
        assert_eq!(years_between(day(2025, 6, 14), reference), 0);
        assert_eq!(years_between(day(2025, 6, 15), reference), 1);
        assert_eq!(years_between(day(2024, 1, 1), reference), -1);
        assert_eq!(years_between(day(2022, 6, 15), reference), -2);
    }

    #[test]
    fn date_at_inverts_left_px_with_scroll() {
        for zoom in [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month] {
            let m = mapper(zoom, day(2024, 1, 1), -333.5);
            for d in [day(2023, 11, 30), day(2024, 2, 29), day(2024, 12, 31)] {
                assert_eq!(m.date_at(m.left_px(d)), d, "{zoom:?} {d}");
            }
        }
    }

    #[test]
    fn year_inverse_resolves_to_anniversary() {
        let m = mapper(ZoomLevel::Year, day(2024, 3, 1), 0.0);
        assert_eq!(m.date_at(m.left_px(day(2026, 8, 9))), day(2026, 3, 1));
    }

    #[test]
    fn unit_end_is_next_day_or_next_year() {
        let due = day(2024, 1, 31);
        assert_eq!((strategy(ZoomLevel::Month).unit_end)(due), day(2024, 2, 1));
        assert_eq!((strategy(ZoomLevel::Year).unit_end)(due), day(2025, 1, 31));
    }

    #[test]
    fn pixels_per_day_follow_anchor_period() {
        let m = mapper(ZoomLevel::Month, day(2024, 1, 1), 0.0);
        assert_eq!(m.pixels_per_day(day(2024, 2, 3)), 120.0 / 29.0);
        assert_eq!(m.pixels_per_day(day(2024, 3, 3)), 120.0 / 31.0);
        let y = mapper(ZoomLevel::Year, day(2024, 1, 1), 0.0);
        assert_eq!(y.pixels_per_day(day(2023, 5, 5)), 120.0 / 365.0);
    }

    #[test]
    fn day_marker_includes_time_of_day() {
        let m = mapper(ZoomLevel::Day, day(2024, 1, 1), 0.0);
        let noon = day(2024, 1, 2).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(m.marker_px(noon), 180.0);
        let w = mapper(ZoomLevel::Week, day(2024, 1, 1), 0.0);
        assert!((w.marker_px(noon) - 240.0 / 7.0).abs() < 1e-9);
        let mo = mapper(ZoomLevel::Month, day(2024, 1, 1), 0.0);
        assert!((mo.marker_px(noon) - 240.0 / 31.0).abs() < 1e-9);
    }

    #[test]
    fn columns_start_on_unit_boundaries() {
        let reference = day(2024, 1, 17);
        assert_eq!(mapper(ZoomLevel::Week, reference, 0.0).column_start(1), day(2024, 1, 22));
        assert_eq!(mapper(ZoomLevel::Month, reference, 0.0).column_start(-1), day(2023, 12, 1));
        assert_eq!(mapper(ZoomLevel::Year, reference, 0.0).column_start(2), day(2026, 1, 17));
    }
}
