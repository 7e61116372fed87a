//! Pointer-drag gestures on task bars: move, resize-start, resize-end.
//!
//! The live preview follows the continuous pixel delta; dates are rounded to
//! whole days only when the gesture is committed.

use chrono::{Duration, NaiveDate};

use super::layout::BarExtent;
use super::mapper::CoordinateMapper;
use crate::model::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl DragKind {
    /// Gesture selected by a pointer-down at `x`, or `None` when `x` misses the bar.
    pub fn classify(bar: &BarExtent, x: f64, edge_px: f64) -> Option<Self> {
        if !bar.contains(x) {
            None
        } else if x - bar.left <= edge_px {
            Some(DragKind::ResizeStart)
        } else if bar.right() - x <= edge_px {
            Some(DragKind::ResizeEnd)
        } else {
            Some(DragKind::Move)
        }
    }
}

/// The single live drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub task_id: TaskId,
    pub kind: DragKind,
    pub origin_x: f64,
    pub origin_scroll: f64,
    pub original_start: NaiveDate,
    pub original_due: NaiveDate,
    /// Rounded day delta as of the last update.
    pub day_delta: i64,
    /// Scroll-compensated pointer travel as of the last update.
    pub pixel_delta: f64,
}

/// Preview geometry and the dates a commit would produce right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub bar: BarExtent,
    pub start: NaiveDate,
    pub due: NaiveDate,
}

impl DragSession {
    pub fn begin(
        task_id: TaskId,
        kind: DragKind,
        origin_x: f64,
        origin_scroll: f64,
        span: (NaiveDate, NaiveDate),
    ) -> Self {
        Self {
            task_id,
            kind,
            origin_x,
            origin_scroll,
            original_start: span.0,
            original_due: span.1,
            day_delta: 0,
            pixel_delta: 0.0,
        }
    }

    /// Date under the dragged edge; month and year zoom size a day from its period.
    fn anchor(&self) -> NaiveDate {
        match self.kind {
            DragKind::ResizeEnd => self.original_due,
            DragKind::Move | DragKind::ResizeStart => self.original_start,
        }
    }

    /// Pointer-move tick. `scroll_offset` is the viewport's current offset, so
    /// auto-scroll that happened since pointer-down keeps the bar under the cursor.
    pub fn update(&mut self, pointer_x: f64, scroll_offset: f64, mapper: &CoordinateMapper) {
        let effective = (pointer_x - self.origin_x) + (scroll_offset - self.origin_scroll);
        let fractional_days = effective / mapper.pixels_per_day(self.anchor());
        self.pixel_delta = effective;
        self.day_delta = fractional_days.round() as i64;
    }

    /// Dates for a given whole-day delta, with the one-day floor in both directions.
    pub fn resolve(&self, day_delta: i64) -> (NaiveDate, NaiveDate) {
        let shift = Duration::days(day_delta);
        let (start, due) = (self.original_start, self.original_due);
        match self.kind {
            DragKind::Move => (start + shift, due + shift),
            DragKind::ResizeStart => {
                let moved = start + shift;
                if moved >= due {
                    (due - Duration::days(1), due)
                } else {
                    (moved, due)
                }
            }
            DragKind::ResizeEnd => {
                let moved = due + shift;
                if moved <= start {
                    (start, start + Duration::days(1))
                } else {
                    (start, moved)
                }
            }
        }
    }

    /// Final dates, or `None` when the gesture rounds to no change.
    pub fn commit(&self) -> Option<(NaiveDate, NaiveDate)> {
        (self.day_delta != 0).then(|| self.resolve(self.day_delta))
    }

    pub fn preview(&self, bar: &BarExtent, min_width: f64) -> DragPreview {
        let dx = self.pixel_delta;
        let (left, width) = match self.kind {
            DragKind::Move => (bar.left + dx, bar.width),
            DragKind::ResizeStart => (bar.left + dx, bar.width - dx),
            DragKind::ResizeEnd => (bar.left, bar.width + dx),
        };
        let (start, due) = self.resolve(self.day_delta);
        DragPreview {
            bar: BarExtent {
                left,
                width: width.max(min_width),
            },
            start,
            due,
        }
    }
}

/// Edge auto-scroll tuning.
#[derive(Debug, Clone, Copy)]
pub struct AutoScroll {
    pub margin: f64,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl AutoScroll {
    /// Scroll delta for one pointer-move tick at viewport x `pointer_x`.
    ///
    /// Speed grows with proximity to the edge, capped at `max_speed`.
    pub fn step(&self, pointer_x: f64, container_width: f64) -> f64 {
        let speed = |dist: f64| {
            let ratio = ((self.margin - dist.max(1.0)) / self.margin).min(1.0);
            (self.max_speed * ratio).round().max(self.min_speed)
        };
        if pointer_x < self.margin {
            -speed(pointer_x)
        } else if pointer_x > container_width - self.margin {
            speed(container_width - pointer_x)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ViewportState, ZoomLevel};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mapper(zoom: ZoomLevel) -> CoordinateMapper {
        let mut vp = ViewportState::new(day(2024, 1, 1), 120.0, 12);
        vp.scroll_offset = 0.0;
        CoordinateMapper::new(zoom, &vp)
    }

    fn session(kind: DragKind) -> DragSession {
        DragSession::begin(Uuid::new_v4(), kind, 500.0, 0.0, (day(2024, 1, 3), day(2024, 1, 10)))
    }

    #[test]
    fn classify_by_edge_distance() {
        let bar = BarExtent {
            left: 100.0,
            width: 200.0,
        };
        assert_eq!(DragKind::classify(&bar, 104.0, 6.0), Some(DragKind::ResizeStart));
        assert_eq!(DragKind::classify(&bar, 296.0, 6.0), Some(DragKind::ResizeEnd));
        assert_eq!(DragKind::classify(&bar, 200.0, 6.0), Some(DragKind::Move));
        assert_eq!(DragKind::classify(&bar, 99.0, 6.0), None);
    }

    #[test]
    fn resize_end_three_weeks_at_week_zoom() {
        let mut s = session(DragKind::ResizeEnd);
        s.update(500.0 + 360.0, 0.0, &mapper(ZoomLevel::Week));
        assert_eq!(s.day_delta, 21);
        assert_eq!(s.commit(), Some((day(2024, 1, 3), day(2024, 1, 31))));
    }

    #[test]
    fn scroll_compensation_counts_toward_delta() {
        let mut s = session(DragKind::Move);
        s.update(500.0, 240.0, &mapper(ZoomLevel::Day));
        assert_eq!(s.pixel_delta, 240.0);
        assert_eq!(s.commit(), Some((day(2024, 1, 5), day(2024, 1, 12))));
    }

    #[test]
    fn preview_is_continuous_commit_is_rounded() {
        let mut s = session(DragKind::Move);
        s.update(500.0 + 50.0, 0.0, &mapper(ZoomLevel::Day));
        assert_eq!(s.pixel_delta, 50.0);
        assert_eq!(s.day_delta, 0);
        assert_eq!(s.commit(), None);
        let bar = BarExtent {
            left: 240.0,
            width: 960.0,
        };
        assert_eq!(s.preview(&bar, 30.0).bar.left, 290.0);
    }

    #[test]
    fn resize_start_never_reaches_due() {
        let mut s = session(DragKind::ResizeStart);
        s.update(500.0 + 120.0 * 30.0, 0.0, &mapper(ZoomLevel::Day));
        let (start, due) = s.commit().unwrap();
        assert_eq!((start, due), (day(2024, 1, 9), day(2024, 1, 10)));
        assert_eq!(s.resolve(7), (day(2024, 1, 9), day(2024, 1, 10)));
        assert_eq!(s.resolve(6), (day(2024, 1, 9), day(2024, 1, 10)));
        assert_eq!(s.resolve(5), (day(2024, 1, 8), day(2024, 1, 10)));
    }

    #[test]
    fn resize_end_never_reaches_start() {
        let s = session(DragKind::ResizeEnd);
        assert_eq!(s.resolve(-7), (day(2024, 1, 3), day(2024, 1, 4)));
        assert_eq!(s.resolve(-40), (day(2024, 1, 3), day(2024, 1, 4)));
    }

    #[test]
    fn resize_start_preview_shrinks_from_left() {
        let mut s = session(DragKind::ResizeStart);
        s.update(500.0 + 60.0, 0.0, &mapper(ZoomLevel::Day));
        let bar = BarExtent {
            left: 0.0,
            width: 100.0,
        };
        let preview = s.preview(&bar, 30.0);
        assert_eq!(preview.bar.left, 60.0);
        assert_eq!(preview.bar.width, 40.0);
        s.update(500.0 + 90.0, 0.0, &mapper(ZoomLevel::Day));
        assert_eq!(s.preview(&bar, 30.0).bar.width, 30.0);
    }

    #[test]
    fn month_zoom_sizes_days_by_anchor_month() {
        let mut s = DragSession::begin(
            Uuid::new_v4(),
            DragKind::Move,
            0.0,
            0.0,
            (day(2024, 2, 1), day(2024, 2, 5)),
        );
        s.update(120.0, 0.0, &mapper(ZoomLevel::Month));
        assert_eq!(s.day_delta, 29);
    }

    #[test]
    fn autoscroll_speed_grows_toward_edges() {
        let auto = AutoScroll {
            margin: 64.0,
            min_speed: 2.0,
            max_speed: 10.0,
        };
        assert_eq!(auto.step(500.0, 1000.0), 0.0);
        assert_eq!(auto.step(0.0, 1000.0), -10.0);
        assert_eq!(auto.step(60.0, 1000.0), -2.0);
        assert_eq!(auto.step(1000.0 - 32.0, 1000.0), 5.0);
        assert_eq!(auto.step(1200.0, 1000.0), 10.0);
    }
}
