//! Zoom state machine and status-focus filters.

use std::time::{Duration, Instant};

use crate::model::{TaskStatus, ZoomLevel};

/// Zoom level plus the short window during which bar geometry animates.
#[derive(Debug, Clone)]
pub struct ZoomController {
    level: ZoomLevel,
    animating_until: Option<Instant>,
    window: Duration,
}

impl ZoomController {
    pub fn new(level: ZoomLevel, window: Duration) -> Self {
        Self {
            level,
            animating_until: None,
            window,
        }
    }

    pub fn level(&self) -> ZoomLevel {
        self.level
    }

    /// Switch level and open the transition window. Same-level requests are ignored.
    pub fn set_level(&mut self, level: ZoomLevel, now: Instant) -> bool {
        if level == self.level {
            return false;
        }
        tracing::debug!(from = ?self.level, to = ?level, "zoom changed");
        self.level = level;
        self.animating_until = Some(now + self.window);
        true
    }

    pub fn zoom_in(&mut self, now: Instant) -> bool {
        self.set_level(self.level.zoomed_in(), now)
    }

    pub fn zoom_out(&mut self, now: Instant) -> bool {
        self.set_level(self.level.zoomed_out(), now)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animating_until.is_some_and(|until| now < until)
    }

    /// Clear the transition flag once its window has lapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.animating_until.is_some_and(|until| now >= until) {
            self.animating_until = None;
        }
    }
}

/// What a task looks like to the filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterSubject {
    pub status: TaskStatus,
    pub has_delay: bool,
}

/// Independent status-focus toggles plus the completed-visibility switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusFilters {
    pub show_completed: bool,
    pub overdue: bool,
    pub todo: bool,
    pub in_progress: bool,
    pub in_review: bool,
    pub blocked: bool,
}

impl FocusFilters {
    pub fn new(show_completed: bool) -> Self {
        Self {
            show_completed,
            ..Default::default()
        }
    }

    pub fn any_focus(&self) -> bool {
        self.overdue || self.todo || self.in_progress || self.in_review || self.blocked
    }

    /// Completed visibility AND (any active focus matches, or no focus active).
    pub fn accepts(&self, subject: FilterSubject) -> bool {
        if !self.show_completed && subject.status == TaskStatus::Completed {
            return false;
        }
        if !self.any_focus() {
            return true;
        }
        (self.overdue && subject.has_delay)
            || (self.todo && subject.status == TaskStatus::ToDo)
            || (self.in_progress && subject.status == TaskStatus::InProgress)
            || (self.in_review && subject.status == TaskStatus::InReview)
            || (self.blocked && subject.status == TaskStatus::Blocked)
    }

    /// Overdue focus on, completed hidden. The to-do focus is left as it was.
    pub fn executive(self) -> Self {
        Self {
            overdue: true,
            todo: self.todo,
            ..Default::default()
        }
    }

    pub fn reset() -> Self {
        Self::default()
    }
}
