use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type UserId = Uuid;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    Blocked,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Blocked,
        TaskStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::InReview => "In Review",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Status bound to the digit shortcuts `1`..`5`.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1..=5 => Some(Self::ALL[(digit - 1) as usize]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

/// A member of the roster that tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A task record as supplied by the host's data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Absent for top-level tasks.
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub assigned_user_ids: Vec<UserId>,
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, due: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TaskStatus::ToDo,
            priority: Priority::Low,
            start: Some(start),
            due: Some(due),
            completed_at: None,
            parent_id: None,
            assigned_user_ids: Vec::new(),
        }
    }

    /// Calendar span used for rendering. A missing start falls back to `today`,
    /// a missing due to start + 7 days, and a due before start collapses onto start.
    pub fn span(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start.map(|s| s.date_naive()).unwrap_or(today);
        let due = self
            .due
            .map(|d| d.date_naive())
            .unwrap_or(start + Duration::days(7));
        (start, due.max(start))
    }

    /// Store a calendar span as midnight UTC timestamps.
    pub fn set_span(&mut self, start: NaiveDate, due: NaiveDate) {
        let midnight = |d: NaiveDate| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN));
        self.start = Some(midnight(start));
        self.due = Some(midnight(due));
    }

    pub fn completion_day(&self) -> Option<NaiveDate> {
        self.completed_at.map(|c| c.date_naive())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
