use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskId, User};

/// Everything the host hands to the engine: an ordered task list and the user roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFeed {
    pub name: String,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub roster: Vec<User>,
    pub modified: DateTime<Utc>,
}

impl Default for TaskFeed {
    fn default() -> Self {
        Self {
            name: "Untitled Feed".to_string(),
            tasks: Vec::new(),
            roster: Vec::new(),
            modified: Utc::now(),
        }
    }
}

impl TaskFeed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task together with its whole subtree. Malformed parent links
    /// (self-parents, cycles) are walked once.
    pub fn remove_subtree(&mut self, id: TaskId) -> usize {
        let mut doomed = HashSet::from([id]);
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for task in &self.tasks {
                if task.parent_id == Some(parent) && doomed.insert(task.id) {
                    frontier.push(task.id);
                }
            }
        }
        let before = self.tasks.len();
        self.tasks.retain(|t| !doomed.contains(&t.id));
        before - self.tasks.len()
    }
}
