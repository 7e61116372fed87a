//! Short-lived date overrides written at drag commit.
//!
//! An override masks the round-trip to the persistence collaborator: it wins
//! over authoritative data until it expires or the feed catches up with it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::model::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticOverride {
    pub start: NaiveDate,
    pub due: NaiveDate,
    pub created_at: Instant,
}

#[derive(Debug, Clone)]
pub struct OverlayStore {
    entries: HashMap<TaskId, OptimisticOverride>,
    ttl: Duration,
}

impl OverlayStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn insert(&mut self, id: TaskId, start: NaiveDate, due: NaiveDate, now: Instant) {
        tracing::debug!(task = %id, %start, %due, "optimistic override written");
        self.entries.insert(
            id,
            OptimisticOverride {
                start,
                due,
                created_at: now,
            },
        );
    }

    pub fn get(&self, id: TaskId) -> Option<&OptimisticOverride> {
        self.entries.get(&id)
    }

    /// Overridden span for `id`, if any.
    pub fn apply(&self, id: TaskId, span: (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
        self.entries
            .get(&id)
            .map(|o| (o.start, o.due))
            .unwrap_or(span)
    }

    /// Drop entries older than the TTL. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, o| now.saturating_duration_since(o.created_at) < ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, "expired optimistic overrides swept");
        }
        removed
    }

    /// Drop the override for `id` when fresh authoritative data already matches it.
    pub fn reconcile(&mut self, id: TaskId, authoritative: (NaiveDate, NaiveDate)) -> bool {
        let matches = self
            .entries
            .get(&id)
            .is_some_and(|o| (o.start, o.due) == authoritative);
        if matches {
            self.entries.remove(&id);
            tracing::debug!(task = %id, "optimistic override superseded by feed");
        }
        matches
    }

    pub fn retain_ids(&mut self, mut keep: impl FnMut(&TaskId) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
