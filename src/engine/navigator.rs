//! Drill-down navigation through the task hierarchy.

use std::collections::{HashMap, HashSet};

use crate::model::{Task, TaskId};

/// Parent → children adjacency, rebuilt once per feed update.
#[derive(Debug, Clone, Default)]
pub struct ChildIndex {
    roots: Vec<TaskId>,
    children: HashMap<TaskId, Vec<TaskId>>,
}

impl ChildIndex {
    /// Children keep feed order. Tasks whose parent is missing from the feed
    /// are treated as top-level so they stay reachable. So are tasks caught in
    /// a parent cycle: the first one in feed order is cut loose from its parent
    /// and the rest of the cycle hangs below it.
    pub fn build(tasks: &[Task]) -> Self {
        let known: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();
        let mut index = Self::default();
        for task in tasks {
            match task.parent_id {
                Some(parent) if parent != task.id && known.contains(&parent) => {
                    index.children.entry(parent).or_default().push(task.id);
                }
                _ => index.roots.push(task.id),
            }
        }

        let mut reached = HashSet::new();
        for root in index.roots.clone() {
            index.mark_reachable(root, &mut reached);
        }
        for task in tasks {
            if reached.contains(&task.id) {
                continue;
            }
            if let Some(siblings) = task.parent_id.and_then(|p| index.children.get_mut(&p)) {
                siblings.retain(|id| *id != task.id);
            }
            tracing::warn!(task = %task.id, "parent cycle, promoting to top level");
            index.roots.push(task.id);
            index.mark_reachable(task.id, &mut reached);
        }
        index
    }

    fn mark_reachable(&self, from: TaskId, reached: &mut HashSet<TaskId>) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if reached.insert(id) {
                stack.extend_from_slice(self.children(id));
            }
        }
    }

    pub fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    pub fn children(&self, parent: TaskId) -> &[TaskId] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, parent: TaskId) -> bool {
        !self.children(parent).is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusEntry {
    pub task_id: TaskId,
    pub name: String,
}

/// Breadcrumb path of focused parents; empty means the top-level view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusStack {
    entries: Vec<FocusEntry>,
}

impl FocusStack {
    pub fn entries(&self) -> &[FocusEntry] {
        &self.entries
    }

    pub fn top(&self) -> Option<&FocusEntry> {
        self.entries.last()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Focus on `task`'s children. Refused when it has none.
    pub fn push(&mut self, task: &Task, index: &ChildIndex) -> bool {
        if !index.has_children(task.id) {
            return false;
        }
        self.entries.push(FocusEntry {
            task_id: task.id,
            name: task.name.clone(),
        });
        tracing::info!(task = %task.id, depth = self.entries.len(), "drilled into subtasks");
        true
    }

    /// Breadcrumb click: keep entries `0..=index`. Out-of-range is a no-op.
    pub fn pop_to(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.truncate(index + 1);
        tracing::info!(depth = self.entries.len(), "breadcrumb navigation");
        true
    }

    /// Root breadcrumb: back to the top-level view.
    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Leave one level.
    pub fn pop(&mut self) -> Option<FocusEntry> {
        self.entries.pop()
    }

    /// Drop entries whose task disappeared from the feed, along with everything above them.
    pub fn prune(&mut self, index: &ChildIndex, exists: impl Fn(TaskId) -> bool) {
        if let Some(broken) = self
            .entries
            .iter()
            .position(|e| !exists(e.task_id) || !index.has_children(e.task_id))
        {
            tracing::warn!(depth = broken, "focused task vanished from feed, unwinding");
            self.entries.truncate(broken);
        }
    }

    /// Ids visible at the current level.
    pub fn visible_ids<'a>(&self, index: &'a ChildIndex) -> &'a [TaskId] {
        match self.top() {
            Some(entry) => index.children(entry.task_id),
            None => index.roots(),
        }
    }
}
