//! Headless timeline engine.
//!
//! [`TimelineEngine`] consumes a task list and roster from the host, turns
//! pointer/wheel/keyboard input into state transitions, and hands back a
//! [`TimelineLayout`] to paint plus a queue of [`EngineEvent`]s for the host
//! to act on. It never persists anything itself.

pub mod drag;
pub mod filter;
pub mod keyboard;
pub mod layout;
pub mod mapper;
pub mod navigator;
pub mod overlay;
pub mod scroller;

use std::collections::HashMap;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::EngineConfig;
use crate::model::{Priority, Task, TaskId, TaskStatus, User, UserId, ViewportState, ZoomLevel};
use drag::{AutoScroll, DragKind, DragPreview, DragSession};
use filter::{FilterSubject, FocusFilters, ZoomController};
use keyboard::{KeyCommand, KeyInput};
use layout::{AssigneeChips, BarExtent, DelayInfo, RowMetrics};
use mapper::CoordinateMapper;
use navigator::{ChildIndex, FocusEntry, FocusStack};
use overlay::OverlayStore;
use scroller::{Column, MonthBand, Scroller, WheelInput, WheelOutcome};

/// Requests emitted to the host. Fire-and-forget from the engine's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UpdateTaskDates {
        id: TaskId,
        start: NaiveDate,
        due: NaiveDate,
    },
    UpdateTaskStatus {
        id: TaskId,
        status: TaskStatus,
    },
    TaskClicked(TaskId),
    CreateSubtask {
        parent_id: TaskId,
    },
    EditTask(TaskId),
    DeleteTask(TaskId),
    ContextMenuRequested(TaskId),
    FocusPushed {
        task_id: TaskId,
        name: String,
    },
    FocusPopped {
        depth: usize,
    },
}

/// Paint-ready geometry for one visible task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLayout {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub start: NaiveDate,
    pub due: NaiveDate,
    pub delay: Option<DelayInfo>,
    pub has_children: bool,
    /// Dates come from an optimistic override rather than the feed.
    pub overridden: bool,
    pub row: usize,
    pub top: f64,
    pub bar: BarExtent,
    pub delay_bar: Option<BarExtent>,
    pub preview: Option<DragPreview>,
    pub assignees: AssigneeChips,
}

impl TaskLayout {
    /// Extent actually drawn: the drag preview while dragging, else the bar.
    pub fn drawn_bar(&self) -> BarExtent {
        self.preview.map(|p| p.bar).unwrap_or(self.bar)
    }
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub zoom: ZoomLevel,
    pub metrics: RowMetrics,
    pub columns: Vec<Column>,
    pub month_bands: Vec<MonthBand>,
    pub today_x: f64,
    pub rows: Vec<TaskLayout>,
    pub breadcrumbs: Vec<FocusEntry>,
    /// Positions and widths should interpolate (zoom transition, no drag).
    pub animating: bool,
    pub dragging: bool,
}

impl TimelineLayout {
    /// Task whose row contains `y`, measured from the top of the row area.
    pub fn row_at(&self, y: f64) -> Option<&TaskLayout> {
        if y < 0.0 {
            return None;
        }
        let row = (y / self.metrics.row_height) as usize;
        self.rows.get(row)
    }

    /// Task whose drawn bar is under (`x`, `y`).
    pub fn bar_at(&self, x: f64, y: f64) -> Option<&TaskLayout> {
        self.row_at(y)
            .filter(|t| y >= t.top && y <= t.top + self.metrics.bar_height && t.drawn_bar().contains(x))
    }
}

struct Scheduled<'a> {
    task: &'a Task,
    start: NaiveDate,
    due: NaiveDate,
    delay: Option<DelayInfo>,
    overridden: bool,
}

pub struct TimelineEngine {
    config: EngineConfig,
    tasks: Vec<Task>,
    positions: HashMap<TaskId, usize>,
    roster: HashMap<UserId, User>,
    index: ChildIndex,
    viewport: ViewportState,
    scroller: Scroller,
    zoom: ZoomController,
    filters: FocusFilters,
    focus: FocusStack,
    overlay: OverlayStore,
    drag: Option<DragSession>,
    hovered: Option<TaskId>,
    events: Vec<EngineEvent>,
}

impl TimelineEngine {
    pub fn new(config: EngineConfig, today: NaiveDate) -> Self {
        let viewport = ViewportState::new(today, config.column_width, config.visible_columns);
        Self {
            scroller: Scroller::new(&viewport, config.frame_interval()),
            zoom: ZoomController::new(config.initial_zoom, config.zoom_animation()),
            filters: FocusFilters::new(config.show_completed),
            overlay: OverlayStore::new(config.override_ttl()),
            viewport,
            config,
            tasks: Vec::new(),
            positions: HashMap::new(),
            roster: HashMap::new(),
            index: ChildIndex::default(),
            focus: FocusStack::default(),
            drag: None,
            hovered: None,
            events: Vec::new(),
        }
    }

    // ── Feed ────────────────────────────────────────────────────

    /// Replace the authoritative task list and roster.
    ///
    /// Overrides that the feed now agrees with are dropped; the others keep
    /// masking stale data until their TTL lapses.
    pub fn set_feed(&mut self, tasks: Vec<Task>, roster: Vec<User>, today: NaiveDate) {
        self.positions = tasks.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        self.index = ChildIndex::build(&tasks);
        self.roster = roster.into_iter().map(|u| (u.id, u)).collect();
        self.tasks = tasks;

        let positions = &self.positions;
        self.overlay.retain_ids(|id| positions.contains_key(id));
        for task in &self.tasks {
            self.overlay.reconcile(task.id, task.span(today));
        }

        let positions = &self.positions;
        self.focus.prune(&self.index, |id| positions.contains_key(&id));
        if self.drag.as_ref().is_some_and(|d| !positions.contains_key(&d.task_id)) {
            tracing::warn!("dragged task vanished from feed, discarding gesture");
            self.drag = None;
        }
        if self.hovered.is_some_and(|id| !positions.contains_key(&id)) {
            self.hovered = None;
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.positions.get(&id).and_then(|&i| self.tasks.get(i))
    }

    pub fn has_children(&self, id: TaskId) -> bool {
        self.index.has_children(id)
    }

    // ── State accessors ─────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom.level()
    }

    pub fn filters(&self) -> FocusFilters {
        self.filters
    }

    pub fn set_filters(&mut self, filters: FocusFilters) {
        self.filters = filters;
    }

    pub fn focus_stack(&self) -> &FocusStack {
        &self.focus
    }

    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn hovered(&self) -> Option<TaskId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<TaskId>) {
        self.hovered = id;
    }

    pub fn set_container_width(&mut self, width: f64) {
        self.viewport.container_width = width.max(0.0);
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.zoom.level(), &self.viewport)
    }

    /// Drain queued host requests.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Derivation ──────────────────────────────────────────────

    fn schedule<'a>(&self, task: &'a Task, today: NaiveDate) -> Scheduled<'a> {
        let authoritative = task.span(today);
        let (start, due) = self.overlay.apply(task.id, authoritative);
        Scheduled {
            task,
            start,
            due,
            delay: layout::delay_info(task, due, today),
            overridden: (start, due) != authoritative,
        }
    }

    fn visible(&self, today: NaiveDate) -> Vec<Scheduled<'_>> {
        self.focus
            .visible_ids(&self.index)
            .iter()
            .filter_map(|id| self.task(*id))
            .map(|task| self.schedule(task, today))
            .filter(|s| {
                self.filters.accepts(FilterSubject {
                    status: s.task.status,
                    has_delay: s.delay.is_some(),
                })
            })
            .collect()
    }

    /// Ids of the tasks currently shown, in row order.
    pub fn visible_ids(&self, today: NaiveDate) -> Vec<TaskId> {
        self.visible(today).iter().map(|s| s.task.id).collect()
    }

    pub fn layout(&self, now: NaiveDateTime, clock: Instant) -> TimelineLayout {
        let today = now.date();
        let zoom = self.zoom.level();
        let mapper = self.mapper();
        let metrics = RowMetrics::for_zoom(zoom);
        let min_width = self.config.min_bar_width();

        let rows = self
            .visible(today)
            .into_iter()
            .enumerate()
            .map(|(row, s)| {
                let bar = layout::bar_extent(&mapper, s.start, s.due, min_width);
                let delay_bar = s
                    .delay
                    .as_ref()
                    .and_then(|d| layout::delay_extent(&mapper, &bar, s.due, d, now));
                let preview = self
                    .drag
                    .as_ref()
                    .filter(|d| d.task_id == s.task.id)
                    .map(|d| d.preview(&bar, min_width));
                let drawn = preview.map(|p| p.bar).unwrap_or(bar);
                TaskLayout {
                    id: s.task.id,
                    name: s.task.name.clone(),
                    status: s.task.status,
                    priority: s.task.priority,
                    start: s.start,
                    due: s.due,
                    delay: s.delay,
                    has_children: self.index.has_children(s.task.id),
                    overridden: s.overridden,
                    row,
                    top: metrics.bar_top(row),
                    bar,
                    delay_bar,
                    preview,
                    assignees: layout::assignee_chips(s.task, &self.roster, drawn.width, zoom),
                }
            })
            .collect();

        TimelineLayout {
            zoom,
            metrics,
            columns: scroller::visible_columns(&mapper, &self.viewport, self.config.column_buffer),
            month_bands: scroller::month_bands(&mapper, &self.viewport),
            today_x: mapper.marker_px(now),
            rows,
            breadcrumbs: self.focus.entries().to_vec(),
            animating: self.zoom.is_animating(clock) && self.drag.is_none(),
            dragging: self.drag.is_some(),
        }
    }

    // ── Drag ────────────────────────────────────────────────────

    /// Start a gesture on `id` at viewport x `pointer_x`.
    ///
    /// Ignored while another gesture is live or when the pointer misses the bar.
    pub fn pointer_down(&mut self, id: TaskId, pointer_x: f64, today: NaiveDate) -> Option<DragKind> {
        if self.drag.is_some() {
            return None;
        }
        let task = self.task(id)?;
        let s = self.schedule(task, today);
        let bar = layout::bar_extent(&self.mapper(), s.start, s.due, self.config.min_bar_width());
        let kind = DragKind::classify(&bar, pointer_x, self.config.edge_handle_px)?;
        let span = (s.start, s.due);
        tracing::debug!(task = %id, ?kind, "drag started");
        self.scroller.discard_pending(&self.viewport);
        self.drag = Some(DragSession::begin(id, kind, pointer_x, self.viewport.scroll_offset, span));
        Some(kind)
    }

    /// Pointer-move tick: edge auto-scroll, then recompute the live delta.
    pub fn pointer_move(&mut self, pointer_x: f64) {
        if self.drag.is_none() {
            return;
        }
        let auto = AutoScroll {
            margin: self.config.autoscroll_margin_px,
            min_speed: self.config.autoscroll_min_speed,
            max_speed: self.config.autoscroll_max_speed,
        };
        let step = auto.step(pointer_x, self.viewport.container_width);
        if step != 0.0 {
            self.scroller.scroll_by(&mut self.viewport, step);
        }
        let mapper = self.mapper();
        let scroll = self.viewport.scroll_offset;
        if let Some(session) = self.drag.as_mut() {
            session.update(pointer_x, scroll, &mapper);
        }
    }

    /// End the gesture. A non-zero whole-day delta writes an override and
    /// requests the date change; returns the committed dates.
    pub fn pointer_up(&mut self, clock: Instant) -> Option<(NaiveDate, NaiveDate)> {
        let session = self.drag.take()?;
        let Some((start, due)) = session.commit() else {
            tracing::debug!(task = %session.task_id, "drag discarded, no net change");
            return None;
        };
        tracing::info!(task = %session.task_id, %start, %due, kind = ?session.kind, "drag committed");
        self.overlay.insert(session.task_id, start, due, clock);
        self.events.push(EngineEvent::UpdateTaskDates {
            id: session.task_id,
            start,
            due,
        });
        Some((start, due))
    }

    /// Abandon the gesture without committing (pointer left the window).
    pub fn pointer_cancel(&mut self) -> bool {
        let cancelled = self.drag.take().is_some();
        if cancelled {
            tracing::debug!("drag cancelled");
        }
        cancelled
    }

    // ── Scrolling ───────────────────────────────────────────────

    pub fn wheel(&mut self, input: WheelInput, clock: Instant) -> WheelOutcome {
        if self.drag.is_some() {
            return WheelOutcome::Suppressed;
        }
        self.scroller.wheel(&mut self.viewport, input, clock)
    }

    /// Animation-frame tick. Returns true when something visible changed.
    /// Deferred wheel input is never flushed while a drag owns the scroll.
    pub fn on_frame(&mut self, clock: Instant) -> bool {
        let was_animating = self.zoom.is_animating(clock);
        self.zoom.tick(clock);
        let scrolled = self.drag.is_none() && self.scroller.on_frame(&mut self.viewport, clock);
        scrolled || was_animating
    }

    pub fn needs_frame(&self, clock: Instant) -> bool {
        self.scroller.has_pending_frame() || self.zoom.is_animating(clock)
    }

    /// Expire stale overrides. Driven by the host's periodic timer.
    pub fn sweep(&mut self, clock: Instant) -> usize {
        self.overlay.sweep(clock)
    }

    /// Re-anchor on `today` and center it.
    pub fn go_today(&mut self, today: NaiveDate) {
        self.viewport.reference = today;
        let centered = ViewportState::centered_offset(self.viewport.column_width, self.viewport.visible_columns);
        self.scroller.scroll_to(&mut self.viewport, centered);
    }

    pub fn scroll_prev(&mut self) {
        let step = self.config.nav_step_columns as f64 * self.viewport.column_width;
        self.scroller.scroll_by(&mut self.viewport, -step);
    }

    pub fn scroll_next(&mut self) {
        let step = self.config.nav_step_columns as f64 * self.viewport.column_width;
        self.scroller.scroll_by(&mut self.viewport, step);
    }

    // ── Zoom ────────────────────────────────────────────────────

    pub fn set_zoom(&mut self, level: ZoomLevel, clock: Instant) -> bool {
        self.zoom.set_level(level, clock)
    }

    pub fn zoom_in(&mut self, clock: Instant) -> bool {
        self.zoom.zoom_in(clock)
    }

    pub fn zoom_out(&mut self, clock: Instant) -> bool {
        self.zoom.zoom_out(clock)
    }

    // ── Drill-down ──────────────────────────────────────────────

    /// "Show subtasks" on `id`. Refused when it has no children.
    pub fn show_subtasks(&mut self, id: TaskId) -> bool {
        let Some(&pos) = self.positions.get(&id) else {
            return false;
        };
        let task = &self.tasks[pos];
        if !self.focus.push(task, &self.index) {
            return false;
        }
        self.events.push(EngineEvent::FocusPushed {
            task_id: id,
            name: task.name.clone(),
        });
        true
    }

    /// Breadcrumb click on entry `index`.
    pub fn pop_focus_to(&mut self, index: usize) -> bool {
        let changed = self.focus.pop_to(index);
        if changed {
            self.events.push(EngineEvent::FocusPopped {
                depth: self.focus.depth(),
            });
        }
        changed
    }

    /// Root breadcrumb click.
    pub fn focus_root(&mut self) -> bool {
        let changed = self.focus.clear();
        if changed {
            self.events.push(EngineEvent::FocusPopped { depth: 0 });
        }
        changed
    }

    pub fn focus_up(&mut self) -> bool {
        let popped = self.focus.pop().is_some();
        if popped {
            self.events.push(EngineEvent::FocusPopped {
                depth: self.focus.depth(),
            });
        }
        popped
    }

    // ── Task intents ────────────────────────────────────────────

    pub fn click_task(&mut self, id: TaskId) {
        self.events.push(EngineEvent::TaskClicked(id));
    }

    pub fn request_status(&mut self, id: TaskId, status: TaskStatus) {
        self.events.push(EngineEvent::UpdateTaskStatus { id, status });
    }

    pub fn request_edit(&mut self, id: TaskId) {
        self.events.push(EngineEvent::EditTask(id));
    }

    pub fn request_subtask(&mut self, parent_id: TaskId) {
        self.events.push(EngineEvent::CreateSubtask { parent_id });
    }

    pub fn request_delete(&mut self, id: TaskId) {
        self.events.push(EngineEvent::DeleteTask(id));
    }

    /// Apply a keyboard shortcut. Returns true when the key was consumed.
    pub fn handle_key(&mut self, input: &KeyInput, clock: Instant) -> bool {
        let hovered = self.hovered.filter(|id| self.positions.contains_key(id));
        let Some(command) = keyboard::resolve(input, hovered.is_some()) else {
            return false;
        };
        match (command, hovered) {
            (KeyCommand::DrillOut, _) => {
                self.focus_up();
            }
            (KeyCommand::ZoomIn, _) => {
                self.zoom_in(clock);
            }
            (KeyCommand::ZoomOut, _) => {
                self.zoom_out(clock);
            }
            (KeyCommand::Open, Some(id)) => self.click_task(id),
            (KeyCommand::ContextMenu, Some(id)) => self.events.push(EngineEvent::ContextMenuRequested(id)),
            (KeyCommand::Edit, Some(id)) => self.request_edit(id),
            (KeyCommand::CreateSubtask, Some(id)) => self.request_subtask(id),
            (KeyCommand::Delete, Some(id)) => self.request_delete(id),
            (KeyCommand::DrillIn, Some(id)) => {
                self.show_subtasks(id);
            }
            (KeyCommand::SetStatus(status), Some(id)) => self.request_status(id, status),
            (_, None) => return false,
        }
        true
    }
}
