use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Duration as Days, Local, NaiveDate, TimeZone, Utc};
use egui::Pos2;
use uuid::Uuid;

use gantt_timeline::model::{Priority, Task, TaskFeed, TaskId, TaskStatus, User};
use gantt_timeline::{AppSettings, EngineEvent, TimelineEngine};

use crate::ui;

/// A mutation requested by the engine, applied to the feed once the
/// simulated round-trip has elapsed.
#[derive(Debug, Clone)]
struct PendingMutation {
    apply_at: Instant,
    event: EngineEvent,
}

/// Editable copy of a task shown in the edit dialog.
#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

/// Main application state.
pub struct GanttApp {
    pub engine: TimelineEngine,
    pub feed: TaskFeed,
    pub file_path: Option<PathBuf>,
    pub selected_task: Option<TaskId>,
    pub status_message: String,

    // Dialog state
    pub editing: Option<TaskEdit>,
    pub context_menu: Option<(TaskId, Pos2)>,
    pub show_about: bool,

    settings: AppSettings,
    latency: Duration,
    pending: Vec<PendingMutation>,
    last_sweep: Instant,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let feed = Self::sample_feed();
        let mut engine = TimelineEngine::new(settings.engine.clone(), today());
        engine.set_feed(feed.tasks.clone(), feed.roster.clone(), today());

        Self {
            engine,
            feed,
            file_path: None,
            selected_task: None,
            status_message: "Ready".to_string(),
            editing: None,
            context_menu: None,
            show_about: false,
            latency: Duration::from_millis(settings.simulated_latency_ms),
            settings,
            pending: Vec::new(),
            last_sweep: Instant::now(),
        }
    }

    /// Generate a sample feed for demonstration.
    fn sample_feed() -> TaskFeed {
        let today = today();
        let at = |offset: i64| Some(Utc.from_utc_datetime(&(today + Days::days(offset)).and_hms_opt(9, 0, 0).unwrap_or_default()));
        let mut feed = TaskFeed::new("Sample Feed");

        let people = ["Ada Lovelace", "Grace Hopper", "Linus Torvalds", "Barbara Liskov"];
        feed.roster = people
            .iter()
            .map(|name| User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                avatar_url: None,
            })
            .collect();
        let team: Vec<Uuid> = feed.roster.iter().map(|u| u.id).collect();

        let task = |name: &str, start: i64, due: i64, status: TaskStatus| {
            let mut t = Task::new(name, Utc::now(), Utc::now());
            t.start = at(start);
            t.due = at(due);
            t.status = status;
            t
        };

        // ── Phase 1: Planning ───────────────────────────────────────
        let mut planning = task("Planning", -21, -3, TaskStatus::InProgress);
        planning.priority = Priority::High;
        planning.assigned_user_ids = team.clone();

        let mut kickoff = task("Project Kickoff", -21, -18, TaskStatus::Completed);
        kickoff.completed_at = at(-18);
        kickoff.parent_id = Some(planning.id);

        let mut requirements = task("Requirements Gathering", -17, -8, TaskStatus::Completed);
        requirements.completed_at = at(-5);
        requirements.parent_id = Some(planning.id);
        requirements.assigned_user_ids = vec![team[0], team[1]];

        let mut estimates = task("Estimates", -10, -4, TaskStatus::InReview);
        estimates.parent_id = Some(planning.id);
        estimates.assigned_user_ids = vec![team[3]];

        let mut sizing = task("Backlog Sizing", -10, -6, TaskStatus::Blocked);
        sizing.parent_id = Some(estimates.id);

        // ── Phase 2: Execution ──────────────────────────────────────
        let mut execution = task("Execution", -2, 40, TaskStatus::InProgress);
        execution.priority = Priority::Medium;

        let mut design = task("UI Design", -2, 12, TaskStatus::InProgress);
        design.parent_id = Some(execution.id);
        design.assigned_user_ids = vec![team[1]];

        let mut backend = task("Backend Development", 3, 30, TaskStatus::ToDo);
        backend.parent_id = Some(execution.id);
        backend.assigned_user_ids = vec![team[2], team[0], team[3]];

        let mut qa = task("Testing & QA", 24, 40, TaskStatus::ToDo);
        qa.parent_id = Some(execution.id);

        let mut launch = task("Launch", 42, 43, TaskStatus::ToDo);
        launch.priority = Priority::High;

        let mut research = task("Vendor Research", 0, 0, TaskStatus::ToDo);
        research.start = None;
        research.due = None;

        feed.tasks = vec![planning, kickoff, requirements, estimates, sizing, execution, design, backend, qa, launch, research];
        feed
    }

    fn sync_engine(&mut self) {
        self.engine
            .set_feed(self.feed.tasks.clone(), self.feed.roster.clone(), today());
    }

    // --- File operations ---

    pub fn new_feed(&mut self) {
        self.feed = TaskFeed::default();
        self.file_path = None;
        self.selected_task = None;
        self.pending.clear();
        self.sync_engine();
        self.status_message = "New feed created".to_string();
    }

    pub fn open_feed(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Task Feed", &["json"])
            .pick_file()
        {
            match gantt_timeline::io::load_feed(&path) {
                Ok(feed) => {
                    tracing::info!(path = %path.display(), tasks = feed.tasks.len(), "feed loaded");
                    self.feed = feed;
                    self.file_path = Some(path);
                    self.selected_task = None;
                    self.pending.clear();
                    self.sync_engine();
                    self.status_message = "Feed loaded".to_string();
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to load feed");
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_feed(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_feed(path);
        } else {
            self.save_feed_as();
        }
    }

    pub fn save_feed_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Task Feed", &["json"])
            .set_file_name(format!("{}.json", self.feed.name))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.write_feed(path);
        }
    }

    fn write_feed(&mut self, path: PathBuf) {
        self.feed.touch();
        match gantt_timeline::io::save_feed(&self.feed, &path) {
            Ok(()) => self.status_message = "Feed saved".to_string(),
            Err(e) => {
                tracing::error!(error = %e, "failed to save feed");
                self.status_message = format!("Error saving: {}", e);
            }
        }
    }

    /// Remember the zoom level and completed-task visibility for the next launch.
    fn persist_view_settings(&mut self) {
        let show_completed = self.engine.filters().show_completed;
        if !self.settings.engine.remember_view(self.engine.zoom(), show_completed) {
            return;
        }
        let saved = AppSettings::default_path().and_then(|path| self.settings.save(&path));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to save settings");
        }
    }

    // --- Engine events ---

    fn dispatch_events(&mut self, ctx: &egui::Context, clock: Instant) {
        for event in self.engine.take_events() {
            match event {
                EngineEvent::UpdateTaskDates { .. }
                | EngineEvent::UpdateTaskStatus { .. }
                | EngineEvent::CreateSubtask { .. }
                | EngineEvent::DeleteTask(_) => {
                    tracing::debug!(?event, "mutation queued");
                    self.status_message = "Saving…".to_string();
                    self.pending.push(PendingMutation {
                        apply_at: clock + self.latency,
                        event,
                    });
                }
                EngineEvent::TaskClicked(id) => {
                    self.selected_task = Some(id);
                    if let Some(task) = self.feed.task(id) {
                        self.status_message = format!("Selected '{}'", task.name);
                    }
                }
                EngineEvent::EditTask(id) => self.begin_edit(id),
                EngineEvent::ContextMenuRequested(id) => {
                    let pos = ctx.pointer_latest_pos().unwrap_or_default();
                    self.context_menu = Some((id, pos));
                }
                EngineEvent::FocusPushed { name, .. } => {
                    self.status_message = format!("Showing subtasks of '{}'", name);
                }
                EngineEvent::FocusPopped { depth } => {
                    self.status_message = if depth == 0 {
                        "Showing all tasks".to_string()
                    } else {
                        format!("Back to level {}", depth)
                    };
                }
            }
        }
    }

    fn apply_due_mutations(&mut self, clock: Instant) {
        let (due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|m| m.apply_at <= clock);
        self.pending = waiting;
        if due.is_empty() {
            return;
        }
        for mutation in due {
            self.apply(mutation.event);
        }
        self.feed.touch();
        self.sync_engine();
        if self.pending.is_empty() {
            self.status_message = "Saved".to_string();
        }
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::UpdateTaskDates { id, start, due } => {
                if let Some(task) = self.feed.task_mut(id) {
                    task.set_span(start, due);
                }
            }
            EngineEvent::UpdateTaskStatus { id, status } => {
                if let Some(task) = self.feed.task_mut(id) {
                    task.status = status;
                    task.completed_at = (status == TaskStatus::Completed).then(Utc::now);
                }
            }
            EngineEvent::CreateSubtask { parent_id } => self.add_subtask(parent_id),
            EngineEvent::DeleteTask(id) => {
                let removed = self.feed.remove_subtree(id);
                tracing::info!(task = %id, removed, "task deleted");
                if self.selected_task.is_some_and(|s| self.feed.task(s).is_none()) {
                    self.selected_task = None;
                }
            }
            other => tracing::warn!(event = ?other, "not a mutation"),
        }
    }

    /// Add a subtask under the given parent. Inserts immediately after the parent's last child.
    fn add_subtask(&mut self, parent_id: TaskId) {
        let Some(parent) = self.feed.task(parent_id) else {
            return;
        };
        let (parent_start, _) = parent.span(today());
        let start = parent_start.max(today());
        let mut t = Task::new("New Subtask", Utc::now(), Utc::now());
        t.set_span(start, start + Days::days(7));
        t.parent_id = Some(parent_id);

        let insert_pos = self
            .feed
            .tasks
            .iter()
            .rposition(|t| t.parent_id == Some(parent_id) || t.id == parent_id)
            .map(|p| p + 1)
            .unwrap_or(self.feed.tasks.len());
        self.selected_task = Some(t.id);
        self.feed.tasks.insert(insert_pos, t);
    }

    pub fn begin_edit(&mut self, id: TaskId) {
        if let Some(task) = self.feed.task(id) {
            self.editing = Some(TaskEdit {
                id,
                name: task.name.clone(),
                status: task.status,
                priority: task.priority,
            });
        }
    }

    pub fn commit_edit(&mut self, edit: TaskEdit) {
        if let Some(task) = self.feed.task_mut(edit.id) {
            task.name = edit.name;
            task.priority = edit.priority;
            if task.status != edit.status {
                task.completed_at = (edit.status == TaskStatus::Completed).then(Utc::now);
                task.status = edit.status;
            }
            self.feed.touch();
            self.sync_engine();
            self.status_message = "Task updated".to_string();
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let clock = Instant::now();
        let now = Local::now().naive_local();

        self.apply_due_mutations(clock);
        let sweep_interval = self.engine.config().sweep_interval();
        if clock.saturating_duration_since(self.last_sweep) >= sweep_interval {
            self.engine.sweep(clock);
            self.last_sweep = clock;
        }
        self.engine.on_frame(clock);

        let should_save = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_feed();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Zoom: {} · Pending: {}",
                                self.feed.tasks.len(),
                                self.engine.zoom().label(),
                                self.pending.len() + self.engine.overlay().len(),
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| ui::gantt_chart::show_timeline(&mut self.engine, ui, now, clock))
            .inner;
        if let Some(menu) = interaction.context_menu {
            self.context_menu = Some(menu);
        }

        self.dispatch_events(ctx, clock);
        self.persist_view_settings();

        if self.context_menu.is_some() {
            ui::dialogs::show_context_menu(self, ctx);
        }
        if self.editing.is_some() {
            ui::dialogs::show_edit_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        // menu clicks may have queued more events
        self.dispatch_events(ctx, clock);

        if !self.pending.is_empty() || !self.engine.overlay().is_empty() {
            ctx.request_repaint_after(sweep_interval.min(self.latency));
        }
    }
}
