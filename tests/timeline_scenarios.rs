use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeZone, Utc};
use gantt_timeline::engine::drag::DragKind;
use gantt_timeline::engine::filter::FocusFilters;
use gantt_timeline::engine::keyboard::{Key, KeyInput};
use gantt_timeline::engine::scroller::{WheelInput, WheelOutcome};
use gantt_timeline::model::{Task, TaskStatus, User, ZoomLevel};
use gantt_timeline::{EngineConfig, EngineEvent, TimelineEngine};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(name: &str, start: NaiveDate, due: NaiveDate) -> Task {
    let at = |d: NaiveDate| Utc.from_utc_datetime(&d.and_hms_opt(10, 0, 0).unwrap());
    Task::new(name, at(start), at(due))
}

fn engine(tasks: Vec<Task>, today: NaiveDate) -> TimelineEngine {
    let mut engine = TimelineEngine::new(EngineConfig::default(), today);
    engine.set_feed(tasks, Vec::new(), today);
    engine
}

#[test]
fn week_zoom_resize_end_by_three_weeks() {
    let reference = day(2024, 1, 1);
    let t = task("kickoff", day(2024, 1, 3), day(2024, 1, 10));
    let id = t.id;
    let mut engine = engine(vec![t], reference);
    assert_eq!(engine.zoom(), ZoomLevel::Week);

    let now = reference.and_hms_opt(8, 0, 0).unwrap();
    let clock = Instant::now();
    let layout = engine.layout(now, clock);
    let bar = layout.rows[0].bar;
    let column = 120.0;
    let scroll = engine.viewport().scroll_offset;

    // Wednesday of week one through the end of Wednesday in week two.
    assert!((bar.left - (2.0 / 7.0 * column - scroll)).abs() < 1e-9);
    assert!((bar.right() - ((1.0 + 3.0 / 7.0) * column - scroll)).abs() < 1e-9);

    let grab = bar.right() - 2.0;
    assert_eq!(engine.pointer_down(id, grab, reference), Some(DragKind::ResizeEnd));
    engine.pointer_move(grab + 3.0 * column);
    assert_eq!(engine.pointer_up(clock), Some((day(2024, 1, 3), day(2024, 1, 31))));
    assert_eq!(
        engine.take_events(),
        vec![EngineEvent::UpdateTaskDates {
            id,
            start: day(2024, 1, 3),
            due: day(2024, 1, 31),
        }]
    );
}

#[test]
fn yesterday_due_in_progress_has_clamped_delay() {
    let today = day(2024, 3, 15);
    let mut t = task("late", day(2024, 3, 10), day(2024, 3, 14));
    t.status = TaskStatus::InProgress;

    for zoom in [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month] {
        let mut engine = engine(vec![t.clone()], today);
        engine.set_zoom(zoom, Instant::now());
        let now = today.and_hms_opt(6, 0, 0).unwrap();
        let layout = engine.layout(now, Instant::now());
        let row = &layout.rows[0];

        let delay = row.delay.expect("overdue task carries a delay");
        assert_eq!(delay.days, 1);
        assert!(delay.ongoing);
        let segment = row.delay_bar.expect("delay segment is drawn");
        assert_eq!(segment.left, row.bar.right());
        assert!((segment.right() - layout.today_x).abs() < 1e-9, "{zoom:?}");
    }
}

#[test]
fn completed_same_day_has_no_delay_segment() {
    let today = day(2024, 3, 15);
    let mut t = task("done", day(2024, 3, 1), day(2024, 3, 5));
    t.status = TaskStatus::Completed;
    t.completed_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap());
    let mut engine = engine(vec![t], today);
    engine.set_filters(FocusFilters::new(true));

    let layout = engine.layout(today.and_hms_opt(12, 0, 0).unwrap(), Instant::now());
    assert_eq!(layout.rows[0].delay, None);
    assert_eq!(layout.rows[0].delay_bar, None);
}

#[test]
fn completed_late_delay_spans_to_completion() {
    let today = day(2024, 3, 15);
    let mut t = task("late done", day(2024, 3, 1), day(2024, 3, 5));
    t.status = TaskStatus::Completed;
    t.completed_at = Some(Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap());
    let mut engine = engine(vec![t], today);
    engine.set_filters(FocusFilters::new(true));
    engine.set_zoom(ZoomLevel::Day, Instant::now());

    let layout = engine.layout(today.and_hms_opt(12, 0, 0).unwrap(), Instant::now());
    let row = &layout.rows[0];
    assert_eq!(row.delay.map(|d| d.days), Some(3));
    assert_eq!(row.delay_bar.map(|b| b.width), Some(3.0 * 120.0));
}

#[test]
fn drill_down_round_trip_restores_view() {
    let today = day(2024, 5, 1);
    let parent = task("parent", day(2024, 5, 1), day(2024, 5, 20));
    let mut child = task("child", day(2024, 5, 2), day(2024, 5, 4));
    child.parent_id = Some(parent.id);
    let mut grandchild = task("grandchild", day(2024, 5, 2), day(2024, 5, 3));
    grandchild.parent_id = Some(child.id);
    let sibling = task("sibling", day(2024, 5, 1), day(2024, 5, 9));
    let (pid, cid) = (parent.id, child.id);
    let mut engine = engine(vec![parent, child, grandchild, sibling], today);

    let top = engine.visible_ids(today);
    assert!(engine.show_subtasks(pid));
    let level_one = engine.visible_ids(today);
    let crumbs_one = engine.focus_stack().clone();
    assert_eq!(level_one, vec![cid]);

    assert!(engine.show_subtasks(cid));
    assert!(engine.focus_up());
    assert_eq!(engine.visible_ids(today), level_one);
    assert_eq!(engine.focus_stack(), &crumbs_one);

    assert!(engine.focus_up());
    assert_eq!(engine.visible_ids(today), top);
    assert!(engine.focus_stack().is_empty());
}

#[test]
fn drill_down_keeps_scroll_and_zoom() {
    let today = day(2024, 5, 1);
    let parent = task("parent", day(2024, 5, 1), day(2024, 5, 20));
    let mut child = task("child", day(2024, 5, 2), day(2024, 5, 4));
    child.parent_id = Some(parent.id);
    let pid = parent.id;
    let mut engine = engine(vec![parent, child], today);
    engine.set_zoom(ZoomLevel::Month, Instant::now());
    engine.scroll_next();
    let scroll = engine.viewport().scroll_offset;

    engine.show_subtasks(pid);
    engine.focus_root();
    assert_eq!(engine.viewport().scroll_offset, scroll);
    assert_eq!(engine.zoom(), ZoomLevel::Month);
    assert_eq!(
        engine.take_events(),
        vec![
            EngineEvent::FocusPushed {
                task_id: pid,
                name: "parent".into()
            },
            EngineEvent::FocusPopped { depth: 0 },
        ]
    );
}

#[test]
fn leaf_tasks_cannot_be_drilled_into() {
    let today = day(2024, 5, 1);
    let leaf = task("leaf", day(2024, 5, 1), day(2024, 5, 2));
    let id = leaf.id;
    let mut engine = engine(vec![leaf], today);
    assert!(!engine.show_subtasks(id));
    assert!(engine.take_events().is_empty());
}

#[test]
fn override_expires_without_authoritative_update() {
    let today = day(2024, 1, 1);
    let t = task("moved", day(2024, 1, 1), day(2024, 1, 20));
    let id = t.id;
    let mut engine = engine(vec![t], today);
    engine.set_zoom(ZoomLevel::Day, Instant::now());
    let now = today.and_hms_opt(9, 0, 0).unwrap();
    let clock = Instant::now();

    let bar = engine.layout(now, clock).rows[0].bar;
    let x = bar.left + 100.0;
    assert_eq!(engine.pointer_down(id, x, today), Some(DragKind::Move));
    engine.pointer_move(x - 240.0);
    engine.pointer_up(clock);

    let shown = engine.layout(now, clock).rows[0].start;
    assert_eq!(shown, day(2023, 12, 30));
    assert_eq!(engine.sweep(clock + Duration::from_millis(1500)), 0);
    assert_eq!(engine.sweep(clock + Duration::from_millis(2000)), 1);
    assert_eq!(engine.layout(now, clock).rows[0].start, day(2024, 1, 1));
}

#[test]
fn zero_delta_drag_is_a_no_op() {
    let today = day(2024, 1, 1);
    let t = task("still", day(2024, 1, 1), day(2024, 1, 20));
    let id = t.id;
    let mut engine = engine(vec![t], today);
    let clock = Instant::now();
    let bar = engine.layout(today.and_hms_opt(9, 0, 0).unwrap(), clock).rows[0].bar;
    let x = bar.left + 100.0;
    engine.pointer_down(id, x, today);
    engine.pointer_move(x + 3.0);
    assert_eq!(engine.pointer_up(clock), None);
    assert!(engine.overlay().is_empty());
    assert!(engine.take_events().is_empty());
}

#[test]
fn auto_scroll_keeps_bar_under_cursor() {
    let today = day(2024, 1, 1);
    let t = task("edge", day(2024, 1, 1), day(2024, 1, 20));
    let id = t.id;
    let mut engine = engine(vec![t], today);
    engine.set_zoom(ZoomLevel::Day, Instant::now());
    engine.set_container_width(1000.0);
    let clock = Instant::now();
    let bar = engine.layout(today.and_hms_opt(9, 0, 0).unwrap(), clock).rows[0].bar;
    let x = bar.left + 50.0;
    engine.pointer_down(id, x, today);

    // Hold the pointer at the right edge: every tick scrolls and grows the delta.
    let before = engine.viewport().scroll_offset;
    for _ in 0..12 {
        engine.pointer_move(995.0);
    }
    let scrolled = engine.viewport().scroll_offset - before;
    assert!(scrolled > 0.0);
    let drag = engine.drag().unwrap();
    assert!((drag.pixel_delta - ((995.0 - x) + scrolled)).abs() < 1e-9);
}

#[test]
fn filters_combine_focus_and_completed_visibility() {
    let today = day(2024, 6, 10);
    let mut todo = task("todo", day(2024, 6, 1), day(2024, 6, 30));
    todo.status = TaskStatus::ToDo;
    let mut blocked = task("blocked", day(2024, 6, 1), day(2024, 6, 30));
    blocked.status = TaskStatus::Blocked;
    let mut overdue = task("overdue", day(2024, 6, 1), day(2024, 6, 5));
    overdue.status = TaskStatus::InProgress;
    let mut done = task("done", day(2024, 6, 1), day(2024, 6, 5));
    done.status = TaskStatus::Completed;
    done.completed_at = Some(Utc.with_ymd_and_hms(2024, 6, 8, 9, 0, 0).unwrap());
    let ids = [todo.id, blocked.id, overdue.id, done.id];
    let mut engine = engine(vec![todo, blocked, overdue, done], today);

    assert_eq!(engine.visible_ids(today), ids[..3].to_vec());

    engine.set_filters(engine.filters().executive());
    assert_eq!(engine.visible_ids(today), vec![ids[2]]);

    engine.set_filters(FocusFilters {
        show_completed: true,
        ..FocusFilters::default().executive()
    });
    assert_eq!(engine.visible_ids(today), vec![ids[2], ids[3]]);

    engine.set_filters(FocusFilters {
        todo: true,
        blocked: true,
        ..FocusFilters::reset()
    });
    assert_eq!(engine.visible_ids(today), vec![ids[0], ids[1]]);
}

#[test]
fn vertical_wheel_passes_through_and_horizontal_scrolls() {
    let mut engine = engine(Vec::new(), day(2024, 1, 1));
    let clock = Instant::now();
    let vertical = WheelInput {
        delta_x: 0.0,
        delta_y: 40.0,
        shift: false,
    };
    assert_eq!(engine.wheel(vertical, clock), WheelOutcome::PassThrough);
    let before = engine.viewport().scroll_offset;
    let horizontal = WheelInput {
        delta_x: 30.0,
        delta_y: 1.0,
        shift: false,
    };
    assert_eq!(engine.wheel(horizontal, clock), WheelOutcome::Scrolled);
    assert_eq!(engine.viewport().scroll_offset, before + 30.0);
}

#[test]
fn keyboard_drills_and_sets_status_on_hovered_task() {
    let today = day(2024, 5, 1);
    let parent = task("parent", day(2024, 5, 1), day(2024, 5, 20));
    let mut child = task("child", day(2024, 5, 2), day(2024, 5, 4));
    child.parent_id = Some(parent.id);
    let (pid, cid) = (parent.id, child.id);
    let mut engine = engine(vec![parent, child], today);
    let clock = Instant::now();

    engine.set_hovered(Some(pid));
    assert!(engine.handle_key(&KeyInput::plain(Key::Char('s')), clock));
    assert_eq!(engine.visible_ids(today), vec![cid]);

    engine.set_hovered(Some(cid));
    assert!(engine.handle_key(&KeyInput::plain(Key::Char('3')), clock));
    assert!(engine.handle_key(&KeyInput::plain(Key::Char('d')), clock));
    assert!(engine.handle_key(&KeyInput::shifted(Key::Char('S')), clock));
    assert!(engine.focus_stack().is_empty());

    let events = engine.take_events();
    assert!(events.contains(&EngineEvent::UpdateTaskStatus {
        id: cid,
        status: TaskStatus::InReview,
    }));
    assert!(events.contains(&EngineEvent::DeleteTask(cid)));
}

#[test]
fn feed_removal_unwinds_focus_and_cancels_drag() {
    let today = day(2024, 5, 1);
    let parent = task("parent", day(2024, 5, 1), day(2024, 5, 20));
    let mut child = task("child", day(2024, 5, 2), day(2024, 5, 10));
    child.parent_id = Some(parent.id);
    let (pid, cid) = (parent.id, child.id);
    let mut engine = engine(vec![parent.clone(), child], today);
    engine.show_subtasks(pid);

    let bar = engine.layout(today.and_hms_opt(9, 0, 0).unwrap(), Instant::now()).rows[0].bar;
    engine.pointer_down(cid, bar.left + bar.width / 2.0, today);
    assert!(engine.is_dragging());

    engine.set_feed(vec![parent], Vec::new(), today);
    assert!(engine.focus_stack().is_empty());
    assert!(!engine.is_dragging());
}

#[test]
fn assignee_chips_resolve_through_roster() {
    let today = day(2024, 5, 1);
    let ada = User {
        id: Uuid::new_v4(),
        name: "ada".into(),
        avatar_url: None,
    };
    let mut t = task("wide", day(2024, 5, 1), day(2024, 6, 30));
    t.assigned_user_ids = vec![ada.id, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let mut engine = TimelineEngine::new(EngineConfig::default(), today);
    engine.set_feed(vec![t], vec![ada], today);

    let layout = engine.layout(today.and_hms_opt(9, 0, 0).unwrap(), Instant::now());
    let chips = &layout.rows[0].assignees;
    assert_eq!(chips.chips.len(), 2);
    assert_eq!(chips.chips[0].initial, 'A');
    assert_eq!(chips.chips[1].name, None);
    assert_eq!(chips.overflow, 2);
}

#[test]
fn missing_dates_render_from_today() {
    let today = day(2024, 5, 1);
    let mut t = task("undated", today, today);
    t.start = None;
    t.due = None;
    let engine = engine(vec![t], today);
    let layout = engine.layout(today.and_hms_opt(9, 0, 0).unwrap(), Instant::now());
    assert_eq!(layout.rows[0].start, today);
    assert_eq!(layout.rows[0].due, day(2024, 5, 8));
    assert!(layout.rows[0].bar.width > 0.0);
}

#[test]
fn wheel_deferred_before_drag_never_moves_the_bar() {
    let today = day(2024, 1, 1);
    let t = task("steady", day(2024, 1, 1), day(2024, 1, 20));
    let id = t.id;
    let mut engine = engine(vec![t], today);
    let t0 = Instant::now();
    let nudge = WheelInput {
        delta_x: 50.0,
        delta_y: 0.0,
        shift: false,
    };
    assert_eq!(engine.wheel(nudge, t0), WheelOutcome::Scrolled);
    assert_eq!(engine.wheel(nudge, t0 + Duration::from_millis(2)), WheelOutcome::Deferred);

    let now = today.and_hms_opt(9, 0, 0).unwrap();
    let bar = engine.layout(now, t0).rows[0].bar;
    let x = bar.left + 60.0;
    let scroll = engine.viewport().scroll_offset;
    engine.pointer_down(id, x, today);
    for ms in [20, 40, 60] {
        engine.on_frame(t0 + Duration::from_millis(ms));
        engine.pointer_move(x);
    }
    assert_eq!(engine.viewport().scroll_offset, scroll);
    assert_eq!(engine.pointer_up(t0), None);
    assert!(engine.take_events().is_empty());

    // the dropped delta stays dropped after release
    engine.on_frame(t0 + Duration::from_millis(80));
    assert_eq!(engine.viewport().scroll_offset, scroll);
}

#[test]
fn parent_cycle_tasks_stay_reachable() {
    let today = day(2024, 5, 1);
    let mut a = task("a", day(2024, 5, 1), day(2024, 5, 3));
    let mut b = task("b", day(2024, 5, 2), day(2024, 5, 4));
    a.parent_id = Some(b.id);
    b.parent_id = Some(a.id);
    let mut looped = task("looped", day(2024, 5, 1), day(2024, 5, 2));
    looped.parent_id = Some(looped.id);
    let (aid, bid, lid) = (a.id, b.id, looped.id);
    let mut engine = engine(vec![a, b, looped], today);

    let top = engine.visible_ids(today);
    assert!(top.contains(&aid) && top.contains(&lid));
    assert!(!top.contains(&bid));
    assert!(engine.show_subtasks(aid));
    assert_eq!(engine.visible_ids(today), vec![bid]);
    assert!(!engine.show_subtasks(bid));
}
