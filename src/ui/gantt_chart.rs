use std::time::Instant;

use chrono::{Datelike, NaiveDateTime, Weekday};
use egui::{Align2, Color32, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::ui::theme;
use gantt_timeline::engine::drag::DragKind;
use gantt_timeline::engine::keyboard::{Key, KeyInput};
use gantt_timeline::engine::scroller::{WheelInput, WheelOutcome};
use gantt_timeline::engine::{TaskLayout, TimelineLayout};
use gantt_timeline::model::{TaskId, ZoomLevel};
use gantt_timeline::TimelineEngine;

/// Result details from interactions in the timeline.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// Secondary click on a bar: open the action menu at this screen position.
    pub context_menu: Option<(TaskId, Pos2)>,
}

/// Pointer position relative to the chart: x from the left edge, y from the
/// top of the row area including vertical scroll.
fn chart_local(rect: Rect, header: f32, scroll_y: f32, pos: Pos2) -> (f64, f64) {
    (
        (pos.x - rect.left()) as f64,
        (pos.y - rect.top() - header + scroll_y) as f64,
    )
}

/// Render the timeline into the remaining space of `ui` and feed pointer,
/// wheel and keyboard input to the engine.
pub fn show_timeline(
    engine: &mut TimelineEngine,
    ui: &mut Ui,
    now: NaiveDateTime,
    clock: Instant,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let today = now.date();
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;
    engine.set_container_width(rect.width() as f64);

    let scroll_id = Id::new("timeline-scroll-y");
    let mut scroll_y: f32 = ui.ctx().data_mut(|d| *d.get_temp_mut_or_default(scroll_id));

    let layout = engine.layout(now, clock);
    let header = layout.metrics.header_height as f32;
    let local = move |pos: Pos2| chart_local(rect, header, scroll_y, pos);

    // ── Pointer ──────────────────────────────────────────────────
    if !engine.is_dragging() {
        let hovered = response
            .hover_pos()
            .and_then(|pos| {
                let (x, y) = local(pos);
                layout.bar_at(x, y)
            })
            .map(|t| t.id);
        engine.set_hovered(hovered);
    }

    if response.drag_started() {
        let origin = ui.input(|i| i.pointer.press_origin());
        if let Some(pos) = origin {
            let (x, y) = local(pos);
            if let Some(task) = layout.bar_at(x, y) {
                engine.pointer_down(task.id, x, today);
            }
        }
    }
    if response.dragged() && engine.is_dragging() {
        if let Some(pos) = response.interact_pointer_pos() {
            engine.pointer_move(local(pos).0);
        }
    }
    if response.drag_stopped() {
        engine.pointer_up(clock);
    }
    let pointer_gone = ui.input(|i| !i.pointer.has_pointer() || i.key_pressed(egui::Key::Escape));
    if engine.is_dragging() && pointer_gone {
        engine.pointer_cancel();
    }

    if response.clicked() {
        if let Some(id) = engine.hovered() {
            engine.click_task(id);
        }
    }
    if response.secondary_clicked() {
        if let (Some(id), Some(pos)) = (engine.hovered(), response.interact_pointer_pos()) {
            interaction.context_menu = Some((id, pos));
        }
    }

    // ── Wheel ────────────────────────────────────────────────────
    if ui.rect_contains_pointer(rect) {
        let (delta, shift) = ui.input(|i| (i.raw_scroll_delta, i.modifiers.shift));
        if delta != Vec2::ZERO {
            let input = WheelInput {
                delta_x: -delta.x as f64,
                delta_y: -delta.y as f64,
                shift,
            };
            if engine.wheel(input, clock) == WheelOutcome::PassThrough {
                let content = layout.rows.len() as f32 * layout.metrics.row_height as f32;
                let max = (content - (rect.height() - header)).max(0.0);
                scroll_y = (scroll_y - delta.y).clamp(0.0, max);
            }
        }
    }
    ui.ctx().data_mut(|d| d.insert_temp(scroll_id, scroll_y));

    // ── Keyboard ─────────────────────────────────────────────────
    let text_focus = ui.ctx().wants_keyboard_input();
    let keys: Vec<KeyInput> = ui.input(|i| {
        i.events
            .iter()
            .filter_map(|event| {
                let (key, modifiers) = match event {
                    egui::Event::Key {
                        key: egui::Key::Enter,
                        pressed: true,
                        modifiers,
                        ..
                    } => (Key::Enter, *modifiers),
                    egui::Event::Text(text) => (Key::Char(text.chars().next()?), i.modifiers),
                    _ => return None,
                };
                Some(KeyInput {
                    key,
                    shift: modifiers.shift,
                    ctrl: modifiers.ctrl,
                    alt: modifiers.alt,
                    meta: modifiers.mac_cmd,
                    text_focus,
                })
            })
            .collect()
    });
    for key in keys {
        engine.handle_key(&key, clock);
    }

    // ── Paint ────────────────────────────────────────────────────
    let layout = engine.layout(now, clock);
    let header = layout.metrics.header_height as f32;
    let rows_top = rect.top() + header;
    let local = move |pos: Pos2| chart_local(rect, header, scroll_y, pos);
    let ctx = ui.ctx().clone();
    let anim_secs = engine.config().zoom_animation_ms as f32 / 1000.0;

    painter.rect_filled(rect, 0.0, theme::BG_DARK);
    draw_grid(&painter, rect, header, &layout);

    let rows_rect = Rect::from_min_max(Pos2::new(rect.left(), rows_top), rect.max);
    let rows_painter = painter.with_clip_rect(rows_rect);
    let row_h = layout.metrics.row_height as f32;
    let total_rows = layout.metrics.filler_rows(layout.rows.len(), rect.height() as f64);
    for row in 0..total_rows {
        let y = rows_top + row as f32 * row_h - scroll_y;
        let hovered = layout
            .rows
            .get(row)
            .is_some_and(|t| engine.hovered() == Some(t.id));
        if hovered {
            rows_painter.rect_filled(
                Rect::from_min_size(Pos2::new(rect.left(), y), Vec2::new(rect.width(), row_h)),
                0.0,
                theme::BG_ROW_HOVER,
            );
        }
        rows_painter.line_segment(
            [Pos2::new(rect.left(), y + row_h), Pos2::new(rect.right(), y + row_h)],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    for task in &layout.rows {
        let animate = |name: &'static str, value: f64| {
            let id = Id::new((name, task.id));
            let secs = if layout.animating { anim_secs } else { 0.0 };
            let eased = ctx.animate_value_with_time(id, value as f32, secs);
            if layout.animating {
                eased
            } else {
                value as f32
            }
        };
        let y = rows_top + task.top as f32 - scroll_y;
        let left = rect.left() + animate("bar-left", task.bar.left);
        let width = animate("bar-width", task.bar.width);
        let bar_rect = Rect::from_min_size(
            Pos2::new(left, y),
            Vec2::new(width, layout.metrics.bar_height as f32),
        );
        draw_task(&rows_painter, rect, bar_rect, task, &layout, engine.hovered() == Some(task.id));
    }

    draw_header(&painter, rect, header, &layout);
    draw_today_line(&painter, rect, header, layout.today_x as f32);

    // ── Affordances ──────────────────────────────────────────────
    if let Some(drag) = engine.drag() {
        ctx.set_cursor_icon(match drag.kind {
            DragKind::Move => egui::CursorIcon::Grabbing,
            DragKind::ResizeStart | DragKind::ResizeEnd => egui::CursorIcon::ResizeHorizontal,
        });
    } else if let Some(pos) = response.hover_pos() {
        let (x, y) = local(pos);
        if let Some(task) = layout.bar_at(x, y) {
            let kind = DragKind::classify(&task.bar, x, engine.config().edge_handle_px);
            ctx.set_cursor_icon(match kind {
                Some(DragKind::ResizeStart | DragKind::ResizeEnd) => egui::CursorIcon::ResizeHorizontal,
                _ => egui::CursorIcon::Grab,
            });
            egui::show_tooltip_at_pointer(&ctx, ui.layer_id(), Id::new(("task-tip", task.id)), |ui| {
                ui.strong(&task.name);
                ui.label(format!(
                    "{} → {}",
                    task.start.format("%d/%m/%Y"),
                    task.due.format("%d/%m/%Y"),
                ));
                ui.label(format!("{} · {:?} priority", task.status.label(), task.priority));
                if let Some(delay) = task.delay {
                    let verb = if delay.ongoing { "Overdue by" } else { "Finished late by" };
                    ui.colored_label(theme::TODAY_LINE, format!("{verb} {} day(s)", delay.days));
                }
            });
        }
    }

    if engine.needs_frame(clock) || layout.animating || engine.is_dragging() {
        ctx.request_repaint();
    }

    interaction
}

fn draw_grid(painter: &egui::Painter, rect: Rect, header: f32, layout: &TimelineLayout) {
    let width = layout.columns.get(1).map_or(0.0, |c| c.left - layout.columns[0].left) as f32;
    for column in &layout.columns {
        let x = rect.left() + column.left as f32;
        if layout.zoom == ZoomLevel::Day && matches!(column.date.weekday(), Weekday::Sat | Weekday::Sun) {
            painter.rect_filled(
                Rect::from_min_max(Pos2::new(x, rect.top() + header), Pos2::new(x + width, rect.bottom())),
                0.0,
                theme::BG_WEEKEND,
            );
        }
        painter.line_segment(
            [Pos2::new(x, rect.top() + header), Pos2::new(x, rect.bottom())],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

fn draw_header(painter: &egui::Painter, rect: Rect, header: f32, layout: &TimelineLayout) {
    let header_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), header));
    painter.rect_filled(header_rect, 0.0, theme::BG_HEADER);
    painter.line_segment(
        [Pos2::new(rect.left(), rect.top() + header), Pos2::new(rect.right(), rect.top() + header)],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    let clipped = painter.with_clip_rect(header_rect);

    // Day zoom stacks month bands over day labels.
    let label_y = if layout.month_bands.is_empty() {
        rect.top() + header / 2.0
    } else {
        for band in &layout.month_bands {
            let x = rect.left() + band.left as f32;
            clipped.line_segment(
                [Pos2::new(x, rect.top()), Pos2::new(x, rect.top() + header / 2.0)],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );
            // keep the label on screen while its band is partly scrolled off
            let text_x = x.max(rect.left()) + 6.0;
            clipped.text(
                Pos2::new(text_x, rect.top() + header / 4.0),
                Align2::LEFT_CENTER,
                &band.label,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
        rect.top() + header * 0.75
    };

    for column in &layout.columns {
        let x = rect.left() + column.left as f32;
        clipped.text(
            Pos2::new(x + 6.0, label_y),
            Align2::LEFT_CENTER,
            &column.label,
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn draw_today_line(painter: &egui::Painter, rect: Rect, header: f32, today_x: f32) {
    let x = rect.left() + today_x;
    if x < rect.left() || x > rect.right() {
        return;
    }
    painter.line_segment(
        [Pos2::new(x, rect.top() + header), Pos2::new(x, rect.bottom())],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(Pos2::new(x - badge_w / 2.0, rect.top() + header - 1.0), Vec2::new(badge_w, 14.0));
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_task(
    painter: &egui::Painter,
    chart: Rect,
    bar_rect: Rect,
    task: &TaskLayout,
    layout: &TimelineLayout,
    hovered: bool,
) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let fill = theme::status_color(task.status);

    if let Some(delay) = task.delay_bar {
        let delay_rect = Rect::from_min_size(
            Pos2::new(chart.left() + delay.left as f32, bar_rect.top()),
            Vec2::new(delay.width as f32, bar_rect.height()),
        );
        let color = match task.delay {
            Some(d) if d.ongoing => theme::DELAY_ONGOING,
            _ => theme::DELAY_LATE,
        };
        painter.rect_filled(
            delay_rect,
            Rounding {
                nw: 0.0,
                sw: 0.0,
                ne: theme::BAR_ROUNDING,
                se: theme::BAR_ROUNDING,
            },
            color,
        );
    }

    let drawn = match task.preview {
        Some(preview) => {
            // ghost of the committed position under the live preview
            painter.rect_filled(bar_rect, rounding, fill.gamma_multiply(0.25));
            Rect::from_min_size(
                Pos2::new(chart.left() + preview.bar.left as f32, bar_rect.top()),
                Vec2::new(preview.bar.width as f32, bar_rect.height()),
            )
        }
        None => bar_rect,
    };

    painter.rect_filled(drawn.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(drawn, rounding, fill);
    painter.rect_filled(
        Rect::from_min_size(drawn.min, Vec2::new(drawn.width(), (drawn.height() * 0.45).max(4.0))),
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(20),
    );

    if task.preview.is_some() {
        painter.rect_stroke(drawn.expand(1.5), rounding, Stroke::new(2.0, theme::PREVIEW_OUTLINE));
    } else if hovered {
        painter.rect_stroke(drawn.expand(1.5), rounding, Stroke::new(2.0, theme::BORDER_ACCENT));
        let handle_h = drawn.height() * 0.55;
        let handle_y = drawn.center().y - handle_h / 2.0;
        for hx in [drawn.left() + 1.0, drawn.right() - 5.0] {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(hx, handle_y), Vec2::new(4.0, handle_h)),
                Rounding::same(2.0),
                theme::HANDLE_COLOR,
            );
        }
    }

    // priority dot
    painter.circle_filled(
        Pos2::new(drawn.left() + 10.0, drawn.center().y),
        3.0,
        theme::priority_color(task.priority),
    );

    let mut text_right = drawn.right() - 6.0;
    if task.has_children {
        painter.text(
            Pos2::new(text_right, drawn.center().y),
            Align2::RIGHT_CENTER,
            egui_phosphor::regular::TREE_STRUCTURE,
            theme::font_bar(),
            theme::TEXT_ON_BAR,
        );
        text_right -= 18.0;
    }
    text_right = draw_chips(painter, drawn, text_right, task);

    if drawn.width() > 30.0 {
        let label = match task.preview {
            Some(p) => format!("{} → {}", p.start.format("%b %-d"), p.due.format("%b %-d")),
            None => task.name.clone(),
        };
        let galley = painter.layout_no_wrap(label, theme::font_bar(), theme::TEXT_ON_BAR);
        let clip = Rect::from_min_max(drawn.min, Pos2::new(text_right.max(drawn.left()), drawn.bottom()));
        let text_y = drawn.center().y - galley.size().y / 2.0;
        painter
            .with_clip_rect(clip.intersect(painter.clip_rect()))
            .galley(Pos2::new(drawn.left() + 18.0, text_y), galley, Color32::TRANSPARENT);
    }

    if layout.dragging && task.preview.is_none() {
        // dim everything that is not being dragged
        painter.rect_filled(drawn, rounding, Color32::from_black_alpha(40));
    }
}

/// Paint assignee chips right-aligned at `right`; returns the x left of them.
fn draw_chips(painter: &egui::Painter, bar: Rect, right: f32, task: &TaskLayout) -> f32 {
    let mut x = right;
    let cy = bar.center().y;
    if task.assignees.overflow > 0 {
        let r = theme::CHIP_RADIUS;
        painter.circle_filled(Pos2::new(x - r, cy), r, theme::CHIP_BG);
        painter.text(
            Pos2::new(x - r, cy),
            Align2::CENTER_CENTER,
            format!("+{}", task.assignees.overflow),
            theme::font_small(),
            theme::TEXT_PRIMARY,
        );
        x -= r * 2.0 + 2.0;
    }
    for chip in task.assignees.chips.iter().rev() {
        let r = theme::CHIP_RADIUS;
        painter.circle(Pos2::new(x - r, cy), r, theme::CHIP_BG, Stroke::new(1.0, Color32::WHITE));
        painter.text(
            Pos2::new(x - r, cy),
            Align2::CENTER_CENTER,
            chip.initial.to_string(),
            theme::font_small(),
            theme::TEXT_PRIMARY,
        );
        x -= r * 2.0 + 2.0;
    }
    x
}
