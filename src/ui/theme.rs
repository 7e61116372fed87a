use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use gantt_timeline::model::{Priority, TaskStatus};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_WEEKEND: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 4);
pub const BG_ROW_HOVER: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 10);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

pub const DELAY_ONGOING: Color32 = Color32::from_rgba_premultiplied(200, 50, 50, 170);
pub const DELAY_LATE: Color32 = Color32::from_rgba_premultiplied(200, 120, 30, 150);
pub const PREVIEW_OUTLINE: Color32 = Color32::from_rgb(255, 214, 102);
pub const CHIP_BG: Color32 = Color32::from_rgb(58, 62, 80);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const BAR_ROUNDING: f32 = 5.0;
pub const CHIP_RADIUS: f32 = 10.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

// ── Status colors ────────────────────────────────────────────────────────────

pub fn status_color(status: TaskStatus) -> Color32 {
    match status {
        TaskStatus::ToDo => Color32::from_rgb(110, 118, 140),
        TaskStatus::InProgress => Color32::from_rgb(66, 133, 244),
        TaskStatus::InReview => Color32::from_rgb(171, 71, 188),
        TaskStatus::Blocked => Color32::from_rgb(229, 57, 53),
        TaskStatus::Completed => Color32::from_rgb(52, 168, 83),
    }
}

pub fn priority_color(priority: Priority) -> Color32 {
    match priority {
        Priority::Low => Color32::from_rgb(100, 105, 120),
        Priority::Medium => Color32::from_rgb(255, 193, 7),
        Priority::High => Color32::from_rgb(251, 100, 0),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28);

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
