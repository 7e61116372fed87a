use std::time::Instant;

use chrono::Local;
use egui::{menu, RichText, Ui};

use crate::app::GanttApp;
use crate::ui::theme;
use gantt_timeline::engine::filter::FocusFilters;
use gantt_timeline::model::ZoomLevel;

/// Render the top menu bar, the navigation row and the breadcrumb trail.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    let clock = Instant::now();

    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Feed").clicked() {
                app.new_feed();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_feed();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_feed();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_feed_as();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        +").clicked() {
                app.engine.zoom_in(clock);
                ui.close_menu();
            }
            if ui.button("  Zoom Out      -").clicked() {
                app.engine.zoom_out(clock);
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for level in ZoomLevel::ALL {
                if ui.radio(app.engine.zoom() == level, level.label()).clicked() {
                    app.engine.set_zoom(level, clock);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned feed name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.feed.name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });

    ui.horizontal(|ui| {
        if ui.button("Today").clicked() {
            app.engine.go_today(Local::now().date_naive());
        }
        if ui.button(egui_phosphor::regular::CARET_LEFT).on_hover_text("Earlier").clicked() {
            app.engine.scroll_prev();
        }
        if ui.button(egui_phosphor::regular::CARET_RIGHT).on_hover_text("Later").clicked() {
            app.engine.scroll_next();
        }
        ui.separator();

        if ui.button(egui_phosphor::regular::MAGNIFYING_GLASS_MINUS).clicked() {
            app.engine.zoom_out(clock);
        }
        ui.label(RichText::new(app.engine.zoom().label()).strong());
        if ui.button(egui_phosphor::regular::MAGNIFYING_GLASS_PLUS).clicked() {
            app.engine.zoom_in(clock);
        }
        ui.separator();

        let mut filters = app.engine.filters();
        ui.label(RichText::new("Focus").color(theme::TEXT_SECONDARY));
        ui.toggle_value(&mut filters.overdue, "Overdue");
        ui.toggle_value(&mut filters.todo, "To Do");
        ui.toggle_value(&mut filters.in_progress, "In Progress");
        ui.toggle_value(&mut filters.in_review, "In Review");
        ui.toggle_value(&mut filters.blocked, "Blocked");
        ui.checkbox(&mut filters.show_completed, "Show completed");
        ui.separator();
        if ui.button("Executive").on_hover_text("Focus on overdue work").clicked() {
            filters = filters.executive();
        }
        if ui.button("Reset").clicked() {
            filters = FocusFilters::reset();
        }
        if filters != app.engine.filters() {
            tracing::debug!(?filters, "filters changed");
            app.engine.set_filters(filters);
        }
    });

    show_breadcrumbs(app, ui);
}

fn show_breadcrumbs(app: &mut GanttApp, ui: &mut Ui) {
    let entries = app.engine.focus_stack().entries().to_vec();
    if entries.is_empty() {
        return;
    }
    ui.horizontal(|ui| {
        if ui.link("All tasks").clicked() {
            app.engine.focus_root();
        }
        let last = entries.len() - 1;
        for (i, entry) in entries.iter().enumerate() {
            ui.label(RichText::new(egui_phosphor::regular::CARET_RIGHT).color(theme::TEXT_DIM));
            if i == last {
                ui.label(RichText::new(&entry.name).strong());
            } else if ui.link(&entry.name).clicked() {
                app.engine.pop_focus_to(i);
            }
        }
    });
}
