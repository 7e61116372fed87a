use egui::{Color32, Context, RichText, Window};

use crate::app::GanttApp;
use crate::ui::theme;
use gantt_timeline::model::{Priority, TaskStatus};

/// Render the per-task action menu opened by secondary click or the `r` key.
pub fn show_context_menu(app: &mut GanttApp, ctx: &Context) {
    let Some((id, pos)) = app.context_menu else {
        return;
    };
    let Some(task) = app.feed.task(id) else {
        app.context_menu = None;
        return;
    };
    let name = task.name.clone();
    let current = task.status;
    let has_children = app.engine.has_children(id);

    let mut close = false;
    let area = egui::Area::new(egui::Id::new("task-context-menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_min_width(180.0);
                ui.label(RichText::new(&name).strong());
                ui.separator();
                if ui.button("Open").clicked() {
                    app.engine.click_task(id);
                    close = true;
                }
                if ui.button("Edit…").clicked() {
                    app.engine.request_edit(id);
                    close = true;
                }
                if ui.button(format!("{}  Add Subtask", egui_phosphor::regular::PLUS)).clicked() {
                    app.engine.request_subtask(id);
                    close = true;
                }
                if ui
                    .add_enabled(has_children, egui::Button::new("Show Subtasks"))
                    .clicked()
                {
                    app.engine.show_subtasks(id);
                    close = true;
                }
                ui.menu_button("Set Status", |ui| {
                    for (digit, status) in TaskStatus::ALL.iter().enumerate() {
                        let label = format!("{}  {}", digit + 1, status.label());
                        if ui.radio(*status == current, label).clicked() {
                            app.engine.request_status(id, *status);
                            close = true;
                            ui.close_menu();
                        }
                    }
                });
                ui.separator();
                let delete = egui::Button::new(RichText::new("Delete").color(theme::TODAY_LINE));
                if ui.add(delete).clicked() {
                    app.engine.request_delete(id);
                    close = true;
                }
            });
        });

    if close || area.response.clicked_elsewhere() || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.context_menu = None;
    }
}

/// Render the "Edit Task" dialog.
pub fn show_edit_dialog(app: &mut GanttApp, ctx: &Context) {
    let Some(mut edit) = app.editing.take() else {
        return;
    };
    let mut save = false;
    let mut cancel = false;
    Window::new(RichText::new("Edit Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("edit_task_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut edit.name).hint_text("Task name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("edit_status")
                        .selected_text(edit.status.label())
                        .show_ui(ui, |ui| {
                            for status in TaskStatus::ALL {
                                ui.selectable_value(&mut edit.status, status, status.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Priority").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        for priority in [Priority::Low, Priority::Medium, Priority::High] {
                            ui.radio_value(&mut edit.priority, priority, format!("{:?}", priority));
                        }
                    });
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    save = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    cancel = true;
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        cancel = true;
    }
    if save {
        app.commit_edit(edit);
    } else if !cancel {
        app.editing = Some(edit);
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 220.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag bars to move, drag edges to resize.");
                ui.label("Hover a bar: e edit · c subtask · s drill in · 1-5 status");
                ui.label("Shift+S back out · +/- zoom");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
