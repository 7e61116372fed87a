#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use gantt_timeline::logging::init_logging;
use gantt_timeline::AppSettings;

fn main() -> eframe::Result<()> {
    let settings = match AppSettings::default_path().and_then(|path| AppSettings::load(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("using default settings: {e}");
            AppSettings::default()
        }
    };
    init_logging(&settings.log_level);
    tracing::info!(zoom = ?settings.engine.initial_zoom, "starting gantt timeline");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::GanttApp::new(cc, settings)))),
    )
}
