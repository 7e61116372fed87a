//! Zoomable, draggable Gantt timeline.
//!
//! The [`engine`] is headless: it maps dates to pixels, tracks drag gestures,
//! optimistic overrides, drill-down focus and filters, and produces a layout
//! for a host to paint. The binary in this crate hosts it with egui.

pub mod config;
pub mod engine;
pub mod io;
pub mod logging;
pub mod model;

pub use config::{AppSettings, ConfigError, EngineConfig};
pub use engine::{EngineEvent, TaskLayout, TimelineEngine, TimelineLayout};
