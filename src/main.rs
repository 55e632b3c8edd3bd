//! Noodle Atlas - linked interactive views over instant-noodle consumption,
//! ratings and national happiness data.

mod charts;
mod data;
mod events;
mod geo;
mod gui;
mod stats;

use data::Sources;
use eframe::egui;
use gui::NoodleAtlasApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Noodle Atlas"),
        ..Default::default()
    };

    eframe::run_native(
        "Noodle Atlas",
        options,
        Box::new(|cc| Ok(Box::new(NoodleAtlasApp::new(cc, Sources::default())))),
    )
}
