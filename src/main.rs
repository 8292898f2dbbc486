mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::SteamMonitorApp;
use config::{AppConfig, CONFIG_ENV, SOURCE_ENV};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = match AppConfig::discover(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e}; using defaults");
            AppConfig::default()
        }
    }
    .with_source_overrides(std::env::var(SOURCE_ENV).ok(), std::env::args().nth(1));

    log::info!("Data source: {}", config.source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Steam Axia Operational Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SteamMonitorApp::new(config)))),
    )
}
