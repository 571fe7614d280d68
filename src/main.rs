#![warn(clippy::all, rust_2018_idioms)]

use paint_board::{BoardConfig, PaintApp};

/// Path of an optional JSON file overriding the board defaults
const CONFIG_ENV: &str = "PAINT_BOARD_CONFIG";

fn load_config() -> BoardConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return BoardConfig::default();
    };
    match BoardConfig::load(&path) {
        Ok(config) => {
            log::info!("loaded board config from {path}");
            config
        }
        Err(err) => {
            log::warn!("ignoring board config {path}: {err}");
            BoardConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let config = load_config();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Paint board"),
        ..Default::default()
    };
    eframe::run_native(
        "paint_board",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, config)))),
    )
}
