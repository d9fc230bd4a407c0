mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use app::ThermotraceApp;
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::discover();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Thermotrace – Temperature Viewer",
        options,
        Box::new(move |_cc| {
            let mut state = AppState::with_config(config);
            state.load_configured();
            Ok(Box::new(ThermotraceApp::new(state)))
        }),
    )
}
