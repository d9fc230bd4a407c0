use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ThermotraceApp {
    pub state: AppState,
}

impl ThermotraceApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ThermotraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: legends ----
        egui::SidePanel::left("legend_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, &mut self.state);
        });

        // The hover collected this frame is drawn on the next one.
        if self.state.end_frame() {
            ctx.request_repaint();
        }
    }
}
