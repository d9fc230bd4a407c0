use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::loader::LoadOptions;
use crate::data::model::Group;
use crate::state::AppState;
use crate::view::{ChartId, readout};

// ---------------------------------------------------------------------------
// Left side panel – legends, zoom and readout
// ---------------------------------------------------------------------------

/// Render the left legend panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Legend");
    ui.separator();

    if state.charts.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for id in 0..state.charts.len() {
                chart_legend(ui, state, id);
            }
        });
}

fn chart_legend(ui: &mut Ui, state: &mut AppState, id: ChartId) {
    let panel = &state.charts[id];
    let entries = panel.ctx.colors.legend_entries();
    let n_selected = panel.filter.len();
    let n_total = entries.len();
    let header_text = format!("{}  ({n_selected}/{n_total})", panel.title());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(("legend", id))
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(id);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(id);
                }
            });

            for (group, color) in &entries {
                let mut checked = state.charts[id].filter.contains(group);
                let label = legend_label(group);
                if ui
                    .checkbox(&mut checked, RichText::new(label).color(*color))
                    .changed()
                {
                    state.toggle_group(id, group);
                }
            }

            zoom_selector(ui, state, id, &entries);
            ui.push_id(("readout", id), |ui: &mut Ui| readout_table(ui, state, id));
        });
}

fn legend_label(group: &Group) -> String {
    if group.is_sex_partition() {
        group.sex().to_string()
    } else {
        format!("{group} ({})", group.sex())
    }
}

/// "Zoom to" selector plus a reset button.
fn zoom_selector(ui: &mut Ui, state: &mut AppState, id: ChartId, entries: &[(Group, Color32)]) {
    let current = state.charts[id]
        .zoomed
        .as_ref()
        .map(Group::to_string)
        .unwrap_or_else(|| "all".to_string());

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Zoom to");
        egui::ComboBox::from_id_salt(("zoom", id))
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for (group, _) in entries {
                    let selected = state.charts[id].zoomed.as_ref() == Some(group);
                    if ui.selectable_label(selected, group.to_string()).clicked() {
                        state.zoom_to(id, group);
                    }
                }
            });
        if ui.small_button("Reset").clicked() {
            state.reset_zoom(id);
        }
    });
}

/// Located values of every visible group at the current query time.
fn readout_table(ui: &mut Ui, state: &AppState, id: ChartId) {
    let Some(query) = state.query_for(id) else {
        return;
    };
    let panel = &state.charts[id];
    let ctx = &panel.ctx;
    let kind = ctx.dataset.kind;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Group");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Time");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for group in ctx.dataset.groups().filter(|g| panel.filter.contains(*g)) {
                let Some(sample) = readout(ctx, group, query.time) else {
                    continue;
                };
                body.row(16.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(group.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(ctx.day_label(sample.time));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(kind.format_value(sample.value));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.menu_button("Close chart", |ui: &mut Ui| {
                let mut remove = None;
                for (id, panel) in state.charts.iter().enumerate() {
                    if ui.button(panel.title()).clicked() {
                        remove = Some(id);
                    }
                }
                if let Some(id) = remove {
                    state.remove_chart(id);
                    ui.close_menu();
                }
            });
        });

        ui.separator();

        if !state.charts.is_empty() {
            ui.label(format!(
                "{} charts, {} samples",
                state.charts.len(),
                state.total_samples()
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.show_group_means, "Group means")
            .clicked()
        {
            state.show_group_means = !state.show_group_means;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open temperature recordings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already logged and shown in the status message.
        let _ = state.open(&path, &LoadOptions::default(), true);
    }
}
