use eframe::egui::{self, RichText, Ui};
use egui_plot::{GridMark, Line, LineStyle, Plot, PlotBounds, PlotPoints, Points, VLine};

use crate::color;
use crate::state::{AppState, ZoomRequest};
use crate::view::{ChartId, Query, RenderState, format_tick, render_state};

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart list (central panel)
// ---------------------------------------------------------------------------

/// Render every loaded chart stacked vertically.
pub fn charts(ui: &mut Ui, state: &mut AppState) {
    if state.charts.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view recordings  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for id in 0..state.charts.len() {
                chart(ui, state, id);
                ui.add_space(12.0);
            }
        });
}

// ---------------------------------------------------------------------------
// One chart
// ---------------------------------------------------------------------------

fn chart(ui: &mut Ui, state: &mut AppState, id: ChartId) {
    let render = {
        let panel = &state.charts[id];
        render_state(&panel.ctx, id, state.query_for(id), &panel.filter)
    };
    let zoom = state.charts[id].zoom_request.take();
    let show_means = state.show_group_means;
    let panel = &state.charts[id];
    let ctx = &panel.ctx;
    let kind = ctx.dataset.kind;

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(panel.title());
        ui.label(RichText::new(kind.title()).weak());
        if let Some(group) = &panel.zoomed {
            ui.label(RichText::new(format!("zoomed to {group}")).italics());
        }
    });

    let minutes_per_day = ctx.minutes_per_day;
    let single_day = ctx.spans_single_day();
    let response = Plot::new(("chart", id))
        .height(CHART_HEIGHT)
        .x_axis_label(if single_day { "Time of Day" } else { "Day" })
        .y_axis_label(kind.axis_label())
        .x_axis_formatter(move |mark: GridMark, _range| {
            format_tick(mark.value, minutes_per_day, single_day)
        })
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            match zoom {
                Some(ZoomRequest::Fit(b)) => {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max(b.min, b.max));
                }
                Some(ZoomRequest::Reset) => plot_ui.set_auto_bounds(egui::Vec2b::new(true, true)),
                None => {}
            }

            let progress_mode = !render.progress.is_empty();
            let single_subjects = !ctx.dataset.is_partitioned_by_sex();

            for series in ctx.dataset.series.values() {
                if !panel.filter.contains(series.group()) {
                    continue;
                }
                let colors = ctx.colors.colors_for(series.group());
                let emphasized = render.emphasized.as_ref() == Some(series.group());
                let (line_color, width) = if progress_mode {
                    (color::PROGRESS_BASE, 2.0)
                } else if single_subjects && !emphasized {
                    (colors.line.gamma_multiply(0.35), 2.0)
                } else if emphasized {
                    (colors.line, 4.0)
                } else {
                    (colors.line, 1.5)
                };
                let points: PlotPoints = ctx.points(series.samples()).into();
                plot_ui.line(
                    Line::new(points)
                        .name(series.group().to_string())
                        .color(line_color)
                        .width(width),
                );
            }

            if show_means {
                for (sex, mean) in &ctx.means(&panel.filter) {
                    let points: PlotPoints = ctx.points(mean.samples()).into();
                    plot_ui.line(
                        Line::new(points)
                            .name(format!("{sex} mean"))
                            .color(color::sex_colors(*sex).marker)
                            .style(LineStyle::dashed_loose())
                            .width(2.5),
                    );
                }
            }

            paint_hover(plot_ui, &render);
        });

    // Pointer → query for the next frame.
    let plot_response = &response.response;
    if plot_response.hovered() {
        if let Some(pos) = plot_response.hover_pos() {
            let p = response.transform.value_from_position(pos);
            state.report_hover(Query {
                time: p.x * minutes_per_day,
                source: id,
                value: Some(p.y),
            });
        }
    }

    if let Some(tip) = &render.tooltip {
        response.response.clone().on_hover_ui_at_pointer(|ui: &mut Ui| {
            ui.strong(&tip.title);
            for line in &tip.lines {
                ui.label(RichText::new(&line.text).color(line.color));
            }
        });
    }
}

/// Cursor line, progress segments and located-point markers.
fn paint_hover(plot_ui: &mut egui_plot::PlotUi, render: &RenderState) {
    if let Some(x) = render.cursor {
        plot_ui.vline(
            VLine::new(x)
                .color(color::CURSOR)
                .style(LineStyle::Dashed { length: 5.0 })
                .width(1.0),
        );
    }
    for segment in &render.progress {
        let points: PlotPoints = segment.points.clone().into();
        plot_ui.line(Line::new(points).color(segment.color).width(2.0));
    }
    for marker in &render.markers {
        plot_ui.points(
            Points::new(vec![marker.position])
                .color(marker.color)
                .radius(4.0)
                .filled(true),
        );
    }
}
