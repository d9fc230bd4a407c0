//! Pure hover/highlight state for one chart.
//!
//! Every frame the UI turns the pointer into a [`Query`] and asks
//! [`render_state`] what to draw for each chart; nothing here touches egui
//! painting.

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::data::aggregate::group_means;
use crate::data::filter::{FilterState, visible_series};
use crate::data::locate::locate;
use crate::data::model::{Dataset, Group, Sample, Series, Sex};
use crate::data::sync::sync;

/// Index of a chart in the app's chart list.
pub type ChartId = usize;

/// Pointer-driven lookup shared by synchronized charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    /// Query time in minutes.
    pub time: f64,
    /// Chart the pointer is over; only that chart shows a tooltip.
    pub source: ChartId,
    /// Pointer y in the source chart's value units.
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Chart context
// ---------------------------------------------------------------------------

/// Everything a chart needs to answer queries: its data, colours and axis
/// convention. Built once per loaded dataset.
#[derive(Debug, Clone)]
pub struct ChartContext {
    pub dataset: Dataset,
    pub colors: ColorMap,
    pub minutes_per_day: f64,
}

impl ChartContext {
    pub fn new(dataset: Dataset, minutes_per_day: f64) -> Self {
        let colors = ColorMap::new(dataset.groups());
        ChartContext {
            dataset,
            colors,
            minutes_per_day,
        }
    }

    /// Per-sex mean lines over the subjects the legend shows. Empty for
    /// datasets already partitioned by sex.
    pub fn means(&self, filter: &FilterState) -> Vec<(Sex, Series)> {
        if self.dataset.is_partitioned_by_sex() {
            return Vec::new();
        }
        group_means(visible_series(&self.dataset, filter))
    }

    pub fn to_days(&self, minutes: f64) -> f64 {
        minutes / self.minutes_per_day
    }

    /// `Day N`, 1-based.
    pub fn day_label(&self, minutes: f64) -> String {
        format!("Day {}", (minutes / self.minutes_per_day).floor() as i64 + 1)
    }

    /// Whether the whole recording fits in one day; such charts label the
    /// x axis with clock times instead of day numbers.
    pub fn spans_single_day(&self) -> bool {
        self.dataset
            .max_time()
            .is_some_and(|t| t < self.minutes_per_day)
    }

    /// Plot points in (days, value), skipping missing values.
    pub fn points(&self, samples: &[Sample]) -> Vec<[f64; 2]> {
        samples
            .iter()
            .filter(|s| s.value.is_finite())
            .map(|s| [self.to_days(s.time), s.value])
            .collect()
    }
}

/// Clock time on single-day charts, else `Day N` on whole-day marks and
/// nothing in between.
pub fn format_tick(days: f64, minutes_per_day: f64, single_day: bool) -> String {
    if single_day {
        return clock_label(days * minutes_per_day, minutes_per_day);
    }
    if (days - days.round()).abs() < 1e-9 {
        format!("Day {}", days.round() as i64 + 1)
    } else {
        String::new()
    }
}

/// 12-hour clock time of a minute offset within a day, e.g. `07:05 PM`.
pub fn clock_label(minutes: f64, minutes_per_day: f64) -> String {
    let m = minutes.rem_euclid(minutes_per_day).round() as i64;
    let (h, min) = ((m / 60) % 24, m % 60);
    let h12 = if h % 12 == 0 { 12 } else { h % 12 };
    let suffix = if h < 12 { "AM" } else { "PM" };
    format!("{h12:02}:{min:02} {suffix}")
}

// ---------------------------------------------------------------------------
// Render state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub group: Group,
    /// Position in plot coordinates (days, value).
    pub position: [f64; 2],
    pub color: Color32,
}

/// Part of a series up to its located sample, drawn in colour over the grey
/// base line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSegment {
    pub group: Group,
    pub points: Vec<[f64; 2]>,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    pub text: String,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<TooltipLine>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    /// x of the dashed cursor line, in days.
    pub cursor: Option<f64>,
    pub markers: Vec<Marker>,
    pub progress: Vec<ProgressSegment>,
    pub tooltip: Option<Tooltip>,
    /// Trace nearest the pointer on a per-subject chart.
    pub emphasized: Option<Group>,
}

/// What chart `id` should draw for the current query.
///
/// Located samples with a missing value get no marker; the progress segment
/// is still drawn up to them.
pub fn render_state(
    ctx: &ChartContext,
    id: ChartId,
    query: Option<&Query>,
    filter: &FilterState,
) -> RenderState {
    let Some(query) = query else {
        return RenderState::default();
    };
    let visible = visible_series(&ctx.dataset, filter);
    let hits = sync(visible.iter().copied(), query.time);

    let mut ordered: Vec<(&Group, &Sample)> = hits.iter().map(|(g, s)| (g, *s)).collect();
    ordered.sort_by(|a, b| (a.0.sex(), a.0).cmp(&(b.0.sex(), b.0)));

    let markers = ordered
        .iter()
        .filter(|(_, s)| s.value.is_finite())
        .map(|(g, s)| Marker {
            group: (*g).clone(),
            position: [ctx.to_days(s.time), s.value],
            color: ctx.colors.colors_for(g).marker,
        })
        .collect();

    let progress = if ctx.dataset.kind.highlights_progress() {
        visible
            .iter()
            .filter_map(|series| {
                let located = hits.get(series.group())?;
                Some(ProgressSegment {
                    group: series.group().clone(),
                    points: ctx.points(series.prefix_through(located.time)),
                    color: ctx.colors.colors_for(series.group()).line,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let is_source = query.source == id;
    let emphasized = if is_source && !ctx.dataset.is_partitioned_by_sex() {
        query.value.and_then(|y| nearest_trace(&ordered, y))
    } else {
        None
    };
    let tooltip = if is_source && !ordered.is_empty() {
        Some(tooltip(ctx, query, &ordered, emphasized.as_ref()))
    } else {
        None
    };

    RenderState {
        cursor: Some(ctx.to_days(query.time)),
        markers,
        progress,
        tooltip,
        emphasized,
    }
}

/// Group whose located value is vertically closest to `y`.
fn nearest_trace(hits: &[(&Group, &Sample)], y: f64) -> Option<Group> {
    hits.iter()
        .filter(|(_, s)| s.value.is_finite())
        .min_by(|a, b| (a.1.value - y).abs().total_cmp(&(b.1.value - y).abs()))
        .map(|(g, _)| (*g).clone())
}

fn tooltip(
    ctx: &ChartContext,
    query: &Query,
    hits: &[(&Group, &Sample)],
    emphasized: Option<&Group>,
) -> Tooltip {
    let kind = ctx.dataset.kind;

    if let Some(group) = emphasized {
        if let Some((_, sample)) = hits.iter().find(|(g, _)| *g == group) {
            return Tooltip {
                title: format!("Mouse: {group}, Gender: {}", group.sex()),
                lines: vec![TooltipLine {
                    text: format!(
                        "{}: {}",
                        ctx.day_label(sample.time),
                        kind.format_value(sample.value)
                    ),
                    color: ctx.colors.colors_for(group).marker,
                }],
            };
        }
    }

    let title = if ctx.dataset.is_partitioned_by_sex() {
        format!("{}:", kind.title())
    } else {
        ctx.day_label(query.time)
    };
    let lines = hits
        .iter()
        .map(|(g, s)| {
            let label = if g.is_sex_partition() {
                g.sex().to_string()
            } else {
                g.to_string()
            };
            TooltipLine {
                text: format!("{label}: {}", kind.format_value(s.value)),
                color: ctx.colors.colors_for(g).marker,
            }
        })
        .collect();
    Tooltip { title, lines }
}

// ---------------------------------------------------------------------------
// Zoom-to-series
// ---------------------------------------------------------------------------

/// Plot-space rectangle in (days, value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

/// Bounds framing one series with `padding` (fraction of the extent) on each
/// side. `None` for an empty series or one without finite values.
pub fn zoom_bounds(ctx: &ChartContext, series: &Series, padding: f64) -> Option<ZoomBounds> {
    let (t0, t1) = series.time_range()?;
    let (v0, v1) = series.value_range()?;
    let (x0, x1) = pad(ctx.to_days(t0), ctx.to_days(t1), padding);
    let (y0, y1) = pad(v0, v1, padding);
    Some(ZoomBounds {
        min: [x0, y0],
        max: [x1, y1],
    })
}

fn pad(lo: f64, hi: f64, padding: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * padding, hi + span * padding)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

/// Located sample of `group` for the readout table.
pub fn readout<'a>(ctx: &'a ChartContext, group: &Group, time: f64) -> Option<&'a Sample> {
    locate(ctx.dataset.series.get(group)?, time).ok()
}
