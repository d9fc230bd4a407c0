use std::path::Path;

use crate::config::{DatasetEntry, ViewerConfig};
use crate::data::filter::{FilterState, init_filter_state, toggle};
use crate::data::loader::{LoadOptions, load_file};
use crate::data::model::{Dataset, Group};
use crate::view::{ChartContext, ChartId, Query, ZoomBounds, zoom_bounds};

// ---------------------------------------------------------------------------
// Per-chart state
// ---------------------------------------------------------------------------

/// Pending change to a chart's plot bounds, applied on the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomRequest {
    Fit(ZoomBounds),
    Reset,
}

pub struct ChartPanel {
    pub ctx: ChartContext,
    /// Legend selection.
    pub filter: FilterState,
    /// Whether this chart shares the pointer query with other synchronized charts.
    pub synchronized: bool,
    /// Group the chart is zoomed to, if any.
    pub zoomed: Option<Group>,
    pub zoom_request: Option<ZoomRequest>,
}

impl ChartPanel {
    pub fn new(ctx: ChartContext, synchronized: bool) -> Self {
        let filter = init_filter_state(&ctx.dataset);
        ChartPanel {
            ctx,
            filter,
            synchronized,
            zoomed: None,
            zoom_request: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.ctx.dataset.name
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// One panel per loaded dataset, in load order.
    pub charts: Vec<ChartPanel>,

    /// Query drawn this frame (from the pointer position of the last frame).
    pub hover: Option<Query>,

    /// Query collected while drawing this frame.
    next_hover: Option<Query>,

    pub show_group_means: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Empty state carrying `config`; nothing is loaded yet.
    pub fn with_config(config: ViewerConfig) -> Self {
        Self {
            show_group_means: config.show_group_means,
            config,
            charts: Vec::new(),
            hover: None,
            next_hover: None,
            status_message: None,
        }
    }

    /// Load every dataset the config lists. Failures are collected into the
    /// status message; the rest still load.
    pub fn load_configured(&mut self) {
        let entries: Vec<DatasetEntry> = self.config.datasets.clone();
        let mut failures = Vec::new();
        for entry in &entries {
            if let Err(e) = self.open(&entry.path, &entry.load_options(), entry.synchronized) {
                failures.push(e);
            }
        }
        if !failures.is_empty() {
            self.status_message = Some(failures.join(" | "));
        }
    }

    /// Load one file and add it as a chart. Returns the displayed error text
    /// on failure.
    pub fn open(&mut self, path: &Path, opts: &LoadOptions, synchronized: bool) -> Result<(), String> {
        match load_file(path, opts) {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("{}: no samples", path.display());
                }
                log::info!(
                    "Loaded {} samples in {} series from {}",
                    dataset.len(),
                    dataset.series.len(),
                    path.display()
                );
                self.add_dataset(dataset, synchronized);
                self.status_message = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                let msg = format!("Error: {e:#}");
                self.status_message = Some(msg.clone());
                Err(msg)
            }
        }
    }

    /// Ingest a loaded dataset as a new chart.
    pub fn add_dataset(&mut self, dataset: Dataset, synchronized: bool) -> ChartId {
        let ctx = ChartContext::new(dataset, self.config.minutes_per_day);
        self.charts.push(ChartPanel::new(ctx, synchronized));
        self.hover = None;
        self.charts.len() - 1
    }

    pub fn remove_chart(&mut self, id: ChartId) {
        if id < self.charts.len() {
            self.charts.remove(id);
            self.hover = None;
            self.next_hover = None;
        }
    }

    // -- hover ---------------------------------------------------------------

    /// Query chart `id` should answer: its own hover, or the hover of any
    /// chart it is synchronized with.
    pub fn query_for(&self, id: ChartId) -> Option<&Query> {
        let q = self.hover.as_ref()?;
        if q.source == id {
            return Some(q);
        }
        let here = self.charts.get(id)?;
        let there = self.charts.get(q.source)?;
        (here.synchronized && there.synchronized).then_some(q)
    }

    /// Record the pointer query of the chart being drawn.
    pub fn report_hover(&mut self, query: Query) {
        self.next_hover = Some(query);
    }

    /// Promote the query collected this frame. Returns whether it changed,
    /// in which case another frame is needed to draw it.
    pub fn end_frame(&mut self) -> bool {
        let next = self.next_hover.take();
        let changed = next != self.hover;
        self.hover = next;
        changed
    }

    // -- legend filters ------------------------------------------------------

    /// Toggle a group in one chart's legend. Sex groups toggle together on
    /// every synchronized chart so linked charts stay comparable.
    pub fn toggle_group(&mut self, id: ChartId, group: &Group) {
        let Some(chart) = self.charts.get_mut(id) else {
            return;
        };
        let selected = toggle(&mut chart.filter, group);
        log::debug!("{}: {group} {}", chart.title(), if selected { "shown" } else { "hidden" });

        if !(chart.synchronized && group.is_sex_partition()) {
            return;
        }
        for (other_id, other) in self.charts.iter_mut().enumerate() {
            if other_id == id || !other.synchronized || !other.ctx.dataset.series.contains_key(group) {
                continue;
            }
            if selected {
                other.filter.insert(group.clone());
            } else {
                other.filter.remove(group);
            }
        }
    }

    /// Select all groups in a chart.
    pub fn select_all(&mut self, id: ChartId) {
        if let Some(chart) = self.charts.get_mut(id) {
            chart.filter = init_filter_state(&chart.ctx.dataset);
        }
    }

    /// Deselect all groups in a chart.
    pub fn select_none(&mut self, id: ChartId) {
        if let Some(chart) = self.charts.get_mut(id) {
            chart.filter.clear();
        }
    }

    // -- zoom ----------------------------------------------------------------

    /// Frame one series of a chart.
    pub fn zoom_to(&mut self, id: ChartId, group: &Group) {
        let padding = self.config.zoom_padding;
        let Some(chart) = self.charts.get_mut(id) else {
            return;
        };
        let Some(series) = chart.ctx.dataset.series.get(group) else {
            return;
        };
        match zoom_bounds(&chart.ctx, series, padding) {
            Some(bounds) => {
                log::debug!("{}: zoom to {group}", chart.title());
                chart.zoomed = Some(group.clone());
                chart.zoom_request = Some(ZoomRequest::Fit(bounds));
            }
            None => log::debug!("{}: {group} has nothing to zoom to", chart.title()),
        }
    }

    /// Back to automatic bounds.
    pub fn reset_zoom(&mut self, id: ChartId) {
        if let Some(chart) = self.charts.get_mut(id) {
            chart.zoomed = None;
            chart.zoom_request = Some(ZoomRequest::Reset);
        }
    }

    /// Total samples across all charts, for the top bar.
    pub fn total_samples(&self) -> usize {
        self.charts.iter().map(|c| c.ctx.dataset.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MeasurementKind, Sample};

    fn sexes(name: &str, kind: MeasurementKind) -> Dataset {
        Dataset::from_samples(
            name,
            kind,
            vec![
                Sample::new(0.0, 1.0, "male"),
                Sample::new(10.0, 2.0, "male"),
                Sample::new(0.0, 3.0, "female"),
            ],
        )
    }

    fn state() -> AppState {
        let mut st = AppState::with_config(ViewerConfig {
            datasets: Vec::new(),
            ..ViewerConfig::default()
        });
        st.add_dataset(sexes("error", MeasurementKind::Error), true);
        st.add_dataset(sexes("cum", MeasurementKind::CumulativeError), true);
        st.add_dataset(
            Dataset::from_samples(
                "subjects",
                MeasurementKind::Temperature,
                vec![Sample::new(0.0, 36.0, "f1")],
            ),
            false,
        );
        st
    }

    fn hover(source: ChartId) -> Query {
        Query {
            time: 5.0,
            source,
            value: None,
        }
    }

    #[test]
    fn synchronized_charts_share_the_query() {
        let mut st = state();
        st.report_hover(hover(0));
        assert!(st.end_frame());

        assert!(st.query_for(0).is_some());
        assert!(st.query_for(1).is_some());
        assert!(st.query_for(2).is_none());
    }

    #[test]
    fn standalone_chart_keeps_its_query_to_itself() {
        let mut st = state();
        st.report_hover(hover(2));
        st.end_frame();
        assert!(st.query_for(2).is_some());
        assert!(st.query_for(0).is_none());
    }

    #[test]
    fn leaving_all_charts_clears_the_query() {
        let mut st = state();
        st.report_hover(hover(0));
        st.end_frame();
        assert!(st.end_frame());
        assert!(st.hover.is_none());
        assert!(!st.end_frame());
    }

    #[test]
    fn sex_toggle_propagates_to_synchronized_charts() {
        let mut st = state();
        let male = Group::from("male");
        st.toggle_group(0, &male);
        assert!(!st.charts[0].filter.contains(&male));
        assert!(!st.charts[1].filter.contains(&male));

        st.toggle_group(1, &male);
        assert!(st.charts[0].filter.contains(&male));
        assert!(st.charts[1].filter.contains(&male));
    }

    #[test]
    fn select_none_then_all() {
        let mut st = state();
        st.select_none(0);
        assert!(st.charts[0].filter.is_empty());
        st.select_all(0);
        assert_eq!(st.charts[0].filter.len(), 2);
    }

    #[test]
    fn zoom_and_reset() {
        let mut st = state();
        let male = Group::from("male");
        st.zoom_to(0, &male);
        assert_eq!(st.charts[0].zoomed, Some(male));
        assert!(matches!(st.charts[0].zoom_request, Some(ZoomRequest::Fit(_))));

        st.reset_zoom(0);
        assert_eq!(st.charts[0].zoomed, None);
        assert_eq!(st.charts[0].zoom_request, Some(ZoomRequest::Reset));
    }

    #[test]
    fn failed_load_sets_status_and_keeps_charts() {
        let mut st = state();
        let dir = tempfile::tempdir().unwrap();
        let err = st
            .open(&dir.path().join("absent.csv"), &LoadOptions::default(), true)
            .unwrap_err();
        assert!(err.starts_with("Error:"));
        assert_eq!(st.charts.len(), 3);
        assert!(st.status_message.is_some());
    }

    #[test]
    fn configured_datasets_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("export_error.csv");
        std::fs::write(&good, "time,error,gender\n0,0.1,male\n").unwrap();

        let mut st = AppState::with_config(ViewerConfig {
            datasets: vec![
                DatasetEntry::new(&good, MeasurementKind::Error, true),
                DatasetEntry::new(dir.path().join("missing.csv"), MeasurementKind::Error, true),
            ],
            ..ViewerConfig::default()
        });
        st.load_configured();
        assert_eq!(st.charts.len(), 1);
        assert_eq!(st.total_samples(), 1);
        assert!(st.status_message.is_some());
    }
}
