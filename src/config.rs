use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::loader::LoadOptions;
use crate::data::model::MeasurementKind;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "THERMOTRACE_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const CONFIG_FILE: &str = "thermotrace.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A file opened at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub kind: Option<MeasurementKind>,
    #[serde(default)]
    pub time_column: Option<String>,
    #[serde(default)]
    pub value_column: Option<String>,
    #[serde(default)]
    pub group_column: Option<String>,
    /// Whether the chart shares the pointer query with other synchronized charts.
    #[serde(default = "default_true")]
    pub synchronized: bool,
}

impl DatasetEntry {
    pub fn new(path: impl Into<PathBuf>, kind: MeasurementKind, synchronized: bool) -> Self {
        DatasetEntry {
            path: path.into(),
            kind: Some(kind),
            time_column: None,
            value_column: None,
            group_column: None,
            synchronized,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            kind: self.kind,
            time_column: self.time_column.clone(),
            value_column: self.value_column.clone(),
            group_column: self.group_column.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub datasets: Vec<DatasetEntry>,
    pub minutes_per_day: f64,
    /// Fraction of the series extent added on each side when zooming to it.
    pub zoom_padding: f64,
    pub show_group_means: bool,
    pub window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            datasets: vec![
                DatasetEntry::new("data/export_error.csv", MeasurementKind::Error, true),
                DatasetEntry::new("data/cum_err.csv", MeasurementKind::CumulativeError, true),
                DatasetEntry::new("data/allfirstday.csv", MeasurementKind::Temperature, false),
            ],
            minutes_per_day: 1440.0,
            zoom_padding: 0.05,
            show_group_means: true,
            window_size: [1200.0, 800.0],
        }
    }
}

impl ViewerConfig {
    /// Read and validate a config file. Relative dataset paths resolve
    /// against the config file's directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ViewerConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        if let Some(base) = path.parent() {
            for entry in &mut config.datasets {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.minutes_per_day.is_finite() && self.minutes_per_day > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "minutes_per_day must be positive, got {}",
                self.minutes_per_day
            )));
        }
        if !(0.0..1.0).contains(&self.zoom_padding) {
            return Err(ConfigError::Invalid(format!(
                "zoom_padding must be in [0, 1), got {}",
                self.zoom_padding
            )));
        }
        Ok(())
    }

    /// Config from `$THERMOTRACE_CONFIG`, else `./thermotrace.json`, else
    /// defaults. A broken file is logged and ignored.
    pub fn discover() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }
}
