use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Group – the key a series is partitioned by
// ---------------------------------------------------------------------------

/// Categorical key of a series: a sex partition (`male` / `female`) or an
/// individual subject id (`f1`, `m3`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Group(String);

impl Group {
    pub fn new(label: impl Into<String>) -> Self {
        Group(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sex of the group.
    ///
    /// Explicit `male` / `female` labels map directly; subject ids are male
    /// when they contain an `m` (`m1`, `m12`) and female otherwise.
    pub fn sex(&self) -> Sex {
        let label = self.as_str().trim().to_ascii_lowercase();
        match label.as_str() {
            "male" => Sex::Male,
            "female" => Sex::Female,
            other if other.contains('m') => Sex::Male,
            _ => Sex::Female,
        }
    }

    /// Whether the label names a whole sex rather than a single subject.
    pub fn is_sex_partition(&self) -> bool {
        matches!(
            self.as_str().trim().to_ascii_lowercase().as_str(),
            "male" | "female"
        )
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Group {
    fn from(s: &str) -> Self {
        Group::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Sample / Series
// ---------------------------------------------------------------------------

/// One measurement. `time` is in minutes since the start of the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
    pub group: Group,
}

impl Sample {
    pub fn new(time: f64, value: f64, group: impl Into<Group>) -> Self {
        Sample {
            time,
            value,
            group: group.into(),
        }
    }
}

/// Time-ordered samples of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    group: Group,
    samples: Vec<Sample>,
}

impl Series {
    /// Build a series, sorting by time. The sort is stable so samples with
    /// equal times keep their insertion order.
    pub fn new(group: Group, mut samples: Vec<Sample>) -> Self {
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
        Series { group, samples }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(first.time, last.time)`, or `None` for an empty series.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.samples.first()?.time, self.samples.last()?.time))
    }

    /// Min and max of the finite values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| s.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Samples up to and including `time`.
    pub fn prefix_through(&self, time: f64) -> &[Sample] {
        let end = self.samples.partition_point(|s| s.time <= time);
        &self.samples[..end]
    }
}

// ---------------------------------------------------------------------------
// Measurement kind – what the value column means
// ---------------------------------------------------------------------------

/// What a dataset's value column measures; drives labels and tooltip format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Distance of the body temperature from the group mean.
    Error,
    /// Running sum of the distance from the mean.
    CumulativeError,
    /// Raw body temperature per subject.
    Temperature,
}

impl MeasurementKind {
    pub fn title(self) -> &'static str {
        match self {
            MeasurementKind::Error => "Body Temperature Variability",
            MeasurementKind::CumulativeError => "Cumulative Variability",
            MeasurementKind::Temperature => "Body Temperature",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            MeasurementKind::Error => "Distance From Mean (°C)",
            MeasurementKind::CumulativeError => "Cumulative Distance From Mean (°C)",
            MeasurementKind::Temperature => "Temperature (°C)",
        }
    }

    /// Format a value for tooltips and readouts.
    pub fn format_value(self, value: f64) -> String {
        if !value.is_finite() {
            return "–".to_string();
        }
        match self {
            MeasurementKind::Error | MeasurementKind::Temperature => format!("{value:.2}°C"),
            MeasurementKind::CumulativeError => format!("{:.1}k°C", value / 1000.0),
        }
    }

    /// Cumulative charts show their progress up to the cursor.
    pub fn highlights_progress(self) -> bool {
        matches!(self, MeasurementKind::CumulativeError)
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded file
// ---------------------------------------------------------------------------

/// A loaded file: every group's series plus what the values mean.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub kind: MeasurementKind,
    pub series: BTreeMap<Group, Series>,
}

impl Dataset {
    /// Partition samples into one series per group.
    pub fn from_samples(name: impl Into<String>, kind: MeasurementKind, samples: Vec<Sample>) -> Self {
        let mut by_group: BTreeMap<Group, Vec<Sample>> = BTreeMap::new();
        for s in samples {
            by_group.entry(s.group.clone()).or_default().push(s);
        }
        let series = by_group
            .into_iter()
            .map(|(g, samples)| (g.clone(), Series::new(g, samples)))
            .collect();
        Dataset {
            name: name.into(),
            kind,
            series,
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.series.keys()
    }

    /// Total number of samples over all series.
    pub fn len(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Series::is_empty)
    }

    /// Largest sample time over all series.
    pub fn max_time(&self) -> Option<f64> {
        self.series
            .values()
            .filter_map(|s| s.time_range().map(|(_, hi)| hi))
            .reduce(f64::max)
    }

    /// Whether all series are keyed by sex rather than by subject.
    pub fn is_partitioned_by_sex(&self) -> bool {
        self.series.keys().all(Group::is_sex_partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_sort_is_stable_for_equal_times() {
        let s = Series::new(
            Group::from("male"),
            vec![
                Sample::new(10.0, 1.0, "male"),
                Sample::new(0.0, 2.0, "male"),
                Sample::new(10.0, 3.0, "male"),
            ],
        );
        let values: Vec<f64> = s.samples().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn subject_ids_map_to_sex() {
        assert_eq!(Group::from("m3").sex(), Sex::Male);
        assert_eq!(Group::from("f12").sex(), Sex::Female);
        assert_eq!(Group::from("female").sex(), Sex::Female);
        assert_eq!(Group::from("Male").sex(), Sex::Male);
        assert!(Group::from("female").is_sex_partition());
        assert!(!Group::from("f1").is_sex_partition());
    }

    #[test]
    fn prefix_through_includes_equal_times() {
        let s = Series::new(
            Group::from("f1"),
            vec![
                Sample::new(0.0, 1.0, "f1"),
                Sample::new(5.0, 1.0, "f1"),
                Sample::new(10.0, 1.0, "f1"),
            ],
        );
        assert_eq!(s.prefix_through(5.0).len(), 2);
        assert_eq!(s.prefix_through(-1.0).len(), 0);
        assert_eq!(s.prefix_through(100.0).len(), 3);
    }

    #[test]
    fn dataset_partitions_by_group() {
        let ds = Dataset::from_samples(
            "err",
            MeasurementKind::Error,
            vec![
                Sample::new(0.0, 0.1, "male"),
                Sample::new(0.0, 0.2, "female"),
                Sample::new(10.0, 0.3, "male"),
            ],
        );
        assert_eq!(ds.series.len(), 2);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.max_time(), Some(10.0));
        assert!(ds.is_partitioned_by_sex());
        assert_eq!(ds.series[&Group::from("male")].len(), 2);
    }

    #[test]
    fn value_range_skips_nan() {
        let s = Series::new(
            Group::from("male"),
            vec![
                Sample::new(0.0, f64::NAN, "male"),
                Sample::new(1.0, 2.0, "male"),
                Sample::new(2.0, -1.0, "male"),
            ],
        );
        assert_eq!(s.value_range(), Some((-1.0, 2.0)));
    }

    #[test]
    fn cumulative_values_format_in_thousands() {
        assert_eq!(MeasurementKind::CumulativeError.format_value(12345.0), "12.3k°C");
        assert_eq!(MeasurementKind::Error.format_value(0.456), "0.46°C");
        assert_eq!(MeasurementKind::Temperature.format_value(f64::NAN), "–");
    }
}
