use std::collections::BTreeMap;

use super::locate::locate;
use super::model::{Group, Sample, Series};

/// Resolve the sample nearest to `query` in every series.
///
/// Each series is located independently, so series covering different time
/// ranges are each clamped on their own. Empty series are left out of the
/// result; if two series share a group, the later one wins.
pub fn sync<'a, I>(series_list: I, query: f64) -> BTreeMap<Group, &'a Sample>
where
    I: IntoIterator<Item = &'a Series>,
{
    series_list
        .into_iter()
        .filter_map(|series| {
            locate(series, query)
                .ok()
                .map(|sample| (series.group().clone(), sample))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(group: &str, points: &[(f64, f64)]) -> Series {
        Series::new(
            Group::from(group),
            points
                .iter()
                .map(|&(t, v)| Sample::new(t, v, group))
                .collect(),
        )
    }

    #[test]
    fn one_entry_per_series_each_clamped() {
        let early = series("male", &[(0.0, 1.0), (10.0, 2.0)]);
        let late = series("female", &[(100.0, 3.0), (110.0, 4.0)]);

        let hits = sync([&early, &late], 50.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[&Group::from("male")].time, 10.0);
        assert_eq!(hits[&Group::from("female")].time, 100.0);
    }

    #[test]
    fn empty_series_are_omitted() {
        let full = series("male", &[(0.0, 1.0)]);
        let empty = series("female", &[]);

        let hits = sync([&full, &empty], 0.0);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains_key(&Group::from("male")));
    }

    #[test]
    fn nan_query_yields_nothing() {
        let full = series("male", &[(0.0, 1.0)]);
        assert!(sync([&full], f64::NAN).is_empty());
    }

    #[test]
    fn accepts_dataset_values() {
        let ds = crate::data::model::Dataset::from_samples(
            "subjects",
            crate::data::model::MeasurementKind::Temperature,
            vec![
                Sample::new(0.0, 36.5, "f1"),
                Sample::new(5.0, 36.7, "f1"),
                Sample::new(0.0, 37.1, "m1"),
            ],
        );
        let hits = sync(ds.series.values(), 4.0);
        assert_eq!(hits[&Group::from("f1")].value, 36.7);
        assert_eq!(hits[&Group::from("m1")].value, 37.1);
    }
}
