use std::collections::BTreeMap;

use super::model::{Group, Sample, Series, Sex};

/// Mean of `value` at every distinct time.
///
/// Samples are grouped by exact time; NaN and infinite values are ignored,
/// and a time whose values are all ignored yields no output. The result is
/// sorted by time and tagged with `group`.
pub fn mean_by_timepoint(samples: &[Sample], group: &Group) -> Vec<Sample> {
    let mut finite: Vec<(f64, f64)> = samples
        .iter()
        .filter(|s| s.time.is_finite() && s.value.is_finite())
        .map(|s| (s.time, s.value))
        .collect();
    finite.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out: Vec<Sample> = Vec::new();
    let mut i = 0;
    while i < finite.len() {
        let t = finite[i].0;
        let mut sum = 0.0;
        let mut n = 0usize;
        while i < finite.len() && finite[i].0 == t {
            sum += finite[i].1;
            n += 1;
            i += 1;
        }
        out.push(Sample {
            time: t,
            value: sum / n as f64,
            group: group.clone(),
        });
    }
    out
}

/// One mean trend line per sex, built from per-subject series.
pub fn group_means<'a>(series: impl IntoIterator<Item = &'a Series>) -> Vec<(Sex, Series)> {
    let mut by_sex: BTreeMap<Sex, Vec<Sample>> = BTreeMap::new();
    for series in series {
        by_sex
            .entry(series.group().sex())
            .or_default()
            .extend(series.samples().iter().cloned());
    }

    by_sex
        .into_iter()
        .map(|(sex, samples)| {
            let group = Group::new(sex.label());
            let means = mean_by_timepoint(&samples, &group);
            (sex, Series::new(group, means))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, MeasurementKind};

    #[test]
    fn averages_samples_sharing_a_time() {
        let g = Group::from("female");
        let out = mean_by_timepoint(
            &[Sample::new(0.0, 36.0, "f1"), Sample::new(0.0, 38.0, "f2")],
            &g,
        );
        assert_eq!(out, vec![Sample::new(0.0, 37.0, "female")]);
    }

    #[test]
    fn output_is_sorted_with_one_entry_per_time() {
        let g = Group::from("male");
        let out = mean_by_timepoint(
            &[
                Sample::new(10.0, 2.0, "m1"),
                Sample::new(0.0, 1.0, "m1"),
                Sample::new(10.0, 4.0, "m2"),
                Sample::new(0.0, 3.0, "m2"),
                Sample::new(5.0, 9.0, "m2"),
            ],
            &g,
        );
        let pairs: Vec<(f64, f64)> = out.iter().map(|s| (s.time, s.value)).collect();
        assert_eq!(pairs, vec![(0.0, 2.0), (5.0, 9.0), (10.0, 3.0)]);
    }

    #[test]
    fn non_numeric_values_are_filtered() {
        let g = Group::from("male");
        let out = mean_by_timepoint(
            &[
                Sample::new(0.0, f64::NAN, "m1"),
                Sample::new(0.0, 4.0, "m2"),
                Sample::new(5.0, f64::NAN, "m1"),
            ],
            &g,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 4.0);
    }

    #[test]
    fn infinite_values_are_filtered() {
        let g = Group::from("female");
        let out = mean_by_timepoint(
            &[
                Sample::new(0.0, f64::INFINITY, "f1"),
                Sample::new(0.0, 36.0, "f2"),
                Sample::new(5.0, f64::NEG_INFINITY, "f1"),
            ],
            &g,
        );
        assert_eq!(out, vec![Sample::new(0.0, 36.0, "female")]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(mean_by_timepoint(&[], &Group::from("male")).is_empty());
    }

    #[test]
    fn group_means_split_subjects_by_sex() {
        let ds = Dataset::from_samples(
            "subjects",
            MeasurementKind::Temperature,
            vec![
                Sample::new(0.0, 36.0, "f1"),
                Sample::new(0.0, 38.0, "f2"),
                Sample::new(0.0, 37.0, "m1"),
                Sample::new(5.0, 37.5, "m1"),
            ],
        );
        let means = group_means(ds.series.values());
        assert_eq!(means.len(), 2);

        let (sex, female) = &means[1];
        assert_eq!(*sex, Sex::Female);
        assert_eq!(female.len(), 1);
        assert_eq!(female.samples()[0].value, 37.0);

        let (sex, male) = &means[0];
        assert_eq!(*sex, Sex::Male);
        assert_eq!(male.len(), 2);
        assert_eq!(male.group(), &Group::from("male"));
    }
}
