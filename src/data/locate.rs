use thiserror::Error;

use super::model::{Sample, Series};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum LocateError {
    #[error("series has no samples")]
    EmptySeries,
    #[error("query time is not a number")]
    InvalidQuery,
}

/// Index of the sample closest in time to `query`.
///
/// Binary search for the first sample strictly after `query`, then compare it
/// with its left neighbour. An exact tie goes to the earlier sample. Queries
/// outside the series clamp to the first / last sample.
pub fn locate_index(samples: &[Sample], query: f64) -> Result<usize, LocateError> {
    if samples.is_empty() {
        return Err(LocateError::EmptySeries);
    }
    if query.is_nan() {
        return Err(LocateError::InvalidQuery);
    }

    let i = samples.partition_point(|s| s.time <= query);
    if i == 0 {
        return Ok(0);
    }
    if i == samples.len() {
        return Ok(samples.len() - 1);
    }

    let left = i - 1;
    let d_left = (query - samples[left].time).abs();
    let d_right = (samples[i].time - query).abs();
    if d_right < d_left {
        Ok(i)
    } else {
        Ok(left)
    }
}

/// Sample of `series` closest in time to `query`.
pub fn locate(series: &Series, query: f64) -> Result<&Sample, LocateError> {
    let idx = locate_index(series.samples(), query)?;
    Ok(&series.samples()[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Group;

    fn series(points: &[(f64, f64)]) -> Series {
        Series::new(
            Group::from("male"),
            points
                .iter()
                .map(|&(t, v)| Sample::new(t, v, "male"))
                .collect(),
        )
    }

    #[test]
    fn picks_closer_neighbour() {
        let s = series(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(locate(&s, 6.0).unwrap().value, 20.0);
        assert_eq!(locate(&s, 4.0).unwrap().value, 10.0);
    }

    #[test]
    fn exact_tie_prefers_earlier_sample() {
        let s = series(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(locate(&s, 5.0).unwrap().time, 0.0);
    }

    #[test]
    fn clamps_outside_range() {
        let s = series(&[(5.0, 1.0), (10.0, 2.0), (15.0, 3.0)]);
        assert_eq!(locate(&s, -100.0).unwrap().time, 5.0);
        assert_eq!(locate(&s, 1e9).unwrap().time, 15.0);
        assert_eq!(locate(&s, f64::INFINITY).unwrap().time, 15.0);
    }

    #[test]
    fn exact_match_returns_that_sample() {
        let s = series(&[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]);
        assert_eq!(locate(&s, 10.0).unwrap().value, 2.0);
    }

    #[test]
    fn duplicate_times_resolve_to_last_inserted_at_or_before_query() {
        let s = series(&[(0.0, 1.0), (10.0, 2.0), (10.0, 3.0), (20.0, 4.0)]);
        // Both 10.0 samples sit left of the query; the later one is the
        // direct left neighbour of the insertion point.
        assert_eq!(locate(&s, 11.0).unwrap().value, 3.0);
        // Approaching from the left, the first 10.0 sample is the right
        // neighbour of the insertion point.
        assert_eq!(locate(&s, 9.0).unwrap().value, 2.0);
    }

    #[test]
    fn single_sample_always_returned() {
        let s = series(&[(42.0, 7.0)]);
        assert_eq!(locate(&s, 0.0).unwrap().value, 7.0);
        assert_eq!(locate(&s, 100.0).unwrap().value, 7.0);
    }

    #[test]
    fn empty_series_is_an_error() {
        let s = series(&[]);
        assert_eq!(locate(&s, 1.0), Err(LocateError::EmptySeries));
    }

    #[test]
    fn nan_query_is_rejected() {
        let s = series(&[(0.0, 1.0)]);
        assert_eq!(locate(&s, f64::NAN), Err(LocateError::InvalidQuery));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The located sample minimizes |time - query|, and no earlier
            /// sample is equally close.
            #[test]
            fn located_sample_is_nearest_and_earliest(
                mut times in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
                query in -2.0e6f64..2.0e6,
            ) {
                times.sort_by(f64::total_cmp);
                let samples: Vec<Sample> = times
                    .iter()
                    .map(|&t| Sample::new(t, t, "male"))
                    .collect();

                let idx = locate_index(&samples, query).unwrap();
                let best = (samples[idx].time - query).abs();
                for s in &samples {
                    prop_assert!(best <= (s.time - query).abs());
                }
                let first_best = samples
                    .iter()
                    .position(|s| (s.time - query).abs() == best)
                    .unwrap();
                prop_assert_eq!(samples[first_best].time, samples[idx].time);
            }

            #[test]
            fn queries_outside_range_clamp(
                mut times in prop::collection::vec(-1.0e3f64..1.0e3, 1..32),
                offset in 0.001f64..1.0e6,
            ) {
                times.sort_by(f64::total_cmp);
                let samples: Vec<Sample> = times
                    .iter()
                    .map(|&t| Sample::new(t, 0.0, "male"))
                    .collect();
                let first = samples[0].time;
                let last = samples[samples.len() - 1].time;

                let lo = locate_index(&samples, first - offset).unwrap();
                let hi = locate_index(&samples, last + offset).unwrap();
                prop_assert_eq!(samples[lo].time, first);
                prop_assert_eq!(hi, samples.len() - 1);
            }
        }
    }
}
