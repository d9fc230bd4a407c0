use std::collections::BTreeSet;

use super::model::{Dataset, Group, Series};

// ---------------------------------------------------------------------------
// Legend filter: which groups of a dataset are shown
// ---------------------------------------------------------------------------

/// Groups currently selected in a chart's legend.
/// An empty set means nothing is selected, so nothing is drawn.
pub type FilterState = BTreeSet<Group>;

/// Initialise a [`FilterState`] with every group selected.
pub fn init_filter_state(dataset: &Dataset) -> FilterState {
    dataset.groups().cloned().collect()
}

/// Series of `dataset` whose group is selected, in group order.
pub fn visible_series<'a>(dataset: &'a Dataset, filter: &FilterState) -> Vec<&'a Series> {
    dataset
        .series
        .iter()
        .filter(|(group, _)| filter.contains(*group))
        .map(|(_, series)| series)
        .collect()
}

/// Flip one group's selection. Returns whether it is now selected.
pub fn toggle(filter: &mut FilterState, group: &Group) -> bool {
    if filter.remove(group) {
        false
    } else {
        filter.insert(group.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MeasurementKind, Sample};

    fn dataset() -> Dataset {
        Dataset::from_samples(
            "err",
            MeasurementKind::Error,
            vec![
                Sample::new(0.0, 0.1, "male"),
                Sample::new(0.0, 0.2, "female"),
            ],
        )
    }

    #[test]
    fn all_groups_visible_initially() {
        let ds = dataset();
        let filter = init_filter_state(&ds);
        assert_eq!(visible_series(&ds, &filter).len(), 2);
    }

    #[test]
    fn toggled_group_is_hidden_then_restored() {
        let ds = dataset();
        let mut filter = init_filter_state(&ds);
        let male = Group::from("male");

        assert!(!toggle(&mut filter, &male));
        let shown = visible_series(&ds, &filter);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].group(), &Group::from("female"));

        assert!(toggle(&mut filter, &male));
        assert_eq!(visible_series(&ds, &filter).len(), 2);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let ds = dataset();
        assert!(visible_series(&ds, &FilterState::new()).is_empty());
    }
}
