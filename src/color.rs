use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Group, Sex};

pub const MALE_LINE: Color32 = Color32::from_rgb(0xAD, 0xD8, 0xE6);
pub const MALE_MARKER: Color32 = Color32::from_rgb(0x6C, 0xA6, 0xCD);
pub const FEMALE_LINE: Color32 = Color32::from_rgb(0xFF, 0xB6, 0xC1);
pub const FEMALE_MARKER: Color32 = Color32::from_rgb(0xFF, 0x65, 0x7C);
/// Base colour of cumulative lines behind the highlighted prefix.
pub const PROGRESS_BASE: Color32 = Color32::from_rgb(0xCC, 0xCC, 0xCC);
pub const CURSOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Line and marker colours for one sex.
pub fn sex_colors(sex: Sex) -> SeriesColors {
    match sex {
        Sex::Male => SeriesColors {
            line: MALE_LINE,
            marker: MALE_MARKER,
        },
        Sex::Female => SeriesColors {
            line: FEMALE_LINE,
            marker: FEMALE_MARKER,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesColors {
    pub line: Color32,
    pub marker: Color32,
}

// ---------------------------------------------------------------------------
// Color mapping: group → colours
// ---------------------------------------------------------------------------

/// Maps the groups of a dataset to colours. Sex partitions keep their fixed
/// blue/pink pair; subjects get evenly spaced hues.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Group, SeriesColors>,
    default_colors: SeriesColors,
}

impl ColorMap {
    pub fn new<'a>(groups: impl IntoIterator<Item = &'a Group>) -> Self {
        let groups: Vec<&Group> = groups.into_iter().collect();
        let subjects = groups.iter().filter(|g| !g.is_sex_partition()).count();
        let mut palette = generate_palette(subjects).into_iter();

        let mapping = groups
            .into_iter()
            .map(|g| {
                let colors = if g.is_sex_partition() {
                    sex_colors(g.sex())
                } else {
                    let c = palette.next().unwrap_or(Color32::GRAY);
                    SeriesColors { line: c, marker: c }
                };
                (g.clone(), colors)
            })
            .collect();

        ColorMap {
            mapping,
            default_colors: SeriesColors {
                line: Color32::GRAY,
                marker: Color32::GRAY,
            },
        }
    }

    /// Look up the colours for a group.
    pub fn colors_for(&self, group: &Group) -> SeriesColors {
        self.mapping
            .get(group)
            .copied()
            .unwrap_or(self.default_colors)
    }

    /// Return the legend entries (group → line colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(Group, Color32)> {
        self.mapping
            .iter()
            .map(|(g, c)| (g.clone(), c.line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_groups_keep_fixed_colours() {
        let groups = [Group::from("female"), Group::from("male")];
        let cm = ColorMap::new(&groups);
        assert_eq!(cm.colors_for(&Group::from("male")).line, MALE_LINE);
        assert_eq!(cm.colors_for(&Group::from("female")).marker, FEMALE_MARKER);
    }

    #[test]
    fn subjects_get_distinct_colours() {
        let groups = [Group::from("f1"), Group::from("f2"), Group::from("m1")];
        let cm = ColorMap::new(&groups);
        let entries = cm.legend_entries();
        assert_eq!(entries.len(), 3);
        assert_ne!(entries[0].1, entries[1].1);
        assert_ne!(entries[1].1, entries[2].1);
    }

    #[test]
    fn unknown_group_falls_back_to_grey() {
        let cm = ColorMap::new(std::iter::empty());
        assert_eq!(cm.colors_for(&Group::from("x")).line, Color32::GRAY);
    }

    #[test]
    fn palette_size_matches_request() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
