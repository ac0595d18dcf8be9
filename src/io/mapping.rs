//! Heuristic assignment of table headers to energy fields.

use serde::{Deserialize, Serialize};

/// Column index for each semantic field of an [`crate::record::EnergyRecord`].
///
/// `None` means the field is unmapped. Only `self_consumption` may stay
/// unmapped in a valid mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub date: Option<usize>,
    pub total_generation: Option<usize>,
    pub total_consumption: Option<usize>,
    pub self_consumption: Option<usize>,
    pub fed_to_grid: Option<usize>,
    pub drawn_from_grid: Option<usize>,
}

fn is_date(h: &str) -> bool {
    h.contains("datum") || h.contains("date") || h.contains("zeit") || h.contains("time")
}

fn is_total_generation(h: &str) -> bool {
    (h.contains("gesamt") && h.contains("erzeugung"))
        || h.contains("generation")
        || h.contains("produktion")
}

fn is_total_consumption(h: &str) -> bool {
    (h.contains("gesamt") && h.contains("verbrauch"))
        || h.contains("consumption")
        || h.contains("verbrauch")
}

fn is_self_consumption(h: &str) -> bool {
    h.contains("eigenverbrauch") || (h.contains("self") && h.contains("consumption"))
}

fn is_fed_to_grid(h: &str) -> bool {
    h.contains("einspeis")
        || h.contains("eingespeist")
        || (h.contains("fed") && h.contains("grid"))
        || h.contains("export")
}

fn is_drawn_from_grid(h: &str) -> bool {
    h.contains("bezogen")
        || h.contains("bezug")
        || (h.contains("drawn") && h.contains("grid"))
        || h.contains("import")
}

impl ColumnMapping {
    /// Guesses the mapping from header text.
    ///
    /// Headers are matched case-insensitively against German and English
    /// keywords. Roles are tried in a fixed order and the first role that
    /// is still free and matches wins, so each header fills at most one
    /// role and each role takes the first header that matches it.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut mapping = Self::default();

        for (i, header) in headers.iter().enumerate() {
            let h = header.as_ref().trim().to_lowercase();

            if mapping.date.is_none() && is_date(&h) {
                mapping.date = Some(i);
            } else if mapping.total_generation.is_none() && is_total_generation(&h) {
                mapping.total_generation = Some(i);
            } else if mapping.total_consumption.is_none() && is_total_consumption(&h) {
                mapping.total_consumption = Some(i);
            } else if mapping.self_consumption.is_none() && is_self_consumption(&h) {
                mapping.self_consumption = Some(i);
            } else if mapping.fed_to_grid.is_none() && is_fed_to_grid(&h) {
                mapping.fed_to_grid = Some(i);
            } else if mapping.drawn_from_grid.is_none() && is_drawn_from_grid(&h) {
                mapping.drawn_from_grid = Some(i);
            }
        }

        mapping
    }

    /// Replaces every role that `overrides` maps explicitly.
    #[must_use]
    pub fn with_overrides(self, overrides: &Self) -> Self {
        Self {
            date: overrides.date.or(self.date),
            total_generation: overrides.total_generation.or(self.total_generation),
            total_consumption: overrides.total_consumption.or(self.total_consumption),
            self_consumption: overrides.self_consumption.or(self.self_consumption),
            fed_to_grid: overrides.fed_to_grid.or(self.fed_to_grid),
            drawn_from_grid: overrides.drawn_from_grid.or(self.drawn_from_grid),
        }
    }

    /// Names of the required roles that are still unmapped.
    pub fn missing_roles(&self) -> Vec<&'static str> {
        [
            ("date", self.date),
            ("total_generation", self.total_generation),
            ("total_consumption", self.total_consumption),
            ("fed_to_grid", self.fed_to_grid),
            ("drawn_from_grid", self.drawn_from_grid),
        ]
        .into_iter()
        .filter_map(|(name, index)| index.is_none().then_some(name))
        .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_roles().is_empty()
    }

    /// Highest index among the mapped roles, optional ones included, i.e.
    /// a row needs more fields than this to be usable.
    pub fn max_mapped_index(&self) -> Option<usize> {
        [
            self.date,
            self.total_generation,
            self.total_consumption,
            self.self_consumption,
            self.fed_to_grid,
            self.drawn_from_grid,
        ]
        .into_iter()
        .flatten()
        .max()
    }
}
