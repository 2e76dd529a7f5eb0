//! Mode and period filters for route queries.

use std::collections::BTreeSet;

use crate::domain::Mode;

/// User-controlled route filters.
///
/// The baseline modes are always requested. Optional modes (metro and the
/// tram variants, absent from most of the historical period) are only added
/// when switched on. A year restricts the graph to edges that existed then.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilters {
    optional: BTreeSet<Mode>,
    year: Option<i32>,
}

impl RouteFilters {
    /// Baseline modes only, no period restriction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build filters from a list of optional modes and a year.
    ///
    /// Baseline modes in `optional` are ignored: they are always on.
    pub fn from_parts(optional: impl IntoIterator<Item = Mode>, year: Option<i32>) -> Self {
        let mut filters = Self::new();
        for mode in optional {
            filters.enable(mode);
        }
        filters.year = year;
        filters
    }

    /// Switch an optional mode on. Returns `false` if nothing changed.
    pub fn enable(&mut self, mode: Mode) -> bool {
        mode.is_optional() && self.optional.insert(mode)
    }

    /// Switch an optional mode off. Returns `false` if nothing changed.
    pub fn disable(&mut self, mode: Mode) -> bool {
        self.optional.remove(&mode)
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// Optional modes currently switched on.
    pub fn optional_modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.optional.iter().copied()
    }

    /// The full set of modes to request.
    pub fn modes(&self) -> BTreeSet<Mode> {
        Mode::BASELINE
            .iter()
            .copied()
            .chain(self.optional.iter().copied())
            .collect()
    }
}
