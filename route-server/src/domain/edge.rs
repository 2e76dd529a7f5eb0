//! Route edge types.

use geo::{Closest, ClosestPoint, Distance, Euclidean, LineString, MultiLineString, Point};

use super::{DomainError, Mode};

/// One directed, mode-tagged, costed hop of a computed route.
///
/// The routing service reports the endpoints by display name, which is all
/// the itinerary needs. Geometry is carried through for rendering and for
/// hover lookups; nothing else looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    /// Display name of the node the edge leaves.
    pub source: String,
    /// Display name of the node the edge enters.
    pub target: String,
    pub mode: Mode,
    /// Travel time in hours.
    cost: f64,
    pub geometry: MultiLineString,
}

impl Edge {
    /// Constructs an edge, checking the cost is a finite non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCost`] for negative, NaN or infinite costs.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        mode: Mode,
        cost: f64,
    ) -> Result<Self, DomainError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(DomainError::InvalidCost(cost));
        }

        Ok(Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            mode,
            cost,
            geometry: MultiLineString::new(Vec::new()),
        })
    }

    /// Attach geometry to the edge.
    pub fn with_geometry(mut self, geometry: MultiLineString) -> Self {
        self.geometry = geometry;
        self
    }

    /// Attach a single line as the edge geometry.
    pub fn with_line(self, line: LineString) -> Self {
        self.with_geometry(MultiLineString::new(vec![line]))
    }

    /// Travel time in hours.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Distance from `point` to the nearest part of this edge's geometry.
    ///
    /// Returns `None` when the edge has no geometry.
    pub fn distance_to(&self, point: Point) -> Option<f64> {
        self.geometry
            .0
            .iter()
            .filter_map(|line| match line.closest_point(&point) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => {
                    Some(Euclidean.distance(p, point))
                }
                Closest::Indeterminate => None,
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}
