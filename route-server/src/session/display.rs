//! What the session currently shows: the route, its itinerary and hover
//! tooltips over its edges.

use geo::Point;
use serde::Serialize;

use crate::domain::{Edge, trip_time};
use crate::itinerary::Itinerary;
use crate::route::RouteQuery;

/// The route on display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedRoute {
    /// Path edges in order, with geometry for drawing.
    pub edges: Vec<Edge>,
    pub itinerary: Itinerary,
    /// Whether this route was computed for a marker still being dragged.
    pub preview: bool,
    pub query: RouteQuery,
}

/// Tooltip for a route edge under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeTooltip {
    /// `"<source> - <target>"`
    pub title: String,
    /// `"<travel time> by <mode>"`
    pub detail: String,
}

impl EdgeTooltip {
    pub fn for_edge(edge: &Edge) -> Self {
        Self {
            title: format!("{} - {}", edge.source, edge.target),
            detail: format!("{} by {}", trip_time(edge.cost()), edge.mode),
        }
    }
}

impl DisplayedRoute {
    /// The edge nearest to `position`, if any lies within `tolerance`.
    ///
    /// Ties go to the edge that comes first along the path.
    pub fn edge_near(&self, position: Point, tolerance: f64) -> Option<&Edge> {
        let mut best: Option<(&Edge, f64)> = None;

        for edge in &self.edges {
            let Some(distance) = edge.distance_to(position) else {
                continue;
            };
            if distance > tolerance {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((edge, distance));
            }
        }

        best.map(|(edge, _)| edge)
    }

    /// Tooltip for the edge nearest to `position`.
    pub fn tooltip_at(&self, position: Point, tolerance: f64) -> Option<EdgeTooltip> {
        self.edge_near(position, tolerance).map(EdgeTooltip::for_edge)
    }
}
