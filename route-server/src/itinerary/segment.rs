//! Itinerary and segment types.

use crate::domain::{DomainError, Mode};

/// A maximal run of route edges sharing one transport mode.
///
/// # Invariants
///
/// - At least two way-points (entry and exit)
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    mode: Mode,
    waypoints: Vec<String>,
    cost: f64,
}

impl RouteSegment {
    /// Constructs a segment from its mode, way-point names and cost in hours.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than two way-points are given or the cost is
    /// not a finite non-negative number.
    pub fn new(mode: Mode, waypoints: Vec<String>, cost: f64) -> Result<Self, DomainError> {
        if waypoints.len() < 2 {
            return Err(DomainError::TooFewWaypoints(waypoints.len()));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(DomainError::InvalidCost(cost));
        }
        Ok(Self {
            mode,
            waypoints,
            cost,
        })
    }

    /// Starts a segment from a single edge. Only the builder does this.
    pub(super) fn start(mode: Mode, source: String, target: String, cost: f64) -> Self {
        Self {
            mode,
            waypoints: vec![source, target],
            cost,
        }
    }

    /// Extends the segment by one edge in the same mode.
    pub(super) fn extend(&mut self, target: String, cost: f64) {
        self.waypoints.push(target);
        self.cost += cost;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Accumulated travel time in hours.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// All way-point names, entry first and exit last.
    pub fn waypoints(&self) -> &[String] {
        &self.waypoints
    }

    /// Name of the node where the segment starts.
    pub fn entry(&self) -> &str {
        &self.waypoints[0]
    }

    /// Name of the node where the segment ends.
    pub fn exit(&self) -> &str {
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// Intermediate stops the segment passes through (may be empty).
    pub fn stops(&self) -> &[String] {
        &self.waypoints[1..self.waypoints.len() - 1]
    }
}

/// The segment breakdown of a computed route.
///
/// Consecutive segments never share a mode. An empty itinerary means no
/// route is available between the current endpoints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Itinerary {
    segments: Vec<RouteSegment>,
    total_cost: f64,
}

impl Itinerary {
    /// An itinerary with no segments and zero cost.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(super) fn from_segments(segments: Vec<RouteSegment>) -> Self {
        let total_cost = segments.iter().map(|s| s.cost).sum();
        Self {
            segments,
            total_cost,
        }
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment costs, in hours.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Name of the first node on the route.
    pub fn origin(&self) -> Option<&str> {
        self.segments.first().map(|s| s.entry())
    }

    /// Name of the last node on the route.
    pub fn destination(&self) -> Option<&str> {
        self.segments.last().map(|s| s.exit())
    }

    /// Number of mode changes along the route.
    pub fn change_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}
