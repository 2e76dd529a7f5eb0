//! Reduction of an ordered edge list into itinerary segments.
//!
//! The routing service returns edges already ordered along the path. The
//! builder walks them once, extending the current segment while the mode
//! stays the same and starting a new one at every mode change. Edges are
//! never reordered or dropped.

use tracing::trace;

use crate::domain::{Edge, Mode};

use super::segment::{Itinerary, RouteSegment};

/// Build an itinerary, comparing modes exactly as the service tagged them.
///
/// # Examples
///
/// ```
/// use route_server::domain::{Edge, Mode};
/// use route_server::itinerary::build;
///
/// let edges = vec![
///     Edge::new("1", "A", "B", Mode::Road, 1.0).unwrap(),
///     Edge::new("2", "B", "C", Mode::Road, 2.0).unwrap(),
///     Edge::new("3", "C", "D", Mode::Rail, 3.0).unwrap(),
/// ];
///
/// let itinerary = build(&edges);
/// assert_eq!(itinerary.segments().len(), 2);
/// assert_eq!(itinerary.segments()[0].waypoints(), ["A", "B", "C"]);
/// assert_eq!(itinerary.total_cost(), 6.0);
/// ```
pub fn build(edges: &[Edge]) -> Itinerary {
    build_with(edges, |mode| mode)
}

/// Build an itinerary using the display alias of each mode.
///
/// Chaussee edges run together with plain road edges, and electric trams
/// with trams, so the itinerary reads the way the map legend does.
pub fn build_for_display(edges: &[Edge]) -> Itinerary {
    build_with(edges, Mode::display_alias)
}

/// Build an itinerary, normalising every edge's mode with `normalize` before
/// comparing it to the current segment's mode.
///
/// The same function is applied to every edge, so segments carry the
/// normalised mode and boundaries only fall where normalised modes differ.
pub fn build_with<F>(edges: &[Edge], normalize: F) -> Itinerary
where
    F: Fn(Mode) -> Mode,
{
    let mut segments: Vec<RouteSegment> = Vec::new();
    let mut current: Option<RouteSegment> = None;

    for edge in edges {
        let mode = normalize(edge.mode);

        match current.as_mut() {
            Some(segment) if segment.mode() == mode => {
                segment.extend(edge.target.clone(), edge.cost());
            }
            _ => {
                if let Some(finished) = current.take() {
                    segments.push(finished);
                }
                current = Some(RouteSegment::start(
                    mode,
                    edge.source.clone(),
                    edge.target.clone(),
                    edge.cost(),
                ));
            }
        }
    }

    if let Some(finished) = current {
        segments.push(finished);
    }

    trace!(
        edges = edges.len(),
        segments = segments.len(),
        "built itinerary"
    );

    Itinerary::from_segments(segments)
}
