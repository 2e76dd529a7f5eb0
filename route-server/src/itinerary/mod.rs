//! Itinerary aggregation.
//!
//! Turns the ordered edge list of a computed route into contiguous
//! same-mode segments with accumulated travel time and way-points.

mod builder;
mod segment;

pub use builder::{build, build_for_display, build_with};
pub use segment::{Itinerary, RouteSegment};
