//! Data transfer objects for web requests and responses.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::domain::{Edge, Mode, Node, trip_time};
use crate::itinerary::{Itinerary, RouteSegment};
use crate::route::RouteFilters;
use crate::session::{
    DisplayedRoute, DragEvent, DragPhase, Marker, Role, SessionEvent, SessionSnapshot,
};

/// A pointer event on a marker.
#[derive(Debug, Deserialize)]
pub struct DragRequest {
    /// Which marker is being dragged
    pub role: Role,

    /// `begin`, `continue` or `end`
    pub phase: DragPhase,

    /// Pointer position in map units (EPSG:3857)
    pub x: f64,
    pub y: f64,
}

impl DragRequest {
    pub fn into_event(self) -> SessionEvent {
        SessionEvent::Drag(DragEvent {
            role: self.role,
            phase: self.phase,
            position: Point::new(self.x, self.y),
        })
    }
}

/// New route filters.
#[derive(Debug, Default, Deserialize)]
pub struct FiltersRequest {
    /// Optional modes to enable; baseline modes are always on
    #[serde(default)]
    pub optional_modes: Vec<Mode>,

    /// Restrict the network to this year
    pub year: Option<i32>,
}

impl FiltersRequest {
    pub fn into_filters(self) -> RouteFilters {
        RouteFilters::from_parts(self.optional_modes, self.year)
    }
}

/// A point to look up a tooltip for.
#[derive(Debug, Deserialize)]
pub struct HoverRequest {
    pub x: f64,
    pub y: f64,
}

/// A network node.
#[derive(Debug, Serialize)]
pub struct NodeResult {
    pub id: u64,
    pub name: String,
    pub rank: i32,
    pub x: f64,
    pub y: f64,
}

impl NodeResult {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.0,
            name: node.name.clone(),
            rank: node.rank,
            x: node.position.x(),
            y: node.position.y(),
        }
    }
}

/// A route endpoint marker.
#[derive(Debug, Serialize)]
pub struct MarkerResult {
    pub role: Role,
    pub x: f64,
    pub y: f64,

    /// The node the marker is bound to, if any
    pub node: Option<NodeResult>,

    pub dragging: bool,
}

impl MarkerResult {
    pub fn from_marker(marker: &Marker) -> Self {
        Self {
            role: marker.role,
            x: marker.position.x(),
            y: marker.position.y(),
            node: marker.bound.as_ref().map(NodeResult::from_node),
            dragging: marker.dragging,
        }
    }
}

/// Active filters.
#[derive(Debug, Serialize)]
pub struct FiltersResult {
    /// Every mode a route may use, baseline included
    pub modes: Vec<Mode>,
    pub optional_modes: Vec<Mode>,
    pub year: Option<i32>,
}

impl FiltersResult {
    pub fn from_filters(filters: &RouteFilters) -> Self {
        Self {
            modes: filters.modes().into_iter().collect(),
            optional_modes: filters.optional_modes().collect(),
            year: filters.year(),
        }
    }
}

/// A path edge, with its geometry for drawing.
#[derive(Debug, Serialize)]
pub struct EdgeResult {
    pub id: String,
    pub source: String,
    pub target: String,
    pub mode: Mode,

    /// Travel time in hours
    pub cost: f64,

    /// Line strings as lists of `[x, y]` positions
    pub geometry: Vec<Vec<[f64; 2]>>,
}

impl EdgeResult {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            mode: edge.mode,
            cost: edge.cost(),
            geometry: edge
                .geometry
                .0
                .iter()
                .map(|line| line.coords().map(|c| [c.x, c.y]).collect())
                .collect(),
        }
    }
}

/// A run of edges sharing one mode.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    pub mode: Mode,

    /// Entry, pass-through stops and exit, in order
    pub waypoints: Vec<String>,

    pub cost: f64,

    /// Human-readable travel time
    pub time: String,
}

impl SegmentResult {
    pub fn from_segment(segment: &RouteSegment) -> Self {
        Self {
            mode: segment.mode(),
            waypoints: segment.waypoints().to_vec(),
            cost: segment.cost(),
            time: trip_time(segment.cost()),
        }
    }
}

/// The segment breakdown of a route.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub segments: Vec<SegmentResult>,
    pub total_cost: f64,
    pub total_time: String,
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            segments: itinerary
                .segments()
                .iter()
                .map(SegmentResult::from_segment)
                .collect(),
            total_cost: itinerary.total_cost(),
            total_time: trip_time(itinerary.total_cost()),
        }
    }
}

/// The displayed route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub source: u64,
    pub target: u64,

    /// Computed for a marker still being dragged
    pub preview: bool,

    pub edges: Vec<EdgeResult>,
    pub itinerary: ItineraryResult,
}

impl RouteResult {
    pub fn from_route(route: &DisplayedRoute) -> Self {
        Self {
            source: route.query.source.0,
            target: route.query.target.0,
            preview: route.preview,
            edges: route.edges.iter().map(EdgeResult::from_edge).collect(),
            itinerary: ItineraryResult::from_itinerary(&route.itinerary),
        }
    }
}

/// Full session state.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub source: MarkerResult,
    pub target: MarkerResult,
    pub filters: FiltersResult,
    pub route: Option<RouteResult>,

    /// Why the last request did not update the route
    pub last_error: Option<String>,

    pub revision: u64,
}

impl SessionResponse {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            source: MarkerResult::from_marker(&snapshot.source),
            target: MarkerResult::from_marker(&snapshot.target),
            filters: FiltersResult::from_filters(&snapshot.filters),
            route: snapshot.route.as_ref().map(RouteResult::from_route),
            last_error: snapshot.last_error.as_ref().map(|e| e.to_string()),
            revision: snapshot.revision,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
