//! Client for the network's WFS (GeoServer) endpoints.
//!
//! The historical network lives in GeoServer as three layers:
//! - `{prefix}:nodes`: every settlement/junction, loaded once
//! - `{prefix}:nearest_node`: SQL view returning nodes near a point,
//!   nearest first
//! - `{prefix}:route`: SQL view returning the path edges between two node
//!   ids, in path order, filtered by modes and year
//!
//! Feature ids look like `nodes.42`; route queries take the bare number.

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{WfsClient, WfsConfig};
pub use convert::{ConversionError, convert_edge, convert_node, convert_nodes, convert_route};
pub use error::WfsError;
pub use mock::MockNetwork;
pub use types::{EdgeProperties, Feature, FeatureCollection, GeometryDto, NodeProperties};
