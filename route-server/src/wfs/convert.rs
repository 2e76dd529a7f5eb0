//! Conversion from WFS features to domain types.
//!
//! This is the validation boundary: mode tags are parsed into the closed
//! [`Mode`] enumeration, node ids are extracted from feature ids, and edge
//! costs are checked. Anything malformed is rejected here rather than
//! leaking into the session.

use geo::{Coord, LineString, MultiLineString, Point};

use crate::domain::{DomainError, Edge, InvalidMode, InvalidNodeId, Mode, Node, NodeId};

use super::types::{EdgeProperties, Feature, FeatureCollection, GeometryDto, NodeProperties};

/// Errors converting a feature to a domain value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Node feature has no id
    #[error("feature has no id")]
    MissingId,

    /// Feature id does not carry a node number
    #[error(transparent)]
    InvalidNodeId(#[from] InvalidNodeId),

    /// Feature has no geometry
    #[error("feature {0} has no geometry")]
    MissingGeometry(String),

    /// Geometry is present but of the wrong kind or malformed
    #[error("feature {id}: expected {expected} geometry")]
    UnexpectedGeometry { id: String, expected: &'static str },

    /// Mode tag is not one of the known modes
    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    /// Value failed domain validation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Convert a GeoJSON position, ignoring any third ordinate.
fn coord(position: &[f64]) -> Option<Coord> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn line(positions: &[Vec<f64>]) -> Option<LineString> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

/// Convert a node-layer feature to a [`Node`].
pub fn convert_node(feature: &Feature<NodeProperties>) -> Result<Node, ConversionError> {
    let fid = feature.id.as_deref().ok_or(ConversionError::MissingId)?;
    let id = NodeId::parse_feature_id(fid)?;

    let position = match &feature.geometry {
        Some(GeometryDto::Point { coordinates }) => {
            coord(coordinates)
                .map(Point::from)
                .ok_or_else(|| ConversionError::UnexpectedGeometry {
                    id: fid.to_string(),
                    expected: "point",
                })?
        }
        Some(_) => {
            return Err(ConversionError::UnexpectedGeometry {
                id: fid.to_string(),
                expected: "point",
            });
        }
        None => return Err(ConversionError::MissingGeometry(fid.to_string())),
    };

    Ok(Node::new(
        id,
        feature.properties.name.clone(),
        feature.properties.rank.unwrap_or(0),
        position,
    ))
}

/// Convert every feature of a node collection.
///
/// Fails on the first malformed feature.
pub fn convert_nodes(
    collection: &FeatureCollection<NodeProperties>,
) -> Result<Vec<Node>, ConversionError> {
    collection.features.iter().map(convert_node).collect()
}

/// Convert a route-layer feature to an [`Edge`].
///
/// `position` is the feature's index in the response, used as the edge id
/// when the service omits one.
pub fn convert_edge(
    feature: &Feature<EdgeProperties>,
    position: usize,
) -> Result<Edge, ConversionError> {
    let id = feature
        .id
        .clone()
        .unwrap_or_else(|| format!("route.{position}"));

    let props = &feature.properties;
    let mode = Mode::parse(&props.mode)?;

    let geometry = match &feature.geometry {
        Some(GeometryDto::LineString { coordinates }) => line(coordinates)
            .map(|l| MultiLineString::new(vec![l]))
            .ok_or_else(|| ConversionError::UnexpectedGeometry {
                id: id.clone(),
                expected: "line",
            })?,
        Some(GeometryDto::MultiLineString { coordinates }) => coordinates
            .iter()
            .map(|l| line(l))
            .collect::<Option<Vec<_>>>()
            .map(MultiLineString::new)
            .ok_or_else(|| ConversionError::UnexpectedGeometry {
                id: id.clone(),
                expected: "line",
            })?,
        Some(_) => {
            return Err(ConversionError::UnexpectedGeometry {
                id,
                expected: "line",
            });
        }
        // Geometry is only used for display, so an edge without it is still usable.
        None => MultiLineString::new(Vec::new()),
    };

    Ok(Edge::new(id, props.source.clone(), props.target.clone(), mode, props.cost)?
        .with_geometry(geometry))
}

/// Convert a route response into path edges, preserving the service's order.
pub fn convert_route(
    collection: &FeatureCollection<EdgeProperties>,
) -> Result<Vec<Edge>, ConversionError> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(i, f)| convert_edge(f, i))
        .collect()
}
