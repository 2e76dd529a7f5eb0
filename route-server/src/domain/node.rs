//! Graph node types.

use std::fmt;

use geo::Point;

/// Error returned when parsing an invalid node identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id {input:?}: {reason}")]
pub struct InvalidNodeId {
    input: String,
    reason: &'static str,
}

/// Stable identifier of a node in the transportation graph.
///
/// The routing service publishes nodes as WFS features whose ids look like
/// `nodes.42`; the numeric part is what route queries expect.
///
/// # Examples
///
/// ```
/// use route_server::domain::NodeId;
///
/// assert_eq!(NodeId::parse_feature_id("nodes.42").unwrap(), NodeId(42));
/// assert_eq!(NodeId::parse_feature_id("17").unwrap(), NodeId(17));
/// assert!(NodeId::parse_feature_id("nodes.").is_err());
/// assert!(NodeId::parse_feature_id("nodes.abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Parse a node id from a WFS feature id (`<layer>.<n>`) or a bare number.
    pub fn parse_feature_id(s: &str) -> Result<Self, InvalidNodeId> {
        let digits = match s.split_once('.') {
            Some((_, rest)) => rest,
            None => s,
        };

        if digits.is_empty() {
            return Err(InvalidNodeId {
                input: s.to_string(),
                reason: "missing numeric part",
            });
        }

        digits.parse::<u64>().map(NodeId).map_err(|_| InvalidNodeId {
            input: s.to_string(),
            reason: "numeric part is not an unsigned integer",
        })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named point in the transportation graph (a settlement, junction, port).
///
/// Nodes are immutable once fetched; markers hold clones of them but never
/// change them.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Importance class, used only for presentation.
    pub rank: i32,
    /// Position in map coordinates (EPSG:3857).
    pub position: Point,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, rank: i32, position: Point) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
            position,
        }
    }
}
