//! The two route endpoints a user drags around the map.

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::domain::Node;

/// Which end of the route a marker anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Source,
    Target,
}

impl Role {
    pub const BOTH: [Role; 2] = [Role::Source, Role::Target];

    /// The marker at the other end of the route.
    pub fn other(self) -> Role {
        match self {
            Role::Source => Role::Target,
            Role::Target => Role::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Target => "target",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Role::Source => 0,
            Role::Target => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A draggable route endpoint.
///
/// `position` follows the pointer while dragging and snaps to the bound
/// node on release. Only a bound marker can anchor a route query.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub role: Role,
    pub position: Point,
    pub bound: Option<Node>,
    pub dragging: bool,
}

impl Marker {
    /// An unbound marker at `position`.
    pub fn new(role: Role, position: Point) -> Self {
        Self {
            role,
            position,
            bound: None,
            dragging: false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Bind to `node` and snap onto it.
    pub fn bind(&mut self, node: Node) {
        self.position = node.position;
        self.bound = Some(node);
    }

    pub fn unbind(&mut self) {
        self.bound = None;
    }
}
