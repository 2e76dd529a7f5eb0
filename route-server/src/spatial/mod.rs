//! Snapping map coordinates to graph nodes.
//!
//! A [`NodeResolver`] answers "which node is nearest to this point, if any
//! lies within the tolerance?". The remote service can answer it, or a local
//! R-tree built from the full node layer.

mod index;

use std::future::Future;

use geo::Point;

use crate::domain::Node;
use crate::wfs::WfsError;

pub use index::NodeIndex;

/// Trait for resolving a map position to the nearest graph node.
pub trait NodeResolver: Send + Sync + 'static {
    /// Returns the single nearest node within `tolerance` map units of
    /// `position`, or `None` if no node qualifies.
    fn nearest_node(
        &self,
        position: Point,
        tolerance: f64,
    ) -> impl Future<Output = Result<Option<Node>, WfsError>> + Send;
}
