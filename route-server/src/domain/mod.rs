//! Domain types for the historical network route planner.
//!
//! These types represent validated network data. Values that come from the
//! routing service are checked once at the service boundary, so code that
//! receives them can trust their invariants.

mod edge;
mod error;
mod mode;
mod node;
mod trip_time;

pub use edge::Edge;
pub use error::DomainError;
pub use mode::{InvalidMode, Mode};
pub use node::{InvalidNodeId, Node, NodeId};
pub use trip_time::trip_time;
