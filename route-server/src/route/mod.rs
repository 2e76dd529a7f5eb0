//! Route queries against the graph-routing service.
//!
//! The session never computes paths itself. It builds a [`RouteQuery`] from
//! the two bound endpoints and the active [`RouteFilters`], and hands it to a
//! [`RouteProvider`], which returns the path edges in order.

mod filters;

use std::collections::BTreeSet;
use std::future::Future;

use crate::domain::{Edge, Mode, NodeId};
use crate::wfs::WfsError;

pub use filters::RouteFilters;

/// A request for the route between two nodes.
///
/// Doubles as the route cache key, so two queries are equal exactly when
/// the service would answer them identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteQuery {
    pub source: NodeId,
    pub target: NodeId,
    /// Modes the route may use (baseline plus enabled optional modes).
    pub modes: BTreeSet<Mode>,
    /// Restrict the graph to edges valid in this year.
    pub year: Option<i32>,
}

impl RouteQuery {
    /// Build a query between two nodes under the given filters.
    pub fn new(source: NodeId, target: NodeId, filters: &RouteFilters) -> Self {
        Self {
            source,
            target,
            modes: filters.modes(),
            year: filters.year(),
        }
    }

    /// Whether an edge in `mode` may appear in the answer to this query.
    pub fn allows(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
}

/// Trait for issuing route queries.
///
/// This abstraction lets the session be driven by the live service, a
/// cache in front of it, or an in-memory network in tests.
pub trait RouteProvider: Send + Sync + 'static {
    /// Get the path edges from `query.source` to `query.target`, ordered
    /// from source to target. An empty list means no route exists under the
    /// query's filters.
    fn route(&self, query: &RouteQuery) -> impl Future<Output = Result<Vec<Edge>, WfsError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_takes_modes_and_year_from_filters() {
        let mut filters = RouteFilters::new();
        filters.enable(Mode::Tram);
        filters.set_year(Some(1890));

        let query = RouteQuery::new(NodeId(1), NodeId(2), &filters);

        assert_eq!(query.source, NodeId(1));
        assert_eq!(query.target, NodeId(2));
        assert_eq!(query.year, Some(1890));
        assert!(query.allows(Mode::Rail));
        assert!(query.allows(Mode::Tram));
        assert!(!query.allows(Mode::Metro));
    }

    #[test]
    fn queries_with_different_filters_differ() {
        let plain = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new());

        let mut filters = RouteFilters::new();
        filters.enable(Mode::Metro);
        let with_metro = RouteQuery::new(NodeId(1), NodeId(2), &filters);

        assert_ne!(plain, with_metro);
        assert_eq!(plain, RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new()));
    }
}
