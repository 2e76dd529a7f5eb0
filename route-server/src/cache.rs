//! Caching layer for route queries.
//!
//! The network is historical and static, so a route between two nodes
//! under the same mode set and year never changes. Dragging a marker back
//! and forth over the same nodes re-issues identical queries; those are
//! answered from the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::Edge;
use crate::route::{RouteProvider, RouteQuery};
use crate::wfs::WfsError;

/// Cached route entry.
type RouteEntry = Arc<Vec<Edge>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 1000,
        }
    }
}

/// Route provider with caching.
///
/// Wraps any [`RouteProvider`]. Only successful responses are cached, empty
/// ones included; failures always go back to the inner provider.
pub struct CachedRouteProvider<P> {
    inner: P,
    routes: MokaCache<RouteQuery, RouteEntry>,
}

impl<P: RouteProvider> CachedRouteProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.routes.invalidate_all();
    }
}

impl<P: RouteProvider> RouteProvider for CachedRouteProvider<P> {
    async fn route(&self, query: &RouteQuery) -> Result<Vec<Edge>, WfsError> {
        if let Some(cached) = self.routes.get(query).await {
            trace!(source = %query.source, target = %query.target, "route cache hit");
            return Ok(cached.as_ref().clone());
        }

        let edges = Arc::new(self.inner.route(query).await?);
        self.routes.insert(query.clone(), edges.clone()).await;

        Ok(edges.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mode, Node, NodeId};
    use crate::route::RouteFilters;
    use crate::wfs::MockNetwork;
    use geo::point;

    async fn network() -> MockNetwork {
        let network = MockNetwork::new(vec![
            Node::new(NodeId(1), "Edirne", 7, point!(x: 0.0, y: 0.0)),
            Node::new(NodeId(2), "Istanbul", 10, point!(x: 200.0, y: 0.0)),
        ]);
        network
            .add_route(
                NodeId(1),
                NodeId(2),
                vec![Edge::new("route.1", "Edirne", "Istanbul", Mode::Rail, 6.0).unwrap()],
            )
            .await;
        network
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn repeated_query_hits_cache() {
        let network = network().await;
        let cached = CachedRouteProvider::new(network.clone(), &CacheConfig::default());
        let query = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new());

        let first = cached.route(&query).await.unwrap();
        let second = cached.route(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(network.route_calls(), 1);
    }

    #[tokio::test]
    async fn different_filters_are_different_entries() {
        let network = network().await;
        let cached = CachedRouteProvider::new(network.clone(), &CacheConfig::default());

        let baseline = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new());
        let in_1900 = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::from_parts([], Some(1900)));

        cached.route(&baseline).await.unwrap();
        cached.route(&in_1900).await.unwrap();

        assert_eq!(network.route_calls(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let network = network().await;
        let cached = CachedRouteProvider::new(network.clone(), &CacheConfig::default());
        let query = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new());

        network.set_failing(true);
        assert!(cached.route(&query).await.is_err());

        network.set_failing(false);
        assert_eq!(cached.route(&query).await.unwrap().len(), 1);
        assert_eq!(network.route_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let network = network().await;
        let cached = CachedRouteProvider::new(network.clone(), &CacheConfig::default());
        let query = RouteQuery::new(NodeId(1), NodeId(2), &RouteFilters::new());

        cached.route(&query).await.unwrap();
        cached.invalidate_cache();
        cached.route(&query).await.unwrap();

        assert_eq!(network.route_calls(), 2);
    }
}
