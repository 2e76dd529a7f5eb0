//! In-memory network for testing without a GeoServer.
//!
//! Serves nodes from a local index and routes from canned edge lists,
//! either built in code or loaded from GeoJSON files on disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use geo::Point;
use tokio::sync::RwLock;

use crate::domain::{Edge, Node, NodeId};
use crate::route::{RouteProvider, RouteQuery};
use crate::spatial::{NodeIndex, NodeResolver};

use super::convert::{convert_nodes, convert_route};
use super::error::WfsError;
use super::types::{EdgeProperties, FeatureCollection, NodeProperties};

/// A canned route and how long the mock takes to answer it.
#[derive(Debug, Clone)]
struct CannedRoute {
    edges: Vec<Edge>,
    delay: Duration,
}

/// Mock network that answers resolver and route queries from memory.
///
/// Routes only come back when every edge's mode is allowed by the query,
/// so mode filters behave as they would against the live service.
#[derive(Clone)]
pub struct MockNetwork {
    index: Arc<NodeIndex>,
    routes: Arc<RwLock<HashMap<(NodeId, NodeId), CannedRoute>>>,
    resolve_calls: Arc<AtomicUsize>,
    route_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockNetwork {
    /// Create a mock network over the given nodes, with no routes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            index: Arc::new(NodeIndex::new(nodes)),
            routes: Arc::new(RwLock::new(HashMap::new())),
            resolve_calls: Arc::new(AtomicUsize::new(0)),
            route_calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load a mock network from a directory.
    ///
    /// Expects `nodes.json` (the node layer as GeoJSON) and any number of
    /// `route_{source}_{target}.json` files holding route-layer responses.
    pub async fn load(data_dir: impl AsRef<Path>) -> Result<Self, WfsError> {
        let data_dir = data_dir.as_ref();

        let nodes_json = std::fs::read_to_string(data_dir.join("nodes.json")).map_err(|e| {
            WfsError::NotConfigured(format!("failed to read nodes.json in {data_dir:?}: {e}"))
        })?;
        let nodes: FeatureCollection<NodeProperties> =
            serde_json::from_str(&nodes_json).map_err(|e| WfsError::Json {
                message: e.to_string(),
                body: None,
            })?;
        let network = Self::new(convert_nodes(&nodes)?);

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            WfsError::NotConfigured(format!("failed to read mock data directory: {e}"))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| WfsError::NotConfigured(format!("failed to read directory entry: {e}")))?
                .path();

            // "route_12_34.json" -> (12, 34)
            let Some(stem) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix("route_"))
            else {
                continue;
            };
            let Some((source, target)) = stem.split_once('_') else {
                continue;
            };
            let (Ok(source), Ok(target)) = (source.parse::<u64>(), target.parse::<u64>()) else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| {
                WfsError::NotConfigured(format!("failed to read {path:?}: {e}"))
            })?;
            let collection: FeatureCollection<EdgeProperties> = serde_json::from_str(&json)
                .map_err(|e| WfsError::Json {
                    message: format!("{path:?}: {e}"),
                    body: None,
                })?;

            network
                .add_route(NodeId(source), NodeId(target), convert_route(&collection)?)
                .await;
        }

        Ok(network)
    }

    /// Register the path between two nodes.
    pub async fn add_route(&self, source: NodeId, target: NodeId, edges: Vec<Edge>) {
        self.add_slow_route(source, target, edges, Duration::ZERO).await;
    }

    /// Register a path that takes `delay` to come back.
    pub async fn add_slow_route(
        &self,
        source: NodeId,
        target: NodeId,
        edges: Vec<Edge>,
        delay: Duration,
    ) {
        let mut routes = self.routes.write().await;
        routes.insert((source, target), CannedRoute { edges, delay });
    }

    /// Make every subsequent query fail with a server error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of resolver queries received.
    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Number of route queries received.
    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    /// The nodes of the mock network.
    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    fn check_failing(&self) -> Result<(), WfsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WfsError::Api {
                status: 503,
                message: "mock network unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl NodeResolver for MockNetwork {
    async fn nearest_node(&self, position: Point, tolerance: f64) -> Result<Option<Node>, WfsError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.index.nearest_within(position, tolerance).cloned())
    }
}

impl RouteProvider for MockNetwork {
    async fn route(&self, query: &RouteQuery) -> Result<Vec<Edge>, WfsError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;

        let canned = {
            let routes = self.routes.read().await;
            routes.get(&(query.source, query.target)).cloned()
        };

        let Some(canned) = canned else {
            return Ok(Vec::new());
        };

        if !canned.delay.is_zero() {
            tokio::time::sleep(canned.delay).await;
        }

        if canned.edges.iter().all(|e| query.allows(e.mode)) {
            Ok(canned.edges)
        } else {
            Ok(Vec::new())
        }
    }
}
