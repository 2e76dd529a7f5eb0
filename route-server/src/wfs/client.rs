//! WFS HTTP client for the network's GeoServer.
//!
//! Every query is a WFS `GetFeature` request. The route and nearest-node
//! layers are parameterised SQL views, so their inputs travel in the
//! `viewparams` parameter (`key:value` pairs separated by `;`, with commas
//! inside a value escaped as `\,`).

use std::sync::Arc;
use std::time::Duration;

use geo::Point;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::domain::{Edge, Node};
use crate::route::{RouteProvider, RouteQuery};
use crate::spatial::NodeResolver;

use super::convert::{convert_nodes, convert_route};
use super::error::WfsError;
use super::types::{EdgeProperties, FeatureCollection, NodeProperties};

/// Default base URL for the GeoServer instance.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/geoserver";

/// Default workspace prefix of the network layers.
const DEFAULT_FEATURE_PREFIX: &str = "ottoman";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

const WFS_VERSION: &str = "2.0.0";
const OUTPUT_FORMAT: &str = "application/json";
const SRS_NAME: &str = "EPSG:3857";

/// Configuration for the WFS client.
#[derive(Debug, Clone)]
pub struct WfsConfig {
    /// GeoServer base URL; requests go to `{base_url}/ows`
    pub base_url: String,
    /// Workspace prefix of the layers (`{prefix}:nodes`, `{prefix}:route`)
    pub feature_prefix: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl WfsConfig {
    /// Create a new config for the given GeoServer base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            feature_prefix: DEFAULT_FEATURE_PREFIX.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set the layer workspace prefix.
    pub fn with_feature_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.feature_prefix = prefix.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Join a list of values for use inside `viewparams`.
fn escape_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join("\\,")
}

/// WFS client for the network's node and route layers.
///
/// Uses a semaphore to limit concurrent requests, since dragging a marker
/// can fire queries faster than the server answers them.
#[derive(Debug, Clone)]
pub struct WfsClient {
    http: reqwest::Client,
    base_url: String,
    feature_prefix: String,
    semaphore: Arc<Semaphore>,
}

impl WfsClient {
    /// Create a new WFS client with the given configuration.
    pub fn new(config: WfsConfig) -> Result<Self, WfsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            feature_prefix: config.feature_prefix,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn type_name(&self, layer: &str) -> String {
        format!("{}:{}", self.feature_prefix, layer)
    }

    /// Common `GetFeature` parameters for a layer.
    fn base_params(&self, layer: &str) -> Vec<(&'static str, String)> {
        vec![
            ("service", "WFS".to_string()),
            ("version", WFS_VERSION.to_string()),
            ("request", "GetFeature".to_string()),
            ("typeNames", self.type_name(layer)),
            ("outputFormat", OUTPUT_FORMAT.to_string()),
            ("srsname", SRS_NAME.to_string()),
        ]
    }

    /// Query parameters for a route request.
    pub fn route_params(&self, query: &RouteQuery) -> Vec<(&'static str, String)> {
        let mut view = vec![
            format!("source:{}", query.source),
            format!("target:{}", query.target),
            format!("modes:{}", escape_list(query.modes.iter().map(|m| m.as_str()))),
        ];
        if let Some(year) = query.year {
            view.push(format!("year:{year}"));
        }

        let mut params = self.base_params("route");
        params.push(("viewparams", view.join(";")));
        params
    }

    /// Query parameters for a nearest-node request.
    pub fn nearest_params(&self, position: Point, tolerance: f64) -> Vec<(&'static str, String)> {
        let view = format!(
            "x:{};y:{};tolerance:{}",
            position.x(),
            position.y(),
            tolerance
        );

        let mut params = self.base_params("nearest_node");
        params.push(("count", "1".to_string()));
        params.push(("viewparams", view));
        params
    }

    /// Issue a `GetFeature` request and decode the feature collection.
    async fn get_features<P: DeserializeOwned>(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<FeatureCollection<P>, WfsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| WfsError::NotConfigured("request semaphore closed".to_string()))?;

        let url = format!("{}/ows", self.base_url);
        trace!(%url, ?params, "WFS GetFeature");

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WfsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| WfsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }

    /// Fetch every node in the network.
    ///
    /// Used at startup to build a local [`NodeIndex`](crate::spatial::NodeIndex).
    pub async fn fetch_nodes(&self) -> Result<Vec<Node>, WfsError> {
        let collection: FeatureCollection<NodeProperties> =
            self.get_features(&self.base_params("nodes")).await?;
        let nodes = convert_nodes(&collection)?;
        debug!(count = nodes.len(), "fetched network nodes");
        Ok(nodes)
    }

    /// Nodes within `tolerance` of `position`, most relevant first.
    pub async fn nearest_nodes(
        &self,
        position: Point,
        tolerance: f64,
    ) -> Result<Vec<Node>, WfsError> {
        let collection: FeatureCollection<NodeProperties> = self
            .get_features(&self.nearest_params(position, tolerance))
            .await?;
        Ok(convert_nodes(&collection)?)
    }

    /// Path edges from source to target, in path order.
    pub async fn fetch_route(&self, query: &RouteQuery) -> Result<Vec<Edge>, WfsError> {
        let collection: FeatureCollection<EdgeProperties> =
            self.get_features(&self.route_params(query)).await?;
        let edges = convert_route(&collection)?;
        debug!(
            source = %query.source,
            target = %query.target,
            edges = edges.len(),
            "fetched route"
        );
        Ok(edges)
    }
}

impl NodeResolver for WfsClient {
    async fn nearest_node(&self, position: Point, tolerance: f64) -> Result<Option<Node>, WfsError> {
        Ok(self.nearest_nodes(position, tolerance).await?.into_iter().next())
    }
}

impl RouteProvider for WfsClient {
    async fn route(&self, query: &RouteQuery) -> Result<Vec<Edge>, WfsError> {
        self.fetch_route(query).await
    }
}
