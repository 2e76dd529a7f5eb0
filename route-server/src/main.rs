use std::net::SocketAddr;
use std::sync::Arc;

use route_server::cache::CachedRouteProvider;
use route_server::config::{AppConfig, ResolverKind};
use route_server::domain::Node;
use route_server::route::RouteProvider;
use route_server::session::{SessionConfig, spawn_session};
use route_server::spatial::{NodeIndex, NodeResolver};
use route_server::web::{AppState, create_router};
use route_server::wfs::WfsClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("route_server=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Create WFS client
    let client = WfsClient::new(config.wfs.clone()).expect("Failed to create WFS client");

    // Create cached route provider
    let provider = Arc::new(CachedRouteProvider::new(client.clone(), &config.cache));

    match config.resolver {
        ResolverKind::Local => {
            // Fetch the node layer (fail fast if unavailable)
            info!(url = %config.wfs.base_url, "fetching network nodes");
            let nodes = client
                .fetch_nodes()
                .await
                .expect("Failed to fetch network nodes");
            let index = NodeIndex::new(nodes);
            info!(nodes = index.len(), "built node index");
            let initial = index.initial_pair();
            if initial.is_none() {
                warn!("fewer than two nodes, markers start unplaced");
            }
            serve(Arc::new(index), provider, config.session, config.listen_addr, initial).await;
        }
        ResolverKind::Remote => {
            info!("snapping markers through the nearest-node view");
            serve(Arc::new(client), provider, config.session, config.listen_addr, None).await;
        }
    }
}

async fn serve<R, P>(
    resolver: Arc<R>,
    provider: Arc<P>,
    session: SessionConfig,
    addr: SocketAddr,
    initial: Option<(Node, Node)>,
) where
    R: NodeResolver,
    P: RouteProvider,
{
    let session = spawn_session(resolver, provider, session);
    if let Some((source, target)) = initial {
        info!(source = %source.name, target = %target.name, "placing markers");
        session
            .place_markers(source, target)
            .await
            .expect("Session stopped before startup");
    }

    // Create router
    let app = create_router(AppState::new(session));

    // Bind and serve
    info!("Route server listening on http://{addr}");
    info!("API Endpoints:");
    info!("  GET  /health             - Health check");
    info!("  GET  /session            - Session state");
    info!("  POST /session/drag       - Marker drag event");
    info!("  POST /session/filters    - Set mode and year filters");
    info!("  GET  /session/itinerary  - Itinerary (HTML or JSON)");
    info!("  GET  /session/hover      - Tooltip for the route edge at x, y");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
