//! Application configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `ROUTE_SERVICE_URL` | `http://localhost:8080/geoserver` |
//! | `FEATURE_PREFIX` | `ottoman` |
//! | `LISTEN_ADDR` | `127.0.0.1:3000` |
//! | `SNAP_TOLERANCE` | `50000` (map units) |
//! | `THROTTLE_MS` | `30` |
//! | `REQUEST_TIMEOUT_SECS` | `5` |
//! | `RESOLVER` | `local` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::session::SessionConfig;
use crate::wfs::WfsConfig;

/// Errors reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: cannot parse {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be positive, got {value:?}")]
    NotPositive { name: &'static str, value: String },
}

/// Where marker positions are snapped to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// Fetch every node at startup and snap against a local R-tree.
    Local,
    /// Ask the service's nearest-node view for every lookup.
    Remote,
}

impl FromStr for ResolverKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ResolverKind::Local),
            "remote" => Ok(ResolverKind::Remote),
            _ => Err(()),
        }
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub resolver: ResolverKind,
    pub wfs: WfsConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns a variable's
    /// value or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut wfs = WfsConfig::default();
        if let Some(url) = lookup("ROUTE_SERVICE_URL") {
            wfs.base_url = url;
        }
        if let Some(prefix) = lookup("FEATURE_PREFIX") {
            wfs = wfs.with_feature_prefix(prefix);
        }

        let listen_addr = parse(&lookup, "LISTEN_ADDR")?.unwrap_or_else(default_listen_addr);

        let mut session = SessionConfig::default();
        if let Some(tolerance) = parse::<f64, _>(&lookup, "SNAP_TOLERANCE")? {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(ConfigError::NotPositive {
                    name: "SNAP_TOLERANCE",
                    value: tolerance.to_string(),
                });
            }
            session = session.with_tolerance(tolerance);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "THROTTLE_MS")? {
            session = session.with_throttle_period(Duration::from_millis(ms));
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "REQUEST_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::NotPositive {
                    name: "REQUEST_TIMEOUT_SECS",
                    value: secs.to_string(),
                });
            }
            session = session.with_request_timeout(Duration::from_secs(secs));
            wfs = wfs.with_timeout(secs);
        }

        let resolver = parse(&lookup, "RESOLVER")?.unwrap_or(ResolverKind::Local);

        Ok(Self {
            listen_addr,
            resolver,
            wfs,
            session,
            cache: CacheConfig::default(),
        })
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Parse an optional variable, treating an empty value as unset.
fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
