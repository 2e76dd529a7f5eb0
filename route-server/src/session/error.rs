//! Session error types.

use std::time::Duration;

use crate::wfs::WfsError;

use super::controller::RequestId;
use super::marker::Role;

/// Outcomes that stop a request from updating the display.
///
/// None of these end the session. Everything except
/// [`StaleResponse`](SessionError::StaleResponse) is recorded as the
/// session's last error for the presentation layer to show.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// No node within the snap tolerance of a marker
    #[error("no node within {tolerance} of the {role} marker")]
    ResolutionEmpty { role: Role, tolerance: f64 },

    /// The service found no path under the current filters
    #[error("no route from {from} to {to} with the selected modes")]
    RouteEmpty { from: String, to: String },

    /// Resolver or route call failed
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Resolver or route call did not answer in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A newer request superseded this one
    #[error("stale response to request {0}")]
    StaleResponse(RequestId),
}

impl SessionError {
    /// Map a service error, reporting service-side timeouts with the
    /// session's own timeout.
    pub fn from_wfs(err: &WfsError, timeout: Duration) -> Self {
        match err {
            WfsError::Timeout => SessionError::Timeout(timeout),
            other => SessionError::NetworkFailure(other.to_string()),
        }
    }
}

/// The session task has stopped and no longer accepts events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("route session has shut down")]
pub struct SessionClosed;
