//! Application state for the web layer.

use crate::session::SessionHandle;

/// Shared application state.
///
/// The web layer is a thin client of one running route session.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the route session task
    pub session: SessionHandle,
}

impl AppState {
    /// Create a new app state.
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }
}
