//! Web layer for the route session.
//!
//! Exposes the session state, accepts marker drags and filter changes, and
//! renders the itinerary.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
