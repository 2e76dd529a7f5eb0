//! Interactive route session: two draggable markers snapped to network
//! nodes, with the route between them kept up to date.
//!
//! [`RouteSession`] is the state machine and does no I/O.
//! [`spawn_session`] runs one on a tokio task, performing the resolver and
//! route calls it asks for with a timeout and bounded retries.

mod config;
mod controller;
mod display;
mod driver;
mod error;
mod marker;
mod retry;
mod throttle;

pub use config::SessionConfig;
pub use controller::{Command, Completion, Intent, RequestId, RouteSession, SessionSnapshot};
pub use display::{DisplayedRoute, EdgeTooltip};
pub use driver::{DragEvent, DragPhase, SessionEvent, SessionHandle, spawn_session};
pub use error::{SessionClosed, SessionError};
pub use marker::{Marker, Role};
pub use retry::RetryPolicy;
pub use throttle::DragThrottle;
