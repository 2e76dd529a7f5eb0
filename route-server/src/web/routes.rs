//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use geo::Point;
use tracing::warn;

use crate::session::{SessionClosed, SessionEvent};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", get(session_state))
        .route("/session/drag", post(drag_marker))
        .route("/session/filters", post(set_filters))
        .route("/session/itinerary", get(itinerary))
        .route("/session/hover", get(hover))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn position(x: f64, y: f64) -> Result<Point, AppError> {
    if x.is_finite() && y.is_finite() {
        Ok(Point::new(x, y))
    } else {
        Err(AppError::BadRequest {
            message: format!("Invalid position: ({x}, {y})"),
        })
    }
}

/// Current session state.
async fn session_state(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse::from_snapshot(&state.session.snapshot()))
}

/// Queue a marker drag event.
async fn drag_marker(
    State(state): State<AppState>,
    Json(req): Json<DragRequest>,
) -> Result<StatusCode, AppError> {
    position(req.x, req.y)?;
    state.session.send(req.into_event()).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Replace the mode and year filters.
async fn set_filters(
    State(state): State<AppState>,
    Json(req): Json<FiltersRequest>,
) -> Result<StatusCode, AppError> {
    state
        .session
        .send(SessionEvent::SetFilters(req.into_filters()))
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// The itinerary of the displayed route.
async fn itinerary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let snapshot = state.session.snapshot();

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let message = snapshot
            .last_error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "No route selected".to_string());

        let template = ItineraryTemplate::new(snapshot.itinerary(), message);
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

        Ok(Html(html).into_response())
    } else {
        let route = snapshot.route.as_ref().ok_or_else(|| AppError::NotFound {
            message: "No route is displayed".to_string(),
        })?;

        Ok(Json(ItineraryResult::from_itinerary(&route.itinerary)).into_response())
    }
}

/// Tooltip for the route edge under the pointer.
async fn hover(
    State(state): State<AppState>,
    Query(req): Query<HoverRequest>,
) -> Result<Response, AppError> {
    let point = position(req.x, req.y)?;

    Ok(match state.session.hover(point) {
        Some(tooltip) => Json(tooltip).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SessionClosed> for AppError {
    fn from(e: SessionClosed) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
