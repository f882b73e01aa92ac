use axum::routing::get;
use axum::Router;

use super::handlers;
use crate::api::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/events", get(handlers::list_events))
        .route("/api/v1/events/{id}", get(handlers::get_event))
        .route("/api/v1/events/{id}/rsvps", get(handlers::list_rsvps))
}
