pub mod extract;
pub mod pages;
pub mod rest;
pub mod state;

use std::path::Path;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;

use pages::handlers as page;
pub use state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found() -> pages::PageError {
    pages::PageError::NotFound("Page not found".into())
}

/// Every route of the invite site: pages, forms, images, the JSON API and
/// static files under `/static`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(page::home))
        .route("/event/{id}", get(page::event_page).post(page::event_post))
        .route("/event/{id}/preview.png", get(page::preview_image))
        .route(
            "/anonymous-rsvp/{id}",
            get(page::anonymous_form).post(page::anonymous_submit),
        )
        .route("/rsvp-thanks/{id}", get(page::thanks))
        .route("/calendar/{id}", get(page::calendar))
        .route("/login", get(page::login_form).post(page::login_submit))
        .route("/register", get(page::register_form).post(page::register_submit))
        .route("/logout", get(page::logout))
        .route("/admin", get(page::admin_home))
        .route("/admin/events", post(page::admin_create))
        .route("/admin/event/{id}", get(page::admin_event).post(page::admin_update))
        .route("/admin/event/{id}/delete", post(page::admin_delete))
        .route("/health", get(health))
        .merge(rest::routes::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}
