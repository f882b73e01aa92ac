use std::sync::Arc;

use crate::domain::service::Service;
use crate::infra::auth::SessionStore;
use crate::infra::preview::PreviewRenderer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub sessions: SessionStore,
    pub previews: PreviewRenderer,
    /// Public URL without a trailing slash.
    pub base_url: Arc<str>,
}
