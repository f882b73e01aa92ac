use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use super::request_id::{create_trace_layer, header, push_req_id_to_extensions, MakeReqId};

/// Standard middleware stack wrapped around every router the server exposes.
#[derive(Debug, Clone)]
pub struct HttpLayers {
    /// Handler timeout; `None` disables it.
    pub timeout: Option<Duration>,
    pub body_limit_bytes: usize,
    pub cors_enabled: bool,
}

impl Default for HttpLayers {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            body_limit_bytes: 2 * 1024 * 1024,
            cors_enabled: false,
        }
    }
}

impl HttpLayers {
    pub fn from_timeout_secs(timeout_sec: u64) -> Self {
        Self {
            timeout: (timeout_sec > 0).then(|| Duration::from_secs(timeout_sec)),
            ..Self::default()
        }
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Layers are listed innermost first; the request id is set before anything else sees the request.
    pub fn apply(&self, mut router: Router) -> Router {
        router = router.layer(RequestBodyLimitLayer::new(self.body_limit_bytes));

        if self.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        let x_request_id = header();
        router
            .layer(create_trace_layer())
            .layer(from_fn(push_req_id_to_extensions))
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, MakeReqId))
    }
}
