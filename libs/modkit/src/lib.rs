//! Shared HTTP plumbing for the server: RFC 9457 problem responses,
//! request-id propagation, the standard middleware stack and the
//! serve/shutdown loop.

pub mod api;
pub mod http;
pub mod runtime;

pub use api::problem::{Problem, ProblemResponse, ValidationError, APPLICATION_PROBLEM_JSON};
pub use http::layers::HttpLayers;
pub use http::request_id::XRequestId;
pub use runtime::{serve, wait_for_shutdown};
