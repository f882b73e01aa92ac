//! Small read-only JSON API with problem+json errors.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
