use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

fn from_parts(
    status: StatusCode,
    code: &str,
    detail: impl Into<String>,
    instance: &str,
    request_id: Option<&str>,
) -> ProblemResponse {
    let problem = Problem::from_status(status, detail)
        .with_code(code)
        .with_instance(instance);
    match request_id {
        Some(id) => problem.with_request_id(id).into(),
        None => problem.into(),
    }
}

/// Map a domain error to an RFC 9457 response.
pub fn map_domain_error(e: &DomainError, instance: &str, request_id: Option<&str>) -> ProblemResponse {
    match e {
        DomainError::EventNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "EVENT_NOT_FOUND",
            format!("Event {id} was not found"),
            instance,
            request_id,
        ),
        DomainError::AccountNotFound { .. } | DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
            "Sign in to access this resource",
            instance,
            request_id,
        ),
        DomainError::Forbidden { reason } => from_parts(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            reason.clone(),
            instance,
            request_id,
        ),
        DomainError::EmailAlreadyRegistered { .. } => from_parts(
            StatusCode::CONFLICT,
            "EMAIL_CONFLICT",
            e.to_string(),
            instance,
            request_id,
        ),
        DomainError::Validation { field, message } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "VALIDATION",
                e.to_string(),
                instance,
                request_id,
            );
            resp.0 = resp.0.with_errors(vec![ValidationError {
                field: field.clone(),
                detail: message.clone(),
            }]);
            resp
        }
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "internal error in JSON API");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "An internal error occurred",
                instance,
                request_id,
            )
        }
    }
}
