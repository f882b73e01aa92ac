//! Error type for HTML handlers, rendered as a themed error page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::views::error_page;
use crate::domain::error::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Visitor must sign in first; answered with a redirect.
    #[error("login required")]
    LoginRequired,

    #[error("forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<DomainError> for PageError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EventNotFound { .. } => Self::NotFound("Event not found".into()),
            DomainError::AccountNotFound { .. } => Self::LoginRequired,
            DomainError::Forbidden { .. } => Self::Forbidden,
            DomainError::InvalidCredentials => Self::LoginRequired,
            DomainError::EmailAlreadyRegistered { .. } | DomainError::Validation { .. } => {
                Self::BadRequest(e.to_string())
            }
            DomainError::Database { .. } | DomainError::Internal { .. } => {
                Self::Internal(anyhow::anyhow!(e))
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            Self::LoginRequired => return Redirect::to("/login").into_response(),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg.clone()),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                "Admin access required".to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.clone()),
            Self::Internal(err) => {
                tracing::error!(error = %format!("{err:#}"), "page handler failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "Something went wrong. Please try again later.".to_string(),
                )
            }
        };
        (status, Html(error_page(title, &message).into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn domain_errors_map_to_statuses() {
        let resp = PageError::from(DomainError::event_not_found(4)).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = PageError::from(DomainError::forbidden("no")).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = PageError::from(DomainError::validation("title", "empty")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = PageError::from(DomainError::database("disk full")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn login_required_redirects() {
        let resp = PageError::LoginRequired.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/login");
    }
}
