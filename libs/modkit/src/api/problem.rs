use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details body returned by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// Machine-readable error code, e.g. `EVENT_NOT_FOUND`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
            errors: None,
        }
    }

    /// Problem titled with the status' canonical reason phrase.
    pub fn from_status(status: StatusCode, detail: impl Into<String>) -> Self {
        let title = status.canonical_reason().unwrap_or("Error");
        Self::new(status, title, detail)
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = (!errors.is_empty()).then_some(errors);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::BAD_REQUEST, detail).into()
}

pub fn unauthorized(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::UNAUTHORIZED, detail).into()
}

pub fn forbidden(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::FORBIDDEN, detail).into()
}

pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::NOT_FOUND, detail).into()
}

pub fn conflict(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::CONFLICT, detail).into()
}

pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::from_status(StatusCode::INTERNAL_SERVER_ERROR, detail).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let resp = bad_request("invalid payload").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let ct = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn empty_optional_members_are_omitted() {
        let p = Problem::from_status(StatusCode::NOT_FOUND, "Event 7 not found");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["title"], "Not Found");
        assert!(json.get("code").is_none());
        assert!(json.get("request_id").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn builder_fills_optional_members() {
        let p = Problem::from_status(StatusCode::UNPROCESSABLE_ENTITY, "invalid RSVP")
            .with_code("VALIDATION")
            .with_instance("/api/v1/events/1/rsvps")
            .with_request_id("req-1")
            .with_errors(vec![ValidationError {
                field: "adults".into(),
                detail: "must be at least 1".into(),
            }]);

        assert_eq!(p.status, 422);
        assert_eq!(p.title, "Unprocessable Entity");
        assert_eq!(p.request_id.as_deref(), Some("req-1"));
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn empty_error_list_is_dropped() {
        let p = Problem::from_status(StatusCode::BAD_REQUEST, "x").with_errors(vec![]);
        assert!(p.errors.is_none());
    }

    #[test]
    fn convenience_constructors() {
        assert_eq!(unauthorized("login").0.status, 401);
        assert_eq!(forbidden("admin only").0.status, 403);
        assert_eq!(not_found("missing").0.title, "Not Found");
        assert_eq!(conflict("taken").0.status, 409);
        assert_eq!(internal_error("boom").0.title, "Internal Server Error");
    }
}
