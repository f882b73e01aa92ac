use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use modkit::XRequestId;
use tracing::debug;

use super::state::AppState;
use crate::contract::model::Account;
use crate::infra::auth::SESSION_COOKIE;

/// Account behind the `session_id` cookie, if the session is still live.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Account>);

impl CurrentUser {
    pub fn account(&self) -> Option<&Account> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(Self(None));
        };
        let Some(account_id) = state.sessions.resolve(&token).await else {
            return Ok(Self(None));
        };
        match state.service.account(account_id).await {
            Ok(account) => Ok(Self(Some(account))),
            Err(e) => {
                debug!(account_id, error = %e, "session refers to a missing account");
                state.sessions.revoke(&token).await;
                Ok(Self(None))
            }
        }
    }
}

/// Request id set by the HTTP layer stack, when present.
#[derive(Debug, Clone, Default)]
pub struct RequestId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<XRequestId>()
                .map(|XRequestId(id)| id.clone()),
        ))
    }
}
