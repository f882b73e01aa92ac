use axum::extract::{Path, State};
use axum::http::Uri;
use axum::Json;
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use super::dto::{EventDto, GuestDto, RsvpListDto};
use super::error::map_domain_error;
use crate::api::extract::{CurrentUser, RequestId};
use crate::api::state::AppState;
use crate::contract::model::EventId;
use crate::domain::error::DomainError;

fn problem(e: &DomainError, uri: &Uri, rid: &RequestId) -> ProblemResponse {
    map_domain_error(e, uri.path(), rid.0.as_deref())
}

pub async fn list_events(
    State(state): State<AppState>,
    rid: RequestId,
    uri: Uri,
) -> Result<Json<Vec<EventDto>>, ProblemResponse> {
    match state.service.list_events().await {
        Ok(events) => Ok(Json(
            events
                .into_iter()
                .map(|e| EventDto::from_event(e, &state.base_url))
                .collect(),
        )),
        Err(e) => {
            error!("Failed to list events: {}", e);
            Err(problem(&e, &uri, &rid))
        }
    }
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    rid: RequestId,
    uri: Uri,
) -> Result<Json<EventDto>, ProblemResponse> {
    info!("Getting event with id: {}", id);
    match state.service.event(id).await {
        Ok(event) => Ok(Json(EventDto::from_event(event, &state.base_url))),
        Err(e) => Err(problem(&e, &uri, &rid)),
    }
}

/// Guest list with RSVP totals; requires a session that may manage the event.
pub async fn list_rsvps(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
    rid: RequestId,
    uri: Uri,
) -> Result<Json<RsvpListDto>, ProblemResponse> {
    let Some(actor) = user.account() else {
        return Err(problem(&DomainError::InvalidCredentials, &uri, &rid));
    };
    match state.service.guest_list(actor, id).await {
        Ok((guests, stats)) => Ok(Json(RsvpListDto {
            event_id: id,
            stats: stats.into(),
            guests: guests.into_iter().map(GuestDto::from).collect(),
        })),
        Err(e) => Err(problem(&e, &uri, &rid)),
    }
}
