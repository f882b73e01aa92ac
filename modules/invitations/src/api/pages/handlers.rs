use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{debug, info};

use super::error::PageError;
use super::forms::{
    parse_party, AnonymousRsvpForm, EventForm, EventPostForm, EventQuery, LoginForm,
    PrefillQuery, RegisterForm,
};
use super::views::{self, AdminEventPage, AnonymousFormValues, Banner, EventPage};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::contract::model::{
    Account, AnonymousRsvp, Delivery, EventId, PartySize, RsvpResponse,
};
use crate::domain::error::DomainError;
use crate::infra::auth::SESSION_COOKIE;

const MISSING_RSVP_FIELDS: &str =
    "Please fill in your name, phone number, and select an RSVP option.";
const BAD_PARTY_SIZE: &str = "Please enter whole numbers for adults and kids.";

fn html(markup: maud::Markup) -> Html<String> {
    Html(markup.into_string())
}

/// Where to send the guest after a recorded RSVP.
fn rsvp_redirect(event_id: EventId, response: RsvpResponse, delivery: &Delivery) -> Redirect {
    let mut location = format!("/event/{event_id}?rsvp_success={response}");
    if delivery.is_failed() {
        location.push_str("&email=failed");
    }
    Redirect::to(&location)
}

fn banners(query: &EventQuery) -> Vec<Banner> {
    let mut out = Vec::new();
    match query.rsvp_success.as_deref().and_then(|r| r.parse().ok()) {
        Some(RsvpResponse::Yes) => out.push(Banner::success(
            "Thank you! Your RSVP has been recorded. We can't wait to celebrate with you!",
        )),
        Some(RsvpResponse::No) => out.push(Banner::success(
            "Thank you for letting us know. You'll be missed!",
        )),
        Some(RsvpResponse::Maybe) => out.push(Banner::success(
            "Thanks! We've noted that you might be able to come.",
        )),
        None => {}
    }
    if query.email.as_deref() == Some("failed") {
        out.push(Banner::warning(
            "Your RSVP was saved, but the confirmation email could not be sent.",
        ));
    }
    out
}

/// Field-level message for a validation failure, `None` for other errors.
fn validation_message(e: &DomainError) -> Option<String> {
    match e {
        DomainError::Validation { field, message } => {
            Some(format!("{} {message}.", field.replace('_', " ")))
        }
        _ => None,
    }
}

/// Quantities only matter for `yes`; other answers ignore the fields.
fn party_for(response: RsvpResponse, adults: Option<&str>, kids: Option<&str>) -> Option<PartySize> {
    match response {
        RsvpResponse::Yes => parse_party(adults, kids),
        RsvpResponse::No | RsvpResponse::Maybe => Some(PartySize::default()),
    }
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.base_url.starts_with("https://"))
        .build()
}

async fn sign_in(state: &AppState, jar: CookieJar, account: &Account) -> Result<Response, PageError> {
    let token = state.sessions.create(account.id).await?;
    info!(account_id = account.id, "signed in");
    Ok((jar.add(session_cookie(state, token)), Redirect::to("/")).into_response())
}

fn require_admin(user: &CurrentUser) -> Result<&Account, PageError> {
    match user.account() {
        None => Err(PageError::LoginRequired),
        Some(account) if account.is_admin => Ok(account),
        Some(_) => Err(PageError::Forbidden),
    }
}

fn require_login(user: &CurrentUser) -> Result<&Account, PageError> {
    user.account().ok_or(PageError::LoginRequired)
}

// ------------------------------------------------------------------ invite

pub async fn home(State(state): State<AppState>) -> Result<Redirect, PageError> {
    match state.service.first_event().await? {
        Some(event) => Ok(Redirect::to(&format!("/event/{}", event.id))),
        None => Err(PageError::NotFound("No events have been created yet.".into())),
    }
}

pub async fn event_page(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
    Query(query): Query<EventQuery>,
) -> Result<Html<String>, PageError> {
    let event = state.service.event(id).await?;
    let rsvp = match user.account() {
        Some(account) => state.service.account_rsvp(id, account.id).await?,
        None => None,
    };
    let comments = state.service.comments(id).await?;
    let can_manage = user
        .account()
        .is_some_and(|a| a.is_admin || event.owner_id == Some(a.id));
    let banners = banners(&query);

    Ok(html(views::event_page(&EventPage {
        event: &event,
        user: user.account(),
        can_manage,
        rsvp: rsvp.as_ref(),
        comments: &comments,
        banners: &banners,
        base_url: &state.base_url,
        now: Utc::now(),
    })))
}

pub async fn event_post(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
    Form(form): Form<EventPostForm>,
) -> Result<Redirect, PageError> {
    match form.action.as_str() {
        "rsvp" => {
            let Some(account) = user.account() else {
                return Ok(Redirect::to(&format!("/anonymous-rsvp/{id}")));
            };
            let response: RsvpResponse = form
                .response
                .as_deref()
                .and_then(|r| r.parse().ok())
                .ok_or_else(|| PageError::BadRequest("Please select an RSVP option.".into()))?;
            let party = party_for(response, form.adults_qty.as_deref(), form.kids_qty.as_deref())
                .ok_or_else(|| PageError::BadRequest(BAD_PARTY_SIZE.into()))?;

            let receipt = state
                .service
                .submit_account_rsvp(account, id, response, party)
                .await?;
            Ok(rsvp_redirect(id, response, &receipt.delivery))
        }
        "comment" => {
            let body = form.comment.unwrap_or_default();
            let name = form.comment_name.unwrap_or_default();
            match state
                .service
                .add_comment(id, user.account(), &name, &body)
                .await
            {
                Ok(comment) => debug!(comment_id = comment.id, "comment added"),
                Err(e @ DomainError::Validation { .. }) => {
                    debug!(error = %e, "comment ignored");
                }
                Err(e) => return Err(e.into()),
            }
            Ok(Redirect::to(&format!("/event/{id}#comments")))
        }
        other => Err(PageError::BadRequest(format!("Unknown action '{other}'."))),
    }
}

pub async fn anonymous_form(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Query(prefill): Query<PrefillQuery>,
) -> Result<Html<String>, PageError> {
    let event = state.service.event(id).await?;
    let values = AnonymousFormValues {
        name: prefill.name,
        email: prefill.email,
        phone: prefill.phone,
        response: None,
        adults: "1".into(),
        kids: "0".into(),
    };
    Ok(html(views::anonymous_rsvp_page(&event, &values, None)))
}

pub async fn anonymous_submit(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Form(form): Form<AnonymousRsvpForm>,
) -> Result<Response, PageError> {
    let event = state.service.event(id).await?;
    let response: Option<RsvpResponse> = form.rsvp.as_deref().and_then(|r| r.parse().ok());
    let values = AnonymousFormValues {
        name: form.guest_name.clone(),
        email: form.guest_email.clone(),
        phone: form.guest_phone.clone(),
        response,
        adults: form.adults_qty.clone().unwrap_or_else(|| "1".into()),
        kids: form.kids_qty.clone().unwrap_or_else(|| "0".into()),
    };
    let rerender = |message: &str| {
        html(views::anonymous_rsvp_page(&event, &values, Some(message))).into_response()
    };

    let Some(response) = response else {
        return Ok(rerender(MISSING_RSVP_FIELDS));
    };
    if form.guest_name.trim().is_empty() || form.guest_phone.trim().is_empty() {
        return Ok(rerender(MISSING_RSVP_FIELDS));
    }
    let Some(party) = party_for(response, form.adults_qty.as_deref(), form.kids_qty.as_deref())
    else {
        return Ok(rerender(BAD_PARTY_SIZE));
    };

    let submission = AnonymousRsvp {
        name: form.guest_name,
        email: Some(form.guest_email),
        phone: form.guest_phone,
        response,
        party,
    };
    match state.service.submit_anonymous_rsvp(id, submission).await {
        Ok(receipt) => Ok(rsvp_redirect(id, response, &receipt.delivery).into_response()),
        Err(e) => match validation_message(&e) {
            Some(message) => Ok(rerender(&message)),
            None => Err(e.into()),
        },
    }
}

pub async fn thanks(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Html<String>, PageError> {
    let event = state.service.event(id).await?;
    Ok(html(views::thanks_page(&event)))
}

pub async fn calendar(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Response, PageError> {
    let ics = state.service.calendar_export(id).await?;
    let disposition = format!("attachment; filename=\"event_{id}.ics\"");
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/calendar; charset=utf-8"),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition).map_err(anyhow::Error::from)?,
        ),
    ];
    Ok((StatusCode::OK, headers, ics).into_response())
}

pub async fn preview_image(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Response, PageError> {
    let event = state.service.event(id).await?;
    let png = state.previews.render(&event).await?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ),
    ];
    Ok((StatusCode::OK, headers, Bytes::copy_from_slice(&png)).into_response())
}

// ------------------------------------------------------------------ accounts

pub async fn login_form() -> Html<String> {
    html(views::login_page("", None))
}

pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.service.authenticate(&form.email, &form.password).await {
        Ok(account) => sign_in(&state, jar, &account).await,
        Err(DomainError::InvalidCredentials) => Ok(html(views::login_page(
            form.email.trim(),
            Some("Invalid email or password."),
        ))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn register_form() -> Html<String> {
    html(views::register_page("", "", None))
}

pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let rerender = |message: &str| {
        html(views::register_page(form.name.trim(), form.email.trim(), Some(message)))
            .into_response()
    };
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(rerender("Please fill all fields."));
    }

    match state
        .service
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(account) => sign_in(&state, jar, &account).await,
        Err(DomainError::EmailAlreadyRegistered { .. }) => Ok(rerender("Email already registered.")),
        Err(e) => match validation_message(&e) {
            Some(message) => Ok(rerender(&message)),
            None => Err(e.into()),
        },
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.revoke(cookie.value()).await;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/")).into_response()
}

// ------------------------------------------------------------------ admin

pub async fn admin_home(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, PageError> {
    let actor = require_admin(&user)?;
    let events = state.service.list_events().await?;
    Ok(html(views::admin_list_page(actor, &events, None)))
}

pub async fn admin_create(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<EventForm>,
) -> Result<Response, PageError> {
    let actor = require_admin(&user)?;
    match state.service.create_event(actor, form.into_draft("")).await {
        Ok(event) => Ok(Redirect::to(&format!("/admin/event/{}", event.id)).into_response()),
        Err(e) => match validation_message(&e) {
            Some(message) => {
                let events = state.service.list_events().await?;
                Ok(html(views::admin_list_page(actor, &events, Some(&message))).into_response())
            }
            None => Err(e.into()),
        },
    }
}

pub async fn admin_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
) -> Result<Html<String>, PageError> {
    let actor = require_login(&user)?;
    let event = state.service.event(id).await?;
    let (guests, stats) = state.service.guest_list(actor, id).await?;
    Ok(html(views::admin_event_page(&AdminEventPage {
        user: actor,
        event: &event,
        guests: &guests,
        stats,
        error: None,
    })))
}

pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
    Form(form): Form<EventForm>,
) -> Result<Response, PageError> {
    let actor = require_login(&user)?;
    let event = state.service.event(id).await?;
    let draft = form.into_draft(&event.header_image);

    match state.service.update_event(actor, id, draft).await {
        Ok(_) => Ok(Redirect::to(&format!("/event/{id}")).into_response()),
        Err(e) => match validation_message(&e) {
            Some(message) => {
                let (guests, stats) = state.service.guest_list(actor, id).await?;
                Ok(html(views::admin_event_page(&AdminEventPage {
                    user: actor,
                    event: &event,
                    guests: &guests,
                    stats,
                    error: Some(&message),
                }))
                .into_response())
            }
            None => Err(e.into()),
        },
    }
}

pub async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    user: CurrentUser,
) -> Result<Redirect, PageError> {
    let actor = require_login(&user)?;
    state.service.delete_event(actor, id).await?;
    Ok(Redirect::to("/admin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_follow_query() {
        let q = EventQuery {
            rsvp_success: Some("yes".into()),
            email: Some("failed".into()),
        };
        let b = banners(&q);
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].kind, "success");
        assert_eq!(b[1].kind, "warning");

        assert!(banners(&EventQuery::default()).is_empty());
        let junk = EventQuery {
            rsvp_success: Some("<script>".into()),
            email: None,
        };
        assert!(banners(&junk).is_empty());
    }

    #[test]
    fn party_fields_only_read_for_yes() {
        assert_eq!(
            party_for(RsvpResponse::No, Some(""), Some("x")),
            Some(PartySize::default())
        );
        assert_eq!(
            party_for(RsvpResponse::Maybe, Some("abc"), None),
            Some(PartySize::default())
        );
        assert_eq!(party_for(RsvpResponse::Yes, Some("abc"), None), None);
        assert_eq!(
            party_for(RsvpResponse::Yes, Some("2"), Some("1")),
            Some(PartySize { adults: 2, kids: 1 })
        );
    }

    #[test]
    fn failed_delivery_is_flagged_in_redirect() {
        let resp = rsvp_redirect(
            3,
            RsvpResponse::No,
            &Delivery::Failed {
                reason: "timeout".into(),
            },
        )
        .into_response();
        assert_eq!(
            resp.headers()[header::LOCATION],
            "/event/3?rsvp_success=no&email=failed"
        );

        let resp = rsvp_redirect(3, RsvpResponse::Yes, &Delivery::Disabled).into_response();
        assert_eq!(resp.headers()[header::LOCATION], "/event/3?rsvp_success=yes");
    }
}
