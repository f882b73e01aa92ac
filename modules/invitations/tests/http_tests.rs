//! End-to-end checks through the axum router with `oneshot`.

mod common;

use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use common::{test_service, test_state, RecordingNotifier};
use invitations::api;
use modkit::HttpLayers;

async fn app_with(notifier: std::sync::Arc<RecordingNotifier>) -> Router {
    let service = test_service(notifier).await;
    let state = test_state(service);
    HttpLayers::default().apply(api::router(state, Path::new("tests/static")))
}

async fn app() -> Router {
    app_with(RecordingNotifier::sending()).await
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::get(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

async fn text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

/// `session_id=<token>` from a login or register response.
fn session_cookie(resp: &Response) -> String {
    let raw = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

/// Registers the admin and creates one event; returns the cookie and event id.
async fn admin_with_event(app: &Router) -> (String, i32) {
    let resp = send(
        app,
        post_form("/register", "name=Maya&email=maya%40example.com&password=pw", None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp);

    let resp = send(
        app,
        post_form(
            "/admin/events",
            "title=Garden+Party&host=Maya&datetime=2025-10-04T11%3A00&location=Hall&description=Cake&registry1=&registry2=&card_theme=forest",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let id = location(&resp)
        .trim_start_matches("/admin/event/")
        .parse()
        .unwrap();
    (cookie, id)
}

#[tokio::test]
async fn health_is_ok() {
    let app = app().await;
    let resp = send(&app, get("/health", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(text(resp).await.contains("ok"));
}

#[tokio::test]
async fn home_redirects_to_first_event() {
    let app = app().await;
    let resp = send(&app, get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let (_, id) = admin_with_event(&app).await;
    let resp = send(&app, get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/event/{id}"));
}

#[tokio::test]
async fn invite_page_renders_details_and_og_tags() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;

    let resp = send(&app, get(&format!("/event/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = text(resp).await;
    assert!(html.contains("Garden Party"));
    assert!(html.contains("Saturday, October 4, 2025"));
    assert!(html.contains(&format!("http://invite.test/event/{id}/preview.png")));
    assert!(html.contains(&format!("/anonymous-rsvp/{id}")));
    assert!(html.contains(&format!("/calendar/{id}")));
}

#[tokio::test]
async fn unknown_event_is_404() {
    let app = app().await;
    let resp = send(&app, get("/event/999", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(text(resp).await.contains("Event not found"));
}

#[tokio::test]
async fn anonymous_rsvp_flow() {
    let notifier = RecordingNotifier::sending();
    let app = app_with(notifier.clone()).await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        get(&format!("/anonymous-rsvp/{id}?name=Ana&phone=555-0100"), None),
    )
    .await;
    let html = text(resp).await;
    assert!(html.contains(r#"value="Ana""#));
    assert!(html.contains(r#"value="555-0100""#));

    let resp = send(
        &app,
        post_form(
            &format!("/anonymous-rsvp/{id}"),
            "guest_name=Ana&guest_email=&guest_phone=555-0100&rsvp=yes&adults_qty=2&kids_qty=1",
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/event/{id}?rsvp_success=yes"));
    assert!(notifier.recorded()[0].anonymous);

    let resp = send(&app, get(&format!("/admin/event/{id}"), Some(&cookie))).await;
    let html = text(resp).await;
    assert!(html.contains("Ana"));
    assert!(html.contains("Anonymous"));
}

#[tokio::test]
async fn anonymous_rsvp_missing_fields_rerenders_form() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form(
            &format!("/anonymous-rsvp/{id}"),
            "guest_name=Ana&guest_phone=&adults_qty=1&kids_qty=0",
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = text(resp).await;
    assert!(html.contains("Please fill in your name, phone number, and select an RSVP option."));
    assert!(html.contains(r#"value="Ana""#));
}

#[tokio::test]
async fn email_failure_still_records_and_warns() {
    let app = app_with(RecordingNotifier::failing()).await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form(
            &format!("/event/{id}"),
            "action=rsvp&response=yes&adults_qty=2&kids_qty=0",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let next = location(&resp).to_string();
    assert_eq!(next, format!("/event/{id}?rsvp_success=yes&email=failed"));

    let html = text(send(&app, get(&next, Some(&cookie))).await).await;
    assert!(html.contains("could not be sent"));
    assert!(html.contains("Your RSVP: "));
    assert!(html.contains("2 adult(s)"));
}

#[tokio::test]
async fn signed_out_rsvp_goes_to_anonymous_form() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;
    let resp = send(
        &app,
        post_form(&format!("/event/{id}"), "action=rsvp&response=yes", None),
    )
    .await;
    assert_eq!(location(&resp), format!("/anonymous-rsvp/{id}"));
}

#[tokio::test]
async fn admin_edits_show_on_invite_page() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form(
            &format!("/admin/event/{id}"),
            "title=Harvest+Brunch&host=Maya&datetime=2025-11-01T10%3A30&location=Orchard&description=Pancakes&registry1=https%3A%2F%2Fregistry.example%2Fmaya&registry2=&card_theme=sunset",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/event/{id}"));

    let html = text(send(&app, get(&format!("/event/{id}"), None)).await).await;
    assert!(html.contains("Harvest Brunch"));
    assert!(html.contains("Orchard"));
    assert!(html.contains("Saturday, November 1, 2025"));
    assert!(html.contains("https://registry.example/maya"));
    assert!(!html.contains("Garden Party"));
}

#[tokio::test]
async fn admin_pages_require_admin() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;

    let resp = send(&app, get(&format!("/admin/event/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = send(
        &app,
        post_form("/register", "name=Leo&email=leo%40example.com&password=pw", None),
    )
    .await;
    let guest = session_cookie(&resp);

    let resp = send(&app, get("/admin", Some(&guest))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(text(resp).await.contains("Admin access required"));

    let resp = send(&app, get(&format!("/admin/event/{id}"), Some(&guest))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_and_logout() {
    let app = app().await;
    admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form("/login", "email=maya%40example.com&password=wrong", None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("Invalid email or password."));

    let resp = send(
        &app,
        post_form("/login", "email=maya%40example.com&password=pw", None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp);
    assert!(cookie.starts_with("session_id="));
    assert_eq!(send(&app, get("/admin", Some(&cookie))).await.status(), StatusCode::OK);

    let resp = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = send(&app, get("/admin", Some(&cookie))).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn duplicate_registration_is_reported() {
    let app = app().await;
    admin_with_event(&app).await;
    let resp = send(
        &app,
        post_form("/register", "name=Imposter&email=MAYA%40example.com&password=pw", None),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("Email already registered."));

    let resp = send(&app, post_form("/register", "name=&email=&password=", None)).await;
    assert!(text(resp).await.contains("Please fill all fields."));
}

#[tokio::test]
async fn comments_appear_on_page() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;
    let resp = send(
        &app,
        post_form(
            &format!("/event/{id}"),
            "action=comment&comment=Bringing+lemonade&comment_name=Ana",
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let html = text(send(&app, get(&format!("/event/{id}"), None)).await).await;
    assert!(html.contains("Bringing lemonade"));
    assert!(html.contains("just now"));
}

#[tokio::test]
async fn calendar_download() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;
    let resp = send(&app, get(&format!("/calendar/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/calendar; charset=utf-8"
    );
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"event_{id}.ics\"").as_str()
    );
    let ics = text(resp).await;
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.contains("DTSTART:20251004T110000"));
}

#[tokio::test]
async fn preview_is_a_1200x630_png() {
    let app = app().await;
    let (_, id) = admin_with_event(&app).await;
    let resp = send(&app, get(&format!("/event/{id}/preview.png"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(u32::from_be_bytes(bytes[16..20].try_into().unwrap()), 1200);
    assert_eq!(u32::from_be_bytes(bytes[20..24].try_into().unwrap()), 630);
}

#[tokio::test]
async fn json_api_lists_events_and_guards_rsvps() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(&app, get("/api/v1/events", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let events: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(events[0]["title"], "Garden Party");
    assert_eq!(events[0]["card_theme"], "forest");

    let resp = send(&app, get(&format!("/api/v1/events/{id}/rsvps"), None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
    let problem: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert!(problem["request_id"].is_string());

    let resp = send(&app, get(&format!("/api/v1/events/{id}/rsvps"), Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(list["event_id"], id);

    let resp = send(&app, get("/api/v1/events/404", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let problem: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(problem["code"], "EVENT_NOT_FOUND");
}

#[tokio::test]
async fn static_files_are_served() {
    let app = app().await;
    let resp = send(&app, get("/static/css/style.css", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&app, get("/static/missing.css", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn declining_ignores_party_fields() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form(
            &format!("/event/{id}"),
            "action=rsvp&response=no&adults_qty=&kids_qty=x",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/event/{id}?rsvp_success=no"));

    let resp = send(
        &app,
        post_form(
            &format!("/anonymous-rsvp/{id}"),
            "guest_name=Ana&guest_phone=555-0100&rsvp=no&adults_qty=abc&kids_qty=0",
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/event/{id}?rsvp_success=no"));

    let resp = send(&app, get(&format!("/api/v1/events/{id}/rsvps"), Some(&cookie))).await;
    let list: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(list["stats"]["not_attending"], 2);
    assert_eq!(list["stats"]["headcount"], 0);
    for guest in list["guests"].as_array().unwrap() {
        assert_eq!(guest["response"], "no");
        assert_eq!(guest["adults"], 1);
        assert_eq!(guest["kids"], 0);
    }
}

#[tokio::test]
async fn accepting_still_requires_whole_numbers() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;

    let resp = send(
        &app,
        post_form(
            &format!("/anonymous-rsvp/{id}"),
            "guest_name=Ana&guest_phone=555-0100&rsvp=yes&adults_qty=abc&kids_qty=0",
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("Please enter whole numbers for adults and kids."));

    let resp = send(
        &app,
        post_form(
            &format!("/event/{id}"),
            "action=rsvp&response=yes&adults_qty=2&kids_qty=x",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_page_shows_expected_headcount() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;
    send(
        &app,
        post_form(
            &format!("/event/{id}"),
            "action=rsvp&response=yes&adults_qty=2&kids_qty=3",
            Some(&cookie),
        ),
    )
    .await;

    let html = text(send(&app, get(&format!("/admin/event/{id}"), Some(&cookie))).await).await;
    assert!(html.contains("5</strong> expected in total"));
}

#[tokio::test]
async fn delete_event_route() {
    let app = app().await;
    let (cookie, id) = admin_with_event(&app).await;
    let delete = format!("/admin/event/{id}/delete");

    let resp = send(&app, post_form(&delete, "", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = send(
        &app,
        post_form("/register", "name=Leo&email=leo%40example.com&password=pw", None),
    )
    .await;
    let guest = session_cookie(&resp);
    let resp = send(&app, post_form(&delete, "", Some(&guest))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        send(&app, get(&format!("/event/{id}"), None)).await.status(),
        StatusCode::OK
    );

    let resp = send(&app, post_form(&delete, "", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
    assert_eq!(
        send(&app, get(&format!("/event/{id}"), None)).await.status(),
        StatusCode::NOT_FOUND
    );
}
