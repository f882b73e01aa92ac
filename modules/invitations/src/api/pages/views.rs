//! Page bodies. Every function here is pure: handlers gather the data and
//! these turn it into markup.

use chrono::{DateTime, Utc};
use maud::{html, Markup};

use super::components::{banner, is_safe_url, page_shell, truncate, OpenGraph};
use crate::contract::model::{
    Account, CardTheme, Comment, Event, Guest, Rsvp, RsvpResponse, RsvpStats,
};
use crate::domain::calendar::calendar_links;
use crate::domain::display::{display_starts_at, time_ago};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: &'static str,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: "warning",
            message: message.into(),
        }
    }
}

pub struct EventPage<'a> {
    pub event: &'a Event,
    pub user: Option<&'a Account>,
    pub can_manage: bool,
    pub rsvp: Option<&'a Rsvp>,
    pub comments: &'a [Comment],
    pub banners: &'a [Banner],
    pub base_url: &'a str,
    pub now: DateTime<Utc>,
}

/// Values echoed back into the anonymous RSVP form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnonymousFormValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub response: Option<RsvpResponse>,
    pub adults: String,
    pub kids: String,
}

fn event_details(event: &Event) -> Markup {
    let when = display_starts_at(&event.starts_at);
    html! {
        @if !event.header_image.is_empty() {
            img class="header-image" src={ "/static/images/" (event.header_image) } alt=(event.title);
        }
        div class="eyebrow" { "You're invited" }
        h1 { (event.title) }
        div class="meta" {
            @if !event.host.is_empty() {
                p { strong { "Hosted by " } (event.host) }
            }
            p { strong { "Date: " } (when.date) }
            @if !when.time.is_empty() {
                p { strong { "Time: " } (when.time) }
            }
            @if !event.location.is_empty() {
                p { strong { "Location: " } (event.location) }
            }
        }
    }
}

fn calendar_section(event: &Event) -> Markup {
    html! {
        @if let Some(links) = calendar_links(event) {
            p class="links" {
                strong { "Add to calendar: " }
                a href=(links.google) target="_blank" rel="noopener" { "Google" }
                a href=(links.outlook) target="_blank" rel="noopener" { "Outlook" }
                a href=(links.ics_path) { "Apple / .ics" }
            }
        }
    }
}

fn registries(event: &Event) -> Markup {
    let links: Vec<&str> = [event.registry1.as_str(), event.registry2.as_str()]
        .into_iter()
        .filter(|l| is_safe_url(l))
        .collect();
    html! {
        @if !links.is_empty() {
            p class="links" {
                strong { "Registry: " }
                @for (i, link) in links.iter().enumerate() {
                    a href=(link) target="_blank" rel="noopener" { "Registry " (i + 1) }
                }
            }
        }
    }
}

fn response_choices(current: Option<RsvpResponse>) -> Markup {
    html! {
        div class="choices" {
            @for (value, label) in [
                (RsvpResponse::Yes, "Joyfully accepts"),
                (RsvpResponse::No, "Regretfully declines"),
                (RsvpResponse::Maybe, "Maybe"),
            ] {
                label {
                    input type="radio" name="rsvp" value=(value.as_str()) checked[current == Some(value)];
                    " " (label)
                }
            }
        }
    }
}

fn account_rsvp_form(event: &Event, rsvp: Option<&Rsvp>) -> Markup {
    let party = rsvp.map(|r| r.party).unwrap_or_default();
    let current = rsvp.map(|r| r.response);
    html! {
        @if let Some(r) = rsvp {
            p { "Your RSVP: " strong { (r.response.describe()) }
                @if r.response == RsvpResponse::Yes {
                    " (" (r.party.adults) " adult(s), " (r.party.kids) " kid(s))"
                }
            }
        }
        form class="stack" method="post" action={ "/event/" (event.id) } {
            input type="hidden" name="action" value="rsvp";
            div class="choices" {
                @for value in [RsvpResponse::Yes, RsvpResponse::No, RsvpResponse::Maybe] {
                    label {
                        input type="radio" name="response" value=(value.as_str()) checked[current == Some(value)];
                        " " (value.describe())
                    }
                }
            }
            label for="adults_qty" { "Adults" }
            input type="number" id="adults_qty" name="adults_qty" min="1" value=(party.adults);
            label for="kids_qty" { "Kids" }
            input type="number" id="kids_qty" name="kids_qty" min="0" value=(party.kids);
            button type="submit" { "Save RSVP" }
        }
    }
}

fn comments_section(
    event: &Event,
    user: Option<&Account>,
    comments: &[Comment],
    now: DateTime<Utc>,
) -> Markup {
    html! {
        div class="card" id="comments" {
            h2 { "Comments" }
            @if comments.is_empty() {
                p class="muted" { "No comments yet. Be the first!" }
            }
            @for c in comments {
                div class="comment" {
                    span class="who" { (c.author_name) }
                    span class="when" { (time_ago(c.created_at, now)) }
                    p class="description" { (c.body) }
                }
            }
            form class="stack" method="post" action={ "/event/" (event.id) } {
                input type="hidden" name="action" value="comment";
                @if user.is_none() {
                    label for="comment_name" { "Your name" }
                    input type="text" id="comment_name" name="comment_name" required;
                }
                label for="comment" { "Leave a note for the host" }
                textarea id="comment" name="comment" rows="3" required {}
                button type="submit" { "Post comment" }
            }
        }
    }
}

pub fn event_page(view: &EventPage<'_>) -> Markup {
    let event = view.event;
    let url = format!("{}/event/{}", view.base_url, event.id);
    let image = format!("{url}/preview.png");
    let when = display_starts_at(&event.starts_at).joined();
    let description = if event.description.is_empty() {
        when
    } else {
        truncate(&event.description, 200)
    };

    let body = html! {
        @for b in view.banners {
            (banner(b.kind, &b.message))
        }
        div class="card" {
            (event_details(event))
            @if !event.description.is_empty() {
                p class="description" { (event.description) }
            }
            (calendar_section(event))
            (registries(event))
            @if view.can_manage {
                p { a class="button" href={ "/admin/event/" (event.id) } { "Edit event" } }
            }
        }
        div class="card" id="rsvp" {
            h2 { "RSVP" }
            @if view.user.is_some() {
                (account_rsvp_form(event, view.rsvp))
            } @else {
                p { "Let the host know if you can make it." }
                a class="button" href={ "/anonymous-rsvp/" (event.id) } { "RSVP now" }
                p class="muted" { "Have an account? " a href="/login" { "Log in" } " to manage your response." }
            }
        }
        (comments_section(event, view.user, view.comments, view.now))
    };

    page_shell(
        &event.title,
        event.card_theme,
        view.user,
        Some(OpenGraph {
            title: &event.title,
            description: &description,
            url: &url,
            image: &image,
        }),
        body,
    )
}

pub fn anonymous_rsvp_page(
    event: &Event,
    values: &AnonymousFormValues,
    error: Option<&str>,
) -> Markup {
    let body = html! {
        div class="card" {
            (event_details(event))
            (calendar_section(event))
        }
        div class="card" {
            h2 { "Your RSVP" }
            @if let Some(message) = error {
                (banner("error", message))
            }
            form class="stack" method="post" action={ "/anonymous-rsvp/" (event.id) } {
                label for="guest_name" { "Name" }
                input type="text" id="guest_name" name="guest_name" value=(values.name) required;
                label for="guest_phone" { "Phone" }
                input type="tel" id="guest_phone" name="guest_phone" value=(values.phone) required;
                label for="guest_email" { "Email (optional, for a confirmation)" }
                input type="email" id="guest_email" name="guest_email" value=(values.email);
                label { "Will you attend?" }
                (response_choices(values.response))
                label for="adults_qty" { "Adults" }
                input type="number" id="adults_qty" name="adults_qty" min="1" value=(values.adults);
                label for="kids_qty" { "Kids" }
                input type="number" id="kids_qty" name="kids_qty" min="0" value=(values.kids);
                button type="submit" { "Send RSVP" }
            }
            p class="muted" { a href={ "/event/" (event.id) } { "Back to the invitation" } }
        }
    };
    page_shell(
        &format!("RSVP: {}", event.title),
        event.card_theme,
        None,
        None,
        body,
    )
}

pub fn thanks_page(event: &Event) -> Markup {
    let body = html! {
        div class="card" {
            h2 { "Thank You!" }
            p class="description" { "Your RSVP has been received. We appreciate you letting us know!" }
            p { "We're looking forward to celebrating with you." }
            a class="button" href={ "/event/" (event.id) } { "Back to " (event.title) }
        }
    };
    page_shell("Thank You", event.card_theme, None, None, body)
}

pub fn login_page(email: &str, error: Option<&str>) -> Markup {
    let body = html! {
        div class="card" {
            h2 { "Log in" }
            @if let Some(message) = error { (banner("error", message)) }
            form class="stack" method="post" action="/login" {
                label for="email" { "Email" }
                input type="email" id="email" name="email" value=(email) required;
                label for="password" { "Password" }
                input type="password" id="password" name="password" required;
                button type="submit" { "Log in" }
            }
            p class="muted" { "No account yet? " a href="/register" { "Register" } }
        }
    };
    page_shell("Login", CardTheme::default(), None, None, body)
}

pub fn register_page(name: &str, email: &str, error: Option<&str>) -> Markup {
    let body = html! {
        div class="card" {
            h2 { "Register" }
            @if let Some(message) = error { (banner("error", message)) }
            form class="stack" method="post" action="/register" {
                label for="name" { "Name" }
                input type="text" id="name" name="name" value=(name) required;
                label for="email" { "Email" }
                input type="email" id="email" name="email" value=(email) required;
                label for="password" { "Password" }
                input type="password" id="password" name="password" required;
                button type="submit" { "Create account" }
            }
            p class="muted" { "Already registered? " a href="/login" { "Log in" } }
        }
    };
    page_shell("Register", CardTheme::default(), None, None, body)
}

fn event_form(action: &str, event: Option<&Event>, submit: &str) -> Markup {
    let value = |f: fn(&Event) -> &str| event.map(f).unwrap_or_default().to_string();
    let theme = event.map(|e| e.card_theme).unwrap_or_default();
    html! {
        form class="stack" method="post" action=(action) {
            label for="title" { "Title" }
            input type="text" id="title" name="title" value=(value(|e| e.title.as_str())) required;
            label for="host" { "Host" }
            input type="text" id="host" name="host" value=(value(|e| e.host.as_str()));
            label for="datetime" { "Date and time" }
            input type="datetime-local" id="datetime" name="datetime" value=(value(|e| e.starts_at.as_str()));
            label for="location" { "Location" }
            input type="text" id="location" name="location" value=(value(|e| e.location.as_str()));
            label for="description" { "Description" }
            textarea id="description" name="description" rows="5" { (value(|e| e.description.as_str())) }
            label for="registry1" { "Registry link 1" }
            input type="text" id="registry1" name="registry1" value=(value(|e| e.registry1.as_str()));
            label for="registry2" { "Registry link 2" }
            input type="text" id="registry2" name="registry2" value=(value(|e| e.registry2.as_str()));
            label for="header_image" { "Header image (file in /static/images)" }
            input type="text" id="header_image" name="header_image" value=(value(|e| e.header_image.as_str()));
            label for="card_theme" { "Card theme" }
            select id="card_theme" name="card_theme" {
                @for t in CardTheme::ALL {
                    option value=(t.as_str()) selected[t == theme] { (t.label()) }
                }
            }
            button type="submit" { (submit) }
        }
    }
}

pub fn admin_list_page(user: &Account, events: &[Event], error: Option<&str>) -> Markup {
    let body = html! {
        div class="card" {
            h2 { "Events" }
            @if events.is_empty() {
                p class="muted" { "No events yet." }
            } @else {
                table {
                    tr { th { "Title" } th { "When" } th {} }
                    @for e in events {
                        tr {
                            td { a href={ "/event/" (e.id) } { (e.title) } }
                            td { (display_starts_at(&e.starts_at).joined()) }
                            td { a href={ "/admin/event/" (e.id) } { "Manage" } }
                        }
                    }
                }
            }
        }
        div class="card" {
            h2 { "New event" }
            @if let Some(message) = error { (banner("error", message)) }
            (event_form("/admin/events", None, "Create event"))
        }
    };
    page_shell("Admin", CardTheme::default(), Some(user), None, body)
}

pub struct AdminEventPage<'a> {
    pub user: &'a Account,
    pub event: &'a Event,
    pub guests: &'a [Guest],
    pub stats: RsvpStats,
    pub error: Option<&'a str>,
}

fn guest_status(guest: &Guest) -> Markup {
    html! {
        @match &guest.rsvp {
            Some(r) => { (r.response.describe()) }
            None => { span class="muted" { "No response" } }
        }
    }
}

pub fn admin_event_page(view: &AdminEventPage<'_>) -> Markup {
    let event = view.event;
    let stats = view.stats;
    let body = html! {
        p { a href="/admin" { "← All events" } " · " a href={ "/event/" (event.id) } { "View invitation" } }
        div class="card" {
            h2 { "Edit event" }
            @if let Some(message) = view.error { (banner("error", message)) }
            (event_form(&format!("/admin/event/{}", event.id), Some(event), "Save changes"))
        }
        div class="card" {
            h2 { "RSVPs" }
            div class="stats" {
                div { strong { (stats.attending) } " attending" }
                div { strong { (stats.not_attending) } " not attending" }
                div { strong { (stats.maybe) } " maybe" }
                div { strong { (stats.no_response) } " no response" }
                div { strong { (stats.total_adults) } " adults, " strong { (stats.total_kids) } " kids" }
                div { strong { (stats.headcount()) } " expected in total" }
            }
            @if view.guests.is_empty() {
                p class="muted" { "No guests yet." }
            } @else {
                table {
                    tr { th { "Name" } th { "Email" } th { "Phone" } th { "Response" } th { "Party" } th { "Type" } }
                    @for g in view.guests {
                        tr {
                            td { (g.name()) }
                            td { (g.email().unwrap_or("")) }
                            td { (g.invitee.phone.as_deref().unwrap_or("")) }
                            td { (guest_status(g)) }
                            td {
                                @if let Some(r) = g.rsvp.as_ref().filter(|r| r.response == RsvpResponse::Yes) {
                                    (r.party.adults) " + " (r.party.kids)
                                }
                            }
                            td { @if g.invitee.is_anonymous() { "Anonymous" } @else { "Account" } }
                        }
                    }
                }
            }
        }
        div class="card" {
            h2 { "Danger zone" }
            form method="post" action={ "/admin/event/" (event.id) "/delete" } {
                button class="danger" type="submit" { "Delete event" }
            }
        }
    };
    page_shell(
        "Admin - Edit Event",
        event.card_theme,
        Some(view.user),
        None,
        body,
    )
}

pub fn error_page(title: &str, message: &str) -> Markup {
    let body = html! {
        div class="card" {
            h2 { (title) }
            p { (message) }
            a href="/" { "Back to the invitation" }
        }
    };
    page_shell(title, CardTheme::default(), None, None, body)
}
