//! HTML bodies for RSVP emails.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::contract::model::RsvpResponse;
use crate::domain::display::display_starts_at;
use crate::domain::ports::RsvpNotice;

/// A rendered message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub html: String,
}

const EMAIL_CSS: &str = "\
body { font-family: Georgia, serif; max-width: 600px; margin: 0 auto; padding: 20px; }\
.header { color: #fff; padding: 20px; text-align: center; border-radius: 10px 10px 0 0; }\
.guest { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); }\
.host { background: linear-gradient(135deg, #28a745 0%, #20c997 100%); }\
.content { background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px; }\
.details { background: #fff; padding: 20px; border-radius: 5px; margin: 20px 0; border-left: 4px solid #667eea; }\
.status { font-size: 18px; font-weight: bold; }\
.yes { color: #28a745; } .no { color: #dc3545; } .maybe { color: #d39e00; }";

fn status_class(response: RsvpResponse) -> &'static str {
    response.as_str()
}

fn guest_message(response: RsvpResponse) -> &'static str {
    match response {
        RsvpResponse::Yes => "We're excited to see you there!",
        RsvpResponse::No => "Thanks for letting us know. You'll be missed!",
        RsvpResponse::Maybe => "Thanks for letting us know. We hope you can make it!",
    }
}

fn host_message(notice: &RsvpNotice) -> String {
    let guest = &notice.guest_name;
    match notice.response {
        RsvpResponse::Yes => format!("{guest} will be attending your event!"),
        RsvpResponse::No => format!("{guest} is unable to attend your event."),
        RsvpResponse::Maybe => format!("{guest} might attend your event."),
    }
}

fn party_line(notice: &RsvpNotice) -> Markup {
    html! {
        @if notice.response == RsvpResponse::Yes {
            p {
                strong { "Party size:" }
                " " (notice.party.adults) " adult(s), " (notice.party.kids) " kid(s)"
            }
        }
    }
}

fn page(header_class: &str, heading: &str, content: Markup) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                style { (PreEscaped(EMAIL_CSS)) }
            }
            body {
                div class={ "header " (header_class) } { h1 { (heading) } }
                div class="content" { (content) }
            }
        }
    }
    .into_string()
}

/// Confirmation for the guest; `None` when they gave no email address.
pub fn guest_confirmation(notice: &RsvpNotice) -> Option<ComposedEmail> {
    let to_email = notice.guest_email.clone().filter(|e| !e.trim().is_empty())?;
    let when = display_starts_at(&notice.starts_at);

    let content = html! {
        p { "Hi " (notice.guest_name) "," }
        p { "This confirms your RSVP for:" }
        div class="details" {
            h3 { (notice.event_title) }
            p { strong { "Host:" } " " (notice.host_name) }
            p { strong { "Date:" } " " (when.date) }
            p { strong { "Time:" } " " (when.time) }
            p { strong { "Location:" } " " (notice.location) }
        }
        p class={ "status " (status_class(notice.response)) } {
            "Your RSVP: " (notice.response.describe())
        }
        (party_line(notice))
        p { (guest_message(notice.response)) }
        p { "Best regards," br; (notice.host_name) }
    };

    Some(ComposedEmail {
        to_name: notice.guest_name.clone(),
        to_email,
        subject: format!("RSVP Confirmation: {}", notice.event_title),
        html: page("guest", "RSVP Confirmed", content),
    })
}

/// Notification for the host; `None` when no host address is known.
pub fn host_notification(notice: &RsvpNotice, base_url: &str) -> Option<ComposedEmail> {
    let to_email = notice.host_email.clone().filter(|e| !e.trim().is_empty())?;
    let when = display_starts_at(&notice.starts_at);
    let admin_link = format!("{}/admin/event/{}", base_url.trim_end_matches('/'), notice.event_id);

    let content = html! {
        p { "Hi " (notice.host_name) "," }
        p { (host_message(notice)) }
        div class="details" {
            h3 { "RSVP Details" }
            p { strong { "Guest:" } " " (notice.guest_name) }
            p { strong { "Email:" } " " (notice.guest_email.as_deref().unwrap_or("Not provided")) }
            p class={ "status " (status_class(notice.response)) } {
                "Status: " (notice.response.describe())
            }
            (party_line(notice))
            p {
                strong { "RSVP Type:" } " "
                @if notice.anonymous { "Anonymous" } @else { "Account-based" }
            }
        }
        p { "You can view all RSVPs in your " a href=(admin_link) { "admin panel" } "." }
        p { "Event: " (notice.event_title) br; "Date: " (when.joined()) }
    };

    Some(ComposedEmail {
        to_name: notice.host_name.clone(),
        to_email,
        subject: format!("New RSVP: {} - {}", notice.guest_name, notice.event_title),
        html: page("host", "New RSVP Received", content),
    })
}
