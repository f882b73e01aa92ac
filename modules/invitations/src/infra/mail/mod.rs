pub mod compose;
pub mod smtp;

use std::sync::Arc;

use tracing::warn;

use crate::config::InvitationsConfig;
use crate::domain::ports::Notifier;

pub use smtp::{DisabledNotifier, SmtpNotifier};

/// SMTP notifier when credentials are configured and usable, otherwise a
/// no-op that reports `Delivery::Disabled`.
pub fn build_notifier(cfg: &InvitationsConfig) -> Arc<dyn Notifier> {
    match smtp_notifier(cfg) {
        Some(notifier) => Arc::new(notifier),
        None => Arc::new(DisabledNotifier),
    }
}

/// Whether RSVP emails will be sent with this configuration.
pub fn email_enabled(cfg: &InvitationsConfig) -> bool {
    smtp_notifier(cfg).is_some()
}

fn smtp_notifier(cfg: &InvitationsConfig) -> Option<SmtpNotifier> {
    if !cfg.smtp.is_enabled() {
        warn!("SMTP_USERNAME or SMTP_PASSWORD not set; RSVP emails are disabled");
        return None;
    }
    match SmtpNotifier::new(&cfg.smtp, &cfg.base_url) {
        Ok(notifier) => Some(notifier),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "SMTP settings rejected; RSVP emails are disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;
    use crate::contract::model::{Delivery, PartySize, RsvpResponse};
    use crate::domain::ports::RsvpNotice;

    fn config(username: &str, from_email: &str) -> InvitationsConfig {
        InvitationsConfig {
            smtp: SmtpConfig {
                server: "localhost".into(),
                port: 1,
                username: username.into(),
                password: "secret".into(),
                from_email: from_email.into(),
                timeout_secs: 2,
                ..SmtpConfig::default()
            },
            ..InvitationsConfig::default()
        }
    }

    fn notice() -> RsvpNotice {
        RsvpNotice {
            event_id: 1,
            event_title: "Picnic".into(),
            host_name: "Host".into(),
            starts_at: "2025-06-01T12:00".into(),
            location: "Park".into(),
            guest_name: "Guest".into(),
            guest_email: Some("guest@example.com".into()),
            response: RsvpResponse::Yes,
            party: PartySize::default(),
            anonymous: false,
            host_email: None,
        }
    }

    #[tokio::test]
    async fn unusable_sender_turns_email_off() {
        // API-key style login with no separate from address.
        let cfg = config("apikey", "");
        assert!(cfg.validate().is_ok());
        assert!(!email_enabled(&cfg));

        let notifier = build_notifier(&cfg);
        assert_eq!(notifier.notify_rsvp(&notice()).await, Delivery::Disabled);
    }

    #[tokio::test]
    async fn explicit_from_address_keeps_email_on() {
        assert!(email_enabled(&config("apikey", "rsvp@example.com")));
        assert!(email_enabled(&config("host@example.com", "")));
    }

    #[tokio::test]
    async fn missing_credentials_disable_email() {
        let cfg = InvitationsConfig::default();
        assert!(!email_enabled(&cfg));
        assert_eq!(build_notifier(&cfg).notify_rsvp(&notice()).await, Delivery::Disabled);
    }
}
