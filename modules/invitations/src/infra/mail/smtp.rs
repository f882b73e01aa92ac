use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use super::compose::{self, ComposedEmail};
use crate::config::SmtpConfig;
use crate::contract::model::Delivery;
use crate::domain::ports::{Notifier, RsvpNotice};

/// Port that expects TLS from the first byte instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends RSVP emails through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    base_url: String,
}

impl SmtpNotifier {
    pub fn new(cfg: &SmtpConfig, base_url: &str) -> anyhow::Result<Self> {
        let server = cfg.server.trim();
        let builder = if cfg.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
        }
        .with_context(|| format!("invalid SMTP server '{server}'"))?;

        let transport = builder
            .port(cfg.port)
            .credentials(Credentials::new(
                cfg.username.trim().to_string(),
                cfg.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(cfg.timeout_secs)))
            .build();

        let address: Address = cfg
            .sender_email()
            .trim()
            .parse()
            .with_context(|| format!("invalid sender address '{}'", cfg.sender_email()))?;
        let from = Mailbox::new(Some(cfg.from_name.clone()), address);

        info!(server, port = cfg.port, from = %from, "SMTP notifier ready");
        Ok(Self {
            transport,
            from,
            base_url: base_url.to_string(),
        })
    }

    async fn send(&self, mail: &ComposedEmail) -> anyhow::Result<()> {
        let to_address: Address = mail
            .to_email
            .trim()
            .parse()
            .with_context(|| format!("invalid recipient '{}'", mail.to_email))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(mail.to_name.clone()), to_address))
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(mail.html.clone())
            .context("failed to build message")?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("SMTP send to {} failed", mail.to_email))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_rsvp(&self, notice: &RsvpNotice) -> Delivery {
        let outgoing: Vec<ComposedEmail> = [
            compose::guest_confirmation(notice),
            compose::host_notification(notice, &self.base_url),
        ]
        .into_iter()
        .flatten()
        .collect();

        if outgoing.is_empty() {
            debug!(event_id = notice.event_id, "no email recipients for RSVP");
            return Delivery::NoRecipients;
        }

        let mut failures = Vec::new();
        for mail in &outgoing {
            match self.send(mail).await {
                Ok(()) => info!(to = %mail.to_email, subject = %mail.subject, "email sent"),
                Err(e) => {
                    warn!(to = %mail.to_email, error = %format!("{e:#}"), "email failed");
                    failures.push(format!("{e:#}"));
                }
            }
        }

        if failures.is_empty() {
            Delivery::Sent
        } else {
            Delivery::Failed {
                reason: failures.join("; "),
            }
        }
    }
}

/// Stand-in used when SMTP credentials are missing.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify_rsvp(&self, _notice: &RsvpNotice) -> Delivery {
        Delivery::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{PartySize, RsvpResponse};

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

    fn smtp(port: u16) -> SmtpConfig {
        SmtpConfig {
            server: "localhost".into(),
            port,
            username: "host@example.com".into(),
            password: "secret".into(),
            timeout_secs: 2,
            ..SmtpConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_relay_reports_failure() {
        // Nothing listens on port 1.
        let notifier = SmtpNotifier::new(&smtp(1), "http://localhost:8000").unwrap();
        let outcome = notifier.notify_rsvp(&notice()).await;
        assert!(outcome.is_failed(), "got {outcome:?}");
    }

    #[tokio::test]
    async fn nobody_to_mail() {
        let notifier = SmtpNotifier::new(&smtp(1), "http://localhost:8000").unwrap();
        let mut n = notice();
        n.guest_email = None;
        assert_eq!(notifier.notify_rsvp(&n).await, Delivery::NoRecipients);
    }

    #[test]
    fn bad_sender_is_rejected() {
        let mut cfg = smtp(587);
        cfg.username = "not-an-address".into();
        assert!(SmtpNotifier::new(&cfg, "http://localhost:8000").is_err());
    }

    #[tokio::test]
    async fn disabled_notifier() {
        assert_eq!(DisabledNotifier.notify_rsvp(&notice()).await, Delivery::Disabled);
    }
}
