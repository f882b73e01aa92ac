use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the invitations module (`modules.invitations` in the YAML file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvitationsConfig {
    /// Public URL used in emails and Open Graph tags.
    pub base_url: String,
    /// Create the welcome event when the database has none.
    pub seed_default_event: bool,
    pub session_ttl_hours: u64,
    pub preview_cache_capacity: u64,
    pub smtp: SmtpConfig,
}

impl Default for InvitationsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            seed_default_event: true,
            session_ttl_hours: 24 * 7,
            preview_cache_capacity: 256,
            smtp: SmtpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    /// Empty means "same as username".
    pub from_email: String,
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_name: "Event Host".to_string(),
            from_email: String::new(),
            timeout_secs: 30,
        }
    }
}

impl SmtpConfig {
    /// Email is sent only with both credentials present.
    pub fn is_enabled(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }

    pub fn sender_email(&self) -> &str {
        if self.from_email.trim().is_empty() {
            &self.username
        } else {
            &self.from_email
        }
    }
}

impl InvitationsConfig {
    /// Overlay the flat variables used by `.env` deployments:
    /// `BASE_URL` and `SMTP_SERVER|PORT|USERNAME|PASSWORD|FROM_NAME|FROM_EMAIL`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("SMTP_SERVER") {
            self.smtp.server = v;
        }
        if let Some(v) = lookup("SMTP_PORT") {
            self.smtp.port = v
                .trim()
                .parse()
                .with_context(|| format!("SMTP_PORT must be a port number, got '{v}'"))?;
        }
        if let Some(v) = lookup("SMTP_USERNAME") {
            self.smtp.username = v;
        }
        if let Some(v) = lookup("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Some(v) = lookup("SMTP_FROM_NAME") {
            self.smtp.from_name = v;
        }
        if let Some(v) = lookup("SMTP_FROM_EMAIL") {
            self.smtp.from_email = v;
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.base_url)
            .with_context(|| format!("base_url '{}' is not a valid URL", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("base_url must use http or https, got '{}'", url.scheme());
        }
        if self.smtp.is_enabled() && self.smtp.server.trim().is_empty() {
            anyhow::bail!("smtp.server is required when SMTP credentials are set");
        }
        Ok(())
    }

    /// Host part of `base_url`, used for calendar UIDs.
    pub fn public_host(&self) -> String {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| "localhost".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_plain_deployments() {
        let cfg = InvitationsConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cfg.smtp.server, "smtp.gmail.com");
        assert_eq!(cfg.smtp.port, 587);
        assert_eq!(cfg.smtp.from_name, "Event Host");
        assert_eq!(cfg.smtp.timeout_secs, 30);
        assert!(!cfg.smtp.is_enabled());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overlay_sets_smtp_and_base_url() {
        let mut cfg = InvitationsConfig::default();
        cfg.apply_env_overrides(env(&[
            ("BASE_URL", "https://party.example/"),
            ("SMTP_SERVER", "mail.example"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "host@example.com"),
            ("SMTP_PASSWORD", "app-pass"),
        ]))
        .unwrap();

        assert_eq!(cfg.base_url, "https://party.example");
        assert_eq!(cfg.smtp.server, "mail.example");
        assert_eq!(cfg.smtp.port, 2525);
        assert!(cfg.smtp.is_enabled());
        // From address falls back to the username.
        assert_eq!(cfg.smtp.sender_email(), "host@example.com");
        assert_eq!(cfg.public_host(), "party.example");
    }

    #[test]
    fn explicit_from_email_wins() {
        let mut cfg = InvitationsConfig::default();
        cfg.apply_env_overrides(env(&[
            ("SMTP_USERNAME", "login@example.com"),
            ("SMTP_FROM_EMAIL", "rsvp@example.com"),
        ]))
        .unwrap();
        assert_eq!(cfg.smtp.sender_email(), "rsvp@example.com");
    }

    #[test]
    fn bad_port_is_reported() {
        let mut cfg = InvitationsConfig::default();
        let err = cfg
            .apply_env_overrides(env(&[("SMTP_PORT", "smtp")]))
            .unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let cfg = InvitationsConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = InvitationsConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: InvitationsConfig =
            serde_json::from_value(serde_json::json!({ "smtp": { "port": 465 } })).unwrap();
        assert_eq!(cfg.smtp.port, 465);
        assert_eq!(cfg.smtp.server, "smtp.gmail.com");
        assert!(cfg.seed_default_event);
    }
}
