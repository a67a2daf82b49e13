//! Contact form relay
//!
//! Validates submissions, applies the per-client rate limit and forwards
//! accepted messages to an optional webhook.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use atelier_common::{AtelierError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::rate_limit::RateLimiter;
use crate::config::ContactSettings;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 320;
const MAX_COMMENT_LEN: usize = 5_000;

/// Prune elapsed rate-limit windows past this many tracked clients
const PRUNE_THRESHOLD: usize = 10_000;

/// Submitted contact form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

impl ContactForm {
    /// Reject empty fields, oversized fields and malformed addresses
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        let email = self.email.trim();
        let comment = self.comment.trim();

        if name.is_empty() || email.is_empty() || comment.is_empty() {
            return Err(AtelierError::validation("name, email and comment are required"));
        }
        if name.len() > MAX_NAME_LEN || email.len() > MAX_EMAIL_LEN || comment.len() > MAX_COMMENT_LEN {
            return Err(AtelierError::validation("submission is too long"));
        }
        if !is_email(email) {
            return Err(AtelierError::validation("invalid email address"));
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    name: &'a str,
    email: &'a str,
    comment: &'a str,
    submitted_at: chrono::DateTime<Utc>,
}

/// Contact submission pipeline
pub struct ContactRelay {
    limiter: RateLimiter,
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl ContactRelay {
    pub fn new(settings: &ContactSettings) -> Self {
        Self {
            limiter: RateLimiter::new(
                settings.rate_limit_max,
                Duration::from_secs(settings.rate_limit_window_secs),
            ),
            webhook_url: settings.webhook_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Accept a submission from `client`
    #[instrument(skip(self, form))]
    pub async fn submit(&self, client: IpAddr, form: ContactForm) -> Result<()> {
        if self.limiter.tracked_clients() > PRUNE_THRESHOLD {
            self.limiter.prune(Instant::now());
        }
        self.limiter.check(client)?;
        form.validate()?;

        match &self.webhook_url {
            Some(url) => self.forward(url, &form).await?,
            None => info!("No contact webhook configured, submission logged only"),
        }

        info!(email = %form.email.trim(), "Contact submission accepted");
        Ok(())
    }

    async fn forward(&self, url: &str, form: &ContactForm) -> Result<()> {
        let payload = WebhookPayload {
            name: form.name.trim(),
            email: form.email.trim(),
            comment: form.comment.trim(),
            submitted_at: Utc::now(),
        };

        self.client
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                error!(error = %err, "Contact webhook failed");
                AtelierError::Upstream("failed to deliver message".to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn form(name: &str, email: &str, comment: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            comment: comment.into(),
        }
    }

    #[test]
    fn test_validation() {
        assert!(form("Ada", "ada@example.com", "Hello").validate().is_ok());

        for bad in [
            form("", "ada@example.com", "Hello"),
            form("Ada", "  ", "Hello"),
            form("Ada", "ada@example.com", ""),
            form("Ada", "ada.example.com", "Hello"),
            form("Ada", "ada@example", "Hello"),
            form("Ada", "a da@example.com", "Hello"),
            form("Ada", "@example.com", "Hello"),
            form("Ada", "ada@@example.com", "Hello"),
            form("Ada", "ada@example.com", &"x".repeat(MAX_COMMENT_LEN + 1)),
        ] {
            assert!(
                matches!(bad.validate(), Err(AtelierError::Validation(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_submit_without_webhook_is_rate_limited() {
        let relay = ContactRelay::new(&ContactSettings {
            rate_limit_max: 2,
            rate_limit_window_secs: 60,
            webhook_url: None,
        });
        let client = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let ok = form("Ada", "ada@example.com", "Hello");

        relay.submit(client, ok.clone()).await.unwrap();
        relay.submit(client, ok.clone()).await.unwrap();

        let err = relay.submit(client, ok).await.unwrap_err();
        assert!(matches!(err, AtelierError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_upstream_error() {
        let relay = ContactRelay::new(&ContactSettings {
            rate_limit_max: 5,
            rate_limit_window_secs: 60,
            webhook_url: Some("http://127.0.0.1:9/contact".to_string()),
        });

        let err = relay
            .submit(IpAddr::V4(Ipv4Addr::LOCALHOST), form("Ada", "ada@example.com", "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AtelierError::Upstream(_)));
    }
}
