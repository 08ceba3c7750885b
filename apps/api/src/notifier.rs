//! Notifier — best-effort push notifications to the site owner.
//!
//! Delivery never fails a caller: the outcome is returned as a value that the
//! caller may log or ignore.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// What happened to a notification. There is no error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Credentials are not configured; nothing was attempted.
    Skipped,
    Failed(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> NotifyOutcome;
}

#[derive(Debug, Clone)]
struct PushoverCredentials {
    user: String,
    token: String,
}

#[derive(Serialize)]
struct PushoverForm<'a> {
    user: &'a str,
    token: &'a str,
    message: &'a str,
}

/// Pushover-backed notifier. Without both credentials every call is a no-op.
#[derive(Clone)]
pub struct PushoverNotifier {
    client: Client,
    url: String,
    credentials: Option<PushoverCredentials>,
}

impl PushoverNotifier {
    pub fn new(
        url: impl Into<String>,
        user: Option<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let credentials = match (user, token) {
            (Some(user), Some(token)) => Some(PushoverCredentials { user, token }),
            _ => None,
        };
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> NotifyOutcome {
        let Some(creds) = &self.credentials else {
            debug!("Pushover credentials not set, skipping notification");
            return NotifyOutcome::Skipped;
        };

        let form = PushoverForm {
            user: &creds.user,
            token: &creds.token,
            message,
        };

        match self.client.post(&self.url).form(&form).send().await {
            Ok(resp) if resp.status().is_success() => NotifyOutcome::Sent,
            Ok(resp) => {
                let status = resp.status();
                warn!("Pushover returned {status}");
                NotifyOutcome::Failed(format!("status {status}"))
            }
            Err(e) => {
                warn!("Pushover request failed: {e}");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(user: Option<&str>, token: Option<&str>) -> PushoverNotifier {
        // Nothing listens on the discard port, so configured sends fail fast.
        PushoverNotifier::new(
            "http://127.0.0.1:9/unreachable",
            user.map(String::from),
            token.map(String::from),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_without_network() {
        let n = notifier(None, None);
        assert!(!n.is_configured());
        assert_eq!(n.notify("hello").await, NotifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_partial_credentials_count_as_missing() {
        let n = notifier(Some("u-123"), None);
        assert!(!n.is_configured());
        assert_eq!(n.notify("hello").await, NotifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_not_raised() {
        let n = notifier(Some("u-123"), Some("t-456"));
        assert!(matches!(n.notify("hello").await, NotifyOutcome::Failed(_)));
    }
}
