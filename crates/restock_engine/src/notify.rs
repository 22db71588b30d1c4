use chrono::{Local, TimeZone};
use engine_logging::engine_info;
use restock_core::Timestamp;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("credential check failed: {0}")]
    Credentials(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Publishes a short text message to an external channel.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Check that the channel accepts our credentials. Called once before a cycle.
    async fn verify(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// `"HH:MM:SS - {label} available at {url}"` in local time.
pub fn format_notification(product_label: &str, url: &str, at: Timestamp) -> String {
    let clock = Local.timestamp_nanos(at.as_nanos()).format("%H:%M:%S");
    format!("{clock} - {product_label} available at {url}")
}

/// Writes notifications to the operational log only.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        engine_info!("NOTIFY: {}", message);
        Ok(())
    }
}

/// Posts `{"text": message}` to a webhook, optionally with a bearer token.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    verify_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct WebhookText<'a> {
    text: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            verify_url: None,
            token: None,
        }
    }

    /// Endpoint answering a GET with success when the token is valid.
    pub fn with_verify_url(mut self, verify_url: impl Into<String>) -> Self {
        self.verify_url = Some(verify_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn verify(&self) -> Result<(), NotifyError> {
        reqwest::Url::parse(&self.url)
            .map_err(|e| NotifyError::Credentials(format!("webhook url: {e}")))?;
        let Some(verify_url) = &self.verify_url else {
            return Ok(());
        };

        self.authorize(self.client.get(verify_url))
            .send()
            .await
            .map_err(|e| NotifyError::Credentials(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError::Credentials(e.to_string()))?;
        Ok(())
    }

    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let payload = WebhookText { text: message };

        self.authorize(self.client.post(&self.url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        Ok(())
    }
}
