use std::sync::Mutex;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use restock_core::PresenceSelector;
use tokio::time::Instant;

use crate::browser::{Browser, Page};
use crate::decode::decode_body;
use crate::document::{contains_phrase, ElementMatcher};
use crate::{Capture, ProbeError, ProbeFailure, TextMatch};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    /// Delay between re-fetches while waiting for content to appear.
    pub poll_interval: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 8 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            poll_interval: Duration::from_millis(500),
            user_agent: concat!("restock/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Static-HTML browser: pages are fetched with reqwest and inspected with scraper.
///
/// Content that only appears after client-side scripting runs is invisible to it;
/// waits are implemented by re-fetching until the deadline.
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl HttpBrowser {
    pub fn new(settings: FetchSettings) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ProbeError::new(ProbeFailure::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn fetch(&self, url: &reqwest::Url) -> Result<String, ProbeError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::new(
                ProbeFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(ProbeError::new(
                ProbeFailure::TooLarge { max_bytes },
                "declared content length too large",
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(ProbeError::new(
                    ProbeFailure::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(ProbeError::new(
                    ProbeFailure::TooLarge { max_bytes },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        engine_trace!("Fetched {} bytes from {}", bytes.len(), url);

        Ok(decode_body(&bytes, content_type.as_deref()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl Browser for HttpBrowser {
    async fn open(&self, url: &str) -> Result<Box<dyn Page>, ProbeError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| ProbeError::new(ProbeFailure::InvalidUrl, err.to_string()))?;
        let html = self.fetch(&parsed).await?;
        Ok(Box::new(HttpPage {
            browser: self.clone(),
            url: parsed,
            html: Mutex::new(html),
        }))
    }
}

pub struct HttpPage {
    browser: HttpBrowser,
    url: reqwest::Url,
    html: Mutex<String>,
}

impl HttpPage {
    fn snapshot(&self) -> String {
        match self.html.lock() {
            Ok(html) => html.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, html: String) {
        match self.html.lock() {
            Ok(mut guard) => *guard = html,
            Err(poisoned) => *poisoned.into_inner() = html,
        }
    }

    /// Evaluate `check` on the current document, re-fetching every poll interval
    /// until it holds or `timeout` elapses. Returns whether it held.
    async fn poll_until<F>(&self, timeout: Duration, check: F) -> bool
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if check(&self.snapshot()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let pause = self.browser.settings.poll_interval.min(deadline - now);
            tokio::time::sleep(pause).await;

            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.browser.fetch(&self.url)).await {
                Ok(Ok(html)) => self.replace(html),
                Ok(Err(err)) => engine_debug!("Re-fetch of {} failed: {}", self.url, err),
                Err(_) => return check(&self.snapshot()),
            }
        }
    }
}

#[async_trait::async_trait]
impl Page for HttpPage {
    async fn wait_for_element(
        &self,
        selector: &PresenceSelector,
        timeout: Duration,
    ) -> Result<(), ProbeError> {
        let matcher = ElementMatcher::compile(selector)?;
        if self.poll_until(timeout, |html| matcher.matches(html)).await {
            Ok(())
        } else {
            Err(ProbeError::timeout(format!(
                "no element {:?} matching {:?} within {:?}",
                selector.element, selector.text_pattern, timeout
            )))
        }
    }

    async fn search_text(&self, phrase: &str, timeout: Duration) -> Result<TextMatch, ProbeError> {
        if self.poll_until(timeout, |html| contains_phrase(html, phrase)).await {
            Ok(TextMatch::Found)
        } else {
            Ok(TextMatch::NotFound)
        }
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), ProbeError> {
        // The whole document has been read; nothing is still loading.
        Ok(())
    }

    async fn capture(&self, _timeout: Duration) -> Result<Capture, ProbeError> {
        Ok(Capture {
            bytes: self.snapshot().into_bytes(),
            extension: "html".to_string(),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::timeout(err.to_string());
    }
    if err.is_redirect() {
        return ProbeError::new(ProbeFailure::Network, format!("redirect limit: {err}"));
    }
    ProbeError::new(ProbeFailure::Network, err.to_string())
}
