use std::time::Duration;

use restock_core::PresenceSelector;

use crate::{Capture, ProbeError, TextMatch};

/// Opens product pages for probing.
#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn Page>, ProbeError>;
}

/// A rendered page. Every wait is bounded by the timeout it is given.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    /// Wait until an element matching `selector` appears.
    /// Fails with [`ProbeFailure::Timeout`](crate::ProbeFailure::Timeout) when it never does.
    async fn wait_for_element(
        &self,
        selector: &PresenceSelector,
        timeout: Duration,
    ) -> Result<(), ProbeError>;

    /// Search the rendered text for a literal phrase until found or `timeout` elapses.
    async fn search_text(&self, phrase: &str, timeout: Duration) -> Result<TextMatch, ProbeError>;

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), ProbeError>;

    async fn capture(&self, timeout: Duration) -> Result<Capture, ProbeError>;
}
