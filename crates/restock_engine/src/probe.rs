use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use restock_core::{MonitoredTarget, Observation, ProbeOutcome, SecondaryCheck, Timestamp};

use crate::artifacts::{ArtifactKind, ArtifactWriter};
use crate::browser::Page;
use crate::TextMatch;

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub presence_timeout: Duration,
    pub phrase_timeout: Duration,
    pub network_idle_timeout: Duration,
    pub capture_timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            presence_timeout: Duration::from_secs(30),
            phrase_timeout: Duration::from_secs(5),
            network_idle_timeout: Duration::from_secs(60),
            capture_timeout: Duration::from_secs(10),
        }
    }
}

/// Run the presence check, optional network settle, out-of-stock phrase search
/// and optional in-stock confirmation against an opened page.
///
/// A presence timeout captures a load-failure artifact tagged with `now`.
pub async fn probe_target(
    page: &dyn Page,
    monitored: &MonitoredTarget,
    settings: &ProbeSettings,
    artifacts: &ArtifactWriter,
    now: Timestamp,
) -> Observation {
    let target = &monitored.target;

    if !target.presence.is_disabled() {
        if let Err(err) = page
            .wait_for_element(&target.presence, settings.presence_timeout)
            .await
        {
            if err.is_timeout() {
                engine_warn!("Unable to resolve webpage {}: {}", target.url, err);
                capture_artifact(page, settings, artifacts, ArtifactKind::LoadFailed, now).await;
                return ProbeOutcome::ElementTimeout.into();
            }
            engine_warn!("Presence check failed for {}: {}", target.url, err);
            return ProbeOutcome::OtherError.into();
        }
    }

    if monitored.profile.wait_for_network_idle {
        if let Err(err) = page
            .wait_for_network_idle(settings.network_idle_timeout)
            .await
        {
            engine_warn!("Unstable - {}: {}", target.url, err);
            return ProbeOutcome::OtherError.into();
        }
    }

    if !target.out_of_stock_phrase.trim().is_empty() {
        match page
            .search_text(&target.out_of_stock_phrase, settings.phrase_timeout)
            .await
        {
            Ok(TextMatch::Found) => return ProbeOutcome::OutOfStockConfirmed.into(),
            Ok(TextMatch::NotFound) => {}
            Err(err) => {
                engine_warn!("Phrase search failed for {}: {}", target.url, err);
                return ProbeOutcome::OtherError.into();
            }
        }
    }

    let secondary = match &target.in_stock_phrase {
        None => SecondaryCheck::NotConfigured,
        Some(phrase) => match page.search_text(phrase, settings.phrase_timeout).await {
            Ok(TextMatch::Found) => SecondaryCheck::Confirmed,
            Ok(TextMatch::NotFound) => SecondaryCheck::Failed,
            Err(err) => {
                engine_debug!("In-stock check errored for {}: {}", target.url, err);
                SecondaryCheck::Failed
            }
        },
    };
    Observation::in_stock(secondary)
}

/// Best effort: failures are logged and never affect the decision.
pub(crate) async fn capture_artifact(
    page: &dyn Page,
    settings: &ProbeSettings,
    artifacts: &ArtifactWriter,
    kind: ArtifactKind,
    at: Timestamp,
) {
    if !artifacts.is_enabled() {
        return;
    }
    match page.capture(settings.capture_timeout).await {
        Ok(capture) => {
            if let Err(err) = artifacts.store(kind, at, &capture) {
                engine_warn!("Failed to store {} artifact: {}", kind, err);
            }
        }
        Err(err) => engine_warn!("Failed to capture {} artifact: {}", kind, err),
    }
}
