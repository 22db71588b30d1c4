use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use engine_logging::{engine_diagnostic, engine_error, engine_info, engine_warn};
use restock_core::{
    alert_status, decide, AlertStatus, AlertStore, CooldownPolicy, Decision, Effect,
    MonitoredTarget, ProbeOutcome, Timestamp,
};

use crate::artifacts::{ArtifactKind, ArtifactWriter};
use crate::browser::Browser;
use crate::notify::{format_notification, Notifier};
use crate::probe::{capture_artifact, probe_target, ProbeSettings};

/// Source of "now" for cooldown arithmetic and artifact names.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Timestamp::from_nanos(nanos)
    })
}

#[derive(Clone)]
pub struct MonitorConfig {
    pub cooldown: CooldownPolicy,
    pub probe: ProbeSettings,
    pub artifacts: ArtifactWriter,
    pub clock: Clock,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cooldown: CooldownPolicy::default(),
            probe: ProbeSettings::default(),
            artifacts: ArtifactWriter::disabled(),
            clock: system_clock(),
        }
    }
}

/// Whether a fired notification reached its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub url: String,
    pub decision: Decision,
    pub delivery: Option<Delivery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub targets: Vec<TargetReport>,
}

impl CycleReport {
    pub fn any_in_stock(&self) -> bool {
        self.targets
            .iter()
            .any(|report| report.decision.counts_as_in_stock())
    }

    pub fn fired(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|report| report.decision == Decision::Fire)
    }

    pub fn summary(&self) -> &'static str {
        if self.any_in_stock() {
            "At least one item in stock"
        } else {
            "Still out of stock"
        }
    }
}

/// Runs monitoring cycles. Targets are probed one after another; the store is
/// owned by the caller and borrowed mutably for the duration of a cycle.
pub struct Monitor {
    browser: Box<dyn Browser>,
    notifier: Box<dyn Notifier>,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        browser: Box<dyn Browser>,
        notifier: Box<dyn Notifier>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            browser,
            notifier,
            config,
        }
    }

    /// Process every target once. Per-target failures are logged and never abort the cycle.
    pub async fn run_cycle(
        &self,
        targets: &[MonitoredTarget],
        store: &mut AlertStore,
    ) -> CycleReport {
        let mut report = CycleReport::default();
        for monitored in targets {
            report.targets.push(self.check_target(monitored, store).await);
        }
        engine_info!("{}", report.summary());
        report
    }

    async fn check_target(
        &self,
        monitored: &MonitoredTarget,
        store: &mut AlertStore,
    ) -> TargetReport {
        let started = Instant::now();
        let now = (self.config.clock)();
        let url = monitored.url();
        let finish = |decision: Decision, delivery: Option<Delivery>| TargetReport {
            url: url.to_string(),
            decision,
            delivery,
        };

        if let AlertStatus::Cooling { alerted_at } =
            alert_status(store, url, now, &self.config.cooldown)
        {
            engine_info!(
                "Skipping {}: alerted {}s ago",
                url,
                alerted_at.age_at(now) / 1_000_000_000
            );
            return finish(Decision::CoolingDown, None);
        }

        let page = match self.browser.open(url).await {
            Ok(page) => page,
            Err(err) => {
                let outcome = if err.is_timeout() {
                    ProbeOutcome::ElementTimeout
                } else {
                    ProbeOutcome::OtherError
                };
                engine_warn!("Failed to open {}: {}", url, err);
                let (decision, _) =
                    decide(store, monitored, outcome.into(), now, &self.config.cooldown);
                return finish(decision, None);
            }
        };

        let observation = probe_target(
            page.as_ref(),
            monitored,
            &self.config.probe,
            &self.config.artifacts,
            now,
        )
        .await;
        let (decision, effects) =
            decide(store, monitored, observation, now, &self.config.cooldown);
        self.log_decision(url, &decision);

        let mut delivery = None;
        for effect in effects {
            match effect {
                Effect::CaptureConfirmation { at, .. } => {
                    capture_artifact(
                        page.as_ref(),
                        &self.config.probe,
                        &self.config.artifacts,
                        ArtifactKind::InStock,
                        at,
                    )
                    .await;
                }
                Effect::Notify {
                    product_label,
                    url,
                    at,
                } => {
                    let message = format_notification(&product_label, &url, at);
                    delivery = Some(self.dispatch(&message).await);
                }
                Effect::RecordFalsePositive { url } => {
                    engine_diagnostic!(
                        "{}:{} took {:?}",
                        chrono::DateTime::from_timestamp_nanos(now.as_nanos()).to_rfc3339(),
                        url,
                        started.elapsed()
                    );
                }
            }
        }

        finish(decision, delivery)
    }

    /// Delivery failure does not undo the alert already recorded.
    async fn dispatch(&self, message: &str) -> Delivery {
        match self.notifier.notify(message).await {
            Ok(()) => {
                engine_info!("Sent notification: {}", message);
                Delivery::Sent
            }
            Err(err) => {
                engine_error!("Error sending notification - {}: {}", message, err);
                Delivery::Failed(err.to_string())
            }
        }
    }

    fn log_decision(&self, url: &str, decision: &Decision) {
        match decision {
            Decision::Fire => engine_info!("In stock: {}", url),
            Decision::Cleared => engine_info!("Back out of stock, alert cleared: {}", url),
            Decision::Refreshed => engine_info!("Still in stock: {}", url),
            Decision::Debounced { count, threshold } => {
                engine_info!("Debounced hit {}/{} for {}", count, threshold, url)
            }
            Decision::FalsePositive { cleared } => {
                engine_info!("False positive for {} (alert cleared: {})", url, cleared)
            }
            Decision::StillOutOfStock => engine_info!("Out of stock: {}", url),
            Decision::ProbeFailed(outcome) => engine_info!("No decision for {}: {}", url, outcome),
            Decision::CoolingDown => {}
        }
    }
}
