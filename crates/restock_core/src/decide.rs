use crate::{
    AlertStore, CooldownPolicy, MonitoredTarget, Observation, ProbeOutcome, SecondaryCheck,
    Timestamp,
};

/// Alert state of a target at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Inactive,
    Cooling { alerted_at: Timestamp },
    Expired { alerted_at: Timestamp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Alert younger than the cooldown; nothing probed, nothing changed.
    CoolingDown,
    /// Expired alert reconfirmed out of stock; alert removed.
    Cleared,
    /// Expired alert still in stock; timestamp refreshed without notifying.
    Refreshed,
    /// No alert and the page says out of stock.
    StillOutOfStock,
    /// The page could not be probed; nothing changed.
    ProbeFailed(ProbeOutcome),
    /// Secondary in-stock check failed; any alert is removed.
    FalsePositive { cleared: bool },
    /// Positive probe from a debounced source below its threshold.
    Debounced { count: u32, threshold: u32 },
    /// New in-stock event.
    Fire,
}

impl Decision {
    pub fn counts_as_in_stock(&self) -> bool {
        matches!(
            self,
            Decision::CoolingDown | Decision::Refreshed | Decision::Fire
        )
    }
}

/// Side effects requested by a decision, executed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CaptureConfirmation { url: String, at: Timestamp },
    Notify {
        product_label: String,
        url: String,
        at: Timestamp,
    },
    RecordFalsePositive { url: String },
}

pub fn alert_status(
    store: &AlertStore,
    url: &str,
    now: Timestamp,
    policy: &CooldownPolicy,
) -> AlertStatus {
    match store.last_alerted(url) {
        None => AlertStatus::Inactive,
        Some(alerted_at) if policy.is_cooling(alerted_at, now) => {
            AlertStatus::Cooling { alerted_at }
        }
        Some(alerted_at) => AlertStatus::Expired { alerted_at },
    }
}

/// Combine one observation with the stored state, mutating the store in place.
pub fn decide(
    store: &mut AlertStore,
    monitored: &MonitoredTarget,
    observation: Observation,
    now: Timestamp,
    policy: &CooldownPolicy,
) -> (Decision, Vec<Effect>) {
    let url = monitored.url();
    let status = alert_status(store, url, now, policy);
    if matches!(status, AlertStatus::Cooling { .. }) {
        return (Decision::CoolingDown, Vec::new());
    }
    let alerted = matches!(status, AlertStatus::Expired { .. });
    let source = monitored
        .profile
        .debounce
        .as_ref()
        .map(|debounce| debounce.source.as_str());

    match observation.outcome {
        outcome @ (ProbeOutcome::ElementTimeout | ProbeOutcome::OtherError) => {
            (Decision::ProbeFailed(outcome), Vec::new())
        }
        ProbeOutcome::OutOfStockConfirmed => {
            if let Some(source) = source {
                store.reset_counter(source);
            }
            if alerted {
                store.clear_alert(url);
                (Decision::Cleared, Vec::new())
            } else {
                (Decision::StillOutOfStock, Vec::new())
            }
        }
        ProbeOutcome::PossiblyInStock if observation.secondary == SecondaryCheck::Failed => {
            if let Some(source) = source {
                store.reset_counter(source);
            }
            let cleared = store.clear_alert(url);
            (
                Decision::FalsePositive { cleared },
                vec![Effect::RecordFalsePositive {
                    url: url.to_string(),
                }],
            )
        }
        ProbeOutcome::PossiblyInStock if alerted => {
            store.mark_alerted(url, now);
            (Decision::Refreshed, Vec::new())
        }
        ProbeOutcome::PossiblyInStock => {
            if let Some(debounce) = &monitored.profile.debounce {
                let count = store.increment_counter(&debounce.source);
                if count < debounce.threshold {
                    return (
                        Decision::Debounced {
                            count,
                            threshold: debounce.threshold,
                        },
                        Vec::new(),
                    );
                }
                store.reset_counter(&debounce.source);
            }

            store.mark_alerted(url, now);
            let effects = vec![
                Effect::CaptureConfirmation {
                    url: url.to_string(),
                    at: now,
                },
                Effect::Notify {
                    product_label: monitored.target.product_label.clone(),
                    url: url.to_string(),
                    at: now,
                },
            ];
            (Decision::Fire, effects)
        }
    }
}
