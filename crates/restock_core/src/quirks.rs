//! Site quirk profiles: extra pre-probe waits and false-positive debouncing
//! for retailers whose pages render misleading intermediate states.

use crate::Target;

/// One configured rule, matched by case-insensitive substring against a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuirkRule {
    pub pattern: String,
    pub wait_for_network_idle: bool,
    /// Consecutive qualifying positives required before firing. 0 disables debouncing.
    pub debounce_threshold: u32,
    /// Counter key shared by every target matching this rule. Defaults to `pattern`.
    pub source: Option<String>,
}

impl QuirkRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            wait_for_network_idle: false,
            debounce_threshold: 0,
            source: None,
        }
    }

    pub fn wait_for_network_idle(mut self) -> Self {
        self.wait_for_network_idle = true;
        self
    }

    pub fn debounce(mut self, threshold: u32, source: impl Into<String>) -> Self {
        self.debounce_threshold = threshold;
        self.source = Some(source.into());
        self
    }

    fn matches(&self, url_lower: &str) -> bool {
        !self.pattern.is_empty() && url_lower.contains(&self.pattern.to_ascii_lowercase())
    }

    fn debounce_rule(&self) -> Option<Debounce> {
        (self.debounce_threshold > 0).then(|| Debounce {
            source: self.source.clone().unwrap_or_else(|| self.pattern.clone()),
            threshold: self.debounce_threshold,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    pub source: String,
    pub threshold: u32,
}

/// Resolved per-target behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuirkProfile {
    pub wait_for_network_idle: bool,
    pub debounce: Option<Debounce>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuirkTable {
    rules: Vec<QuirkRule>,
}

impl QuirkTable {
    pub fn new(rules: Vec<QuirkRule>) -> Self {
        Self { rules }
    }

    /// Rules for the retailers known to need them.
    pub fn builtin() -> Self {
        Self::new(vec![
            QuirkRule::new("microsoft.co")
                .wait_for_network_idle()
                .debounce(4, "microsoft"),
            QuirkRule::new("xbox.com").wait_for_network_idle(),
        ])
    }

    pub fn rules(&self) -> &[QuirkRule] {
        &self.rules
    }

    /// Every matching rule contributes its network wait; the first matching
    /// debounce rule wins.
    pub fn resolve(&self, url: &str) -> QuirkProfile {
        let url_lower = url.to_ascii_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.matches(&url_lower))
            .fold(QuirkProfile::default(), |mut profile, rule| {
                profile.wait_for_network_idle |= rule.wait_for_network_idle;
                if profile.debounce.is_none() {
                    profile.debounce = rule.debounce_rule();
                }
                profile
            })
    }

    /// Resolve every target once, at load time.
    pub fn apply(&self, targets: Vec<Target>) -> Vec<MonitoredTarget> {
        targets
            .into_iter()
            .map(|target| {
                let profile = self.resolve(&target.url);
                MonitoredTarget { target, profile }
            })
            .collect()
    }
}

/// A target paired with its resolved quirk profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredTarget {
    pub target: Target,
    pub profile: QuirkProfile,
}

impl MonitoredTarget {
    pub fn new(target: Target, profile: QuirkProfile) -> Self {
        Self { target, profile }
    }

    pub fn url(&self) -> &str {
        &self.target.url
    }
}
