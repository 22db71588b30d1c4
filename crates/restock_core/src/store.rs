use std::collections::BTreeMap;
use std::fmt::Write;

use crate::Timestamp;

/// Reserved key prefix for source counter records.
pub const COUNTER_PREFIX: &str = "counter:";

/// Persisted memory of the monitor: active alerts per target URL and
/// debounce counters per source. The two tables never share keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertStore {
    alerts: BTreeMap<String, Timestamp>,
    counters: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIssueKind {
    MissingField,
    InvalidTimestamp(String),
    InvalidCount(String),
}

/// A state line that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    /// 1-based line number.
    pub line: usize,
    pub kind: RecordIssueKind,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the flat record format, skipping lines it cannot use.
    ///
    /// `url,nanos` records an active alert, `counter:source,count` a source
    /// counter. An empty value means "nothing active" and is not an issue.
    pub fn parse(raw: &str) -> (Self, Vec<RecordIssue>) {
        let mut store = Self::new();
        let mut issues = Vec::new();

        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let issue = |kind| RecordIssue {
                line: index + 1,
                kind,
            };

            let Some((key, value)) = line.rsplit_once(',') else {
                issues.push(issue(RecordIssueKind::MissingField));
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                issues.push(issue(RecordIssueKind::MissingField));
                continue;
            }
            if value.is_empty() {
                continue;
            }

            if let Some(source) = key.strip_prefix(COUNTER_PREFIX) {
                if source.trim().is_empty() {
                    issues.push(issue(RecordIssueKind::MissingField));
                    continue;
                }
                match value.parse::<u32>() {
                    Ok(count) => store.set_counter(source, count),
                    Err(_) => issues.push(issue(RecordIssueKind::InvalidCount(value.to_string()))),
                }
            } else {
                match value.parse::<i64>() {
                    Ok(nanos) if nanos >= 0 => {
                        store.mark_alerted(key, Timestamp::from_nanos(nanos))
                    }
                    _ => issues.push(issue(RecordIssueKind::InvalidTimestamp(value.to_string()))),
                }
            }
        }

        (store, issues)
    }

    /// Render active alerts and non-zero counters, sorted by key.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (url, at) in &self.alerts {
            let _ = writeln!(out, "{url},{at}");
        }
        for (source, count) in self.counters.iter().filter(|(_, count)| **count > 0) {
            let _ = writeln!(out, "{COUNTER_PREFIX}{source},{count}");
        }
        out
    }

    pub fn last_alerted(&self, url: &str) -> Option<Timestamp> {
        self.alerts.get(url).copied()
    }

    pub fn mark_alerted(&mut self, url: &str, at: Timestamp) {
        self.alerts.insert(url.to_string(), at);
    }

    /// Returns whether an alert was active.
    pub fn clear_alert(&mut self, url: &str) -> bool {
        self.alerts.remove(url).is_some()
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = (&str, Timestamp)> {
        self.alerts.iter().map(|(url, at)| (url.as_str(), *at))
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn counter(&self, source: &str) -> u32 {
        self.counters.get(source).copied().unwrap_or(0)
    }

    pub fn set_counter(&mut self, source: &str, count: u32) {
        if count == 0 {
            self.counters.remove(source);
        } else {
            self.counters.insert(source.to_string(), count);
        }
    }

    /// Increment and return the new count.
    pub fn increment_counter(&mut self, source: &str) -> u32 {
        let next = self.counter(source).saturating_add(1);
        self.set_counter(source, next);
        next
    }

    pub fn reset_counter(&mut self, source: &str) {
        self.set_counter(source, 0);
    }
}
