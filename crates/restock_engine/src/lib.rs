//! Restock engine: page probing, notification, persistence and the cycle runner.
mod artifacts;
mod browser;
mod cycle;
mod decode;
mod document;
mod fetch;
mod notify;
mod persist;
mod probe;
mod types;

pub use artifacts::{ArtifactKind, ArtifactWriter};
pub use browser::{Browser, Page};
pub use cycle::{
    system_clock, Clock, CycleReport, Delivery, Monitor, MonitorConfig, TargetReport,
};
pub use decode::decode_body;
pub use document::{contains_phrase, visible_text, ElementMatcher};
pub use fetch::{FetchSettings, HttpBrowser, HttpPage};
pub use notify::{format_notification, ConsoleNotifier, Notifier, NotifyError, WebhookNotifier};
pub use persist::{
    ensure_dir, load_alert_store, load_targets, save_alert_store, write_atomically, PersistError,
};
pub use probe::{probe_target, ProbeSettings};
pub use types::{Capture, ProbeError, ProbeFailure, TextMatch};
