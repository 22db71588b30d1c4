//! Restock core: pure decision logic and the persisted alert-state model.
mod decide;
mod outcome;
mod quirks;
mod store;
mod target;
mod time;

pub use decide::{alert_status, decide, AlertStatus, Decision, Effect};
pub use outcome::{Observation, ProbeOutcome, SecondaryCheck};
pub use quirks::{Debounce, MonitoredTarget, QuirkProfile, QuirkRule, QuirkTable};
pub use store::{AlertStore, RecordIssue, RecordIssueKind, COUNTER_PREFIX};
pub use target::{
    parse_target_list, PresenceSelector, SkippedLine, Target, TargetLineError, TargetList,
};
pub use time::{CooldownPolicy, Timestamp};
