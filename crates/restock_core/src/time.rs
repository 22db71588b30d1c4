use std::fmt;
use std::time::Duration;

/// Wall-clock instant in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Nanoseconds elapsed from `self` until `now`. Negative when `self` lies in the future.
    pub fn age_at(self, now: Timestamp) -> i64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum age an alert must reach before the target may be probed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    cooldown_nanos: i64,
}

impl CooldownPolicy {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_nanos: duration_to_nanos(cooldown),
        }
    }

    pub fn cooldown_nanos(&self) -> i64 {
        self.cooldown_nanos
    }

    /// An alert whose age equals the cooldown has expired.
    pub fn is_cooling(&self, alerted_at: Timestamp, now: Timestamp) -> bool {
        alerted_at.age_at(now) < self.cooldown_nanos
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}

fn duration_to_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}
