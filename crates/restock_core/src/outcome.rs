use std::fmt;

/// Result of probing one rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The presence element never appeared.
    ElementTimeout,
    /// The probe failed for any other reason.
    OtherError,
    /// The out-of-stock phrase is on the page.
    OutOfStockConfirmed,
    /// The page rendered and the out-of-stock phrase is absent.
    PossiblyInStock,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::ElementTimeout => write!(f, "element timeout"),
            ProbeOutcome::OtherError => write!(f, "probe error"),
            ProbeOutcome::OutOfStockConfirmed => write!(f, "out of stock"),
            ProbeOutcome::PossiblyInStock => write!(f, "possibly in stock"),
        }
    }
}

/// Result of the optional in-stock phrase check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondaryCheck {
    #[default]
    NotConfigured,
    Confirmed,
    Failed,
}

/// Everything the decision engine learns from one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub outcome: ProbeOutcome,
    pub secondary: SecondaryCheck,
}

impl Observation {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            secondary: SecondaryCheck::NotConfigured,
        }
    }

    pub fn in_stock(secondary: SecondaryCheck) -> Self {
        Self {
            outcome: ProbeOutcome::PossiblyInStock,
            secondary,
        }
    }
}

impl From<ProbeOutcome> for Observation {
    fn from(outcome: ProbeOutcome) -> Self {
        Self::new(outcome)
    }
}
