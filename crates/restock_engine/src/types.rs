use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProbeError {
    pub kind: ProbeFailure,
    pub message: String,
}

impl ProbeError {
    pub fn new(kind: ProbeFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProbeFailure::Timeout, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ProbeFailure::Timeout
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64 },
    UnsupportedContentType { content_type: String },
    InvalidSelector,
    Network,
    Other,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::InvalidUrl => write!(f, "invalid url"),
            ProbeFailure::HttpStatus(code) => write!(f, "http status {code}"),
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            ProbeFailure::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            ProbeFailure::InvalidSelector => write!(f, "invalid selector"),
            ProbeFailure::Network => write!(f, "network error"),
            ProbeFailure::Other => write!(f, "probe error"),
        }
    }
}

/// Result of searching rendered text for a literal phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Found,
    NotFound,
}

/// A diagnostic image or snapshot of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. `png` or `html`.
    pub extension: String,
}
