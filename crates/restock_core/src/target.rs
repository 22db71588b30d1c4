use std::collections::HashSet;

use thiserror::Error;

/// Number of comma-separated fields in a target list line.
const TARGET_FIELDS: usize = 6;

/// Element pattern plus text pattern that signals the page rendered meaningful content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceSelector {
    /// CSS selector for the element type.
    pub element: String,
    /// Regular expression the element's text must match.
    pub text_pattern: String,
}

impl PresenceSelector {
    pub fn new(element: impl Into<String>, text_pattern: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            text_pattern: text_pattern.into(),
        }
    }

    /// Both halves empty disables the presence check.
    pub fn is_disabled(&self) -> bool {
        self.element.is_empty() && self.text_pattern.is_empty()
    }
}

/// One monitored product page and its detection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub out_of_stock_phrase: String,
    pub presence: PresenceSelector,
    pub product_label: String,
    pub in_stock_phrase: Option<String>,
}

impl Target {
    pub fn new(url: impl Into<String>, out_of_stock_phrase: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            out_of_stock_phrase: out_of_stock_phrase.into(),
            presence: PresenceSelector::default(),
            product_label: String::new(),
            in_stock_phrase: None,
        }
    }

    pub fn with_presence(mut self, presence: PresenceSelector) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.product_label = label.into();
        self
    }

    pub fn with_in_stock_phrase(mut self, phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        self.in_stock_phrase = (!phrase.trim().is_empty()).then_some(phrase);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetLineError {
    #[error("empty url")]
    EmptyUrl,
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported scheme {scheme:?} in {url:?}")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("duplicate url {0}")]
    Duplicate(String),
}

/// A target list line that was not turned into a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub error: TargetLineError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetList {
    pub targets: Vec<Target>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse the flat target list.
///
/// Fields per line: `url, outOfStockPhrase, elementType, phrase, productLabel, inStockPhrase`.
/// Missing or whitespace-only fields are empty; blank lines and `#` comments are ignored.
/// Only `http` and `https` URLs are monitored.
pub fn parse_target_list(raw: &str) -> TargetList {
    let mut list = TargetList::default();
    let mut seen = HashSet::new();

    for (index, line) in raw.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let mut fields: Vec<&str> = line.split(',').map(blank_as_empty).collect();
        if fields.len() < TARGET_FIELDS {
            fields.resize(TARGET_FIELDS, "");
        }

        let url = fields[0].trim();
        if let Err(error) = validate_url(url) {
            list.skipped.push(SkippedLine {
                line: line_no,
                error,
            });
            continue;
        }
        if !seen.insert(url.to_string()) {
            list.skipped.push(SkippedLine {
                line: line_no,
                error: TargetLineError::Duplicate(url.to_string()),
            });
            continue;
        }

        list.targets.push(
            Target::new(url, fields[1])
                .with_presence(PresenceSelector::new(fields[2], fields[3]))
                .with_label(fields[4])
                .with_in_stock_phrase(fields[5]),
        );
    }

    list
}

fn blank_as_empty(field: &str) -> &str {
    if field.trim().is_empty() {
        ""
    } else {
        field
    }
}

fn validate_url(url: &str) -> Result<(), TargetLineError> {
    if url.is_empty() {
        return Err(TargetLineError::EmptyUrl);
    }
    let parsed = url::Url::parse(url).map_err(|err| TargetLineError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(TargetLineError::UnsupportedScheme {
            url: url.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}
