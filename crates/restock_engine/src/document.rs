use regex::Regex;
use restock_core::PresenceSelector;
use scraper::{Html, Selector};

use crate::{ProbeError, ProbeFailure};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Compiled form of a [`PresenceSelector`].
#[derive(Debug, Clone)]
pub struct ElementMatcher {
    selector: Selector,
    text: Regex,
}

impl ElementMatcher {
    /// An empty element pattern matches any element; an empty text pattern any text.
    pub fn compile(presence: &PresenceSelector) -> Result<Self, ProbeError> {
        let css = if presence.element.trim().is_empty() {
            "*"
        } else {
            presence.element.as_str()
        };
        let selector = Selector::parse(css).map_err(|err| {
            ProbeError::new(
                ProbeFailure::InvalidSelector,
                format!("element pattern {css:?}: {err:?}"),
            )
        })?;
        let text = Regex::new(&presence.text_pattern).map_err(|err| {
            ProbeError::new(
                ProbeFailure::InvalidSelector,
                format!("text pattern {:?}: {err}", presence.text_pattern),
            )
        })?;
        Ok(Self { selector, text })
    }

    pub fn matches(&self, html: &str) -> bool {
        let doc = Html::parse_document(html);
        doc.select(&self.selector)
            .any(|element| self.text.is_match(&element.text().collect::<String>()))
    }
}

/// Text a reader would see: text nodes outside script-like elements, whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut words = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()));
        if !hidden {
            words.extend(text.split_whitespace().map(str::to_owned));
        }
    }
    words.join(" ")
}

/// Literal phrase search over [`visible_text`], tolerant of whitespace differences.
pub fn contains_phrase(html: &str, phrase: &str) -> bool {
    let needle = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    !needle.is_empty() && visible_text(html).contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><script>var s = "Sold out";</script></head>
        <body><h1>PS5   Console</h1><button class="buy">Add to cart</button></body></html>"#;

    #[test]
    fn script_text_is_not_visible() {
        assert!(!contains_phrase(PAGE, "Sold out"));
        assert!(contains_phrase(PAGE, "PS5 Console"));
    }

    #[test]
    fn element_matcher_checks_selector_and_text() {
        let matcher = ElementMatcher::compile(&PresenceSelector::new("button.buy", "^Add to")).unwrap();
        assert!(matcher.matches(PAGE));

        let matcher = ElementMatcher::compile(&PresenceSelector::new("h2", "")).unwrap();
        assert!(!matcher.matches(PAGE));
    }

    #[test]
    fn invalid_patterns_are_selector_errors() {
        let err = ElementMatcher::compile(&PresenceSelector::new("div[", "")).unwrap_err();
        assert_eq!(err.kind, ProbeFailure::InvalidSelector);

        let err = ElementMatcher::compile(&PresenceSelector::new("div", "(")).unwrap_err();
        assert_eq!(err.kind, ProbeFailure::InvalidSelector);
    }
}
