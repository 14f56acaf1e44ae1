//! Markdown-or-HTML classification for content arriving at the API boundary
//!
//! Content that contains an HTML tag is HTML. Otherwise it is Markdown when
//! any signal pattern matches, checked in a fixed order; plain text with no
//! signal is not Markdown.

use std::sync::OnceLock;

use regex::Regex;

/// Markdown signals in the order they are tried
const SIGNALS: &[(&str, &str)] = &[
    ("heading", r"(?m)^#{1,6}[ \t]+\S"),
    ("bold", r"\*\*[^*\n]+\*\*|__[^_\n]+__"),
    ("italic", r"(?:^|\s)\*[^*\s][^*\n]*\*|(?:^|\s)_[^_\s][^_\n]*_"),
    ("link", r"\[[^\]\n]+\]\([^)\s]+\)"),
    ("list", r"(?m)^[ \t]*(?:[-*+]|\d+\.)[ \t]+\S"),
    ("blockquote", r"(?m)^[ \t]*>"),
    ("fenced_code", r"(?m)^[ \t]*```"),
    ("inline_code", r"`[^`\n]+`"),
    ("task", r"(?m)^[ \t]*[-*+][ \t]+\[[ xX]\]"),
    ("wiki_link", r"\[\[[^\]\n]+\]\]"),
];

fn html_tag_regex() -> Option<&'static Regex> {
    static HTML_TAG: OnceLock<Option<Regex>> = OnceLock::new();
    HTML_TAG
        .get_or_init(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9-]*(?:\s[^<>]*)?/?>").ok())
        .as_ref()
}

fn signal_regexes() -> &'static [(&'static str, Regex)] {
    static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        SIGNALS
            .iter()
            .filter_map(|&(name, pattern)| Regex::new(pattern).ok().map(|re| (name, re)))
            .collect()
    })
}

/// True when content contains an HTML tag
pub fn contains_html_tag(content: &str) -> bool {
    html_tag_regex().is_some_and(|re| re.is_match(content))
}

/// Name of the first Markdown signal found in `content`
pub fn markdown_signal(content: &str) -> Option<&'static str> {
    signal_regexes()
        .iter()
        .find(|(_, re)| re.is_match(content))
        .map(|(name, _)| *name)
}

/// Heuristic classifier: does this content need Markdown to HTML conversion?
///
/// # Examples
///
/// ```rust
/// use note_markdown_converter::is_likely_markdown;
///
/// assert!(!is_likely_markdown("<p>Hi</p>"));
/// assert!(is_likely_markdown("# Hi"));
/// assert!(is_likely_markdown("see [[Note]]"));
/// ```
pub fn is_likely_markdown(content: &str) -> bool {
    if content.trim().is_empty() || contains_html_tag(content) {
        return false;
    }
    match markdown_signal(content) {
        Some(signal) => {
            tracing::trace!(signal, "content classified as markdown");
            true
        }
        None => false,
    }
}
