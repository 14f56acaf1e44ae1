//! Content negotiation for Markdown-speaking API clients
//!
//! Notes are stored as editor HTML. Writes from API clients may arrive as
//! Markdown and are converted before storage; reads always return Markdown.

use crate::detect::is_likely_markdown;
use crate::{html_to_markdown, markdown_to_html};

/// Format of inbound content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Markdown,
    Html,
}

impl ContentFormat {
    pub fn detect(content: &str) -> Self {
        if is_likely_markdown(content) {
            ContentFormat::Markdown
        } else {
            ContentFormat::Html
        }
    }
}

/// Content to persist for an API write
///
/// Markdown is rendered to editor HTML; anything else is stored unchanged.
pub fn prepare_for_storage(content: &str) -> String {
    match ContentFormat::detect(content) {
        ContentFormat::Markdown => {
            tracing::debug!(len = content.len(), "converting inbound markdown");
            markdown_to_html(content)
        }
        ContentFormat::Html => content.to_string(),
    }
}

/// Stored HTML as Markdown for an API read
pub fn render_for_api(stored_html: &str) -> String {
    html_to_markdown(stored_html)
}
