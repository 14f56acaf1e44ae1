//! Note Markdown Converter
//!
//! This library converts between the notes editor's HTML dialect and
//! Markdown, in both directions.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `dialect`: The shared table of constructs, tags, attributes and markers
//! - `normalize`: Whitespace and entity normalization
//! - `dom` / `parser`: html5ever parsing into an index-based arena
//! - `registry`: Element handlers keyed by tag and attribute selectors
//! - `converter`: Structured HTML to Markdown conversion over the arena
//! - `pattern`: Parse-free HTML to Markdown fallback built from ordered
//!   string passes
//! - `generator`: Markdown to editor HTML via comrak and dialect passes
//! - `detect`: Markdown-or-HTML classification
//! - `negotiate`, `preview`, `export`: API read/write conversion, streaming
//!   preview and zip export built on the functions below
//!
//! # Totality
//!
//! [`html_to_markdown`] and [`markdown_to_html`] never fail. Empty input
//! yields an empty string; when structured conversion fails the pattern
//! converter is used instead.
//!
//! # Examples
//!
//! ```rust
//! use note_markdown_converter::{html_to_markdown, markdown_to_html};
//!
//! let md = html_to_markdown("<h2>Hello <strong>World</strong></h2>");
//! assert_eq!(md, "## Hello **World**");
//!
//! let html = markdown_to_html("## Hello **World**");
//! assert_eq!(html, "<h2>Hello <strong>World</strong></h2>");
//! ```

use std::sync::OnceLock;

// Module declarations
pub mod converter;
pub mod detect;
pub mod dialect;
pub mod dom;
pub mod error;
pub mod export;
pub mod generator;
pub mod negotiate;
pub mod normalize;
pub mod parser;
pub mod pattern;
pub mod preview;
pub mod registry;

// Re-export main types for convenience
pub use converter::{ConversionOptions, DomConverter, DomConverterBuilder, HandlerContext, LinkStyle};
pub use detect::is_likely_markdown;
pub use error::ConversionError;
pub use generator::{GeneratorOptions, MarkdownGenerator};
pub use parser::parse_html;
pub use pattern::PatternConverter;
pub use registry::{Handler, Registry, Selector};

fn default_converter() -> &'static DomConverter {
    static CONVERTER: OnceLock<DomConverter> = OnceLock::new();
    CONVERTER.get_or_init(DomConverter::new)
}

fn default_pattern_converter() -> &'static PatternConverter {
    static CONVERTER: OnceLock<PatternConverter> = OnceLock::new();
    CONVERTER.get_or_init(PatternConverter::default)
}

fn default_generator() -> &'static MarkdownGenerator {
    static GENERATOR: OnceLock<MarkdownGenerator> = OnceLock::new();
    GENERATOR.get_or_init(MarkdownGenerator::default)
}

/// Convert editor HTML to Markdown with the default configuration
///
/// Never fails; empty or whitespace-only input returns an empty string.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    match default_converter().convert(html) {
        Ok(markdown) => markdown,
        Err(err) => {
            tracing::warn!(
                error = %err,
                code = err.code(),
                "structured conversion failed, using pattern converter"
            );
            default_pattern_converter().convert(html)
        }
    }
}

/// Render Markdown as editor HTML with the default configuration
///
/// Never fails; empty or whitespace-only input returns an empty string.
pub fn markdown_to_html(markdown: &str) -> String {
    default_generator().generate(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(html_to_markdown(""), "");
        assert_eq!(html_to_markdown("  \n "), "");
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("\n\n"), "");
    }

    #[test]
    fn test_unmatched_closing_tags() {
        assert_eq!(html_to_markdown("</div></span></li>"), "");
    }

    #[test]
    fn test_defaults_are_shared() {
        assert!(std::ptr::eq(default_converter(), default_converter()));
        assert!(std::ptr::eq(default_generator(), default_generator()));
    }
}
