//! HTML5 parser using html5ever
//!
//! This module parses editor HTML into the arena [`Document`] the structured
//! converter walks.
//!
//! # Overview
//!
//! html5ever implements the WHATWG HTML5 parsing algorithm, so malformed
//! markup (unclosed tags, misnesting, stray closing tags) is recovered the
//! same way a browser would. The parser builds an `RcDom`, which is then
//! flattened into index-linked arena nodes so conversion never touches
//! reference-counted handles.
//!
//! # Examples
//!
//! ```rust
//! use note_markdown_converter::parser::parse_html;
//!
//! let doc = parse_html("<h1>Hello</h1><p>World").expect("parsed");
//! assert!(doc.len() > 1);
//! ```
//!
//! # Configuration
//!
//! Default html5ever configuration:
//! - **Scripting**: Disabled (scripts are not executed)
//! - **Error Handling**: Errors are collected but parsing continues
//!
//! # Performance Considerations
//!
//! - Parsing and flattening are both linear in document size
//! - Flattening uses an explicit stack, so deep nesting cannot overflow

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{Document, Element, NodeId, NodeKind};
use crate::error::ConversionError;

/// Parse an HTML string into an arena document
///
/// Fragments are accepted; html5ever wraps them in `html`/`head`/`body`.
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: The input is empty
pub fn parse_html(html: &str) -> Result<Document, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let document = flatten(&dom);

    tracing::trace!(nodes = document.len(), "parsed html document");
    Ok(document)
}

/// Copy an `RcDom` tree into an arena document
fn flatten(dom: &RcDom) -> Document {
    let mut document = Document::new();
    let root = document.root();

    let mut stack: Vec<(Handle, NodeId)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let kind = match handle.data {
            NodeData::Document => continue,
            NodeData::Doctype { .. } => NodeKind::Doctype,
            NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => NodeKind::Comment,
            NodeData::Text { ref contents } => NodeKind::Text(contents.borrow().to_string()),
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => NodeKind::Element(Element {
                name: name.local.as_ref().to_ascii_lowercase(),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.local.as_ref().to_string(), attr.value.to_string()))
                    .collect(),
            }),
        };

        let id = document.append(parent, kind);
        for child in handle.children.borrow().iter().rev() {
            stack.push((child.clone(), id));
        }
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<html><body><h1>Hello</h1></body></html>").expect("parse");
        let body = doc.body();
        assert!(doc.is_element_named(body, "body"));
        let h1 = doc.find_descendant(body, "h1").expect("h1");
        assert_eq!(doc.text_content(h1), "Hello");
    }

    #[test]
    fn test_parse_fragment_gets_body() {
        let doc = parse_html("<p>Content</p>").expect("parse");
        let body = doc.body();
        assert!(doc.is_element_named(body, "body"));
        assert!(doc.find_descendant(body, "p").is_some());
    }

    #[test]
    fn test_parse_empty_input() {
        match parse_html("") {
            Err(ConversionError::InvalidInput(_)) => (),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_html() {
        let doc = parse_html("<h1>Hello").expect("Should handle malformed HTML gracefully");
        assert!(doc.find_descendant(doc.body(), "h1").is_some());
    }

    #[test]
    fn test_parse_preserves_child_order() {
        let doc = parse_html("<ul><li>1</li><li>2</li><li>3</li></ul>").expect("parse");
        let ul = doc.find_descendant(doc.body(), "ul").expect("ul");
        let texts: Vec<String> = doc
            .element_children(ul)
            .map(|li| doc.text_content(li))
            .collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_attributes() {
        let doc = parse_html(r#"<li data-type="taskItem" data-checked="true">Done</li>"#)
            .expect("parse");
        let li = doc.find_descendant(doc.root(), "li").expect("li");
        assert_eq!(doc.attr(li, "data-type"), Some("taskItem"));
        assert_eq!(doc.attr(li, "data-checked"), Some("true"));
    }

    #[test]
    fn test_parse_decodes_entities_in_text() {
        let doc = parse_html("<p>&lt;tag&gt; &amp; &quot;q&quot;</p>").expect("parse");
        let p = doc.find_descendant(doc.body(), "p").expect("p");
        assert_eq!(doc.text_content(p), "<tag> & \"q\"");
    }

    #[test]
    fn test_parse_deep_nesting_does_not_overflow() {
        let depth = 5_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = parse_html(&html).expect("parse");
        assert_eq!(doc.text_content(doc.body()), "x");
    }

    proptest! {
        #[test]
        fn prop_malformed_html_no_crash(
            tag in prop::sample::select(vec!["div", "p", "span", "h1", "ul", "li", "table", "tr", "td"]),
            content in "[a-zA-Z0-9 ]{0,100}",
            close_tag in prop::bool::ANY,
            add_invalid_nesting in prop::bool::ANY,
        ) {
            let mut html = format!("<{}>{}", tag, content);
            if close_tag {
                html.push_str(&format!("</{}>", tag));
            }
            if add_invalid_nesting {
                html.push_str("<p><div>Invalid nesting</div></p>");
            }

            prop_assert!(parse_html(&html).is_ok());
        }

        #[test]
        fn prop_misnested_tags_handled(
            outer_tag in prop::sample::select(vec!["b", "i", "strong", "em"]),
            inner_tag in prop::sample::select(vec!["b", "i", "strong", "em"]),
            content in "[a-zA-Z0-9 ]{1,30}",
        ) {
            let html = format!("<{0}><{1}>{2}</{0}></{1}>", outer_tag, inner_tag, content);
            let doc = parse_html(&html);
            prop_assert!(doc.is_ok(), "Parser should handle misnested tags: {}", html);
        }
    }
}
