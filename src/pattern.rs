//! Pattern-based converter - HTML to Markdown without a parse tree
//!
//! [`PatternConverter`] implements the same dialect as
//! [`DomConverter`](crate::converter::DomConverter) as a fixed, ordered
//! pipeline of string rewrites. It is the fallback used when a structured
//! conversion fails, and it never returns an error: unterminated markup
//! degrades to whatever text survives the passes.
//!
//! # Pass Order
//!
//! 0. Drop comments, `<head>` and non-content elements with their content
//! 1. Extract `<pre>` blocks into placeholders (code content is protected
//!    from every later pass and decoded exactly once)
//! 2. Headings
//! 3. Inline formatting: code, bold, italic, strike, underline, highlight
//! 4. Wiki links, links, figures, images
//! 5. Task items (and the task-list marker)
//! 6. Lists, innermost first
//! 7. Horizontal rules and blockquotes
//! 8. Paragraphs and line breaks
//! 9. Tables
//! 10. Video embeds
//! 11. Strip every remaining tag, keeping its content
//! 12. Decode entities, restore code blocks, normalize blank lines
//!
//! Between passes 1 and 2, HTML whitespace is collapsed and whitespace
//! touching block-level tags is removed, matching how the structured
//! converter treats layout whitespace.
//!
//! Placeholders use the private-use code points U+E000..=U+E004; those are
//! dropped from the input before pass 0.
//!
//! # Complexity
//!
//! Every pattern is a `regex` crate pattern, which runs in time linear in
//! the input. Inline formatting, lists, blockquotes and tables are folded in
//! one left-to-right scan with an explicit stack instead of repeated
//! searches.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::converter::{
    BULLET_WIDTH, ConversionOptions, LinkStyle, code_language, escape_title, fenced_code,
    flatten_table, pipe_table, push_indented, table_cell, wrap_inline,
};
use crate::dialect::{
    self, ATTR_DATA_CHECKED, ATTR_DATA_TYPE, NON_CONTENT_TAGS, TASK_ITEM_TYPE, TASK_LIST_TYPE,
};
use crate::dom::Element;
use crate::normalize::{
    collapse_blank_lines, decode_entities, normalize_inline_whitespace, strip_reserved_chars,
};

/// Opening delimiter of a code block placeholder (private-use code point)
const CODE_START: char = '\u{E000}';
/// Closing delimiter of a code block placeholder
const CODE_END: char = '\u{E001}';
/// Brackets a converted list that sits inside another list
const NESTED_LIST: char = '\u{E002}';
/// Opens the content of a checked task item
const TASK_CHECKED: char = '\u{E003}';
/// Opens the content of an unchecked task item
const TASK_UNCHECKED: char = '\u{E004}';

/// Elements without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> Option<&'static Regex> {
            static CELL: OnceLock<Option<Regex>> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($pattern).ok()).as_ref()
        }
    };
}

cached_regex!(comment_regex, r"(?s)<!--.*?-->|<!(?i:doctype)[^>]*>");
cached_regex!(pre_regex, r"(?is)<pre\b([^>]*)>(.*?)</pre\s*>");
cached_regex!(pre_code_regex, r"(?is)^\s*<code\b([^>]*)>(.*?)</code\s*>\s*$");
cached_regex!(whitespace_regex, r"[ \t\r\n\x0C]+");
cached_regex!(
    block_boundary_regex,
    r"(?i) ?(</?(?:address|article|aside|blockquote|body|dd|details|div|dl|dt|fieldset|figcaption|figure|footer|form|h[1-6]|header|hr|html|li|main|nav|ol|p|pre|section|table|tbody|td|tfoot|th|thead|tr|ul)\b[^>]*>|\x{E000}\d+\x{E001}) ?"
);
cached_regex!(heading_regex, r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>");
cached_regex!(br_regex, r"(?i)<br\b[^>]*>");
cached_regex!(inline_code_regex, r"(?is)<code\b[^>]*>(.*?)</code\s*>");
cached_regex!(
    inline_format_tag_regex,
    r"(?i)<(/)?(strong|b|em|i|strike|s|del|u|mark)\b[^>]*>"
);
cached_regex!(anchor_regex, r"(?is)<a\b([^>]*)>(.*?)</a\s*>");
cached_regex!(figure_regex, r"(?is)<figure\b[^>]*>(.*?)</figure\s*>");
cached_regex!(figcaption_regex, r"(?is)<figcaption\b[^>]*>(.*?)</figcaption\s*>");
cached_regex!(image_regex, r"(?is)<img\b([^>]*)>");
cached_regex!(list_item_open_regex, r"(?i)<li\b([^>]*)>");
cached_regex!(list_item_close_regex, r"(?i)</li\s*>");
cached_regex!(div_tag_regex, r"(?i)</?div\b[^>]*>");
cached_regex!(list_open_regex, r"(?i)<ul\b([^>]*)>");
cached_regex!(list_tag_regex, r"(?i)<(/)?(ul|ol)\b[^>]*>");
cached_regex!(nested_list_regex, r"\x{E002}[^\x{E002}]*\x{E002}");
cached_regex!(element_tag_regex, r"<(/)?([a-zA-Z][a-zA-Z0-9-]*)[^>]*?(/)?>");
cached_regex!(blockquote_tag_regex, r"(?i)<(/)?(blockquote)\b[^>]*>");
cached_regex!(rule_regex, r"(?i)<hr\b[^>]*>");
cached_regex!(paragraph_regex, r"(?is)<p\b[^>]*>(.*?)</p\s*>");
cached_regex!(stray_paragraph_regex, r"(?i)</?p\b[^>]*>");
cached_regex!(paragraph_open_regex, r"(?i)<p\b[^>]*>");
cached_regex!(paragraph_close_regex, r"(?i)</p\s*>");
cached_regex!(table_tag_regex, r"(?i)<(/)?(table)\b[^>]*>");
cached_regex!(row_regex, r"(?is)<tr\b[^>]*>(.*?)</tr\s*>");
cached_regex!(cell_regex, r"(?is)<(th|td)\b[^>]*>(.*?)</t[hd]\s*>");
cached_regex!(
    video_regex,
    r"(?is)<div\b([^>]*\bdata-youtube-video\b[^>]*)>(.*?)</div\s*>"
);
cached_regex!(iframe_regex, r"(?is)<iframe\b([^>]*)>");
cached_regex!(tag_regex, r"(?s)</?[a-zA-Z][^>]*>");
cached_regex!(placeholder_regex, r"\x{E000}(\d+)\x{E001}");
cached_regex!(
    attribute_regex,
    r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#
);

/// Non-content elements with their content, built from the dialect's list
fn non_content_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        let alternatives: Vec<String> = NON_CONTENT_TAGS
            .iter()
            .map(|tag| format!(r"<{tag}\b[^>]*>.*?</{tag}\s*>"))
            .collect();
        Regex::new(&format!("(?is){}", alternatives.join("|"))).ok()
    })
    .as_ref()
}

/// String-rewrite HTML to Markdown converter
#[derive(Debug, Clone, Default)]
pub struct PatternConverter {
    options: ConversionOptions,
}

impl PatternConverter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert an HTML string; never fails
    pub fn convert(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let trace = |pass: &str, text: &str| {
            tracing::trace!(pass, len = text.len(), "pattern pass");
        };

        let mut code_blocks = Vec::new();
        let mut references = Vec::new();

        let html = strip_reserved_chars(html);
        let text = strip_non_content(&html);
        trace("non_content", &text);
        let text = extract_code_blocks(&text, &mut code_blocks);
        trace("code_blocks", &text);
        let text = collapse_html_whitespace(&text);
        trace("whitespace", &text);
        let text = convert_headings(&text);
        trace("headings", &text);
        let text = convert_inline(&text);
        trace("inline", &text);
        let text = self.convert_links(&text, &mut references);
        trace("links", &text);
        let text = convert_task_items(&text);
        trace("task_items", &text);
        let text = convert_lists(&text);
        trace("lists", &text);
        let text = rewrite(&text, rule_regex(), |_| "\n\n---\n\n".to_string());
        let text = self.convert_blockquotes(&text);
        trace("blockquotes", &text);
        let text = self.convert_paragraphs(&text);
        trace("paragraphs", &text);
        let text = convert_tables(&text);
        trace("tables", &text);
        let text = convert_video_embeds(&text);
        trace("video", &text);
        let text = strip_tags(&text);
        trace("strip_tags", &text);
        let text = text.replace([NESTED_LIST, TASK_CHECKED, TASK_UNCHECKED], "");

        let mut text = restore_code_blocks(&text, &code_blocks);
        append_references(&mut text, &references);

        collapse_blank_lines(&text)
    }

    fn convert_links(&self, text: &str, references: &mut Vec<(String, Option<String>)>) -> String {
        // Wiki links first so generic links never see a note anchor
        let text = rewrite(text, anchor_regex(), |caps| {
            let attrs = parse_attributes("a", group(caps, 1));
            let inner = group(caps, 2);
            match dialect::wiki_link_target(|name| attrs.attr(name)) {
                Some(target) if !target.is_empty() => format!("[[{target}]]"),
                Some(_) => {
                    let text = plain_text(inner);
                    if text.is_empty() {
                        String::new()
                    } else {
                        format!("[[{text}]]")
                    }
                }
                None => whole(caps).to_string(),
            }
        });

        let text = rewrite(&text, anchor_regex(), |caps| {
            let attrs = parse_attributes("a", group(caps, 1));
            let label = normalize_inline_whitespace(group(caps, 2));
            let label = label.trim();
            let href = attrs.attr("href").map(str::trim).unwrap_or("");
            if href.is_empty() || label.is_empty() {
                return label.to_string();
            }
            let title = attrs.attr("title").filter(|t| !t.is_empty());

            match self.options.link_style {
                LinkStyle::Inlined => match title {
                    Some(title) => format!("[{label}]({href} \"{}\")", protected_title(title)),
                    None => format!("[{label}]({href})"),
                },
                LinkStyle::Referenced => {
                    let reference = (href.to_string(), title.map(protected_title));
                    let n = match references.iter().position(|r| *r == reference) {
                        Some(pos) => pos + 1,
                        None => {
                            references.push(reference);
                            references.len()
                        }
                    };
                    format!("[{label}][{n}]")
                }
            }
        });

        let text = rewrite(&text, figure_regex(), |caps| {
            let inner = group(caps, 1);
            let Some(img) = image_regex().and_then(|re| re.captures(inner)) else {
                return inner.to_string();
            };
            let attrs = parse_attributes("img", group(&img, 1));
            let src = attrs.attr("src").map(str::trim).unwrap_or("");
            if src.is_empty() {
                return String::new();
            }
            let caption = figcaption_regex()
                .and_then(|re| re.captures(inner))
                .map(|c| plain_text(group(&c, 1)))
                .unwrap_or_default();
            let alt = attrs
                .attr("alt")
                .filter(|a| !a.is_empty())
                .unwrap_or(caption.as_str());
            format!("\n\n![{alt}]({src})\n\n")
        });

        rewrite(&text, image_regex(), |caps| {
            let attrs = parse_attributes("img", group(caps, 1));
            let src = attrs.attr("src").map(str::trim).unwrap_or("");
            if src.is_empty() {
                return String::new();
            }
            let alt = attrs.attr("alt").unwrap_or("");
            match attrs.attr("title").filter(|t| !t.is_empty()) {
                Some(title) => format!("![{alt}]({src} \"{}\")", protected_title(title)),
                None => format!("![{alt}]({src})"),
            }
        })
    }

    fn convert_blockquotes(&self, text: &str) -> String {
        fold_nested(text, blockquote_tag_regex(), |_, body, _| {
            let body = collapse_blank_lines(&self.convert_paragraphs(body));
            if body.is_empty() {
                return String::new();
            }
            let quoted: Vec<String> = body.lines().map(|line| format!("> {line}")).collect();
            format!("\n\n{}\n\n", quoted.join("\n"))
        })
    }

    fn convert_paragraphs(&self, text: &str) -> String {
        let text = rewrite(text, paragraph_regex(), |caps| {
            let inner = group(caps, 1).trim();
            if inner.is_empty() {
                String::new()
            } else {
                format!("\n\n{inner}\n\n")
            }
        });
        let text = rewrite(&text, stray_paragraph_regex(), |_| "\n\n".to_string());
        let line_break = if self.options.preserve_line_breaks { "\n" } else { " " };
        rewrite(&text, br_regex(), |_| line_break.to_string())
    }
}

fn whole<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(0).map_or("", |m| m.as_str())
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Run `replace_all` when the regex compiled, otherwise pass the text through
fn rewrite<F>(text: &str, regex: Option<&Regex>, replacer: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    match regex {
        Some(re) => re.replace_all(text, replacer).into_owned(),
        None => text.to_string(),
    }
}

/// Attributes of a tag's raw attribute text; values stay entity-encoded
fn parse_attributes(tag: &str, raw: &str) -> Element {
    let mut element = Element::new(tag);
    let Some(re) = attribute_regex() else {
        return element;
    };
    for caps in re.captures_iter(raw) {
        let name = group(&caps, 1).to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        element.attrs.push((name, value.to_string()));
    }
    element
}

/// Title text that survives the final entity decode unchanged
fn protected_title(raw: &str) -> String {
    escape_title(&decode_entities(raw))
        .replace('&', "&amp;")
        .replace('<', "&lt;")
}

/// Text of a fragment with tags removed and whitespace collapsed
fn plain_text(fragment: &str) -> String {
    let text = strip_tags(fragment);
    normalize_inline_whitespace(&text).trim().to_string()
}

fn strip_tags(text: &str) -> String {
    rewrite(text, tag_regex(), |_| String::new())
}

fn strip_non_content(html: &str) -> String {
    let text = rewrite(html, comment_regex(), |_| String::new());
    rewrite(&text, non_content_regex(), |_| String::new())
}

fn extract_code_blocks(text: &str, code_blocks: &mut Vec<String>) -> String {
    rewrite(text, pre_regex(), |caps| {
        let pre_attrs = parse_attributes("pre", group(caps, 1));
        let inner = group(caps, 2);

        let (class, content) = match pre_code_regex().and_then(|re| re.captures(inner)) {
            Some(code) => {
                let code_attrs = parse_attributes("code", group(&code, 1));
                let class = code_attrs
                    .attr("class")
                    .or_else(|| pre_attrs.attr("class"))
                    .map(str::to_string);
                (class, group(&code, 2).to_string())
            }
            None => (pre_attrs.attr("class").map(str::to_string), inner.to_string()),
        };

        let content = decode_entities(&strip_tags(&content));
        let content = content.strip_prefix('\n').unwrap_or(&content);
        let language = code_language(class.as_deref());

        code_blocks.push(fenced_code(&language, content));
        format!("{CODE_START}{}{CODE_END}", code_blocks.len() - 1)
    })
}

fn collapse_html_whitespace(text: &str) -> String {
    let text = rewrite(text, whitespace_regex(), |_| " ".to_string());
    rewrite(&text, block_boundary_regex(), |caps| group(caps, 1).to_string())
}

fn convert_headings(text: &str) -> String {
    rewrite(text, heading_regex(), |caps| {
        let level = group(caps, 1).parse::<usize>().unwrap_or(1);
        let inner = rewrite(group(caps, 2), br_regex(), |_| " ".to_string());
        let inner = normalize_inline_whitespace(&inner);
        let inner = inner.trim();
        if inner.is_empty() {
            String::new()
        } else {
            format!("\n\n{} {}\n\n", "#".repeat(level), inner)
        }
    })
}

fn convert_inline(text: &str) -> String {
    let text = rewrite(text, inline_code_regex(), |caps| {
        // Entities stay encoded so escaped markup is not stripped as tags
        let code = strip_tags(group(caps, 1));
        if code.is_empty() {
            return String::new();
        }
        if code.contains('`') {
            format!("`` {code} ``")
        } else {
            format!("`{code}`")
        }
    });

    fold_nested(&text, inline_format_tag_regex(), |name, body, _| {
        match dialect::inline_delimiter(name) {
            Some(delimiter) => wrap_inline(body, delimiter),
            None => body.to_string(),
        }
    })
}

/// Rewrite task item openings to plain items opening with a task sentinel
fn convert_task_items(text: &str) -> String {
    let text = rewrite(text, list_item_open_regex(), |caps| {
        let attrs = parse_attributes("li", group(caps, 1));
        if attrs.attr(ATTR_DATA_TYPE) != Some(TASK_ITEM_TYPE) {
            return whole(caps).to_string();
        }
        if dialect::is_checked(attrs.attr(ATTR_DATA_CHECKED)) {
            format!("<li>{TASK_CHECKED}")
        } else {
            format!("<li>{TASK_UNCHECKED}")
        }
    });

    rewrite(&text, list_open_regex(), |caps| {
        let attrs = parse_attributes("ul", group(caps, 1));
        if attrs.attr(ATTR_DATA_TYPE) == Some(TASK_LIST_TYPE) {
            "<ul>".to_string()
        } else {
            whole(caps).to_string()
        }
    })
}

fn convert_lists(text: &str) -> String {
    fold_nested(text, list_tag_regex(), |name, body, nested| {
        let items = render_list_items(body, name == "ol");
        if items.trim().is_empty() {
            String::new()
        } else if nested {
            format!("\n{NESTED_LIST}{items}{NESTED_LIST}")
        } else {
            format!("\n{items}\n")
        }
    })
}

/// Items of one list body whose inner lists are already rendered
///
/// Content between items (after a `</li>` or before the first `<li>`) is
/// indented under the preceding item. Ordinals count every element child of
/// the list, not only items.
fn render_list_items(body: &str, ordered: bool) -> String {
    let Some(open) = list_item_open_regex() else {
        return String::new();
    };

    let starts: Vec<(usize, usize)> = open.find_iter(body).map(|m| (m.start(), m.end())).collect();
    let lead = &body[..starts.first().map_or(body.len(), |&(start, _)| start)];

    let mut out = String::new();
    push_indented(&mut out, &item_content(lead).0, BULLET_WIDTH);
    let mut position = top_level_elements(lead);

    for (i, &(_, content_start)) in starts.iter().enumerate() {
        let content_end = starts.get(i + 1).map_or(body.len(), |&(start, _)| start);
        let raw = &body[content_start..content_end];
        let (raw, tail) = match list_item_close_regex().and_then(|re| re.find(raw)) {
            Some(close) => (&raw[..close.start()], &raw[close.end()..]),
            None => (raw, ""),
        };
        position += 1;

        let (content, has_nested_list) = item_content(raw);
        let (marker, text) = if let Some(rest) = content.strip_prefix(TASK_CHECKED) {
            ("- [x] ".to_string(), rest.trim_start())
        } else if let Some(rest) = content.strip_prefix(TASK_UNCHECKED) {
            ("- [ ] ".to_string(), rest.trim_start())
        } else if ordered {
            (format!("{position}. "), content.as_str())
        } else {
            ("- ".to_string(), content.as_str())
        };
        let indent = if marker.starts_with('-') { BULLET_WIDTH } else { marker.len() };

        out.push_str(&marker);
        match text.split_once('\n') {
            Some((first, rest)) if has_nested_list => {
                out.push_str(first);
                out.push('\n');
                push_indented(&mut out, rest, indent);
            }
            _ => {
                out.push_str(text);
                out.push('\n');
            }
        }

        push_indented(&mut out, &item_content(tail).0, indent);
        position += top_level_elements(tail);
    }

    out
}

/// Item text with paragraph and div tags dissolved and nested-list brackets
/// removed, plus whether a nested list was present
fn item_content(raw: &str) -> (String, bool) {
    let content = rewrite(raw, list_item_close_regex(), |_| String::new());
    let content = rewrite(&content, div_tag_regex(), |_| String::new());
    let content = rewrite(&content, paragraph_open_regex(), |_| String::new());
    let content = rewrite(&content, paragraph_close_regex(), |_| "\n\n".to_string());
    let has_nested_list = content.contains(NESTED_LIST);
    let content = content.replace(NESTED_LIST, "");
    (content.trim().to_string(), has_nested_list)
}

/// Number of elements starting at the top level of a list-body fragment
fn top_level_elements(fragment: &str) -> usize {
    let lists = nested_list_regex().map_or(0, |re| re.find_iter(fragment).count());
    let rest = rewrite(fragment, nested_list_regex(), |_| String::new());
    let Some(tags) = element_tag_regex() else {
        return lists;
    };

    let mut depth = 0usize;
    let mut elements = 0;
    for caps in tags.captures_iter(&rest) {
        if caps.get(1).is_some() {
            depth = depth.saturating_sub(1);
            continue;
        }
        if depth == 0 {
            elements += 1;
        }
        let name = group(&caps, 2).to_ascii_lowercase();
        if caps.get(3).is_none() && !VOID_TAGS.contains(&name.as_str()) {
            depth += 1;
        }
    }
    lists + elements
}

/// Fold open/close tag pairs innermost-first in one left-to-right scan
///
/// `tags` must capture an optional `/` in group 1 and the tag name in group
/// 2. `render` receives the lower-cased tag name, the element's body with
/// inner pairs already rendered, and whether the element sits inside another
/// one of the same family. Unmatched closing tags are dropped; unclosed
/// elements are closed at the end of input.
fn fold_nested<F>(text: &str, tags: Option<&Regex>, mut render: F) -> String
where
    F: FnMut(&str, &str, bool) -> String,
{
    let Some(tags) = tags else {
        return text.to_string();
    };

    let mut stack: Vec<(String, String)> = vec![(String::new(), String::new())];
    let mut last = 0;

    fn push_top(stack: &mut [(String, String)], text: &str) {
        if let Some((_, top)) = stack.last_mut() {
            top.push_str(text);
        }
    }

    let mut close = |stack: &mut Vec<(String, String)>| {
        if let Some((name, body)) = stack.pop() {
            let nested = stack.len() > 1;
            let rendered = render(&name, &body, nested);
            push_top(stack, &rendered);
        }
    };

    for caps in tags.captures_iter(text) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        push_top(&mut stack, &text[last..tag.start()]);
        last = tag.end();

        if caps.get(1).is_none() {
            stack.push((group(&caps, 2).to_ascii_lowercase(), String::new()));
        } else if stack.len() > 1 {
            close(&mut stack);
        }
    }
    push_top(&mut stack, &text[last..]);

    while stack.len() > 1 {
        close(&mut stack);
    }
    stack.pop().map(|(_, body)| body).unwrap_or_default()
}

fn convert_tables(text: &str) -> String {
    fold_nested(text, table_tag_regex(), |_, body, nested| {
        let (Some(rows_re), Some(cells_re)) = (row_regex(), cell_regex()) else {
            return body.to_string();
        };

        let mut rows = Vec::new();
        let mut first_row_has_header = false;
        for row in rows_re.captures_iter(body) {
            let mut has_header = false;
            let cells: Vec<String> = cells_re
                .captures_iter(group(&row, 1))
                .map(|cell| {
                    has_header |= group(&cell, 1).eq_ignore_ascii_case("th");
                    table_cell(&strip_tags(group(&cell, 2)))
                })
                .collect();
            if rows.is_empty() {
                first_row_has_header = has_header;
            }
            rows.push(cells);
        }

        if nested {
            flatten_table(&rows)
        } else {
            pipe_table(&rows, first_row_has_header)
        }
    })
}

fn convert_video_embeds(text: &str) -> String {
    rewrite(text, video_regex(), |caps| {
        let id = iframe_regex()
            .and_then(|re| re.captures(group(caps, 2)))
            .map(|iframe| parse_attributes("iframe", group(&iframe, 1)))
            .and_then(|attrs| {
                attrs
                    .attr("src")
                    .and_then(dialect::youtube_embed_id)
                    .map(str::to_string)
            });
        match id {
            Some(id) => format!(
                "\n\n[{}]({}{})\n\n",
                dialect::YOUTUBE_LINK_TEXT,
                dialect::YOUTUBE_WATCH_PREFIX,
                id
            ),
            None => String::new(),
        }
    })
}

/// Decode entities outside code placeholders and splice the code blocks in
///
/// Code blocks were decoded when extracted and are not decoded again.
fn restore_code_blocks(text: &str, code_blocks: &[String]) -> String {
    let Some(placeholders) = placeholder_regex() else {
        return decode_entities(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in placeholders.captures_iter(text) {
        let Some(placeholder) = caps.get(0) else {
            continue;
        };
        out.push_str(&decode_entities(&text[last..placeholder.start()]));
        let block = group(&caps, 1)
            .parse::<usize>()
            .ok()
            .and_then(|i| code_blocks.get(i));
        if let Some(block) = block {
            out.push_str(block);
        }
        last = placeholder.end();
    }
    out.push_str(&decode_entities(&text[last..]));
    out
}

fn append_references(text: &mut String, references: &[(String, Option<String>)]) {
    if references.is_empty() {
        return;
    }
    text.push_str("\n\n");
    for (i, (href, title)) in references.iter().enumerate() {
        text.push_str(&format!("[{}]: {}", i + 1, decode_entities(href)));
        if let Some(title) = title {
            text.push_str(&format!(" \"{}\"", decode_entities(title)));
        }
        text.push('\n');
    }
}
