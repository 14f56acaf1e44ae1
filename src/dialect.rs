//! Editor HTML dialect definition
//!
//! This module is the single table both HTML to Markdown converters and the
//! Markdown to HTML generator agree on. It carries no conversion behavior of
//! its own beyond lookups: which element shapes exist, which attributes they
//! read, and which Markdown shape they map to.
//!
//! # Dialect Table
//!
//! | Construct | HTML | Markdown |
//! |---|---|---|
//! | Heading | `<h1>`..`<h6>` | `#`..`######` |
//! | Bold / Italic | `<strong>/<b>`, `<em>/<i>` | `**x**`, `*x*` |
//! | Strike / Underline | `<s>/<strike>/<del>`, `<u>` | `~~x~~`, `_x_` |
//! | Inline code / Highlight | `<code>`, `<mark>` | `` `x` ``, `==x==` |
//! | Paragraph / Break / Rule | `<p>`, `<br>`, `<hr>` | text, `\n`, `---` |
//! | Link | `<a href title>` | `[text](href "title")` |
//! | Image | `<img src alt title>` | `![alt](src "title")` |
//! | List | `<ul>/<ol><li>` | `- ` / `N. ` |
//! | Task item | `<li data-type="taskItem" data-checked>` | `- [ ] ` / `- [x] ` |
//! | Blockquote | `<blockquote>` | `> ` |
//! | Code block | `<pre><code class="language-X">` | fenced block |
//! | Table | `<table><tr><th/td>` | pipe rows |
//! | Wiki link | `<a data-note-link data-note-id>` | `[[X]]` |
//! | Video embed | `<div data-youtube-video><iframe>` | `[YouTube Video](...)` |
//! | Figure | `<figure><img><figcaption>` | `![alt or caption](src)` |

/// `data-type` attribute used by task lists and task items
pub const ATTR_DATA_TYPE: &str = "data-type";
/// Checked state of a task item, the string `"true"` or `"false"`
pub const ATTR_DATA_CHECKED: &str = "data-checked";
/// `data-type` value of a task item `<li>`
pub const TASK_ITEM_TYPE: &str = "taskItem";
/// `data-type` value of a task list `<ul>`
pub const TASK_LIST_TYPE: &str = "taskList";
/// Marker attribute on wiki-link anchors
pub const ATTR_NOTE_LINK: &str = "data-note-link";
/// Note identifier on wiki-link anchors, preferred over the href suffix
pub const ATTR_NOTE_ID: &str = "data-note-id";
/// Href prefix of wiki-link anchors
pub const NOTE_HREF_PREFIX: &str = "#note:";
/// Marker attribute on video embed containers
pub const ATTR_YOUTUBE_VIDEO: &str = "data-youtube-video";
/// Link text used for video embeds in Markdown
pub const YOUTUBE_LINK_TEXT: &str = "YouTube Video";
/// Watch URL prefix used for video embeds in Markdown
pub const YOUTUBE_WATCH_PREFIX: &str = "https://youtube.com/watch?v=";
/// Embed URL prefix produced by the generator
pub const YOUTUBE_EMBED_PREFIX: &str = "https://www.youtube.com/embed/";

/// Elements whose content never reaches Markdown
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Block-level elements; whitespace-only text next to them is layout, not content
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// A construct of the editor dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Heading,
    Bold,
    Italic,
    Strike,
    Underline,
    InlineCode,
    Highlight,
    Paragraph,
    LineBreak,
    Rule,
    Link,
    Image,
    List,
    TaskItem,
    Blockquote,
    CodeBlock,
    Table,
    WikiLink,
    VideoEmbed,
    Figure,
}

/// One row of the dialect table
#[derive(Debug, Clone, Copy)]
pub struct DialectEntry {
    pub construct: Construct,
    /// Registry keys the structured converter uses for this construct
    pub tag_or_pattern: &'static [&'static str],
    pub markdown_template: &'static str,
    pub required_attributes: &'static [&'static str],
    pub optional_attributes: &'static [&'static str],
    pub edge_case_policy: &'static str,
}

/// The fixed dialect
pub const DIALECT: &[DialectEntry] = &[
    DialectEntry {
        construct: Construct::Heading,
        tag_or_pattern: &["h1", "h2", "h3", "h4", "h5", "h6"],
        markdown_template: "{hashes} {text}\n\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "text trimmed",
    },
    DialectEntry {
        construct: Construct::Bold,
        tag_or_pattern: &["strong", "b"],
        markdown_template: "**{text}**",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "nested pairs compose by concatenation; empty content emits nothing",
    },
    DialectEntry {
        construct: Construct::Italic,
        tag_or_pattern: &["em", "i"],
        markdown_template: "*{text}*",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "nested pairs compose by concatenation; empty content emits nothing",
    },
    DialectEntry {
        construct: Construct::Strike,
        tag_or_pattern: &["s", "strike", "del"],
        markdown_template: "~~{text}~~",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "empty content emits nothing",
    },
    DialectEntry {
        construct: Construct::Underline,
        tag_or_pattern: &["u"],
        markdown_template: "_{text}_",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "re-parses as emphasis",
    },
    DialectEntry {
        construct: Construct::InlineCode,
        tag_or_pattern: &["code"],
        markdown_template: "`{text}`",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "raw text content, no inline conversion",
    },
    DialectEntry {
        construct: Construct::Highlight,
        tag_or_pattern: &["mark"],
        markdown_template: "=={text}==",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "empty content emits nothing",
    },
    DialectEntry {
        construct: Construct::Paragraph,
        tag_or_pattern: &["p"],
        markdown_template: "{text}\n\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "text trimmed",
    },
    DialectEntry {
        construct: Construct::LineBreak,
        tag_or_pattern: &["br"],
        markdown_template: "\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "space instead of newline when line-break preservation is disabled",
    },
    DialectEntry {
        construct: Construct::Rule,
        tag_or_pattern: &["hr"],
        markdown_template: "\n---\n\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "none",
    },
    DialectEntry {
        construct: Construct::Link,
        tag_or_pattern: &["a"],
        markdown_template: "[{text}]({href} \"{title}\")",
        required_attributes: &["href"],
        optional_attributes: &["title"],
        edge_case_policy: "empty href emits text only",
    },
    DialectEntry {
        construct: Construct::Image,
        tag_or_pattern: &["img"],
        markdown_template: "![{alt}]({src} \"{title}\")",
        required_attributes: &["src"],
        optional_attributes: &["alt", "title"],
        edge_case_policy: "missing alt/title omitted, not empty-quoted",
    },
    DialectEntry {
        construct: Construct::List,
        tag_or_pattern: &["ul", "ol", "li"],
        markdown_template: "- {text}\n | {n}. {text}\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "nested list continuation indented by the marker width; ordinal is element sibling index + 1",
    },
    DialectEntry {
        construct: Construct::TaskItem,
        tag_or_pattern: &["li[data-type=\"taskItem\"]"],
        markdown_template: "- [{x}] {text}\n",
        required_attributes: &[ATTR_DATA_TYPE],
        optional_attributes: &[ATTR_DATA_CHECKED],
        edge_case_policy: "checked only when data-checked is the string \"true\"",
    },
    DialectEntry {
        construct: Construct::Blockquote,
        tag_or_pattern: &["blockquote"],
        markdown_template: "> {line}\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "multi-line content split then re-joined",
    },
    DialectEntry {
        construct: Construct::CodeBlock,
        tag_or_pattern: &["pre"],
        markdown_template: "```{lang}\n{code}\n```\n\n",
        required_attributes: &[],
        optional_attributes: &["class"],
        edge_case_policy: "language from language-(\\w+); absent gives an empty fence tag",
    },
    DialectEntry {
        construct: Construct::Table,
        tag_or_pattern: &["table"],
        markdown_template: "| {cell} |\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "separator row only after row 0 and only when row 0 has a th",
    },
    DialectEntry {
        construct: Construct::WikiLink,
        tag_or_pattern: &["a[data-note-link]"],
        markdown_template: "[[{id}]]",
        required_attributes: &[],
        optional_attributes: &[ATTR_NOTE_LINK, ATTR_NOTE_ID, "href"],
        edge_case_policy: "data-note-id preferred over href suffix",
    },
    DialectEntry {
        construct: Construct::VideoEmbed,
        tag_or_pattern: &["div[data-youtube-video]"],
        markdown_template: "[YouTube Video](https://youtube.com/watch?v={id})\n\n",
        required_attributes: &[ATTR_YOUTUBE_VIDEO],
        optional_attributes: &[],
        edge_case_policy: "missing video id emits nothing",
    },
    DialectEntry {
        construct: Construct::Figure,
        tag_or_pattern: &["figure"],
        markdown_template: "![{alt or caption}]({src})\n\n",
        required_attributes: &[],
        optional_attributes: &[],
        edge_case_policy: "caption is an alt fallback only, never appended as text",
    },
];

/// Entry whose registry keys include the bare tag
fn entry_for_tag(tag: &str) -> Option<&'static DialectEntry> {
    DIALECT.iter().find(|e| e.tag_or_pattern.contains(&tag))
}

/// Markdown delimiter wrapping the content of an inline formatting element
///
/// Read off the entry's template, e.g. `**` from `**{text}**`.
pub fn inline_delimiter(tag: &str) -> Option<&'static str> {
    let entry = entry_for_tag(tag)?;
    match entry.construct {
        Construct::Bold
        | Construct::Italic
        | Construct::Strike
        | Construct::Underline
        | Construct::Highlight => entry
            .markdown_template
            .split_once("{text}")
            .map(|(open, _)| open),
        _ => None,
    }
}

/// ATX heading level of a heading tag
pub fn heading_level(tag: &str) -> Option<usize> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

pub fn is_non_content_tag(tag: &str) -> bool {
    NON_CONTENT_TAGS.contains(&tag)
}

/// True when a task item's `data-checked` value marks it as done
pub fn is_checked(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Note identifier of a wiki-link anchor, if the anchor is one
///
/// `data-note-id` wins over the `#note:` href suffix. An anchor carrying the
/// marker attribute but neither identifier yields an empty string so callers
/// can fall back to the link text.
pub fn wiki_link_target<'a>(attr: impl Fn(&str) -> Option<&'a str>) -> Option<&'a str> {
    let href_target = attr("href").and_then(|h| h.strip_prefix(NOTE_HREF_PREFIX));
    let has_marker = attr(ATTR_NOTE_LINK).is_some();

    if let Some(id) = attr(ATTR_NOTE_ID).filter(|id| !id.is_empty())
        && (has_marker || href_target.is_some())
    {
        return Some(id);
    }
    if let Some(target) = href_target.filter(|t| !t.is_empty()) {
        return Some(target);
    }
    has_marker.then_some("")
}

/// Video id from an embed URL such as `https://www.youtube.com/embed/ID?rel=0`
pub fn youtube_embed_id(src: &str) -> Option<&str> {
    let (_, rest) = src.split_once("/embed/")?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Classify an element into its dialect construct
///
/// `attr` looks up an attribute on the element. Used by the round-trip
/// tests to check that a converted node stays within the same entry.
pub fn classify<'a>(tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> Option<Construct> {
    match tag {
        "li" if attr(ATTR_DATA_TYPE) == Some(TASK_ITEM_TYPE) => Some(Construct::TaskItem),
        "a" if wiki_link_target(&attr).is_some() => Some(Construct::WikiLink),
        "div" if attr(ATTR_YOUTUBE_VIDEO).is_some() => Some(Construct::VideoEmbed),
        _ => entry_for_tag(tag).map(|e| e.construct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name: &str| map.get(name).copied()
    }

    #[test]
    fn test_every_construct_has_one_entry() {
        let all = [
            Construct::Heading,
            Construct::Bold,
            Construct::Italic,
            Construct::Strike,
            Construct::Underline,
            Construct::InlineCode,
            Construct::Highlight,
            Construct::Paragraph,
            Construct::LineBreak,
            Construct::Rule,
            Construct::Link,
            Construct::Image,
            Construct::List,
            Construct::TaskItem,
            Construct::Blockquote,
            Construct::CodeBlock,
            Construct::Table,
            Construct::WikiLink,
            Construct::VideoEmbed,
            Construct::Figure,
        ];
        for construct in all {
            let count = DIALECT.iter().filter(|e| e.construct == construct).count();
            assert_eq!(count, 1, "{construct:?} should have exactly one entry");
        }
    }

    #[test]
    fn test_inline_delimiters() {
        assert_eq!(inline_delimiter("strong"), Some("**"));
        assert_eq!(inline_delimiter("b"), Some("**"));
        assert_eq!(inline_delimiter("i"), Some("*"));
        assert_eq!(inline_delimiter("del"), Some("~~"));
        assert_eq!(inline_delimiter("u"), Some("_"));
        assert_eq!(inline_delimiter("mark"), Some("=="));
        assert_eq!(inline_delimiter("span"), None);
        assert_eq!(inline_delimiter("code"), None);
        assert_eq!(inline_delimiter("h1"), None);
    }

    #[test]
    fn test_wiki_link_prefers_note_id() {
        let a = attrs(&[
            ("data-note-link", ""),
            ("data-note-id", "abc"),
            ("href", "#note:xyz"),
        ]);
        assert_eq!(wiki_link_target(a), Some("abc"));
    }

    #[test]
    fn test_wiki_link_from_href_suffix() {
        let a = attrs(&[("href", "#note:xyz")]);
        assert_eq!(wiki_link_target(a), Some("xyz"));
    }

    #[test]
    fn test_wiki_link_marker_without_target() {
        let a = attrs(&[("data-note-link", "")]);
        assert_eq!(wiki_link_target(a), Some(""));
    }

    #[test]
    fn test_plain_link_is_not_wiki() {
        let a = attrs(&[("href", "https://example.com"), ("data-note-id", "abc")]);
        assert_eq!(wiki_link_target(a), None);
    }

    #[test]
    fn test_youtube_embed_id() {
        assert_eq!(
            youtube_embed_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_embed_id("https://www.youtube.com/embed/"), None);
        assert_eq!(youtube_embed_id("https://example.com/video"), None);
    }

    #[test]
    fn test_checked_is_string_true_only() {
        assert!(is_checked(Some("true")));
        assert!(!is_checked(Some("false")));
        assert!(!is_checked(Some("")));
        assert!(!is_checked(None));
    }

    #[test]
    fn test_classify() {
        let none = attrs(&[]);
        assert_eq!(classify("h3", &none), Some(Construct::Heading));
        assert_eq!(classify("b", &none), Some(Construct::Bold));
        assert_eq!(classify("li", &none), Some(Construct::List));
        assert_eq!(classify("span", &none), None);
        assert_eq!(classify("a", attrs(&[("href", "https://e.example")])), Some(Construct::Link));
        assert_eq!(classify("a", attrs(&[("href", "#note:n")])), Some(Construct::WikiLink));

        let task = attrs(&[("data-type", "taskItem"), ("data-checked", "true")]);
        assert_eq!(classify("li", task), Some(Construct::TaskItem));

        let embed = attrs(&[("data-youtube-video", "")]);
        assert_eq!(classify("div", embed), Some(Construct::VideoEmbed));
        assert_eq!(classify("div", attrs(&[])), None);
    }
}
