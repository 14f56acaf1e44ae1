//! Markdown to editor HTML generator
//!
//! Markdown is rendered with comrak, then post-processed into the editor
//! dialect by an ordered list of string passes:
//!
//! 1. Empty paragraphs are normalized to `<p></p>`
//! 2. Bullet-list items starting with `[ ]` or `[x]` followed by whitespace
//!    become task items
//! 3. `</li>` closers near a task item get the task-item closing shape
//! 4. A `<ul>` whose first item is a task item becomes a task list
//! 5. `[[Title]]` becomes a wiki-link anchor
//! 6. `==text==` becomes `<mark>`, and a paragraph holding only a
//!    `[YouTube Video](...)` link becomes a video embed
//! 7. The result is trimmed
//!
//! Passes 5 and 6 never touch text inside `<pre>` or `<code>`.
//!
//! The generator is cheap enough to re-run on a growing buffer while a
//! response streams in, and accepts truncated Markdown.
//!
//! # Task closer heuristic
//!
//! Pass 3 does not parse the list. A `</li>` is treated as closing a task
//! item when the task-item marker appears within the preceding
//! [`TASK_ITEM_LOOKBACK`] bytes. A plain item that closes within that
//! distance of a task item is therefore also given the task closing shape,
//! and a task item whose content is longer than the window keeps the plain
//! closer. Both produce HTML that parses; only the wrapper `<div>` is
//! unbalanced.
//!
//! # Examples
//!
//! ```rust
//! use note_markdown_converter::generator::MarkdownGenerator;
//!
//! let html = MarkdownGenerator::default().generate("# Hi\n\nSee [[Note]]");
//! assert!(html.starts_with("<h1>Hi</h1>"));
//! assert!(html.contains(r#"data-note-id="Note""#));
//! ```

use std::sync::OnceLock;

use comrak::{Options, markdown_to_html};
use regex::{Captures, Regex};

use crate::dialect::{
    ATTR_DATA_CHECKED, ATTR_DATA_TYPE, ATTR_NOTE_ID, ATTR_NOTE_LINK, ATTR_YOUTUBE_VIDEO,
    NOTE_HREF_PREFIX, TASK_ITEM_TYPE, TASK_LIST_TYPE, YOUTUBE_EMBED_PREFIX, YOUTUBE_LINK_TEXT,
};

/// Bytes before a `</li>` searched for the task-item marker
pub const TASK_ITEM_LOOKBACK: usize = 500;

/// Closing shape of a task item
const TASK_ITEM_CLOSE: &str = "</div></li>";

/// Generator configuration, mapped onto comrak options
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// GitHub-flavored tables, strikethrough and autolinks
    pub gfm: bool,
    /// Render soft line breaks as `<br>`
    pub soft_breaks_as_hard: bool,
    /// Pass raw HTML in the Markdown through to the output
    pub allow_raw_html: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            soft_breaks_as_hard: true,
            allow_raw_html: true,
        }
    }
}

/// Markdown to editor HTML generator
#[derive(Debug, Clone, Default)]
pub struct MarkdownGenerator {
    options: GeneratorOptions,
}

impl MarkdownGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn comrak_options(&self) -> Options<'static> {
        let mut options = Options::default();
        options.extension.table = self.options.gfm;
        options.extension.strikethrough = self.options.gfm;
        options.extension.autolink = self.options.gfm;
        options.render.hardbreaks = self.options.soft_breaks_as_hard;
        options.render.unsafe_ = self.options.allow_raw_html;
        options
    }

    /// Render Markdown as editor HTML; never fails
    ///
    /// Empty and whitespace-only input renders as an empty string.
    pub fn generate(&self, markdown: &str) -> String {
        if markdown.trim().is_empty() {
            return String::new();
        }

        let html = markdown_to_html(markdown, &self.comrak_options());
        let html = normalize_empty_paragraphs(&html);
        let html = open_task_items(&html);
        let html = close_task_items(&html);
        let html = mark_task_lists(&html);
        let html = outside_code(&html, |segment| {
            let segment = link_wiki_pages(segment);
            let segment = highlight(&segment);
            embed_videos(&segment)
        });

        tracing::trace!(
            markdown_len = markdown.len(),
            html_len = html.len(),
            "generated html"
        );
        html.trim().to_string()
    }
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> Option<&'static Regex> {
            static CELL: OnceLock<Option<Regex>> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($pattern).ok()).as_ref()
        }
    };
}

cached_regex!(empty_paragraph_regex, r"<p>\s*</p>");
cached_regex!(
    task_scan_regex,
    r"<(/?)(ul|ol)\b[^>]*>|<li>((?:\s*<p>)?)\[([ xX])\](?:[ \t]+|(</p>|</li>|\n))"
);
cached_regex!(task_list_regex, r#"<ul>(\s*)<li data-type="taskItem""#);
cached_regex!(code_region_regex, r"(?is)<pre\b.*?</pre>|<code\b.*?</code>");
cached_regex!(wiki_link_regex, r"\[\[([^\[\]\n<>]+?)\]\]");
cached_regex!(highlight_regex, r"==([^=\s<>](?:[^=<>\n]*[^=\s<>])?)==");

/// A paragraph holding only the video link the HTML converters emit
fn video_link_regex() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(&format!(
            r#"<p><a href="https://(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]+)">{}</a></p>"#,
            regex::escape(YOUTUBE_LINK_TEXT)
        ))
        .ok()
    })
    .as_ref()
}

fn rewrite<F>(text: &str, regex: Option<&Regex>, replacer: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    match regex {
        Some(re) => re.replace_all(text, replacer).into_owned(),
        None => text.to_string(),
    }
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn normalize_empty_paragraphs(html: &str) -> String {
    rewrite(html, empty_paragraph_regex(), |_| "<p></p>".to_string())
}

/// Turn `<li>[ ] ` and `<li>[x] ` openings inside a `<ul>` into task items
///
/// Items of an ordered list keep their literal box.
fn open_task_items(html: &str) -> String {
    let Some(scan) = task_scan_regex() else {
        return html.to_string();
    };

    let mut bullet_lists: Vec<bool> = Vec::new();
    let mut out = String::with_capacity(html.len() + 128);
    let mut last = 0;
    for caps in scan.captures_iter(html) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        out.push_str(&html[last..found.start()]);
        last = found.end();

        if let Some(list) = caps.get(2) {
            if group(&caps, 1).is_empty() {
                bullet_lists.push(list.as_str() == "ul");
            } else {
                bullet_lists.pop();
            }
            out.push_str(found.as_str());
        } else if bullet_lists.last() == Some(&true) {
            out.push_str(&task_item_opening(&caps));
        } else {
            out.push_str(found.as_str());
        }
    }
    out.push_str(&html[last..]);
    out
}

fn task_item_opening(caps: &Captures<'_>) -> String {
    let checked = group(caps, 4).eq_ignore_ascii_case("x");
    let input = if checked {
        r#"<input type="checkbox" checked="checked">"#
    } else {
        r#"<input type="checkbox">"#
    };
    format!(
        r#"<li {ATTR_DATA_TYPE}="{TASK_ITEM_TYPE}" {ATTR_DATA_CHECKED}="{checked}"><label>{input}<span></span></label><div>{}{}"#,
        group(caps, 3),
        group(caps, 5)
    )
}

/// Give every `</li>` within [`TASK_ITEM_LOOKBACK`] bytes after a task-item
/// marker the task closing shape
fn close_task_items(html: &str) -> String {
    let marker = format!(r#"{ATTR_DATA_TYPE}="{TASK_ITEM_TYPE}""#);
    if !html.contains(&marker) {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + 64);
    let mut last = 0;
    for (pos, closer) in html.match_indices("</li>") {
        let mut start = pos.saturating_sub(TASK_ITEM_LOOKBACK);
        while !html.is_char_boundary(start) {
            start += 1;
        }
        out.push_str(&html[last..pos]);
        if html[start..pos].contains(&marker) {
            out.push_str(TASK_ITEM_CLOSE);
        } else {
            out.push_str(closer);
        }
        last = pos + closer.len();
    }
    out.push_str(&html[last..]);
    out
}

fn mark_task_lists(html: &str) -> String {
    rewrite(html, task_list_regex(), |caps| {
        format!(
            r#"<ul {ATTR_DATA_TYPE}="{TASK_LIST_TYPE}">{}<li {ATTR_DATA_TYPE}="{TASK_ITEM_TYPE}""#,
            group(caps, 1)
        )
    })
}

/// Apply `f` to every part of `html` outside `<pre>` and `<code>` elements
fn outside_code<F>(html: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let Some(code) = code_region_regex() else {
        return f(html);
    };
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for region in code.find_iter(html) {
        out.push_str(&f(&html[last..region.start()]));
        out.push_str(region.as_str());
        last = region.end();
    }
    out.push_str(&f(&html[last..]));
    out
}

fn link_wiki_pages(html: &str) -> String {
    rewrite(html, wiki_link_regex(), |caps| {
        let title = group(caps, 1).trim();
        format!(
            r#"<a {ATTR_NOTE_LINK}="" {ATTR_NOTE_ID}="{title}" href="{NOTE_HREF_PREFIX}{title}" class="note-link">{title}</a>"#
        )
    })
}

fn highlight(html: &str) -> String {
    rewrite(html, highlight_regex(), |caps| {
        format!("<mark>{}</mark>", group(caps, 1))
    })
}

fn embed_videos(html: &str) -> String {
    rewrite(html, video_link_regex(), |caps| {
        format!(
            r#"<div {ATTR_YOUTUBE_VIDEO}=""><iframe src="{YOUTUBE_EMBED_PREFIX}{}"></iframe></div>"#,
            group(caps, 1)
        )
    })
}
