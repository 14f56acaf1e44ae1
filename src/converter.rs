//! Structured converter - transforms a parsed HTML tree to Markdown
//!
//! This module walks the arena [`Document`] produced by
//! [`parse_html`](crate::parser::parse_html) and dispatches every element to
//! a handler resolved through the [`Registry`]. It is the converter used when
//! a real parse tree is available; [`PatternConverter`](crate::pattern::PatternConverter)
//! implements the same dialect on raw strings.
//!
//! # Conversion Strategy
//!
//! 1. **Text nodes** collapse whitespace runs to single spaces. Whitespace-only
//!    text next to block elements is layout and is dropped.
//! 2. **Elements** resolve a handler by tag and attribute predicates. Unknown
//!    elements are transparent: their children are converted and the tag is
//!    discarded.
//! 3. **Output** starts at `<body>` and is normalized with
//!    [`collapse_blank_lines`].
//!
//! # Handlers
//!
//! A handler receives a [`HandlerContext`] exposing the element, attribute
//! lookup, conversion of all children or of a single child, and the
//! converter's options. Handlers return the Markdown for their element;
//! block handlers end their output with a blank line.
//!
//! # Examples
//!
//! ```rust
//! use note_markdown_converter::converter::DomConverter;
//!
//! let converter = DomConverter::new();
//! let markdown = converter
//!     .convert("<h2>Hello <strong>World</strong></h2><p>Some <em>text</em>.</p>")
//!     .expect("conversion");
//! assert_eq!(markdown, "## Hello **World**\n\nSome *text*.");
//! ```
//!
//! Overriding a handler:
//!
//! ```rust
//! use note_markdown_converter::converter::DomConverter;
//!
//! let converter = DomConverter::builder()
//!     .register("mark", |ctx| format!("<mark>{}</mark>", ctx.children()))
//!     .build();
//! let markdown = converter.convert("<p><mark>hi</mark></p>").expect("conversion");
//! assert_eq!(markdown, "<mark>hi</mark>");
//! ```

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::dialect::{
    self, ATTR_DATA_CHECKED, ATTR_DATA_TYPE, Construct, DIALECT, NON_CONTENT_TAGS, TASK_ITEM_TYPE,
};
use crate::dom::{Document, Element, NodeId, NodeKind};
use crate::error::ConversionError;
use crate::normalize::{collapse_blank_lines, normalize_inline_whitespace, strip_reserved_chars};
use crate::parser::parse_html;
use crate::registry::{Handler, Registry, Selector};

/// Nesting depth past which a subtree is flattened to its text content
///
/// Keeps pathological inputs from exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Width of the `- ` marker; task items indent like bullets
pub(crate) const BULLET_WIDTH: usize = 2;

/// How links are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// `[text](href "title")`
    #[default]
    Inlined,
    /// `[text][n]` with `[n]: href "title"` definitions after the body
    Referenced,
}

/// Conversion options shared by both HTML to Markdown converters
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Emit `<br>` as a newline; when false it becomes a space
    pub preserve_line_breaks: bool,
    /// Link output style
    pub link_style: LinkStyle,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            preserve_line_breaks: true,
            link_style: LinkStyle::Inlined,
        }
    }
}

/// A link collected for reference-style output
#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkReference {
    href: String,
    title: Option<String>,
}

/// Per-conversion mutable state
#[derive(Debug, Default)]
struct ConversionState {
    references: RefCell<Vec<LinkReference>>,
}

/// What a handler sees while converting one element
pub struct HandlerContext<'a> {
    converter: &'a DomConverter,
    doc: &'a Document,
    node: NodeId,
    element: &'a Element,
    depth: usize,
    state: &'a ConversionState,
}

impl<'a> HandlerContext<'a> {
    /// The element being converted
    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn tag(&self) -> &'a str {
        &self.element.name
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    pub fn options(&self) -> &'a ConversionOptions {
        &self.converter.options
    }

    /// Convert all children and concatenate the results
    pub fn children(&self) -> String {
        self.converter
            .convert_children(self.doc, self.node, self.depth + 1, self.state)
    }

    /// Convert a single node, normally one of this element's children
    pub fn convert(&self, node: NodeId) -> String {
        self.converter
            .convert_node(self.doc, node, self.depth + 1, self.state)
    }

    /// Raw text of the element's subtree
    pub fn text_content(&self) -> String {
        self.doc.text_content(self.node)
    }

    /// Record a link for reference-style output and return its number
    pub fn add_link_reference(&self, href: &str, title: Option<&str>) -> usize {
        let reference = LinkReference {
            href: href.to_string(),
            title: title.map(str::to_string),
        };
        let mut references = self.state.references.borrow_mut();
        if let Some(pos) = references.iter().position(|r| *r == reference) {
            return pos + 1;
        }
        references.push(reference);
        references.len()
    }
}

/// Structured HTML to Markdown converter
///
/// Built once per configuration and immutable afterwards, so a single
/// instance can serve concurrent conversions.
#[derive(Debug, Clone)]
pub struct DomConverter {
    options: ConversionOptions,
    registry: Registry,
}

impl DomConverter {
    /// Create a converter with default options and handlers
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_options(options: ConversionOptions) -> Self {
        Self::builder().options(options).build()
    }

    pub fn builder() -> DomConverterBuilder {
        DomConverterBuilder::new()
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse and convert an HTML string
    ///
    /// Empty and whitespace-only input converts to an empty string.
    ///
    /// # Errors
    ///
    /// Propagates parser errors; html5ever accepts any non-empty string, so
    /// in practice this never fails.
    pub fn convert(&self, html: &str) -> Result<String, ConversionError> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }
        let doc = parse_html(&strip_reserved_chars(html))?;
        Ok(self.convert_document(&doc))
    }

    /// Convert the body of an already parsed document
    pub fn convert_document(&self, doc: &Document) -> String {
        let state = ConversionState::default();
        let mut output = self.convert_children(doc, doc.body(), 0, &state);

        let references = state.references.into_inner();
        if !references.is_empty() {
            output.push_str("\n\n");
            for (i, reference) in references.iter().enumerate() {
                output.push_str(&format!("[{}]: {}", i + 1, reference.href));
                if let Some(title) = &reference.title {
                    output.push_str(&format!(" \"{}\"", escape_title(title)));
                }
                output.push('\n');
            }
        }

        collapse_blank_lines(&output)
    }

    fn convert_node(
        &self,
        doc: &Document,
        node: NodeId,
        depth: usize,
        state: &ConversionState,
    ) -> String {
        match doc.kind(node) {
            NodeKind::Document => self.convert_children(doc, node, depth, state),
            NodeKind::Text(text) => normalize_inline_whitespace(text),
            NodeKind::Comment | NodeKind::Doctype => String::new(),
            NodeKind::Element(element) => {
                if depth >= MAX_NESTING_DEPTH {
                    return normalize_inline_whitespace(&doc.text_content(node));
                }
                match self.registry.resolve(element) {
                    Some(handler) => {
                        let ctx = HandlerContext {
                            converter: self,
                            doc,
                            node,
                            element,
                            depth,
                            state,
                        };
                        handler(&ctx)
                    }
                    None => self.convert_children(doc, node, depth + 1, state),
                }
            }
        }
    }

    fn convert_children(
        &self,
        doc: &Document,
        node: NodeId,
        depth: usize,
        state: &ConversionState,
    ) -> String {
        let children = doc.children(node);
        let mut output = String::new();

        for (i, &child) in children.iter().enumerate() {
            if let NodeKind::Text(text) = doc.kind(child)
                && text.chars().all(|c| c.is_ascii_whitespace())
            {
                let is_layout = |neighbor: Option<&NodeId>| match neighbor {
                    None => true,
                    Some(&n) => doc.tag_name(n).is_some_and(dialect::is_block_tag),
                };
                let prev = i.checked_sub(1).and_then(|p| children.get(p));
                if !text.is_empty() && !is_layout(prev) && !is_layout(children.get(i + 1)) {
                    output.push(' ');
                }
                continue;
            }
            output.push_str(&self.convert_node(doc, child, depth, state));
        }

        output
    }
}

impl Default for DomConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`DomConverter`]
///
/// Starts with the default handlers registered; caller handlers registered
/// afterwards replace defaults under equal selectors.
pub struct DomConverterBuilder {
    options: ConversionOptions,
    registry: Registry,
}

impl DomConverterBuilder {
    pub fn new() -> Self {
        Self {
            options: ConversionOptions::default(),
            registry: default_registry(),
        }
    }

    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a handler under a registry key such as `li` or
    /// `li[data-type="taskItem"]`
    ///
    /// An invalid key is logged and ignored.
    pub fn register<F>(mut self, key: &str, handler: F) -> Self
    where
        F: Fn(&HandlerContext<'_>) -> String + Send + Sync + 'static,
    {
        if let Err(err) = self.registry.register(key, handler) {
            tracing::warn!(key, error = %err, "ignoring converter registration");
        }
        self
    }

    /// Register several handlers; an invalid key is logged and the rest of
    /// the batch is skipped
    pub fn register_bulk<'k, I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = (&'k str, Handler)>,
    {
        if let Err(err) = self.registry.register_bulk(handlers) {
            tracing::warn!(error = %err, "bulk converter registration stopped early");
        }
        self
    }

    pub fn build(self) -> DomConverter {
        tracing::debug!(
            selectors = self.registry.len(),
            options = ?self.options,
            "built dom converter"
        );
        DomConverter {
            options: self.options,
            registry: self.registry,
        }
    }
}

impl Default for DomConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

type HandlerFn = fn(&HandlerContext<'_>) -> String;

/// Handler for one registry key of a dialect construct
fn default_handler(construct: Construct, key: &str) -> HandlerFn {
    match construct {
        Construct::Heading => heading,
        Construct::Bold
        | Construct::Italic
        | Construct::Strike
        | Construct::Underline
        | Construct::Highlight => inline_format,
        Construct::InlineCode => inline_code,
        Construct::Paragraph => paragraph,
        Construct::LineBreak => line_break,
        Construct::Rule => rule,
        Construct::Link => link,
        Construct::WikiLink => wiki_link,
        Construct::Image => image,
        Construct::List if key == "li" => list_item,
        Construct::List => list,
        Construct::TaskItem => list_item,
        Construct::Blockquote => blockquote,
        Construct::CodeBlock => code_block,
        Construct::Table => table,
        Construct::VideoEmbed => video_embed,
        Construct::Figure => figure,
    }
}

/// Registry holding every default handler
///
/// Keys come from the dialect table; non-content elements get a handler
/// that drops them.
pub fn default_registry() -> Registry {
    let constructs = DIALECT.iter().flat_map(|entry| {
        entry
            .tag_or_pattern
            .iter()
            .map(move |&key| (key, default_handler(entry.construct, key)))
    });
    let non_content = NON_CONTENT_TAGS.iter().map(|&tag| (tag, skip as HandlerFn));

    let mut registry = Registry::new();
    for (key, handler) in constructs.chain(non_content) {
        match Selector::parse(key) {
            Ok(selector) => registry.insert(selector, Arc::new(handler)),
            Err(err) => tracing::warn!(key, error = %err, "invalid default selector"),
        }
    }
    registry
}

fn skip(_ctx: &HandlerContext<'_>) -> String {
    String::new()
}

fn heading(ctx: &HandlerContext<'_>) -> String {
    let level = dialect::heading_level(ctx.tag()).unwrap_or(1);
    let text = normalize_inline_whitespace(&ctx.children());
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    format!("\n\n{} {}\n\n", "#".repeat(level), text)
}

fn paragraph(ctx: &HandlerContext<'_>) -> String {
    let content = ctx.children();
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{content}\n\n")
}

fn line_break(ctx: &HandlerContext<'_>) -> String {
    if ctx.options().preserve_line_breaks {
        "\n".to_string()
    } else {
        " ".to_string()
    }
}

fn rule(_ctx: &HandlerContext<'_>) -> String {
    "\n\n---\n\n".to_string()
}

/// Bold, italic, strike, underline and highlight
///
/// Whitespace at the edges of the content moves outside the delimiters so
/// the emphasis still parses.
fn inline_format(ctx: &HandlerContext<'_>) -> String {
    let content = ctx.children();
    let Some(delimiter) = dialect::inline_delimiter(ctx.tag()) else {
        return content;
    };
    wrap_inline(&content, delimiter)
}

pub(crate) fn wrap_inline(content: &str, delimiter: &str) -> String {
    let inner = content.trim();
    if inner.is_empty() {
        return if content.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let leading = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trailing = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{leading}{delimiter}{inner}{delimiter}{trailing}")
}

fn inline_code(ctx: &HandlerContext<'_>) -> String {
    let code = ctx.text_content().replace(['\n', '\r'], " ");
    if code.is_empty() {
        return String::new();
    }
    if code.contains('`') {
        format!("`` {code} ``")
    } else {
        format!("`{code}`")
    }
}

fn link(ctx: &HandlerContext<'_>) -> String {
    if dialect::wiki_link_target(|name| ctx.attr(name)).is_some() {
        return wiki_link(ctx);
    }

    let text = normalize_inline_whitespace(&ctx.children());
    let text = text.trim();
    let href = ctx.attr("href").map(str::trim).unwrap_or("");
    if href.is_empty() || text.is_empty() {
        return text.to_string();
    }
    let title = ctx.attr("title").filter(|t| !t.is_empty());

    match ctx.options().link_style {
        LinkStyle::Inlined => match title {
            Some(title) => format!("[{text}]({href} \"{}\")", escape_title(title)),
            None => format!("[{text}]({href})"),
        },
        LinkStyle::Referenced => {
            let n = ctx.add_link_reference(href, title);
            format!("[{text}][{n}]")
        }
    }
}

fn wiki_link(ctx: &HandlerContext<'_>) -> String {
    let target = dialect::wiki_link_target(|name| ctx.attr(name)).unwrap_or("");
    if !target.is_empty() {
        return format!("[[{target}]]");
    }
    let text = normalize_inline_whitespace(&ctx.text_content());
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("[[{text}]]")
    }
}

fn image(ctx: &HandlerContext<'_>) -> String {
    let src = ctx.attr("src").map(str::trim).unwrap_or("");
    if src.is_empty() {
        return String::new();
    }
    let alt = ctx.attr("alt").unwrap_or("");
    match ctx.attr("title").filter(|t| !t.is_empty()) {
        Some(title) => format!("![{alt}]({src} \"{}\")", escape_title(title)),
        None => format!("![{alt}]({src})"),
    }
}

fn list(ctx: &HandlerContext<'_>) -> String {
    let doc = ctx.document();
    let mut items = String::new();
    let mut indent = BULLET_WIDTH;

    for child in doc.element_children(ctx.node()) {
        let converted = ctx.convert(child);
        if doc.is_element_named(child, "li") {
            indent = item_marker(doc, child).1;
            items.push_str(&converted);
        } else {
            // Lists nested directly in a list, as some editors emit them
            push_indented(&mut items, converted.trim(), indent);
        }
    }

    if items.is_empty() {
        return String::new();
    }
    let nested_in_item = ctx
        .document()
        .parent(ctx.node())
        .is_some_and(|p| doc.is_element_named(p, "li"));
    if nested_in_item {
        format!("{items}\n")
    } else {
        format!("\n{items}\n")
    }
}

/// Append `text` line by line, non-empty lines indented `indent` spaces
pub(crate) fn push_indented(out: &mut String, text: &str, indent: usize) {
    for line in text.lines() {
        if !line.is_empty() {
            out.extend(std::iter::repeat_n(' ', indent));
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Marker of a list item and the indent its continuation lines take
///
/// The ordinal is the item's index among its parent's element children.
fn item_marker(doc: &Document, li: NodeId) -> (String, usize) {
    if doc.attr(li, ATTR_DATA_TYPE) == Some(TASK_ITEM_TYPE) {
        let marker = if dialect::is_checked(doc.attr(li, ATTR_DATA_CHECKED)) {
            "- [x] "
        } else {
            "- [ ] "
        };
        return (marker.to_string(), BULLET_WIDTH);
    }
    let ordered = doc
        .parent(li)
        .is_some_and(|p| doc.is_element_named(p, "ol"));
    if ordered {
        let marker = format!("{}. ", doc.element_index(li) + 1);
        let width = marker.len();
        (marker, width)
    } else {
        ("- ".to_string(), BULLET_WIDTH)
    }
}

/// Plain, ordered and task items
fn list_item(ctx: &HandlerContext<'_>) -> String {
    let (marker, indent) = item_marker(ctx.document(), ctx.node());
    render_list_item(ctx, &marker, indent)
}

/// Marker plus content; with a nested list, continuation lines are indented
/// to the marker width
fn render_list_item(ctx: &HandlerContext<'_>, marker: &str, indent: usize) -> String {
    let doc = ctx.document();
    let mut content = String::new();

    for &child in doc.children(ctx.node()) {
        let is_list = doc.is_element_named(child, "ul") || doc.is_element_named(child, "ol");
        if is_list && !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        if let NodeKind::Text(text) = doc.kind(child)
            && text.chars().all(|c| c.is_ascii_whitespace())
        {
            if !content.is_empty() && !content.ends_with([' ', '\n']) {
                content.push(' ');
            }
            continue;
        }
        content.push_str(&ctx.convert(child));
    }

    let content = content.trim();
    let has_nested_list = doc
        .descendants(ctx.node())
        .any(|n| doc.is_element_named(n, "ul") || doc.is_element_named(n, "ol"));

    let mut out = String::with_capacity(marker.len() + content.len() + 8);
    out.push_str(marker);
    match content.split_once('\n') {
        Some((first, rest)) if has_nested_list => {
            out.push_str(first);
            out.push('\n');
            push_indented(&mut out, rest, indent);
        }
        _ => {
            out.push_str(content);
            out.push('\n');
        }
    }
    out
}

fn blockquote(ctx: &HandlerContext<'_>) -> String {
    let content = collapse_blank_lines(&ctx.children());
    if content.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = content.lines().map(|line| format!("> {line}")).collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn language_regex() -> Option<&'static Regex> {
    static LANGUAGE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    LANGUAGE_REGEX
        .get_or_init(|| Regex::new(r"language-(\w+)").ok())
        .as_ref()
}

/// Language tag from a `class` attribute value
pub(crate) fn code_language(class: Option<&str>) -> String {
    class
        .and_then(|class| language_regex()?.captures(class))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Fenced code block text; the fence grows past any backtick run in the code
pub(crate) fn fenced_code(language: &str, code: &str) -> String {
    let code = code.strip_suffix('\n').unwrap_or(code);
    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

fn code_block(ctx: &HandlerContext<'_>) -> String {
    let doc = ctx.document();
    let code = doc
        .element_children(ctx.node())
        .find(|&c| doc.is_element_named(c, "code"));

    let class = code
        .and_then(|c| doc.attr(c, "class"))
        .or_else(|| ctx.attr("class"));
    let language = code_language(class);
    let text = doc.text_content(code.unwrap_or(ctx.node()));

    fenced_code(&language, &text)
}

/// Pipe-table text from rows of cell strings
///
/// The separator row follows row 0 only when row 0 had a header cell.
pub(crate) fn pipe_table(rows: &[Vec<String>], first_row_has_header: bool) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, cells) in rows.iter().enumerate() {
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 && first_row_has_header {
            let separator = vec!["---"; cells.len().max(1)];
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }
    format!("\n\n{}\n\n", lines.join("\n"))
}

/// Cell text on one line with pipes escaped
pub(crate) fn table_cell(text: &str) -> String {
    normalize_inline_whitespace(text)
        .trim()
        .replace('|', "\\|")
}

/// Rows of a table: `tr` children of the table and of its row groups
fn table_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in doc.element_children(table) {
        match doc.tag_name(child) {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                doc.element_children(child)
                    .filter(|&row| doc.is_element_named(row, "tr")),
            ),
            _ => {}
        }
    }
    rows
}

/// Pipe table; a table inside another table flattens to its cell text
fn table(ctx: &HandlerContext<'_>) -> String {
    let doc = ctx.document();
    let mut rows = Vec::new();
    let mut first_row_has_header = false;

    for tr in table_rows(doc, ctx.node()) {
        let mut has_header = false;
        let cells: Vec<String> = doc
            .element_children(tr)
            .filter(|&c| {
                let th = doc.is_element_named(c, "th");
                has_header |= th;
                th || doc.is_element_named(c, "td")
            })
            .map(|cell| table_cell(&ctx.convert_children_of(cell)))
            .collect();
        if rows.is_empty() {
            first_row_has_header = has_header;
        }
        rows.push(cells);
    }

    let in_table = std::iter::successors(doc.parent(ctx.node()), |&n| doc.parent(n))
        .any(|n| doc.is_element_named(n, "table"));
    if in_table {
        return flatten_table(&rows);
    }
    pipe_table(&rows, first_row_has_header)
}

/// Non-empty cells of a nested table, space separated
pub(crate) fn flatten_table(rows: &[Vec<String>]) -> String {
    let cells: Vec<&str> = rows
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|cell| !cell.is_empty())
        .collect();
    cells.join(" ")
}

impl HandlerContext<'_> {
    /// Convert the children of an arbitrary node
    fn convert_children_of(&self, node: NodeId) -> String {
        self.converter
            .convert_children(self.doc, node, self.depth + 1, self.state)
    }
}

fn figure(ctx: &HandlerContext<'_>) -> String {
    let doc = ctx.document();
    let Some(img) = doc.find_descendant(ctx.node(), "img") else {
        return ctx.children();
    };
    let src = doc.attr(img, "src").map(str::trim).unwrap_or("");
    if src.is_empty() {
        return String::new();
    }
    let caption = doc
        .find_descendant(ctx.node(), "figcaption")
        .map(|c| normalize_inline_whitespace(&doc.text_content(c)).trim().to_string())
        .unwrap_or_default();
    let alt = doc
        .attr(img, "alt")
        .filter(|a| !a.is_empty())
        .unwrap_or(caption.as_str());
    format!("\n\n![{alt}]({src})\n\n")
}

fn video_embed(ctx: &HandlerContext<'_>) -> String {
    let doc = ctx.document();
    let id = doc
        .find_descendant(ctx.node(), "iframe")
        .and_then(|iframe| doc.attr(iframe, "src"))
        .and_then(dialect::youtube_embed_id);
    match id {
        Some(id) => format!(
            "\n\n[{}]({}{})\n\n",
            dialect::YOUTUBE_LINK_TEXT,
            dialect::YOUTUBE_WATCH_PREFIX,
            id
        ),
        None => String::new(),
    }
}

pub(crate) fn escape_title(title: &str) -> String {
    title.replace('"', "\\\"")
}
