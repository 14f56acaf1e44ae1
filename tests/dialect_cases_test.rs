//! Integration tests for the editor dialect literal cases
//!
//! Every case is converted with both the structured converter and the
//! pattern converter; the two must agree with each other and with the
//! expected Markdown. Generated editor documents and one sample per dialect
//! entry are checked the same way.

use note_markdown_converter::dialect::{self, Construct, DIALECT};
use note_markdown_converter::dom::NodeKind;
use note_markdown_converter::{
    DomConverter, PatternConverter, html_to_markdown, markdown_to_html, parse_html,
};
use proptest::prelude::*;

/// (input HTML, expected Markdown)
const CASES: &[(&str, &str)] = &[
    (
        "<h2>Hello <strong>World</strong></h2><p>Some <em>text</em>.</p>",
        "## Hello **World**\n\nSome *text*.",
    ),
    (
        "<ul><li>A</li><li>B<ul><li>B1</li></ul></li></ul>",
        "- A\n- B\n  - B1",
    ),
    (
        r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="true">Done</li></ul>"#,
        "- [x] Done",
    ),
    (
        r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="true"><label><input type="checkbox" checked="checked"><span></span></label><div><p>Done</p></div></li><li data-type="taskItem" data-checked="false"><label><input type="checkbox"><span></span></label><div><p>Todo</p></div></li></ul>"#,
        "- [x] Done\n- [ ] Todo",
    ),
    (
        "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>",
        "| A | B |\n| --- | --- |\n| 1 | 2 |",
    ),
    (
        r#"<pre><code class="language-js">let x=1;</code></pre>"#,
        "```js\nlet x=1;\n```",
    ),
    ("<ol><li>one</li><li>two</li></ol>", "1. one\n2. two"),
    (
        "<p><b>b</b> <i>i</i> <s>s</s> <del>d</del> <u>u</u> <mark>m</mark> <code>c</code></p>",
        "**b** *i* ~~s~~ ~~d~~ _u_ ==m== `c`",
    ),
    (
        r#"<p><a href="https://example.com">Example</a> and <img src="a.png" alt="A"></p>"#,
        "[Example](https://example.com) and ![A](a.png)",
    ),
    (
        r##"<p>See <a data-note-link="" data-note-id="Roadmap" href="#note:Roadmap" class="note-link">Roadmap</a></p>"##,
        "See [[Roadmap]]",
    ),
    ("<blockquote><p>quoted</p></blockquote>", "> quoted"),
    ("<p>a</p><hr><p>b</p>", "a\n\n---\n\nb"),
    ("<p>line<br>break</p>", "line\nbreak"),
    (
        r#"<figure><img src="p.png"><figcaption>Cap</figcaption></figure>"#,
        "![Cap](p.png)",
    ),
    (
        r#"<div data-youtube-video=""><iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"></iframe></div>"#,
        "[YouTube Video](https://youtube.com/watch?v=dQw4w9WgXcQ)",
    ),
    ("<ul><ul><li>x</li></ul></ul>", "- x"),
    (
        "<p>p</p><ul><ul><li>x</li></ul><li>y</li></ul>",
        "p\n\n  - x\n- y",
    ),
    (
        "<ol><li>a</li><li>b<ol><li>c</li></ol></li></ol>",
        "1. a\n2. b\n   1. c",
    ),
    (
        "<ol><li>a</li><ul><li>n</li></ul><li>b</li></ol>",
        "1. a\n   - n\n3. b",
    ),
    ("<ol><p>lead</p><li>a</li></ol>", "lead\n2. a"),
    (
        r#"<ol><li data-type="taskItem" data-checked="true">a</li><li>b</li></ol>"#,
        "- [x] a\n2. b",
    ),
    (
        "<table><tr><th>h</th></tr><tr><td><table><tr><td>in</td></tr></table></td></tr></table>",
        "| h |\n| --- |\n| in |",
    ),
    ("<p><b><b>x</b></b></p>", "****x****"),
    ("<p>a\u{E000}0\u{E001}b</p>", "a0b"),
];

#[test]
fn test_structured_converter_cases() {
    let converter = DomConverter::new();
    for (html, expected) in CASES {
        let markdown = converter.convert(html).expect("conversion should succeed");
        assert_eq!(&markdown, expected, "input: {html}");
    }
}

#[test]
fn test_pattern_converter_cases() {
    let converter = PatternConverter::default();
    for (html, expected) in CASES {
        assert_eq!(&converter.convert(html), expected, "input: {html}");
    }
}

#[test]
fn test_converters_agree() {
    let structured = DomConverter::new();
    let pattern = PatternConverter::default();
    for (html, _) in CASES {
        assert_eq!(
            structured.convert(html).expect("conversion should succeed"),
            pattern.convert(html),
            "converters disagree on: {html}"
        );
    }
}

#[test]
fn test_public_entry_point_matches_structured_converter() {
    let converter = DomConverter::new();
    for (html, _) in CASES {
        assert_eq!(
            html_to_markdown(html),
            converter.convert(html).expect("conversion should succeed")
        );
    }
}

#[test]
fn test_whole_page_with_chrome() {
    let html = r#"<!DOCTYPE html>
<html>
<head><title>Ignored</title><style>p { color: red; }</style></head>
<body>
  <h1>Title</h1>
  <script>track();</script>
  <p>Body   text
     spread over lines.</p>
  <noscript>enable js</noscript>
</body>
</html>"#;
    let expected = "# Title\n\nBody text spread over lines.";
    assert_eq!(html_to_markdown(html), expected);
    assert_eq!(PatternConverter::default().convert(html), expected);
}

/// One editor-HTML sample per dialect construct
fn sample(construct: Construct) -> &'static str {
    match construct {
        Construct::Heading => "<h2>Title</h2>",
        Construct::Bold => "<p><strong>x</strong></p>",
        Construct::Italic => "<p><em>x</em></p>",
        Construct::Strike => "<p><s>x</s></p>",
        Construct::Underline => "<p><u>x</u></p>",
        Construct::InlineCode => "<p><code>x</code></p>",
        Construct::Highlight => "<p><mark>x</mark></p>",
        Construct::Paragraph => "<p>x</p>",
        Construct::LineBreak => "<p>a<br>b</p>",
        Construct::Rule => "<p>a</p><hr><p>b</p>",
        Construct::Link => r#"<p><a href="https://e.example">e</a></p>"#,
        Construct::Image => r#"<p><img src="a.png" alt="A"></p>"#,
        Construct::List => "<ul><li>a</li></ul>",
        Construct::TaskItem => {
            r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="true">a</li></ul>"#
        }
        Construct::Blockquote => "<blockquote><p>q</p></blockquote>",
        Construct::CodeBlock => r#"<pre><code class="language-js">x</code></pre>"#,
        Construct::Table => "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>",
        Construct::WikiLink => {
            r##"<p><a data-note-link="" data-note-id="N" href="#note:N">N</a></p>"##
        }
        Construct::VideoEmbed => {
            r#"<div data-youtube-video=""><iframe src="https://www.youtube.com/embed/abc123"></iframe></div>"#
        }
        Construct::Figure => r#"<figure><img src="p.png"><figcaption>Cap</figcaption></figure>"#,
    }
}

/// Constructs of every element in an HTML string
fn classified(html: &str) -> Vec<Construct> {
    let doc = parse_html(html).expect("Parse failed");
    doc.descendants(doc.body())
        .filter_map(|id| match doc.kind(id) {
            NodeKind::Element(element) => dialect::classify(&element.name, |name| element.attr(name)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_dialect_entry_converts_and_reparses() {
    let structured = DomConverter::new();
    let pattern = PatternConverter::default();

    for entry in DIALECT {
        let html = sample(entry.construct);
        assert!(classified(html).contains(&entry.construct), "sample: {html}");

        let markdown = structured.convert(html).expect("conversion should succeed");
        assert!(!markdown.is_empty(), "sample: {html}");
        assert_eq!(markdown, pattern.convert(html), "converters disagree on: {html}");

        // Underline re-parses as emphasis and a figure as a bare image
        let expected = match entry.construct {
            Construct::Underline => Construct::Italic,
            Construct::Figure => Construct::Image,
            construct => construct,
        };
        let back = markdown_to_html(&markdown);
        assert!(
            classified(&back).contains(&expected),
            "{:?} lost: {markdown:?} -> {back}",
            entry.construct
        );
    }
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn inline_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        word(),
        word().prop_map(|w| format!("<strong>{w}</strong>")),
        word().prop_map(|w| format!("<em>{w}</em>")),
        word().prop_map(|w| format!("<strong><em>{w}</em></strong>")),
        word().prop_map(|w| format!("<code>{w}</code>")),
        (word(), word()).prop_map(|(host, w)| format!(r#"<a href="https://{host}.example">{w}</a>"#)),
    ]
}

fn inline_run() -> impl Strategy<Value = String> {
    prop::collection::vec(inline_atom(), 1..4).prop_map(|atoms| atoms.join(" "))
}

/// Bullet, ordered or task list; items may hold a nested list
fn list(depth: u32) -> BoxedStrategy<String> {
    let item = if depth == 0 {
        inline_run().prop_map(|text| (text, None::<String>)).boxed()
    } else {
        (inline_run(), prop::option::of(list(depth - 1))).boxed()
    };

    (0..3u8, prop::collection::vec((item, any::<bool>()), 1..4))
        .prop_map(|(kind, items)| {
            let (open, close) = match kind {
                0 => ("<ul>", "</ul>"),
                1 => ("<ol>", "</ol>"),
                _ => (r#"<ul data-type="taskList">"#, "</ul>"),
            };
            let body: String = items
                .iter()
                .map(|((text, nested), checked)| {
                    let li = if kind == 2 {
                        format!(r#"<li data-type="taskItem" data-checked="{checked}">"#)
                    } else {
                        "<li>".to_string()
                    };
                    format!("{li}{text}{}</li>", nested.as_deref().unwrap_or(""))
                })
                .collect();
            format!("{open}{body}{close}")
        })
        .boxed()
}

fn table() -> impl Strategy<Value = String> {
    (1..4usize, any::<bool>()).prop_flat_map(|(columns, header)| {
        prop::collection::vec(prop::collection::vec(inline_run(), columns), 1..4).prop_map(
            move |rows| {
                let rows: String = rows
                    .iter()
                    .enumerate()
                    .map(|(i, cells)| {
                        let tag = if i == 0 && header { "th" } else { "td" };
                        let cells: String =
                            cells.iter().map(|c| format!("<{tag}>{c}</{tag}>")).collect();
                        format!("<tr>{cells}</tr>")
                    })
                    .collect();
                format!("<table>{rows}</table>")
            },
        )
    })
}

fn editor_block() -> impl Strategy<Value = String> {
    prop_oneof![
        inline_run().prop_map(|text| format!("<p>{text}</p>")),
        (1..=6u8, inline_run()).prop_map(|(level, text)| format!("<h{level}>{text}</h{level}>")),
        inline_run().prop_map(|text| format!("<blockquote><p>{text}</p></blockquote>")),
        "[a-z]{1,8}( [a-z]{1,8}){0,3}"
            .prop_map(|code| format!(r#"<pre><code class="language-rust">{code}</code></pre>"#)),
        list(2),
        table(),
    ]
}

proptest! {
    #[test]
    fn prop_converters_agree_on_editor_documents(
        blocks in prop::collection::vec(editor_block(), 1..5),
    ) {
        let html = blocks.concat();
        let structured = DomConverter::new().convert(&html).expect("conversion should succeed");
        prop_assert_eq!(structured, PatternConverter::default().convert(&html), "html: {}", html);
    }
}
