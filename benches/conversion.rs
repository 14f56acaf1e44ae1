//! Benchmarks for both conversion directions.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use note_markdown_converter::{DomConverter, MarkdownGenerator, PatternConverter, html_to_markdown};

/// A typical editor note
const NOTE_HTML: &str = r##"<h1>Weekly plan</h1>
<p>Focus on <strong>shipping</strong> the <em>export</em> work. See <a data-note-link="" data-note-id="Roadmap" href="#note:Roadmap" class="note-link">Roadmap</a>.</p>
<ul data-type="taskList"><li data-type="taskItem" data-checked="true"><label><input type="checkbox" checked="checked"><span></span></label><div><p>Draft</p></div></li><li data-type="taskItem" data-checked="false"><label><input type="checkbox"><span></span></label><div><p>Review</p></div></li></ul>
<table><tr><th>Day</th><th>Task</th></tr><tr><td>Mon</td><td>Plan</td></tr></table>
<pre><code class="language-rust">fn main() {}</code></pre>
<blockquote><p>Keep it small.</p></blockquote>"##;

const NOTE_MARKDOWN: &str = "# Weekly plan\n\nFocus on **shipping** the *export* work. See [[Roadmap]].\n\n- [x] Draft\n- [ ] Review\n\n| Day | Task |\n| --- | --- |\n| Mon | Plan |\n\n```rust\nfn main() {}\n```\n\n> Keep it small.";

/// Scraped-page style document of roughly 150KB
fn scraped_page() -> String {
    let mut html = String::from("<html><head><style>.x{}</style></head><body>");
    let mut i = 0;
    while html.len() < 150 * 1024 {
        html.push_str(&format!(
            r#"<div class="card"><h2>Section {i}</h2><p>Text {i} with <a href="https://example.com/{i}">a link</a> and <code>code</code>.</p><script>t({i})</script><ul><li>one<ul><li>two</li></ul></li></ul><table><tr><th>k</th></tr><tr><td>{i}</td></tr></table></div>"#
        ));
        i += 1;
    }
    html.push_str("</body></html>");
    html
}

// ============================================================================
// HTML to Markdown
// ============================================================================

fn bench_note_html_to_markdown(c: &mut Criterion) {
    let structured = DomConverter::new();
    let pattern = PatternConverter::default();

    let mut group = c.benchmark_group("note_html_to_markdown");
    group.throughput(Throughput::Bytes(NOTE_HTML.len() as u64));
    group.bench_function("structured", |b| {
        b.iter(|| structured.convert(black_box(NOTE_HTML)).unwrap());
    });
    group.bench_function("pattern", |b| {
        b.iter(|| pattern.convert(black_box(NOTE_HTML)));
    });
    group.finish();
}

fn bench_scraped_page(c: &mut Criterion) {
    let html = scraped_page();
    let pattern = PatternConverter::default();

    let mut group = c.benchmark_group("scraped_page_150k");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(html.len() as u64));
    group.bench_function("structured", |b| {
        b.iter(|| html_to_markdown(black_box(&html)));
    });
    group.bench_function("pattern", |b| {
        b.iter(|| pattern.convert(black_box(&html)));
    });
    group.finish();
}

// ============================================================================
// Markdown to HTML
// ============================================================================

fn bench_markdown_to_html(c: &mut Criterion) {
    let generator = MarkdownGenerator::default();
    let long: String = (0..500).map(|_| format!("{NOTE_MARKDOWN}\n\n")).collect();

    let mut group = c.benchmark_group("markdown_to_html");
    group.bench_function("note", |b| {
        b.iter(|| generator.generate(black_box(NOTE_MARKDOWN)));
    });
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_document", |b| {
        b.iter(|| generator.generate(black_box(&long)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_note_html_to_markdown,
    bench_scraped_page,
    bench_markdown_to_html
);
criterion_main!(benches);
