//! Integration tests for the API, preview and export surfaces
//!
//! These exercise the conversion functions the way the notes service calls
//! them: content negotiation on API reads and writes, live preview of
//! streamed Markdown, and zip export of stored notes.

use std::io::{Cursor, Read};
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use note_markdown_converter::export::{NoteExport, write_archive};
use note_markdown_converter::negotiate::{prepare_for_storage, render_for_api};
use note_markdown_converter::preview::{PreviewOptions, StreamingPreview};
use note_markdown_converter::{is_likely_markdown, markdown_to_html};

fn stored_note(title: &str, html: &str, folder: Option<&str>) -> NoteExport {
    NoteExport {
        title: title.to_string(),
        created: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        updated: Utc.with_ymd_and_hms(2024, 5, 7, 7, 8, 9).unwrap(),
        space: Some("Personal".to_string()),
        folder: folder.map(str::to_string),
        html: html.to_string(),
    }
}

#[test]
fn test_api_write_then_read() {
    let inbound = "# Groceries\n\n- [ ] milk\n- [x] eggs\n\nSee [[Recipes]].";
    assert!(is_likely_markdown(inbound));

    let stored = prepare_for_storage(inbound);
    assert!(stored.contains(r#"<ul data-type="taskList">"#));
    assert!(stored.contains(r#"data-note-id="Recipes""#));

    assert_eq!(render_for_api(&stored), inbound);
}

#[test]
fn test_api_write_keeps_editor_html() {
    let html = r#"<ul data-type="taskList"><li data-type="taskItem" data-checked="false"><p>a</p></li></ul>"#;
    assert_eq!(prepare_for_storage(html), html);
    assert_eq!(render_for_api(html), "- [ ] a");
}

#[test]
fn test_streamed_preview_matches_final_render() {
    let response = "## Summary\n\nThe **plan** has three steps:\n\n1. draft\n2. review\n3. ship\n";
    let mut preview = StreamingPreview::new(PreviewOptions {
        min_interval: Duration::from_millis(50),
        ..Default::default()
    });

    let start = Instant::now();
    let mut rendered = Vec::new();
    for (i, chunk) in response.as_bytes().chunks(7).enumerate() {
        let chunk = std::str::from_utf8(chunk).expect("ascii response");
        if let Some(html) = preview.push_at(chunk, start + Duration::from_millis(20 * i as u64)) {
            rendered.push(html);
        }
    }

    assert!(rendered.len() > 1);
    assert!(rendered.len() < response.len() / 7 + 1);
    assert_eq!(preview.renders(), rendered.len());
    assert_eq!(preview.finish(), markdown_to_html(response));
}

#[test]
fn test_export_archive() {
    let notes = vec![
        stored_note("Trip: Lisbon", "<h1>Lisbon</h1><p>Day <strong>one</strong></p>", Some("Travel")),
        stored_note("Trip: Lisbon", "<p>Copy</p>", None),
        stored_note("", "", None),
    ];

    let mut buffer = Cursor::new(Vec::new());
    assert_eq!(write_archive(&notes, &mut buffer).expect("archive written"), 3);

    let mut archive = zip::ZipArchive::new(Cursor::new(buffer.into_inner())).expect("valid zip");
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.contains(&"Trip- Lisbon.md".to_string()), "names {names:?}");
    assert!(names.contains(&"Trip- Lisbon (1).md".to_string()), "names {names:?}");
    assert!(names.contains(&"Untitled.md".to_string()), "names {names:?}");

    let mut first = String::new();
    archive
        .by_name("Trip- Lisbon.md")
        .expect("entry")
        .read_to_string(&mut first)
        .expect("utf8 entry");
    assert_eq!(
        first,
        "---\ntitle: \"Trip: Lisbon\"\ncreated: 2024-05-06T07:08:09Z\nupdated: 2024-05-07T07:08:09Z\nspace: \"Personal\"\nfolder: \"Travel\"\n---\n\n# Lisbon\n\nDay **one**\n"
    );

    let mut empty = String::new();
    archive
        .by_name("Untitled.md")
        .expect("entry")
        .read_to_string(&mut empty)
        .expect("utf8 entry");
    assert!(empty.ends_with("space: \"Personal\"\n---\n"));
}
