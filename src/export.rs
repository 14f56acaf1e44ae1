//! Note export to a zip archive of Markdown files
//!
//! Each note becomes one `.md` entry: a YAML front matter block followed by
//! the note body converted with [`html_to_markdown`]. Entry names come from
//! note titles; titles that collide get ` (1)`, ` (2)`, ... before the
//! extension.
//!
//! # Front Matter
//!
//! ```yaml
//! ---
//! title: "Weekly plan"
//! created: 2024-03-01T09:30:00Z
//! updated: 2024-03-02T10:00:00Z
//! space: "Work"
//! folder: "Plans"
//! ---
//! ```
//!
//! `space` and `folder` are omitted when absent.

use std::collections::HashSet;
use std::io::{Seek, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ConversionError;
use crate::html_to_markdown;

/// Longest file stem, in characters, kept from a title
const MAX_STEM_CHARS: usize = 100;

/// Stem used when a title has no usable characters
const UNTITLED: &str = "Untitled";

/// One note to export
#[derive(Debug, Clone)]
pub struct NoteExport {
    pub title: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub space: Option<String>,
    pub folder: Option<String>,
    /// Stored editor HTML
    pub html: String,
}

/// YAML front matter block for a note, ending with the closing `---` line
pub fn front_matter(note: &NoteExport) -> String {
    let mut output = String::from("---\n");

    output.push_str("title: ");
    write_yaml_string(&mut output, &note.title);
    output.push('\n');

    output.push_str("created: ");
    output.push_str(&note.created.to_rfc3339_opts(SecondsFormat::Secs, true));
    output.push('\n');

    output.push_str("updated: ");
    output.push_str(&note.updated.to_rfc3339_opts(SecondsFormat::Secs, true));
    output.push('\n');

    if let Some(space) = &note.space {
        output.push_str("space: ");
        write_yaml_string(&mut output, space);
        output.push('\n');
    }
    if let Some(folder) = &note.folder {
        output.push_str("folder: ");
        write_yaml_string(&mut output, folder);
        output.push('\n');
    }

    output.push_str("---\n");
    output
}

/// Write a double-quoted YAML scalar
///
/// - `Hello World` -> `"Hello World"`
/// - `Quote "test"` -> `"Quote \"test\""`
fn write_yaml_string(output: &mut String, value: &str) {
    output.push('"');
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            _ => output.push(ch),
        }
    }
    output.push('"');
}

/// Complete Markdown file content for a note
pub fn note_to_markdown(note: &NoteExport) -> String {
    let body = html_to_markdown(&note.html);
    let mut output = front_matter(note);
    if !body.is_empty() {
        output.push('\n');
        output.push_str(&body);
        output.push('\n');
    }
    output
}

/// Hands out unique `.md` file names within one archive
#[derive(Debug, Default)]
pub struct FilenameAllocator {
    used: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name for a title, disambiguated against earlier allocations
    ///
    /// Comparison ignores ASCII case, so names stay unique on
    /// case-insensitive file systems.
    pub fn allocate(&mut self, title: &str) -> String {
        let stem = sanitize_stem(title);
        let mut candidate = format!("{stem}.md");
        let mut n = 1;
        while !self.used.insert(candidate.to_ascii_lowercase()) {
            candidate = format!("{stem} ({n}).md");
            n += 1;
        }
        candidate
    }
}

/// File stem from a title: path separators, reserved characters and control
/// characters become `-`, surrounding dots and spaces are trimmed
fn sanitize_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .take(MAX_STEM_CHARS)
        .collect();
    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write every note as a deflated entry; returns the number of entries
///
/// # Errors
///
/// `ConversionError::Export` when the zip writer or the underlying writer
/// fails.
pub fn write_archive<W: Write + Seek>(
    notes: &[NoteExport],
    writer: W,
) -> Result<usize, ConversionError> {
    let mut zip = ZipWriter::new(writer);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut names = FilenameAllocator::new();

    for note in notes {
        let name = names.allocate(&note.title);
        let content = note_to_markdown(note);

        zip.start_file(name.as_str(), deflated).map_err(|err| {
            tracing::warn!(file = %name, error = %err, "export entry failed");
            ConversionError::from(err)
        })?;
        zip.write_all(content.as_bytes()).map_err(|err| {
            tracing::warn!(file = %name, error = %err, "export write failed");
            ConversionError::from(err)
        })?;
    }

    zip.finish()?;
    tracing::debug!(notes = notes.len(), "wrote export archive");
    Ok(notes.len())
}
