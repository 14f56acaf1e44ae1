//! Whitespace and entity normalization shared by every converter
//!
//! # Rules
//!
//! - Text nodes collapse runs of HTML whitespace to a single space. Fenced
//!   code never goes through this path.
//! - Final Markdown output caps blank lines at one, collapses interior runs
//!   of spaces and tabs, strips trailing whitespace, and trims the document.
//!   Leading indentation, fenced code blocks and inline code spans are kept
//!   as-is so list nesting and code survive.
//! - Entities are decoded once, at the end of the pattern pipeline or by
//!   html5ever in the structured path.
//! - The private-use code points U+E000..=U+E004 are reserved for the pattern
//!   converter's placeholders and are dropped from raw HTML input by both
//!   converters.

use std::borrow::Cow;

/// Private-use code points reserved for conversion placeholders
pub const RESERVED_CHARS: std::ops::RangeInclusive<char> = '\u{E000}'..='\u{E004}';

/// Drop reserved placeholder code points from raw input
pub fn strip_reserved_chars(text: &str) -> Cow<'_, str> {
    if text.chars().any(|c| RESERVED_CHARS.contains(&c)) {
        Cow::Owned(text.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Collapse runs of whitespace inside a text node to a single space
///
/// Only ASCII whitespace is collapsed, matching HTML's definition. A
/// non-breaking space is treated as an ordinary space.
///
/// # Examples
///
/// ```text
/// "Text   with\n  newlines" -> "Text with newlines"
/// "  padded  " -> " padded "
/// ```
pub fn normalize_inline_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.chars() {
        let ch = if ch == '\u{a0}' { ' ' } else { ch };
        if ch.is_ascii_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(ch);
            prev_space = false;
        }
    }

    result
}

/// Normalize final Markdown output
///
/// **Normalization Rules:**
/// 1. **Line Endings**: CRLF becomes LF
/// 2. **Trailing Whitespace**: removed from every line outside fenced code
/// 3. **Spaces**: interior runs of spaces/tabs collapse to one space, except
///    leading indentation and inline code spans
/// 4. **Blank Lines**: at most one blank line in a row outside fenced code
/// 5. **Document**: leading and trailing whitespace trimmed
///
/// The function is idempotent.
pub fn collapse_blank_lines(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut result = String::with_capacity(text.len());
    let mut prev_blank = false;
    let mut in_code_block = false;

    for line in text.split('\n') {
        let is_fence = line.trim_start().starts_with("```");

        if in_code_block {
            result.push_str(line.trim_end_matches('\r'));
            result.push('\n');
            prev_blank = false;
            if is_fence {
                in_code_block = false;
            }
            continue;
        }

        if is_fence {
            in_code_block = true;
        }

        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.trim_start_matches([' ', '\t']).is_empty() {
            if !prev_blank {
                result.push('\n');
                prev_blank = true;
            }
            continue;
        }

        result.push_str(&collapse_line_spaces(trimmed));
        result.push('\n');
        prev_blank = false;
    }

    result.trim().to_string()
}

/// Collapse interior runs of spaces and tabs within one line
///
/// Leading indentation and inline code spans are left untouched.
fn collapse_line_spaces(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut prev_space = false;
    let mut at_start = true;
    let mut in_inline_code = false;

    for ch in line.chars() {
        if ch == '`' {
            in_inline_code = !in_inline_code;
            result.push(ch);
            prev_space = false;
            at_start = false;
        } else if ch == ' ' || ch == '\t' {
            if in_inline_code || at_start {
                result.push(ch);
            } else if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(ch);
            prev_space = false;
            at_start = false;
        }
    }

    result
}

/// Decode HTML entities
///
/// Handles `&amp; &lt; &gt; &quot; &apos; &#39; &nbsp;` plus decimal
/// (`&#NNN;`) and hexadecimal (`&#xHEX;`) references. Unknown or invalid
/// references are left verbatim. `&nbsp;` decodes to a plain space.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        match decode_one(candidate) {
            Some((decoded, consumed)) => {
                result.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                result.push('&');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Longest entity body we look at, e.g. `#x10FFFF`
const MAX_ENTITY_LEN: usize = 10;

/// Decode the entity at the start of `s`, returning the char and bytes consumed
fn decode_one(s: &str) -> Option<(char, usize)> {
    let window_end = s
        .char_indices()
        .take(MAX_ENTITY_LEN + 2)
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    let semi = s[..window_end].find(';')?;
    let body = &s[1..semi];

    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let numeric = body.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };

    Some((ch, semi + 1))
}

/// Escape Markdown metacharacters in plain text
///
/// Escapes `\ * _ [ ]` with a backslash and re-encodes `< >` as entities.
/// The conversion pipelines do not call this on text nodes; it is exposed for
/// callers that need literal text to survive a round trip.
pub fn encode_for_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '*' | '_' | '[' | ']' => {
                result.push('\\');
                result.push(ch);
            }
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}
