//! Shared utilities for channel implementations.

use babel_core::message::TextFormat;

/// Split a long message into chunks that respect a platform's character limit.
///
/// Slice boundaries are aligned to UTF-8 char boundaries, so multi-byte
/// content (CJK, emoji) never panics. Prefers splitting after a newline.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = floor_char_boundary(text, (start + max_len).min(text.len()));
        // A single char wider than max_len still has to go somewhere.
        let end = if end <= start {
            start + text[start..].chars().next().map_or(1, char::len_utf8)
        } else {
            end
        };
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Telegram `parse_mode` for a text format.
pub fn parse_mode(format: TextFormat) -> Option<&'static str> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Html => Some("HTML"),
    }
}
