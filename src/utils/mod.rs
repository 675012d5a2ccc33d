//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

/// Maximum number of characters kept from an article extract
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Suffix appended to truncated extracts
pub const ELLIPSIS: &str = "...";

/// Image extensions accepted as an article's lead image
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".jpeg"];

/// Truncate text to `max_chars` characters, appending `...` when cut
///
/// Counting is done on `char`s so multi-byte text is never split inside a
/// code point. Text at or under the limit is returned unchanged.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Truncate an article extract to the stored summary length
pub fn truncate_summary(extract: &str) -> String {
    truncate_text(extract, SUMMARY_MAX_CHARS)
}

/// Check whether a file title names a supported image
pub fn is_supported_image(title: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| title.ends_with(ext))
}

/// Build the canonical article link for a page title
///
/// Spaces become underscores and each path segment is percent-encoded;
/// `/` inside a title is kept as a separator.
pub fn article_link(base_url: &str, title: &str) -> String {
    let slug = title.replace(' ', "_");
    let encoded = slug
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{base_url}{encoded}")
}

/// Python-style truthiness for loosely typed JSON request fields
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
