//! Output filename derivation.
//!
//! The name comes from the first Markdown heading, or from the first
//! non-blank line when there is none, and is reduced to `[a-z0-9-]`.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

pub const DEFAULT_FILENAME: &str = "document";
pub const MAX_FILENAME_LEN: usize = 50;

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+").expect("BUG: invalid HEADING_MARKER regex literal"));

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("BUG: invalid DISALLOWED regex literal"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("BUG: invalid WHITESPACE_RUN regex literal"));

/// Derives the PDF base name (without extension) from Markdown source.
///
/// Only the first heading line is considered: a heading with no usable
/// characters yields [`DEFAULT_FILENAME`] even if later lines have text.
pub fn derive_filename(text: &str) -> String {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty()).peekable();
    let Some(first) = lines.peek().copied() else {
        return DEFAULT_FILENAME.to_string();
    };

    let candidate = match lines.find(|line| HEADING_MARKER.is_match(line)) {
        Some(heading) => HEADING_MARKER.replace(heading, ""),
        None => Cow::Borrowed(first),
    };
    normalize(&candidate)
}

/// The label shown above the preview, e.g. `my-notes.pdf`.
pub fn display_filename(text: &str) -> String {
    format!("{}.pdf", derive_filename(text))
}

fn normalize(candidate: &str) -> String {
    let lowered = candidate.to_lowercase();
    let kept = DISALLOWED.replace_all(&lowered, "");
    let slug: String = WHITESPACE_RUN
        .replace_all(&kept, "-")
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();

    if slug.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        slug
    }
}
