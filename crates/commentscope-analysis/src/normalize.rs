//! Comment text normalization.

use std::sync::LazyLock;

use commentscope_core::RawComment;
use regex::Regex;

use crate::types::CleanedComment;

/// Everything that is not a word character, whitespace, or `. , ! ? ' " -`.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?'"-]"#).expect("valid regex"));

/// Delete every character outside the allow-list.
///
/// Word characters and whitespace are Unicode-aware, so accented letters and
/// non-Latin scripts survive while emoji and symbols are removed. Characters
/// are deleted, never replaced.
#[must_use]
pub fn normalize_comment(text: &str) -> String {
    DISALLOWED_RE.replace_all(text, "").into_owned()
}

/// Normalize each comment in order, keeping authors and the comment count.
#[must_use]
pub fn normalize_all(raw: Vec<RawComment>) -> Vec<CleanedComment> {
    raw.into_iter()
        .map(|c| CleanedComment {
            text: normalize_comment(&c.text),
            author: c.author,
        })
        .collect()
}
