//! Placeholder substitution for message templates.
//!
//! A placeholder is the exact text `{{name}}`: no whitespace inside the
//! braces, case-sensitive. Bound names are replaced with the row's value for
//! the bound column; unbound placeholders are left as they are.

use crate::config::BodyFormat;
use common::model::recipient::RecipientRow;
use common::model::tag::TagSet;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder pattern is valid"));

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Renders `template` for one row.
///
/// Substitution is a single pass over the template, so a value that itself
/// contains `{{...}}` is inserted literally.
pub fn render(template: &str, tags: &TagSet, row: &RecipientRow) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match tags.get(&caps[1]) {
            Some(binding) => row.text(&binding.column),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Plain-text projection of rendered HTML: markup removed, a handful of
/// entities decoded, surrounding whitespace trimmed.
pub fn strip_html(html: &str) -> String {
    MARKUP
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .trim()
        .to_string()
}

/// Renders the message body for one row in the configured format.
pub fn render_body(template: &str, tags: &TagSet, row: &RecipientRow, format: BodyFormat) -> String {
    let rendered = render(template, tags, row);
    match format {
        BodyFormat::Html => rendered,
        BodyFormat::PlainText => strip_html(&rendered),
    }
}
