//! Post-processing of collaborator output
//!
//! The system instruction asks for raw HTML, but models still wrap the
//! document in a markdown fence now and then. Strip one leading fence (with
//! or without a language tag) and one trailing fence; everything else passes
//! through untouched.

use super::client::GenerationError;

const FENCE: &str = "```";

pub fn clean_generated_markup(raw: &str) -> Result<String, GenerationError> {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest.strip_suffix(FENCE).unwrap_or(rest);
        text = skip_language_tag(text);
    } else if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text.to_string())
}

/// Drops a language tag directly after an opening fence. A word only counts as
/// a tag when whitespace follows it and the rest is empty or starts with markup.
fn skip_language_tag(body: &str) -> &str {
    let candidate = body.trim_start_matches([' ', '\t']);
    let tag_len = candidate
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(candidate.len());
    if tag_len == 0 {
        return body;
    }

    let after = &candidate[tag_len..];
    let separated = after.is_empty() || after.starts_with(char::is_whitespace);
    let remainder = after.trim_start();
    if separated && (remainder.is_empty() || remainder.starts_with('<')) {
        after
    } else {
        body
    }
}
