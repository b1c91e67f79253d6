//! Declaration splitting.

use super::scan::QuoteState;

/// A single `name: value` pair from a rule body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    /// Property name as written, trimmed.
    pub name: &'a str,
    /// Property value as written, trimmed. May include `!important`.
    pub value: &'a str,
}

impl<'a> Declaration<'a> {
    /// Split `name: value` on the first colon.
    ///
    /// Returns `None` for text without a colon or with an empty name.
    pub fn parse(text: &'a str) -> Option<Self> {
        let (name, value) = text.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            value: value.trim(),
        })
    }
}

/// Split a rule body on top-level `;`.
///
/// Semicolons inside parentheses (`url(a;b)`) or string literals are kept.
/// Empty segments are dropped and the rest are trimmed.
pub fn split_declarations(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut parts = Vec::new();
    let mut quotes = QuoteState::default();
    let mut depth = 0usize;
    let mut start = 0;

    for i in 0..bytes.len() {
        if quotes.step(bytes, i) {
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                push_trimmed(&mut parts, &body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_trimmed(&mut parts, &body[start..]);
    parts
}

fn push_trimmed<'a>(parts: &mut Vec<&'a str>, segment: &'a str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        parts.push(segment);
    }
}

/// Split a rule body into declarations, dropping segments that are not
/// `name: value` pairs.
pub fn parse_declarations(body: &str) -> Vec<Declaration<'_>> {
    split_declarations(body)
        .into_iter()
        .filter_map(|text| {
            let declaration = Declaration::parse(text);
            if declaration.is_none() {
                tracing::debug!(text, "dropping malformed declaration");
            }
            declaration
        })
        .collect()
}
