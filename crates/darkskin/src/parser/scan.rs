//! Quote- and escape-aware byte scanning shared by the block and declaration
//! parsers.
//!
//! All structural characters are ASCII, so scanning bytes and slicing at the
//! found offsets always lands on UTF-8 character boundaries.

/// Whether the byte at `index` is preceded by an odd run of backslashes.
pub(crate) fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Tracks whether the scanner is inside a single- or double-quoted string.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuoteState {
    open: Option<u8>,
}

impl QuoteState {
    /// Feed the byte at `index`. Returns `true` when that byte is part of a
    /// string literal (delimiters included) and must not be treated as
    /// structural.
    pub(crate) fn step(&mut self, bytes: &[u8], index: usize) -> bool {
        let ch = bytes[index];
        if (ch == b'\'' || ch == b'"') && !is_escaped(bytes, index) {
            match self.open {
                None => {
                    self.open = Some(ch);
                    return true;
                }
                Some(q) if q == ch => {
                    self.open = None;
                    return true;
                }
                Some(_) => {}
            }
        }
        self.open.is_some()
    }
}

/// Find the first structural occurrence of any byte in `targets` at or after
/// `from`, skipping string literals.
pub(crate) fn find_unquoted(source: &str, from: usize, targets: &[u8]) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quotes = QuoteState::default();
    (from..bytes.len()).find(|&i| !quotes.step(bytes, i) && targets.contains(&bytes[i]))
}

/// Given the offset of an opening `{`, return the offset of its matching `}`.
///
/// Returns `None` when the input ends before the block closes.
pub(crate) fn find_matching_brace(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quotes = QuoteState::default();
    let mut depth = 0usize;

    for i in open..bytes.len() {
        if quotes.step(bytes, i) {
            continue;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `/* ... */` comments outside string literals.
///
/// An unterminated comment runs to the end of the input.
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut quotes = QuoteState::default();
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !quotes.step(bytes, i) && bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            out.push_str(&source[copied..i]);
            let end = source[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
            copied = end;
            i = end;
            continue;
        }
        i += 1;
    }
    out.push_str(&source[copied..]);
    out
}
