//! Heuristic selector classification.
//!
//! Article themes are written against a small, fairly predictable markup
//! vocabulary (headings, tables, quotes, highlighted code). Classification
//! works on the raw selector text, compound and comma-joined selectors
//! included, by checking an ordered list of substring/word predicates. The
//! first matching rule wins.

use std::fmt;

/// Semantic category of a rule or declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Heading,
    Body,
    Background,
    Table,
    TableText,
    Blockquote,
    BlockquoteText,
    Code,
    CodeText,
    /// Near-black framing colors (borders, shadows).
    DecorativeDark,
    /// Saturated accents exempt from remapping.
    VibrantProtected,
    Selection,
    SelectionText,
    Other,
}

impl ElementType {
    /// Kebab-case name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Body => "body",
            Self::Background => "background",
            Self::Table => "table",
            Self::TableText => "table-text",
            Self::Blockquote => "blockquote",
            Self::BlockquoteText => "blockquote-text",
            Self::Code => "code",
            Self::CodeText => "code-text",
            Self::DecorativeDark => "decorative-dark",
            Self::VibrantProtected => "vibrant-protected",
            Self::Selection => "selection",
            Self::SelectionText => "selection-text",
            Self::Other => "other",
        }
    }

    /// The category used for foreground colors inside a rule of this type.
    pub fn text_variant(self) -> Self {
        match self {
            Self::Table => Self::TableText,
            Self::Blockquote => Self::BlockquoteText,
            Self::Selection => Self::SelectionText,
            Self::Code => Self::CodeText,
            other => other,
        }
    }

    /// The category used for background colors inside a rule of this type.
    pub fn background_variant(self) -> Self {
        match self {
            Self::Table | Self::Blockquote | Self::Selection | Self::Code => self,
            _ => Self::Background,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class-name fragment the publishing host uses for its own dark-mode hooks.
pub const HOST_MANAGED_MARKER: &str = "js_darkmode__";

/// Class names the host's table editor uses for zebra striping.
const ZEBRA_MARKERS: &[&str] = &[
    "ue-table-interlace-color-single",
    "ue-table-interlace-color-double",
];

const QUOTE_KEYWORDS: &[&str] = &["blockquote", "callout", "multiquote"];
const CODE_PREFIXES: &[&str] = &["pre", "code", "hljs", "language-"];
const TABLE_TAGS: &[&str] = &["table", "thead", "tbody", "tfoot", "tr", "th", "td"];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// One entry of the ordered classification table.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    /// Short name, used in logs and tests.
    pub name: &'static str,
    /// Predicate over the lowercased selector.
    pub matches: fn(&str) -> bool,
    /// Category returned when the predicate holds.
    pub element: ElementType,
}

/// Classification rules in precedence order.
pub const CLASSIFIER_RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "host-managed",
        matches: is_host_managed_lower,
        element: ElementType::Other,
    },
    ClassifierRule {
        name: "zebra-table",
        matches: is_zebra_table,
        element: ElementType::Table,
    },
    ClassifierRule {
        name: "blockquote",
        matches: is_quote,
        element: ElementType::Blockquote,
    },
    ClassifierRule {
        name: "code",
        matches: is_code,
        element: ElementType::Code,
    },
    ClassifierRule {
        name: "table",
        matches: is_table,
        element: ElementType::Table,
    },
    ClassifierRule {
        name: "heading",
        matches: is_heading,
        element: ElementType::Heading,
    },
    ClassifierRule {
        name: "selection",
        matches: is_selection,
        element: ElementType::Selection,
    },
    ClassifierRule {
        name: "body",
        matches: is_body,
        element: ElementType::Body,
    },
];

/// Classify a selector into an [`ElementType`].
///
/// Case-insensitive and pure. Selectors no rule recognizes are
/// [`ElementType::Other`].
pub fn classify(selector: &str) -> ElementType {
    let lower = selector.to_ascii_lowercase();
    CLASSIFIER_RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map_or(ElementType::Other, |rule| rule.element)
}

/// Whether the selector targets elements whose dark colors the host manages.
///
/// Such rules are passed through without color remapping.
pub fn is_host_managed(selector: &str) -> bool {
    is_host_managed_lower(&selector.to_ascii_lowercase())
}

fn is_host_managed_lower(s: &str) -> bool {
    s.contains(HOST_MANAGED_MARKER)
}

fn is_zebra_table(s: &str) -> bool {
    ZEBRA_MARKERS.iter().any(|m| s.contains(m))
}

fn is_quote(s: &str) -> bool {
    QUOTE_KEYWORDS.iter().any(|k| s.contains(k))
}

fn is_code(s: &str) -> bool {
    CODE_PREFIXES.iter().any(|p| contains_word_prefix(s, p))
}

fn is_table(s: &str) -> bool {
    TABLE_TAGS.iter().any(|t| contains_word(s, t))
}

fn is_heading(s: &str) -> bool {
    HEADING_TAGS.iter().any(|t| contains_word(s, t))
}

fn is_selection(s: &str) -> bool {
    s.contains("::selection")
}

fn is_body(s: &str) -> bool {
    s.contains("body")
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Start offsets of `needle` in `haystack` that begin at a word boundary.
fn word_starts<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let bytes = haystack.as_bytes();
    haystack
        .match_indices(needle)
        .map(|(i, _)| i)
        .filter(move |&i| i == 0 || !is_word_byte(bytes[i - 1]))
}

/// `needle` appears at the start of a word (`.hljs-keyword`, `pre`, `code.x`).
fn contains_word_prefix(haystack: &str, needle: &str) -> bool {
    word_starts(haystack, needle).next().is_some()
}

/// `needle` appears as a whole word (`td`, `.my-table`, but not `strong`).
fn contains_word(haystack: &str, needle: &str) -> bool {
    let bytes = haystack.as_bytes();
    word_starts(haystack, needle).any(|i| {
        let end = i + needle.len();
        end == bytes.len() || !is_word_byte(bytes[end])
    })
}
