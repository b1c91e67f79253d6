//! Lightweight CSS block parser.
//!
//! Splits a stylesheet into rules and at-rules without interpreting selectors
//! or declarations. Bodies are kept as raw text for the declaration
//! transformer. The parser never fails: an unterminated block turns the rest
//! of the input into a catch-all `*` rule so nothing is silently dropped.

use super::scan::{find_matching_brace, find_unquoted};

/// Selector given to trailing text that is not part of a complete block.
pub const CATCH_ALL_SELECTOR: &str = "*";

/// A node of the parsed stylesheet, in authoring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNode<'a> {
    /// `selector { body }`. The body is raw declaration text.
    Rule { selector: &'a str, body: &'a str },
    /// `@prelude;` or `@prelude { ... }`.
    AtRule {
        /// Everything from `@` up to the terminator, trimmed.
        prelude: &'a str,
        /// Nested rules, for grouping at-rules such as `@media`.
        children: Vec<CssNode<'a>>,
        /// Declaration text, for property-bearing at-rules such as `@font-face`.
        /// Empty when the at-rule has children.
        raw_body: &'a str,
        /// `true` for `;`-terminated at-rules such as `@import`.
        standalone: bool,
    },
}

impl CssNode<'_> {
    /// Whether this is the synthetic node produced for unterminated input.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::Rule { selector, .. } if *selector == CATCH_ALL_SELECTOR)
    }
}

/// Parse comment-free CSS into an ordered list of nodes.
pub fn parse_blocks(css: &str) -> Vec<CssNode<'_>> {
    let bytes = css.as_bytes();
    let mut nodes = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let start = pos;
        let parsed = if bytes[pos] == b'@' {
            parse_at_rule(css, start)
        } else {
            parse_rule(css, start)
        };

        match parsed {
            Some((node, next)) => {
                nodes.push(node);
                pos = next;
            }
            None => {
                let rest = css[start..].trim();
                if !rest.is_empty() {
                    tracing::warn!(
                        offset = start,
                        "unterminated CSS block, keeping remaining text as a catch-all rule"
                    );
                    nodes.push(CssNode::Rule {
                        selector: CATCH_ALL_SELECTOR,
                        body: rest,
                    });
                }
                break;
            }
        }
    }

    nodes
}

/// Parse `@prelude;` or `@prelude { ... }` starting at `start`.
///
/// Returns the node and the offset just past it, or `None` when the input
/// ends before the at-rule is terminated.
fn parse_at_rule(css: &str, start: usize) -> Option<(CssNode<'_>, usize)> {
    let end = find_unquoted(css, start, b"{;")?;
    let prelude = css[start..end].trim();

    if css.as_bytes()[end] == b';' {
        let node = CssNode::AtRule {
            prelude,
            children: Vec::new(),
            raw_body: "",
            standalone: true,
        };
        return Some((node, end + 1));
    }

    let close = find_matching_brace(css, end)?;
    let inner = &css[end + 1..close];

    // Plain declaration text (`@font-face`, `@page`) has no nested blocks.
    let node = if find_unquoted(inner, 0, b"{").is_some() {
        CssNode::AtRule {
            prelude,
            children: parse_blocks(inner),
            raw_body: "",
            standalone: false,
        }
    } else {
        CssNode::AtRule {
            prelude,
            children: Vec::new(),
            raw_body: inner,
            standalone: false,
        }
    };
    Some((node, close + 1))
}

/// Parse `selector { body }` starting at `start`.
fn parse_rule(css: &str, start: usize) -> Option<(CssNode<'_>, usize)> {
    let open = find_unquoted(css, start, b"{")?;
    let close = find_matching_brace(css, open)?;
    let node = CssNode::Rule {
        selector: css[start..open].trim(),
        body: &css[open + 1..close],
    };
    Some((node, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'a>(selector: &'a str, body: &'a str) -> CssNode<'a> {
        CssNode::Rule { selector, body }
    }

    #[test]
    fn rules_in_order() {
        let nodes = parse_blocks("h1 { color: red; }\n p{margin:0}");
        assert_eq!(nodes, [rule("h1", " color: red; "), rule("p", "margin:0")]);
    }

    #[test]
    fn standalone_at_rule() {
        let nodes = parse_blocks(r#"@import url("a;b.css"); a{b:c}"#);
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[0],
            CssNode::AtRule {
                prelude: r#"@import url("a;b.css")"#,
                children: vec![],
                raw_body: "",
                standalone: true,
            }
        );
        assert_eq!(nodes[1], rule("a", "b:c"));
    }

    #[test]
    fn grouping_at_rule_has_children() {
        let nodes =
            parse_blocks("@media (max-width: 600px) { h1 { color: #000 } p { color: #111 } }");
        let CssNode::AtRule { prelude, children, raw_body, standalone } = &nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(*prelude, "@media (max-width: 600px)");
        assert_eq!(children, &[rule("h1", " color: #000 "), rule("p", " color: #111 ")]);
        assert_eq!(*raw_body, "");
        assert!(!standalone);
    }

    #[test]
    fn declaration_at_rule_keeps_raw_body() {
        let nodes = parse_blocks("@font-face { font-family: X; src: url(x.woff) }");
        assert_eq!(
            nodes[0],
            CssNode::AtRule {
                prelude: "@font-face",
                children: vec![],
                raw_body: " font-family: X; src: url(x.woff) ",
                standalone: false,
            }
        );
    }

    #[test]
    fn braces_in_strings_are_not_structural() {
        let nodes = parse_blocks(r#"a[title="{"]::after{content:"}\"{"} b{c:d}"#);
        assert_eq!(
            nodes,
            [rule(r#"a[title="{"]::after"#, r#"content:"}\"{""#), rule("b", "c:d")]
        );
    }

    #[test]
    fn unterminated_rule_becomes_catch_all() {
        let nodes = parse_blocks("a{b:c} h1{color:red");
        assert_eq!(nodes, [rule("a", "b:c"), rule("*", "h1{color:red")]);
        assert!(nodes[1].is_catch_all());
    }

    #[test]
    fn trailing_declarations_become_catch_all() {
        let nodes = parse_blocks("a{b:c}\ncolor: #333;  ");
        assert_eq!(nodes, [rule("a", "b:c"), rule("*", "color: #333;")]);
    }

    #[test]
    fn unterminated_at_rule_becomes_catch_all() {
        let nodes = parse_blocks("@media print { a { b: c }");
        assert_eq!(nodes, [rule("*", "@media print { a { b: c }")]);
    }

    #[test]
    fn empty_input() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("  \n\t ").is_empty());
    }

    #[test]
    fn unicode_content_is_preserved() {
        let nodes = parse_blocks("h1::before{content:\"标题 → \"}");
        assert_eq!(nodes, [rule("h1::before", "content:\"标题 → \"")]);
    }
}
