//! Color literal scanning inside property values.
//!
//! Recognizes `#hex`, `rgb()`/`rgba()` and `hsl()`/`hsla()` tokens in an
//! arbitrary value, leaving the surrounding syntax (other function calls,
//! strings, `url(...)` contents) byte-for-byte intact.

use std::ops::Range;

use cssparser::{Parser, ParserInput, Token};

use crate::color::Rgb;
use crate::parser::scan::QuoteState;
use crate::{Error, Result};

/// Keywords whose values are never rewritten.
const PASSTHROUGH_KEYWORDS: &[&str] =
    &["currentcolor", "inherit", "transparent", "initial", "unset", "none"];

/// How a color literal was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSyntax {
    Hex,
    Function,
}

/// A color literal found in a property value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLiteral<'a> {
    /// Byte range of the literal within the scanned value.
    pub span: Range<usize>,
    /// Opaque color.
    pub rgb: Rgb,
    /// Alpha exactly as written: hex digits, or the fourth function argument.
    pub alpha: Option<&'a str>,
    pub syntax: ColorSyntax,
}

impl ColorLiteral<'_> {
    /// Format `rgb` in this literal's syntax, carrying the original alpha.
    ///
    /// Hex literals stay hex (`#rgb` shorthand is expanded). Functions are
    /// written in comma syntax as `rgb()` or, with alpha, `rgba()`.
    pub fn render(&self, rgb: Rgb) -> String {
        match self.syntax {
            ColorSyntax::Hex => {
                let mut hex = rgb.to_hex();
                match self.alpha {
                    Some(a) if a.len() == 1 => {
                        hex.push_str(a);
                        hex.push_str(a);
                    }
                    Some(a) => hex.push_str(a),
                    None => {}
                }
                hex
            }
            ColorSyntax::Function => {
                let (r, g, b) = rgb.to_rgb8();
                match self.alpha {
                    Some(a) => format!("rgba({r}, {g}, {b}, {a})"),
                    None => format!("rgb({r}, {g}, {b})"),
                }
            }
        }
    }
}

/// Whether a value must be left untouched (custom properties, gradients,
/// keywords).
pub fn is_passthrough_value(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.contains("var(")
        || lower.contains("gradient")
        || PASSTHROUGH_KEYWORDS.contains(&lower.as_str())
}

/// Find every color literal in `value`, in order.
///
/// Literals inside strings and `url(...)` are ignored. Literals that look
/// like colors but fail to parse (or parse to non-finite numbers) are skipped.
pub fn scan_colors(value: &str) -> Vec<ColorLiteral<'_>> {
    let bytes = value.as_bytes();
    let mut found = Vec::new();
    let mut quotes = QuoteState::default();
    let mut i = 0;

    while i < bytes.len() {
        if quotes.step(bytes, i) {
            i += 1;
            continue;
        }

        if bytes[i] == b'#' {
            let end = hex_run_end(bytes, i + 1);
            if let Some(literal) = hex_literal(value, i, end) {
                found.push(literal);
            }
            i = end;
            continue;
        }

        if is_ident_start(bytes[i]) && (i == 0 || !is_ident_byte(bytes[i - 1])) {
            let name_end = ident_end(bytes, i);
            if bytes.get(name_end) == Some(&b'(')
                && let Some(close) = matching_paren(value, name_end)
            {
                let name = value[i..name_end].to_ascii_lowercase();
                let args = &value[name_end + 1..close];
                match name.as_str() {
                    "rgb" | "rgba" | "hsl" | "hsla" => {
                        match parse_function(&name, args) {
                            Ok((rgb, alpha)) => found.push(ColorLiteral {
                                span: i..close + 1,
                                rgb,
                                alpha,
                                syntax: ColorSyntax::Function,
                            }),
                            Err(e) => tracing::trace!(%e, "leaving color function unchanged"),
                        }
                        i = close + 1;
                        continue;
                    }
                    "url" => {
                        i = close + 1;
                        continue;
                    }
                    _ => {}
                }
            }
            i = name_end;
            continue;
        }

        i += 1;
    }

    found
}

/// The first color literal in `value`, if any.
pub fn first_color(value: &str) -> Option<Rgb> {
    scan_colors(value).first().map(|literal| literal.rgb)
}

/// Replace every color literal in `value` with `map(color)`.
pub fn rewrite_colors(value: &str, mut map: impl FnMut(Rgb) -> Rgb) -> String {
    let mut out = String::with_capacity(value.len());
    let mut copied = 0;
    for literal in scan_colors(value) {
        out.push_str(&value[copied..literal.span.start]);
        out.push_str(&literal.render(map(literal.rgb)));
        copied = literal.span.end;
    }
    out.push_str(&value[copied..]);
    out
}

/// Parse a single color literal (`#hex`, `rgb[a]()` or `hsl[a]()`).
pub fn parse_color_literal(literal: &str) -> Result<Rgb> {
    let literal = literal.trim();
    if literal.starts_with('#') {
        return Rgb::from_hex(literal);
    }

    let open = literal
        .find('(')
        .ok_or_else(|| Error::invalid_color(literal, "expected '#' or a color function"))?;
    let args = literal[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| Error::invalid_color(literal, "missing closing parenthesis"))?;
    let name = literal[..open].trim().to_ascii_lowercase();
    match name.as_str() {
        "rgb" | "rgba" | "hsl" | "hsla" => parse_function(&name, args).map(|(rgb, _)| rgb),
        _ => Err(Error::invalid_color(literal, format!("unsupported function '{name}'"))),
    }
}

/// A numeric color-function argument.
#[derive(Debug, Clone, Copy)]
enum Component {
    Number(f64),
    /// Unit value, `50%` is `0.5`.
    Percentage(f64),
}

impl Component {
    fn as_rgb_channel(self) -> f64 {
        match self {
            Self::Number(n) => n,
            Self::Percentage(p) => p * 255.0,
        }
    }

    fn as_percent(self) -> f64 {
        match self {
            Self::Number(n) => n,
            Self::Percentage(p) => p * 100.0,
        }
    }

    fn is_finite(self) -> bool {
        match self {
            Self::Number(v) | Self::Percentage(v) => v.is_finite(),
        }
    }
}

/// Parse the arguments of a color function.
///
/// Accepts both comma syntax (`rgb(1, 2, 3, .5)`) and space syntax
/// (`rgb(1 2 3 / .5)`). Returns the opaque color and the alpha argument as
/// written.
fn parse_function<'a>(name: &str, args: &'a str) -> Result<(Rgb, Option<&'a str>)> {
    let mut input = ParserInput::new(args);
    let mut parser = Parser::new(&mut input);
    let mut components = Vec::with_capacity(4);
    let mut alpha = None;

    loop {
        let start = parser.position();
        let token = match parser.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let component = match token {
            Token::Comma | Token::Delim('/') => continue,
            Token::Number { value, .. } => Component::Number(f64::from(value)),
            Token::Percentage { unit_value, .. } => Component::Percentage(f64::from(unit_value)),
            Token::Dimension { value, ref unit, .. } if unit.eq_ignore_ascii_case("deg") => {
                Component::Number(f64::from(value))
            }
            other => {
                return Err(Error::invalid_color(
                    args,
                    format!("unexpected token {other:?} in {name}()"),
                ));
            }
        };
        if !component.is_finite() {
            return Err(Error::invalid_color(args, format!("non-finite argument to {name}()")));
        }

        if components.len() == 3 {
            if alpha.is_some() {
                return Err(Error::invalid_color(args, format!("too many arguments to {name}()")));
            }
            alpha = Some(parser.slice_from(start).trim());
        } else {
            components.push(component);
        }
    }

    let [a, b, c] = components[..] else {
        return Err(Error::invalid_color(args, format!("{name}() needs three channels")));
    };

    let rgb = if name.starts_with("rgb") {
        Rgb::new(a.as_rgb_channel(), b.as_rgb_channel(), c.as_rgb_channel())
    } else {
        let Component::Number(hue) = a else {
            return Err(Error::invalid_color(args, "hue must be a number or angle"));
        };
        crate::color::Hsl::new(hue, b.as_percent(), c.as_percent()).to_rgb()
    };

    if !rgb.is_finite() {
        return Err(Error::invalid_color(args, "non-finite channel value"));
    }
    Ok((rgb, alpha))
}

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'-'
}

#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    (start..bytes.len())
        .find(|&i| !is_ident_byte(bytes[i]))
        .unwrap_or(bytes.len())
}

fn hex_run_end(bytes: &[u8], start: usize) -> usize {
    (start..bytes.len())
        .find(|&i| !bytes[i].is_ascii_hexdigit())
        .unwrap_or(bytes.len())
}

/// Build a hex literal from `#` at `hash` and digits up to `end`.
fn hex_literal(value: &str, hash: usize, end: usize) -> Option<ColorLiteral<'_>> {
    let bytes = value.as_bytes();
    if bytes.get(end).is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let digits = &value[hash + 1..end];
    let alpha = match digits.len() {
        3 | 6 => None,
        4 => Some(&digits[3..]),
        8 => Some(&digits[6..]),
        _ => return None,
    };
    let rgb = Rgb::from_hex(digits).ok()?;
    Some(ColorLiteral {
        span: hash..end,
        rgb,
        alpha,
        syntax: ColorSyntax::Hex,
    })
}

/// Offset of the `)` matching the `(` at `open`, skipping strings.
fn matching_paren(value: &str, open: usize) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut quotes = QuoteState::default();
    let mut depth = 0usize;
    for i in open..bytes.len() {
        if quotes.step(bytes, i) {
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invert(rgb: Rgb) -> Rgb {
        Rgb::new(255.0 - rgb.r, 255.0 - rgb.g, 255.0 - rgb.b)
    }

    #[test]
    fn finds_hex_literals() {
        let found = scan_colors("1px solid #ABC");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 10..14);
        assert_eq!(found[0].rgb, Rgb::new(170.0, 187.0, 204.0));
        assert_eq!(found[0].alpha, None);
    }

    #[test]
    fn hex_needs_valid_length_and_boundary() {
        assert!(scan_colors("#12345").is_empty());
        assert!(scan_colors("#abcdefg").is_empty());
        assert!(scan_colors("#1234567890").is_empty());
        assert_eq!(scan_colors("#fff,#000").len(), 2);
    }

    #[test]
    fn hex_alpha_is_carried() {
        assert_eq!(rewrite_colors("#00000080", invert), "#ffffff80");
        assert_eq!(rewrite_colors("#0008", invert), "#ffffff88");
        assert_eq!(rewrite_colors("#000", invert), "#ffffff");
    }

    #[test]
    fn functions_are_rewritten() {
        assert_eq!(rewrite_colors("rgb(0, 0, 0)", invert), "rgb(255, 255, 255)");
        assert_eq!(
            rewrite_colors("0 1px 2px RGBA(0,0,0,.15)", invert),
            "0 1px 2px rgba(255, 255, 255, .15)"
        );
        assert_eq!(
            rewrite_colors("rgb(0 0 0 / 50%)", invert),
            "rgba(255, 255, 255, 50%)"
        );
        assert_eq!(rewrite_colors("hsl(0, 0%, 0%)", invert), "rgb(255, 255, 255)");
        assert_eq!(
            rewrite_colors("hsla(120deg 100% 25% / 0.3)", |c| c),
            "rgba(0, 128, 0, 0.3)"
        );
    }

    #[test]
    fn percentages_in_rgb() {
        assert_eq!(parse_color_literal("rgb(100%, 0%, 50%)").unwrap(), Rgb::new(255.0, 0.0, 127.5));
    }

    #[test]
    fn multiple_literals_keep_surrounding_text() {
        let value = "0 0 1px #000, inset 0 0 2px rgb(0,0,0) !important";
        assert_eq!(
            rewrite_colors(value, invert),
            "0 0 1px #ffffff, inset 0 0 2px rgb(255, 255, 255) !important"
        );
    }

    #[test]
    fn strings_and_urls_are_skipped() {
        assert!(scan_colors(r##"url(#fff) "#000" url("rgb(0,0,0)")"##).is_empty());
        assert!(scan_colors("url(img.png#aaa)").is_empty());
    }

    #[test]
    fn identifiers_containing_function_names_are_ignored() {
        assert!(scan_colors("my-rgb(1,2,3)").is_empty());
        assert_eq!(scan_colors("drop-shadow(0 0 2px #333)").len(), 1);
    }

    #[test]
    fn malformed_functions_are_left_alone() {
        assert!(scan_colors("rgb(1, 2)").is_empty());
        assert!(scan_colors("rgb(a, b, c)").is_empty());
        assert!(scan_colors("rgb(1, 2, 3").is_empty());
        assert_eq!(rewrite_colors("rgb(1, 2)", invert), "rgb(1, 2)");
    }

    #[test]
    fn non_finite_arguments_are_left_alone() {
        for literal in ["rgb(1e999,0,0)", "hsl(1e999,50%,50%)", "hsl(0, 1e999%, 50%)"] {
            assert!(scan_colors(literal).is_empty(), "{literal}");
            assert!(parse_color_literal(literal).is_err(), "{literal}");
            let value = format!("1px solid {literal}");
            assert_eq!(rewrite_colors(&value, invert), value);
        }
    }

    #[test]
    fn first_color_in_shorthand() {
        assert_eq!(
            first_color("url(a.png) no-repeat #ff0000"),
            Some(Rgb::new(255.0, 0.0, 0.0))
        );
        assert_eq!(first_color("none"), None);
    }

    #[test]
    fn passthrough_values() {
        assert!(is_passthrough_value("var(--accent)"));
        assert!(is_passthrough_value("linear-gradient(#fff, #000)"));
        assert!(is_passthrough_value(" Transparent "));
        assert!(is_passthrough_value("currentColor"));
        assert!(!is_passthrough_value("1px solid none-ish #000"));
        assert!(!is_passthrough_value("#fff"));
    }

    #[test]
    fn parse_color_errors() {
        assert!(parse_color_literal("red").is_err());
        assert!(parse_color_literal("lab(1 2 3)").is_err());
        assert!(parse_color_literal("rgb(1, 2, 3").is_err());
        assert!(parse_color_literal("hsl(10%, 50%, 50%)").is_err());
        assert!(parse_color_literal("rgba(1, 2, 3, 0.5, 9)").is_err());
    }
}
