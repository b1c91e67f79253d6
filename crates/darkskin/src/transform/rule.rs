//! Per-rule declaration rewriting.

use crate::DarkModeConfig;
use crate::color::{ColorPolicy, ColorTransformer, Rgb};
use crate::parser::{Declaration, parse_declarations};
use crate::selector::{ElementType, classify, is_host_managed};

use super::value::{ColorSyntax, first_color, is_passthrough_value, rewrite_colors, scan_colors};

/// Text-role property names.
const TEXT_PROPERTIES: &[&str] = &[
    "color",
    "-webkit-text-stroke",
    "-webkit-text-fill-color",
    "text-decoration-color",
    "text-emphasis-color",
];

/// Name fragments of border and shadow properties.
const FRAME_FRAGMENTS: &[&str] = &["shadow", "border", "outline", "column-rule"];

/// Values that never receive an image overlay.
const OVERLAY_SKIP_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "none"];

/// How a declaration's colors relate to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationRole {
    Background,
    Text,
    /// Borders, outlines and shadows.
    Frame,
    Other,
}

impl DeclarationRole {
    /// Role of a lowercased property name.
    pub fn of(name: &str) -> Self {
        if name.contains("background") || name.contains("bgcolor") {
            Self::Background
        } else if TEXT_PROPERTIES.contains(&name) {
            Self::Text
        } else if FRAME_FRAGMENTS.iter().any(|f| name.contains(f)) {
            Self::Frame
        } else {
            Self::Other
        }
    }
}

/// A declaration on its way to the output.
#[derive(Debug)]
struct Rewritten<'a> {
    name: &'a str,
    lower_name: String,
    value: String,
}

/// Convert one rule body and serialize it as `selector{name: value;...}`.
///
/// Declarations without a colon are dropped. Rules aimed at host-managed
/// elements keep their values verbatim but are still reordered.
pub fn transform_rule(config: &DarkModeConfig, selector: &str, body: &str) -> String {
    let declarations = parse_declarations(body);

    if is_host_managed(selector) {
        let mut verbatim = declarations
            .iter()
            .map(|d| Rewritten {
                name: d.name,
                lower_name: d.name.to_ascii_lowercase(),
                value: d.value.to_string(),
            })
            .collect::<Vec<_>>();
        reorder(&mut verbatim);
        return serialize(selector, &verbatim);
    }

    let transformer = ColorTransformer::new(config);
    let base = classify(selector);
    let reference = reference_background(&transformer, &declarations);
    let background = reference.unwrap_or(config.default_background);

    let mut rewritten: Vec<Rewritten<'_>> = declarations
        .iter()
        .map(|d| {
            let lower_name = d.name.to_ascii_lowercase();
            let value = rewrite_value(&transformer, base, &lower_name, d.value, background);
            Rewritten {
                name: d.name,
                lower_name,
                value,
            }
        })
        .collect();

    if let Some(reference) = reference {
        inject_overlay(&mut rewritten, reference);
    }

    reorder(&mut rewritten);
    serialize(selector, &rewritten)
}

/// The converted solid background of the rule, if it declares one.
///
/// The last `background-color` or non-gradient `background` whose first color
/// is hex or `rgb[a]()` wins, matching the cascade.
fn reference_background(
    transformer: &ColorTransformer<'_>,
    declarations: &[Declaration<'_>],
) -> Option<Rgb> {
    declarations
        .iter()
        .filter(|d| {
            d.name.eq_ignore_ascii_case("background")
                || d.name.eq_ignore_ascii_case("background-color")
        })
        .filter(|d| !is_passthrough_value(d.value))
        .filter_map(|d| solid_color(d.value))
        .last()
        .map(|rgb| transformer.apply(ColorPolicy::Background, rgb))
}

/// The first color of `value` when it is written as hex or `rgb[a]()`.
fn solid_color(value: &str) -> Option<Rgb> {
    let literal = scan_colors(value).into_iter().next()?;
    let is_solid = match literal.syntax {
        ColorSyntax::Hex => true,
        ColorSyntax::Function => value[literal.span.clone()]
            .get(..3)
            .is_some_and(|name| name.eq_ignore_ascii_case("rgb")),
    };
    is_solid.then_some(literal.rgb)
}

/// Pick the policy for one declaration and rewrite its color literals.
fn rewrite_value(
    transformer: &ColorTransformer<'_>,
    base: ElementType,
    lower_name: &str,
    value: &str,
    background: Rgb,
) -> String {
    if is_passthrough_value(value) {
        return value.to_string();
    }

    let config = transformer.config();
    let element = match DeclarationRole::of(lower_name) {
        DeclarationRole::Background => base.background_variant(),
        DeclarationRole::Text | DeclarationRole::Other => base.text_variant(),
        DeclarationRole::Frame => match first_color(value) {
            Some(color) if color.luma() < config.decorative_luma => {
                ElementType::DecorativeDark
            }
            Some(color) if color.to_hsl().s > config.vibrant_saturation => {
                ElementType::VibrantProtected
            }
            _ => base.text_variant(),
        },
    };

    let policy = ColorPolicy::for_element(element, background);
    if policy.is_identity() {
        return value.to_string();
    }
    rewrite_colors(value, |rgb| transformer.apply(policy, rgb))
}

/// Cover light background images with a flat layer of the reference color.
///
/// Sibling `background-position` and `background-size` get a matching extra
/// layer so the overlay spans the whole element.
fn inject_overlay(declarations: &mut [Rewritten<'_>], reference: Rgb) {
    let hex = reference.to_hex();
    let overlay = format!("linear-gradient({hex}, {hex})");
    let mut injected = false;

    for d in declarations.iter_mut() {
        let is_image_property = d.lower_name == "background" || d.lower_name == "background-image";
        if is_image_property && wants_overlay(&d.value) {
            d.value = append_layer(&d.value, &overlay);
            injected = true;
        }
    }
    if !injected {
        return;
    }

    for d in declarations.iter_mut() {
        if is_overlay_keyword(&d.value) {
            continue;
        }
        match d.lower_name.as_str() {
            "background-position" => d.value = append_layer(&d.value, "top left"),
            "background-size" => d.value = append_layer(&d.value, "100%"),
            _ => {}
        }
    }
}

fn wants_overlay(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains("url(") && !lower.contains("gradient") && !is_overlay_keyword(value)
}

fn is_overlay_keyword(value: &str) -> bool {
    let trimmed = value.trim();
    OVERLAY_SKIP_KEYWORDS.iter().any(|k| trimmed.eq_ignore_ascii_case(k))
}

/// Append `, layer` to a value, keeping any `!important` at the end.
fn append_layer(value: &str, layer: &str) -> String {
    match find_important(value) {
        Some(at) => format!("{}, {layer} !important", value[..at].trim_end()),
        None => format!("{value}, {layer}"),
    }
}

/// Byte offset of a trailing `!important` flag.
fn find_important(value: &str) -> Option<usize> {
    let at = value.rfind('!')?;
    value[at + 1..]
        .trim_start()
        .eq_ignore_ascii_case("important")
        .then_some(at)
}

/// Stable ordering: `-webkit-text-*` first, bare `color` last, images after
/// sibling color properties.
fn reorder(declarations: &mut [Rewritten<'_>]) {
    let has_color = declarations.iter().any(|d| d.lower_name.contains("color"));
    declarations.sort_by_key(|d| {
        if d.lower_name.starts_with("-webkit-text") {
            0
        } else if d.lower_name == "color" {
            3
        } else if has_color && d.lower_name.contains("image") {
            2
        } else {
            1
        }
    });
}

fn serialize(selector: &str, declarations: &[Rewritten<'_>]) -> String {
    let body = declarations
        .iter()
        .map(|d| format!("{}: {}", d.name, d.value))
        .collect::<Vec<_>>()
        .join(";");
    format!("{selector}{{{body}}}")
}
