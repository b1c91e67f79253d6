//! Declaration rewriting: color literal scanning and per-rule conversion.

mod rule;
mod value;

pub use rule::{DeclarationRole, transform_rule};
pub use value::{
    ColorLiteral, ColorSyntax, first_color, is_passthrough_value, parse_color_literal,
    rewrite_colors, scan_colors,
};
