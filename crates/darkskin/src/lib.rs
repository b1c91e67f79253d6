//! Dark-mode skins for article stylesheets.
//!
//! Publishing hosts that cannot evaluate `prefers-color-scheme` need the dark
//! variant of a theme precomputed. This crate converts a light stylesheet into
//! that variant:
//!
//! - **Block parsing**: a lightweight, string- and escape-aware splitter for
//!   rules and at-rules that never fails on malformed input
//! - **Selector classification**: heuristic mapping of selectors to element
//!   categories (headings, tables, quotes, code)
//! - **Color policies**: luma- and HSL-based remapping that keeps text legible
//!   against its converted background
//! - **Memoization**: a bounded FIFO cache and an idempotence marker
//!
//! # Example
//!
//! ```
//! use darkskin::prelude::*;
//!
//! let dark = convert_css("#wemd h1{color:#222222;background:#ffffff}");
//! assert!(dark.contains("background: #1a1a1a"));
//!
//! // Converting twice is a no-op.
//! assert_eq!(convert_css(&dark), dark);
//! ```

pub mod cache;
pub mod color;
pub mod config;
pub mod converter;
pub mod parser;
pub mod selector;
pub mod transform;

mod error;

pub use cache::{CacheStats, ContentHash, ConversionCache};
pub use config::{DEFAULT_CACHE_CAPACITY, DEFAULT_CONVERSION_MARKER, DarkModeConfig};
pub use converter::{DarkModeConverter, convert_color, convert_css};
pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::color::{ColorPolicy, ColorTransformer, Hsl, Rgb};
    pub use crate::config::DarkModeConfig;
    pub use crate::converter::{DarkModeConverter, convert_color, convert_css};
    pub use crate::selector::{ElementType, classify};
    pub use crate::transform::parse_color_literal;
}
