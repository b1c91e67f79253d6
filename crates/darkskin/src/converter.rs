//! The conversion entry point.
//!
//! [`DarkModeConverter`] owns the thresholds and the conversion cache and
//! drives the pipeline: strip comments, parse blocks, rewrite each rule,
//! prepend the marker, memoize.
//!
//! A converter is `Send + Sync`; share one across worker threads behind an
//! `Arc` or use the process-wide instance through [`convert_css`].
//!
//! # Example
//!
//! ```
//! use darkskin::DarkModeConverter;
//!
//! let converter = DarkModeConverter::new();
//! let dark = converter.convert("body{background:#ffffff;color:#333333}");
//!
//! assert!(dark.starts_with("/* darkskin-converted */\n"));
//! assert!(dark.contains("background: #1a1a1a"));
//!
//! // Converted output is recognized and returned as-is.
//! assert_eq!(converter.convert(&dark), dark);
//! ```

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::cache::{CacheStats, ContentHash, ConversionCache};
use crate::color::{ColorPolicy, ColorTransformer, Rgb};
use crate::parser::{CssNode, parse_blocks, strip_comments};
use crate::selector::ElementType;
use crate::transform::{parse_color_literal, transform_rule};
use crate::{DarkModeConfig, Error, Result};

/// Process-wide converter behind [`convert_css`].
static GLOBAL_CONVERTER: OnceLock<DarkModeConverter> = OnceLock::new();

/// Converts light article stylesheets into dark skins.
pub struct DarkModeConverter {
    config: DarkModeConfig,
    cache: Mutex<ConversionCache>,
}

impl DarkModeConverter {
    /// Create a converter with the default thresholds.
    pub fn new() -> Self {
        Self::from_valid_config(DarkModeConfig::default())
    }

    /// Create a converter with custom thresholds.
    ///
    /// Fails if the configuration does not validate.
    pub fn with_config(config: DarkModeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: DarkModeConfig) -> Self {
        let cache = ConversionCache::new(config.cache_capacity);
        Self {
            config,
            cache: Mutex::new(cache),
        }
    }

    /// The process-wide converter, created with default thresholds on first use.
    pub fn global() -> &'static DarkModeConverter {
        GLOBAL_CONVERTER.get_or_init(DarkModeConverter::new)
    }

    /// Install a custom process-wide converter.
    ///
    /// Must run before the first call to [`global`](Self::global) or
    /// [`convert_css`]; afterwards it returns [`Error::AlreadyInitialized`].
    pub fn init_global(config: DarkModeConfig) -> Result<&'static DarkModeConverter> {
        let converter = Self::with_config(config)?;
        GLOBAL_CONVERTER
            .set(converter)
            .map_err(|_| Error::AlreadyInitialized)?;
        GLOBAL_CONVERTER.get().ok_or(Error::AlreadyInitialized)
    }

    #[inline]
    pub fn config(&self) -> &DarkModeConfig {
        &self.config
    }

    /// Convert a stylesheet to its dark skin.
    ///
    /// Input that already carries the conversion marker is returned unchanged,
    /// so `convert(convert(x)) == convert(x)`. Results are memoized by content
    /// hash. Never fails: fragments that cannot be interpreted are kept as
    /// written.
    pub fn convert(&self, css: &str) -> String {
        if css.contains(&self.config.marker) {
            tracing::debug!("stylesheet already converted, skipping");
            return css.to_string();
        }

        let key = ContentHash::of(css);
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.to_string();
        }
        tracing::debug!(%key, bytes = css.len(), "conversion cache miss");

        // The lock is released while the pipeline runs; two threads racing on
        // the same input both convert it and the second insert is ignored.
        let converted = self.convert_uncached(css);
        self.cache.lock().insert(key, converted.clone());
        converted
    }

    /// Run the conversion pipeline without consulting or filling the cache.
    ///
    /// The result carries the marker line like [`convert`](Self::convert).
    pub fn convert_uncached(&self, css: &str) -> String {
        let cleaned = strip_comments(css);
        let nodes = parse_blocks(&cleaned);

        let mut out = String::with_capacity(self.config.marker.len() + 1 + cleaned.len());
        out.push_str(&self.config.marker);
        out.push('\n');
        self.render(&nodes, &mut out);
        out
    }

    fn render(&self, nodes: &[CssNode<'_>], out: &mut String) {
        for node in nodes {
            match node {
                CssNode::Rule { selector, body } => {
                    out.push_str(&transform_rule(&self.config, selector, body));
                }
                CssNode::AtRule {
                    prelude,
                    standalone: true,
                    ..
                } => {
                    out.push_str(prelude);
                    out.push(';');
                }
                CssNode::AtRule {
                    prelude, children, ..
                } if !children.is_empty() => {
                    out.push_str(prelude);
                    out.push('{');
                    self.render(children, out);
                    out.push('}');
                }
                CssNode::AtRule {
                    prelude, raw_body, ..
                } => {
                    if raw_body.trim().is_empty() {
                        out.push_str(prelude);
                        out.push_str("{}");
                    } else {
                        out.push_str(&transform_rule(&self.config, prelude, raw_body));
                    }
                }
            }
        }
    }

    /// Convert a single color literal as if it appeared in a rule of type
    /// `element` whose background converts to `background`.
    ///
    /// Returns lowercase `#rrggbb`. Unparseable input is returned unchanged.
    pub fn convert_color(&self, literal: &str, element: ElementType, background: Rgb) -> String {
        match parse_color_literal(literal) {
            Ok(rgb) => {
                let policy = ColorPolicy::for_element(element, background);
                ColorTransformer::new(&self.config).apply(policy, rgb).to_hex()
            }
            Err(e) => {
                tracing::trace!(%e, "leaving color unchanged");
                literal.to_string()
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Drop every cached conversion.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl Default for DarkModeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DarkModeConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarkModeConverter")
            .field("marker", &self.config.marker)
            .field("cache", &*self.cache.lock())
            .finish()
    }
}

/// Convert a stylesheet with the process-wide converter.
pub fn convert_css(css: &str) -> String {
    DarkModeConverter::global().convert(css)
}

/// Convert one color literal with the process-wide converter.
pub fn convert_color(literal: &str, element: ElementType, background: Rgb) -> String {
    DarkModeConverter::global().convert_color(literal, element, background)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = crate::DEFAULT_CONVERSION_MARKER;

    fn body_of(converted: &str) -> &str {
        converted
            .strip_prefix(MARKER)
            .and_then(|rest| rest.strip_prefix('\n'))
            .expect("marker line")
    }

    #[test]
    fn converter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DarkModeConverter>();
    }

    #[test]
    fn marker_line_is_prepended() {
        let converter = DarkModeConverter::new();
        let out = converter.convert("a{color:#3366cc}");
        assert_eq!(out, format!("{MARKER}\na{{color: #3366cc}}"));
    }

    #[test]
    fn already_converted_input_is_untouched() {
        let converter = DarkModeConverter::new();
        let input = format!("{MARKER}\nh1{{color:#000}}");
        assert_eq!(converter.convert(&input), input);
        assert_eq!(converter.cache_stats().entries, 0);
    }

    #[test]
    fn idempotent() {
        let converter = DarkModeConverter::new();
        let once = converter.convert("p{color:#444;background:#fafafa}");
        assert_eq!(converter.convert(&once), once);
    }

    #[test]
    fn repeated_input_hits_cache() {
        let converter = DarkModeConverter::new();
        let css = "h1{color:#222}";
        let first = converter.convert(css);
        let second = converter.convert(css);
        assert_eq!(first, second);

        let stats = converter.cache_stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        converter.clear_cache();
        assert_eq!(converter.cache_stats().entries, 0);
    }

    #[test]
    fn uncached_conversion_leaves_cache_alone() {
        let converter = DarkModeConverter::new();
        let out = converter.convert_uncached("h1{color:#222}");
        assert_eq!(out, converter.convert("h1{color:#222}"));
        assert_eq!(converter.cache_stats().entries, 1);
    }

    #[test]
    fn comments_are_removed() {
        let converter = DarkModeConverter::new();
        let out = converter.convert("/* theme */a{/* c */color:#3366cc}");
        assert_eq!(body_of(&out), "a{color: #3366cc}");
    }

    #[test]
    fn at_rules_render() {
        let converter = DarkModeConverter::new();
        let css = "@import url(x.css);@media (max-width:600px){a{color:#3366cc}}\
                   @font-face{font-family:X}@page{}";
        let out = converter.convert(css);
        assert_eq!(
            body_of(&out),
            "@import url(x.css);@media (max-width:600px){a{color: #3366cc}}\
             @font-face{font-family: X}@page{}"
        );
    }

    #[test]
    fn nested_rules_are_converted() {
        let converter = DarkModeConverter::new();
        let out = converter.convert("@media print{body{background:#ffffff}}");
        assert_eq!(body_of(&out), "@media print{body{background: #1a1a1a}}");
    }

    #[test]
    fn unterminated_input_is_kept_as_catch_all() {
        let converter = DarkModeConverter::new();
        let out = converter.convert("a{color:#3366cc} p{margin:0");
        assert_eq!(body_of(&out), "a{color: #3366cc}*{p{margin: 0}");
    }

    #[test]
    fn empty_input() {
        let converter = DarkModeConverter::new();
        assert_eq!(converter.convert(""), format!("{MARKER}\n"));
    }

    #[test]
    fn custom_marker() {
        let config = DarkModeConfig::default().with_marker("/* night */");
        let converter = DarkModeConverter::with_config(config).unwrap();
        let out = converter.convert("a{}");
        assert_eq!(out, "/* night */\na{}");
        assert_eq!(converter.convert(&out), out);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DarkModeConfig::default().with_cache_capacity(0);
        assert!(matches!(
            DarkModeConverter::with_config(config),
            Err(Error::InvalidConfig { field: "cache_capacity", .. })
        ));
    }

    #[test]
    fn single_color_conversion() {
        let converter = DarkModeConverter::new();
        let bg = Rgb::gray(25.0);
        assert_eq!(converter.convert_color("#ffffff", ElementType::Background, bg), "#1a1a1a");
        assert_eq!(converter.convert_color("#3366cc", ElementType::Body, bg), "#3366cc");
        assert_eq!(
            converter.convert_color("#e91e63", ElementType::VibrantProtected, bg),
            "#e91e63"
        );
        assert_eq!(converter.convert_color("not-a-color", ElementType::Body, bg), "not-a-color");
    }
}
