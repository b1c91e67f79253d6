//! Converter configuration.
//!
//! Every threshold used by the color policies lives here so a hosting service
//! can tune them without touching the conversion pipeline. The defaults are
//! the values the dark skins were calibrated against.
//!
//! # Example
//!
//! ```
//! use darkskin::DarkModeConfig;
//!
//! let config = DarkModeConfig::default()
//!     .with_vibrant_saturation(20.0)
//!     .with_cache_capacity(64);
//! config.validate().unwrap();
//!
//! let from_toml = DarkModeConfig::from_toml_str("min_text_offset = 70.0").unwrap();
//! assert_eq!(from_toml.min_text_offset, 70.0);
//! assert_eq!(from_toml.cache_capacity, 200);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::{Error, Result};

/// Marker prepended to converted stylesheets.
pub const DEFAULT_CONVERSION_MARKER: &str = "/* darkskin-converted */";

/// Default number of cached conversions.
pub const DEFAULT_CACHE_CAPACITY: usize = 200;

/// Thresholds and limits for dark-mode conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkModeConfig {
    /// Border/shadow colors more saturated than this (percent) are left untouched.
    pub vibrant_saturation: f64,
    /// Border/shadow colors darker than this luma are treated as decorative framing.
    pub decorative_luma: f64,
    /// Lightness window (percent) decorative colors are clamped into.
    pub decorative_lightness: (f64, f64),
    /// White threshold. Backgrounds strictly above this luma are inverted,
    /// text at or above it is kept as written.
    pub white_like_luma: f64,
    /// Maximum luma of a converted background.
    pub background_luma_cap: f64,
    /// Minimum HSL lightness of a converted background.
    pub background_lightness_floor: f64,
    /// Saturation (percent) below which a light color counts as gray.
    pub low_saturation: f64,
    /// HSL lightness above which a low-saturation background is inverted,
    /// and at or below which text on a dark background is inverted.
    pub black_white_lightness: f64,
    /// Lightness offset used when inverting white-like backgrounds.
    pub dark_background_lightness_offset: f64,
    /// Minimum luma distance between text and its background.
    pub min_text_offset: f64,
    /// Upper bound on the luma distance for text on near-black backgrounds.
    pub max_text_offset: f64,
    /// Backgrounds at or below this luma trigger the max-offset clamp.
    pub near_black_background_luma: f64,
    /// Backgrounds at or above this luma are considered light.
    pub light_background_luma: f64,
    /// Maximum luma of a converted code-block background.
    pub code_background_luma_cap: f64,
    /// Code text lighter than this (percent) is left untouched.
    pub code_text_keep_lightness: f64,
    /// Minimum lightness of converted code text.
    pub code_text_lightness_floor: f64,
    /// Background assumed for text when a rule sets none.
    pub default_background: Rgb,
    /// Maximum number of cached conversions.
    pub cache_capacity: usize,
    /// Comment prepended to converted output; its presence marks input as converted.
    pub marker: String,
}

impl Default for DarkModeConfig {
    fn default() -> Self {
        Self {
            vibrant_saturation: 15.0,
            decorative_luma: 20.0,
            decorative_lightness: (10.0, 15.0),
            white_like_luma: 250.0,
            background_luma_cap: 190.0,
            background_lightness_floor: 22.0,
            low_saturation: 10.0,
            black_white_lightness: 40.0,
            dark_background_lightness_offset: 10.0,
            min_text_offset: 65.0,
            max_text_offset: 138.0,
            near_black_background_luma: 27.0,
            light_background_luma: 100.0,
            code_background_luma_cap: 40.0,
            code_text_keep_lightness: 75.0,
            code_text_lightness_floor: 78.0,
            default_background: Rgb::gray(25.0),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            marker: DEFAULT_CONVERSION_MARKER.to_string(),
        }
    }
}

impl DarkModeConfig {
    /// Parse a (possibly partial) TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the vibrant-protection saturation threshold.
    #[must_use]
    pub fn with_vibrant_saturation(mut self, saturation: f64) -> Self {
        self.vibrant_saturation = saturation;
        self
    }

    /// Set the decorative-dark luma threshold.
    #[must_use]
    pub fn with_decorative_luma(mut self, luma: f64) -> Self {
        self.decorative_luma = luma;
        self
    }

    /// Set the minimum text/background luma distance.
    #[must_use]
    pub fn with_min_text_offset(mut self, offset: f64) -> Self {
        self.min_text_offset = offset;
        self
    }

    /// Set the background luma cap.
    #[must_use]
    pub fn with_background_luma_cap(mut self, cap: f64) -> Self {
        self.background_luma_cap = cap;
        self
    }

    /// Set the fallback background used for text contrast.
    #[must_use]
    pub fn with_default_background(mut self, background: Rgb) -> Self {
        self.default_background = background;
        self
    }

    /// Set the number of cached conversions.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the conversion marker comment.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Check that every threshold is finite and within its range.
    pub fn validate(&self) -> Result<()> {
        let percentages = [
            ("vibrant_saturation", self.vibrant_saturation),
            ("decorative_lightness.0", self.decorative_lightness.0),
            ("decorative_lightness.1", self.decorative_lightness.1),
            ("background_lightness_floor", self.background_lightness_floor),
            ("low_saturation", self.low_saturation),
            ("black_white_lightness", self.black_white_lightness),
            ("dark_background_lightness_offset", self.dark_background_lightness_offset),
            ("code_text_keep_lightness", self.code_text_keep_lightness),
            ("code_text_lightness_floor", self.code_text_lightness_floor),
        ];
        for (field, value) in percentages {
            check_range(field, value, 100.0)?;
        }

        let lumas = [
            ("decorative_luma", self.decorative_luma),
            ("white_like_luma", self.white_like_luma),
            ("background_luma_cap", self.background_luma_cap),
            ("min_text_offset", self.min_text_offset),
            ("max_text_offset", self.max_text_offset),
            ("near_black_background_luma", self.near_black_background_luma),
            ("light_background_luma", self.light_background_luma),
            ("code_background_luma_cap", self.code_background_luma_cap),
            ("default_background.r", self.default_background.r),
            ("default_background.g", self.default_background.g),
            ("default_background.b", self.default_background.b),
        ];
        for (field, value) in lumas {
            check_range(field, value, 255.0)?;
        }

        if self.decorative_lightness.0 > self.decorative_lightness.1 {
            return Err(Error::invalid_config(
                "decorative_lightness",
                "lower bound exceeds upper bound",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(Error::invalid_config("cache_capacity", "must be at least 1"));
        }
        if self.marker.trim().is_empty() {
            return Err(Error::invalid_config("marker", "must not be empty"));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=max).contains(&value) {
        return Err(Error::invalid_config(
            field,
            format!("{value} is outside 0..={max}"),
        ));
    }
    Ok(())
}
