//! Brightness remapping policies.
//!
//! Each policy maps a light-theme color to its dark-skin counterpart. Policies
//! only look at the color itself, plus the rule's background for text.

use crate::DarkModeConfig;
use crate::selector::ElementType;

use super::{Hsl, Rgb};

/// Lightness pivot used to invert text lightness (`L' = 90 - L`).
const LIGHTNESS_PIVOT: f64 = 90.0;

/// A concrete color transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPolicy {
    /// Page and container backgrounds.
    Background,
    /// Code block backgrounds, darker than the page.
    CodeBackground,
    /// Foreground text, kept legible against `background`.
    Text { background: Rgb },
    /// Syntax-highlighted code text.
    CodeText,
    /// Near-black borders and shadows.
    DecorativeDark,
    /// Saturated accents. The color is left untouched.
    VibrantProtected,
}

impl ColorPolicy {
    /// The policy used for a color whose element type is already resolved.
    ///
    /// `background` is the rule's contrast reference for text-like types.
    pub fn for_element(element: ElementType, background: Rgb) -> Self {
        match element {
            ElementType::Code => Self::CodeBackground,
            ElementType::Background
            | ElementType::Table
            | ElementType::Blockquote
            | ElementType::Selection => Self::Background,
            ElementType::DecorativeDark => Self::DecorativeDark,
            ElementType::VibrantProtected => Self::VibrantProtected,
            ElementType::CodeText => Self::CodeText,
            ElementType::Heading
            | ElementType::Body
            | ElementType::TableText
            | ElementType::BlockquoteText
            | ElementType::SelectionText
            | ElementType::Other => Self::Text { background },
        }
    }

    /// Whether this policy leaves every color unchanged.
    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::VibrantProtected)
    }
}

/// Applies [`ColorPolicy`] transforms under a given configuration.
#[derive(Debug, Clone, Copy)]
pub struct ColorTransformer<'a> {
    config: &'a DarkModeConfig,
}

impl<'a> ColorTransformer<'a> {
    /// Create a transformer over the given thresholds.
    pub fn new(config: &'a DarkModeConfig) -> Self {
        Self { config }
    }

    /// The thresholds this transformer applies.
    #[inline]
    pub fn config(&self) -> &'a DarkModeConfig {
        self.config
    }

    /// Transform `rgb` under `policy`.
    pub fn apply(&self, policy: ColorPolicy, rgb: Rgb) -> Rgb {
        let hsl = rgb.to_hsl();
        match policy {
            ColorPolicy::Background => self.background(rgb, hsl),
            ColorPolicy::CodeBackground => self.code_background(rgb, hsl),
            ColorPolicy::Text { background } => self.text(rgb, hsl, background),
            ColorPolicy::CodeText => self.code_text(rgb, hsl),
            ColorPolicy::DecorativeDark => self.decorative_dark(hsl),
            ColorPolicy::VibrantProtected => rgb,
        }
    }

    /// Whether a light color should be flipped to near-black outright.
    fn is_white_like(&self, luma: f64, hsl: Hsl) -> bool {
        let c = self.config;
        luma > c.white_like_luma || (hsl.s < c.low_saturation && hsl.l > c.black_white_lightness)
    }

    /// Invert a white-like color's lightness into the near-black range.
    fn invert_to_dark(&self, hsl: Hsl) -> Rgb {
        let l = (100.0 + self.config.dark_background_lightness_offset - hsl.l).min(100.0);
        Hsl::new(0.0, 0.0, l).to_rgb()
    }

    /// Background policy: invert white-likes, cap bright colors, lift near-blacks.
    pub fn background(&self, rgb: Rgb, hsl: Hsl) -> Rgb {
        let c = self.config;
        let luma = rgb.luma();

        if self.is_white_like(luma, hsl) {
            self.invert_to_dark(hsl)
        } else if luma > c.background_luma_cap {
            rgb.with_luma(c.background_luma_cap)
        } else if hsl.l < c.background_lightness_floor {
            hsl.with_lightness(c.background_lightness_floor).to_rgb()
        } else {
            rgb
        }
    }

    /// Code background policy: like [`background`](Self::background) but
    /// capped much darker.
    pub fn code_background(&self, rgb: Rgb, hsl: Hsl) -> Rgb {
        let c = self.config;
        let luma = rgb.luma();

        if self.is_white_like(luma, hsl) {
            self.invert_to_dark(hsl)
        } else if luma > c.code_background_luma_cap {
            rgb.with_luma(c.code_background_luma_cap)
        } else {
            rgb
        }
    }

    /// Text policy: guarantee a minimum luma distance from `background`.
    ///
    /// Explicit whites are kept. Text that is far too bright for a near-black
    /// background is dimmed to the maximum offset.
    pub fn text(&self, rgb: Rgb, hsl: Hsl, background: Rgb) -> Rgb {
        let c = self.config;
        let bg_luma = background.luma();

        if let Some(settled) = self.settled_text(rgb, bg_luma) {
            return settled;
        }

        let invert = if bg_luma >= c.light_background_luma {
            hsl.l > LIGHTNESS_PIVOT - c.black_white_lightness
        } else {
            hsl.l <= c.black_white_lightness
        };
        if !invert {
            return self.push_text(rgb, bg_luma);
        }

        // Lightness is inverted at most once.
        let inverted = hsl.with_lightness(LIGHTNESS_PIVOT - hsl.l).to_rgb();
        self.settled_text(inverted, bg_luma)
            .unwrap_or_else(|| self.push_text(inverted, bg_luma))
    }

    /// Text that needs no contrast correction, or only the near-black dimming.
    fn settled_text(&self, rgb: Rgb, bg_luma: f64) -> Option<Rgb> {
        let c = self.config;
        let text_luma = rgb.luma();
        let offset = (bg_luma - text_luma).abs();

        if text_luma >= c.white_like_luma {
            Some(rgb)
        } else if offset > c.max_text_offset && bg_luma <= c.near_black_background_luma {
            Some(rgb.with_luma(c.max_text_offset + bg_luma))
        } else if offset >= c.min_text_offset {
            Some(rgb)
        } else {
            None
        }
    }

    /// Move text luma away from the background by the minimum offset.
    fn push_text(&self, rgb: Rgb, bg_luma: f64) -> Rgb {
        let c = self.config;
        let target = if bg_luma >= c.light_background_luma {
            bg_luma - c.min_text_offset
        } else {
            bg_luma + c.min_text_offset
        };
        rgb.with_luma(c.max_text_offset.min(target))
    }

    /// Code text policy: lift dark syntax colors and boost their saturation.
    pub fn code_text(&self, rgb: Rgb, hsl: Hsl) -> Rgb {
        let c = self.config;
        if hsl.l > c.code_text_keep_lightness {
            return rgb;
        }
        hsl.with_saturation((hsl.s * 1.1 + 5.0).min(100.0))
            .with_lightness(hsl.l.max(c.code_text_lightness_floor))
            .to_rgb()
    }

    /// Decorative-dark policy: halve saturation and pin lightness near black.
    pub fn decorative_dark(&self, hsl: Hsl) -> Rgb {
        let (min, max) = self.config.decorative_lightness;
        Hsl::new(hsl.h, hsl.s * 0.5, hsl.l.clamp(min, max)).to_rgb()
    }
}
