//! RGB and HSL color representations.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An RGB color with floating-point channels in the nominal 0-255 range.
///
/// Channels are kept unrounded between transforms so chained conversions do
/// not accumulate rounding error; rounding happens only when formatting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Create a color from channel values.
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a gray with all channels set to `value`.
    #[inline]
    pub const fn gray(value: f64) -> Self {
        Self::new(value, value, value)
    }

    /// Parse a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` hex string.
    ///
    /// The leading `#` is optional. Any alpha digits are ignored.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::invalid_color(hex, "expected hexadecimal digits"));
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map(f64::from);
        let parsed = match digits.len() {
            3 | 4 => {
                let nibble = |i: usize| channel(&digits[i..=i]).map(|v| v * 17.0);
                (nibble(0), nibble(1), nibble(2))
            }
            6 | 8 => (
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
            ),
            n => {
                return Err(Error::invalid_color(
                    hex,
                    format!("expected 3, 4, 6 or 8 digits, found {n}"),
                ));
            }
        };

        match parsed {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self::new(r, g, b)),
            _ => Err(Error::invalid_color(hex, "invalid hex channel")),
        }
    }

    /// Format as a lowercase `#rrggbb` string, clamping and rounding channels.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Clamp and round each channel to an 8-bit value.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let byte = |c: f64| c.clamp(0.0, 255.0).round() as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }

    /// Perceived brightness: `0.299 R + 0.587 G + 0.114 B`.
    #[inline]
    pub fn luma(&self) -> f64 {
        (self.r * 299.0 + self.g * 587.0 + self.b * 114.0) / 1000.0
    }

    /// Whether every channel is a finite number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Convert to HSL.
    pub fn to_hsl(&self) -> Hsl {
        let r = self.r / 255.0;
        let g = self.g / 255.0;
        let b = self.b / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl::new(0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl::new(h / 6.0 * 360.0, s * 100.0, l * 100.0)
    }

    /// Scale the color so its luma equals `target`, preserving channel ratios
    /// where the 0-255 range allows.
    ///
    /// When scaling saturates a channel, the remaining headroom is pushed into
    /// a single unsaturated channel so the target luma is still approached.
    pub fn with_luma(&self, target: f64) -> Self {
        let current = self.luma();
        if current < 1e-3 {
            return Self::gray(target);
        }

        let ratio = target / current;
        let mut r = (self.r * ratio).min(255.0);
        let mut g = (self.g * ratio).min(255.0);
        let mut b = (self.b * ratio).min(255.0);

        if g == 0.0 || r == 255.0 || b == 255.0 {
            g = (target * 1000.0 - r * 299.0 - b * 114.0) / 587.0;
        } else if r == 0.0 {
            r = (target * 1000.0 - g * 587.0 - b * 114.0) / 299.0;
        } else if b == 0.0 || g == 255.0 {
            b = (target * 1000.0 - r * 299.0 - g * 587.0) / 114.0;
        }

        Self::new(r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b.clamp(0.0, 255.0))
    }

    pub const BLACK: Self = Self::gray(0.0);
    pub const WHITE: Self = Self::gray(255.0);
}

/// An HSL color. Hue in degrees `[0, 360)`, saturation and lightness in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Create a color from hue, saturation and lightness.
    #[inline]
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Return a copy with a different lightness.
    #[inline]
    pub fn with_lightness(self, l: f64) -> Self {
        Self { l, ..self }
    }

    /// Return a copy with a different saturation.
    #[inline]
    pub fn with_saturation(self, s: f64) -> Self {
        Self { s, ..self }
    }

    /// Convert to RGB. Hues outside `[0, 360)` wrap around.
    pub fn to_rgb(&self) -> Rgb {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let h = self.h.rem_euclid(360.0) / 360.0;

        if s == 0.0 {
            return Rgb::gray(l * 255.0);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Rgb::new(
            hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
            hue_to_channel(p, q, h) * 255.0,
            hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
        )
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl From<Rgb> for Hsl {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hsl()
    }
}

impl From<Hsl> for Rgb {
    fn from(hsl: Hsl) -> Self {
        hsl.to_rgb()
    }
}
