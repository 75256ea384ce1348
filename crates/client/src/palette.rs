//! Injected color table.
//!
//! One base color per player id nibble, with derived "dark" and "darker"
//! variants (lightness reduced by 20 and 50 percentage points). Nothing here
//! is process-global; the palette is built from [`Config`](crate::Config) and
//! owned by the view.

use rand::Rng;

use crate::error::ViewError;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string.
    pub fn from_hex(hex: &str) -> Result<Self, ViewError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ViewError::InvalidColor(hex.to_string()));
        }
        let parse = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| ViewError::InvalidColor(hex.to_string()))
        };
        Ok(Self {
            r: parse(&digits[0..2])?,
            g: parse(&digits[2..4])?,
            b: parse(&digits[4..6])?,
        })
    }

    /// Reduce HSL lightness by `amount` percentage points.
    pub fn darken(self, amount: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l - amount / 100.0).clamp(0.0, 1.0))
    }

    /// Linear blend toward `other` with `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
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
        } / 6.0;
        (h, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self::new(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f32| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round() as u8
        };
        Self::new(
            channel(h + 1.0 / 3.0),
            channel(h),
            channel(h - 1.0 / 3.0),
        )
    }
}

/// Number of colors a palette must carry (one per nibble value).
pub const PALETTE_LEN: usize = 16;

/// The three brightness tiers derived from the configured base colors.
#[derive(Debug, Clone)]
pub struct Palette {
    light: Vec<Rgb>,
    dark: Vec<Rgb>,
    darker: Vec<Rgb>,
}

impl Palette {
    /// Build a palette from 16 base hex colors.
    pub fn from_hex_list(colors: &[String]) -> Result<Self, ViewError> {
        if colors.len() != PALETTE_LEN {
            return Err(ViewError::PaletteSize {
                expected: PALETTE_LEN,
                actual: colors.len(),
            });
        }
        let light = colors
            .iter()
            .map(|c| Rgb::from_hex(c))
            .collect::<Result<Vec<_>, _>>()?;
        let dark = light.iter().map(|c| c.darken(20.0)).collect();
        let darker = light.iter().map(|c| c.darken(50.0)).collect();
        Ok(Self {
            light,
            dark,
            darker,
        })
    }

    /// Base tile color for a nibble value.
    pub fn light(&self, id: u8) -> Rgb {
        self.light[id as usize & 0x0F]
    }

    /// Head/button color for a nibble value.
    pub fn dark(&self, id: u8) -> Rgb {
        self.dark[id as usize & 0x0F]
    }

    /// Label color for a nibble value.
    pub fn darker(&self, id: u8) -> Rgb {
        self.darker[id as usize & 0x0F]
    }

    /// Random (light, dark) pair from the player color range, for loading
    /// screen accents before an identity is assigned.
    pub fn random_accent(&self) -> (Rgb, Rgb) {
        let id = rand::rng().random_range(1..=14u8);
        (self.light(id), self.dark(id))
    }
}
