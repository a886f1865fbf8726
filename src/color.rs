//! Color type and RGB/HSB conversion utilities
//!
//! All constructors and mutators saturate channels into `[0, 255]`.
//! HSB uses hue in degrees `[0, 360)`, saturation and brightness in `[0, 1]`.
//! Channels map to the unit range by dividing by 256, so a round trip
//! RGB -> HSB -> RGB is exact up to float rounding (at most one unit).

use std::fmt;
use std::str::FromStr;

use keyglow_device::PctRgb;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Clamp an integer channel value into `[0, 255]`.
pub fn saturate(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// RGB color, 8 bits per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue/saturation/brightness triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const GRAY: Self = Self::new(128, 128, 128);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from unbounded channel values, saturating each
    pub fn from_rgb(r: i32, g: i32, b: i32) -> Self {
        Self::new(saturate(r), saturate(g), saturate(b))
    }

    /// Create from HSB. Hue wraps; saturation and brightness are clamped.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let sat = saturation.clamp(0.0, 1.0);
        let bri = brightness.clamp(0.0, 1.0);
        let hf = hue.rem_euclid(360.0) / 60.0;
        let chroma = sat * bri;
        let sloped = chroma * (1.0 - (hf % 2.0 - 1.0).abs());

        let (r, g, b) = if (0.0..=1.0).contains(&hf) {
            (chroma, sloped, 0.0)
        } else if hf <= 2.0 {
            (sloped, chroma, 0.0)
        } else if hf <= 3.0 {
            (0.0, chroma, sloped)
        } else if hf <= 4.0 {
            (0.0, sloped, chroma)
        } else if hf <= 5.0 {
            (sloped, 0.0, chroma)
        } else if hf <= 6.0 {
            (chroma, 0.0, sloped)
        } else {
            // NaN hue
            (0.0, 0.0, 0.0)
        };

        let add = bri - chroma;
        Self::from_rgb(
            (256.0 * (r + add)) as i32,
            (256.0 * (g + add)) as i32,
            (256.0 * (b + add)) as i32,
        )
    }

    /// Convert to HSB. Zero chroma yields hue 0; black yields saturation 0.
    pub fn to_hsb(self) -> Hsb {
        let r = self.r as f32 / 256.0;
        let g = self.g as f32 / 256.0;
        let b = self.b as f32 / 256.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let saturation = if max <= 0.0 { 0.0 } else { delta / max };

        let sector = if delta == 0.0 {
            0.0
        } else if max == r {
            (g - b) / delta
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        Hsb {
            hue: (sector + 6.0) % 6.0 * 60.0,
            saturation,
            brightness: max,
        }
    }

    /// Uniformly random color
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// Random hue at the given saturation and brightness
    pub fn random_hue(rng: &mut impl Rng, saturation: f32, brightness: f32) -> Self {
        Self::from_hsb(rng.gen_range(0..360) as f32, saturation, brightness)
    }

    pub fn with_red(self, red: i32) -> Self {
        Self::from_rgb(red, self.g as i32, self.b as i32)
    }

    pub fn with_green(self, green: i32) -> Self {
        Self::from_rgb(self.r as i32, green, self.b as i32)
    }

    pub fn with_blue(self, blue: i32) -> Self {
        Self::from_rgb(self.r as i32, self.g as i32, blue)
    }

    /// Apply a projection to each RGB channel
    pub fn map_rgb(
        self,
        red: impl FnOnce(i32) -> i32,
        green: impl FnOnce(i32) -> i32,
        blue: impl FnOnce(i32) -> i32,
    ) -> Self {
        Self::from_rgb(red(self.r as i32), green(self.g as i32), blue(self.b as i32))
    }

    pub fn with_hue(self, hue: f32) -> Self {
        self.map_hsb(|_| hue, |s| s, |b| b)
    }

    pub fn with_saturation(self, saturation: f32) -> Self {
        self.map_hsb(|h| h, |_| saturation, |b| b)
    }

    pub fn with_brightness(self, brightness: f32) -> Self {
        self.map_hsb(|h| h, |s| s, |_| brightness)
    }

    pub fn map_hue(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.map_hsb(f, |s| s, |b| b)
    }

    pub fn map_saturation(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.map_hsb(|h| h, f, |b| b)
    }

    pub fn map_brightness(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.map_hsb(|h| h, |s| s, f)
    }

    /// Apply a projection to each HSB component
    pub fn map_hsb(
        self,
        hue: impl FnOnce(f32) -> f32,
        saturation: impl FnOnce(f32) -> f32,
        brightness: impl FnOnce(f32) -> f32,
    ) -> Self {
        let hsb = self.to_hsb();
        Self::from_hsb(
            hue(hsb.hue),
            saturation(hsb.saturation),
            brightness(hsb.brightness),
        )
    }

    /// Percentage channels as accepted by lighting sinks
    pub fn to_pct(self) -> PctRgb {
        PctRgb::from_rgb8(self.r, self.g, self.b)
    }

    /// Parse a color string: "#RRGGBB", "RRGGBB", "red", "gray", etc.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::new(r, g, b));
        }
        match s.to_ascii_lowercase().as_str() {
            "black" | "off" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "gray" | "grey" => Some(Self::GRAY),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::new(255, 255, 0)),
            "cyan" => Some(Self::new(0, 255, 255)),
            "magenta" | "pink" => Some(Self::new(255, 0, 255)),
            "orange" => Some(Self::new(255, 165, 0)),
            "purple" => Some(Self::new(128, 0, 255)),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid color: {s:?}"))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
