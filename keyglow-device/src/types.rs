//! Common types for the sink layer

/// Convert an 8-bit channel value to a percentage (0-100).
///
/// Integer arithmetic, truncating: `255 -> 100`, `128 -> 50`, `2 -> 0`.
pub const fn pct(value: u8) -> u8 {
    (value as u32 * 100 / 255) as u8
}

/// RGB color with each channel expressed as a percentage (0-100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PctRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PctRgb {
    pub const OFF: Self = Self { r: 0, g: 0, b: 0 };

    /// Create from percentages, clamping each channel to 100
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r.min(100),
            g: g.min(100),
            b: b.min(100),
        }
    }

    /// Create from 8-bit channel values
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: pct(r),
            g: pct(g),
            b: pct(b),
        }
    }

    /// Expand back to 8-bit channel values (as a device would drive them)
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let expand = |p: u8| (p.min(100) as u32 * 255 / 100) as u8;
        (expand(self.r), expand(self.g), expand(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_truncates() {
        assert_eq!(pct(0), 0);
        assert_eq!(pct(255), 100);
        assert_eq!(pct(128), 50);
        assert_eq!(pct(2), 0);
        assert_eq!(pct(3), 1);
        assert_eq!(pct(254), 99);
    }

    #[test]
    fn test_from_rgb8() {
        let c = PctRgb::from_rgb8(255, 128, 0);
        assert_eq!(c, PctRgb { r: 100, g: 50, b: 0 });
    }

    #[test]
    fn test_to_rgb8() {
        assert_eq!(PctRgb::new(100, 50, 0).to_rgb8(), (255, 127, 0));
        assert_eq!(PctRgb::new(200, 0, 0).to_rgb8(), (255, 0, 0));
    }
}
