use std::fmt::{Display, Formatter};
use std::str::FromStr;

use image::Rgba;
use serde::Deserialize;

/// Color written as `#RRGGBB` or `#RRGGBBAA` in the configuration file.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct HexColor(pub Rgba<u8>);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor(Rgba([r, g, b, 255]))
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        HexColor(Rgba([r, g, b, a]))
    }

    /// Same color with the alpha channel replaced by `alpha` (0.0 - 1.0).
    pub fn with_alpha(&self, alpha: f32) -> Rgba<u8> {
        let [r, g, b, _] = self.0.0;
        Rgba([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = String::deserialize(deserializer)?;
        HexColor::from_str(&value).map_err(Error::custom)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(format!("Invalid color {}, expected #RRGGBB or #RRGGBBAA", s));
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(digits.len() / 2) {
            let pair = digits.get(i * 2..i * 2 + 2)
                .ok_or_else(|| format!("Invalid color {}", s))?;
            *channel = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("Invalid hex digits {} in color {}", pair, s))?;
        }

        Ok(HexColor(Rgba(channels)))
    }
}

impl Display for HexColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0.0;
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
