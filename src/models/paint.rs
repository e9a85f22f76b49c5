use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit sRGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Format as `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse the catalog's `"R,G,B"` text form
    pub fn parse_csv(text: &str) -> Option<Self> {
        let mut parts = text.split(',').map(|s| s.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(r, g, b))
    }

    pub fn to_csv(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A catalog paint. Owned by the catalog, only borrowed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    pub id: String,
    pub name: String,
    pub rgb: Rgb,
    pub hex: String,
    pub series_id: String,
    /// Display name of the series, when the catalog knows it
    #[serde(default)]
    pub series_name: Option<String>,
    pub buy_link: Option<String>,
}

impl Paint {
    /// Build a paint whose hex is derived from its RGB
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rgb: Rgb,
        series_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hex: rgb.to_hex(),
            rgb,
            series_id: series_id.into(),
            series_name: None,
            buy_link: None,
        }
    }

    pub fn with_series_name(mut self, name: impl Into<String>) -> Self {
        self.series_name = Some(name.into());
        self
    }

    pub fn with_buy_link(mut self, link: impl Into<String>) -> Self {
        self.buy_link = Some(link.into());
        self
    }
}

/// The colour a caller wants to match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColor(Rgb);

impl TargetColor {
    pub const fn new(rgb: Rgb) -> Self {
        Self(rgb)
    }

    /// Validate untyped channel values, e.g. numbers straight off a JSON body.
    /// Each channel must be a finite integer in `[0, 255]`.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Result<Self, MatchError> {
        let check = |name: &str, v: f64| -> Result<u8, MatchError> {
            if !v.is_finite() || v.fract() != 0.0 || !(0.0..=255.0).contains(&v) {
                return Err(MatchError::InvalidInput(format!(
                    "channel {name} must be an integer in 0..=255, got {v}"
                )));
            }
            Ok(v as u8)
        };
        Ok(Self(Rgb::new(check("r", r)?, check("g", g)?, check("b", b)?)))
    }

    pub fn rgb(&self) -> Rgb {
        self.0
    }
}

impl From<Rgb> for TargetColor {
    fn from(rgb: Rgb) -> Self {
        Self(rgb)
    }
}

/// One paint and its ratio weight within a mix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixIngredient<'a> {
    pub paint: &'a Paint,
    pub parts: u32,
}

/// A scored mix suggestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixCandidate<'a> {
    pub ingredients: Vec<MixIngredient<'a>>,
    pub result_rgb: Rgb,
    pub distance: f64,
    pub match_percentage: f64,
}

impl MixCandidate<'_> {
    pub fn result_hex(&self) -> String {
        self.result_rgb.to_hex()
    }

    pub fn match_percent_rounded(&self) -> u8 {
        round_percentage(self.match_percentage)
    }

    pub fn is_single(&self) -> bool {
        self.ingredients.len() == 1
    }
}

/// A catalog paint ranked by distance to the target, no mixing involved
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch<'a> {
    pub paint: &'a Paint,
    pub distance: f64,
    pub match_percentage: f64,
}

impl RankedMatch<'_> {
    pub fn match_percent_rounded(&self) -> u8 {
        round_percentage(self.match_percentage)
    }
}

fn round_percentage(p: f64) -> u8 {
    p.round().clamp(0.0, 100.0) as u8
}

/// Failures raised by a pigment transform for a single conversion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("latent vector has {actual} components, expected {expected}")]
    Dimension { expected: usize, actual: usize },
    #[error("latent vector contains a non-finite value")]
    NonFinite,
}

/// Errors surfaced by the matching engine
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Colour catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Pigment transform failed: {0}")]
    TransformFailure(#[from] TransformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(220, 20, 60).to_hex(), "#dc143c");
        assert_eq!(Rgb::new(0, 10, 255).to_hex(), "#000aff");
    }

    #[test]
    fn parses_hex_with_or_without_hash() {
        assert_eq!(Rgb::from_hex("#DC143C"), Some(Rgb::new(220, 20, 60)));
        assert_eq!(Rgb::from_hex("007fff"), Some(Rgb::new(0, 127, 255)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zz0000"), None);
    }

    #[test]
    fn parses_catalog_rgb_text() {
        assert_eq!(Rgb::parse_csv("220,20,60"), Some(Rgb::new(220, 20, 60)));
        assert_eq!(Rgb::parse_csv(" 0, 127 ,255 "), Some(Rgb::new(0, 127, 255)));
        assert_eq!(Rgb::parse_csv("256,0,0"), None);
        assert_eq!(Rgb::parse_csv("1,2"), None);
        assert_eq!(Rgb::parse_csv("1,2,3,4"), None);
    }

    #[test]
    fn target_accepts_integral_channels() {
        let t = TargetColor::from_channels(128.0, 0.0, 255.0).unwrap();
        assert_eq!(t.rgb(), Rgb::new(128, 0, 255));
    }

    #[test]
    fn target_rejects_bad_channels() {
        for (r, g, b) in [
            (256.0, 0.0, 0.0),
            (-1.0, 0.0, 0.0),
            (0.0, 12.5, 0.0),
            (0.0, 0.0, f64::NAN),
            (f64::INFINITY, 0.0, 0.0),
        ] {
            assert!(matches!(
                TargetColor::from_channels(r, g, b),
                Err(MatchError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn paint_serializes_camel_case() {
        let paint = Paint::new("color-p-1", "Crimson Red", Rgb::new(220, 20, 60), "series-primary")
            .with_buy_link("https://example.com/crimson");
        let json = serde_json::to_string(&paint).unwrap();
        assert!(json.contains("\"seriesId\":\"series-primary\""));
        assert!(json.contains("\"buyLink\":\"https://example.com/crimson\""));
        assert!(json.contains("\"hex\":\"#dc143c\""));
    }
}
