use serde::{Deserialize, Serialize};

/// Lower end of the default precipitation domain (mm/day).
pub const PRECIP_MIN_MM_DAY: f64 = 0.1;
/// Upper end of the default precipitation domain (mm/day).
pub const PRECIP_MAX_MM_DAY: f64 = 1.5;

/// 8-bit sRGB color with straight alpha.
///
/// Serialized as a CSS hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
            )),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS `rgba(...)` form accepted by canvas fill/stroke styles.
    pub fn to_css(self) -> String {
        let a = f64::from(self.a) / 255.0;
        format!("rgba({},{},{},{a:.3})", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&value).ok_or_else(|| format!("invalid hex color: {value:?}"))
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

/// Maps a scalar value to a color.
///
/// Non-finite values have no color; callers skip them.
pub trait ColorScale {
    fn color(&self, value: f64) -> Option<Rgba>;
}

/// Blue (low) through green to red (high) ramp over `[min, max]`.
///
/// Values outside the domain clamp to the end colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearRamp {
    pub min: f64,
    pub max: f64,
}

impl LinearRamp {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !(span > 0.0) {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// `n` evenly spaced samples starting at `min`, for legend painting.
    pub fn legend(&self, n: usize) -> Vec<Rgba> {
        let span = self.max - self.min;
        (0..n)
            .filter_map(|i| self.color(self.min + (i as f64 / n as f64) * span))
            .collect()
    }
}

impl ColorScale for LinearRamp {
    fn color(&self, value: f64) -> Option<Rgba> {
        if !value.is_finite() {
            return None;
        }
        let t = self.normalize(value);
        let r = (t * 255.0).floor() as u8;
        let b = ((1.0 - t) * 255.0).floor() as u8;
        let g = (128.0 * (1.0 - (t - 0.5).abs() * 2.0)).floor() as u8;
        Some(Rgba::rgb(r, g, b))
    }
}

/// How the color domain is chosen for a frame.
///
/// Whatever the policy, one resolved ramp is shared by both sides of a
/// comparison so equal values get equal colors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleDomain {
    Fixed { min: f64, max: f64 },
    /// `[min, max observed]`, with `max observed` taken over the frame.
    SharedMax { min: f64 },
}

impl Default for ScaleDomain {
    fn default() -> Self {
        ScaleDomain::Fixed {
            min: PRECIP_MIN_MM_DAY,
            max: PRECIP_MAX_MM_DAY,
        }
    }
}

impl ScaleDomain {
    /// Resolves the ramp for a frame whose largest finite value is
    /// `observed_max`.
    ///
    /// A shared-max domain with nothing observed above `min` spans one unit
    /// so the ramp stays well defined.
    pub fn resolve(&self, observed_max: Option<f64>) -> LinearRamp {
        match *self {
            ScaleDomain::Fixed { min, max } => LinearRamp::new(min, max),
            ScaleDomain::SharedMax { min } => {
                let max = observed_max
                    .filter(|m| m.is_finite() && *m > min)
                    .unwrap_or(min + 1.0);
                LinearRamp::new(min, max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorScale, LinearRamp, Rgba, ScaleDomain};

    #[test]
    fn ramp_end_colors() {
        let ramp = LinearRamp::new(0.1, 1.5);
        assert_eq!(ramp.color(0.1), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(ramp.color(1.5), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(ramp.color(-3.0), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(ramp.color(9.0), Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn ramp_midpoint_peaks_green() {
        let ramp = LinearRamp::new(0.0, 1.0);
        assert_eq!(ramp.color(0.5), Some(Rgba::rgb(127, 128, 127)));
    }

    #[test]
    fn ramp_skips_non_finite() {
        let ramp = LinearRamp::new(0.0, 1.0);
        assert_eq!(ramp.color(f64::NAN), None);
        assert_eq!(ramp.color(f64::INFINITY), None);
    }

    #[test]
    fn degenerate_ramp_is_blue() {
        let ramp = LinearRamp::new(1.0, 1.0);
        assert_eq!(ramp.color(1.0), Some(Rgba::rgb(0, 0, 255)));
    }

    #[test]
    fn legend_samples_from_min() {
        let ramp = LinearRamp::new(0.1, 1.5);
        let stops = ramp.legend(50);
        assert_eq!(stops.len(), 50);
        assert_eq!(stops[0], Rgba::rgb(0, 0, 255));
        assert_ne!(stops[49], Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn shared_max_domain_uses_observed_max() {
        let d = ScaleDomain::SharedMax { min: 0.0 };
        assert_eq!(d.resolve(Some(2.0)), LinearRamp::new(0.0, 2.0));
        assert_eq!(d.resolve(None), LinearRamp::new(0.0, 1.0));
        assert_eq!(d.resolve(Some(f64::NAN)), LinearRamp::new(0.0, 1.0));
        assert_eq!(d.resolve(Some(-1.0)), LinearRamp::new(0.0, 1.0));
    }

    #[test]
    fn fixed_domain_ignores_observed() {
        let d = ScaleDomain::default();
        assert_eq!(d.resolve(Some(100.0)), LinearRamp::new(0.1, 1.5));
    }

    #[test]
    fn hex_round_trip_forms() {
        assert_eq!(Rgba::from_hex("#1a1a2e"), Some(Rgba::rgb(0x1a, 0x1a, 0x2e)));
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::WHITE));
        assert_eq!(
            Rgba::from_hex("#000000cc"),
            Some(Rgba::new(0, 0, 0, 0xcc))
        );
        assert_eq!(Rgba::from_hex("1a1a2e"), None);
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::new(0, 0, 0, 0xcc).to_hex(), "#000000cc");
    }

    #[test]
    fn css_form() {
        assert_eq!(Rgba::new(255, 0, 10, 255).to_css(), "rgba(255,0,10,1.000)");
    }

    #[test]
    fn domain_deserializes_tagged() {
        let d: ScaleDomain =
            serde_json::from_str(r#"{"kind":"shared_max","min":0.0}"#).expect("parse");
        assert_eq!(d, ScaleDomain::SharedMax { min: 0.0 });
    }
}
