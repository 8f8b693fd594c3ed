//! Embedded label fonts for the software raster.

use ab_glyph::{Font, FontRef, InvalidFont, PxScale, ScaleFont};
use imageproc::drawing::text_size;

const REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// DejaVu Sans, regular or bold.
pub fn label_font(bold: bool) -> Result<FontRef<'static>, InvalidFont> {
    FontRef::try_from_slice(if bold { BOLD } else { REGULAR })
}

/// Pixel scale for a nominal text height. Non-finite or non-positive sizes
/// fall back to one pixel.
pub fn px_scale(size_px: f64) -> PxScale {
    let size = if size_px.is_finite() && size_px > 0.0 {
        size_px as f32
    } else {
        1.0
    };
    PxScale::from(size)
}

/// Horizontal extent of `text` and the font's ascent and descent, in pixels.
///
/// Descent is positive, measured down from the baseline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextMetrics {
    pub width: u32,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn measure(font: &FontRef<'_>, scale: PxScale, text: &str) -> Self {
        let (width, _) = text_size(scale, font, text);
        let scaled = font.as_scaled(scale);
        Self {
            width,
            ascent: scaled.ascent(),
            descent: -scaled.descent(),
        }
    }

    /// Line box height, rounded up.
    pub fn line_height(&self) -> u32 {
        (self.ascent + self.descent).ceil().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{TextMetrics, label_font, px_scale};

    #[test]
    fn both_weights_parse() {
        assert!(label_font(false).is_ok());
        assert!(label_font(true).is_ok());
    }

    #[test]
    fn bold_text_is_wider() {
        let scale = px_scale(24.0);
        let regular = TextMetrics::measure(&label_font(false).expect("font"), scale, "SSP245");
        let bold = TextMetrics::measure(&label_font(true).expect("font"), scale, "SSP245");
        assert!(regular.width > 0);
        assert!(bold.width > regular.width);
        assert!(bold.ascent > 0.0 && bold.descent > 0.0);
        assert!(bold.line_height() >= 24);
    }

    #[test]
    fn degenerate_sizes_fall_back() {
        assert_eq!(px_scale(f64::NAN), px_scale(1.0));
        assert_eq!(px_scale(-3.0), px_scale(1.0));
    }
}
