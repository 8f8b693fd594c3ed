use foundation::color::Rgba;
use serde::{Deserialize, Serialize};

use crate::surface::{Shadow, TextStyle};

/// Visual parameters for one map side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub background: Rgba,
    pub frame_color: Rgba,
    pub graticule_color: Rgba,
    pub graticule_step_deg: f64,
    pub line_width_px: f64,
    pub marker: MarkerStyle,
    pub label: LabelStyle,
    pub no_data_text: String,
    pub no_data_color: Rgba,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0x1a, 0x1a, 0x2e),
            frame_color: Rgba::new(0x94, 0xa3, 0xb8, 0x8c),
            graticule_color: Rgba::new(0x94, 0xa3, 0xb8, 0x33),
            graticule_step_deg: 30.0,
            line_width_px: 1.0,
            marker: MarkerStyle::default(),
            label: LabelStyle::default(),
            no_data_text: "NO DATA".to_string(),
            no_data_color: Rgba::new(0xff, 0xff, 0xff, 0x99),
        }
    }
}

/// Square point markers.
///
/// Edge length is `max(min_size_px, surface_width / width_divisor)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub min_size_px: f64,
    pub width_divisor: f64,
    pub opacity: f64,
}

impl MarkerStyle {
    pub fn size_for_width(&self, width: f64) -> f64 {
        let scaled = if self.width_divisor > 0.0 {
            width / self.width_divisor
        } else {
            0.0
        };
        scaled.max(self.min_size_px)
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            min_size_px: 2.0,
            width_divisor: 72.0,
            opacity: 0.85,
        }
    }
}

/// Scenario label painted in the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_size_px: f64,
    pub color: Rgba,
    pub x_px: f64,
    pub y_px: f64,
    pub halo_color: Rgba,
    pub halo_blur_px: f64,
}

impl LabelStyle {
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font_size_px, self.color).bold()
    }

    pub fn shadow(&self) -> Shadow {
        Shadow {
            color: self.halo_color,
            blur_px: self.halo_blur_px,
        }
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 24.0,
            color: Rgba::WHITE,
            x_px: 20.0,
            y_px: 40.0,
            halo_color: Rgba::new(0, 0, 0, 0xcc),
            halo_blur_px: 4.0,
        }
    }
}
