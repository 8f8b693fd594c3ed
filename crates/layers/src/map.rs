use foundation::color::ColorScale;
use foundation::math::{Projection, graticule};
use formats::Record;
use serde::Serialize;
use tracing::{debug, warn};

use crate::surface::{DrawSurface, TextAlign, TextStyle};
use crate::symbology::MapStyle;

/// Counts from one [`MapRenderer::render`] call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub painted: usize,
    /// Projected outside the visible surface (e.g. far side of a globe).
    pub off_surface: usize,
    /// Non-finite coordinates or value.
    pub unusable: usize,
}

/// Placement of one side in the comparison view.
///
/// `visible` is the horizontal span, as fractions of the width, that the
/// other side does not cover. The scenario label hugs the edge named by
/// `label_align`, inset by the label style's `x_px`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SideFrame {
    pub visible: (f64, f64),
    pub label_align: TextAlign,
}

impl SideFrame {
    /// Whole surface visible, label top-left.
    pub const FULL: Self = Self {
        visible: (0.0, 1.0),
        label_align: TextAlign::Left,
    };

    /// The side shown left of a divider at `fraction` of the width.
    pub fn left_of(fraction: f64) -> Self {
        Self {
            visible: (0.0, unit(fraction)),
            label_align: TextAlign::Left,
        }
    }

    /// The side shown right of a divider at `fraction` of the width.
    pub fn right_of(fraction: f64) -> Self {
        Self {
            visible: (unit(fraction), 1.0),
            label_align: TextAlign::Right,
        }
    }

    fn visible_center(&self, width: f64) -> f64 {
        (self.visible.0 + self.visible.1) * 0.5 * width
    }
}

impl Default for SideFrame {
    fn default() -> Self {
        Self::FULL
    }
}

fn unit(fraction: f64) -> f64 {
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Paints one map side: background, reference frame, point markers, label.
///
/// Stateless between calls; rendering the same input twice yields the same
/// pixels.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapRenderer {
    pub style: MapStyle,
}

impl MapRenderer {
    pub fn new(style: MapStyle) -> Self {
        Self { style }
    }

    /// Paints a side that fills the whole surface.
    pub fn render<S, P, C>(
        &self,
        surface: &mut S,
        projection: &P,
        scale: &C,
        records: &[Record],
        label: &str,
    ) -> FrameStats
    where
        S: DrawSurface + ?Sized,
        P: Projection + ?Sized,
        C: ColorScale + ?Sized,
    {
        self.render_side(surface, projection, scale, records, label, SideFrame::FULL)
    }

    /// Paints a side placed by `frame`. Only the label position and the
    /// "no data" notice depend on the frame.
    pub fn render_side<S, P, C>(
        &self,
        surface: &mut S,
        projection: &P,
        scale: &C,
        records: &[Record],
        label: &str,
        frame: SideFrame,
    ) -> FrameStats
    where
        S: DrawSurface + ?Sized,
        P: Projection + ?Sized,
        C: ColorScale + ?Sized,
    {
        let style = &self.style;
        let (w, h) = surface.size();

        surface.set_opacity(1.0);
        surface.set_shadow(None);
        surface.clear(style.background);

        for line in graticule(projection, w, h, style.graticule_step_deg) {
            surface.stroke_polyline(&line, style.line_width_px, style.graticule_color);
        }
        surface.stroke_polyline(&projection.boundary(w, h), style.line_width_px, style.frame_color);

        let mut stats = FrameStats::default();
        let size = style.marker.size_for_width(w);
        surface.set_opacity(style.marker.opacity);
        for record in records {
            let color = match scale.color(record.value) {
                Some(c) if record.is_plottable() => c,
                _ => {
                    stats.unusable += 1;
                    continue;
                }
            };
            let Some((x, y)) = projection.project(record.lon, record.lat, w, h) else {
                stats.off_surface += 1;
                continue;
            };
            surface.fill_rect(x - size * 0.5, y - size * 0.5, size, size, color);
            stats.painted += 1;
        }
        surface.set_opacity(1.0);

        if records.is_empty() {
            warn!(label, "no records for selection");
            let text = TextStyle {
                color: style.no_data_color,
                ..style.label.text_style().centered()
            };
            surface.draw_text(
                &style.no_data_text,
                frame.visible_center(w),
                h * 0.5 + text.size_px * 0.5,
                &text,
            );
        }

        let label_x = match frame.label_align {
            TextAlign::Left => style.label.x_px,
            TextAlign::Center => w * 0.5,
            TextAlign::Right => w - style.label.x_px,
        };
        let label_style = TextStyle {
            align: frame.label_align,
            ..style.label.text_style()
        };
        surface.set_shadow(Some(style.label.shadow()));
        surface.draw_text(&label.to_uppercase(), label_x, style.label.y_px, &label_style);
        surface.set_shadow(None);

        debug!(
            label,
            painted = stats.painted,
            off_surface = stats.off_surface,
            unusable = stats.unusable,
            "rendered map side"
        );
        stats
    }
}
