use foundation::color::Rgba;
use image::{GrayImage, Luma, Pixel, RgbaImage, imageops};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{Blend, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut};
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::warn;

use crate::fonts::{TextMetrics, label_font, px_scale};
use crate::surface::{DrawSurface, Shadow, TextAlign, TextStyle};

const COVERED: Luma<u8> = Luma([255]);

/// Software drawing surface over an [`RgbaImage`].
///
/// Drawing blends source-over with straight alpha; `clear` overwrites.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
    opacity: f64,
    shadow: Option<Shadow>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            opacity: 1.0,
            shadow: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Row-major RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image.get_pixel_checked(x, y).map(|p| {
            let [r, g, b, a] = p.0;
            Rgba::new(r, g, b, a)
        })
    }

    /// Columns left of `divider_px` come from `left`, the rest from `right`,
    /// the way the right map is revealed past the comparison divider.
    ///
    /// Returns `None` when the two sides differ in size.
    pub fn compose_split(left: &RasterSurface, right: &RasterSurface, divider_px: f64) -> Option<Self> {
        if left.image.dimensions() != right.image.dimensions() {
            return None;
        }
        let (width, height) = left.image.dimensions();
        let split = if divider_px.is_finite() {
            divider_px.round().clamp(0.0, f64::from(width)) as u32
        } else {
            0
        };

        let mut image = right.image.clone();
        if split > 0 {
            let strip = imageops::crop_imm(&left.image, 0, 0, split, height).to_image();
            imageops::replace(&mut image, &strip, 0, 0);
        }
        Some(Self {
            image,
            opacity: 1.0,
            shadow: None,
        })
    }

    fn source(&self, color: Rgba, coverage: f64) -> image::Rgba<u8> {
        let alpha = f64::from(color.a) * self.opacity * coverage;
        image::Rgba([color.r, color.g, color.b, alpha.round().clamp(0.0, 255.0) as u8])
    }

    /// Blends `color` through `mask`, whose top-left corner sits at
    /// `(left, top)` on the surface. Mask intensity scales the alpha.
    fn composite(&mut self, mask: &GrayImage, left: i64, top: i64, color: Rgba) {
        let (width, height) = (i64::from(self.image.width()), i64::from(self.image.height()));
        for (mx, my, Luma([coverage])) in mask.enumerate_pixels() {
            if *coverage == 0 {
                continue;
            }
            let (x, y) = (left + i64::from(mx), top + i64::from(my));
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let src = self.source(color, f64::from(*coverage) / 255.0);
            self.image.get_pixel_mut(x as u32, y as u32).blend(&src);
        }
    }

    /// Renders a shadow halo then the text itself from one coverage mask.
    fn paint_text(&mut self, text: &str, x: f64, baseline: f64, style: &TextStyle) {
        let font = match label_font(style.bold) {
            Ok(font) => font,
            Err(err) => {
                warn!(%err, "embedded font unreadable; text skipped");
                return;
            }
        };
        let scale = px_scale(style.size_px);
        let metrics = TextMetrics::measure(&font, scale, text);

        let (halo, sigma) = match self.shadow {
            Some(shadow) => {
                let radius = ((shadow.blur_px * 0.5).round() as i64).clamp(1, 255);
                let sigma = (shadow.blur_px / 4.0).max(0.5) as f32;
                (Some((shadow, radius as u8)), sigma)
            }
            None => (None, 0.0),
        };
        let pad = halo.map_or(0, |(_, r)| u32::from(r) + (3.0 * sigma).ceil() as u32 + 1);

        let mut mask = GrayImage::new(metrics.width + 2 * pad, metrics.line_height() + 2 * pad);
        draw_text_mut(&mut mask, COVERED, pad as i32, pad as i32, scale, &font, text);

        let anchor = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - f64::from(metrics.width) * 0.5,
            TextAlign::Right => x - f64::from(metrics.width),
        };
        let left = anchor.round() as i64 - i64::from(pad);
        let top = (baseline - f64::from(metrics.ascent)).round() as i64 - i64::from(pad);

        if let Some((shadow, radius)) = halo {
            let spread = gaussian_blur_f32(&dilate(&mask, Norm::LInf, radius), sigma);
            self.composite(&spread, left, top, shadow.color);
        }
        self.composite(&mask, left, top, style.color);
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.image.width()), f64::from(self.image.height()))
    }

    fn clear(&mut self, color: Rgba) {
        let fill = image::Rgba([color.r, color.g, color.b, color.a]);
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if !(x.is_finite() && y.is_finite() && w > 0.0 && h > 0.0) {
            return;
        }
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let x1 = ((x + w).round() as i64).max(x0 + 1);
        let y1 = ((y + h).round() as i64).max(y0 + 1);
        let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);

        let src = self.source(color, 1.0);
        let mut canvas = Blend(std::mem::replace(&mut self.image, RgbaImage::new(0, 0)));
        draw_filled_rect_mut(&mut canvas, rect, src);
        self.image = canvas.0;
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], width: f64, color: Rgba) {
        let finite: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if finite.len() < 2 {
            return;
        }
        let half = width.max(1.0) * 0.5;
        let reach = half.ceil() + 1.0;
        let (w, h) = self.size();
        let min_x = finite.iter().map(|p| p.0).fold(f64::INFINITY, f64::min) - reach;
        let min_y = finite.iter().map(|p| p.1).fold(f64::INFINITY, f64::min) - reach;
        let max_x = finite.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max) + reach;
        let max_y = finite.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max) + reach;
        let (left, top) = (min_x.max(-reach).floor(), min_y.max(-reach).floor());
        let (right, bottom) = (max_x.min(w + reach).ceil(), max_y.min(h + reach).ceil());
        if right <= left || bottom <= top {
            return;
        }

        // Segments share endpoints; collecting coverage first keeps joints
        // from compounding alpha.
        let mut mask = GrayImage::new((right - left) as u32, (bottom - top) as u32);
        for seg in points.windows(2) {
            let ((ax, ay), (bx, by)) = (seg[0], seg[1]);
            if !(ax.is_finite() && ay.is_finite() && bx.is_finite() && by.is_finite()) {
                continue;
            }
            let (ax, ay, bx, by) = (ax - left, ay - top, bx - left, by - top);
            let len = (bx - ax).hypot(by - ay);
            if half < 1.0 || len == 0.0 {
                draw_line_segment_mut(&mut mask, (ax as f32, ay as f32), (bx as f32, by as f32), COVERED);
                continue;
            }
            let (nx, ny) = (-(by - ay) / len * half, (bx - ax) / len * half);
            let quad = [
                Point::new((ax + nx).round() as i32, (ay + ny).round() as i32),
                Point::new((bx + nx).round() as i32, (by + ny).round() as i32),
                Point::new((bx - nx).round() as i32, (by - ny).round() as i32),
                Point::new((ax - nx).round() as i32, (ay - ny).round() as i32),
            ];
            if quad[0] == quad[3] {
                draw_line_segment_mut(&mut mask, (ax as f32, ay as f32), (bx as f32, by as f32), COVERED);
            } else {
                draw_polygon_mut(&mut mask, &quad, COVERED);
            }
        }
        self.composite(&mask, left as i64, top as i64, color);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        if text.is_empty() || !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.paint_text(text, x, y, style);
    }

    fn set_opacity(&mut self, alpha: f64) {
        self.opacity = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 };
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }
}
