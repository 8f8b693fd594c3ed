use foundation::color::Rgba;

/// Horizontal anchor for [`DrawSurface::draw_text`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_px: f64,
    pub color: Rgba,
    pub align: TextAlign,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size_px: f64, color: Rgba) -> Self {
        Self {
            size_px,
            color,
            align: TextAlign::Left,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }
}

/// Soft drop shadow behind text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    pub blur_px: f64,
}

/// Minimal 2D drawing target a map side paints into.
///
/// Coordinates are pixels with the origin top-left. `draw_text` anchors at
/// the text baseline. Opacity multiplies every later fill, stroke and text
/// until changed; the shadow applies to text until cleared with `None`.
pub trait DrawSurface {
    fn size(&self) -> (f64, f64);
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);
    fn stroke_polyline(&mut self, points: &[(f64, f64)], width: f64, color: Rgba);
    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
    fn set_opacity(&mut self, alpha: f64);
    fn set_shadow(&mut self, shadow: Option<Shadow>);
}
