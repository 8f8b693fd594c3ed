use foundation::color::Rgba;
use layers::{DrawSurface, Shadow, TextAlign, TextStyle};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`DrawSurface`] over a browser 2D canvas.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.canvas.set_width(width.max(1.0) as u32);
        self.canvas.set_height(height.max(1.0) as u32);
    }
}

fn ctx_set_fill_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(value),
    );
}

fn ctx_set_stroke_style(ctx: &CanvasRenderingContext2d, value: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(value),
    );
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self, color: Rgba) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
        ctx_set_fill_style(&self.ctx, &color.to_css());
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        ctx_set_fill_style(&self.ctx, &color.to_css());
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], width: f64, color: Rgba) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        ctx_set_stroke_style(&self.ctx, &color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(x0, y0);
        for &(x, y) in rest {
            self.ctx.line_to(x, y);
        }
        self.ctx.stroke();
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        let weight = if style.bold { "bold " } else { "" };
        self.ctx
            .set_font(&format!("{weight}{}px Arial, sans-serif", style.size_px));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        ctx_set_fill_style(&self.ctx, &style.color.to_css());
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn set_opacity(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        match shadow {
            Some(shadow) => {
                self.ctx.set_shadow_color(&shadow.color.to_css());
                self.ctx.set_shadow_blur(shadow.blur_px);
            }
            None => {
                self.ctx.set_shadow_color("rgba(0,0,0,0)");
                self.ctx.set_shadow_blur(0.0);
            }
        }
    }
}
