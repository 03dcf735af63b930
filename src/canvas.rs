use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::EngineError;
use crate::geometry::{Point, Rgba};
use crate::surface::Surface;

/// [`Surface`] over a browser 2D context. Drawing errors are dropped: a
/// missed star is better than a broken page.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, EngineError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(EngineError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::ContextUnavailable)?;
        Ok(Self { ctx })
    }

    fn circle_path(&self, center: Point, radius: f64) -> bool {
        if !(radius > 0.0 && radius.is_finite()) {
            return false;
        }
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok()
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_glow(&mut self, blur: f64, color: Rgba) {
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(&color.css());
    }

    fn clear_glow(&mut self) {
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_shadow_color("transparent");
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        if self.circle_path(center, radius) {
            self.ctx.set_fill_style_str(&color.css());
            self.ctx.fill();
        }
    }

    fn fill_radial_glow(&mut self, center: Point, radius: f64, color: Rgba) {
        if !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let gradient = match self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        {
            Ok(gradient) => gradient,
            Err(_) => return,
        };
        let transparent = Rgba { alpha: 0.0, ..color };
        let _ = gradient.add_color_stop(0.0, &color.css());
        let _ = gradient.add_color_stop(1.0, &transparent.css());

        if self.circle_path(center, radius) {
            self.ctx.set_fill_style_canvas_gradient(&gradient);
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_line_width(width);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for point in rest {
            self.ctx.line_to(point.x, point.y);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(origin.x, origin.y, width, height);
    }
}
