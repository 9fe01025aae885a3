use glam::Vec2;
use glimmer_core::{Paint, Surface};
use std::f64::consts::TAU;
use web_sys as web;

/// [`Surface`] over a 2D canvas context already scaled to CSS pixels.
pub struct CanvasSurface {
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: web::CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn set_fill(&self, paint: &Paint) {
        self.ctx.set_fill_style_str(&paint.to_string());
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint) {
        self.set_fill(paint);
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint) {
        self.ctx.set_line_width(width as f64);
        self.ctx.set_stroke_style_str(&paint.to_string());
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn disc(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if !(radius > 0.0) {
            return;
        }
        self.set_fill(paint);
        self.ctx.begin_path();
        if let Err(e) = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
        {
            log::debug!("[render] arc rejected: {:?}", e);
            return;
        }
        self.ctx.fill();
    }
}
