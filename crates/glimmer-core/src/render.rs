//! Frame painter.
//!
//! Reads a particle snapshot plus a settings snapshot and issues primitive
//! draw calls against a [`Surface`]. The web host implements `Surface` over a
//! 2D canvas context; tests record the calls.

use crate::constants::*;
use crate::music::SCALE_HZ;
use crate::particles::Particle;
use crate::settings::Settings;
use glam::Vec2;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Rgba { rgb: [u8; 3], alpha: f32 },
    Hsla {
        hue: f32,
        saturation: f32,
        lightness: f32,
        alpha: f32,
    },
}

impl Paint {
    #[inline]
    pub fn particle(hue: f32, alpha: f32) -> Self {
        Paint::Hsla {
            hue,
            saturation: PARTICLE_SATURATION,
            lightness: PARTICLE_LIGHTNESS,
            alpha,
        }
    }

    pub fn alpha(&self) -> f32 {
        match *self {
            Paint::Rgba { alpha, .. } | Paint::Hsla { alpha, .. } => alpha,
        }
    }
}

/// CSS colour syntax, directly usable as a canvas fill or stroke style.
impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Paint::Rgba { rgb, alpha } => {
                write!(f, "rgba({}, {}, {}, {})", rgb[0], rgb[1], rgb[2], alpha)
            }
            Paint::Hsla {
                hue,
                saturation,
                lightness,
                alpha,
            } => write!(f, "hsla({}, {}%, {}%, {})", hue, saturation, lightness, alpha),
        }
    }
}

pub trait Surface {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, paint: &Paint);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint);
    fn disc(&mut self, center: Vec2, radius: f32, paint: &Paint);
}

/// Logical (CSS pixel) size of the drawing surface for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero or non-finite size, e.g. before layout has run.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }
}

/// One glow segment painted on a grid column next to a particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reflection {
    pub column: usize,
    pub x: f32,
    pub alpha: f32,
}

/// Glow alpha for a particle `distance` px away from a grid column.
///
/// Exactly zero at and beyond `radius`; strictly decreasing with distance
/// inside it whenever `life * strength` is positive.
#[inline]
pub fn reflection_alpha(distance: f32, radius: f32, life: f32, strength: f32) -> f32 {
    let distance = distance.abs();
    if !(radius > 0.0) || distance >= radius {
        return 0.0;
    }
    (1.0 - distance / radius) * life * strength
}

pub struct Renderer {
    columns: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(SCALE_HZ.len())
    }
}

impl Renderer {
    /// A renderer whose grid has one column per scale degree.
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
        }
    }

    #[inline]
    pub fn column_width(&self, viewport: Viewport) -> f32 {
        viewport.width / self.columns as f32
    }

    /// Visible reflections for one particle on every column within the radius.
    pub fn reflections(
        &self,
        particle: &Particle,
        viewport: Viewport,
        settings: &Settings,
    ) -> SmallVec<[Reflection; 4]> {
        let mut out = SmallVec::new();
        let radius = settings.reflection_radius;
        let col_w = self.column_width(viewport);
        if particle.life <= 0.0 || !(radius > 0.0) || !(col_w > 0.0) {
            return out;
        }
        let last = (self.columns - 1) as f32;
        let first_col = ((particle.pos.x - radius) / col_w).ceil().clamp(0.0, last) as usize;
        let last_col = ((particle.pos.x + radius) / col_w).floor().clamp(0.0, last) as usize;
        for column in first_col..=last_col {
            let x = column as f32 * col_w;
            let alpha = reflection_alpha(
                particle.pos.x - x,
                radius,
                particle.life,
                settings.reflection_strength,
            );
            if alpha < REFLECTION_MIN_ALPHA {
                continue;
            }
            out.push(Reflection { column, x, alpha });
        }
        out
    }

    /// Paint one frame: trail fade, grid, reflections, then particle glyphs.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: Viewport,
        particles: &[Particle],
        settings: &Settings,
    ) {
        if viewport.is_degenerate() {
            return;
        }
        let size = Vec2::new(viewport.width, viewport.height);

        surface.fill_rect(
            Vec2::ZERO,
            size,
            &Paint::Rgba {
                rgb: TRAIL_FADE_RGB,
                alpha: TRAIL_FADE_ALPHA,
            },
        );

        if settings.show_grid {
            self.draw_grid(surface, viewport);
            self.draw_reflections(surface, viewport, particles, settings);
        }

        for p in particles {
            draw_glyph(surface, p);
        }
    }

    fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S, viewport: Viewport) {
        let col_w = self.column_width(viewport);
        let paint = Paint::Rgba {
            rgb: GRID_LINE_RGB,
            alpha: GRID_LINE_ALPHA,
        };
        for i in 0..self.columns {
            let x = i as f32 * col_w;
            surface.line(
                Vec2::new(x, 0.0),
                Vec2::new(x, viewport.height),
                GRID_LINE_WIDTH,
                &paint,
            );
        }
    }

    fn draw_reflections<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: Viewport,
        particles: &[Particle],
        settings: &Settings,
    ) {
        let radius = settings.reflection_radius;
        for p in particles {
            for r in self.reflections(p, viewport, settings) {
                surface.line(
                    Vec2::new(r.x, p.pos.y - radius),
                    Vec2::new(r.x, p.pos.y + radius),
                    REFLECTION_LINE_WIDTH,
                    &Paint::particle(p.hue, r.alpha),
                );
            }
        }
    }
}

fn draw_glyph<S: Surface + ?Sized>(surface: &mut S, p: &Particle) {
    if p.life <= 0.0 {
        return;
    }
    let radius = p.radius();
    for (radius_mul, alpha_mul) in GLYPH_LAYERS {
        surface.disc(p.pos, radius * radius_mul, &Paint::particle(p.hue, p.life * alpha_mul));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_formats_as_css() {
        let p = Paint::Rgba {
            rgb: [10, 10, 15],
            alpha: 0.2,
        };
        assert_eq!(p.to_string(), "rgba(10, 10, 15, 0.2)");
        assert_eq!(Paint::particle(200.0, 0.5).to_string(), "hsla(200, 80%, 60%, 0.5)");
    }

    #[test]
    fn reflection_alpha_edges() {
        assert_eq!(reflection_alpha(100.0, 100.0, 1.0, 0.5), 0.0);
        assert_eq!(reflection_alpha(150.0, 100.0, 1.0, 0.5), 0.0);
        assert_eq!(reflection_alpha(0.0, 100.0, 1.0, 0.5), 0.5);
        assert_eq!(reflection_alpha(5.0, 0.0, 1.0, 0.5), 0.0);
    }
}
