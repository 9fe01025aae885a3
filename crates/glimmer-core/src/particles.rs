//! Particle simulation.
//!
//! The engine exclusively owns the live set. Renderers only ever see it as a
//! shared slice between steps.

use crate::constants::*;
use crate::settings::{wrap_hue, ColorMode, Settings};
use glam::Vec2;
use rand::prelude::*;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in (0, 1] while the particle is live.
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    /// Degrees in [0, 360).
    pub hue: f32,
}

impl Particle {
    /// Glyph radius scale; shrinks with remaining life.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * self.life
    }
}

/// Rotating colour angle used in cycling colour mode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HueCursor {
    value: f32,
}

impl HueCursor {
    pub fn new(start: f32) -> Self {
        Self {
            value: wrap_hue(start),
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Return the current hue and move the cursor on by `speed` degrees.
    pub fn advance(&mut self, speed: f32) -> f32 {
        let current = self.value;
        if speed.is_finite() {
            self.value = wrap_hue(self.value + speed);
        }
        current
    }
}

pub struct ParticleEngine {
    particles: Vec<Particle>,
    hue: HueCursor,
    rng: StdRng,
}

impl ParticleEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            hue: HueCursor::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replace the hue cursor, e.g. to resume a colour sequence.
    pub fn with_hue_cursor(mut self, hue: HueCursor) -> Self {
        self.hue = hue;
        self
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn hue_cursor(&self) -> HueCursor {
        self.hue
    }

    /// Emit one particle at `pos` flying off in a random direction.
    pub fn spawn(&mut self, pos: Vec2, settings: &Settings) -> Particle {
        let angle = self.rng.gen_range(0.0..TAU);
        let speed = self.rng.gen_range(SPAWN_SPEED_MIN..=SPAWN_SPEED_MAX);
        let decay = self.rng.gen_range(SPAWN_DECAY_MIN..=SPAWN_DECAY_MAX) * settings.particle_decay;
        let size = self.rng.gen_range(SPAWN_SIZE_MIN..=SPAWN_SIZE_MAX) * settings.particle_size;

        let hue = match settings.color_mode {
            ColorMode::Fixed => wrap_hue(settings.fixed_hue),
            ColorMode::Cycle => self.hue.advance(settings.color_speed),
        };

        let particle = Particle {
            pos,
            vel: Vec2::from_angle(angle) * speed,
            life: 1.0,
            // A zero multiplier would make the particle immortal
            decay: decay.max(f32::EPSILON),
            size: size.max(f32::EPSILON),
            hue,
        };
        self.particles.push(particle);
        particle
    }

    /// Advance every live particle by one frame and retire the expired ones.
    pub fn step(&mut self) {
        self.particles.retain_mut(|p| {
            p.pos += p.vel;
            p.vel.y += GRAVITY_PER_FRAME;
            p.vel.x *= HORIZONTAL_DRAG;
            p.life -= p.decay;
            p.life > 0.0
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_applies_gravity_and_drag() {
        let mut engine = ParticleEngine::new(1);
        let p = engine.spawn(Vec2::new(50.0, 50.0), &Settings::default());
        engine.step();
        let q = engine.particles()[0];
        assert_eq!(q.pos, p.pos + p.vel);
        assert!((q.vel.y - (p.vel.y + GRAVITY_PER_FRAME)).abs() < 1e-6);
        assert!((q.vel.x - p.vel.x * HORIZONTAL_DRAG).abs() < 1e-6);
        assert!((q.life - (1.0 - p.decay)).abs() < 1e-6);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut engine = ParticleEngine::new(3);
        let s = Settings::default();
        for i in 0..5 {
            engine.spawn(Vec2::new(i as f32, 0.0), &s);
        }
        engine.step();
        let xs: Vec<f32> = engine
            .particles()
            .iter()
            .map(|p| p.pos.x - p.vel.x / HORIZONTAL_DRAG)
            .collect();
        for (i, x) in xs.iter().enumerate() {
            assert!((x - i as f32).abs() < 1e-3);
        }
    }

    #[test]
    fn hue_cursor_advance_returns_previous() {
        let mut c = HueCursor::new(10.0);
        assert_eq!(c.advance(5.0), 10.0);
        assert_eq!(c.value(), 15.0);
    }
}
