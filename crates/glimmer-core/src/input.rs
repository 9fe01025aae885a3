use crate::constants::{SPAWNS_PER_MOVE, SPAWN_JITTER_PX};
use crate::settings::Settings;
use glam::Vec2;
use rand::prelude::*;

/// Canvas-local pointer position and button state.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub pos: Vec2,
    pub pressed: bool,
}

/// What one processed pointer move asks the engines to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragBurst {
    pub spawns: [Vec2; SPAWNS_PER_MOVE],
    /// Position for a tone request, when the spawn-rate roll succeeded.
    pub tone: Option<Vec2>,
}

/// Canvas-local coordinates from viewport coordinates and the canvas offset.
#[inline]
pub fn canvas_local(client: Vec2, canvas_origin: Vec2) -> Vec2 {
    client - canvas_origin
}

pub struct PointerTracker {
    state: PointerState,
    rng: StdRng,
}

impl PointerTracker {
    pub fn new(seed: u64) -> Self {
        Self {
            state: PointerState::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Press at `pos`; the press itself counts as the first move.
    pub fn press(&mut self, pos: Vec2, settings: &Settings) -> Option<DragBurst> {
        self.state.pressed = true;
        self.move_to(pos, settings)
    }

    /// Track a move; only produces a burst while pressed.
    pub fn move_to(&mut self, pos: Vec2, settings: &Settings) -> Option<DragBurst> {
        if !pos.is_finite() {
            return None;
        }
        self.state.pos = pos;
        if !self.state.pressed {
            return None;
        }
        let mut spawns = [pos; SPAWNS_PER_MOVE];
        for s in &mut spawns {
            *s += Vec2::new(
                self.rng.gen_range(-SPAWN_JITTER_PX..SPAWN_JITTER_PX),
                self.rng.gen_range(-SPAWN_JITTER_PX..SPAWN_JITTER_PX),
            );
        }
        let tone = (self.rng.gen::<f32>() < settings.spawn_rate).then_some(pos);
        Some(DragBurst { spawns, tone })
    }

    pub fn release(&mut self) {
        if self.state.pressed {
            log::debug!("[input] release at ({:.1},{:.1})", self.state.pos.x, self.state.pos.y);
        }
        self.state.pressed = false;
    }
}
