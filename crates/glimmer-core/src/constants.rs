// Shared simulation/visual/audio tuning constants used by both web and native frontends.

// Particle physics (per frame)
pub const GRAVITY_PER_FRAME: f32 = 0.05; // added to vertical velocity each step
pub const HORIZONTAL_DRAG: f32 = 0.99; // horizontal velocity multiplier each step

// Particle spawn ranges (before settings multipliers)
pub const SPAWN_SPEED_MIN: f32 = 1.0;
pub const SPAWN_SPEED_MAX: f32 = 5.0;
pub const SPAWN_DECAY_MIN: f32 = 0.008;
pub const SPAWN_DECAY_MAX: f32 = 0.023;
pub const SPAWN_SIZE_MIN: f32 = 3.0;
pub const SPAWN_SIZE_MAX: f32 = 11.0;

// Input
pub const SPAWNS_PER_MOVE: usize = 3; // particles emitted per processed pointer move
pub const SPAWN_JITTER_PX: f32 = 10.0; // max offset from the pointer on each axis

// Hue
pub const HUE_TURN: f32 = 360.0;

// Trail fade drawn over the whole surface each frame
pub const TRAIL_FADE_RGB: [u8; 3] = [10, 10, 15];
pub const TRAIL_FADE_ALPHA: f32 = 0.2;

// Grid
pub const GRID_LINE_RGB: [u8; 3] = [255, 255, 255];
pub const GRID_LINE_ALPHA: f32 = 0.02;
pub const GRID_LINE_WIDTH: f32 = 1.0;

// Reflections
pub const REFLECTION_LINE_WIDTH: f32 = 2.0;
pub const REFLECTION_MIN_ALPHA: f32 = 0.01; // fainter glows are skipped

// Particle glyph colour and layers (radius multiplier, alpha multiplier), outermost first
pub const PARTICLE_SATURATION: f32 = 80.0;
pub const PARTICLE_LIGHTNESS: f32 = 60.0;
pub const GLYPH_LAYERS: [(f32, f32); 3] = [(2.0, 0.15), (1.5, 0.3), (1.0, 1.0)];

// Voice envelope and filter mapping
pub const VOICE_DURATION_SEC: f64 = 0.5;
pub const VOICE_START_GAIN: f32 = 0.1;
pub const VOICE_END_GAIN: f32 = 0.001;
pub const FILTER_SPAN_HZ: f32 = 4000.0; // cutoff added at the top edge
pub const RESONANCE_BASE: f32 = 5.0;
pub const RESONANCE_SPAN: f32 = 10.0; // resonance added at the bottom edge

// Mix graph
pub const PARAM_SMOOTHING_TAU_SEC: f64 = 0.1; // time constant for volume/delay/feedback changes
pub const MAX_DELAY_SEC: f64 = 1.0;
pub const ECHO_FLOOR: f64 = 0.001; // echo level treated as silent on teardown
pub const MAX_RELEASE_SEC: f64 = 10.0; // longest a dropped graph keeps running
