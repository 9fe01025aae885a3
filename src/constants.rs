// DOM wiring for the web frontend.

pub const CANVAS_ID: &str = "app-canvas";
pub const ENABLE_SOUND_ID: &str = "enable-sound"; // the "tap to enable sound" control

// Frame pacing
pub const FRAME_STALL_SEC: f32 = 0.25; // gaps longer than this are logged
