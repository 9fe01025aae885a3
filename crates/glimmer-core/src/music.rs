use crate::constants::*;
use crate::settings::Settings;
use rand::Rng;

/// C minor pentatonic-ish ladder, ascending, two and a half octaves from C3.
pub const SCALE_HZ: [f32; 15] = [
    130.81, 155.56, 174.61, 196.00, 233.08, //
    261.63, 311.13, 349.23, 392.00, 466.16, //
    523.25, 622.25, 698.46, 783.99, 932.33,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Pick one of the two voice shapes with equal odds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Waveform::Sine
        } else {
            Waveform::Triangle
        }
    }
}

/// Everything needed to start one transient voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceSpec {
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub start_gain: f32,
    pub end_gain: f32,
    pub duration_sec: f64,
}

/// Horizontal scale bucket for `x` on a surface `width` wide.
///
/// Always a valid index into `SCALE_HZ`, even for positions outside the
/// surface. Returns `None` only when the width is not a usable size.
#[inline]
pub fn scale_index(x: f32, width: f32) -> Option<usize> {
    if !(width > 0.0) || !x.is_finite() {
        return None;
    }
    let n = SCALE_HZ.len();
    let raw = (x / width * n as f32).floor();
    Some(raw.clamp(0.0, (n - 1) as f32) as usize)
}

/// Pitch for a pointer position: the scale bucket shifted by whole octaves.
pub fn pitch_hz(x: f32, width: f32, octave_shift: i32) -> Option<f32> {
    let index = scale_index(x, width)?;
    Some(SCALE_HZ[index] * 2f32.powi(octave_shift))
}

/// Lowpass cutoff and resonance for a vertical position.
///
/// The top edge is brightest (`filter_base + 4000`) and least resonant; the
/// bottom edge sits at `filter_base` with the most resonance.
pub fn filter_for(y: f32, height: f32, filter_base: f32) -> Option<(f32, f32)> {
    if !(height > 0.0) || !y.is_finite() {
        return None;
    }
    let depth = y / height;
    let cutoff = filter_base + (1.0 - depth) * FILTER_SPAN_HZ;
    let resonance = RESONANCE_BASE + depth * RESONANCE_SPAN;
    Some((cutoff, resonance))
}

/// Build the voice for a tone request at (`x`, `y`) on a `width` x `height` surface.
pub fn voice_for<R: Rng + ?Sized>(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    settings: &Settings,
    rng: &mut R,
) -> Option<VoiceSpec> {
    let frequency_hz = pitch_hz(x, width, settings.octave_shift)?;
    let (cutoff_hz, resonance) = filter_for(y, height, settings.filter_base)?;
    Some(VoiceSpec {
        waveform: Waveform::random(rng),
        frequency_hz,
        // Pointer positions past the edges must not push the filter negative
        cutoff_hz: cutoff_hz.max(1.0),
        resonance,
        start_gain: VOICE_START_GAIN,
        end_gain: VOICE_END_GAIN,
        duration_sec: VOICE_DURATION_SEC,
    })
}

/// Gain of the exponential envelope `t` seconds after onset.
pub fn envelope_gain(voice: &VoiceSpec, t: f64) -> f32 {
    if t <= 0.0 {
        return voice.start_gain;
    }
    if t >= voice.duration_sec {
        return voice.end_gain;
    }
    let ratio = voice.end_gain / voice.start_gain;
    voice.start_gain * ratio.powf((t / voice.duration_sec) as f32)
}
