//! Sample-accurate software rendition of the mix graph.
//!
//! Used by the native front-end (fed to cpal) and by host-side tests. The
//! mixer's sample counter is its own clock: voices expire when their sample
//! budget runs out, independent of how often anyone else looks at them.

use crate::audio::{AudioBackend, AudioError, MixParams};
use crate::constants::MAX_DELAY_SEC;
use crate::music::{envelope_gain, VoiceSpec, Waveform};
use std::f32::consts::{PI, TAU};
use std::sync::{Arc, Mutex};

/// One-pole glide toward a target (WebAudio `setTargetAtTime` semantics).
#[derive(Clone, Copy, Debug)]
struct Smoothed {
    value: f32,
    target: f32,
    coeff: f32,
}

impl Smoothed {
    fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            coeff: 1.0,
        }
    }

    fn glide_to(&mut self, target: f32, tau_sec: f64, sample_rate: f32) {
        self.target = target;
        self.coeff = if tau_sec <= 0.0 {
            1.0
        } else {
            1.0 - (-1.0 / (tau_sec as f32 * sample_rate)).exp()
        };
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.value += (self.target - self.value) * self.coeff;
        self.value
    }
}

/// RBJ lowpass biquad, Q given in dB as WebAudio's `BiquadFilterNode` does.
#[derive(Clone, Copy, Debug, Default)]
struct Lowpass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Lowpass {
    fn new(cutoff_hz: f32, q_db: f32, sample_rate: f32) -> Self {
        let nyquist_guard = sample_rate * 0.45;
        let fc = cutoff_hz.clamp(10.0, nyquist_guard);
        let w0 = TAU * fc / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let q = 10f32.powf(q_db / 20.0);
        let alpha = sin_w0 / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            ..Default::default()
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

#[derive(Clone, Debug)]
struct SoftVoice {
    spec: VoiceSpec,
    phase: f32,
    phase_inc: f32,
    filter: Lowpass,
    samples_emitted: u32,
    total_samples: u32,
}

impl SoftVoice {
    fn new(spec: VoiceSpec, sample_rate: f32) -> Self {
        Self {
            spec,
            phase: 0.0,
            phase_inc: TAU * spec.frequency_hz / sample_rate,
            filter: Lowpass::new(spec.cutoff_hz, spec.resonance, sample_rate),
            samples_emitted: 0,
            total_samples: ((spec.duration_sec * sample_rate as f64) as u32).max(1),
        }
    }

    #[inline]
    fn finished(&self) -> bool {
        self.samples_emitted >= self.total_samples
    }

    fn next(&mut self, sample_rate: f32) -> f32 {
        let raw = match self.spec.waveform {
            Waveform::Sine => self.phase.sin(),
            Waveform::Triangle => {
                let t = self.phase / TAU;
                // 0..1 ramp folded into -1..1..-1
                1.0 - 4.0 * (t - (t + 0.5).floor()).abs()
            }
        };
        let t = self.samples_emitted as f64 / sample_rate as f64;
        let out = self.filter.process(raw) * envelope_gain(&self.spec, t);
        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.samples_emitted += 1;
        out
    }
}

/// Master gain -> output, master gain -> delay <-> feedback, delay -> output.
pub struct SoftwareMixer {
    sample_rate: f32,
    graph_built: bool,
    master_gain: Smoothed,
    delay_time: Smoothed,
    feedback: Smoothed,
    delay_line: Vec<f32>,
    write_pos: usize,
    voices: Vec<SoftVoice>,
}

impl SoftwareMixer {
    pub fn new(sample_rate: f32) -> Self {
        let len = (sample_rate as f64 * MAX_DELAY_SEC) as usize + 2;
        Self {
            sample_rate,
            graph_built: false,
            master_gain: Smoothed::new(0.0),
            delay_time: Smoothed::new(0.0),
            feedback: Smoothed::new(0.0),
            delay_line: vec![0.0; len.max(4)],
            write_pos: 0,
            voices: Vec::new(),
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Set the persistent parameters immediately and start processing.
    pub fn build(&mut self, params: &MixParams) {
        self.master_gain = Smoothed::new(params.master_gain);
        self.delay_time = Smoothed::new(params.delay_time_sec);
        self.feedback = Smoothed::new(params.feedback);
        self.graph_built = true;
    }

    pub fn ramp(&mut self, params: &MixParams, tau_sec: f64) {
        let sr = self.sample_rate;
        self.master_gain.glide_to(params.master_gain, tau_sec, sr);
        self.delay_time.glide_to(params.delay_time_sec, tau_sec, sr);
        self.feedback.glide_to(params.feedback, tau_sec, sr);
    }

    pub fn start_voice(&mut self, spec: &VoiceSpec) {
        self.voices.push(SoftVoice::new(*spec, self.sample_rate));
    }

    fn read_delay(&self, delay_samples: f32) -> f32 {
        let len = self.delay_line.len();
        let d = delay_samples.clamp(1.0, (len - 2) as f32);
        let whole = d.floor() as usize;
        let frac = d - whole as f32;
        let i0 = (self.write_pos + len - whole) % len;
        let i1 = (self.write_pos + len - whole - 1) % len;
        self.delay_line[i0] * (1.0 - frac) + self.delay_line[i1] * frac
    }

    /// Produce the next mono output sample.
    pub fn next_sample(&mut self) -> f32 {
        if !self.graph_built {
            return 0.0;
        }
        let sr = self.sample_rate;
        let mut voice_sum = 0.0f32;
        for v in &mut self.voices {
            voice_sum += v.next(sr);
        }
        self.voices.retain(|v| !v.finished());

        let master = voice_sum * self.master_gain.next();
        let delay_samples = self.delay_time.next() * sr;
        let delayed = self.read_delay(delay_samples);
        let fb = delayed * self.feedback.next();

        let len = self.delay_line.len();
        self.delay_line[self.write_pos] = master + fb;
        self.write_pos = (self.write_pos + 1) % len;

        master + delayed
    }

    /// Fill an interleaved buffer, duplicating the mono mix into every channel.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            // Soft clip keeps dense bursts from wrapping on integer outputs
            let s = (self.next_sample() * PI / 2.0).tanh() * 2.0 / PI;
            frame.fill(s);
        }
    }
}

/// [`AudioBackend`] over a mixer shared with an audio callback thread.
#[derive(Clone)]
pub struct SoftwareBackend {
    mixer: Arc<Mutex<SoftwareMixer>>,
}

/// Token for the mixer's persistent graph.
#[derive(Debug)]
pub struct SoftwareGraph {
    _private: (),
}

impl SoftwareBackend {
    pub fn new(mixer: Arc<Mutex<SoftwareMixer>>) -> Self {
        Self { mixer }
    }

    pub fn mixer(&self) -> &Arc<Mutex<SoftwareMixer>> {
        &self.mixer
    }
}

impl AudioBackend for SoftwareBackend {
    type Graph = SoftwareGraph;

    fn build_graph(&mut self, params: &MixParams) -> Result<SoftwareGraph, AudioError> {
        let mut mixer = self
            .mixer
            .lock()
            .map_err(|_| AudioError::Unavailable("mixer poisoned".to_string()))?;
        mixer.build(params);
        Ok(SoftwareGraph { _private: () })
    }

    fn ramp_mix(&mut self, _graph: &SoftwareGraph, params: &MixParams, tau_sec: f64) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.ramp(params, tau_sec);
        }
    }

    fn start_voice(&mut self, _graph: &SoftwareGraph, voice: &VoiceSpec) -> Result<(), AudioError> {
        let mut mixer = self
            .mixer
            .lock()
            .map_err(|_| AudioError::Unavailable("mixer poisoned".to_string()))?;
        mixer.start_voice(voice);
        Ok(())
    }
}
