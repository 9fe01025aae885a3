//! Audio engine state machine.
//!
//! The engine owns one persistent mix graph (master gain feeding the output
//! and a delay line whose output loops back through a feedback gain) and
//! spawns short-lived voices into it. How nodes are built and scheduled is up
//! to an [`AudioBackend`]; the WebAudio host and the software mixer both
//! implement it. Voice timing is entirely the backend's own clock, never the
//! frame loop's.

use crate::constants::{ECHO_FLOOR, MAX_RELEASE_SEC, PARAM_SMOOTHING_TAU_SEC, VOICE_DURATION_SEC};
use crate::music::{voice_for, VoiceSpec};
use crate::settings::Settings;
use rand::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("failed to create {node}: {reason}")]
    Node { node: &'static str, reason: String },
}

/// The three parameters of the persistent graph that follow the settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MixParams {
    pub master_gain: f32,
    pub delay_time_sec: f32,
    pub feedback: f32,
}

impl From<&Settings> for MixParams {
    fn from(s: &Settings) -> Self {
        Self {
            master_gain: s.master_vol.clamp(0.0, 1.0),
            delay_time_sec: s.delay_time.clamp(0.0, 1.0),
            // Above 1.0 the echo loop would grow instead of decay
            feedback: s.feedback.clamp(0.0, 0.9),
        }
    }
}

impl MixParams {
    /// How long a dropped graph must keep running so the last voice and its
    /// echoes fade below `ECHO_FLOOR`, capped at `MAX_RELEASE_SEC`.
    pub fn release_after_sec(&self) -> f64 {
        let delay = self.delay_time_sec.max(0.0) as f64;
        let feedback = self.feedback.clamp(0.0, 0.9) as f64;
        // The first echo always plays; feedback adds one more per pass
        let passes = if feedback > 0.0 {
            (ECHO_FLOOR.ln() / feedback.ln()).ceil() + 1.0
        } else {
            1.0
        };
        (VOICE_DURATION_SEC + delay * passes).min(MAX_RELEASE_SEC)
    }
}

pub trait AudioBackend {
    /// Persistent nodes. Dropping it releases them once in-flight sound has
    /// died away.
    type Graph;

    /// Build the persistent graph. Called at most once per engine.
    fn build_graph(&mut self, params: &MixParams) -> Result<Self::Graph, AudioError>;

    /// Glide the persistent parameters toward `params` with time constant `tau_sec`.
    fn ramp_mix(&mut self, graph: &Self::Graph, params: &MixParams, tau_sec: f64);

    /// Start a voice that stops and releases its nodes on its own after
    /// `voice.duration_sec`.
    fn start_voice(&mut self, graph: &Self::Graph, voice: &VoiceSpec) -> Result<(), AudioError>;
}

pub enum AudioState<G> {
    Disabled,
    Enabled { graph: G, applied: MixParams },
    /// Enabling failed; tone requests stay no-ops for the rest of the session.
    Unavailable,
}

pub struct AudioEngine<B: AudioBackend> {
    backend: B,
    state: AudioState<B::Graph>,
    rng: StdRng,
}

impl<B: AudioBackend> AudioEngine<B> {
    pub fn new(backend: B, seed: u64) -> Self {
        Self {
            backend,
            state: AudioState::Disabled,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, AudioState::Enabled { .. })
    }

    #[inline]
    pub fn is_unavailable(&self) -> bool {
        matches!(self.state, AudioState::Unavailable)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the persistent graph from an explicit user gesture.
    ///
    /// Idempotent: once enabled (or once known to be unavailable) further
    /// calls do nothing. Returns whether audio is enabled afterwards.
    pub fn enable(&mut self, settings: &Settings) -> bool {
        if !matches!(self.state, AudioState::Disabled) {
            return self.is_enabled();
        }
        let params = MixParams::from(settings);
        match self.backend.build_graph(&params) {
            Ok(graph) => {
                log::info!(
                    "[audio] enabled vol={:.2} delay={:.2}s feedback={:.2}",
                    params.master_gain,
                    params.delay_time_sec,
                    params.feedback
                );
                self.state = AudioState::Enabled {
                    graph,
                    applied: params,
                };
                true
            }
            Err(e) => {
                log::warn!("[audio] {}; continuing without sound", e);
                self.state = AudioState::Unavailable;
                false
            }
        }
    }

    /// Follow a new settings snapshot with smoothed parameter ramps.
    pub fn apply_settings(&mut self, settings: &Settings) {
        if let AudioState::Enabled { graph, applied } = &mut self.state {
            let params = MixParams::from(settings);
            if params != *applied {
                self.backend
                    .ramp_mix(graph, &params, PARAM_SMOOTHING_TAU_SEC);
                *applied = params;
            }
        }
    }

    /// Play one note for a pointer at (`x`, `y`) on a `width` x `height` surface.
    ///
    /// No-op unless enabled or when the geometry is degenerate.
    pub fn play_tone(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        settings: &Settings,
    ) -> Option<VoiceSpec> {
        let AudioState::Enabled { graph, .. } = &self.state else {
            return None;
        };
        let voice = voice_for(x, y, width, height, settings, &mut self.rng)?;
        match self.backend.start_voice(graph, &voice) {
            Ok(()) => Some(voice),
            Err(e) => {
                log::warn!("[audio] voice dropped: {}", e);
                None
            }
        }
    }
}
