use glimmer_core::{AudioBackend, AudioError, MixParams, VoiceSpec, Waveform, MAX_DELAY_SEC};
use std::cell::Cell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Long-lived nodes: master -> destination, master -> delay <-> feedback, delay -> destination.
pub struct MixGraph {
    ctx: web::AudioContext,
    master_gain: web::GainNode,
    delay: web::DelayNode,
    feedback: web::GainNode,
    /// Tail length for the parameters last applied; read when the graph is dropped.
    release_after_sec: Cell<f64>,
}

/// Close the context once voices already started and their echoes have faded.
impl Drop for MixGraph {
    fn drop(&mut self) {
        let delay_ms = (self.release_after_sec.get() * 1000.0).ceil() as i32;
        let ctx = self.ctx.clone();
        let close = Closure::once_into_js(move || {
            _ = ctx.close();
            log::info!("[audio] context closed");
        });
        let scheduled = web::window().is_some_and(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_0(close.unchecked_ref(), delay_ms)
                .is_ok()
        });
        if !scheduled {
            _ = self.ctx.close();
        }
    }
}

/// WebAudio implementation of the engine's backend.
///
/// The `AudioContext` is only created inside `build_graph`, which the engine
/// calls from the enable gesture, so browsers allow it to start.
#[derive(Default)]
pub struct WebAudioBackend;

fn node_err(node: &'static str) -> impl Fn(wasm_bindgen::JsValue) -> AudioError {
    move |e| AudioError::Node {
        node,
        reason: format!("{:?}", e),
    }
}

fn create_gain(ctx: &web::AudioContext, value: f32, node: &'static str) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(ctx).map_err(node_err(node))?;
    g.gain().set_value(value);
    Ok(g)
}

fn resume(ctx: &web::AudioContext) {
    match ctx.resume() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(_) => log::info!("[audio] context running"),
                Err(e) => log::warn!("[audio] resume rejected: {:?}", e),
            }
        }),
        Err(e) => log::warn!("[audio] resume failed: {:?}", e),
    }
}

/// Create and connect master -> output, master -> delay <-> feedback, delay -> output.
fn wire_graph(
    ctx: &web::AudioContext,
    params: &MixParams,
) -> Result<(web::GainNode, web::DelayNode, web::GainNode), AudioError> {
    let master_gain = create_gain(ctx, params.master_gain, "master gain")?;
    let delay = ctx
        .create_delay_with_max_delay_time(MAX_DELAY_SEC)
        .map_err(node_err("delay"))?;
    delay.delay_time().set_value(params.delay_time_sec);
    let feedback = create_gain(ctx, params.feedback, "feedback gain")?;

    let destination = ctx.destination();
    let wire = |from: &web::AudioNode, to: &web::AudioNode, what: &'static str| {
        from.connect_with_audio_node(to).map(|_| ()).map_err(node_err(what))
    };
    wire(&master_gain, &delay, "master -> delay")?;
    wire(&delay, &feedback, "delay -> feedback")?;
    wire(&feedback, &delay, "feedback -> delay")?;
    wire(&delay, &destination, "delay -> output")?;
    wire(&master_gain, &destination, "master -> output")?;
    Ok((master_gain, delay, feedback))
}

impl AudioBackend for WebAudioBackend {
    type Graph = MixGraph;

    fn build_graph(&mut self, params: &MixParams) -> Result<MixGraph, AudioError> {
        let ctx = web::AudioContext::new().map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
        match wire_graph(&ctx, params) {
            Ok((master_gain, delay, feedback)) => {
                resume(&ctx);
                Ok(MixGraph {
                    ctx,
                    master_gain,
                    delay,
                    feedback,
                    release_after_sec: Cell::new(params.release_after_sec()),
                })
            }
            Err(e) => {
                // Nothing was started yet, so the context can go right away
                _ = ctx.close();
                Err(e)
            }
        }
    }

    fn ramp_mix(&mut self, graph: &MixGraph, params: &MixParams, tau_sec: f64) {
        graph.release_after_sec.set(params.release_after_sec());
        let now = graph.ctx.current_time();
        _ = graph
            .master_gain
            .gain()
            .set_target_at_time(params.master_gain, now, tau_sec);
        _ = graph
            .delay
            .delay_time()
            .set_target_at_time(params.delay_time_sec, now, tau_sec);
        _ = graph
            .feedback
            .gain()
            .set_target_at_time(params.feedback, now, tau_sec);
    }

    fn start_voice(&mut self, graph: &MixGraph, voice: &VoiceSpec) -> Result<(), AudioError> {
        let ctx = &graph.ctx;
        let osc = web::OscillatorNode::new(ctx).map_err(node_err("oscillator"))?;
        osc.set_type(match voice.waveform {
            Waveform::Sine => web::OscillatorType::Sine,
            Waveform::Triangle => web::OscillatorType::Triangle,
        });
        osc.frequency().set_value(voice.frequency_hz);

        let filter = web::BiquadFilterNode::new(ctx).map_err(node_err("lowpass"))?;
        filter.set_type(web::BiquadFilterType::Lowpass);
        filter.frequency().set_value(voice.cutoff_hz);
        filter.q().set_value(voice.resonance);

        let env = web::GainNode::new(ctx).map_err(node_err("envelope"))?;
        let t0 = ctx.current_time();
        let t1 = t0 + voice.duration_sec;
        env.gain()
            .set_value_at_time(voice.start_gain, t0)
            .and_then(|g| g.exponential_ramp_to_value_at_time(voice.end_gain, t1))
            .map_err(node_err("envelope ramp"))?;

        osc.connect_with_audio_node(&filter)
            .and_then(|_| filter.connect_with_audio_node(&env))
            .and_then(|_| env.connect_with_audio_node(&graph.master_gain))
            .map_err(node_err("voice wiring"))?;

        // The voice releases its own nodes once the oscillator has stopped
        let (osc_end, filter_end, env_end) = (osc.clone(), filter.clone(), env.clone());
        let on_ended = Closure::once_into_js(move || {
            _ = osc_end.disconnect();
            _ = filter_end.disconnect();
            _ = env_end.disconnect();
        });
        osc.set_onended(Some(on_ended.unchecked_ref()));

        osc.start_with_when(t0).map_err(node_err("oscillator start"))?;
        osc.stop_with_when(t1).map_err(node_err("oscillator stop"))?;
        Ok(())
    }
}
