//! Headless audition: plays a scripted drag gesture through the shared core.
//!
//! The gesture runs on the main thread at display rate while cpal pulls
//! samples on its own thread, so the two clocks stay independent just as they
//! are in the browser.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use glam::Vec2;
use glimmer_core::{
    AudioEngine, ParticleEngine, PointerTracker, Renderer, Settings, SettingsStore,
    SoftwareBackend, SoftwareMixer, Viewport,
};

const FRAME: Duration = Duration::from_micros(16_667);
const VIEW: Vec2 = Vec2::new(900.0, 600.0);
const DEFAULT_SECONDS: f32 = 8.0;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let seconds = std::env::args()
        .nth(1)
        .and_then(|a| a.parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SECONDS);

    let mut settings = SettingsStore::new(Settings::default());
    // Optional JSON overrides, same keys as the web settings panel
    if let Ok(json) = std::env::var("GLIMMER_SETTINGS") {
        match settings.apply_json(&json) {
            Ok(rejected) => {
                for e in rejected {
                    log::warn!("[settings] ignored: {}", e);
                }
            }
            Err(e) => log::warn!("[settings] ignored GLIMMER_SETTINGS: {}", e),
        }
    }

    let (mixer, stream) = match start_audio_output() {
        Ok(pair) => (pair.0, Some(pair.1)),
        Err(e) => {
            log::warn!("[audio] {}; running silently", e);
            (Arc::new(Mutex::new(SoftwareMixer::new(48_000.0))), None)
        }
    };

    let mut audio = AudioEngine::new(SoftwareBackend::new(mixer.clone()), 7);
    if stream.is_some() {
        audio.enable(&settings.snapshot());
    }

    let mut particles = ParticleEngine::new(11);
    let mut pointer = PointerTracker::new(13);
    let renderer = Renderer::default();
    let viewport = Viewport::new(VIEW.x, VIEW.y);
    let mut stats = GlyphCounter::default();

    let start = Instant::now();
    let mut next_frame = start;
    let mut frames = 0u64;
    let mut tones = 0u64;
    let mut peak = 0usize;

    while start.elapsed().as_secs_f32() < seconds {
        let t = start.elapsed().as_secs_f32();
        let snapshot = settings.snapshot();

        // Drag for 1.5 s, lift for 0.5 s
        let pressed = (t % 2.0) < 1.5;
        let pos = gesture_position(t);
        let burst = match (pressed, pointer.state().pressed) {
            (true, false) => pointer.press(pos, &snapshot),
            (true, true) => pointer.move_to(pos, &snapshot),
            (false, true) => {
                pointer.release();
                None
            }
            (false, false) => pointer.move_to(pos, &snapshot),
        };
        if let Some(burst) = burst {
            for p in burst.spawns {
                particles.spawn(p, &snapshot);
            }
            if let Some(p) = burst.tone {
                if audio.play_tone(p.x, p.y, VIEW.x, VIEW.y, &snapshot).is_some() {
                    tones += 1;
                }
            }
        }

        particles.step();
        renderer.draw(&mut stats, viewport, particles.particles(), &snapshot);
        peak = peak.max(particles.len());
        frames += 1;

        if frames % 60 == 0 {
            let voices = mixer.lock().map(|m| m.active_voices()).unwrap_or(0);
            log::info!(
                "[frame] t={:.1}s particles={} voices={} glyphs={} reflections={}",
                t,
                particles.len(),
                voices,
                stats.discs,
                stats.lines
            );
            // Sweep the colour mode halfway through to exercise settings updates
            if frames == 240 {
                _ = settings.update("colorMode", "fixed");
                _ = settings.update("masterVol", 0.25);
                audio.apply_settings(&settings.snapshot());
            }
        }
        stats = GlyphCounter::default();

        next_frame += FRAME;
        if let Some(wait) = next_frame.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }

    log::info!(
        "[session] done: {} frames, {} tones, peak {} particles",
        frames,
        tones,
        peak
    );
    // Let the last voices and echoes ring out
    thread::sleep(Duration::from_millis(800));
    drop(stream);
    Ok(())
}

/// A figure-eight sweep across the whole surface.
fn gesture_position(t: f32) -> Vec2 {
    Vec2::new(
        VIEW.x * (0.5 + 0.45 * (t * 0.9).sin()),
        VIEW.y * (0.5 + 0.4 * (t * 1.8).sin()),
    )
}

/// Counts what a frame would paint; there is no window here.
#[derive(Default)]
struct GlyphCounter {
    discs: usize,
    lines: usize,
}

impl glimmer_core::Surface for GlyphCounter {
    fn fill_rect(&mut self, _origin: Vec2, _size: Vec2, _paint: &glimmer_core::Paint) {}

    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _paint: &glimmer_core::Paint) {
        self.lines += 1;
    }

    fn disc(&mut self, _center: Vec2, _radius: f32, _paint: &glimmer_core::Paint) {
        self.discs += 1;
    }
}

// ---------------- Native audio (cpal) ----------------

fn start_audio_output() -> anyhow::Result<(Arc<Mutex<SoftwareMixer>>, cpal::Stream)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    log::info!(
        "[audio] {} @ {} Hz, {} ch, {:?}",
        device.name().unwrap_or_else(|_| "output".into()),
        sample_rate,
        channels,
        config.sample_format()
    );

    let mixer = Arc::new(Mutex::new(SoftwareMixer::new(sample_rate)));
    let err_fn = |err: cpal::StreamError| log::error!("[audio] stream error: {err}");

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &config.into(), channels, mixer.clone(), err_fn)?
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &config.into(), channels, mixer.clone(), err_fn)?
        }
        cpal::SampleFormat::U16 => {
            build_stream::<u16>(&device, &config.into(), channels, mixer.clone(), err_fn)?
        }
        other => anyhow::bail!("unsupported sample format {:?}", other),
    };
    stream.play()?;
    Ok((mixer, stream))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: Arc<Mutex<SoftwareMixer>>,
    err_fn: impl FnMut(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            match mixer.lock() {
                Ok(mut m) => m.render_interleaved(&mut scratch, channels),
                Err(_) => scratch.fill(0.0),
            }
            for (out, s) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample_(*s);
            }
        },
        err_fn,
        None,
    )
}
