use crate::audio::WebAudioBackend;
use crate::constants::ENABLE_SOUND_ID;
use crate::dom::{self, Listener};
use crate::events;
use crate::frame::{FrameContext, FrameLoop};
use crate::overlay::{self, SoundPrompt};
use crate::render::CanvasSurface;
use glimmer_core::{
    AudioEngine, ParticleEngine, PointerTracker, Renderer, SettingValue, SettingsError,
    SettingsStore,
};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Everything one mounted instrument owns. Dropping it cancels the frame loop
/// and detaches every listener; voices already playing finish on their own.
pub struct Session {
    settings: Rc<RefCell<SettingsStore>>,
    particles: Rc<RefCell<ParticleEngine>>,
    audio: Rc<RefCell<AudioEngine<WebAudioBackend>>>,
    frame_loop: FrameLoop,
    listeners: Vec<Listener>,
}

impl Session {
    pub fn mount(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx: web::CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
            .dyn_into()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let settings = Rc::new(RefCell::new(SettingsStore::default()));
        let particles = Rc::new(RefCell::new(ParticleEngine::new(rand::random())));
        let audio = Rc::new(RefCell::new(AudioEngine::new(
            WebAudioBackend,
            rand::random(),
        )));
        let pointer = Rc::new(RefCell::new(PointerTracker::new(rand::random())));

        let mut listeners = Vec::new();

        // DPR scaling happens here and on resize only, never per frame
        dom::sync_canvas_backing_size(&canvas, &ctx);
        if let Some(window) = web::window() {
            let (canvas_resize, ctx_resize) = (canvas.clone(), ctx.clone());
            listeners.push(Listener::new(window.as_ref(), "resize", move |_| {
                dom::sync_canvas_backing_size(&canvas_resize, &ctx_resize);
            }));
        }

        listeners.extend(events::wire_input_handlers(events::InputWiring {
            canvas: canvas.clone(),
            settings: settings.clone(),
            particles: particles.clone(),
            audio: audio.clone(),
            pointer,
        }));

        if let Some(document) = dom::window_document() {
            overlay::set_sound_prompt(&document, ENABLE_SOUND_ID, SoundPrompt::Waiting);
            let (audio_click, settings_click) = (audio.clone(), settings.clone());
            let doc_click = document.clone();
            if let Some(l) = dom::on_click(&document, ENABLE_SOUND_ID, move || {
                let prompt = if enable(&audio_click, &settings_click) {
                    SoundPrompt::Enabled
                } else {
                    SoundPrompt::Unavailable
                };
                overlay::set_sound_prompt(&doc_click, ENABLE_SOUND_ID, prompt);
            }) {
                listeners.push(l);
            }
        }

        let frame_loop = FrameLoop::start(FrameContext {
            particles: particles.clone(),
            settings: settings.clone(),
            canvas,
            surface: CanvasSurface::new(ctx),
            renderer: Renderer::default(),
            last_instant: Instant::now(),
        });

        log::info!("[session] mounted with {} listeners", listeners.len());
        Ok(Self {
            settings,
            particles,
            audio,
            frame_loop,
            listeners,
        })
    }

    /// Enable audio from a host-page gesture, keeping the built-in prompt in sync.
    pub fn enable_audio(&self) -> bool {
        let enabled = enable(&self.audio, &self.settings);
        if let Some(document) = dom::window_document() {
            let prompt = if enabled {
                SoundPrompt::Enabled
            } else {
                SoundPrompt::Unavailable
            };
            overlay::set_sound_prompt(&document, ENABLE_SOUND_ID, prompt);
        }
        enabled
    }

    pub fn update_setting(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.settings.borrow_mut().update(key, value)?;
        self.follow_settings();
        Ok(())
    }

    pub fn apply_settings_json(&self, json: &str) -> Result<(), SettingsError> {
        let rejected = self.settings.borrow_mut().apply_json(json)?;
        for e in rejected {
            log::warn!("[settings] ignored: {}", e);
        }
        self.follow_settings();
        Ok(())
    }

    pub fn reset_settings(&self) {
        self.settings.borrow_mut().reset();
        self.follow_settings();
    }

    pub fn settings_json(&self) -> String {
        self.settings.borrow().to_json()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.borrow().len()
    }

    fn follow_settings(&self) {
        let snapshot = self.settings.borrow().snapshot();
        self.audio.borrow_mut().apply_settings(&snapshot);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.frame_loop.cancel();
        let detached = self.listeners.len();
        self.listeners.clear();
        log::info!("[session] torn down, {} listeners detached", detached);
    }
}

fn enable(
    audio: &Rc<RefCell<AudioEngine<WebAudioBackend>>>,
    settings: &Rc<RefCell<SettingsStore>>,
) -> bool {
    let snapshot = settings.borrow().snapshot();
    audio.borrow_mut().enable(&snapshot)
}
