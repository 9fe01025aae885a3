use crate::constants::FRAME_STALL_SEC;
use crate::dom;
use crate::render::CanvasSurface;
use glimmer_core::{ParticleEngine, Renderer, SettingsStore, Viewport};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub particles: Rc<RefCell<ParticleEngine>>,
    pub settings: Rc<RefCell<SettingsStore>>,
    pub canvas: web::HtmlCanvasElement,
    pub surface: CanvasSurface,
    pub renderer: Renderer,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        if dt_sec > FRAME_STALL_SEC {
            log::debug!("[frame] stalled for {:.0} ms", dt_sec * 1000.0);
        }

        let size = dom::canvas_logical_size(&self.canvas);
        let settings = self.settings.borrow().snapshot();

        let mut particles = self.particles.borrow_mut();
        particles.step();
        self.renderer.draw(
            &mut self.surface,
            Viewport::new(size.x, size.y),
            particles.particles(),
            &settings,
        );
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A self re-arming `requestAnimationFrame` loop that can be cancelled.
pub struct FrameLoop {
    tick: Tick,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn start(frame_ctx: FrameContext) -> Self {
        let frame_ctx = Rc::new(RefCell::new(frame_ctx));
        let tick: Tick = Rc::new(RefCell::new(None));
        let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let tick_clone = tick.clone();
        let pending_clone = pending.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending_clone.set(None);
            frame_ctx.borrow_mut().frame();
            // Cancelled from inside the frame: the closure is gone, stop here
            if let Some(cb) = tick_clone.borrow().as_ref() {
                pending_clone.set(request_frame(cb));
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = tick.borrow().as_ref() {
            pending.set(request_frame(cb));
        }
        log::info!("[frame] loop started");
        Self { tick, pending }
    }

    /// Cancel the pending frame and drop the loop closure.
    pub fn cancel(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        // Dropping the closure also releases the frame context it captured
        if self.tick.borrow_mut().take().is_some() {
            log::info!("[frame] loop cancelled");
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn request_frame(cb: &Closure<dyn FnMut()>) -> Option<i32> {
    let w = web::window()?;
    match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(e) => {
            log::error!("[frame] requestAnimationFrame failed: {:?}", e);
            None
        }
    }
}
