use crate::audio::WebAudioBackend;
use crate::dom::{self, Listener};
use glam::Vec2;
use glimmer_core::{AudioEngine, DragBurst, ParticleEngine, PointerTracker, SettingsStore};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub settings: Rc<RefCell<SettingsStore>>,
    pub particles: Rc<RefCell<ParticleEngine>>,
    pub audio: Rc<RefCell<AudioEngine<WebAudioBackend>>>,
    pub pointer: Rc<RefCell<PointerTracker>>,
}

impl InputWiring {
    fn local_pos(&self, ev: &web::PointerEvent) -> Vec2 {
        let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
        glimmer_core::canvas_local(client, dom::canvas_origin(&self.canvas))
    }

    fn apply(&self, burst: DragBurst) {
        let settings = self.settings.borrow().snapshot();
        {
            let mut particles = self.particles.borrow_mut();
            for pos in burst.spawns {
                particles.spawn(pos, &settings);
            }
        }
        if let Some(pos) = burst.tone {
            let size = dom::canvas_logical_size(&self.canvas);
            self.audio
                .borrow_mut()
                .play_tone(pos.x, pos.y, size.x, size.y, &settings);
        }
    }
}

/// Attach pointer and touch listeners; dropping the returned handles detaches them.
pub fn wire_input_handlers(w: InputWiring) -> Vec<Listener> {
    let mut listeners = Vec::new();
    let canvas_target: &web::EventTarget = w.canvas.as_ref();

    // Keep the browser from turning a drag into a scroll or zoom
    _ = w.canvas.style().set_property("touch-action", "none");
    for kind in ["touchstart", "touchmove"] {
        listeners.push(Listener::active(canvas_target, kind, |ev| ev.prevent_default()));
    }

    listeners.push(wire_pointerdown(&w));
    listeners.push(wire_pointermove(&w));
    if let Some(wnd) = web::window() {
        let wnd_target: &web::EventTarget = wnd.as_ref();
        for kind in ["pointerup", "pointercancel"] {
            listeners.push(wire_pointerup(&w, wnd_target, kind));
        }
    }
    listeners
}

fn wire_pointerdown(w: &InputWiring) -> Listener {
    let w2 = w.clone();
    Listener::active(w.canvas.as_ref(), "pointerdown", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        ev.prevent_default();
        _ = w2.canvas.set_pointer_capture(ev.pointer_id());
        let pos = w2.local_pos(ev);
        let settings = w2.settings.borrow().snapshot();
        let burst = w2.pointer.borrow_mut().press(pos, &settings);
        if let Some(burst) = burst {
            w2.apply(burst);
        }
    })
}

fn wire_pointermove(w: &InputWiring) -> Listener {
    let w2 = w.clone();
    Listener::active(w.canvas.as_ref(), "pointermove", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let pos = w2.local_pos(ev);
        let settings = w2.settings.borrow().snapshot();
        let burst = w2.pointer.borrow_mut().move_to(pos, &settings);
        if let Some(burst) = burst {
            ev.prevent_default();
            w2.apply(burst);
        }
    })
}

fn wire_pointerup(w: &InputWiring, target: &web::EventTarget, kind: &'static str) -> Listener {
    let pointer = w.pointer.clone();
    Listener::new(target, kind, move |_| {
        pointer.borrow_mut().release();
    })
}
