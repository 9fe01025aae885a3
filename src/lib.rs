#![cfg(target_arch = "wasm32")]
use glimmer_core::SettingValue;
use session::Session;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod overlay;
mod render;
mod session;

thread_local! {
    // At most one mounted instrument per page
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("glimmer-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let Some(canvas_el) = document.get_element_by_id(constants::CANVAS_ID) else {
        log::info!("no #{} on this page; waiting for mount()", constants::CANVAS_ID);
        return Ok(());
    };
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    install(Session::mount(canvas)?);
    Ok(())
}

fn install(session: Session) {
    SESSION.with(|slot| {
        // Tear the old session down before the new one takes over
        drop(slot.borrow_mut().take());
        *slot.borrow_mut() = Some(session);
    });
}

fn with_session<T>(f: impl FnOnce(&Session) -> T) -> Option<T> {
    SESSION.with(|slot| slot.borrow().as_ref().map(f))
}

/// Mount the instrument on a canvas element, replacing any previous session.
#[wasm_bindgen]
pub fn mount(canvas: web::HtmlCanvasElement) -> Result<(), JsValue> {
    let session = Session::mount(canvas).map_err(|e| JsValue::from_str(&e.to_string()))?;
    install(session);
    Ok(())
}

/// Build the audio graph. Must be called from a user gesture.
#[wasm_bindgen]
pub fn enable_audio() -> bool {
    with_session(|s| s.enable_audio()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn update_setting(key: &str, value: JsValue) {
    let value = if let Some(b) = value.as_bool() {
        SettingValue::Bool(b)
    } else if let Some(n) = value.as_f64() {
        SettingValue::Number(n)
    } else if let Some(t) = value.as_string() {
        SettingValue::Text(t)
    } else {
        log::warn!("[settings] {} ignored: unsupported value {:?}", key, value);
        return;
    };
    if let Some(Err(e)) = with_session(|s| s.update_setting(key, value)) {
        log::warn!("[settings] ignored: {}", e);
    }
}

#[wasm_bindgen]
pub fn apply_settings(json: &str) {
    if let Some(Err(e)) = with_session(|s| s.apply_settings_json(json)) {
        log::warn!("[settings] ignored: {}", e);
    }
}

#[wasm_bindgen]
pub fn reset_settings() {
    with_session(|s| s.reset_settings());
}

#[wasm_bindgen]
pub fn settings_json() -> Option<String> {
    with_session(|s| s.settings_json())
}

#[wasm_bindgen]
pub fn particle_count() -> usize {
    with_session(|s| s.particle_count()).unwrap_or(0)
}

/// Cancel the frame loop and detach all listeners.
#[wasm_bindgen]
pub fn teardown() {
    SESSION.with(|slot| drop(slot.borrow_mut().take()));
}
