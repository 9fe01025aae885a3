use web_sys as web;

/// What the sound prompt should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundPrompt {
    /// Waiting for the gesture that may create the audio context.
    Waiting,
    /// Audio is running; the prompt gets out of the way.
    Enabled,
    /// The browser refused; visuals keep running without sound.
    Unavailable,
}

pub fn set_sound_prompt(document: &web::Document, element_id: &str, prompt: SoundPrompt) {
    let Some(el) = document.get_element_by_id(element_id) else {
        return;
    };
    let cl = el.class_list();
    match prompt {
        SoundPrompt::Waiting => {
            _ = cl.remove_1("hidden");
            _ = el.remove_attribute("style");
        }
        SoundPrompt::Enabled => {
            _ = cl.add_1("hidden");
            // Pages without a .hidden rule still lose the control
            _ = el.set_attribute("style", "display:none");
        }
        SoundPrompt::Unavailable => {
            _ = cl.add_1("unavailable");
            _ = el.set_attribute("aria-disabled", "true");
            el.set_text_content(Some("Sound unavailable"));
        }
    }
}
