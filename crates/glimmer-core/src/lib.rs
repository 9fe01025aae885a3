pub mod audio;
pub mod constants;
pub mod input;
pub mod mixer;
pub mod music;
pub mod particles;
pub mod render;
pub mod settings;

pub use audio::*;
pub use constants::*;
pub use input::*;
pub use mixer::*;
pub use music::*;
pub use particles::*;
pub use render::*;
pub use settings::*;
