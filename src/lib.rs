pub mod animation;
pub mod buttons;
pub mod joystick;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod scene;
pub mod ui;
pub mod world;

pub mod lighting;
pub mod music;
pub mod settings;
pub mod debug;
