pub mod animation;
pub mod camera;
pub mod input;
pub mod physics;
pub mod player;
pub mod plugin;
pub mod ron;
pub use crate::ron as ron_loader;

pub mod settings;
pub mod debug;
