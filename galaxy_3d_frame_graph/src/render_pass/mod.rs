/// Render pass description module - agnostic vocabulary, config, builder and presets

pub mod types;
pub mod config;
pub mod builder;
pub mod presets;

pub use types::*;
pub use config::*;
pub use builder::*;
