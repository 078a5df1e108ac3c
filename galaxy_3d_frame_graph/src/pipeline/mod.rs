/// Pipeline module - render stages and the multi-stage frame graph

pub mod render_stage;
pub mod render_pipeline;

pub use render_stage::*;
pub use render_pipeline::*;
