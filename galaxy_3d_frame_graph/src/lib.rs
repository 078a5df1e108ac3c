/*!
# Galaxy 3D Frame Graph

Backend-agnostic render-pass description and multi-stage frame graph.

This crate describes render passes in a portable vocabulary, drives a fixed
sequence of render stages over any backend implementing the device traits, and
runs the frame-in-flight protocol. Backend implementations (Vulkan, ...) live in
their own crates and implement `GraphicsDevice` and the resource traits.

## Architecture

- **RenderPassBuilder / RenderPassConfig**: validated, backend-agnostic pass descriptions
- **presets**: named pass configurations consumed by the frame graph
- **GraphicsDevice**: factory trait for render passes, images, framebuffers, sync objects
- **FrameSync**: per-frame-slot semaphores and fences, per-image fence tags
- **RenderPipeline**: shadow, depth pre-pass, light culling, forward, transparency,
  custom post-process and final composite stages
- **Renderer**: per-window driver (acquire, record, submit, present, rebuild)
- **RenderSystemRegistry**: reference-counted systems shared by renderers of one kind
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod render_pass;
pub mod graphics_device;
pub mod frame_sync;
pub mod pipeline;
pub mod renderer;
pub mod render_system;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logger holder
    pub use crate::engine::Engine;

    // Renderer driver
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Render pass descriptions
    pub mod render_pass {
        pub use crate::render_pass::*;
    }

    // Render sub-module: device traits, sync, frame graph and driver
    pub mod render {
        pub use crate::graphics_device::*;
        pub use crate::frame_sync::FrameSync;
        pub use crate::pipeline::*;
        pub use crate::renderer::*;
    }

    // Shared render systems
    pub mod render_system {
        pub use crate::render_system::*;
    }
}
