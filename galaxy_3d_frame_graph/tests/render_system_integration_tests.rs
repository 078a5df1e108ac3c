//! Integration tests for shared render systems
//!
//! Several "renderers" holding handles on the same system kind, as a window
//! manager would.
//! No GPU required.
//!
//! Run with: cargo test --test render_system_integration_tests

use galaxy_3d_frame_graph::galaxy3d::render_system::{RenderSystem, RenderSystemHandle, RenderSystemRegistry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

static CREATED: AtomicUsize = AtomicUsize::new(0);

struct Backend {
    released: AtomicBool,
}

impl RenderSystem for Backend {
    fn shutdown(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Stand-in for a window renderer: only keeps its system alive
struct WindowRenderer {
    _system: RenderSystemHandle,
}

impl WindowRenderer {
    fn open(registry: &RenderSystemRegistry, kind: &str, backend: &Arc<Backend>) -> Self {
        let backend = backend.clone();
        let system = registry
            .acquire(kind, move || {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Ok(backend as Arc<dyn RenderSystem>)
            })
            .unwrap();
        Self { _system: system }
    }
}

#[test]
fn test_integration_windows_share_backend_until_last_closes() {
    let registry = RenderSystemRegistry::new();
    let backend = Arc::new(Backend { released: AtomicBool::new(false) });
    let created_before = CREATED.load(Ordering::SeqCst);

    let main = WindowRenderer::open(&registry, "windows", &backend);
    let tools = WindowRenderer::open(&registry, "windows", &backend);
    let preview = WindowRenderer::open(&registry, "windows", &backend);

    assert_eq!(CREATED.load(Ordering::SeqCst) - created_before, 1);
    assert_eq!(registry.ref_count("windows"), 3);

    drop(tools);
    drop(main);
    assert!(!backend.released.load(Ordering::SeqCst));
    assert_eq!(registry.active_kinds(), vec!["windows".to_string()]);

    drop(preview);
    assert!(backend.released.load(Ordering::SeqCst));
    assert!(registry.active_kinds().is_empty());
}

#[test]
fn test_integration_registries_are_isolated() {
    let first = RenderSystemRegistry::new();
    let second = RenderSystemRegistry::new();
    let backend = Arc::new(Backend { released: AtomicBool::new(false) });

    let _a = WindowRenderer::open(&first, "isolated", &backend);
    let _b = WindowRenderer::open(&second, "isolated", &backend);

    assert_eq!(first.ref_count("isolated"), 1);
    assert_eq!(second.ref_count("isolated"), 1);
}
