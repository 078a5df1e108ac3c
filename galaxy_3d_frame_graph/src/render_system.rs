/// Render system registry - shared per-kind systems with reference-counted lifetime
///
/// Several renderers of the same kind share one system (a backend instance, a
/// shader cache, ...). The first `acquire()` of a kind initializes it, every
/// handle keeps it alive, and dropping the last handle shuts it down.
///
/// The registry is an ordinary value: the context that manages renderers owns it
/// and hands it to whoever needs a system.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use galaxy_3d_frame_graph::galaxy3d::render_system::{RenderSystem, RenderSystemRegistry};
///
/// struct Backend;
/// impl RenderSystem for Backend {}
///
/// let registry = RenderSystemRegistry::new();
/// let first = registry.acquire("vulkan", || Ok(Arc::new(Backend)))?;
/// let second = registry.acquire("vulkan", || unreachable!())?;
/// assert_eq!(registry.ref_count("vulkan"), 2);
///
/// drop(first);
/// drop(second);
/// assert!(!registry.is_active("vulkan"));
/// # Ok::<(), galaxy_3d_frame_graph::galaxy3d::Error>(())
/// ```

use std::sync::{Arc, Mutex, Weak};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_info};

const SOURCE: &str = "galaxy3d::render_system";

/// System shared by every renderer of one kind
pub trait RenderSystem: Send + Sync {
    /// Called once, when the last handle is dropped
    fn shutdown(&self) {}
}

struct SystemEntry {
    ref_count: usize,
    system: Arc<dyn RenderSystem>,
}

type Entries = Mutex<FxHashMap<String, SystemEntry>>;

/// Owner of the per-kind systems
pub struct RenderSystemRegistry {
    entries: Arc<Entries>,
}

impl RenderSystemRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Get a handle on the system of `kind`, initializing it with `init` if none is active
    ///
    /// `init` runs only for the first handle; if it fails nothing is registered.
    pub fn acquire<F>(&self, kind: &str, init: F) -> Result<RenderSystemHandle>
    where
        F: FnOnce() -> Result<Arc<dyn RenderSystem>>,
    {
        let mut entries = self.entries.lock()
            .map_err(|_| Error::BackendError("Render system registry lock poisoned".to_string()))?;

        let system = match entries.get_mut(kind) {
            Some(entry) => {
                entry.ref_count += 1;
                entry.system.clone()
            }
            None => {
                let system = init()?;
                entries.insert(kind.to_string(), SystemEntry { ref_count: 1, system: system.clone() });
                engine_info!(SOURCE, "Render system '{}' initialized", kind);
                system
            }
        };

        Ok(RenderSystemHandle {
            kind: kind.to_string(),
            system,
            entries: Arc::downgrade(&self.entries),
        })
    }

    /// Live handles on `kind` (0 when inactive)
    pub fn ref_count(&self, kind: &str) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.get(kind).map_or(0, |entry| entry.ref_count))
            .unwrap_or(0)
    }

    pub fn is_active(&self, kind: &str) -> bool {
        self.ref_count(kind) > 0
    }

    /// Kinds with at least one live handle, sorted
    pub fn active_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        kinds.sort();
        kinds
    }
}

impl Default for RenderSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Counted reference on a shared render system
///
/// Cloning adds a reference; dropping the last one shuts the system down.
/// Handles may outlive the registry, in which case the system is simply released.
pub struct RenderSystemHandle {
    kind: String,
    system: Arc<dyn RenderSystem>,
    entries: Weak<Entries>,
}

impl RenderSystemHandle {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn system(&self) -> &Arc<dyn RenderSystem> {
        &self.system
    }
}

impl Clone for RenderSystemHandle {
    fn clone(&self) -> Self {
        if let Some(entries) = self.entries.upgrade() {
            if let Ok(mut entries) = entries.lock() {
                if let Some(entry) = entries.get_mut(&self.kind) {
                    entry.ref_count += 1;
                }
            }
        }

        Self {
            kind: self.kind.clone(),
            system: self.system.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl Drop for RenderSystemHandle {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };
        let Ok(mut entries) = entries.lock() else {
            return;
        };

        let released = match entries.get_mut(&self.kind) {
            Some(entry) => {
                entry.ref_count -= 1;
                entry.ref_count == 0
            }
            None => false,
        };

        if released {
            if let Some(entry) = entries.remove(&self.kind) {
                // Unlock before running user code
                drop(entries);
                entry.system.shutdown();
                engine_debug!(SOURCE, "Render system '{}' released", self.kind);
            }
        }
    }
}

#[cfg(test)]
#[path = "render_system_tests.rs"]
mod tests;
