/// Fence and Semaphore traits - GPU synchronization primitives

use crate::error::Result;

/// CPU-visible completion signal
pub trait Fence: Send + Sync {
    /// Block until signaled
    ///
    /// Returns `Ok(false)` when `timeout_ns` elapses first.
    fn wait(&self, timeout_ns: u64) -> Result<bool>;

    /// Return to the unsignaled state
    fn reset(&self) -> Result<()>;
}

/// GPU-to-GPU ordering signal
pub trait Semaphore: Send + Sync {}
