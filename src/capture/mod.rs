//! Capture pipeline: synthetic input, clipboard access, foreground
//! window bookkeeping, and the orchestrator that sequences them

pub mod bindings;
pub mod clipboard;
pub mod input;
pub mod orchestrator;
pub mod window;

use std::time::Duration;

/// Non-fatal failures inside a capture run. Each is logged and the run
/// carries on; the worst outcome is an empty capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("input injection rejected, the OS accepted zero events")]
    InjectionRejected,

    #[error("hotkey keys were not released within {0:?}")]
    ReleaseTimeout(Duration),
}
