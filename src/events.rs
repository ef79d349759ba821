//! Events delivered to the presentation layer
//!
//! The capture pipeline's only outward contract: exactly one event per
//! orchestration run, with empty text on any unrecoverable failure.

use serde::{Deserialize, Serialize};

/// Events emitted by the capture pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// A capture run finished. `text` is empty when every step failed.
    TextCaptured {
        /// Character count of the captured text
        chars: usize,
        text: String,
    },
}

impl std::fmt::Display for CaptureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureEvent::TextCaptured { chars, .. } => {
                write!(f, "TEXT_CAPTURED ({} chars)", chars)
            }
        }
    }
}
