//! OS boundary for the capture pipeline
//!
//! Every OS call the state machine and orchestrator issue goes through
//! this one binding context, constructed once at startup, so tests can
//! substitute the whole boundary.

use super::clipboard;
use super::input::{self, KeyStroke};
use super::window::{self, WindowHandle};

/// The OS calls the capture pipeline depends on
pub trait OsBindings: Send + Sync {
    /// Handle of the window currently receiving keyboard input
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Best-effort focus transfer back to `handle`
    fn restore_foreground(&self, handle: WindowHandle) -> bool;

    /// Submit a synthetic key sequence; returns how many events the OS
    /// accepted
    fn send_input(&self, strokes: &[KeyStroke]) -> usize;

    /// Current clipboard text, or an empty string
    fn read_clipboard_text(&self) -> String;
}

/// Bindings backed by the live OS. On non-Windows builds every call is
/// an inert stub.
pub struct NativeBindings;

impl OsBindings for NativeBindings {
    fn foreground_window(&self) -> Option<WindowHandle> {
        window::foreground()
    }

    fn restore_foreground(&self, handle: WindowHandle) -> bool {
        window::restore(handle)
    }

    fn send_input(&self, strokes: &[KeyStroke]) -> usize {
        input::send_input(strokes)
    }

    fn read_clipboard_text(&self) -> String {
        clipboard::read_system_text()
    }
}
