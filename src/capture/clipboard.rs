//! Clipboard text extraction
//!
//! Open/read/close against the system clipboard for Unicode text.
//! Clipboard ownership is a system-wide singleton: it must be released
//! on every exit path, or every other application's clipboard access
//! blocks until this process exits.

use tracing::warn;

/// Failures while reading the clipboard. All map to an empty capture.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard is held by another process")]
    Unavailable,

    #[error("clipboard holds no unicode text")]
    NoTextFormat,

    #[error("failed to lock clipboard memory")]
    LockFailure,
}

/// Low-level clipboard operations. `read_text` may only be called
/// between a successful `open` and the matching `close`.
pub trait ClipboardAccess {
    fn open(&self) -> Result<(), ClipboardError>;
    fn read_text(&self) -> Result<String, ClipboardError>;
    fn close(&self);
}

/// Read the clipboard's Unicode text, or an empty string on any
/// failure. Once `open` succeeds, `close` runs on every path.
pub fn read_unicode_text<C: ClipboardAccess>(clipboard: &C) -> String {
    if let Err(e) = clipboard.open() {
        warn!(error = %e, "clipboard open failed");
        return String::new();
    }

    let result = clipboard.read_text();
    clipboard.close();

    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "clipboard read failed");
            String::new()
        }
    }
}

/// Read the live system clipboard
#[cfg(windows)]
pub fn read_system_text() -> String {
    read_unicode_text(&system::SystemClipboard)
}

#[cfg(not(windows))]
pub fn read_system_text() -> String {
    String::new()
}

#[cfg(windows)]
mod system {
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::System::Memory::{GlobalLock, GlobalUnlock, HGLOBAL};

    use super::{ClipboardAccess, ClipboardError};

    /// CF_UNICODETEXT
    const UNICODE_TEXT_FORMAT: u32 = 13;

    /// The real Win32 clipboard
    pub struct SystemClipboard;

    impl ClipboardAccess for SystemClipboard {
        fn open(&self) -> Result<(), ClipboardError> {
            unsafe { OpenClipboard(None).map_err(|_| ClipboardError::Unavailable) }
        }

        fn read_text(&self) -> Result<String, ClipboardError> {
            unsafe {
                let handle = GetClipboardData(UNICODE_TEXT_FORMAT)
                    .map_err(|_| ClipboardError::NoTextFormat)?;

                let global = HGLOBAL(handle.0);
                let ptr = GlobalLock(global);
                if ptr.is_null() {
                    return Err(ClipboardError::LockFailure);
                }

                let text = wide_string_at(ptr as *const u16);
                let _ = GlobalUnlock(global);
                Ok(text)
            }
        }

        fn close(&self) {
            unsafe {
                let _ = CloseClipboard();
            }
        }
    }

    /// Copy out a null-terminated UTF-16 string
    unsafe fn wide_string_at(mut ptr: *const u16) -> String {
        let mut units = Vec::new();
        while *ptr != 0 {
            units.push(*ptr);
            ptr = ptr.add(1);
        }
        String::from_utf16_lossy(&units)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    struct MockClipboard {
        held_elsewhere: Cell<bool>,
        text: RefCell<Option<String>>,
        lock_fails: Cell<bool>,
        open: Cell<bool>,
        opens: Cell<u32>,
        closes: Cell<u32>,
    }

    impl ClipboardAccess for MockClipboard {
        fn open(&self) -> Result<(), ClipboardError> {
            if self.held_elsewhere.get() {
                return Err(ClipboardError::Unavailable);
            }
            self.open.set(true);
            self.opens.set(self.opens.get() + 1);
            Ok(())
        }

        fn read_text(&self) -> Result<String, ClipboardError> {
            assert!(self.open.get(), "read_text outside open/close");
            if self.lock_fails.get() {
                return Err(ClipboardError::LockFailure);
            }
            self.text
                .borrow()
                .clone()
                .ok_or(ClipboardError::NoTextFormat)
        }

        fn close(&self) {
            self.open.set(false);
            self.closes.set(self.closes.get() + 1);
        }
    }

    #[test]
    fn test_reads_text() {
        let clipboard = MockClipboard::default();
        *clipboard.text.borrow_mut() = Some("hello world".to_string());

        assert_eq!(read_unicode_text(&clipboard), "hello world");
        assert!(!clipboard.open.get());
    }

    #[test]
    fn test_no_text_format_returns_empty_and_closes() {
        let clipboard = MockClipboard::default();

        assert_eq!(read_unicode_text(&clipboard), "");
        assert_eq!(clipboard.opens.get(), 1);
        assert_eq!(clipboard.closes.get(), 1);
        assert!(!clipboard.open.get());
    }

    #[test]
    fn test_lock_failure_returns_empty_and_closes() {
        let clipboard = MockClipboard::default();
        *clipboard.text.borrow_mut() = Some("hello".to_string());
        clipboard.lock_fails.set(true);

        assert_eq!(read_unicode_text(&clipboard), "");
        assert_eq!(clipboard.opens.get(), 1);
        assert_eq!(clipboard.closes.get(), 1);
    }

    #[test]
    fn test_unavailable_clipboard_leaves_no_ownership() {
        let clipboard = MockClipboard::default();
        *clipboard.text.borrow_mut() = Some("hello world".to_string());
        clipboard.held_elsewhere.set(true);

        assert_eq!(read_unicode_text(&clipboard), "");
        assert_eq!(clipboard.opens.get(), 0);
        assert!(!clipboard.open.get());

        // Once the other holder lets go, a subsequent read succeeds.
        clipboard.held_elsewhere.set(false);
        assert_eq!(read_unicode_text(&clipboard), "hello world");
        assert!(!clipboard.open.get());
    }
}
