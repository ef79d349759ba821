//! Foreground window bookkeeping
//!
//! Snapshots the window that held focus when the hotkey began and
//! best-effort restores it before the synthetic copy. Restoration can
//! be refused under OS focus-stealing rules; that only lowers the odds
//! the copy lands in the intended application.

/// Opaque handle to a top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// Handle of the window currently receiving keyboard input, if the OS
/// reports one.
#[cfg(windows)]
pub fn foreground() -> Option<WindowHandle> {
    use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

    let hwnd = unsafe { GetForegroundWindow() };
    if hwnd.is_invalid() {
        None
    } else {
        Some(WindowHandle(hwnd.0 as isize))
    }
}

/// Request focus transfer back to `handle`. Returns false when the OS
/// refuses (window closed, focus-stealing prevention).
#[cfg(windows)]
pub fn restore(handle: WindowHandle) -> bool {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

    unsafe { SetForegroundWindow(HWND(handle.0 as *mut core::ffi::c_void)).as_bool() }
}

#[cfg(not(windows))]
pub fn foreground() -> Option<WindowHandle> {
    None
}

#[cfg(not(windows))]
pub fn restore(_handle: WindowHandle) -> bool {
    false
}
