//! Global key listener using a Windows low-level keyboard hook
//!
//! Installs WH_KEYBOARD_LL on a dedicated thread and pumps messages so
//! the hook callback fires. Raw virtual-key transitions are normalized
//! into [`KeyEvent`]s and forwarded to the hotkey state machine.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
#[cfg(windows)]
use tracing::{error, info};

use super::keys::KeyEvent;

/// Global key listener that monitors press/release events system-wide
pub struct KeyListener {
    #[cfg_attr(not(windows), allow(dead_code))]
    event_tx: mpsc::Sender<KeyEvent>,
    running: Arc<AtomicBool>,
    #[cfg_attr(not(windows), allow(dead_code))]
    hook_thread_id: Arc<AtomicU32>,
}

/// Errors that can occur in the key listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("key listener is already running")]
    AlreadyRunning,

    #[error("failed to install low-level keyboard hook")]
    HookInstall,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("global key listening is not supported on this platform")]
    Unsupported,
}

impl KeyListener {
    /// Create a new key listener
    pub fn new(event_tx: mpsc::Sender<KeyEvent>) -> Self {
        Self {
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
            hook_thread_id: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Start the key listener
    ///
    /// Spawns a dedicated thread that installs the keyboard hook and
    /// pumps messages until `stop()` is called. The monitoring thread
    /// never blocks on I/O or timed waits.
    #[cfg(windows)]
    pub fn start(&self) -> Result<(), ListenerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyRunning);
        }

        platform::HOOK_TX
            .set(self.event_tx.clone())
            .map_err(|_| ListenerError::AlreadyRunning)?;

        let running = Arc::clone(&self.running);
        let thread_id = Arc::clone(&self.hook_thread_id);

        std::thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                info!("key listener thread started");

                if let Err(e) = platform::run_message_loop(&running, &thread_id) {
                    error!(?e, "key listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("key listener thread stopped");
            })
            .map_err(|e| ListenerError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    #[cfg(not(windows))]
    pub fn start(&self) -> Result<(), ListenerError> {
        Err(ListenerError::Unsupported)
    }

    /// Stop the key listener
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        #[cfg(windows)]
        platform::post_quit(self.hook_thread_id.load(Ordering::SeqCst));
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(windows)]
mod platform {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::OnceLock;

    use tokio::sync::mpsc;
    use tracing::{info, warn};
    use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::System::Threading::GetCurrentThreadId;
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
        TranslateMessage, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL,
        WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
    };

    use super::super::keys::{KeyEvent, KeyIdentity};
    use super::ListenerError;

    /// Channel the hook callback forwards events into. Hook procedures
    /// carry no user-data pointer, so this is process-global.
    pub(super) static HOOK_TX: OnceLock<mpsc::Sender<KeyEvent>> = OnceLock::new();

    /// Install the hook and pump messages until WM_QUIT
    pub(super) fn run_message_loop(
        running: &AtomicBool,
        thread_id: &AtomicU32,
    ) -> Result<(), ListenerError> {
        unsafe {
            thread_id.store(GetCurrentThreadId(), Ordering::SeqCst);

            let module: HINSTANCE = GetModuleHandleW(None).unwrap_or_default().into();
            let hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), Some(module), 0)
                .map_err(|_| ListenerError::HookInstall)?;

            info!("low-level keyboard hook installed");

            // Hook callbacks are delivered while this loop pumps.
            let mut msg = MSG::default();
            while running.load(Ordering::SeqCst) {
                if !GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    // WM_QUIT
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            if UnhookWindowsHookEx(hook).is_err() {
                warn!("failed to remove keyboard hook");
            }
        }

        Ok(())
    }

    /// Wake the pump thread so it can exit
    pub(super) fn post_quit(thread_id: u32) {
        if thread_id == 0 {
            return;
        }
        unsafe {
            let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
    }

    /// WH_KEYBOARD_LL callback. Must return quickly: Windows silently
    /// unhooks callbacks that stall the input chain.
    unsafe extern "system" fn keyboard_hook_proc(
        code: i32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        if code == HC_ACTION as i32 {
            let message = wparam.0 as u32;
            let pressed = matches!(message, WM_KEYDOWN | WM_SYSKEYDOWN);
            let released = matches!(message, WM_KEYUP | WM_SYSKEYUP);

            if pressed || released {
                let kb = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
                let event = KeyEvent {
                    identity: KeyIdentity::normalize(kb.vkCode),
                    pressed,
                };
                if let Some(tx) = HOOK_TX.get() {
                    // try_send keeps the callback non-blocking; a full
                    // channel drops the event rather than stalling input.
                    let _ = tx.try_send(event);
                }
            }
        }

        CallNextHookEx(None, code, wparam, lparam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let listener = KeyListener::new(tx);
        assert!(!listener.is_running());
    }

    #[test]
    fn test_stop_without_start_is_a_no_op() {
        let (tx, _rx) = mpsc::channel(32);
        let listener = KeyListener::new(tx);
        listener.stop();
        assert!(!listener.is_running());
    }
}
