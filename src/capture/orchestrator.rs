//! Capture orchestration
//!
//! One run per trigger, spawned off the monitoring context so a slow
//! capture never costs key events. Every step is attempted exactly
//! once; any failure degrades the result toward an empty capture
//! instead of aborting the run.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::CaptureTiming;
use crate::events::CaptureEvent;

use super::bindings::OsBindings;
use super::input::{copy_sequence, soft_release_sequence};
use super::window::WindowHandle;
use super::CaptureError;

/// Everything a capture run needs from the trigger that started it
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    /// Foreground window snapshotted when the hotkey began
    pub window: Option<WindowHandle>,
}

/// Run one capture: wait for release, soft-release the hotkey keys,
/// restore focus, inject Ctrl+C, read the clipboard, emit the result.
///
/// The emitted event is delivered unconditionally, exactly once, with
/// an empty string when every step failed.
pub async fn run_capture(
    bindings: Arc<dyn OsBindings>,
    request: CaptureRequest,
    mut released: watch::Receiver<bool>,
    timing: CaptureTiming,
    event_tx: broadcast::Sender<CaptureEvent>,
) {
    debug!(window = ?request.window, "capture run started");

    // Wait for the physical keys to come up before injecting anything;
    // a user holding the combination indefinitely hits the timeout.
    match timeout(timing.release_timeout, released.wait_for(|up| *up)).await {
        Ok(Ok(_)) => {}
        Ok(Err(_)) => debug!("release barrier closed"),
        Err(_) => warn!(
            error = %CaptureError::ReleaseTimeout(timing.release_timeout),
            "continuing with keys possibly still down"
        ),
    }
    sleep(timing.settle).await;

    // Clear residual held-key state so the synthetic Ctrl+C below is
    // not read as a repeat of the hotkey chord.
    if bindings.send_input(&soft_release_sequence()) == 0 {
        warn!(error = %CaptureError::InjectionRejected, "soft release failed");
    }
    sleep(timing.settle).await;

    if let Some(handle) = request.window {
        if !bindings.restore_foreground(handle) {
            debug!(?handle, "focus restore refused");
        }
        sleep(timing.focus_settle).await;
    }

    if bindings.send_input(&copy_sequence()) == 0 {
        warn!(error = %CaptureError::InjectionRejected, "copy command failed");
    }

    // No signal exists for "copy completed"; give the foreground app's
    // copy handler time to fill the clipboard.
    sleep(timing.copy_settle).await;

    let text = bindings.read_clipboard_text();
    let chars = text.chars().count();
    info!(chars, "capture run finished");

    let _ = event_tx.send(CaptureEvent::TextCaptured { chars, text });
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::capture::input::KeyStroke;

    struct MockBindings {
        clipboard: Mutex<String>,
        reject_input: bool,
        restore_refused: bool,
        sent: Mutex<Vec<Vec<KeyStroke>>>,
        restored: Mutex<Vec<WindowHandle>>,
    }

    impl MockBindings {
        fn new(clipboard: &str) -> Self {
            Self {
                clipboard: Mutex::new(clipboard.to_string()),
                reject_input: false,
                restore_refused: false,
                sent: Mutex::new(Vec::new()),
                restored: Mutex::new(Vec::new()),
            }
        }
    }

    impl OsBindings for MockBindings {
        fn foreground_window(&self) -> Option<WindowHandle> {
            None
        }

        fn restore_foreground(&self, handle: WindowHandle) -> bool {
            self.restored.lock().unwrap().push(handle);
            !self.restore_refused
        }

        fn send_input(&self, strokes: &[KeyStroke]) -> usize {
            self.sent.lock().unwrap().push(strokes.to_vec());
            if self.reject_input {
                0
            } else {
                strokes.len()
            }
        }

        fn read_clipboard_text(&self) -> String {
            self.clipboard.lock().unwrap().clone()
        }
    }

    fn test_timing() -> CaptureTiming {
        CaptureTiming {
            release_timeout: Duration::from_millis(50),
            settle: Duration::from_millis(1),
            focus_settle: Duration::from_millis(1),
            copy_settle: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_full_run_emits_clipboard_text() {
        let bindings = Arc::new(MockBindings::new("hello world"));
        let (released_tx, released_rx) = watch::channel(true);
        let (event_tx, mut event_rx) = broadcast::channel(4);
        let request = CaptureRequest {
            window: Some(WindowHandle(42)),
        };

        run_capture(
            Arc::clone(&bindings) as Arc<dyn OsBindings>,
            request,
            released_rx,
            test_timing(),
            event_tx,
        )
        .await;
        drop(released_tx);

        let CaptureEvent::TextCaptured { chars, text } = event_rx.recv().await.unwrap();
        assert_eq!(text, "hello world");
        assert_eq!(chars, 11);

        // Soft release first, then the copy command, in order.
        let sent = bindings.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], soft_release_sequence().to_vec());
        assert_eq!(sent[1], copy_sequence().to_vec());

        assert_eq!(*bindings.restored.lock().unwrap(), vec![WindowHandle(42)]);
    }

    #[tokio::test]
    async fn test_rejected_injection_still_emits() {
        let mut mock = MockBindings::new("");
        mock.reject_input = true;
        let bindings: Arc<dyn OsBindings> = Arc::new(mock);
        let (_released_tx, released_rx) = watch::channel(true);
        let (event_tx, mut event_rx) = broadcast::channel(4);

        let run = run_capture(
            bindings,
            CaptureRequest { window: None },
            released_rx,
            test_timing(),
            event_tx,
        );
        // The run must terminate rather than hang.
        timeout(Duration::from_secs(1), run).await.unwrap();

        let CaptureEvent::TextCaptured { chars, text } = event_rx.recv().await.unwrap();
        assert_eq!(text, "");
        assert_eq!(chars, 0);
    }

    #[tokio::test]
    async fn test_release_timeout_degrades_instead_of_hanging() {
        let bindings: Arc<dyn OsBindings> = Arc::new(MockBindings::new("late"));
        // Barrier never signals: keys held for the whole run.
        let (released_tx, released_rx) = watch::channel(false);
        let (event_tx, mut event_rx) = broadcast::channel(4);

        let run = run_capture(
            bindings,
            CaptureRequest { window: None },
            released_rx,
            test_timing(),
            event_tx,
        );
        timeout(Duration::from_secs(1), run).await.unwrap();
        drop(released_tx);

        let CaptureEvent::TextCaptured { text, .. } = event_rx.recv().await.unwrap();
        assert_eq!(text, "late");
    }

    #[tokio::test]
    async fn test_refused_focus_restore_does_not_abort() {
        let mut mock = MockBindings::new("still captured");
        mock.restore_refused = true;
        let bindings = Arc::new(mock);
        let (_released_tx, released_rx) = watch::channel(true);
        let (event_tx, mut event_rx) = broadcast::channel(4);

        run_capture(
            Arc::clone(&bindings) as Arc<dyn OsBindings>,
            CaptureRequest {
                window: Some(WindowHandle(7)),
            },
            released_rx,
            test_timing(),
            event_tx,
        )
        .await;

        assert_eq!(bindings.restored.lock().unwrap().len(), 1);
        let CaptureEvent::TextCaptured { text, .. } = event_rx.recv().await.unwrap();
        assert_eq!(text, "still captured");
    }

    #[tokio::test]
    async fn test_no_window_snapshot_skips_restore() {
        let bindings = Arc::new(MockBindings::new(""));
        let (_released_tx, released_rx) = watch::channel(true);
        let (event_tx, mut event_rx) = broadcast::channel(4);

        run_capture(
            Arc::clone(&bindings) as Arc<dyn OsBindings>,
            CaptureRequest { window: None },
            released_rx,
            test_timing(),
            event_tx,
        )
        .await;

        assert!(bindings.restored.lock().unwrap().is_empty());
        assert!(event_rx.recv().await.is_ok());
    }
}
