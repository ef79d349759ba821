//! Hotkey state machine
//!
//! Consumes the normalized key-event stream, tracks the currently held
//! key set, and fires a capture exactly once per press episode of
//! Ctrl+Alt+Space. Also owns the release barrier the orchestrator
//! waits on before injecting synthetic input.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use crate::capture::bindings::OsBindings;
use crate::capture::orchestrator::{run_capture, CaptureRequest};
use crate::capture::window::WindowHandle;
use crate::config::CaptureTiming;
use crate::events::CaptureEvent;

use super::keys::{KeyEvent, KeyIdentity, TRIGGER_COMBINATION};

/// Edge-triggered detector for the capture combination
pub struct HotkeyMachine {
    /// Currently held keys, mutated only from the event-stream context
    pressed: HashSet<KeyIdentity>,
    /// Suppresses re-triggering until Space is released
    triggered: bool,
    /// Foreground window captured when Ctrl or Alt was last pressed
    window: Option<WindowHandle>,
    /// Release barrier: true when no hotkey-related key is held
    released_tx: watch::Sender<bool>,
    bindings: Arc<dyn OsBindings>,
}

impl HotkeyMachine {
    pub fn new(bindings: Arc<dyn OsBindings>) -> Self {
        // The barrier starts signaled: nothing is held at startup.
        let (released_tx, _) = watch::channel(true);
        Self {
            pressed: HashSet::new(),
            triggered: false,
            window: None,
            released_tx,
            bindings,
        }
    }

    /// Subscribe to the release barrier. `true` means no hotkey-related
    /// key is physically down.
    pub fn release_barrier(&self) -> watch::Receiver<bool> {
        self.released_tx.subscribe()
    }

    /// Run the state machine, spawning one capture worker per trigger
    pub async fn run(
        mut self,
        mut key_rx: mpsc::Receiver<KeyEvent>,
        timing: CaptureTiming,
        event_tx: broadcast::Sender<CaptureEvent>,
    ) {
        info!("hotkey state machine started");

        while let Some(event) = key_rx.recv().await {
            if let Some(request) = self.handle_event(event) {
                let bindings = Arc::clone(&self.bindings);
                let barrier = self.release_barrier();
                let events = event_tx.clone();
                tokio::spawn(run_capture(bindings, request, barrier, timing, events));
            }
        }

        info!("hotkey state machine stopped");
    }

    /// Feed one key transition. Returns a capture request on the rising
    /// edge of the trigger combination.
    pub fn handle_event(&mut self, event: KeyEvent) -> Option<CaptureRequest> {
        if event.pressed {
            self.on_press(event.identity)
        } else {
            self.on_release(event.identity);
            None
        }
    }

    fn on_press(&mut self, identity: KeyIdentity) -> Option<CaptureRequest> {
        if identity.refreshes_window_snapshot() {
            // Snapshot before the combination completes: by the time
            // all three keys are down, focus may already have moved.
            // A null handle keeps the previous snapshot.
            if let Some(handle) = self.bindings.foreground_window() {
                self.window = Some(handle);
            }
        }

        self.pressed.insert(identity);

        let combination_down = TRIGGER_COMBINATION.iter().all(|k| self.pressed.contains(k));
        if combination_down && !self.triggered {
            self.triggered = true;
            self.released_tx.send_replace(false);
            debug!(window = ?self.window, "trigger combination detected");
            return Some(CaptureRequest {
                window: self.window,
            });
        }

        None
    }

    fn on_release(&mut self, identity: KeyIdentity) {
        self.pressed.remove(&identity);

        // Releasing Space re-arms the trigger for the next episode.
        if identity == KeyIdentity::Space {
            self.triggered = false;
        }

        if !self.pressed.iter().any(|k| k.blocks_release()) {
            self.released_tx.send_replace(true);
        }
    }
}
