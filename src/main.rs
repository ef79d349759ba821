//! textgrab-daemon: Background daemon that captures the foreground
//! selection via a global hotkey
//!
//! This daemon runs in the background and provides:
//! - Global Ctrl+Alt+Space detection via a low-level keyboard hook
//! - Capture of the foreground application's selected text by
//!   synthesizing Ctrl+C and reading the clipboard
//! - Asynchronous delivery of the captured text to a consumer
//!
//! Scope:
//! - NO popup window, tray icon, or LLM request handling; the
//!   presentation layer subscribes to capture events and owns those

mod capture;
mod config;
mod events;
mod hotkey;
mod lifecycle;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::capture::bindings::NativeBindings;
use crate::config::Config;
use crate::events::CaptureEvent;
use crate::hotkey::{HotkeyMachine, KeyListener};
use crate::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "textgrab-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    info!(?config.timing, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // Key listener -> state machine
    let (key_tx, key_rx) = mpsc::channel(64);
    // Capture workers -> presentation layer
    let (event_tx, _event_rx) = broadcast::channel::<CaptureEvent>(16);

    // One binding context for every OS call the pipeline issues
    let bindings = Arc::new(NativeBindings);

    // Create the hotkey state machine
    let machine = HotkeyMachine::new(bindings);

    // Start the key listener (runs on a dedicated thread)
    let listener = KeyListener::new(key_tx);
    match listener.start() {
        Ok(()) => {
            info!("key listener started");
        }
        Err(e) => {
            error!(?e, "failed to start key listener");
            warn!("continuing without hotkey support");
        }
    }

    // Subscribe to capture events for delivery logging
    let mut capture_rx = event_tx.subscribe();

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the state machine (processes key events, spawns captures)
        _ = machine.run(key_rx, config.timing, event_tx.clone()) => {
            info!("hotkey state machine exited");
        }

        // Stand-in consumer: the presentation layer subscribes the same
        // way and decides what to display and whether to call a backend.
        _ = async {
            loop {
                match capture_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "capture delivered");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "capture event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("capture event consumer exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    listener.stop();

    info!("textgrab-daemon stopped");

    Ok(())
}
