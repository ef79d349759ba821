//! Hotkey module for global keyboard event monitoring
//!
//! A low-level listener adapts OS key callbacks into a normalized
//! event stream; the state machine consumes it and fires captures.

pub mod keys;
mod listener;
mod machine;

pub use keys::{KeyEvent, KeyIdentity};
pub use listener::{KeyListener, ListenerError};
pub use machine::HotkeyMachine;
