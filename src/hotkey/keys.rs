//! Key identity normalization and hotkey set definitions
//!
//! Collapses the left/right physical variants of a modifier into one
//! canonical identity so a press registered under one variant is
//! cleared by a release of either.

/// Windows virtual-key codes used by the hotkey pipeline
pub mod vk {
    /// Generic Control
    pub const CONTROL: u16 = 0x11;
    /// Generic Alt (VK_MENU)
    pub const MENU: u16 = 0x12;
    pub const SPACE: u16 = 0x20;
    pub const C: u16 = 0x43;
    pub const LCONTROL: u16 = 0xA2;
    pub const RCONTROL: u16 = 0xA3;
    pub const LMENU: u16 = 0xA4;
    pub const RMENU: u16 = 0xA5;
}

/// Canonical identity of a physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    Control,
    Alt,
    Space,
    C,
    /// Any key outside the hotkey set, carrying its raw virtual-key code
    Other(u16),
}

impl KeyIdentity {
    /// Canonical identity for a raw virtual-key code.
    ///
    /// Total over all representable codes: unknown keys pass through
    /// unchanged as their own identity. Used identically on the press
    /// and release paths.
    pub fn normalize(vk_code: u32) -> Self {
        match vk_code as u16 {
            vk::CONTROL | vk::LCONTROL | vk::RCONTROL => KeyIdentity::Control,
            vk::MENU | vk::LMENU | vk::RMENU => KeyIdentity::Alt,
            vk::SPACE => KeyIdentity::Space,
            vk::C => KeyIdentity::C,
            other => KeyIdentity::Other(other),
        }
    }

    /// Whether this key keeps the release barrier closed while held.
    ///
    /// The set is wider than the trigger combination: it also matches
    /// the raw left/right modifier codes, which decide "all
    /// hotkey-related keys are physically up".
    pub fn blocks_release(self) -> bool {
        matches!(
            self,
            KeyIdentity::Control
                | KeyIdentity::Alt
                | KeyIdentity::Space
                | KeyIdentity::Other(vk::LCONTROL)
                | KeyIdentity::Other(vk::RCONTROL)
                | KeyIdentity::Other(vk::LMENU)
                | KeyIdentity::Other(vk::RMENU)
        )
    }

    /// Whether a press of this key refreshes the foreground-window
    /// snapshot.
    pub fn refreshes_window_snapshot(self) -> bool {
        matches!(self, KeyIdentity::Control | KeyIdentity::Alt)
    }
}

/// The fixed trigger combination: Ctrl + Alt + Space
pub const TRIGGER_COMBINATION: [KeyIdentity; 3] =
    [KeyIdentity::Control, KeyIdentity::Alt, KeyIdentity::Space];

/// One normalized key transition from the low-level listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub identity: KeyIdentity,
    pub pressed: bool,
}
