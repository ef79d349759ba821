//! Synthetic keyboard input
//!
//! Builds the fixed key sequences the orchestrator injects and submits
//! them to the OS input queue in a single call. The `INPUT` record
//! layout must match the documented Win32 size exactly, or SendInput
//! silently rejects the whole batch.

use crate::hotkey::keys::vk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// One synthetic key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub vk: u16,
    pub direction: KeyDirection,
    pub extended: bool,
}

impl KeyStroke {
    pub const fn down(vk: u16) -> Self {
        Self {
            vk,
            direction: KeyDirection::Down,
            extended: false,
        }
    }

    pub const fn up(vk: u16) -> Self {
        Self {
            vk,
            direction: KeyDirection::Up,
            extended: false,
        }
    }

    pub const fn up_extended(vk: u16) -> Self {
        Self {
            vk,
            direction: KeyDirection::Up,
            extended: true,
        }
    }
}

/// Key-up events for every hotkey key, including the extended-key
/// variants, clearing any held state the OS still attributes to the
/// physical press.
pub fn soft_release_sequence() -> [KeyStroke; 5] {
    [
        KeyStroke::up(vk::CONTROL),
        KeyStroke::up_extended(vk::CONTROL),
        KeyStroke::up(vk::MENU),
        KeyStroke::up_extended(vk::MENU),
        KeyStroke::up(vk::SPACE),
    ]
}

/// Ctrl+C in the order the shortcut needs: both keys must register as
/// held together before either comes back up.
pub fn copy_sequence() -> [KeyStroke; 4] {
    [
        KeyStroke::down(vk::CONTROL),
        KeyStroke::down(vk::C),
        KeyStroke::up(vk::C),
        KeyStroke::up(vk::CONTROL),
    ]
}

/// Submit a key sequence to the OS input queue as one SendInput call.
///
/// Returns the number of events the OS accepted; zero means total
/// failure and is the caller's warning to surface.
#[cfg(windows)]
pub fn send_input(strokes: &[KeyStroke]) -> usize {
    use std::mem;

    use tracing::warn;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
        KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
    };

    // SendInput rejects every event if cbSize disagrees with the
    // documented structure size (40 bytes on 64-bit Windows).
    #[cfg(target_pointer_width = "64")]
    const _: () = assert!(mem::size_of::<INPUT>() == 40);

    let inputs: Vec<INPUT> = strokes
        .iter()
        .map(|stroke| {
            let mut flags = KEYBD_EVENT_FLAGS(0);
            if stroke.direction == KeyDirection::Up {
                flags |= KEYEVENTF_KEYUP;
            }
            if stroke.extended {
                flags |= KEYEVENTF_EXTENDEDKEY;
            }
            INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: VIRTUAL_KEY(stroke.vk),
                        wScan: 0,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            }
        })
        .collect();

    let accepted = unsafe { SendInput(&inputs, mem::size_of::<INPUT>() as i32) } as usize;
    if accepted < strokes.len() {
        warn!(
            accepted,
            requested = strokes.len(),
            "SendInput accepted fewer events than submitted"
        );
    }
    accepted
}

#[cfg(not(windows))]
pub fn send_input(_strokes: &[KeyStroke]) -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_sequence_order_is_fixed() {
        let sequence = copy_sequence();
        assert_eq!(
            sequence,
            [
                KeyStroke::down(vk::CONTROL),
                KeyStroke::down(vk::C),
                KeyStroke::up(vk::C),
                KeyStroke::up(vk::CONTROL),
            ]
        );
    }

    #[test]
    fn test_copy_sequence_downs_precede_ups_per_key() {
        let sequence = copy_sequence();
        for key in [vk::CONTROL, vk::C] {
            let down = sequence
                .iter()
                .position(|s| s.vk == key && s.direction == KeyDirection::Down)
                .unwrap();
            let up = sequence
                .iter()
                .position(|s| s.vk == key && s.direction == KeyDirection::Up)
                .unwrap();
            assert!(down < up);
        }
    }

    #[test]
    fn test_soft_release_is_all_key_ups() {
        let sequence = soft_release_sequence();
        assert!(sequence.iter().all(|s| s.direction == KeyDirection::Up));
    }

    #[test]
    fn test_soft_release_covers_extended_modifier_variants() {
        let sequence = soft_release_sequence();
        assert!(sequence.contains(&KeyStroke::up_extended(vk::CONTROL)));
        assert!(sequence.contains(&KeyStroke::up_extended(vk::MENU)));
        assert!(sequence.contains(&KeyStroke::up(vk::SPACE)));
    }
}
