//! X11 injection through the XTEST extension
//!
//! Owns its own display connection. Keys resolve through the server's live
//! keyboard mapping (keysym -> keycode), so characters follow the active
//! layout rather than a fixed US table.

use std::collections::HashMap;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt as _, Keycode, Window, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT,
    KEY_PRESS_EVENT, KEY_RELEASE_EVENT,
};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use super::InputInjector;
use crate::symbol::{MouseButton, Symbol};
use crate::ClickerError;

const XK_SPACE: u32 = 0x0020;

/// X11 keysym for a symbol (Latin-1 keysyms equal their ASCII code)
fn keysym_for(symbol: Symbol) -> Option<u32> {
    let keysym = match symbol {
        Symbol::Space => XK_SPACE,
        Symbol::Enter => 0xff0d,
        Symbol::Shift => 0xffe1,
        Symbol::Ctrl => 0xffe3,
        Symbol::Alt => 0xffe9,
        Symbol::Tab => 0xff09,
        Symbol::Backspace => 0xff08,
        Symbol::Escape => 0xff1b,
        Symbol::Left => 0xff51,
        Symbol::Up => 0xff52,
        Symbol::Right => 0xff53,
        Symbol::Down => 0xff54,
        Symbol::Function(n) if (1..=12).contains(&n) => 0xffbe + u32::from(n) - 1,
        Symbol::Char(c) if c.is_ascii_graphic() => c as u32,
        _ => return None,
    };
    Some(keysym)
}

fn button_code(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
    }
}

/// Injector backed by an XTEST-capable X server
pub struct XTestInjector {
    conn: RustConnection,
    root: Window,
    keycodes: HashMap<u32, Keycode>,
    fallback: Keycode,
}

impl XTestInjector {
    /// Connect to the default display and load its keyboard mapping
    pub fn new() -> Result<Self, ClickerError> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| ClickerError::Display(format!("Failed to connect to X11: {}", e)))?;

        conn.xtest_get_version(2, 2)
            .map_err(|e| ClickerError::Display(e.to_string()))?
            .reply()
            .map_err(|e| ClickerError::InputAccess(format!("XTEST extension missing: {}", e)))?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| ClickerError::Display(format!("No screen {}", screen_num)))?;

        let keycodes = load_keycodes(&conn)?;
        let fallback = keycodes.get(&XK_SPACE).copied().ok_or_else(|| {
            ClickerError::InputAccess("keyboard mapping has no space key".to_string())
        })?;

        info!("XTest injector ready ({} keysyms mapped)", keycodes.len());
        Ok(Self {
            conn,
            root,
            keycodes,
            fallback,
        })
    }

    fn keycode(&self, symbol: Symbol) -> Keycode {
        keysym_for(symbol)
            .and_then(|keysym| self.keycodes.get(&keysym).copied())
            .unwrap_or_else(|| {
                debug!("No keycode for {}, using space", symbol);
                self.fallback
            })
    }

    fn fake_input(&self, event_type: u8, detail: u8) {
        let sent = self
            .conn
            .xtest_fake_input(event_type, detail, x11rb::CURRENT_TIME, self.root, 0, 0, 0)
            .and_then(|_cookie| self.conn.flush());

        if let Err(e) = sent {
            debug!("XTest fake input failed: {}", e);
        }
    }
}

fn load_keycodes(conn: &RustConnection) -> Result<HashMap<u32, Keycode>, ClickerError> {
    let setup = conn.setup();
    let min = setup.min_keycode;
    let count = setup.max_keycode.saturating_sub(min).saturating_add(1);

    let mapping = conn
        .get_keyboard_mapping(min, count)
        .map_err(|e| ClickerError::Display(e.to_string()))?
        .reply()
        .map_err(|e| ClickerError::Display(format!("Failed to read keyboard mapping: {}", e)))?;

    Ok(keycodes_from_mapping(
        min,
        usize::from(mapping.keysyms_per_keycode),
        &mapping.keysyms,
    ))
}

/// Build a keysym -> keycode table, preferring unshifted (first column) hits
fn keycodes_from_mapping(min: Keycode, per_keycode: usize, keysyms: &[u32]) -> HashMap<u32, Keycode> {
    let mut table = HashMap::new();
    if per_keycode == 0 {
        return table;
    }

    for column in 0..per_keycode {
        for (row, chunk) in keysyms.chunks(per_keycode).enumerate() {
            let Some(&keysym) = chunk.get(column) else {
                continue;
            };
            let Ok(offset) = u8::try_from(row) else {
                break;
            };
            if keysym != 0 {
                table.entry(keysym).or_insert(min.saturating_add(offset));
            }
        }
    }
    table
}

impl InputInjector for XTestInjector {
    fn press(&self, symbol: Symbol) {
        match symbol {
            Symbol::Pointer(button) => self.fake_input(BUTTON_PRESS_EVENT, button_code(button)),
            _ => self.fake_input(KEY_PRESS_EVENT, self.keycode(symbol)),
        }
    }

    fn release(&self, symbol: Symbol) {
        match symbol {
            Symbol::Pointer(button) => self.fake_input(BUTTON_RELEASE_EVENT, button_code(button)),
            _ => self.fake_input(KEY_RELEASE_EVENT, self.keycode(symbol)),
        }
    }

    fn name(&self) -> &'static str {
        "xtest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keysyms_for_named_and_ascii() {
        assert_eq!(keysym_for(Symbol::Space), Some(0x20));
        assert_eq!(keysym_for(Symbol::Function(1)), Some(0xffbe));
        assert_eq!(keysym_for(Symbol::Function(12)), Some(0xffc9));
        assert_eq!(keysym_for(Symbol::Char('a')), Some(0x61));
        assert_eq!(keysym_for(Symbol::Pointer(MouseButton::Left)), None);
    }

    #[test]
    fn mapping_prefers_unshifted_column() {
        // keycode 10: '1' / '!', keycode 11: '!' unshifted (odd layout), keycode 12: 'a' / 'A'
        let keysyms = [0x31, 0x21, 0x21, 0x00, 0x61, 0x41];
        let table = keycodes_from_mapping(10, 2, &keysyms);

        assert_eq!(table.get(&0x31), Some(&10));
        assert_eq!(table.get(&0x21), Some(&11));
        assert_eq!(table.get(&0x61), Some(&12));
        assert_eq!(table.get(&0x41), Some(&12));
        assert!(!table.contains_key(&0));
    }

    #[test]
    fn empty_mapping_yields_empty_table() {
        assert!(keycodes_from_mapping(8, 0, &[]).is_empty());
    }
}
