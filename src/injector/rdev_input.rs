//! Cross-platform injection via `rdev::simulate`
//!
//! rdev drives SendInput on Windows, XTest on X11 and CGEvent on macOS.

use rdev::{simulate, EventType};
use tracing::debug;

use super::InputInjector;
use crate::keymap::{button_to_rdev, symbol_to_key};
use crate::symbol::Symbol;

#[derive(Default)]
pub struct RdevInjector;

impl RdevInjector {
    pub fn new() -> Self {
        Self
    }

    fn send(&self, symbol: Symbol, down: bool) {
        let event = match symbol {
            Symbol::Pointer(button) if down => EventType::ButtonPress(button_to_rdev(button)),
            Symbol::Pointer(button) => EventType::ButtonRelease(button_to_rdev(button)),
            _ => {
                let key = symbol_to_key(symbol).unwrap_or_else(|| {
                    debug!("No rdev key for {}, using space", symbol);
                    rdev::Key::Space
                });
                if down {
                    EventType::KeyPress(key)
                } else {
                    EventType::KeyRelease(key)
                }
            }
        };

        if let Err(e) = simulate(&event) {
            debug!("Failed to simulate {:?}: {:?}", event, e);
        }
    }
}

impl InputInjector for RdevInjector {
    fn press(&self, symbol: Symbol) {
        self.send(symbol, true);
    }

    fn release(&self, symbol: Symbol) {
        self.send(symbol, false);
    }

    fn name(&self) -> &'static str {
        "rdev"
    }
}
