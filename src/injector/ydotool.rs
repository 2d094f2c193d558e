//! Input injection using ydotool
//!
//! Uses ydotool to send mouse and keyboard events via uinput at the kernel level.
//! Works on Wayland by bypassing the display server entirely.
//! Requires ydotoold daemon to be running: sudo systemctl enable --now ydotoold

use std::process::Command;
use tracing::{debug, info};

use super::InputInjector;
use crate::symbol::{MouseButton, Symbol};
use crate::ClickerError;

const KEY_SPACE: u32 = 57;

/// Get the ydotool socket path
fn get_socket_path() -> String {
    let uid = unsafe { libc::getuid() };
    format!("/run/user/{}/.ydotool_socket", uid)
}

/// Convert a symbol to a Linux evdev key code (US layout positions)
fn key_code(symbol: Symbol) -> Option<u32> {
    let code = match symbol {
        Symbol::Space => KEY_SPACE,
        Symbol::Enter => 28,
        Symbol::Shift => 42,
        Symbol::Ctrl => 29,
        Symbol::Alt => 56,
        Symbol::Tab => 15,
        Symbol::Backspace => 14,
        Symbol::Escape => 1,
        Symbol::Up => 103,
        Symbol::Left => 105,
        Symbol::Right => 106,
        Symbol::Down => 108,
        Symbol::Function(n @ 1..=10) => 58 + u32::from(n),
        Symbol::Function(11) => 87,
        Symbol::Function(12) => 88,
        Symbol::Char(c) => return char_code(c),
        _ => return None,
    };
    Some(code)
}

fn char_code(c: char) -> Option<u32> {
    const ROWS: &[(&str, u32)] = &[
        ("1234567890-=", 2),
        ("qwertyuiop[]", 16),
        ("asdfghjkl;'`", 30),
        ("\\zxcvbnm,./", 43),
    ];
    ROWS.iter().find_map(|(row, first)| {
        row.chars()
            .position(|ch| ch == c)
            .map(|i| first + i as u32)
    })
}

/// ydotool `click` code: low bits select the button, 0x40 = down, 0x80 = up
fn button_code(button: MouseButton, down: bool) -> String {
    let base = match button {
        MouseButton::Left => 0x00,
        MouseButton::Right => 0x01,
        MouseButton::Middle => 0x02,
    };
    let flag = if down { 0x40 } else { 0x80 };
    format!("0x{:02X}", base | flag)
}

/// Injector that sends synthetic inputs via ydotool
pub struct YdotoolInjector {
    socket_path: String,
}

impl YdotoolInjector {
    /// Create a new YdotoolInjector
    ///
    /// Requires ydotool to be installed and ydotoold daemon running.
    pub fn new() -> Result<Self, ClickerError> {
        let output = Command::new("which")
            .arg("ydotool")
            .output()
            .map_err(|e| ClickerError::InputAccess(format!("Failed to check for ydotool: {}", e)))?;

        if !output.status.success() {
            return Err(ClickerError::InputAccess(
                "ydotool not found. Install it and start ydotoold".to_string(),
            ));
        }

        info!("ydotool injector ready");
        Ok(Self {
            socket_path: get_socket_path(),
        })
    }

    /// Run a ydotool command with the socket path set
    fn run_ydotool(&self, args: &[&str]) -> Result<(), ClickerError> {
        let output = Command::new("ydotool")
            .env("YDOTOOL_SOCKET", &self.socket_path)
            .args(args)
            .output()
            .map_err(|e| ClickerError::SendEvent(format!("Failed to run ydotool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClickerError::SendEvent(format!("ydotool failed: {}", stderr)));
        }

        Ok(())
    }

    fn send(&self, symbol: Symbol, down: bool) {
        let result = match symbol {
            Symbol::Pointer(button) => self.run_ydotool(&["click", &button_code(button, down)]),
            _ => {
                let code = key_code(symbol).unwrap_or(KEY_SPACE);
                // ydotool key format: keycode:1 (down) / keycode:0 (up)
                let key_arg = format!("{}:{}", code, u8::from(down));
                self.run_ydotool(&["key", &key_arg])
            }
        };

        if let Err(e) = result {
            debug!("Failed to inject {}: {}", symbol, e);
        }
    }
}

impl InputInjector for YdotoolInjector {
    fn press(&self, symbol: Symbol) {
        self.send(symbol, true);
    }

    fn release(&self, symbol: Symbol) {
        self.send(symbol, false);
    }

    fn name(&self) -> &'static str {
        "ydotool"
    }
}
