//! Symbolic keys and pointer buttons
//!
//! A `Symbol` names what gets injected (or which hotkey was pressed) without
//! tying the rest of the crate to any platform key code.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::ClickerError;

/// Pointer buttons that can be clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// The fixed set of injectable / bindable symbols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    #[default]
    Space,
    Enter,
    Shift,
    Ctrl,
    Alt,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    /// F1..=F12
    Function(u8),
    /// A single printable ASCII character, stored lowercase
    Char(char),
    Pointer(MouseButton),
}

impl Symbol {
    /// Resolve a user-supplied name, falling back to space when it is unknown
    pub fn resolve(name: &str) -> Self {
        match name.parse() {
            Ok(symbol) => symbol,
            Err(_) => {
                warn!("Unknown key '{}', falling back to space", name);
                Symbol::Space
            }
        }
    }

    /// The pointer button, if this symbol is one
    pub fn button(self) -> Option<MouseButton> {
        match self {
            Symbol::Pointer(button) => Some(button),
            _ => None,
        }
    }
}

impl FromStr for Symbol {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();

        let symbol = match name.as_str() {
            "space" => Symbol::Space,
            "enter" | "return" => Symbol::Enter,
            "shift" => Symbol::Shift,
            "ctrl" | "control" => Symbol::Ctrl,
            "alt" => Symbol::Alt,
            "tab" => Symbol::Tab,
            "backspace" => Symbol::Backspace,
            "escape" | "esc" => Symbol::Escape,
            "up" | "arrowup" => Symbol::Up,
            "down" | "arrowdown" => Symbol::Down,
            "left" | "arrowleft" => Symbol::Left,
            "right" | "arrowright" => Symbol::Right,
            "mouse" | "mouse-left" | "lmb" | "click" => Symbol::Pointer(MouseButton::Left),
            "mouse-right" | "rmb" => Symbol::Pointer(MouseButton::Right),
            "mouse-middle" | "mmb" => Symbol::Pointer(MouseButton::Middle),
            _ => {
                if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        return Ok(Symbol::Function(n));
                    }
                }

                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_graphic() => Symbol::Char(c),
                    _ => return Err(ClickerError::InvalidKey(s.to_string())),
                }
            }
        };

        Ok(symbol)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Space => write!(f, "space"),
            Symbol::Enter => write!(f, "enter"),
            Symbol::Shift => write!(f, "shift"),
            Symbol::Ctrl => write!(f, "ctrl"),
            Symbol::Alt => write!(f, "alt"),
            Symbol::Tab => write!(f, "tab"),
            Symbol::Backspace => write!(f, "backspace"),
            Symbol::Escape => write!(f, "escape"),
            Symbol::Up => write!(f, "up"),
            Symbol::Down => write!(f, "down"),
            Symbol::Left => write!(f, "left"),
            Symbol::Right => write!(f, "right"),
            Symbol::Function(n) => write!(f, "f{}", n),
            Symbol::Char(c) => write!(f, "{}", c),
            Symbol::Pointer(MouseButton::Left) => write!(f, "mouse-left"),
            Symbol::Pointer(MouseButton::Right) => write!(f, "mouse-right"),
            Symbol::Pointer(MouseButton::Middle) => write!(f, "mouse-middle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_keys_case_insensitively() {
        assert_eq!("Space".parse::<Symbol>().unwrap(), Symbol::Space);
        assert_eq!("RETURN".parse::<Symbol>().unwrap(), Symbol::Enter);
        assert_eq!("esc".parse::<Symbol>().unwrap(), Symbol::Escape);
        assert_eq!(" left ".parse::<Symbol>().unwrap(), Symbol::Left);
        assert_eq!("f12".parse::<Symbol>().unwrap(), Symbol::Function(12));
    }

    #[test]
    fn parses_single_characters_lowercased() {
        assert_eq!("A".parse::<Symbol>().unwrap(), Symbol::Char('a'));
        assert_eq!("7".parse::<Symbol>().unwrap(), Symbol::Char('7'));
        assert_eq!("\\".parse::<Symbol>().unwrap(), Symbol::Char('\\'));
    }

    #[test]
    fn parses_pointer_buttons() {
        assert_eq!(
            "mouse".parse::<Symbol>().unwrap(),
            Symbol::Pointer(MouseButton::Left)
        );
        assert_eq!(
            "rmb".parse::<Symbol>().unwrap().button(),
            Some(MouseButton::Right)
        );
        assert_eq!(Symbol::Space.button(), None);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("f13".parse::<Symbol>().is_err());
        assert!("f0".parse::<Symbol>().is_err());
        assert!("hyper".parse::<Symbol>().is_err());
        assert!("".parse::<Symbol>().is_err());
    }

    #[test]
    fn resolve_falls_back_to_space() {
        assert_eq!(Symbol::resolve("definitely-not-a-key"), Symbol::Space);
        assert_eq!(Symbol::resolve("tab"), Symbol::Tab);
    }

    #[test]
    fn display_matches_parse() {
        for name in ["space", "f6", "q", "mouse-middle", "escape"] {
            let symbol: Symbol = name.parse().unwrap();
            assert_eq!(symbol.to_string(), name);
        }
    }
}
