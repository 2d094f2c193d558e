//! Translation between `Symbol` and rdev keys/buttons
//!
//! Shared by the hotkey listener (rdev -> Symbol) and the rdev injection
//! backend (Symbol -> rdev). rdev keys are physical positions, so characters
//! map through a US layout here; the XTest backend does its own layout-aware
//! lookup instead.

use rdev::{Button, Key};

use crate::symbol::{MouseButton, Symbol};

const NAMED: &[(Symbol, Key)] = &[
    (Symbol::Space, Key::Space),
    (Symbol::Enter, Key::Return),
    (Symbol::Shift, Key::ShiftLeft),
    (Symbol::Ctrl, Key::ControlLeft),
    (Symbol::Alt, Key::Alt),
    (Symbol::Tab, Key::Tab),
    (Symbol::Backspace, Key::Backspace),
    (Symbol::Escape, Key::Escape),
    (Symbol::Up, Key::UpArrow),
    (Symbol::Down, Key::DownArrow),
    (Symbol::Left, Key::LeftArrow),
    (Symbol::Right, Key::RightArrow),
];

const FUNCTION: [Key; 12] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
];

const CHARS: &[(char, Key)] = &[
    ('a', Key::KeyA),
    ('b', Key::KeyB),
    ('c', Key::KeyC),
    ('d', Key::KeyD),
    ('e', Key::KeyE),
    ('f', Key::KeyF),
    ('g', Key::KeyG),
    ('h', Key::KeyH),
    ('i', Key::KeyI),
    ('j', Key::KeyJ),
    ('k', Key::KeyK),
    ('l', Key::KeyL),
    ('m', Key::KeyM),
    ('n', Key::KeyN),
    ('o', Key::KeyO),
    ('p', Key::KeyP),
    ('q', Key::KeyQ),
    ('r', Key::KeyR),
    ('s', Key::KeyS),
    ('t', Key::KeyT),
    ('u', Key::KeyU),
    ('v', Key::KeyV),
    ('w', Key::KeyW),
    ('x', Key::KeyX),
    ('y', Key::KeyY),
    ('z', Key::KeyZ),
    ('0', Key::Num0),
    ('1', Key::Num1),
    ('2', Key::Num2),
    ('3', Key::Num3),
    ('4', Key::Num4),
    ('5', Key::Num5),
    ('6', Key::Num6),
    ('7', Key::Num7),
    ('8', Key::Num8),
    ('9', Key::Num9),
    ('-', Key::Minus),
    ('=', Key::Equal),
    ('[', Key::LeftBracket),
    (']', Key::RightBracket),
    (';', Key::SemiColon),
    ('\'', Key::Quote),
    ('\\', Key::BackSlash),
    (',', Key::Comma),
    ('.', Key::Dot),
    ('/', Key::Slash),
    ('`', Key::BackQuote),
];

/// Convert a keyboard symbol to an rdev key. Pointer symbols have no key.
pub fn symbol_to_key(symbol: Symbol) -> Option<Key> {
    match symbol {
        Symbol::Function(n) => FUNCTION.get(usize::from(n).checked_sub(1)?).copied(),
        Symbol::Char(c) => CHARS.iter().find(|(ch, _)| *ch == c).map(|(_, key)| *key),
        Symbol::Pointer(_) => None,
        named => NAMED.iter().find(|(s, _)| *s == named).map(|(_, key)| *key),
    }
}

/// Convert an rdev key back into a symbol, folding left/right modifiers
pub fn key_to_symbol(key: Key) -> Option<Symbol> {
    match key {
        Key::ShiftRight => return Some(Symbol::Shift),
        Key::ControlRight => return Some(Symbol::Ctrl),
        Key::AltGr => return Some(Symbol::Alt),
        Key::KpReturn => return Some(Symbol::Enter),
        _ => {}
    }

    if let Some((symbol, _)) = NAMED.iter().find(|(_, k)| *k == key) {
        return Some(*symbol);
    }
    if let Some(i) = FUNCTION.iter().position(|k| *k == key) {
        return Some(Symbol::Function(i as u8 + 1));
    }
    CHARS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(c, _)| Symbol::Char(*c))
}

pub fn button_to_rdev(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}
