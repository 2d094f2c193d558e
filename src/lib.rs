//! Autopresser - hotkey-toggled autoclicker / autopresser
//!
//! This library provides components for:
//! - Input injection behind one symbol-based interface (rdev, XTest, ydotool)
//! - A background timing engine (fixed rate, hold until stopped, hold/release)
//! - Shared configuration state adjustable while the engine runs
//! - A hotkey controller with a debounced toggle and an immediate stop combo

pub mod config;
pub mod engine;
pub mod hotkey;
pub mod injector;
pub mod input_listener;
pub mod keymap;
pub mod schedule;
pub mod state;
pub mod status;
pub mod symbol;

pub use config::{Backend, Bindings, Config};
pub use engine::TimingEngine;
pub use hotkey::{HotkeyController, KeyEvent, Reaction};
pub use injector::{create_injector, DryRunInjector, InputInjector};
pub use input_listener::InputListener;
pub use state::{Mode, Settings, SharedState};
pub use status::format_status;
pub use symbol::{MouseButton, Symbol};

use thiserror::Error;

/// Main error type for Autopresser
#[derive(Error, Debug)]
pub enum ClickerError {
    #[error("Failed to access input devices: {0}")]
    InputAccess(String),

    #[error("Failed to connect to display: {0}")]
    Display(String),

    #[error("Failed to send input event: {0}")]
    SendEvent(String),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Invalid mode '{0}' (expected fixed-rate, hold or hold-release)")]
    InvalidMode(String),

    #[error("Invalid backend '{0}' (expected auto, rdev, xtest, ydotool or dry-run)")]
    InvalidBackend(String),

    #[error("Input listener error: {0}")]
    Listener(String),

    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}
