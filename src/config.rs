//! Configuration management for Autopresser

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::state::Mode;
use crate::symbol::Symbol;
use crate::ClickerError;

/// Which input-synthesis backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Pick the best backend for the current platform/session
    Auto,
    /// rdev::simulate (SendInput / XTest / CGEvent)
    Rdev,
    /// X11 XTest through x11rb
    XTest,
    /// ydotool daemon (Wayland)
    Ydotool,
    /// Record events in memory and log them, inject nothing
    DryRun,
}

impl FromStr for Backend {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "rdev" => Ok(Backend::Rdev),
            "xtest" | "x11" => Ok(Backend::XTest),
            "ydotool" | "wayland" => Ok(Backend::Ydotool),
            "dry-run" | "dryrun" | "none" => Ok(Backend::DryRun),
            _ => Err(ClickerError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Auto => "auto",
            Backend::Rdev => "rdev",
            Backend::XTest => "xtest",
            Backend::Ydotool => "ydotool",
            Backend::DryRun => "dry-run",
        };
        f.write_str(name)
    }
}

/// Hotkey assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    pub status: Symbol,
    /// Debounced start/stop; also the modifier of the stop combo
    pub toggle: Symbol,
    /// Pressed while `toggle` is held: immediate stop
    pub stop_combo: Symbol,
    pub rate_up: Symbol,
    pub rate_down: Symbol,
    pub mode_toggle: Symbol,
    pub hold_up: Symbol,
    pub hold_down: Symbol,
    pub release_up: Symbol,
    pub release_down: Symbol,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            status: Symbol::Function(1),
            toggle: Symbol::Function(6),
            stop_combo: Symbol::Escape,
            rate_up: Symbol::Function(8),
            rate_down: Symbol::Function(7),
            mode_toggle: Symbol::Function(9),
            hold_up: Symbol::Char(']'),
            hold_down: Symbol::Char('['),
            release_up: Symbol::Char('='),
            release_down: Symbol::Char('-'),
        }
    }
}

/// Startup configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// What to inject
    pub symbol: Symbol,

    /// Initial timing strategy
    pub mode: Mode,

    /// Taps per second in fixed-rate mode (0 or negative means hold)
    pub rate_hz: f64,

    /// Pressed phase in hold/release mode
    pub hold_ms: u64,

    /// Released phase in hold/release mode
    pub release_ms: u64,

    pub backend: Backend,

    pub bindings: Bindings,

    /// Window in which repeated toggle presses are coalesced
    pub debounce_ms: u64,

    /// Upper bound on how long the idle engine sleeps between checks
    pub idle_poll_ms: u64,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: Symbol::Space,
            mode: Mode::FixedRate,
            rate_hz: 10.0,
            hold_ms: 50,
            release_ms: 50,
            backend: Backend::Auto,
            bindings: Bindings::default(),
            debounce_ms: 150,
            idle_poll_ms: 50,
            verbose: false,
        }
    }
}

impl Config {
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rate(mut self, rate_hz: f64) -> Self {
        self.rate_hz = rate_hz;
        self
    }

    pub fn with_hold_release(mut self, hold_ms: u64, release_ms: u64) -> Self {
        self.hold_ms = hold_ms;
        self.release_ms = release_ms;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_idle_poll_ms(mut self, idle_poll_ms: u64) -> Self {
        self.idle_poll_ms = idle_poll_ms;
        self
    }

    /// Enable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Idle poll tick, never zero so the idle loop cannot spin
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.symbol, Symbol::Space);
        assert_eq!(config.mode, Mode::FixedRate);
        assert_eq!(config.rate_hz, 10.0);
        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.idle_poll(), Duration::from_millis(50));
        assert_eq!(config.backend, Backend::Auto);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::default()
            .with_symbol(Symbol::Char('e'))
            .with_mode(Mode::HoldRelease)
            .with_hold_release(30, 70)
            .with_idle_poll_ms(0)
            .with_backend(Backend::DryRun);

        assert_eq!(config.symbol, Symbol::Char('e'));
        assert_eq!(config.mode, Mode::HoldRelease);
        assert_eq!((config.hold_ms, config.release_ms), (30, 70));
        assert_eq!(config.idle_poll(), Duration::from_millis(1));
        assert_eq!(config.backend, Backend::DryRun);
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("XTest".parse::<Backend>().unwrap(), Backend::XTest);
        assert_eq!("dry-run".parse::<Backend>().unwrap(), Backend::DryRun);
        assert!("uinput".parse::<Backend>().is_err());
    }

    #[test]
    fn default_bindings_are_distinct() {
        let b = Bindings::default();
        let all = [
            b.status,
            b.toggle,
            b.stop_combo,
            b.rate_up,
            b.rate_down,
            b.mode_toggle,
            b.hold_up,
            b.hold_down,
            b.release_up,
            b.release_down,
        ];
        for (i, a) in all.iter().enumerate() {
            for other in &all[i + 1..] {
                assert_ne!(a, other);
            }
        }
    }
}
