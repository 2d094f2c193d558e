//! Shared configuration state
//!
//! One `SharedState` per session, handed to the hotkey controller (writer)
//! and the timing engine (reader) behind an `Arc`. Every field is its own
//! atomic (or a tiny mutex for the symbol), so a reader never observes a
//! half-written value and adjustments apply without stopping the engine.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::Config;
use crate::symbol::Symbol;
use crate::ClickerError;

/// Step applied by the hold/release adjustment hotkeys
pub const DURATION_STEP_MS: u64 = 10;

/// Step applied by the rate adjustment hotkeys
pub const RATE_STEP_HZ: f64 = 1.0;

/// Slowest positive rate; anything between 0 and this is raised to it
pub const MIN_RATE_HZ: f64 = 0.01;

/// Timing strategy used while running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tap once per `1 / rate_hz` seconds
    FixedRate,
    /// Press once, hold until stopped, release once
    HoldUntilStopped,
    /// Alternate `hold_ms` pressed and `release_ms` released
    HoldRelease,
}

impl Mode {
    fn to_u8(self) -> u8 {
        match self {
            Mode::FixedRate => 0,
            Mode::HoldUntilStopped => 1,
            Mode::HoldRelease => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::HoldUntilStopped,
            2 => Mode::HoldRelease,
            _ => Mode::FixedRate,
        }
    }
}

impl FromStr for Mode {
    type Err = ClickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed-rate" | "fixed" | "cps" => Ok(Mode::FixedRate),
            "hold" | "hold-until-stopped" => Ok(Mode::HoldUntilStopped),
            "hold-release" => Ok(Mode::HoldRelease),
            _ => Err(ClickerError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::FixedRate => write!(f, "fixed rate"),
            Mode::HoldUntilStopped => write!(f, "hold until stopped"),
            Mode::HoldRelease => write!(f, "hold/release"),
        }
    }
}

/// Point-in-time copy of the adjustable parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub symbol: Symbol,
    pub mode: Mode,
    pub rate_hz: f64,
    pub hold_ms: u64,
    pub release_ms: u64,
}

/// Configuration shared between the hotkey controller and the timing engine
pub struct SharedState {
    symbol: Mutex<Symbol>,
    mode: AtomicU8,
    rate_bits: AtomicU64,
    hold_ms: AtomicU64,
    release_ms: AtomicU64,
    running: AtomicBool,
}

impl SharedState {
    /// A zero (or negative sentinel) rate in `FixedRate` starts out as
    /// `HoldUntilStopped`; an explicitly chosen mode is otherwise kept.
    pub fn new(symbol: Symbol, mode: Mode, rate_hz: f64, hold_ms: u64, release_ms: u64) -> Self {
        let rate = clamp_rate(rate_hz);
        let mode = if mode == Mode::FixedRate && rate == 0.0 {
            Mode::HoldUntilStopped
        } else {
            mode
        };

        Self {
            symbol: Mutex::new(symbol),
            mode: AtomicU8::new(mode.to_u8()),
            rate_bits: AtomicU64::new(rate.to_bits()),
            hold_ms: AtomicU64::new(hold_ms),
            release_ms: AtomicU64::new(release_ms),
            running: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.symbol,
            config.mode,
            config.rate_hz,
            config.hold_ms,
            config.release_ms,
        )
    }

    pub fn snapshot(&self) -> Settings {
        Settings {
            symbol: self.symbol(),
            mode: self.mode(),
            rate_hz: self.rate_hz(),
            hold_ms: self.hold_ms(),
            release_ms: self.release_ms(),
        }
    }

    pub fn symbol(&self) -> Symbol {
        *self.symbol.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::SeqCst))
    }

    /// The strategy the engine should actually run: a fixed rate of zero
    /// can only mean holding
    pub fn effective_mode(&self) -> Mode {
        match self.mode() {
            Mode::FixedRate if self.rate_hz() <= 0.0 => Mode::HoldUntilStopped,
            mode => mode,
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode.to_u8(), Ordering::SeqCst);
    }

    pub fn rate_hz(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::SeqCst))
    }

    /// Set the tap rate. Anything that is not a positive number (including
    /// the legacy `-1` "hold" convention) stores 0 and selects
    /// `HoldUntilStopped`; a positive rate outside hold/release selects
    /// `FixedRate`.
    pub fn set_rate(&self, rate_hz: f64) {
        let rate = clamp_rate(rate_hz);
        self.rate_bits.store(rate.to_bits(), Ordering::SeqCst);
        self.normalize_rate_mode(rate);
    }

    /// Add `delta` to the rate, flooring at 0. Returns the new rate.
    pub fn adjust_rate(&self, delta: f64) -> f64 {
        let mut current = self.rate_bits.load(Ordering::SeqCst);
        let rate = loop {
            let rate = clamp_rate(f64::from_bits(current) + delta);
            match self.rate_bits.compare_exchange(
                current,
                rate.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break rate,
                Err(actual) => current = actual,
            }
        };
        self.normalize_rate_mode(rate);
        rate
    }

    fn normalize_rate_mode(&self, rate: f64) {
        if self.mode() == Mode::HoldRelease {
            return;
        }
        let mode = if rate > 0.0 {
            Mode::FixedRate
        } else {
            Mode::HoldUntilStopped
        };
        self.set_mode(mode);
    }

    /// Flip between hold/release and the rate-driven modes
    pub fn toggle_mode(&self) -> Mode {
        let mode = match self.mode() {
            Mode::HoldRelease if self.rate_hz() > 0.0 => Mode::FixedRate,
            Mode::HoldRelease => Mode::HoldUntilStopped,
            Mode::FixedRate | Mode::HoldUntilStopped => Mode::HoldRelease,
        };
        self.set_mode(mode);
        mode
    }

    pub fn hold_ms(&self) -> u64 {
        self.hold_ms.load(Ordering::SeqCst)
    }

    pub fn set_hold_ms(&self, ms: u64) {
        self.hold_ms.store(ms, Ordering::SeqCst);
    }

    /// Adjust the hold duration, flooring at 0. Returns the new value.
    pub fn adjust_hold_ms(&self, delta: i64) -> u64 {
        adjust_floored(&self.hold_ms, delta)
    }

    pub fn release_ms(&self) -> u64 {
        self.release_ms.load(Ordering::SeqCst)
    }

    pub fn set_release_ms(&self, ms: u64) {
        self.release_ms.store(ms, Ordering::SeqCst);
    }

    /// Adjust the release duration, flooring at 0. Returns the new value.
    pub fn adjust_release_ms(&self, delta: i64) -> u64 {
        adjust_floored(&self.release_ms, delta)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Set the running flag, returning the previous value
    pub(crate) fn swap_running(&self, running: bool) -> bool {
        self.running.swap(running, Ordering::SeqCst)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn clamp_rate(rate_hz: f64) -> f64 {
    if rate_hz.is_finite() && rate_hz > 0.0 {
        rate_hz.max(MIN_RATE_HZ)
    } else {
        0.0
    }
}

fn adjust_floored(cell: &AtomicU64, delta: i64) -> u64 {
    let apply = |value: u64| {
        if delta < 0 {
            value.saturating_sub(delta.unsigned_abs())
        } else {
            value.saturating_add(delta as u64)
        }
    };
    let previous = cell
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| Some(apply(value)))
        .unwrap_or_else(|value| value);
    apply(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mode: Mode, rate: f64) -> SharedState {
        SharedState::new(Symbol::Space, mode, rate, 50, 50)
    }

    #[test]
    fn hold_decrement_floors_at_zero() {
        let s = state(Mode::HoldRelease, 10.0);
        s.set_hold_ms(5);
        assert_eq!(s.adjust_hold_ms(-(DURATION_STEP_MS as i64)), 0);
        assert_eq!(s.hold_ms(), 0);
        assert_eq!(s.adjust_hold_ms(-10), 0);
    }

    #[test]
    fn release_adjusts_both_ways() {
        let s = state(Mode::HoldRelease, 10.0);
        assert_eq!(s.adjust_release_ms(10), 60);
        assert_eq!(s.adjust_release_ms(-100), 0);
    }

    #[test]
    fn zero_rate_selects_hold_until_stopped() {
        let s = state(Mode::FixedRate, 0.0);
        assert_eq!(s.mode(), Mode::HoldUntilStopped);
        assert_eq!(s.rate_hz(), 0.0);
    }

    #[test]
    fn legacy_negative_sentinel_selects_hold_until_stopped() {
        let s = state(Mode::FixedRate, -1.0);
        assert_eq!(s.mode(), Mode::HoldUntilStopped);
        assert_eq!(s.rate_hz(), 0.0);

        let s = state(Mode::FixedRate, f64::NAN);
        assert_eq!(s.mode(), Mode::HoldUntilStopped);
    }

    #[test]
    fn rate_adjustment_moves_between_rate_modes() {
        let s = state(Mode::FixedRate, 1.0);
        assert_eq!(s.adjust_rate(-RATE_STEP_HZ), 0.0);
        assert_eq!(s.mode(), Mode::HoldUntilStopped);
        assert_eq!(s.adjust_rate(-RATE_STEP_HZ), 0.0);

        assert_eq!(s.adjust_rate(RATE_STEP_HZ), 1.0);
        assert_eq!(s.mode(), Mode::FixedRate);
    }

    #[test]
    fn forced_fixed_rate_at_zero_runs_as_hold() {
        let s = state(Mode::FixedRate, 0.0);
        s.set_mode(Mode::FixedRate);
        assert_eq!(s.mode(), Mode::FixedRate);
        assert_eq!(s.effective_mode(), Mode::HoldUntilStopped);
    }

    #[test]
    fn rate_adjustment_keeps_hold_release() {
        let s = state(Mode::HoldRelease, 1.0);
        s.adjust_rate(-1.0);
        assert_eq!(s.mode(), Mode::HoldRelease);
    }

    #[test]
    fn toggle_mode_flips_hold_release() {
        let s = state(Mode::FixedRate, 10.0);
        assert_eq!(s.toggle_mode(), Mode::HoldRelease);
        assert_eq!(s.toggle_mode(), Mode::FixedRate);

        s.set_rate(0.0);
        assert_eq!(s.toggle_mode(), Mode::HoldRelease);
        assert_eq!(s.toggle_mode(), Mode::HoldUntilStopped);
    }

    #[test]
    fn explicit_hold_mode_is_kept_at_startup() {
        let s = state(Mode::HoldUntilStopped, 10.0);
        assert_eq!(s.mode(), Mode::HoldUntilStopped);
        assert_eq!(s.rate_hz(), 10.0);
    }

    #[test]
    fn explicit_hold_release_survives_zero_rate() {
        let s = state(Mode::HoldRelease, 0.0);
        assert_eq!(s.mode(), Mode::HoldRelease);
    }

    #[test]
    fn tiny_rates_are_raised_to_minimum() {
        let s = state(Mode::FixedRate, 1e-20);
        assert_eq!(s.rate_hz(), MIN_RATE_HZ);
        assert_eq!(s.mode(), Mode::FixedRate);

        s.set_rate(f64::MIN_POSITIVE);
        assert_eq!(s.rate_hz(), MIN_RATE_HZ);

        s.set_rate(1.0);
        assert_eq!(s.adjust_rate(-0.999), MIN_RATE_HZ);
    }

    #[test]
    fn running_swap_is_idempotent() {
        let s = SharedState::default();
        assert!(!s.swap_running(true));
        assert!(s.swap_running(true));
        assert!(s.is_running());
        assert!(s.swap_running(false));
        assert!(!s.swap_running(false));
    }

    #[test]
    fn mode_parses_cli_names() {
        assert_eq!("hold".parse::<Mode>().unwrap(), Mode::HoldUntilStopped);
        assert_eq!("Hold-Release".parse::<Mode>().unwrap(), Mode::HoldRelease);
        assert!("turbo".parse::<Mode>().is_err());
    }
}
