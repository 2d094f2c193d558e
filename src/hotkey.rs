//! Hotkey controller
//!
//! Turns raw key-down/key-up notifications into engine start/stop requests
//! and parameter adjustments. Called from a single event-delivery thread.
//!
//! The toggle key is debounced: the first key-down schedules a start/stop
//! after the debounce window and every further key-down inside that window
//! is coalesced into it, so a burst of presses yields exactly one transition.
//! Auto-repeated key-downs of a toggle key that is still held are ignored.
//! Holding the toggle key and pressing the stop-combo key stops immediately
//! and cancels any pending toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Bindings, Config};
use crate::engine::TimingEngine;
use crate::schedule::ScheduledTask;
use crate::state::{Mode, Settings, SharedState, DURATION_STEP_MS, RATE_STEP_HZ};
use crate::status::format_status;
use crate::symbol::Symbol;

/// Inbound key notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Symbol),
    Up(Symbol),
}

/// What the controller did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Not a bound key (or nothing to do)
    Ignored,
    /// Status report for display
    Status(String),
    /// A debounced start/stop was scheduled
    ToggleScheduled,
    /// A toggle was already pending; this press was folded into it
    ToggleCoalesced,
    /// The stop combo fired
    Stopped,
    /// A parameter changed; carries the settings after the change
    Adjusted(Settings),
}

pub struct HotkeyController {
    state: Arc<SharedState>,
    engine: Arc<TimingEngine>,
    bindings: Bindings,
    debounce: Duration,
    toggle_in_flight: Arc<AtomicBool>,
    modifier_held: AtomicBool,
    pending: Mutex<Option<ScheduledTask>>,
}

impl HotkeyController {
    pub fn new(
        state: Arc<SharedState>,
        engine: Arc<TimingEngine>,
        bindings: Bindings,
        debounce: Duration,
    ) -> Self {
        Self {
            state,
            engine,
            bindings,
            debounce,
            toggle_in_flight: Arc::new(AtomicBool::new(false)),
            modifier_held: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(state: Arc<SharedState>, engine: Arc<TimingEngine>, config: &Config) -> Self {
        Self::new(state, engine, config.bindings.clone(), config.debounce())
    }

    pub fn status(&self) -> String {
        format_status(&self.state.snapshot(), self.state.is_running(), &self.bindings)
    }

    /// Whether a debounced toggle is waiting to fire
    pub fn toggle_pending(&self) -> bool {
        self.toggle_in_flight.load(Ordering::SeqCst)
    }

    pub fn handle(&self, event: KeyEvent) -> Reaction {
        match event {
            KeyEvent::Down(key) => self.key_down(key),
            KeyEvent::Up(key) => self.key_up(key),
        }
    }

    fn key_up(&self, key: Symbol) -> Reaction {
        if key == self.bindings.toggle {
            self.modifier_held.store(false, Ordering::SeqCst);
        }
        Reaction::Ignored
    }

    fn key_down(&self, key: Symbol) -> Reaction {
        let b = &self.bindings;

        if key == b.toggle {
            // OS auto-repeat while held is not a new press
            if self.modifier_held.swap(true, Ordering::SeqCst) {
                return Reaction::Ignored;
            }
            return self.schedule_toggle();
        }
        if key == b.stop_combo {
            return self.stop_combo();
        }
        if key == b.status {
            return Reaction::Status(self.status());
        }

        if key == b.rate_up {
            self.state.adjust_rate(RATE_STEP_HZ);
        } else if key == b.rate_down {
            self.state.adjust_rate(-RATE_STEP_HZ);
        } else if key == b.mode_toggle {
            self.state.toggle_mode();
        } else if key == b.hold_up {
            self.state.adjust_hold_ms(DURATION_STEP_MS as i64);
        } else if key == b.hold_down {
            self.state.adjust_hold_ms(-(DURATION_STEP_MS as i64));
        } else if key == b.release_up {
            self.state.adjust_release_ms(DURATION_STEP_MS as i64);
        } else if key == b.release_down {
            self.state.adjust_release_ms(-(DURATION_STEP_MS as i64));
        } else {
            return Reaction::Ignored;
        }

        let settings = self.state.snapshot();
        match settings.mode {
            Mode::HoldRelease => debug!(
                "Hold {} ms / release {} ms",
                settings.hold_ms, settings.release_ms
            ),
            _ => debug!("{} at {} CPS", settings.mode, settings.rate_hz),
        }
        Reaction::Adjusted(settings)
    }

    fn schedule_toggle(&self) -> Reaction {
        if self.toggle_in_flight.swap(true, Ordering::SeqCst) {
            debug!("Toggle already in flight, ignoring repeat");
            return Reaction::ToggleCoalesced;
        }

        let engine = Arc::clone(&self.engine);
        let in_flight = Arc::clone(&self.toggle_in_flight);
        let task = ScheduledTask::spawn("toggle-debounce", self.debounce, move || {
            let running = engine.toggle();
            info!("Autopresser {}", if running { "started" } else { "stopped" });
            in_flight.store(false, Ordering::SeqCst);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match task {
            Ok(task) => {
                // The previous task has finished (it cleared the in-flight flag)
                *pending = Some(task);
                Reaction::ToggleScheduled
            }
            Err(e) => {
                warn!("Failed to schedule toggle: {}", e);
                self.toggle_in_flight.store(false, Ordering::SeqCst);
                Reaction::Ignored
            }
        }
    }

    fn stop_combo(&self) -> Reaction {
        if !self.modifier_held.load(Ordering::SeqCst) || !self.state.is_running() {
            return Reaction::Ignored;
        }

        self.cancel_pending();
        self.engine.request_stop();
        info!("Autopresser stopped (combo)");
        Reaction::Stopped
    }

    fn cancel_pending(&self) {
        let task = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut task) = task {
            task.cancel();
        }
        self.toggle_in_flight.store(false, Ordering::SeqCst);
    }

    /// Cancel any pending toggle. Call before shutting the engine down.
    pub fn shutdown(&self) {
        self.cancel_pending();
        self.modifier_held.store(false, Ordering::SeqCst);
    }
}

impl Drop for HotkeyController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
