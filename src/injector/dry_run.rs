//! In-memory injector that records instead of injecting

use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

use super::InputInjector;
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
}

/// One recorded injection
#[derive(Debug, Clone, Copy)]
pub struct InjectedEvent {
    pub action: Action,
    pub symbol: Symbol,
    pub at: Instant,
}

/// Records every press/release with a timestamp
#[derive(Default)]
pub struct DryRunInjector {
    events: Mutex<Vec<InjectedEvent>>,
}

impl DryRunInjector {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, action: Action, symbol: Symbol) {
        debug!("[dry-run] {:?} {}", action, symbol);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(InjectedEvent {
                action,
                symbol,
                at: Instant::now(),
            });
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<InjectedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn presses(&self) -> usize {
        self.count(Action::Press)
    }

    pub fn releases(&self) -> usize {
        self.count(Action::Release)
    }

    fn count(&self, action: Action) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.action == action)
            .count()
    }

    /// Press timestamps, in order
    pub fn press_times(&self) -> Vec<Instant> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.action == Action::Press)
            .map(|e| e.at)
            .collect()
    }

    /// Whether every press was followed by its release, with no overlap
    pub fn is_balanced(&self) -> bool {
        let events = self.events();
        let mut held = false;
        for event in &events {
            match (event.action, held) {
                (Action::Press, false) => held = true,
                (Action::Release, true) => held = false,
                _ => return false,
            }
        }
        !held
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl InputInjector for DryRunInjector {
    fn press(&self, symbol: Symbol) {
        self.record(Action::Press, symbol);
    }

    fn release(&self, symbol: Symbol) {
        self.record(Action::Release, symbol);
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
