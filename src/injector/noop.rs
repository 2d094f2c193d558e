//! Injector for platforms without an injection API

use std::sync::Once;
use tracing::warn;

use super::InputInjector;
use crate::symbol::Symbol;

pub struct NoopInjector {
    warned: Once,
}

impl Default for NoopInjector {
    fn default() -> Self {
        Self { warned: Once::new() }
    }
}

impl NoopInjector {
    pub fn new() -> Self {
        Self::default()
    }

    fn warn_once(&self) {
        self.warned
            .call_once(|| warn!("Input injection is not supported here; ignoring events"));
    }
}

impl InputInjector for NoopInjector {
    fn press(&self, _symbol: Symbol) {
        self.warn_once();
    }

    fn release(&self, _symbol: Symbol) {
        self.warn_once();
    }

    fn name(&self) -> &'static str {
        "no-op"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::MouseButton;

    #[test]
    fn every_call_is_harmless() {
        let injector = NoopInjector::new();
        injector.tap(Symbol::Space);
        injector.click(MouseButton::Left);
        injector.press(Symbol::Enter);
        injector.release(Symbol::Enter);
    }
}
