//! Input injection
//!
//! Every backend presents the same symbol-based interface. Calls are
//! fire-and-forget: a backend that fails to synthesize an event logs it and
//! returns, so the timing engine keeps its cadence regardless.

mod dry_run;
mod noop;
mod rdev_input;
mod xtest;
#[cfg(target_os = "linux")]
mod ydotool;

pub use self::dry_run::{Action, DryRunInjector, InjectedEvent};
pub use self::noop::NoopInjector;
pub use self::rdev_input::RdevInjector;
pub use self::xtest::XTestInjector;
#[cfg(target_os = "linux")]
pub use self::ydotool::YdotoolInjector;

use std::sync::Arc;
use tracing::info;

use crate::config::Backend;
use crate::symbol::{MouseButton, Symbol};
use crate::ClickerError;

/// Trait for OS input-synthesis implementations
pub trait InputInjector: Send + Sync {
    /// Press and keep holding `symbol`
    fn press(&self, symbol: Symbol);

    /// Release a previously pressed `symbol`
    fn release(&self, symbol: Symbol);

    /// Press immediately followed by release
    fn tap(&self, symbol: Symbol) {
        match symbol.button() {
            Some(button) => self.click(button),
            None => {
                self.press(symbol);
                self.release(symbol);
            }
        }
    }

    /// Click a pointer button
    fn click(&self, button: MouseButton) {
        self.press(Symbol::Pointer(button));
        self.release(Symbol::Pointer(button));
    }

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Create the injector for `backend`
pub fn create_injector(backend: Backend) -> Result<Arc<dyn InputInjector>, ClickerError> {
    let injector: Arc<dyn InputInjector> = match backend {
        Backend::Auto => return auto_injector(),
        Backend::Rdev => Arc::new(RdevInjector::new()),
        Backend::XTest => Arc::new(XTestInjector::new()?),
        #[cfg(target_os = "linux")]
        Backend::Ydotool => Arc::new(YdotoolInjector::new()?),
        #[cfg(not(target_os = "linux"))]
        Backend::Ydotool => {
            return Err(ClickerError::InputAccess(
                "ydotool is only available on Linux".to_string(),
            ))
        }
        Backend::DryRun => Arc::new(DryRunInjector::new()),
    };

    info!("Using {} input backend", injector.name());
    Ok(injector)
}

#[cfg(any(target_os = "windows", target_os = "macos"))]
fn auto_injector() -> Result<Arc<dyn InputInjector>, ClickerError> {
    create_injector(Backend::Rdev)
}

#[cfg(target_os = "linux")]
fn auto_injector() -> Result<Arc<dyn InputInjector>, ClickerError> {
    let wayland_only =
        std::env::var_os("WAYLAND_DISPLAY").is_some() && std::env::var_os("DISPLAY").is_none();
    if wayland_only {
        return create_injector(Backend::Ydotool);
    }

    match create_injector(Backend::XTest) {
        Ok(injector) => Ok(injector),
        Err(e) => {
            tracing::warn!("XTest unavailable ({}), falling back to rdev", e);
            create_injector(Backend::Rdev)
        }
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn auto_injector() -> Result<Arc<dyn InputInjector>, ClickerError> {
    tracing::warn!("No input injection API on this platform, clicks will be no-ops");
    Ok(Arc::new(NoopInjector::new()))
}
