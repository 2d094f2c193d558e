//! Autopresser - hotkey-toggled autoclicker / autopresser
//!
//! Listens for global hotkeys and, while toggled on, injects a key or mouse
//! button into whatever window has focus at a fixed rate or with explicit
//! hold/release timing.

use autopresser::{
    create_injector,
    input_listener::{create_event_channel, InputListener},
    Backend, Bindings, ClickerError, Config, HotkeyController, Mode, Reaction, SharedState,
    Symbol, TimingEngine,
};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "autopresser", version, about)]
struct Args {
    /// Key or button to inject (space, enter, a, 5, f2, mouse, mouse-right, ...)
    #[arg(short, long, default_value = "space")]
    key: String,

    /// Timing mode: fixed-rate, hold or hold-release
    #[arg(short, long, default_value = "fixed-rate")]
    mode: Mode,

    /// Clicks per second in fixed-rate mode (0 or -1 holds the key instead)
    #[arg(short, long, default_value_t = 10.0, allow_negative_numbers = true)]
    rate: f64,

    /// Pressed phase in hold-release mode (ms)
    #[arg(long, default_value_t = 50)]
    hold_ms: u64,

    /// Released phase in hold-release mode (ms)
    #[arg(long, default_value_t = 50)]
    release_ms: u64,

    /// Input backend: auto, rdev, xtest, ydotool or dry-run
    #[arg(short, long, default_value = "auto")]
    backend: Backend,

    /// Toggle debounce window (ms)
    #[arg(long, default_value_t = 150)]
    debounce_ms: u64,

    #[arg(long, default_value = "f1")]
    status_key: Symbol,

    #[arg(long, default_value = "f6")]
    toggle_key: Symbol,

    /// Pressed while the toggle key is held: stop immediately
    #[arg(long, default_value = "escape")]
    stop_key: Symbol,

    #[arg(long, default_value = "f8")]
    rate_up_key: Symbol,

    #[arg(long, default_value = "f7")]
    rate_down_key: Symbol,

    #[arg(long, default_value = "f9")]
    mode_key: Symbol,

    #[arg(long, default_value = "]")]
    hold_up_key: Symbol,

    #[arg(long, default_value = "[")]
    hold_down_key: Symbol,

    #[arg(long, default_value = "=")]
    release_up_key: Symbol,

    #[arg(long, default_value = "-")]
    release_down_key: Symbol,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let bindings = Bindings {
            status: self.status_key,
            toggle: self.toggle_key,
            stop_combo: self.stop_key,
            rate_up: self.rate_up_key,
            rate_down: self.rate_down_key,
            mode_toggle: self.mode_key,
            hold_up: self.hold_up_key,
            hold_down: self.hold_down_key,
            release_up: self.release_up_key,
            release_down: self.release_down_key,
        };

        Config::default()
            .with_symbol(Symbol::resolve(&self.key))
            .with_mode(self.mode)
            .with_rate(self.rate)
            .with_hold_release(self.hold_ms, self.release_ms)
            .with_backend(self.backend)
            .with_bindings(bindings)
            .with_debounce_ms(self.debounce_ms)
            .with_verbose(self.verbose)
    }
}

fn main() -> Result<(), ClickerError> {
    let config = Args::parse().into_config();

    // Initialize logging
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Autopresser starting...");
    info!(
        "Config: key={}, mode={}, rate={}, hold={}ms, release={}ms, backend={}",
        config.symbol,
        config.mode,
        config.rate_hz,
        config.hold_ms,
        config.release_ms,
        config.backend
    );

    // Set up Ctrl+C handler for graceful shutdown
    let alive = Arc::new(AtomicBool::new(true));
    let alive_clone = alive.clone();

    ctrlc::set_handler(move || {
        info!("Shutdown signal received");
        alive_clone.store(false, Ordering::SeqCst);
    })
    .map_err(|e| ClickerError::Signal(e.to_string()))?;

    let injector = match create_injector(config.backend) {
        Ok(injector) => injector,
        Err(ClickerError::InputAccess(reason)) => {
            error!("Cannot inject input: {}", reason);
            error!("Try another backend with --backend (rdev, xtest, ydotool, dry-run)");
            return Err(ClickerError::InputAccess(reason));
        }
        Err(e) => return Err(e),
    };

    let state = Arc::new(SharedState::from_config(&config));
    let engine = Arc::new(TimingEngine::spawn(
        state.clone(),
        injector,
        config.idle_poll(),
    )?);
    let controller = HotkeyController::from_config(state, engine.clone(), &config);

    // Create channel for key events and start the listener thread
    let (sender, receiver) = create_event_channel();
    let listener = InputListener::new(sender).start();

    info!("{}", controller.status());
    info!("Press Ctrl+C to exit");

    // Main event loop
    let mut listener_lost = false;
    while alive.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => match controller.handle(event) {
                Reaction::Ignored => {}
                Reaction::Status(text) => info!("\n{}", text),
                Reaction::ToggleScheduled => debug!("Toggle scheduled"),
                Reaction::ToggleCoalesced => debug!("Toggle coalesced"),
                Reaction::Stopped => info!("Stopped by combo"),
                Reaction::Adjusted(settings) => info!(
                    "{} | CPS {} | hold {} ms | release {} ms",
                    settings.mode, settings.rate_hz, settings.hold_ms, settings.release_ms
                ),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Input listener disconnected");
                listener_lost = true;
                break;
            }
        }
    }

    info!("Autopresser shutting down...");

    // The listener only finishes on failure; a live one is left to process exit
    let outcome = if listener_lost || listener.is_finished() {
        listener
            .join()
            .unwrap_or_else(|_| Err(ClickerError::Listener("listener thread panicked".to_string())))
    } else {
        Ok(())
    };

    // Pending toggle first, then the engine loop; the injector (and any
    // display connection) goes last, once nothing can use it.
    controller.shutdown();
    drop(controller);
    engine.shutdown();

    outcome
}
