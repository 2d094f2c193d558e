//! Timing engine
//!
//! A single background thread per session. While idle it waits on a condvar
//! (bounded by the idle poll tick); while running it executes the strategy
//! selected by the shared `Mode`:
//!
//! - `FixedRate`: one tap per `1 / rate_hz`, scheduled against an accumulated
//!   deadline so spacing does not drift and short stalls catch up.
//! - `HoldUntilStopped`: press once, release once when stopped.
//! - `HoldRelease`: press, hold `hold_ms`, release, wait `release_ms`, repeat.
//!   A full cycle takes at least 1 ms even at 0 ms / 0 ms.
//!
//! Cancellation is cooperative: stop is observed between injections, never
//! mid-hold, so every press gets its matching release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::injector::InputInjector;
use crate::state::{Mode, SharedState};
use crate::ClickerError;

/// How far behind schedule the fixed-rate loop may fall before it stops
/// catching up and resynchronizes to the current time
const MAX_CATCH_UP: Duration = Duration::from_secs(1);

/// Upper bound on the fixed-rate interval
const MAX_INTERVAL: Duration = Duration::from_secs(100);

/// Shortest hold/release cycle, so 0 ms / 0 ms does not spin
const MIN_CYCLE: Duration = Duration::from_millis(1);

/// Spacing between taps at `rate` Hz
fn tap_interval(rate: f64) -> Duration {
    Duration::try_from_secs_f64(1.0 / rate)
        .unwrap_or(MAX_INTERVAL)
        .min(MAX_INTERVAL)
}

/// Condvar wakeup shared by the loop and its controllers
struct Signal {
    lock: Mutex<()>,
    cvar: Condvar,
}

impl Signal {
    fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            cvar: Condvar::new(),
        }
    }

    /// Wake every waiter. Taking the lock first means a waiter that just
    /// checked its condition cannot miss the wakeup.
    fn notify(&self) {
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.cvar.notify_all();
    }

    /// Sleep until `deadline` or until `done` holds. Returns `done()`.
    fn wait_until(&self, deadline: Instant, done: impl Fn() -> bool) -> bool {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = self
                .cvar
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Block until `done` holds
    fn wait_for(&self, done: impl Fn() -> bool) {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .cvar
            .wait_while(guard, |_| !done())
            .unwrap_or_else(PoisonError::into_inner);
    }
}

struct Inner {
    state: Arc<SharedState>,
    injector: Arc<dyn InputInjector>,
    signal: Signal,
    /// The loop is inside an injecting strategy (a press may be outstanding)
    active: AtomicBool,
    shutdown: AtomicBool,
    idle_poll: Duration,
}

impl Inner {
    fn running(&self) -> bool {
        self.state.is_running()
    }

    fn run(&self) {
        info!("Timing engine started");

        while !self.shutdown.load(Ordering::SeqCst) {
            if !self.running() {
                self.signal.wait_until(Instant::now() + self.idle_poll, || {
                    self.running() || self.shutdown.load(Ordering::SeqCst)
                });
                continue;
            }

            self.active.store(true, Ordering::SeqCst);
            self.run_active();
            self.active.store(false, Ordering::SeqCst);
            self.signal.notify();
        }

        info!("Timing engine stopped");
    }

    fn run_active(&self) {
        while self.running() {
            let mode = self.state.effective_mode();
            debug!("Entering {} loop", mode);
            match mode {
                Mode::FixedRate => self.run_fixed_rate(),
                Mode::HoldUntilStopped => self.run_hold_until_stopped(),
                Mode::HoldRelease => self.run_hold_release(),
            }
        }
    }

    fn in_mode(&self, mode: Mode) -> bool {
        self.running() && self.state.effective_mode() == mode
    }

    fn run_fixed_rate(&self) {
        let symbol = self.state.symbol();
        let mut rate = self.state.rate_hz();
        if rate <= 0.0 {
            return;
        }
        let mut interval = tap_interval(rate);
        let mut last = Instant::now();
        let mut next = last;
        let mut taps: u64 = 0;

        while self.in_mode(Mode::FixedRate) {
            let current = self.state.rate_hz();
            if current <= 0.0 {
                break;
            }
            if current != rate {
                rate = current;
                interval = tap_interval(rate);
                next = last + interval;
                debug!("Rate changed to {} Hz", rate);
            }

            let now = Instant::now();
            if now >= next {
                self.injector.tap(symbol);
                taps += 1;
                last = next;
                next += interval;
                if now.saturating_duration_since(next) > MAX_CATCH_UP {
                    debug!("Fell {:?} behind, resynchronizing", now - next);
                    last = now;
                    next = now + interval;
                }
            } else {
                // Bounded by the idle tick so rate and mode changes are seen
                let wake = next.min(now + self.idle_poll);
                self.signal.wait_until(wake, || !self.running());
            }
        }

        debug!("Fixed-rate loop exiting after {} taps", taps);
    }

    fn run_hold_until_stopped(&self) {
        let symbol = self.state.symbol();
        self.injector.press(symbol);

        while self.in_mode(Mode::HoldUntilStopped) {
            self.signal
                .wait_until(Instant::now() + self.idle_poll, || !self.running());
        }

        self.injector.release(symbol);
    }

    fn run_hold_release(&self) {
        while self.in_mode(Mode::HoldRelease) {
            let symbol = self.state.symbol();

            let hold = Duration::from_millis(self.state.hold_ms());
            self.injector.press(symbol);
            thread::sleep(hold);
            self.injector.release(symbol);

            let release = Duration::from_millis(self.state.release_ms())
                .max(MIN_CYCLE.saturating_sub(hold));
            self.signal
                .wait_until(Instant::now() + release, || !self.running());
        }
    }
}

/// Owner of the background timing thread
pub struct TimingEngine {
    inner: Arc<Inner>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl TimingEngine {
    /// Spawn the engine thread. It idles until `start` is called.
    pub fn spawn(
        state: Arc<SharedState>,
        injector: Arc<dyn InputInjector>,
        idle_poll: Duration,
    ) -> Result<Self, ClickerError> {
        let inner = Arc::new(Inner {
            state,
            injector,
            signal: Signal::new(),
            active: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            idle_poll: idle_poll.max(Duration::from_millis(1)),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = thread::Builder::new()
            .name("timing-engine".to_string())
            .spawn(move || worker_inner.run())?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(handle)),
        })
    }

    pub fn is_running(&self) -> bool {
        self.inner.running()
    }

    /// Begin injecting. Returns `false` if already running (no-op).
    pub fn start(&self) -> bool {
        if self.inner.shutdown.load(Ordering::SeqCst) {
            return false;
        }
        if self.inner.state.swap_running(true) {
            return false;
        }
        info!("Autopresser started ({})", self.inner.state.mode());
        self.inner.signal.notify();
        true
    }

    /// Ask the loop to stop without waiting for it. Returns `false` if it
    /// was not running.
    pub fn request_stop(&self) -> bool {
        if !self.inner.state.swap_running(false) {
            return false;
        }
        info!("Autopresser stopping");
        self.inner.signal.notify();
        true
    }

    /// Stop and wait until the loop has released whatever it pressed
    pub fn stop(&self) -> bool {
        let was_running = self.request_stop();
        self.wait_idle();
        was_running
    }

    /// Start if stopped, stop (and wait) if running. Returns the new state.
    pub fn toggle(&self) -> bool {
        if self.is_running() {
            self.stop();
            false
        } else {
            self.start()
        }
    }

    /// Block until the loop is outside any injecting strategy
    pub fn wait_idle(&self) {
        let inner = &self.inner;
        inner
            .signal
            .wait_for(|| inner.running() || !inner.active.load(Ordering::SeqCst));
    }

    /// Stop, then end and join the engine thread
    pub fn shutdown(&self) {
        self.inner.state.swap_running(false);
        self.inner.shutdown.store(true, Ordering::SeqCst);
        self.inner.signal.notify();

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Timing engine thread panicked");
            }
        }
    }
}

impl Drop for TimingEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
