//! Cancellable delayed tasks

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::ClickerError;

/// A closure that runs once on its own thread after a delay, unless
/// cancelled first. Dropping the task cancels it and joins the thread.
pub struct ScheduledTask {
    cancelled: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(name: &str, delay: Duration, task: F) -> Result<Self, ClickerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new((Mutex::new(false), Condvar::new()));
        let flag = Arc::clone(&cancelled);
        let label = name.to_string();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let (lock, cvar) = &*flag;
                let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                let (guard, _) = cvar
                    .wait_timeout_while(guard, delay, |cancelled| !*cancelled)
                    .unwrap_or_else(PoisonError::into_inner);

                if *guard {
                    debug!("{} cancelled", label);
                    return;
                }
                drop(guard);
                task();
            })?;

        Ok(Self {
            cancelled,
            handle: Some(handle),
        })
    }

    /// Whether the task has either run or been cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel the task if it has not started yet, then wait for its thread.
    /// A task already running is allowed to finish.
    pub fn cancel(&mut self) {
        let (lock, cvar) = &*self.cancelled;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
