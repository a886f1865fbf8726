//! Fixed-interval tick threads
//!
//! Every timed component (scheduler, key detector, effect driver) owns one
//! [`TickWorker`]: a named std thread that runs a tick closure, sleeps for the
//! interval and checks a cooperative stop flag before the next tick. Stopping
//! is therefore bounded by one interval and never preempts a running tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Clears the running flag when the worker thread exits, even on panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A restartable fixed-interval worker thread
pub struct TickWorker {
    name: String,
    interval: Duration,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TickWorker {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the thread running `tick` every interval. Returns whether a
    /// thread was spawned.
    ///
    /// No-op if the worker is already running. If a previous thread is still
    /// winding down after [`stop`](Self::stop), waits for it first.
    pub fn start<F>(&self, mut tick: F) -> Result<bool>
    where
        F: FnMut() + Send + 'static,
    {
        let mut handle = self.handle.lock();
        if self.is_running() && !self.is_stopping() {
            return Ok(false);
        }
        if let Some(old) = handle.take() {
            if old.join().is_err() {
                debug!(name = %self.name, "previous worker thread panicked");
            }
        }

        self.stop.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        let stop = Arc::clone(&self.stop);
        let guard = RunningGuard(Arc::clone(&self.running));
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let _guard = guard;
                while !stop.load(Ordering::SeqCst) {
                    tick();
                    thread::sleep(interval);
                }
            });

        match spawned {
            Ok(h) => {
                debug!(name = %self.name, interval_ms = interval.as_millis() as u64, "worker started");
                *handle = Some(h);
                Ok(true)
            }
            Err(source) => {
                self.running.store(false, Ordering::SeqCst);
                Err(Error::Spawn {
                    name: self.name.clone(),
                    source,
                })
            }
        }
    }

    /// Request the thread to exit before its next tick. Returns immediately.
    pub fn stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) && self.is_running() {
            debug!(name = %self.name, "worker stop requested");
        }
    }

    /// Whether the thread is alive
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a stop was requested and no start has followed it
    pub fn is_stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Stop and wait for the thread to exit
    pub fn stop_and_join(&self) {
        self.stop();
        if let Some(h) = self.handle.lock().take() {
            if h.join().is_err() {
                debug!(name = %self.name, "worker thread panicked");
            }
        }
    }
}

impl Drop for TickWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}
