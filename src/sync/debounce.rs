//! Trailing-edge debounce timer backed by a tokio task.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Runs a callback once input has been quiet for `delay`.
///
/// Each [`schedule`](Self::schedule) restarts the timer, so only the last
/// call in a burst fires. The callback runs with the timer slot locked:
/// once [`cancel`](Self::cancel) returns, it cannot run for an earlier
/// schedule. Dropping the debouncer cancels it.
pub struct Debouncer {
    delay: Duration,
    callback: Callback,
    slot: Arc<Mutex<TimerSlot>>,
}

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    /// Invalidate the running timer. Returns whether one was pending.
    fn disarm(&mut self) -> bool {
        self.generation += 1;
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Debouncer {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            slot: Arc::new(Mutex::new(TimerSlot::default())),
        }
    }

    /// Start or restart the timer. Must be called inside a tokio runtime.
    pub fn schedule(&self) {
        let mut slot = self.slot.lock();
        slot.disarm();
        let generation = slot.generation;
        let weak_slot: Weak<Mutex<TimerSlot>> = Arc::downgrade(&self.slot);
        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        slot.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak_slot.upgrade() else {
                return;
            };
            let mut slot = shared.lock();
            if slot.generation != generation {
                return;
            }
            slot.handle = None;
            callback();
        }));
    }

    /// Run the callback now, whether or not a call is pending.
    ///
    /// A pending timer is cancelled; later schedules debounce as usual.
    pub fn flush(&self) {
        let mut slot = self.slot.lock();
        slot.disarm();
        (self.callback)();
    }

    /// Run the callback now only if a call is pending. Returns whether it ran.
    pub fn flush_pending(&self) -> bool {
        let mut slot = self.slot.lock();
        if !slot.disarm() {
            return false;
        }
        (self.callback)();
        true
    }

    /// Cancel the pending call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        self.slot.lock().disarm()
    }

    /// Run `apply` with the timer held, cancelling the pending call when it
    /// returns `true`.
    ///
    /// Returns `None` if `apply` declined, otherwise whether a call was
    /// pending. The timer cannot fire between `apply` and the cancel.
    pub fn cancel_if<F>(&self, apply: F) -> Option<bool>
    where
        F: FnOnce() -> bool,
    {
        let mut slot = self.slot.lock();
        if !apply() {
            return None;
        }
        Some(slot.disarm())
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().handle.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.slot.lock().disarm();
    }
}
