//! Owned pool of pending timers, cancelled as a unit.
//!
//! The production client scattered its choreography across nested timeouts
//! and routinely forgot one on teardown. Here every pending timer handle for
//! a run lives in a single owned collection; cancelling the pool aborts all
//! of them at once.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A collection of delayed one-shot callbacks backed by tokio tasks.
///
/// Must be used from within a tokio runtime. Dropping the pool aborts every
/// pending timer.
#[derive(Debug, Default)]
pub struct TimerPool {
    handles: Vec<JoinHandle<()>>,
}

impl TimerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `f` to run at an absolute deadline.
    ///
    /// Scheduling everything against one shared origin instant is what keeps
    /// phase transitions in strict index order: each deadline is a growing
    /// offset from the same run start, never relative to the previous
    /// callback.
    pub fn schedule_at(&mut self, deadline: Instant, f: impl FnOnce() + Send + 'static) {
        self.handles.push(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            f();
        }));
    }

    /// Schedule `f` after a delay from now.
    pub fn schedule(&mut self, delay: Duration, f: impl FnOnce() + Send + 'static) {
        self.schedule_at(Instant::now() + delay, f);
    }

    /// Abort every pending timer. Callbacks that have not yet passed their
    /// sleep will never run. Safe to call repeatedly and on an empty pool.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for TimerPool {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
