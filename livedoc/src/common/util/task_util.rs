use crate::SCHEDULER;
use parking_lot::Mutex;
use std::time::Duration;
use timer::{Guard, Timer};

/// Runs `f` once after `delay` on the shared timer thread.
///
/// The returned guard cancels the task when dropped, `None` means the delay
/// could not be scheduled and `f` was dropped without running.
#[inline]
pub fn schedule_once<F>(delay: Duration, f: F) -> Option<Guard>
where
    F: 'static + FnOnce() + Send,
{
    SCHEDULER.schedule_once(delay, f)
}

pub(crate) struct Scheduler {
    timer: Timer,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler {
            timer: Timer::new(),
        }
    }

    pub fn schedule_once<F>(&self, delay: Duration, f: F) -> Option<Guard>
    where
        F: 'static + FnOnce() + Send,
    {
        match chrono::Duration::from_std(delay) {
            Ok(chrono_duration) => {
                let mut task = Some(f);
                let guard = self.timer.schedule_with_delay(chrono_duration, move || {
                    if let Some(task) = task.take() {
                        task();
                    }
                });
                Some(guard)
            }
            Err(e) => {
                log::error!(
                    "Failed to convert duration to chrono::Duration: {}, skipping task scheduling",
                    e
                );
                None
            }
        }
    }
}

/// Trailing-edge debounce over the shared scheduler.
///
/// Every [`Debouncer::call`] replaces the pending task, so a burst of calls
/// runs only the last task, once the window has elapsed after the last call.
/// A zero window runs the task inline.
pub(crate) struct Debouncer {
    window: Duration,
    pending: Mutex<Option<Guard>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn call<F>(&self, f: F)
    where
        F: 'static + FnOnce() + Send,
    {
        if self.window.is_zero() {
            self.cancel();
            f();
            return;
        }

        match schedule_once(self.window, f) {
            // dropping the previous guard cancels the previous task
            Some(guard) => *self.pending.lock() = Some(guard),
            None => log::warn!("Debounced task was not scheduled"),
        }
    }

    pub fn cancel(&self) {
        self.pending.lock().take();
    }
}
