//! Debounced values.
//!
//! [`Debounced`] turns a rapidly changing input into an output that only
//! follows the input after it has been quiet for a delay. The delay runs on
//! an injected [`Scheduler`], so hosts choose between real tokio timers and a
//! manually driven clock.

mod scheduler;

pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TimerTask, TokioScheduler};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::state::State;

/// The timer slot shared with the scheduled task.
///
/// Every schedule or cancel bumps `generation`; a firing task only commits if
/// the generation it was created under is still current.
#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    timer: Option<TimerHandle>,
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Invalidate the current generation and cancel its timer.
fn cancel_pending(pending: &Mutex<Pending>) {
    let mut pending = lock(pending);
    pending.generation += 1;
    if let Some(timer) = pending.timer.take() {
        log::debug!("Cancelling debounce timer");
        timer.cancel();
    }
}

/// A rate-limited view of a changing value.
///
/// The first value is committed immediately. Each later change (re)starts a
/// timer; only when a timer fires without being superseded does the output
/// take the input value it was scheduled with. Dropping the `Debounced`
/// cancels any outstanding timer.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tabula::debounce::{Debounced, ManualScheduler};
///
/// let clock = ManualScheduler::new();
/// let mut search = Debounced::new(String::new(), Duration::from_millis(300), Arc::new(clock.clone()));
///
/// search.set("re".to_string());
/// search.set("react".to_string());
/// assert_eq!(search.get(), "");
///
/// clock.advance(Duration::from_millis(300));
/// assert_eq!(search.get(), "react");
/// ```
pub struct Debounced<T> {
    input: T,
    delay: Duration,
    output: State<T>,
    pending: Arc<Mutex<Pending>>,
    scheduler: Arc<dyn Scheduler>,
}

impl<T> Debounced<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Start debouncing with `value` as both input and output.
    pub fn new(value: T, delay: Duration, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            output: State::new(value.clone()),
            input: value,
            delay,
            pending: Arc::new(Mutex::new(Pending::default())),
            scheduler,
        }
    }

    /// The committed (debounced) value.
    pub fn get(&self) -> T {
        self.output.get()
    }

    /// Shared handle to the committed value, for hosts that watch it.
    pub fn output(&self) -> State<T> {
        self.output.clone()
    }

    /// The latest input value.
    pub fn input(&self) -> &T {
        &self.input
    }

    /// The current delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a timer is waiting to commit.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).timer.is_some()
    }

    /// Feed a new input value.
    ///
    /// A value equal to the current input is not a change and leaves any
    /// running timer alone.
    pub fn set(&mut self, value: T) {
        if value == self.input {
            return;
        }
        self.input = value;
        self.restart();
    }

    /// Feed the input for this render and return the committed value.
    pub fn observe(&mut self, value: T) -> T {
        self.set(value);
        self.get()
    }

    /// Change the delay. Restarts the timer for the current input.
    pub fn set_delay(&mut self, delay: Duration) {
        if delay == self.delay {
            return;
        }
        self.delay = delay;
        self.restart();
    }

    /// Cancel the outstanding timer, if any. The output keeps its value.
    pub fn cancel(&self) {
        cancel_pending(&self.pending);
    }

    /// Replace any running timer with a fresh one for the current input.
    fn restart(&mut self) {
        cancel_pending(&self.pending);
        let generation = lock(&self.pending).generation;

        let value = self.input.clone();
        let output = self.output.clone();
        let slot = Arc::clone(&self.pending);
        log::debug!("Scheduling debounce commit in {:?}", self.delay);
        let timer = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                let mut pending = lock(&slot);
                if pending.generation != generation {
                    return;
                }
                pending.timer = None;
                pending.generation += 1;
                // Committed under the slot lock so a concurrent cancel
                // either runs first (and we return above) or after.
                output.set(value);
            }),
        );

        let mut pending = lock(&self.pending);
        if pending.generation == generation {
            pending.timer = Some(timer);
        } else {
            timer.cancel();
        }
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        cancel_pending(&self.pending);
    }
}

impl<T: fmt::Debug> fmt::Debug for Debounced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("delay", &self.delay)
            .finish()
    }
}
