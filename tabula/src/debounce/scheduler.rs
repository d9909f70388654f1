//! Timer scheduling behind a small capability trait.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Work run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled timer.
///
/// Cancelling is idempotent and always succeeds. A cancelled timer never runs
/// its task.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Cancel the timer.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Schedules a task to run once after a delay.
///
/// Implementations must not run the task before `schedule` returns, even for
/// a zero delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` after `delay` unless the returned handle is cancelled first.
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Scheduler running timers as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Scheduler on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like `tokio::spawn`.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Scheduler on the current runtime, if there is one.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let timer = TimerHandle::new();
        let token = timer.token.clone();
        self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task(),
            }
        });
        timer
    }
}

struct Entry {
    token: CancellationToken,
    task: TimerTask,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    seq: u64,
    queue: BTreeMap<(Duration, u64), Entry>,
}

/// Deterministic scheduler driven by an explicit virtual clock.
///
/// Nothing fires until the owner calls [`advance`](ManualScheduler::advance).
/// Timers fire in deadline order; timers with equal deadlines fire in the
/// order they were scheduled. Clones share the same clock.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tabula::debounce::{ManualScheduler, Scheduler};
///
/// let clock = ManualScheduler::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = fired.clone();
/// clock.schedule(Duration::from_millis(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// clock.advance(Duration::from_millis(9));
/// assert!(!fired.load(Ordering::SeqCst));
/// clock.advance(Duration::from_millis(1));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of scheduled timers not yet fired or discarded.
    ///
    /// Cancelled timers are counted until the clock passes their deadline.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Move the clock forward by `by`, firing every timer that comes due.
    ///
    /// Tasks run without the clock's lock held, so they may schedule new
    /// timers; those fire in the same call if they fall due within `by`.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        loop {
            let entry = {
                let mut inner = self.lock();
                let due = inner
                    .queue
                    .first_key_value()
                    .is_some_and(|(&(deadline, _), _)| deadline <= target);
                if !due {
                    inner.now = target;
                    return;
                }
                let Some(((deadline, _), entry)) = inner.queue.pop_first() else {
                    inner.now = target;
                    return;
                };
                inner.now = deadline;
                entry
            };
            if !entry.token.is_cancelled() {
                (entry.task)();
            }
        }
    }

    /// Fire timers that are already due, including zero-delay timers.
    pub fn run_pending(&self) {
        self.advance(Duration::ZERO);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let timer = TimerHandle::new();
        let mut inner = self.lock();
        let key = (inner.now + delay, inner.seq);
        inner.seq += 1;
        inner.queue.insert(
            key,
            Entry {
                token: timer.token.clone(),
                task,
            },
        );
        timer
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> TimerTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| -> TimerTask {
            let sink = sink.clone();
            Box::new(move || sink.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();
        clock.schedule(Duration::from_millis(20), task("late"));
        clock.schedule(Duration::from_millis(10), task("a"));
        clock.schedule(Duration::from_millis(10), task("b"));

        clock.advance(Duration::from_millis(30));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "late"]);
        assert_eq!(clock.now(), Duration::from_millis(30));
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_runs() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();
        let handle = clock.schedule(Duration::from_millis(5), task("x"));
        handle.cancel();
        handle.cancel();
        clock.advance(Duration::from_millis(10));
        assert!(log.lock().unwrap().is_empty());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_zero_delay_waits_for_next_opportunity() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();
        clock.schedule(Duration::ZERO, task("now"));
        assert!(log.lock().unwrap().is_empty());
        clock.run_pending();
        assert_eq!(*log.lock().unwrap(), vec!["now"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_and_cancels() {
        let scheduler = TokioScheduler::current();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(50), task("kept"));
        let dropped = scheduler.schedule(Duration::from_millis(50), task("dropped"));
        dropped.cancel();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }
}
