use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::wakeup::{WakeupHandle, WakeupSender};

/// Reactive state cell with interior mutability.
///
/// `State<T>` is the shared holder behind every observable output in this
/// crate: the table's sort state, a debounced value, a persisted value.
/// It uses `Arc<RwLock<T>>` internally, so it is cheap to clone and safe to
/// hand to a timer task. Clones observe the same value.
///
/// # Example
///
/// ```
/// use tabula::state::State;
///
/// let count = State::new(5);
/// count.update(|v| *v += 1);
/// assert_eq!(count.get(), 6);
/// assert!(count.is_dirty());
/// ```
#[derive(Debug)]
pub struct State<T> {
    inner: Arc<RwLock<T>>,
    dirty: Arc<AtomicBool>,
    wakeup: WakeupHandle,
}

impl<T> State<T> {
    /// Create a new state with the given value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            dirty: Arc::new(AtomicBool::new(false)),
            wakeup: WakeupHandle::new(),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Read the current value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Set a new value
    pub fn set(&self, value: T) {
        self.update(|v| *v = value);
    }

    /// Update the value using a closure
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        self.update_with(f);
    }

    /// Update the value using a closure that also returns a result.
    ///
    /// The write lock is held for the whole closure, so read-modify-write
    /// sequences cannot interleave with other writers.
    pub fn update_with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        };
        self.dirty.store(true, Ordering::SeqCst);
        self.wakeup.send();
        result
    }

    /// Install a wakeup sender, signalled on every write.
    ///
    /// All clones of this state share the same sender.
    pub fn install_wakeup(&self, sender: WakeupSender) {
        self.wakeup.install(sender);
    }

    /// Check if the state has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            wakeup: self.wakeup.clone(),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
