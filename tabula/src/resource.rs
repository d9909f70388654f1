use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::wakeup::{WakeupHandle, WakeupSender};

/// Error type for resource loading failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResourceError {
    /// Error message
    pub message: String,
}

impl ResourceError {
    /// Create a new resource error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for ResourceError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ResourceError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The state of an async-loadable resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResourceState<T> {
    /// Resource has not started loading
    #[default]
    Idle,
    /// Resource is loading
    Loading,
    /// Resource loaded successfully
    Ready(T),
    /// Resource failed to load
    Error(ResourceError),
}

impl<T> ResourceState<T> {
    /// Check if resource is idle
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if resource is loading
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if resource is ready
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Check if resource errored
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get reference to ready value
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Get the error if present
    pub fn as_error(&self) -> Option<&ResourceError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Map the ready value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ResourceState<U> {
        match self {
            Self::Idle => ResourceState::Idle,
            Self::Loading => ResourceState::Loading,
            Self::Ready(v) => ResourceState::Ready(f(v)),
            Self::Error(e) => ResourceState::Error(e),
        }
    }
}

/// Async-loadable resource with interior mutability.
///
/// `Resource<T>` wraps a `ResourceState<T>` with thread-safe, async-compatible
/// state management. Clones share the same state, so a background load can
/// write what the host reads.
#[derive(Debug)]
pub struct Resource<T> {
    inner: Arc<RwLock<ResourceState<T>>>,
    dirty: Arc<AtomicBool>,
    wakeup: WakeupHandle,
}

impl<T> Resource<T> {
    /// Create a new resource in idle state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ResourceState::Idle)),
            dirty: Arc::new(AtomicBool::new(false)),
            wakeup: WakeupHandle::new(),
        }
    }

    /// Install a wakeup sender for this resource.
    ///
    /// All clones of this Resource share the same wakeup sender.
    pub fn install_wakeup(&self, sender: WakeupSender) {
        self.wakeup.install(sender);
    }

    fn replace(&self, state: ResourceState<T>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
        self.dirty.store(true, Ordering::SeqCst);
        self.wakeup.send();
    }

    /// Get a clone of the current state
    pub fn get(&self) -> ResourceState<T>
    where
        T: Clone,
    {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Set to idle state
    pub fn set_idle(&self) {
        self.replace(ResourceState::Idle);
    }

    /// Set to loading state
    pub fn set_loading(&self) {
        self.replace(ResourceState::Loading);
    }

    /// Set to ready state with value
    pub fn set_ready(&self, value: T) {
        self.replace(ResourceState::Ready(value));
    }

    /// Set to error state
    pub fn set_error(&self, err: impl Into<ResourceError>) {
        self.replace(ResourceState::Error(err.into()));
    }

    /// Check if the resource has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Check if resource is loading
    pub fn is_loading(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_loading())
            .unwrap_or(false)
    }

    /// Check if resource is ready
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_ready())
            .unwrap_or(false)
    }

    /// Check if resource has an error
    pub fn is_error(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_error())
            .unwrap_or(false)
    }
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            wakeup: self.wakeup.clone(),
        }
    }
}

/// Transport that produces the data a [`Fetcher`] loads.
///
/// # Example
///
/// ```ignore
/// struct Users { client: HttpClient }
///
/// #[async_trait]
/// impl DataSource<Vec<User>> for Users {
///     async fn fetch(&self) -> Result<Vec<User>, ResourceError> {
///         self.client.get_json("/api/users").await.map_err(|e| e.to_string().into())
///     }
/// }
/// ```
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<T, ResourceError>;
}

/// Drives a [`Resource`] from a [`DataSource`].
///
/// Each [`refetch`](Fetcher::refetch) supersedes the previous load: the older
/// load is cancelled and can no longer write the resource. Dropping the
/// fetcher cancels the load in flight.
pub struct Fetcher<T> {
    resource: Resource<T>,
    source: Arc<dyn DataSource<T>>,
    handle: Handle,
    in_flight: Arc<Mutex<InFlight>>,
}

/// The load allowed to write the resource.
///
/// A load commits only while holding this lock and only if its generation is
/// still current, so nothing it does can land after a newer `refetch` or a
/// `cancel` has returned.
#[derive(Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

impl InFlight {
    /// Retire the current load and return the next generation.
    fn supersede(&mut self, next: Option<CancellationToken>) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        if let Some(previous) = std::mem::replace(&mut self.token, next) {
            log::debug!("Cancelling superseded load");
            previous.cancel();
        }
        self.generation
    }
}

fn lock_in_flight(slot: &Mutex<InFlight>) -> MutexGuard<'_, InFlight> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: Send + Sync + 'static> Fetcher<T> {
    /// Fetcher running loads on the given runtime.
    pub fn new(source: Arc<dyn DataSource<T>>, handle: Handle) -> Self {
        Self {
            resource: Resource::new(),
            source,
            handle,
            in_flight: Arc::new(Mutex::new(InFlight::default())),
        }
    }

    /// Fetcher on the current runtime that starts loading immediately.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(source: Arc<dyn DataSource<T>>) -> Self {
        let fetcher = Self::new(source, Handle::current());
        fetcher.refetch();
        fetcher
    }

    /// The resource this fetcher writes.
    pub fn resource(&self) -> &Resource<T> {
        &self.resource
    }

    /// Start a new load, cancelling any load in flight.
    pub fn refetch(&self) {
        let token = CancellationToken::new();
        let generation = {
            let mut slot = lock_in_flight(&self.in_flight);
            let generation = slot.supersede(Some(token.clone()));
            self.resource.set_loading();
            generation
        };

        let resource = self.resource.clone();
        let source = Arc::clone(&self.source);
        let in_flight = Arc::clone(&self.in_flight);
        self.handle.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                result = source.fetch() => result,
            };

            let mut slot = lock_in_flight(&in_flight);
            if slot.generation != generation {
                return;
            }
            slot.token = None;
            match result {
                Ok(value) => resource.set_ready(value),
                Err(err) => {
                    log::warn!("Load failed: {}", err);
                    resource.set_error(err);
                }
            }
        });
    }

    /// Cancel the load in flight, if any. The resource keeps its state.
    pub fn cancel(&self) {
        lock_in_flight(&self.in_flight).supersede(None);
    }
}

impl<T> Drop for Fetcher<T> {
    fn drop(&mut self) {
        lock_in_flight(&self.in_flight).supersede(None);
    }
}

impl<T> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}
