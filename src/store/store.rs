use super::handles::{StoreReader, StoreWriter};
use super::observer::ObserverRef;
use crate::error::{Result, StoreError};
use crate::pointer::random_id;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

struct StoreInner<T> {
    id: String,
    state: RwLock<T>,
    observers: RwLock<Vec<ObserverRef<T>>>,
}

/// A thread-safe container for one state value and its observers.
///
/// `Store` is a handle: clones share the same state and observer list.
/// State never escapes by reference. [`get`](Store::get) returns a clone and
/// [`set`](Store::set) takes ownership of the new value, so the only way to
/// change what a store holds is through the store itself.
///
/// Isolation relies on `T::clone` producing an independent value. Types that
/// share interior state across clones (`Arc<Mutex<_>>` and friends) opt out
/// of that guarantee.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                id: random_id(),
                state: RwLock::new(initial),
                observers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Public identifier of this store.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.inner.state.read_recursive().clone()
    }

    /// Borrow the state for the duration of `f` without cloning it.
    ///
    /// The state is read-locked while `f` runs. `f` may read this store
    /// again, but must not `set` or `update` it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self.inner.state.read_recursive();
        f(&state)
    }

    /// Replace the state and notify all observers.
    pub fn set(&self, new_state: T) {
        *self.inner.state.write() = new_state;
        self.notify();
    }

    /// Replace the state with `f(previous)` and notify all observers.
    ///
    /// `f` receives a copy of the current state and is called exactly once,
    /// while the state is write-locked. It must not touch this store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        {
            let mut state = self.inner.state.write();
            let next = f(state.clone());
            *state = next;
        }
        self.notify();
    }

    /// Attach an observer, failing with
    /// [`StoreError::DuplicateObserver`] if it is already attached.
    pub fn attach(&self, observer: ObserverRef<T>) -> Result<()> {
        self.attach_with(observer, false)
    }

    /// Attach an observer. With `skip_on_duplicate`, attaching an observer
    /// that is already present is a no-op instead of an error.
    pub fn attach_with(&self, observer: ObserverRef<T>, skip_on_duplicate: bool) -> Result<()> {
        let key = observer.key();
        let mut observers = self.inner.observers.write();
        if observers.iter().any(|attached| attached.key() == key) {
            if skip_on_duplicate {
                return Ok(());
            }
            return Err(StoreError::DuplicateObserver {
                store: self.inner.id.clone(),
            });
        }
        observers.push(observer);
        Ok(())
    }

    /// Detach a previously attached observer.
    pub fn detach(&self, observer: &ObserverRef<T>) -> Result<()> {
        let key = observer.key();
        let mut observers = self.inner.observers.write();
        match observers.iter().position(|attached| attached.key() == key) {
            Some(index) => {
                observers.remove(index);
                Ok(())
            }
            None => Err(StoreError::UnknownObserver {
                store: self.inner.id.clone(),
            }),
        }
    }

    /// Whether `observer` is currently attached.
    pub fn is_attached(&self, observer: &ObserverRef<T>) -> bool {
        let key = observer.key();
        self.inner
            .observers
            .read()
            .iter()
            .any(|attached| attached.key() == key)
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    /// Call every attached observer in attachment order.
    ///
    /// The observer list is snapshotted first and no lock is held while
    /// observers run, so they may read this store or attach and detach.
    pub fn notify(&self) {
        let observers = self.inner.observers.read().clone();
        trace!(store = %self.inner.id, observers = observers.len(), "notifying observers");
        for observer in &observers {
            observer.update(self);
        }
    }

    /// Split into a reader and a writer sharing this store.
    pub fn split(&self) -> (StoreReader<T>, StoreWriter<T>) {
        (StoreReader::new(self.clone()), StoreWriter::new(self.clone()))
    }

    /// Whether both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("state", &*self.inner.state.read_recursive())
            .field("observers", &self.inner.observers.read().len())
            .finish()
    }
}
