use super::Store;

/// Read half of a store.
pub struct StoreReader<T> {
    store: Store<T>,
}

/// Write half of a store.
pub struct StoreWriter<T> {
    store: Store<T>,
}

impl<T: Clone + Send + Sync + 'static> StoreReader<T> {
    pub(crate) fn new(store: Store<T>) -> Self {
        Self { store }
    }

    /// Get a fresh copy of the current state.
    pub fn get(&self) -> T {
        self.store.get()
    }

    /// Borrow the state for the duration of `f`.
    ///
    /// `f` must not write to the same store.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.store.with(f)
    }
}

impl<T: Clone + Send + Sync + 'static> StoreWriter<T> {
    pub(crate) fn new(store: Store<T>) -> Self {
        Self { store }
    }

    /// Replace the state with `value` and notify observers.
    pub fn set(&self, value: T) {
        self.store.set(value);
    }

    /// Replace the state with `f(previous)` and notify observers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.store.update(f);
    }
}

impl<T> Clone for StoreReader<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T> Clone for StoreWriter<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Create a detached store and return its reader and writer.
///
/// The store lives until both halves are dropped.
///
/// # Example
///
/// ```
/// use storestack::create_store;
///
/// let (count, set_count) = create_store(0);
/// set_count.update(|n| n + 1);
/// assert_eq!(count.get(), 1);
/// ```
pub fn create_store<T>(initial: T) -> (StoreReader<T>, StoreWriter<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Store::new(initial).split()
}
