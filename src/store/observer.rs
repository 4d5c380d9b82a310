use super::Store;
use std::sync::Arc;

/// Shared handle to an observer attached to a `Store<T>`.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

/// Identity of an observer, used for duplicate detection and detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverKey(usize);

impl ObserverKey {
    /// Identity derived from the address of `observer`.
    pub fn of<O: ?Sized>(observer: &O) -> Self {
        Self(observer as *const O as *const () as usize)
    }
}

/// Something that wants to hear about state changes of a store.
///
/// `update` is called synchronously after every `set`/`update`, with the
/// store whose state just changed. Read the new state through
/// [`Store::get`]; each call yields a fresh copy.
///
/// A panic inside `update` unwinds to whoever changed the state, and
/// observers attached after the panicking one are not called.
pub trait Observer<T>: Send + Sync {
    fn update(&self, store: &Store<T>);

    /// Identity of this observer. Defaults to the address of `self`, so two
    /// clones of the same `Arc` are the same observer.
    fn key(&self) -> ObserverKey {
        ObserverKey::of(self)
    }
}

/// Observer built from a plain state-receiving closure.
pub struct FnObserver<F> {
    callback: F,
}

impl<T, F> Observer<T> for FnObserver<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) + Send + Sync,
{
    fn update(&self, store: &Store<T>) {
        (self.callback)(store.get());
    }
}

/// Wrap a callback as an observer.
///
/// The callback receives a snapshot of the new state on every change.
///
/// # Example
///
/// ```
/// use storestack::{observer_fn, Store};
///
/// let store = Store::new(1);
/// store.attach(observer_fn(|n: i32| println!("now {n}"))).unwrap();
/// store.set(2);
/// ```
pub fn observer_fn<T, F>(callback: F) -> ObserverRef<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    Arc::new(FnObserver { callback })
}
