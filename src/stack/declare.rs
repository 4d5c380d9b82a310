use super::stack::{InsertOptions, Stack};
use crate::error::Result;
use crate::pointer::Pointer;
use crate::store::{observer_fn, ObserverRef, Store};
use tracing::warn;

/// How [`Stack::declare`] treats a failure.
///
/// Without an `ErrorHandling` errors always propagate. With one, they are
/// swallowed (and logged when `verbose`) unless `stop_on_error` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorHandling {
    pub verbose: bool,
    pub stop_on_error: bool,
}

impl ErrorHandling {
    /// Swallow errors silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log swallowed errors with `warn!`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Return errors to the caller instead of swallowing them.
    pub fn stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }
}

/// Options for [`Stack::declare`].
pub struct DeclareOptions<T> {
    pointer: Option<Pointer>,
    on_change: Option<ObserverRef<T>>,
    observers: Vec<ObserverRef<T>>,
    override_existing: bool,
    error_handling: Option<ErrorHandling>,
}

impl<T: Clone + Send + Sync + 'static> DeclareOptions<T> {
    /// Generated pointer, no observers, strict error handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the store at `pointer` instead of a generated one.
    pub fn pointer(mut self, pointer: impl Into<Pointer>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Call `callback` with the new state after every change.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.on_change = Some(observer_fn(callback));
        self
    }

    /// Attach an extra observer.
    pub fn observer(mut self, observer: ObserverRef<T>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Allow replacing a store already at the pointer.
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    /// Downgrade failures according to `error_handling`.
    pub fn error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = Some(error_handling);
        self
    }
}

impl<T> Default for DeclareOptions<T> {
    fn default() -> Self {
        Self {
            pointer: None,
            on_change: None,
            observers: Vec::new(),
            override_existing: false,
            error_handling: None,
        }
    }
}

impl Stack {
    /// Create a store from `initial` and register it, returning its pointer.
    ///
    /// Without a pointer in `options` the store is allocated under a fresh
    /// one. With a pointer it is inserted there, honouring
    /// `override_existing`. The on-change callback and extra observers are
    /// then attached in that order, stopping at the first failure.
    ///
    /// # Example
    ///
    /// ```
    /// use storestack::{DeclareOptions, Stack};
    ///
    /// let stack = Stack::new();
    /// let pointer = stack
    ///     .declare(
    ///         "dark".to_string(),
    ///         DeclareOptions::new()
    ///             .pointer("theme")
    ///             .on_change(|theme: String| println!("theme is now {theme}")),
    ///     )
    ///     .unwrap();
    /// assert_eq!(pointer.as_str(), "theme");
    /// ```
    pub fn declare<T>(&self, initial: T, options: DeclareOptions<T>) -> Result<Pointer>
    where
        T: Clone + Send + Sync + 'static,
    {
        let DeclareOptions {
            pointer,
            on_change,
            observers,
            override_existing,
            error_handling,
        } = options;

        let store = Store::new(initial);
        let (pointer, inserted) = match pointer {
            Some(pointer) => {
                let inserted = self.insert_at(
                    store.clone(),
                    pointer.clone(),
                    InsertOptions::new().override_existing(override_existing),
                );
                (pointer, inserted)
            }
            None => (self.allocate(store.clone()), Ok(())),
        };

        let result = inserted.and_then(|()| {
            on_change
                .into_iter()
                .chain(observers)
                .try_for_each(|observer| store.attach(observer))
        });

        match (result, error_handling) {
            (Ok(()), _) => Ok(pointer),
            (Err(err), None) => Err(err),
            (Err(err), Some(handling)) if handling.stop_on_error => Err(err),
            (Err(err), Some(handling)) => {
                if handling.verbose {
                    warn!(%pointer, error = %err, "store declaration failed");
                }
                Ok(pointer)
            }
        }
    }
}
