use super::global::{scoped, GlobalObserverRef};
use crate::error::{Result, StoreError};
use crate::pointer::Pointer;
use crate::store::{ObserverKey, ObserverRef, Store, StoreReader, StoreWriter};
use parking_lot::RwLock;
use std::any::{type_name, Any};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Type-erased slot holding a `Store<T>` handle.
type Slot = Box<dyn Any + Send + Sync>;

/// Name used in errors about the stack-wide observer list.
const GLOBAL_OBSERVERS: &str = "global observers";

/// Collision policy for [`Stack::insert_at`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Overwrite a store already present at the pointer.
    pub override_existing: bool,
    /// Log a warning before returning an error.
    pub verbose: bool,
}

impl InsertOptions {
    /// Strict defaults: no override, no logging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow replacing a store already at the pointer.
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    /// Log a warning before failing.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A keyed registry of stores.
///
/// Each [`Pointer`] maps to exactly one store. Stores of different state
/// types share one key space; callers name the type when looking a store up.
///
/// # Examples
///
/// ```
/// use storestack::{Stack, Store};
///
/// let stack = Stack::new();
/// let pointer = stack.allocate(Store::new(0));
///
/// let store = stack.lookup::<i32>(&pointer).unwrap();
/// store.update(|n| n + 1);
/// assert_eq!(store.get(), 1);
/// ```
pub struct Stack {
    entries: RwLock<HashMap<Pointer, Slot>>,
    global_observers: RwLock<Vec<GlobalObserverRef>>,
}

impl Stack {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            global_observers: RwLock::new(Vec::new()),
        }
    }

    /// Get or create the process-wide registry.
    ///
    /// Created on first access and never torn down. Use [`Stack::new`] for
    /// isolated registries.
    pub fn global() -> Arc<Self> {
        static STACK: OnceLock<Arc<Stack>> = OnceLock::new();
        Arc::clone(STACK.get_or_init(|| Arc::new(Stack::new())))
    }

    /// Insert `store` under a freshly generated pointer and return it.
    pub fn allocate<T>(&self, store: Store<T>) -> Pointer
    where
        T: Clone + Send + Sync + 'static,
    {
        let pointer = Pointer::generate();
        debug!(%pointer, store = store.id(), "allocating store");
        let evicted = self.entries.write().insert(pointer.clone(), Box::new(store));
        drop(evicted);
        pointer
    }

    /// Insert `store` at `pointer`.
    ///
    /// Fails with [`StoreError::MemoryAllocation`] if the pointer is occupied
    /// and `options.override_existing` is not set.
    pub fn insert_at<T>(
        &self,
        store: Store<T>,
        pointer: impl Into<Pointer>,
        options: InsertOptions,
    ) -> Result<()>
    where
        T: Clone + Send + Sync + 'static,
    {
        let pointer = pointer.into();
        let evicted = {
            let mut entries = self.entries.write();
            match entries.entry(pointer) {
                Entry::Occupied(mut slot) => {
                    if !options.override_existing {
                        if options.verbose {
                            warn!(pointer = %slot.key(), "pointer already holds a store");
                        }
                        return Err(StoreError::MemoryAllocation {
                            pointer: slot.key().clone(),
                        });
                    }
                    debug!(pointer = %slot.key(), store = store.id(), "overwriting store");
                    Some(slot.insert(Box::new(store)))
                }
                Entry::Vacant(slot) => {
                    debug!(pointer = %slot.key(), store = store.id(), "inserting store");
                    slot.insert(Box::new(store));
                    None
                }
            }
        };
        // Observers of the replaced store may touch this stack when dropped.
        drop(evicted);
        Ok(())
    }

    /// Create a store holding `default` at `pointer` unless one exists, then
    /// attach `observers` to whichever store is there.
    ///
    /// An existing store is never replaced. Attaching stops at the first
    /// [`StoreError::DuplicateObserver`]; observers attached before it (and
    /// the store, if it was just created) stay in place.
    pub fn upsert<T, I>(&self, default: T, pointer: impl Into<Pointer>, observers: I) -> Result<Store<T>>
    where
        T: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = ObserverRef<T>>,
    {
        let store = self.ensure(pointer.into(), default)?;
        for observer in observers {
            store.attach(observer)?;
        }
        Ok(store)
    }

    /// Remove the store at `pointer`.
    ///
    /// Fails with [`StoreError::NullPointer`] if nothing is there.
    pub fn remove(&self, pointer: impl AsRef<str>, verbose: bool) -> Result<()> {
        let pointer = pointer.as_ref();
        let removed = self.entries.write().remove(pointer);
        if let Some(removed) = removed {
            debug!(pointer, "removed store");
            // Dropped after the map lock is released.
            drop(removed);
            return Ok(());
        }
        if verbose {
            warn!(pointer, "no store to remove");
        }
        Err(StoreError::NullPointer {
            pointer: Pointer::from(pointer),
        })
    }

    /// Look up the store at `pointer`.
    ///
    /// Returns `None` when the pointer is empty. Asking for the wrong state
    /// type is a caller mistake and also yields `None`.
    pub fn lookup<T>(&self, pointer: impl AsRef<str>) -> Option<Store<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let pointer = pointer.as_ref();
        let entries = self.entries.read();
        let slot = entries.get(pointer)?;
        let store = slot.downcast_ref::<Store<T>>().cloned();
        if store.is_none() {
            debug!(pointer, expected = type_name::<T>(), "store holds another state type");
        }
        store
    }

    /// Make sure a store exists at `pointer` and return a reader and writer
    /// for it.
    ///
    /// `observers`, and the stack's global observers when
    /// `use_global_observers` is set, are attached skipping duplicates, so
    /// calling this repeatedly with the same observers is idempotent.
    ///
    /// # Example
    ///
    /// ```
    /// use storestack::Stack;
    ///
    /// let stack = Stack::new();
    /// let (count, set_count) = stack.stateful("count", 0, [], true).unwrap();
    /// set_count.set(5);
    /// set_count.update(|n| n + 1);
    /// assert_eq!(count.get(), 6);
    /// ```
    pub fn stateful<T, I>(
        &self,
        pointer: impl Into<Pointer>,
        default: T,
        observers: I,
        use_global_observers: bool,
    ) -> Result<(StoreReader<T>, StoreWriter<T>)>
    where
        T: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = ObserverRef<T>>,
    {
        let pointer = pointer.into();
        let store = self.ensure(pointer.clone(), default)?;
        for observer in observers {
            store.attach_with(observer, true)?;
        }
        if use_global_observers {
            let globals = self.global_observers.read().clone();
            for global in globals {
                store.attach_with(scoped(pointer.clone(), global), true)?;
            }
        }
        Ok(store.split())
    }

    /// Register an observer for stores created through [`Stack::stateful`].
    ///
    /// Only affects later `stateful` calls.
    pub fn add_global_observer(&self, observer: GlobalObserverRef) -> Result<()> {
        let key = ObserverKey::of(&*observer);
        let mut globals = self.global_observers.write();
        if globals.iter().any(|g| ObserverKey::of(&**g) == key) {
            return Err(StoreError::DuplicateObserver {
                store: GLOBAL_OBSERVERS.to_string(),
            });
        }
        globals.push(observer);
        Ok(())
    }

    /// Unregister a global observer. Stores it was already attached to keep
    /// it.
    pub fn remove_global_observer(&self, observer: &GlobalObserverRef) -> Result<()> {
        let key = ObserverKey::of(&**observer);
        let mut globals = self.global_observers.write();
        match globals.iter().position(|g| ObserverKey::of(&**g) == key) {
            Some(index) => {
                globals.remove(index);
                Ok(())
            }
            None => Err(StoreError::UnknownObserver {
                store: GLOBAL_OBSERVERS.to_string(),
            }),
        }
    }

    /// Number of registered global observers.
    pub fn global_observer_count(&self) -> usize {
        self.global_observers.read().len()
    }

    /// Whether a store exists at `pointer`.
    pub fn contains(&self, pointer: impl AsRef<str>) -> bool {
        self.entries.read().contains_key(pointer.as_ref())
    }

    /// Number of occupied pointers.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the stack holds no stores.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All occupied pointers, in no particular order.
    pub fn pointers(&self) -> Vec<Pointer> {
        self.entries.read().keys().cloned().collect()
    }

    /// Return the store at `pointer`, creating it from `default` if absent.
    fn ensure<T>(&self, pointer: Pointer, default: T) -> Result<Store<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        match entries.entry(pointer) {
            Entry::Occupied(slot) => slot
                .get()
                .downcast_ref::<Store<T>>()
                .cloned()
                .ok_or_else(|| StoreError::TypeMismatch {
                    pointer: slot.key().clone(),
                    expected: type_name::<T>(),
                }),
            Entry::Vacant(slot) => {
                let store = Store::new(default);
                debug!(pointer = %slot.key(), store = store.id(), "creating store");
                slot.insert(Box::new(store.clone()));
                Ok(store)
            }
        }
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("entries", &self.len())
            .field("global_observers", &self.global_observer_count())
            .finish()
    }
}
