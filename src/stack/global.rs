use crate::pointer::Pointer;
use crate::store::{Observer, ObserverKey, ObserverRef, Store};
use std::any::Any;
use std::sync::Arc;

/// Shared handle to a stack-wide observer.
pub type GlobalObserverRef = Arc<dyn GlobalObserver>;

/// Observer registered on a [`Stack`](crate::Stack) rather than on a single
/// store.
///
/// Global observers are attached to stores created through
/// [`Stack::stateful`](crate::Stack::stateful). Because they watch stores of
/// any state type, they receive the store as `&dyn Any`; narrow it with
/// `downcast_ref::<Store<T>>()` when the type is known.
pub trait GlobalObserver: Send + Sync {
    fn update(&self, pointer: &Pointer, store: &dyn Any);
}

impl<F> GlobalObserver for F
where
    F: Fn(&Pointer, &dyn Any) + Send + Sync,
{
    fn update(&self, pointer: &Pointer, store: &dyn Any) {
        self(pointer, store)
    }
}

/// A global observer bound to one pointer, usable as an `Observer<T>`.
///
/// Its identity is the wrapped global observer, so binding the same global
/// observer to a store twice is detected as a duplicate.
struct PointerScoped {
    pointer: Pointer,
    observer: GlobalObserverRef,
}

impl<T: Clone + Send + Sync + 'static> Observer<T> for PointerScoped {
    fn update(&self, store: &Store<T>) {
        self.observer.update(&self.pointer, store);
    }

    fn key(&self) -> ObserverKey {
        ObserverKey::of(&*self.observer)
    }
}

pub(crate) fn scoped<T>(pointer: Pointer, observer: GlobalObserverRef) -> ObserverRef<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(PointerScoped { pointer, observer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn scoped_observer_forwards_pointer_and_store() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let global: GlobalObserverRef = Arc::new(move |pointer: &Pointer, store: &dyn Any| {
            let state = store.downcast_ref::<Store<u8>>().map(|s| s.get());
            *seen_clone.lock().unwrap() = Some((pointer.clone(), state));
        });

        let store = Store::new(3u8);
        store.attach(scoped(Pointer::from("p"), global)).unwrap();
        store.set(4);

        assert_eq!(
            *seen.lock().unwrap(),
            Some((Pointer::from("p"), Some(4u8)))
        );
    }

    #[test]
    fn scoped_observers_share_identity() {
        let global: GlobalObserverRef = Arc::new(|_: &Pointer, _: &dyn Any| {});
        let first: ObserverRef<i32> = scoped(Pointer::from("p"), global.clone());
        let second: ObserverRef<i32> = scoped(Pointer::from("p"), global);
        assert_eq!(first.key(), second.key());
    }
}
