//! Integration tests for Storestack

use std::any::Any;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use storestack::{
    create_store, observer_fn, DeclareOptions, ErrorHandling, InsertOptions, Observer, Pointer,
    Stack, Store, StoreError,
};

#[derive(Clone, Debug, PartialEq)]
struct Profile {
    name: String,
    tags: Vec<String>,
}

#[test]
fn replace_then_read_round_trips_and_isolates() {
    let store = Store::new(Profile {
        name: "a".to_string(),
        tags: Vec::new(),
    });

    let mut value = Profile {
        name: "b".to_string(),
        tags: vec!["x".to_string()],
    };
    store.set(value.clone());
    assert_eq!(store.get(), value);

    // Mutating the caller's copy never reaches the store.
    value.tags.push("y".to_string());
    assert_eq!(store.get().tags, vec!["x".to_string()]);

    // Nor does mutating a snapshot.
    let mut snapshot = store.get();
    snapshot.name.push('!');
    assert_eq!(store.get().name, "b");
}

#[test]
fn duplicate_attach_with_skip_fires_once() {
    let store = Store::new(0);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    let observer = observer_fn(move |_: i32| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });

    store.attach_with(observer.clone(), true).unwrap();
    store.attach_with(observer.clone(), true).unwrap();
    store.notify();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn strict_duplicate_attach_leaves_list_unchanged() {
    let store = Store::new(0);
    let observer = observer_fn(|_: i32| {});
    store.attach(observer.clone()).unwrap();
    assert!(matches!(
        store.attach(observer),
        Err(StoreError::DuplicateObserver { .. })
    ));
    assert_eq!(store.observer_count(), 1);
}

#[test]
fn detach_unknown_leaves_list_unchanged() {
    let store = Store::new(0);
    let attached = observer_fn(|_: i32| {});
    store.attach(attached.clone()).unwrap();
    assert!(matches!(
        store.detach(&observer_fn(|_: i32| {})),
        Err(StoreError::UnknownObserver { .. })
    ));
    assert!(store.is_attached(&attached));
}

#[test]
fn observers_fire_in_attachment_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let store = Store::new(0);

    let log_a = log.clone();
    store
        .attach(observer_fn(move |n: i32| log_a.lock().unwrap().push(("a", n))))
        .unwrap();
    let log_b = log.clone();
    store
        .attach(observer_fn(move |n: i32| log_b.lock().unwrap().push(("b", n))))
        .unwrap();

    store.set(1);
    assert_eq!(*log.lock().unwrap(), vec![("a", 1), ("b", 1)]);
}

#[test]
fn pointer_collision_and_override() {
    let stack = Stack::new();
    stack
        .insert_at(Store::new("first"), "p", InsertOptions::new())
        .unwrap();

    let err = stack
        .insert_at(Store::new("second"), "p", InsertOptions::new())
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::MemoryAllocation {
            pointer: Pointer::from("p")
        }
    );

    let second = Store::new("second");
    stack
        .insert_at(
            second.clone(),
            "p",
            InsertOptions::new().override_existing(true),
        )
        .unwrap();
    assert_eq!(stack.lookup::<&str>("p").unwrap().get(), second.get());
}

#[test]
fn removing_missing_pointer_fails() {
    let stack = Stack::new();
    assert!(matches!(
        stack.remove("never-inserted", false),
        Err(StoreError::NullPointer { .. })
    ));
}

#[test]
fn upsert_is_non_destructive() {
    let stack = Stack::new();
    stack.upsert("v1".to_string(), "p", []).unwrap();
    stack.upsert("v2".to_string(), "p", []).unwrap();
    assert_eq!(stack.lookup::<String>("p").unwrap().get(), "v1");
}

#[test]
fn allocate_then_transform() {
    let stack = Stack::new();
    let pointer = stack.allocate(Store::new(0));
    let store = stack.lookup::<i32>(&pointer).unwrap();
    assert_eq!(store.get(), 0);
    store.update(|prev| prev + 1);
    assert_eq!(store.get(), 1);
}

#[test]
fn stateful_reader_and_writer() {
    let stack = Stack::new();
    let (read, write) = stack.stateful("p", 0, [], true).unwrap();
    write.set(5);
    assert_eq!(read.get(), 5);
    write.update(|prev| prev + 1);
    assert_eq!(read.get(), 6);
}

#[test]
fn detached_observer_stops_seeing_changes() {
    let store = Store::new("a".to_string());
    let x = Arc::new(Mutex::new(String::new()));
    let x_clone = x.clone();
    let observer = observer_fn(move |state: String| *x_clone.lock().unwrap() = state);

    store.attach(observer.clone()).unwrap();
    store.set("b".to_string());
    assert_eq!(*x.lock().unwrap(), "b");

    store.detach(&observer).unwrap();
    store.set("c".to_string());
    assert_eq!(*x.lock().unwrap(), "b");
}

#[test]
fn custom_observer_reads_through_store() {
    struct History(Mutex<Vec<i32>>);

    impl Observer<i32> for History {
        fn update(&self, store: &Store<i32>) {
            self.0.lock().unwrap().push(store.get());
        }
    }

    let history = Arc::new(History(Mutex::new(Vec::new())));
    let store = Store::new(0);
    store.attach(history.clone()).unwrap();

    store.set(1);
    store.update(|n| n * 10);
    assert_eq!(*history.0.lock().unwrap(), vec![1, 10]);
}

#[test]
fn global_observers_watch_stateful_stores() {
    let stack = Stack::new();
    let changed = Arc::new(Mutex::new(Vec::new()));
    let changed_clone = changed.clone();
    stack
        .add_global_observer(Arc::new(move |pointer: &Pointer, _: &dyn Any| {
            changed_clone.lock().unwrap().push(pointer.to_string());
        }))
        .unwrap();

    let (_, set_a) = stack.stateful("a", 0, [], true).unwrap();
    let (_, set_b) = stack.stateful("b", false, [], true).unwrap();
    set_a.set(1);
    set_b.set(true);

    assert_eq!(*changed.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn declare_with_error_handling() {
    let stack = Stack::new();
    let pointer = stack
        .declare(1, DeclareOptions::new().pointer("settings"))
        .unwrap();
    assert_eq!(pointer, Pointer::from("settings"));

    assert!(stack
        .declare(2, DeclareOptions::new().pointer("settings"))
        .is_err());
    assert!(stack
        .declare(
            2,
            DeclareOptions::new()
                .pointer("settings")
                .error_handling(ErrorHandling::new().verbose(true)),
        )
        .is_ok());
    assert_eq!(stack.lookup::<i32>("settings").unwrap().get(), 1);
}

#[test]
fn stores_are_shared_across_threads() {
    let stack = Arc::new(Stack::new());
    let pointer = stack.allocate(Store::new(0usize));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let stack = stack.clone();
            let pointer = pointer.clone();
            std::thread::spawn(move || {
                let store = stack.lookup::<usize>(&pointer).unwrap();
                for _ in 0..100 {
                    store.update(|n| n + 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stack.lookup::<usize>(&pointer).unwrap().get(), 400);
}

#[test]
fn detached_store_pair() {
    let (count, set_count) = create_store(1);
    set_count.update(|n| n * 2);
    assert_eq!(count.get(), 2);
}
