//! # Storestack
//!
//! A registry of observable state stores for Rust.
//!
//! Storestack provides two levels of abstraction:
//!
//! ## Stores
//!
//! - `Store<T>` - Thread-safe container for one state value
//! - `Observer<T>` - Notified synchronously, in attachment order, after every change
//! - Reads hand out copies, so state is only ever changed through the store
//!
//! ## Stack
//!
//! - `Stack` - Keyed registry of stores addressed by opaque `Pointer`s
//! - Allocate, insert with collision policy, upsert, lookup and remove
//! - Global observers and a lazily created process-wide instance
//!
//! ```
//! use storestack::{observer_fn, Stack};
//!
//! let stack = Stack::new();
//! let store = stack
//!     .upsert(0, "clicks", [observer_fn(|n: i32| println!("clicks: {n}"))])
//!     .unwrap();
//! store.update(|n| n + 1);
//! assert_eq!(stack.lookup::<i32>("clicks").unwrap().get(), 1);
//! ```

pub mod error;
pub mod pointer;
pub mod stack;
pub mod store;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use pointer::{random_id, Pointer};
pub use stack::{DeclareOptions, ErrorHandling, GlobalObserver, GlobalObserverRef, InsertOptions, Stack};
pub use store::{
    create_store, observer_fn, Observer, ObserverKey, ObserverRef, Store, StoreReader, StoreWriter,
};
