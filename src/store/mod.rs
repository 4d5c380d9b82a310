//! Observable state containers.
//!
//! A [`Store`] owns one state value and an ordered list of observers that
//! are told, synchronously and in attachment order, whenever the value is
//! replaced.

mod handles;
mod observer;
mod store;

pub use handles::{create_store, StoreReader, StoreWriter};
pub use observer::{observer_fn, FnObserver, Observer, ObserverKey, ObserverRef};
pub use store::Store;
