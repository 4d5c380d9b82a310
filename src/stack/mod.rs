//! Pointer-addressed registry of stores.
//!
//! A [`Stack`] maps [`Pointer`](crate::Pointer)s to stores of any state
//! type, with explicit collision policy on insert, non-destructive upsert,
//! and stack-wide observers for stores created through
//! [`Stack::stateful`].

mod declare;
mod global;
mod stack;

pub use declare::{DeclareOptions, ErrorHandling};
pub use global::{GlobalObserver, GlobalObserverRef};
pub use stack::{InsertOptions, Stack};
