//! Error types for store and stack operations.

use crate::pointer::Pointer;
use thiserror::Error;

/// Errors raised by [`Store`](crate::Store) and [`Stack`](crate::Stack).
///
/// None of these are transient; they signal a caller mistake and are
/// returned immediately without any retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("observer is already attached to store {store}")]
    DuplicateObserver { store: String },

    #[error("observer is not attached to store {store}")]
    UnknownObserver { store: String },

    #[error("pointer {pointer} is already occupied")]
    MemoryAllocation { pointer: Pointer },

    #[error("no store at pointer {pointer}")]
    NullPointer { pointer: Pointer },

    #[error("store at pointer {pointer} does not hold {expected}")]
    TypeMismatch {
        pointer: Pointer,
        expected: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
