//! Opaque string handles addressing stores inside a [`Stack`](crate::Stack).

use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Generate a short, collision-resistant random identifier.
///
/// Used for freshly allocated pointers and for store ids.
pub fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Key of a store within a stack.
///
/// Nothing is assumed about its structure beyond equality.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(String);

impl Pointer {
    /// Create a fresh pointer from [`random_id`].
    pub fn generate() -> Self {
        Self(random_id())
    }

    /// Borrow the pointer as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pointer {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Pointer {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Pointer> for Pointer {
    fn from(value: &Pointer) -> Self {
        value.clone()
    }
}

impl AsRef<str> for Pointer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Pointer {
    fn borrow(&self) -> &str {
        &self.0
    }
}
