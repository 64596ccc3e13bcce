//! Diagnostics
//!
//! Nothing in the tracking engine fails with an error. Misuse degrades to a
//! no-op and is reported as a [`ReactivityWarning`] outside production mode.
//! The runtime hands each warning to the configured warn handler, or to
//! `tracing` when none is set.

use thiserror::Error;

/// A recognized, non-fatal misuse of the tracking engine.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReactivityWarning {
    /// `set` was called on null or a primitive.
    #[error("cannot set reactive property on null or primitive value: {target}")]
    SetOnPrimitive {
        /// Debug rendering of the offending target.
        target: String,
    },

    /// `delete` was called on null or a primitive.
    #[error("cannot delete reactive property on null or primitive value: {target}")]
    DeleteOnPrimitive {
        /// Debug rendering of the offending target.
        target: String,
    },

    /// A new key was added to a root instance or to root data.
    #[error(
        "avoid adding reactive properties to a root instance or its root data at runtime; \
         declare `{key}` upfront"
    )]
    AddToRoot {
        /// The key that was rejected.
        key: String,
    },

    /// A key was deleted from a root instance or from root data.
    #[error("avoid deleting properties on a root instance or its root data; set `{key}` to null instead")]
    DeleteFromRoot {
        /// The key that was rejected.
        key: String,
    },

    /// A non-index key was used to address a list.
    #[error("`{key}` is not a valid list index")]
    InvalidListKey {
        /// The key that was rejected.
        key: String,
    },
}

impl ReactivityWarning {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReactivityWarning::SetOnPrimitive { .. } => "set_on_primitive",
            ReactivityWarning::DeleteOnPrimitive { .. } => "delete_on_primitive",
            ReactivityWarning::AddToRoot { .. } => "add_to_root",
            ReactivityWarning::DeleteFromRoot { .. } => "delete_from_root",
            ReactivityWarning::InvalidListKey { .. } => "invalid_list_key",
        }
    }
}
