//! Error types for permission tree construction and updates.
//!
//! The [`Error`] enum provides structured, matchable variants so that
//! collaborators can tell a bad payload apart from a bad toggle.
//!
//! ## Variants
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `InvalidPayload` | builder | Raw payload has an unusable group or leaf shape |
//! | `InvalidAction` | updater | Trailing segment of a target path is not an action |
//! | `PathNotFound` | updater | Target node path resolves to no node |
//! | `AmbiguousPath` | updater | More than one sibling matches (corrupted forest) |
//!
//! Every failure is atomic: the call returns the error and no partial forest.

/// Errors returned by the permission tree builder and updater.
///
/// All public fallible functions return `Result<T, Error>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The raw payload could not be turned into a forest.
    ///
    /// `path` is the dotted path of the offending entry (empty for the
    /// top-level value).
    #[error("invalid payload at `{path}`: {reason}")]
    InvalidPayload {
        /// Dotted path of the offending entry.
        path: String,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// The trailing segment of a target path is not one of
    /// `add`, `view`, `edit`, `edit_own`, `delete`, `delete_own`.
    #[error("invalid action `{0}`: expected one of add, view, edit, edit_own, delete, delete_own")]
    InvalidAction(String),

    /// The node path of a target does not resolve to any node.
    #[error("path not found: `{0}`")]
    PathNotFound(String),

    /// More than one sibling matched a path segment. The builder never
    /// produces such a forest, so this indicates corrupted data.
    #[error("ambiguous path `{path}`: {matches} sibling nodes match")]
    AmbiguousPath {
        /// The path prefix that matched more than once.
        path: String,
        /// Number of siblings that matched.
        matches: usize,
    },
}

impl Error {
    /// Returns the dotted path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::InvalidPayload { path, .. } => Some(path),
            Error::PathNotFound(path) => Some(path),
            Error::AmbiguousPath { path, .. } => Some(path),
            Error::InvalidAction(_) => None,
        }
    }

    pub(crate) fn invalid_payload(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPayload {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
