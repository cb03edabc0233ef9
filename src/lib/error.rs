use thiserror::Error;

/// Errors returned by lookups that require the key to be present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key is not stored in the tree.
    #[error("key not found")]
    NotFound,
}
