use thiserror::Error;

/// Errors surfaced by the KV layer.
#[derive(Error, Debug)]
pub enum KVError {
    /// Write attempt against a file-layer key.
    #[error("key is read-only: {0}")]
    ReadOnly(String),

    /// The backing database or filesystem failed.
    #[error("kv storage: {0}")]
    Storage(String),
}

impl KVError {
    /// Wrap any displayable failure as a `Storage` error.
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
