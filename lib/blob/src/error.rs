use thiserror::Error;

/// Errors from the blob store.
#[derive(Error, Debug)]
pub enum BlobError {
    /// Key failed validation and never reached the filesystem.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// Filesystem failure underneath the store.
    #[error("blob io: {0}")]
    Io(String),
}

impl BlobError {
    /// Wrap any displayable failure as an `Io` error.
    pub(crate) fn io(err: impl std::fmt::Display) -> Self {
        Self::Io(err.to_string())
    }
}
