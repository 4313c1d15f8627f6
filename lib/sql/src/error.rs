use thiserror::Error;

/// SQL layer errors. Services flatten these into their own storage error at
/// the boundary, so the variants matter mostly for logs.
#[derive(Error, Debug)]
pub enum SQLError {
    /// Opening or configuring the database failed.
    #[error("sqlite open: {0}")]
    Open(String),

    /// A statement failed to prepare or run.
    #[error("sql statement: {0}")]
    Statement(String),

    /// The connection mutex was poisoned by a panicking holder.
    #[error("sql connection poisoned: {0}")]
    Poisoned(String),
}

impl SQLError {
    /// Wrap any displayable failure as a `Statement` error.
    pub(crate) fn statement(err: impl std::fmt::Display) -> Self {
        Self::Statement(err.to_string())
    }
}
