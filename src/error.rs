//! Error types for freq-table.

use thiserror::Error;

/// Errors surfaced by [`FrequencyTable`](crate::FrequencyTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Construction parameters were rejected; no table was produced.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The bucket array could not be allocated, or its size overflowed.
    /// An existing table is left consistent at its previous bucket count.
    #[error("out of memory allocating {buckets} buckets")]
    OutOfMemory { buckets: usize },
}

impl TableError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TableError::InvalidConfiguration(msg.into())
    }
}

/// Returned by [`FrequencyTable::check_invariants`](crate::FrequencyTable::check_invariants)
/// naming the structural invariant that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violated: {0}")]
pub struct InvariantError(String);

impl InvariantError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
