//! Order service error type.

use thiserror::Error;

use crate::db::RepositoryError;

/// A failed order operation.
///
/// Carries the operation name for diagnostics; callers branch on
/// [`OrderError::kind`].
#[derive(Debug, Error)]
#[error("{operation}: {source}")]
pub struct OrderError {
    operation: &'static str,
    #[source]
    source: RepositoryError,
}

impl OrderError {
    pub(super) const fn new(operation: &'static str, source: RepositoryError) -> Self {
        Self { operation, source }
    }

    /// Name of the operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// The underlying store error.
    #[must_use]
    pub const fn kind(&self) -> &RepositoryError {
        &self.source
    }

    /// Whether the order was missing or owned by someone else.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.source, RepositoryError::NotFound)
    }
}
