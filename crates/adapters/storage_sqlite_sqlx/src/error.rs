//! Storage-specific error type wrapping sqlx errors.

use toxotes_domain::error::ToxotesError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An update targeted a row that no longer exists.
    #[error("thing {0} disappeared during update")]
    MissingRow(String),
}

impl From<StorageError> for ToxotesError {
    fn from(err: StorageError) -> Self {
        Self::Persistence(Box::new(err))
    }
}
