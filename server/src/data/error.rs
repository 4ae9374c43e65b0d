//! Data layer error type

use std::sync::Arc;

use thiserror::Error;

/// Errors raised while talking to the route store
#[derive(Error, Debug)]
pub enum DataError {
    /// The store could not be opened or the route table is missing
    #[error("Route store unavailable ({path}): {source}")]
    Unavailable {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    /// The store opened but has no route table
    #[error("Route table '{table}' not found in {path}")]
    MissingTable { path: String, table: String },

    /// A query failed after the store was reached
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Error shared between callers waiting on the same cache load
    #[error(transparent)]
    Shared(Arc<DataError>),
}

impl DataError {
    /// Whether the failure means the store itself cannot be reached
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable { .. } | Self::MissingTable { .. } => true,
            Self::Query(_) => false,
            Self::Shared(inner) => inner.is_unavailable(),
        }
    }
}

impl From<Arc<DataError>> for DataError {
    fn from(err: Arc<DataError>) -> Self {
        match Arc::try_unwrap(err) {
            Ok(err) => err,
            Err(shared) => Self::Shared(shared),
        }
    }
}
