//! Domain error types

use thiserror::Error;

use crate::data::DataError;

/// A filter selection that the compiler refuses to turn into a query.
///
/// The input surfaces only offer legal values, so reaching this is a
/// contract violation by the caller rather than a user mistake.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid table name '{0}': must be a plain SQL identifier")]
    InvalidTable(String),
}

/// CSV export failure
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Failure of a search cycle (compile, then fetch)
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Data(#[from] DataError),
}
