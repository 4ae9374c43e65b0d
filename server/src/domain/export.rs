//! CSV export of filtered routes

use super::error::ExportError;
use super::record::RouteRecord;
use crate::core::constants::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};

/// A downloadable CSV document
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// Nothing matched; no file is offered
    NoResults,
    Csv(CsvExport),
}

/// Serialize `rows` with a header of record field names and no index column
pub fn export_csv(rows: &[RouteRecord]) -> Result<ExportOutcome, ExportError> {
    if rows.is_empty() {
        return Ok(ExportOutcome::NoResults);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;

    tracing::debug!(rows = rows.len(), bytes = body.len(), "CSV export written");
    Ok(ExportOutcome::Csv(CsvExport {
        file_name: EXPORT_FILE_NAME,
        content_type: EXPORT_CONTENT_TYPE,
        body,
    }))
}
