//! Route filtering domain
//!
//! - `record` - route records and duration normalization
//! - `selection` - filter selections, bands, and sentinels
//! - `catalog` - the unfiltered catalog and its option sets
//! - `compiler` - selection to parameterized query
//! - `search` - cached search cycle over the store
//! - `export` - CSV export of result rows

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod export;
pub mod record;
pub mod search;
pub mod selection;

pub use catalog::{Catalog, CatalogBounds, CatalogOptions, CatalogService};
pub use compiler::{CompiledQuery, FilterCompiler};
pub use error::{ExportError, FilterError, SearchError};
pub use export::{CsvExport, ExportOutcome};
pub use record::RouteRecord;
pub use search::{ResultCacheSettings, RouteSearch, SearchOutcome};
pub use selection::FilterSelection;
