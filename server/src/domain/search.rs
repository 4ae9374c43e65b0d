//! Route search
//!
//! One search cycle: take the current catalog, compile the selection,
//! serve the rows from the result cache or fetch them on a fresh store
//! connection.

use std::sync::Arc;

use super::catalog::{Catalog, CatalogService};
use super::compiler::FilterCompiler;
use super::error::{ExportError, SearchError};
use super::export::{ExportOutcome, export_csv};
use super::record::RouteRecord;
use super::selection::FilterSelection;
use crate::core::constants::NO_RESULTS_NOTICE;
use crate::data::cache::{CacheKey, TtlCache, ttl_from_secs};
use crate::data::{DataError, RouteStore};

/// Result cache sizing
#[derive(Debug, Clone, Copy)]
pub struct ResultCacheSettings {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

/// Rows matched by one selection
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub rows: Arc<Vec<RouteRecord>>,
    /// Catalog generation the selection was resolved against
    pub generation: u64,
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The "no matches" notice, shown instead of rows and export
    pub fn notice(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_RESULTS_NOTICE)
    }

    pub fn export(&self) -> Result<ExportOutcome, ExportError> {
        export_csv(&self.rows)
    }
}

/// Filters routes through the compiler and caches the results
pub struct RouteSearch {
    store: Arc<RouteStore>,
    compiler: Arc<FilterCompiler>,
    catalog: CatalogService,
    results: TtlCache<String, Arc<Vec<RouteRecord>>>,
}

impl RouteSearch {
    pub fn new(
        store: Arc<RouteStore>,
        compiler: Arc<FilterCompiler>,
        catalog: CatalogService,
        settings: ResultCacheSettings,
    ) -> Self {
        Self {
            store,
            compiler,
            catalog,
            results: TtlCache::new(
                "search",
                settings.max_entries,
                ttl_from_secs(settings.ttl_secs),
            ),
        }
    }

    pub async fn catalog(&self) -> Result<Arc<Catalog>, DataError> {
        self.catalog.current().await
    }

    /// Reload the catalog and drop every cached result
    pub async fn refresh_catalog(&self) -> Result<Arc<Catalog>, DataError> {
        self.results.invalidate_all();
        let catalog = self.catalog.refresh().await?;
        tracing::info!(generation = catalog.generation, "Route catalog refreshed");
        Ok(catalog)
    }

    /// Rows matching `selection`. Zero rows is a normal outcome.
    pub async fn search(&self, selection: &FilterSelection) -> Result<SearchOutcome, SearchError> {
        let catalog = self.catalog.current().await?;

        // Nothing constrains the selection, so the answer is the catalog itself.
        if selection.is_unconstrained() {
            return Ok(SearchOutcome {
                rows: Arc::clone(&catalog.records),
                generation: catalog.generation,
            });
        }

        let query = self.compiler.compile(selection, &catalog.bounds)?;
        let key = CacheKey::search(catalog.generation, &query);
        let rows = self
            .results
            .get_or_try_insert_with(key, async {
                let rows = self.store.fetch(&query).await?;
                Ok::<_, DataError>(Arc::new(rows))
            })
            .await
            .map_err(DataError::from)?;

        tracing::debug!(
            rows = rows.len(),
            generation = catalog.generation,
            "Route search completed"
        );
        Ok(SearchOutcome {
            rows,
            generation: catalog.generation,
        })
    }

    #[cfg(test)]
    async fn cached_results(&self) -> u64 {
        self.results.entry_count().await
    }
}
