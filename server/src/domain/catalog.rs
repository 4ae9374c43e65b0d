//! Route catalog
//!
//! The catalog is the full, unfiltered route table. It seeds the selectable
//! options (distinct bus types and routes, price range, seat choices,
//! maximum duration) and supplies the bounds that open-ended bands resolve
//! against.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::compiler::FilterCompiler;
use super::record::RouteRecord;
use super::selection::{Band, DurationBand, PriceBand, TimeBand};
use crate::core::constants::{
    ANYTHING, CATALOG_CACHE_MAX_ENTRIES, STAR_RATING_MAX, STAR_RATING_MIN,
};
use crate::data::cache::{CacheKey, TtlCache, ttl_from_secs};
use crate::data::{DataError, RouteStore};

/// Observed ranges in a catalog snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CatalogBounds {
    pub price_min: f64,
    pub price_max: f64,
    pub max_seats: i64,
    pub max_duration: i64,
}

impl CatalogBounds {
    /// Bounds of `records`; an empty catalog yields all zeros
    pub fn observe(records: &[RouteRecord]) -> Self {
        if records.is_empty() {
            return Self {
                price_min: 0.0,
                price_max: 0.0,
                max_seats: 0,
                max_duration: 0,
            };
        }

        let (price_min, price_max) = records.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), r| (lo.min(r.price), hi.max(r.price)),
        );

        Self {
            price_min,
            price_max,
            max_seats: records.iter().map(|r| r.seats_available).max().unwrap_or(0),
            max_duration: records.iter().map(|r| r.duration).max().unwrap_or(0),
        }
    }
}

/// Immutable snapshot of the route table
#[derive(Debug)]
pub struct Catalog {
    pub records: Arc<Vec<RouteRecord>>,
    pub bounds: CatalogBounds,
    /// Distinct bus types in first-seen order
    pub bus_types: Vec<String>,
    /// Distinct route names in first-seen order
    pub routes: Vec<String>,
    /// Increases with every load; results are cached per generation
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(records: Vec<RouteRecord>, generation: u64) -> Self {
        let bounds = CatalogBounds::observe(&records);
        let bus_types = distinct(records.iter().map(|r| r.bustype.as_str()));
        let routes = distinct(records.iter().map(|r| r.route_name.as_str()));

        Self {
            records: Arc::new(records),
            bounds,
            bus_types,
            routes,
            generation,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selectable options for the input surface
    pub fn options(&self) -> CatalogOptions {
        let with_anything = |values: &[String]| {
            std::iter::once(ANYTHING.to_string())
                .chain(values.iter().cloned())
                .collect()
        };

        let seat_choices = std::iter::once(ANYTHING.to_string())
            .chain((0..=self.bounds.max_seats.max(0)).map(|n| n.to_string()))
            .collect();

        CatalogOptions {
            bus_types: with_anything(&self.bus_types),
            routes: with_anything(&self.routes),
            price_bands: PriceBand::ALL
                .iter()
                .map(|b| {
                    let (min, max) = b.resolve(&self.bounds);
                    BandOption::new(b.label(), min, max)
                })
                .collect(),
            star_rating: [STAR_RATING_MIN, STAR_RATING_MAX],
            seat_choices,
            time_bands: TimeBand::ALL
                .iter()
                .map(|b| {
                    let (min, max) = b.resolve();
                    BandOption::new(b.label(), min as f64, max as f64)
                })
                .collect(),
            duration_bands: DurationBand::ALL
                .iter()
                .map(|b| {
                    let (min, max) = b.resolve(&self.bounds);
                    BandOption::new(b.label(), min as f64, max as f64)
                })
                .collect(),
            bounds: self.bounds,
            total_routes: self.records.len(),
            generation: self.generation,
            loaded_at: self.loaded_at,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// A band label with the closed interval it currently resolves to
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BandOption {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl BandOption {
    fn new(label: &'static str, min: f64, max: f64) -> Self {
        Self { label, min, max }
    }
}

/// Everything the input surface needs to render its controls
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogOptions {
    pub bus_types: Vec<String>,
    pub routes: Vec<String>,
    pub price_bands: Vec<BandOption>,
    pub star_rating: [f64; 2],
    pub seat_choices: Vec<String>,
    pub time_bands: Vec<BandOption>,
    pub duration_bands: Vec<BandOption>,
    pub bounds: CatalogBounds,
    pub total_routes: usize,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Loads the catalog at most once per query text until it expires
pub struct CatalogService {
    store: Arc<RouteStore>,
    compiler: Arc<FilterCompiler>,
    cache: TtlCache<String, Arc<Catalog>>,
    generation: AtomicU64,
}

impl CatalogService {
    pub fn new(store: Arc<RouteStore>, compiler: Arc<FilterCompiler>, ttl_secs: u64) -> Self {
        Self {
            store,
            compiler,
            cache: TtlCache::new("catalog", CATALOG_CACHE_MAX_ENTRIES, ttl_from_secs(ttl_secs)),
            generation: AtomicU64::new(0),
        }
    }

    /// Current catalog snapshot, loading it if absent or expired
    pub async fn current(&self) -> Result<Arc<Catalog>, DataError> {
        let query = self.compiler.catalog_query();
        let key = CacheKey::catalog(&query);

        self.cache
            .get_or_try_insert_with(key, async {
                let records = self.store.fetch(&query).await?;
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                let catalog = Catalog::new(records, generation);

                tracing::info!(
                    routes = catalog.len(),
                    bus_types = catalog.bus_types.len(),
                    generation,
                    "Route catalog loaded"
                );
                Ok::<_, DataError>(Arc::new(catalog))
            })
            .await
            .map_err(DataError::from)
    }

    /// Drop the cached snapshot and load a fresh one
    pub async fn refresh(&self) -> Result<Arc<Catalog>, DataError> {
        self.cache.invalidate_all();
        self.current().await
    }
}
