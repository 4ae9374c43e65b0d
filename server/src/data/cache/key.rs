//! Type-safe cache key builder with versioning

use crate::core::constants::CACHE_KEY_VERSION;
use crate::domain::compiler::CompiledQuery;

/// Type-safe cache key builder
///
/// All keys are prefixed with a version (e.g., "v1:") to allow
/// invalidating all cached data on schema changes.
pub struct CacheKey;

impl CacheKey {
    /// Cache key for the catalog snapshot loaded by `query`
    pub fn catalog(query: &CompiledQuery) -> String {
        format!("{}:catalog:{}", CACHE_KEY_VERSION, query.fingerprint())
    }

    /// Cache key for the rows of `query` evaluated against catalog `generation`
    pub fn search(generation: u64, query: &CompiledQuery) -> String {
        format!(
            "{}:search:{}:{}",
            CACHE_KEY_VERSION,
            generation,
            query.fingerprint()
        )
    }
}
