//! Data storage layer
//!
//! - `store` - read-only SQLite route store, one connection per query
//! - `cache` - in-memory TTL caches for the catalog and search results
//! - `error` - data layer error type

pub mod cache;
pub mod error;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use error::DataError;
pub use store::RouteStore;
