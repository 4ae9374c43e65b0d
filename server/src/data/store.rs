//! Route store
//!
//! Read-only access to the SQLite route table. Every query opens its own
//! connection and closes it before returning, so no connection is held
//! between interactions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::log::LevelFilter;

use super::error::DataError;
use crate::core::constants::SQLITE_BUSY_TIMEOUT_SECS;
use crate::domain::compiler::{CompiledQuery, SqlValue};
use crate::domain::record::{RouteRecord, RouteRow};

/// Handle to the route database file
#[derive(Debug, Clone)]
pub struct RouteStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl RouteStore {
    /// Open the store and verify that `table` exists.
    ///
    /// The file is never created; a missing file or table is reported as
    /// the store being unavailable.
    pub async fn open(path: &Path, table: &str) -> Result<Self, DataError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(true)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .log_statements(LevelFilter::Trace);

        let store = Self {
            path: path.to_path_buf(),
            options,
        };
        store.ping(table).await?;

        tracing::debug!(path = %path.display(), table, "RouteStore opened");
        Ok(store)
    }

    /// Check that the store is reachable and holds `table`
    pub async fn ping(&self, table: &str) -> Result<(), DataError> {
        let mut conn = self.connect().await?;
        let result: Result<Option<(i64,)>, sqlx::Error> = sqlx::query_as(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
        )
        .bind(table)
        .fetch_optional(&mut conn)
        .await;
        self.release(conn).await;

        match result? {
            Some(_) => Ok(()),
            None => Err(DataError::MissingTable {
                path: self.path.display().to_string(),
                table: table.to_string(),
            }),
        }
    }

    /// Run a compiled query and return the normalized records
    pub async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<RouteRecord>, DataError> {
        let mut conn = self.connect().await?;

        let mut statement = sqlx::query_as::<_, RouteRow>(&query.sql);
        for value in &query.params {
            statement = match value {
                SqlValue::Text(s) => statement.bind(s.as_str()),
                SqlValue::Integer(i) => statement.bind(*i),
                SqlValue::Real(r) => statement.bind(*r),
            };
        }

        let result = statement.fetch_all(&mut conn).await;
        self.release(conn).await;

        let rows = result?;
        tracing::debug!(rows = rows.len(), "Route query completed");
        Ok(rows.into_iter().map(RouteRecord::from).collect())
    }

    async fn connect(&self) -> Result<SqliteConnection, DataError> {
        self.options
            .connect()
            .await
            .map_err(|source| DataError::Unavailable {
                path: self.path.display().to_string(),
                source,
            })
    }

    async fn release(&self, conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close route store connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{SeededStore, route};
    use crate::domain::compiler::FilterCompiler;

    #[tokio::test]
    async fn test_open_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = RouteStore::open(&dir.path().join("missing.db"), "bus_routes")
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_open_missing_table() {
        let seeded = SeededStore::new(&[]).await;
        let err = RouteStore::open(seeded.path(), "other_routes")
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::MissingTable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_catalog() {
        let seeded = SeededStore::new(&[
            route("Sleeper", "A to B", 100.0, 2, "08:00:00", "10:00:00", "2h"),
            route("Seater", "A to C", 300.0, 5, "21:15:00", "06:00:00", "8h 45m"),
        ])
        .await;
        let store = RouteStore::open(seeded.path(), "bus_routes").await.unwrap();

        let compiler = FilterCompiler::new("bus_routes").unwrap();
        let rows = store.fetch(&compiler.catalog_query()).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].duration, 8);
        assert_eq!(rows[1].departing_time, "21:15:00");
    }

    #[tokio::test]
    async fn test_fetch_binds_parameters() {
        let seeded = SeededStore::new(&[
            route("Sleeper", "A to B", 100.0, 1, "08:00:00", "10:00:00", "2h"),
            route("Sleeper", "A to B", 150.0, 2, "09:00:00", "11:00:00", "2h"),
            route("Sleeper", "A to B", 200.0, 5, "10:00:00", "12:00:00", "2h"),
        ])
        .await;
        let store = RouteStore::open(seeded.path(), "bus_routes").await.unwrap();

        let query = CompiledQuery {
            sql: format!(
                "SELECT {} FROM bus_routes WHERE seats_available >= ?",
                crate::domain::record::ROUTE_COLUMNS
            ),
            params: vec![SqlValue::Integer(2)],
        };
        let rows = store.fetch(&query).await.unwrap();

        let seats: Vec<i64> = rows.iter().map(|r| r.seats_available).collect();
        assert_eq!(seats, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_store_is_read_only() {
        let seeded = SeededStore::new(&[]).await;
        let store = RouteStore::open(seeded.path(), "bus_routes").await.unwrap();

        let mut conn = store.connect().await.unwrap();
        let result = sqlx::query("DELETE FROM bus_routes").execute(&mut conn).await;
        store.release(conn).await;

        assert!(result.is_err());
    }
}
