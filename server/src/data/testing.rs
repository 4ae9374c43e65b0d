//! Test fixtures: a seeded route database in a temporary directory

use std::path::{Path, PathBuf};

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tempfile::TempDir;

use crate::domain::record::RouteRow;

pub const TEST_SCHEMA: &str = r#"
CREATE TABLE bus_routes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    route_name TEXT NOT NULL,
    route_link TEXT,
    busname TEXT,
    bustype TEXT NOT NULL,
    departing_time TEXT NOT NULL,
    duration TEXT,
    reaching_time TEXT NOT NULL,
    star_rating REAL,
    price REAL NOT NULL,
    seats_available INTEGER NOT NULL
)
"#;

/// Build a raw row with a full star rating of 4.0
pub fn route(
    bustype: &str,
    route_name: &str,
    price: f64,
    seats_available: i64,
    departing_time: &str,
    reaching_time: &str,
    duration: &str,
) -> RouteRow {
    RouteRow {
        bustype: bustype.to_string(),
        route_name: route_name.to_string(),
        price,
        star_rating: Some(4.0),
        seats_available,
        departing_time: departing_time.to_string(),
        reaching_time: reaching_time.to_string(),
        duration: Some(duration.to_string()),
    }
}

/// A database file that lives as long as this value
pub struct SeededStore {
    _dir: TempDir,
    path: PathBuf,
}

impl SeededStore {
    pub async fn new(rows: &[RouteRow]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redbus.db");

        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .connect()
            .await
            .unwrap();
        sqlx::query(TEST_SCHEMA).execute(&mut conn).await.unwrap();
        conn.close().await.unwrap();

        let seeded = Self { _dir: dir, path };
        seeded.insert(rows).await;
        seeded
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add rows behind the application's back (the application never writes)
    pub async fn insert(&self, rows: &[RouteRow]) {
        let mut conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .connect()
            .await
            .unwrap();
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO bus_routes (
                    route_name, bustype, departing_time, duration, reaching_time,
                    star_rating, price, seats_available
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.route_name)
            .bind(&row.bustype)
            .bind(&row.departing_time)
            .bind(&row.duration)
            .bind(&row.reaching_time)
            .bind(row.star_rating)
            .bind(row.price)
            .bind(row.seats_available)
            .execute(&mut conn)
            .await
            .unwrap();
        }
        conn.close().await.unwrap();
    }
}
