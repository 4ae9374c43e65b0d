//! Filter compiler
//!
//! Turns a `FilterSelection` into a parameterized SELECT over the route
//! table. Selected values never reach the SQL text: every value travels as a
//! bound parameter, and the only identifiers in the statement are the
//! compiler's own column expressions and the validated table name.

use std::fmt::Write as _;
use std::sync::LazyLock;

use super::catalog::CatalogBounds;
use super::error::FilterError;
use super::record::ROUTE_COLUMNS;
use super::selection::{Band, Choice, FilterSelection, SeatThreshold};

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Debug formatting quotes and escapes, so a value can never be
            // confused with a separator in a cache fingerprint.
            Self::Text(s) => write!(f, "t{:?}", s),
            Self::Integer(i) => write!(f, "i{}", i),
            Self::Real(r) => write!(f, "r{}", r),
        }
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

/// Filterable column expressions.
///
/// Hour and duration columns are derived in the store so that filtering
/// stays a single declarative query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    BusType,
    RouteName,
    Price,
    StarRating,
    SeatsAvailable,
    DepartureHour,
    ArrivalHour,
    DurationHours,
}

impl Column {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::BusType => "bustype",
            Self::RouteName => "route_name",
            Self::Price => "price",
            Self::StarRating => "star_rating",
            Self::SeatsAvailable => "seats_available",
            Self::DepartureHour => "CAST(strftime('%H', departing_time) AS INTEGER)",
            Self::ArrivalHour => "CAST(strftime('%H', reaching_time) AS INTEGER)",
            Self::DurationHours => DURATION_HOURS_SQL.as_str(),
        }
    }
}

/// First run of ASCII digits in the free-text `duration` column as an
/// integer, 0 when there is none. Matches `record::normalize_duration`,
/// including saturation of oversized numbers at `i64::MAX`.
///
/// The first digit position is the smallest non-zero `instr` over '0'..'9';
/// SQLite's CAST then reads the longest integer prefix from there.
static DURATION_HOURS_SQL: LazyLock<String> = LazyLock::new(|| {
    let positions: Vec<String> = (0..=9)
        .map(|d| format!("COALESCE(NULLIF(instr(duration, '{}'), 0), 1000000000)", d))
        .collect();
    format!(
        "COALESCE(CAST(substr(duration, min({})) AS INTEGER), 0)",
        positions.join(", ")
    )
});

/// One conjunct of the WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `column IN (?, ...)`
    OneOf { column: Column, values: Vec<String> },
    /// `column BETWEEN ? AND ?` (inclusive)
    Between {
        column: Column,
        low: SqlValue,
        high: SqlValue,
    },
    /// `column >= ?`
    AtLeast { column: Column, value: SqlValue },
}

impl Constraint {
    /// Generate SQL WHERE clause fragment
    /// Returns the SQL clause with ? placeholders and updates params
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            Self::OneOf { column, values } => {
                let placeholders: Vec<&str> = values
                    .iter()
                    .map(|v| {
                        params.values.push(SqlValue::Text(v.clone()));
                        "?"
                    })
                    .collect();
                format!("{} IN ({})", column.sql(), placeholders.join(", "))
            }
            Self::Between { column, low, high } => {
                params.values.push(low.clone());
                params.values.push(high.clone());
                format!("{} BETWEEN ? AND ?", column.sql())
            }
            Self::AtLeast { column, value } => {
                params.values.push(value.clone());
                format!("{} >= ?", column.sql())
            }
        }
    }
}

/// A ready-to-execute statement
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl CompiledQuery {
    /// Canonical text of statement plus bindings.
    ///
    /// Two selections that resolve to the same constraints share a
    /// fingerprint, which makes it a normalized key for result caching.
    pub fn fingerprint(&self) -> String {
        let mut out = self.sql.clone();
        for value in &self.params {
            let _ = write!(out, "|{}", value);
        }
        out
    }
}

/// Check that a table name is a plain identifier (it cannot be bound)
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Compiles filter selections against one route table
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    table: String,
}

impl FilterCompiler {
    pub fn new(table: &str) -> Result<Self, FilterError> {
        if !is_valid_table_name(table) {
            return Err(FilterError::InvalidTable(table.to_string()));
        }
        Ok(Self {
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The unfiltered statement used to load the catalog
    pub fn catalog_query(&self) -> CompiledQuery {
        CompiledQuery {
            sql: self.select_clause(),
            params: Vec::new(),
        }
    }

    /// Translate a selection into the constraints it implies.
    ///
    /// Fields left at `Anything` (or the full star range) contribute no
    /// constraint at all. Bands resolve against `bounds`, the catalog
    /// snapshot the selection was made from.
    pub fn constraints(
        &self,
        selection: &FilterSelection,
        bounds: &CatalogBounds,
    ) -> Result<Vec<Constraint>, FilterError> {
        selection.star_rating.check()?;

        let mut constraints = Vec::new();

        if let Choice::OneOf(values) = &selection.bustypes {
            constraints.push(Constraint::OneOf {
                column: Column::BusType,
                values: values.iter().cloned().collect(),
            });
        }

        if let Choice::OneOf(values) = &selection.routes {
            constraints.push(Constraint::OneOf {
                column: Column::RouteName,
                values: values.iter().cloned().collect(),
            });
        }

        if !selection.price.is_anything() {
            let (low, high) = selection.price.resolve(bounds);
            constraints.push(Constraint::Between {
                column: Column::Price,
                low: SqlValue::Real(low),
                high: SqlValue::Real(high),
            });
        }

        if let SeatThreshold::AtLeast(n) = selection.seats {
            constraints.push(Constraint::AtLeast {
                column: Column::SeatsAvailable,
                value: SqlValue::Integer(i64::from(n)),
            });
        }

        if !selection.star_rating.is_full() {
            constraints.push(Constraint::Between {
                column: Column::StarRating,
                low: SqlValue::Real(selection.star_rating.min()),
                high: SqlValue::Real(selection.star_rating.max()),
            });
        }

        for (band, column) in [
            (selection.departure, Column::DepartureHour),
            (selection.arrival, Column::ArrivalHour),
        ] {
            if !band.is_anything() {
                let (low, high) = band.resolve();
                constraints.push(Constraint::Between {
                    column,
                    low: SqlValue::Integer(low),
                    high: SqlValue::Integer(high),
                });
            }
        }

        if !selection.duration.is_anything() {
            let (low, high) = selection.duration.resolve(bounds);
            constraints.push(Constraint::Between {
                column: Column::DurationHours,
                low: SqlValue::Integer(low),
                high: SqlValue::Integer(high),
            });
        }

        Ok(constraints)
    }

    /// Compile a selection into a parameterized statement
    pub fn compile(
        &self,
        selection: &FilterSelection,
        bounds: &CatalogBounds,
    ) -> Result<CompiledQuery, FilterError> {
        let constraints = self.constraints(selection, bounds)?;

        let mut params = SqlParams::default();
        let clauses: Vec<String> = constraints.iter().map(|c| c.to_sql(&mut params)).collect();

        let mut sql = self.select_clause();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        tracing::trace!(sql = %sql, params = params.values.len(), "Compiled filter selection");
        Ok(CompiledQuery {
            sql,
            params: params.values,
        })
    }

    fn select_clause(&self) -> String {
        format!("SELECT {} FROM {}", ROUTE_COLUMNS, self.table)
    }
}
