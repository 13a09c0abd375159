//! DuckDB sink for normalized records.
//!
//! One table per store, keyed by `(date, symbol, source, field)`:
//!
//! ```text
//! <table>(date DATE, symbol VARCHAR, source VARCHAR, field VARCHAR, value DOUBLE)
//! ```

use chrono::NaiveDate;
use duckdb::{params, Connection};
use ivol_core::config::{is_sql_identifier, StoreConfig};
use ivol_core::{Error, FloatField, NormalizedRecord, Result};
use std::path::Path;
use tracing::{debug, info};

fn db_err(e: duckdb::Error) -> Error {
    Error::database(e.to_string())
}

/// Time-series store backed by a DuckDB connection.
pub struct TimeSeriesStore {
    conn: Connection,
    table: String,
}

impl TimeSeriesStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::database(format!("failed to open '{}': {e}", path.display()))
        })?;
        info!(path = %path.display(), table = %config.table, "opened store");
        Self::with_connection(conn, config)
    }

    /// Open a transient in-memory database.
    pub fn open_in_memory(config: &StoreConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: &StoreConfig) -> Result<Self> {
        if !is_sql_identifier(&config.table) {
            return Err(Error::config(format!(
                "invalid table name '{}'",
                config.table
            )));
        }
        let store = Self {
            conn,
            table: config.table.clone(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    date DATE NOT NULL,
                    symbol VARCHAR NOT NULL,
                    source VARCHAR,
                    field VARCHAR NOT NULL,
                    value DOUBLE
                )",
                self.table
            ))
            .map_err(db_err)
    }

    /// Table the store writes to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Append records in a single transaction. Returns the number inserted.
    pub fn insert(&mut self, records: &[NormalizedRecord]) -> Result<usize> {
        let tx = self.conn.transaction().map_err(db_err)?;
        {
            let mut appender = tx.appender(&self.table).map_err(db_err)?;
            for record in records {
                appender
                    .append_row(params![
                        record.date,
                        record.symbol,
                        record.source,
                        record.field.name(),
                        record.value,
                    ])
                    .map_err(db_err)?;
            }
            appender.flush().map_err(db_err)?;
        }
        tx.commit().map_err(db_err)?;
        debug!(rows = records.len(), table = %self.table, "inserted records");
        Ok(records.len())
    }

    /// Total rows in the table.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(db_err)?;
        Ok(n as usize)
    }

    /// Distinct symbols, sorted.
    pub fn symbols(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT DISTINCT symbol FROM {} ORDER BY symbol",
                self.table
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<_, _>>().map_err(db_err)
    }

    /// One field of one symbol ordered by date.
    pub fn series(&self, symbol: &str, field: FloatField) -> Result<Vec<(NaiveDate, Option<f64>)>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT date, value FROM {}
                 WHERE symbol = ? AND field = ?
                 ORDER BY date",
                self.table
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![symbol, field.name()], |row| {
                Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, Option<f64>>(1)?))
            })
            .map_err(db_err)?;
        rows.collect::<std::result::Result<_, _>>().map_err(db_err)
    }
}
