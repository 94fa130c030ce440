//! SQLite-backed open-data reader.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};

use civicbot_core::config::DatabaseConfig;

use crate::error::{DataError, Result};
use crate::table::{render_table, Cell};

/// Runs read queries against the open-data database.
///
/// Clone is cheap (the pool is an inner Arc).
#[derive(Clone)]
pub struct TableReader {
    pool: SqlitePool,
}

impl TableReader {
    /// Open a connection pool for the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(DataError::Connection)?
            .read_only(config.read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(DataError::Connection)?;

        tracing::info!(url = %config.url, read_only = config.read_only, "Connected to open-data database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run `sql` and render every returned row as a text table.
    pub async fn read_data_table(&self, sql: &str) -> Result<String> {
        tracing::info!(sql = %sql, "Running query");

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| query_error(sql, source))?;

        let columns = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => self.describe_columns(sql).await?,
        };

        let cells = rows
            .iter()
            .map(|row| decode_row(row).map_err(|source| query_error(sql, source)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rows = cells.len(), columns = columns.len(), "Query complete");
        Ok(render_table(&columns, &cells))
    }

    /// Column names for a query that returned no rows, from the prepared statement.
    async fn describe_columns(&self, sql: &str) -> Result<Vec<String>> {
        let statement = (&self.pool)
            .prepare(sql)
            .await
            .map_err(|source| query_error(sql, source))?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }
}

fn query_error(sql: &str, source: sqlx::Error) -> DataError {
    DataError::Query {
        sql: sql.to_string(),
        source,
    }
}

fn decode_row(row: &SqliteRow) -> std::result::Result<Vec<Cell>, sqlx::Error> {
    (0..row.columns().len())
        .map(|idx| decode_cell(row, idx))
        .collect()
}

/// Decode by the value's runtime storage class, not the declared column type.
fn decode_cell(row: &SqliteRow, idx: usize) -> std::result::Result<Cell, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Cell::Null);
        }
        raw.type_info().name().to_string()
    };

    let cell = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Cell::Integer(row.try_get::<i64, _>(idx)?),
        "REAL" | "NUMERIC" => Cell::Real(row.try_get::<f64, _>(idx)?),
        "BLOB" => Cell::Blob(row.try_get::<Vec<u8>, _>(idx)?.len()),
        _ => Cell::Text(row.try_get::<String, _>(idx)?),
    };
    Ok(cell)
}
