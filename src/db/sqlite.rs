//! SQLite backend (`sqlite`, `sqlite3`).
//!
//! The database file is taken from the `Database` key; host and port are
//! ignored.

use crate::db::{
    bind_error, collect_result_sets, map_connect_error, timeout_error, BackendColumn,
    BackendConnection, BackendRow, BindMode, ColumnType, Credentials, Endpoint, ResultSet,
};
use crate::engine::Backend;
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection as SqlxSqliteConnection, SqliteRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// SQLite connection handle.
pub struct SqliteConnection {
    backend: Backend,
    connect_timeout: Duration,
    conn: Option<SqlxSqliteConnection>,
    pending: VecDeque<ResultSet>,
}

impl SqliteConnection {
    /// Creates an unbound handle. SQLite has no endpoint to validate.
    pub fn init(backend: Backend, endpoint: &Endpoint<'_>) -> Self {
        Self {
            backend,
            connect_timeout: endpoint.connect_timeout,
            conn: None,
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl BackendConnection for SqliteConnection {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn bind(&mut self, credentials: Credentials<'_>, _mode: BindMode) -> Result<()> {
        let database = credentials
            .database
            .filter(|d| !d.is_empty())
            .ok_or_else(|| bind_error(self.backend, &credentials, "no database file given"))?;

        let options = SqliteConnectOptions::new()
            .filename(database)
            .busy_timeout(self.connect_timeout);

        debug!("Opening {} database {}", self.backend, database);
        let conn = tokio::time::timeout(
            self.connect_timeout,
            SqlxSqliteConnection::connect_with(&options),
        )
        .await
        .map_err(|_| timeout_error(self.backend, database, self.connect_timeout))?
        .map_err(|e| map_connect_error(self.backend, database, &credentials, e))?;

        self.conn = Some(conn);
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ProbeError::internal("sqlite connection used before bind"))?;
        self.pending = collect_result_sets((&mut *conn).fetch_many(sql), convert_row)
            .await
            .map_err(|e| ProbeError::query(sql, e.to_string()))?;
        Ok(())
    }

    async fn next_result(&mut self) -> Result<Option<ResultSet>> {
        Ok(self.pending.pop_front())
    }

    async fn finish(&mut self) -> Result<()> {
        self.pending.clear();
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .await
                .map_err(|e| ProbeError::ConnectionClose(e.to_string())),
            None => Ok(()),
        }
    }
}

fn convert_row(row: &SqliteRow) -> BackendRow {
    BackendRow::new(
        row.columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let (column_type, value) = convert_value(row, i, col.type_info().name());
                BackendColumn {
                    name: col.name().to_string(),
                    column_type,
                    value,
                }
            })
            .collect(),
    )
}

/// Maps the column type and renders the value as text.
///
/// Expression columns have no declared type; their type is taken from the
/// stored value instead.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> (ColumnType, Option<String>) {
    let type_name = if declared == "NULL" {
        row.try_get_raw(index)
            .map(|value| value.type_info().name().to_string())
            .unwrap_or_else(|_| declared.to_string())
    } else {
        declared.to_string()
    };

    match type_name.as_str() {
        "BOOLEAN" => (
            ColumnType::Boolean,
            row.try_get::<Option<bool>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "INTEGER" => (
            ColumnType::Integer,
            row.try_get::<Option<i64>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string())
                .or_else(|| text_value(row, index)),
        ),

        "REAL" => (
            ColumnType::Real,
            row.try_get::<Option<f64>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string())
                .or_else(|| text_value(row, index)),
        ),

        "TEXT" => (ColumnType::VarChar, text_value(row, index)),

        "DATE" | "TIME" | "DATETIME" => (ColumnType::Timestamp, None),

        _ => (ColumnType::Other, None),
    }
}

fn text_value(row: &SqliteRow, index: usize) -> Option<String> {
    row.try_get::<Option<String>, _>(index).ok().flatten()
}
