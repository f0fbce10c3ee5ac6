//! PostgreSQL backend (`pgsql`).
//!
//! Provides `PostgresConnection`, a `BackendConnection` implemented with sqlx.

use crate::db::{
    collect_result_sets, map_connect_error, resolve_port, timeout_error, BackendColumn,
    BackendConnection, BackendRow, BindMode, ColumnType, Credentials, Endpoint, ResultSet,
};
use crate::engine::Backend;
use crate::error::{ProbeError, Result};
use crate::secret::SecretString;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// PostgreSQL connection handle.
pub struct PostgresConnection {
    host: Option<SecretString>,
    port: Option<u16>,
    endpoint: SecretString,
    connect_timeout: Duration,
    conn: Option<PgConnection>,
    pending: VecDeque<ResultSet>,
}

impl PostgresConnection {
    /// Creates an unbound handle for the endpoint.
    pub fn init(endpoint: &Endpoint<'_>) -> Result<Self> {
        let port = resolve_port(Backend::Pgsql, endpoint)?;
        Ok(Self {
            host: endpoint.host.filter(|h| !h.is_empty()).map(SecretString::from),
            port,
            endpoint: endpoint.display().into(),
            connect_timeout: endpoint.connect_timeout,
            conn: None,
            pending: VecDeque::new(),
        })
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| ProbeError::internal("pgsql connection used before bind"))
    }
}

#[async_trait]
impl BackendConnection for PostgresConnection {
    fn backend(&self) -> Backend {
        Backend::Pgsql
    }

    async fn bind(&mut self, credentials: Credentials<'_>, _mode: BindMode) -> Result<()> {
        let mut options = PgConnectOptions::new();
        if let Some(host) = &self.host {
            options = options.host(host.expose());
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(database) = credentials.database {
            options = options.database(database);
        }
        if let Some(user) = credentials.user {
            options = options.username(user);
        }
        if let Some(password) = credentials.password {
            options = options.password(password);
        }

        let endpoint = self.endpoint.expose();
        debug!("Connecting to pgsql at {}", endpoint);
        let conn = tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| timeout_error(Backend::Pgsql, endpoint, self.connect_timeout))?
            .map_err(|e| map_connect_error(Backend::Pgsql, endpoint, &credentials, e))?;

        self.conn = Some(conn);
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<()> {
        let conn = self.connection()?;
        let sets = collect_result_sets((&mut *conn).fetch_many(sql), convert_row)
            .await
            .map_err(|e| ProbeError::query(sql, format_query_error(e)))?;
        self.pending = sets;
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

/// Converts a sqlx PgRow to a backend row.
fn convert_row(row: &PgRow) -> BackendRow {
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

/// Maps the PostgreSQL type name and renders the value as text.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> (ColumnType, Option<String>) {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => (
            ColumnType::Boolean,
            row.try_get::<Option<bool>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "INT2" | "SMALLINT" => (
            ColumnType::SmallInt,
            row.try_get::<Option<i16>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "INT4" | "INT" | "INTEGER" => (
            ColumnType::Integer,
            row.try_get::<Option<i32>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "INT8" | "BIGINT" => (
            ColumnType::Integer,
            row.try_get::<Option<i64>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "FLOAT4" | "REAL" => (
            ColumnType::Real,
            row.try_get::<Option<f32>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "FLOAT8" | "DOUBLE PRECISION" => (
            ColumnType::Double,
            row.try_get::<Option<f64>, _>(index)
                .ok()
                .flatten()
                .map(|v| v.to_string()),
        ),

        "BPCHAR" | "CHARACTER" => (ColumnType::Char, text_value(row, index)),

        "VARCHAR" | "CHARACTER VARYING" | "TEXT" | "NAME" => {
            (ColumnType::VarChar, text_value(row, index))
        }

        "TIMESTAMP" | "TIMESTAMPTZ" | "DATE" | "TIME" | "TIMETZ" => {
            (ColumnType::Timestamp, None)
        }

        _ => (ColumnType::Other, None),
    }
}

fn text_value(row: &PgRow, index: usize) -> Option<String> {
    row.try_get::<Option<String>, _>(index).ok().flatten()
}

/// Formats a query error with the server's detail and hint when present.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
