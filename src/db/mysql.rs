//! MySQL backend (`mysql`).

use crate::db::{
    collect_result_sets, map_connect_error, resolve_port, timeout_error, BackendColumn,
    BackendConnection, BackendRow, BindMode, ColumnType, Credentials, Endpoint, ResultSet,
};
use crate::engine::Backend;
use crate::error::{ProbeError, Result};
use crate::secret::SecretString;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection as SqlxMySqlConnection, MySqlRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// MySQL connection handle.
pub struct MySqlConnection {
    host: Option<SecretString>,
    port: Option<u16>,
    endpoint: SecretString,
    connect_timeout: Duration,
    conn: Option<SqlxMySqlConnection>,
    pending: VecDeque<ResultSet>,
}

impl MySqlConnection {
    /// Creates an unbound handle for the endpoint.
    pub fn init(endpoint: &Endpoint<'_>) -> Result<Self> {
        let port = resolve_port(Backend::Mysql, endpoint)?;
        Ok(Self {
            host: endpoint.host.filter(|h| !h.is_empty()).map(SecretString::from),
            port,
            endpoint: endpoint.display().into(),
            connect_timeout: endpoint.connect_timeout,
            conn: None,
            pending: VecDeque::new(),
        })
    }
}

#[async_trait]
impl BackendConnection for MySqlConnection {
    fn backend(&self) -> Backend {
        Backend::Mysql
    }

    async fn bind(&mut self, credentials: Credentials<'_>, _mode: BindMode) -> Result<()> {
        let mut options = MySqlConnectOptions::new();
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
        debug!("Connecting to mysql at {}", endpoint);
        let conn = tokio::time::timeout(
            self.connect_timeout,
            SqlxMySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| timeout_error(Backend::Mysql, endpoint, self.connect_timeout))?
        .map_err(|e| map_connect_error(Backend::Mysql, endpoint, &credentials, e))?;

        self.conn = Some(conn);
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ProbeError::internal("mysql connection used before bind"))?;
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

fn convert_row(row: &MySqlRow) -> BackendRow {
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

/// Maps the MySQL type name and renders the value as text.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> (ColumnType, Option<String>) {
    let unsigned = type_name.ends_with("UNSIGNED");
    let base = type_name.trim_end_matches("UNSIGNED").trim_end();

    let column_type = match base {
        "BOOLEAN" => ColumnType::Boolean,
        "TINYINT" | "SMALLINT" => ColumnType::SmallInt,
        "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ColumnType::Integer,
        "FLOAT" => ColumnType::Float,
        "DOUBLE" => ColumnType::Double,
        "CHAR" => ColumnType::Char,
        "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
            ColumnType::VarChar
        }
        "TIMESTAMP" | "DATETIME" | "DATE" | "TIME" => ColumnType::Timestamp,
        _ => ColumnType::Other,
    };

    let value = match column_type {
        ColumnType::Boolean => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        ColumnType::SmallInt | ColumnType::Integer if unsigned => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        ColumnType::SmallInt | ColumnType::Integer => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        ColumnType::Float => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        ColumnType::Double => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        ColumnType::Char | ColumnType::VarChar => {
            row.try_get::<Option<String>, _>(index).ok().flatten()
        }
        _ => None,
    };

    (column_type, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_explicit_port() {
        let conn = MySqlConnection::init(&Endpoint {
            host: Some("mysql.local"),
            port: Some("3307"),
            connect_timeout: Duration::from_secs(5),
        })
        .unwrap();

        assert_eq!(conn.port, Some(3307));
        assert_eq!(conn.endpoint.expose(), "mysql.local:3307");
        assert_eq!(conn.backend(), Backend::Mysql);
    }

    #[test]
    fn test_init_rejects_bad_port() {
        let result = MySqlConnection::init(&Endpoint {
            host: Some("mysql.local"),
            port: Some("99999"),
            connect_timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(ProbeError::ConnectionInit { .. })));
    }
}
