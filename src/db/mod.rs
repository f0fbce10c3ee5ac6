//! Backend driver layer for sqlprobe.
//!
//! Provides a trait-based interface mirroring the classic database-driver
//! call contract: `init`, `bind`, `query`, result-set and row iteration, and
//! `finish`. Real backends are implemented with sqlx; a scriptable mock is
//! available for tests.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailAt, MockConnector, MockProbe};
pub use mysql::MySqlConnection;
pub use postgres::PostgresConnection;
pub use sqlite::SqliteConnection;
pub use types::{
    BackendColumn, BackendRow, BindMode, ColumnType, Credentials, ResultSet,
};

use crate::engine::Backend;
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::Either;
use std::collections::VecDeque;
use std::time::Duration;

/// Where to connect, as handed to `Connector::init`.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub host: Option<&'a str>,
    pub port: Option<&'a str>,
    pub connect_timeout: Duration,
}

impl Endpoint<'_> {
    /// Returns `host:port` for diagnostics.
    pub fn display(&self) -> String {
        format!(
            "{}:{}",
            self.host.unwrap_or_default(),
            self.port.unwrap_or_default()
        )
    }
}

/// Opens unbound connection handles for a backend.
pub trait Connector: Send + Sync {
    /// Validates the backend and endpoint and returns a handle ready for `bind`.
    fn init(&self, backend: Backend, endpoint: &Endpoint<'_>) -> Result<Box<dyn BackendConnection>>;
}

/// A single backend connection, owned by one evaluation.
#[async_trait]
pub trait BackendConnection: Send {
    /// The backend this connection talks to.
    fn backend(&self) -> Backend;

    /// Authenticates against the backend and opens the session.
    async fn bind(&mut self, credentials: Credentials<'_>, mode: BindMode) -> Result<()>;

    /// Submits the query text verbatim.
    async fn query(&mut self, sql: &str) -> Result<()>;

    /// Returns the next result-set of the last query, or `None` when there are no more.
    async fn next_result(&mut self) -> Result<Option<ResultSet>>;

    /// Closes the session and releases the handle.
    async fn finish(&mut self) -> Result<()>;
}

/// Connector backed by the sqlx drivers linked into this build.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector;

impl Connector for SqlxConnector {
    fn init(&self, backend: Backend, endpoint: &Endpoint<'_>) -> Result<Box<dyn BackendConnection>> {
        match backend {
            Backend::Pgsql => Ok(Box::new(PostgresConnection::init(endpoint)?)),
            Backend::Mysql => Ok(Box::new(MySqlConnection::init(endpoint)?)),
            Backend::Sqlite | Backend::Sqlite3 => {
                Ok(Box::new(SqliteConnection::init(backend, endpoint)))
            }
            Backend::Firebird | Backend::Mssql | Backend::Oracle | Backend::Sybase => {
                Err(ProbeError::ConnectionInit {
                    backend: backend.to_string(),
                    endpoint: endpoint.display(),
                    message: "no driver is linked for this backend".to_string(),
                })
            }
        }
    }
}

/// Parses the endpoint port, falling back to the backend default.
pub(crate) fn resolve_port(backend: Backend, endpoint: &Endpoint<'_>) -> Result<Option<u16>> {
    match endpoint.port.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(backend.default_port()),
        Some(port) => port.parse::<u16>().map(Some).map_err(|_| ProbeError::ConnectionInit {
            backend: backend.to_string(),
            endpoint: endpoint.display(),
            message: format!("invalid port '{port}'"),
        }),
    }
}

/// Maps a sqlx connect failure onto the init/bind split.
///
/// Transport failures mean the server was never reached; anything else is a
/// refusal of the credentials or database.
pub(crate) fn map_connect_error(
    backend: Backend,
    endpoint: &str,
    credentials: &Credentials<'_>,
    error: sqlx::Error,
) -> ProbeError {
    match error {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
            ProbeError::ConnectionInit {
                backend: backend.to_string(),
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            }
        }
        other => bind_error(backend, credentials, other.to_string()),
    }
}

/// Builds a bind error without ever including the password.
pub(crate) fn bind_error(
    backend: Backend,
    credentials: &Credentials<'_>,
    message: impl Into<String>,
) -> ProbeError {
    ProbeError::Bind {
        backend: backend.to_string(),
        database: credentials.database.unwrap_or_default().to_string(),
        user: credentials.user.unwrap_or_default().to_string(),
        message: message.into(),
    }
}

/// Error for a connect attempt that exceeded the connect timeout.
pub(crate) fn timeout_error(backend: Backend, endpoint: &str, timeout: Duration) -> ProbeError {
    ProbeError::ConnectionInit {
        backend: backend.to_string(),
        endpoint: endpoint.to_string(),
        message: format!("connect timed out after {}s", timeout.as_secs()),
    }
}

/// Drains a `fetch_many` stream, splitting it into result-sets at each
/// statement completion.
pub(crate) async fn collect_result_sets<Q, R, F>(
    mut stream: BoxStream<'_, std::result::Result<Either<Q, R>, sqlx::Error>>,
    convert: F,
) -> std::result::Result<VecDeque<ResultSet>, sqlx::Error>
where
    F: Fn(&R) -> BackendRow,
{
    let mut sets = VecDeque::new();
    let mut current = ResultSet::default();

    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(_done) => sets.push_back(std::mem::take(&mut current)),
            Either::Right(row) => current.push(convert(&row)),
        }
    }

    if current.remaining() > 0 {
        sets.push_back(current);
    }

    Ok(sets)
}
