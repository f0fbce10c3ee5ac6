//! Query execution against a backend connection.
//!
//! Runs the fixed driver sequence (init, bind, query, drain result-sets,
//! finish) and hands every fetched row to a caller-supplied sink. Each stage
//! is a hard stop; once a handle exists it is finished on every path.

use crate::connection::ConnectionParameters;
use crate::db::{BackendConnection, BackendRow, BindMode, Connector, Credentials, Endpoint};
use crate::engine::Backend;
use crate::error::Result;
use crate::secret::SecretString;
use tracing::{debug, warn};

/// Counters for a completed execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Result-sets drained.
    pub result_sets: usize,
    /// Rows handed to the sink.
    pub rows: usize,
    /// Close failure message, if `finish` failed after results were collected.
    pub close_error: Option<String>,
}

/// Executes queries through a connector.
pub struct QueryExecutor<'a> {
    connector: &'a dyn Connector,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor over the given connector.
    pub fn new(connector: &'a dyn Connector) -> Self {
        Self { connector }
    }

    /// Runs `sql` on `backend` and feeds each row to `on_row`.
    ///
    /// Rows arrive result-set by result-set, in backend order. A close
    /// failure after a successful drain is reported in the summary, not as an
    /// error.
    pub async fn execute<F>(
        &self,
        backend: Backend,
        params: &ConnectionParameters,
        sql: &str,
        mut on_row: F,
    ) -> Result<ExecutionSummary>
    where
        F: FnMut(BackendRow),
    {
        let endpoint = Endpoint {
            host: expose(&params.host),
            port: expose(&params.port),
            connect_timeout: params.timeout(),
        };

        debug!("Initializing {} connection to {}", backend, endpoint.display());
        let mut conn = self.connector.init(backend, &endpoint)?;

        let mut summary = ExecutionSummary::default();
        if let Err(e) = drain(conn.as_mut(), params, sql, &mut on_row, &mut summary).await {
            release(conn.as_mut()).await;
            return Err(e);
        }

        if let Err(e) = conn.finish().await {
            warn!("{}", e);
            summary.close_error = Some(e.to_string());
        }

        debug!(
            "Query finished: {} result-set(s), {} row(s)",
            summary.result_sets, summary.rows
        );
        Ok(summary)
    }
}

async fn drain<F>(
    conn: &mut dyn BackendConnection,
    params: &ConnectionParameters,
    sql: &str,
    on_row: &mut F,
    summary: &mut ExecutionSummary,
) -> Result<()>
where
    F: FnMut(BackendRow),
{
    let credentials = Credentials {
        database: expose(&params.database),
        user: expose(&params.user),
        password: expose(&params.password),
    };
    conn.bind(credentials, BindMode::Simple).await?;
    conn.query(sql).await?;

    while let Some(mut result_set) = conn.next_result().await? {
        while let Some(row) = result_set.fetch_row() {
            on_row(row);
            summary.rows += 1;
        }
        result_set.finish();
        summary.result_sets += 1;
    }

    Ok(())
}

/// Finishes a connection on an error path; the original error wins.
async fn release(conn: &mut dyn BackendConnection) {
    if let Err(e) = conn.finish().await {
        warn!("{}", e);
    }
}

fn expose(value: &Option<SecretString>) -> Option<&str> {
    value.as_ref().map(SecretString::expose)
}
