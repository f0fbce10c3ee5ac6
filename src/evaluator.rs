//! Evaluation orchestrator.
//!
//! Sequences one evaluation: parse the connection string, resolve the
//! engine, execute the query, coerce every row, and assemble the output item.
//! All secret material (request fields and connection parameters) lives in
//! `SecretString`s owned by this call, so it is scrubbed on every exit path.

use crate::connection::{ConnectionParameters, DEFAULT_CONNECT_TIMEOUT};
use crate::db::{Connector, SqlxConnector};
use crate::engine;
use crate::error::{ProbeError, Result};
use crate::output::{OutputItem, ResultRecord};
use crate::query::{coerce_row, QueryExecutor};
use crate::request::QueryRequest;
use tracing::{debug, error};

/// Evaluates query requests through a connector.
pub struct Evaluator {
    connector: Box<dyn Connector>,
    default_timeout: u32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(SqlxConnector)
    }
}

impl Evaluator {
    /// Creates an evaluator using the given connector.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            default_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the connect timeout used when the connection string has none.
    pub fn with_default_timeout(mut self, seconds: u32) -> Self {
        self.default_timeout = seconds;
        self
    }

    /// Evaluates one request, producing exactly one output item on success.
    ///
    /// The request is consumed; its secrets are scrubbed either when this
    /// call fails or, on success, when the caller drops the output item.
    pub async fn evaluate(&self, request: QueryRequest) -> Result<OutputItem> {
        match self.collect(&request).await {
            Ok(results) => Ok(OutputItem {
                engine: request.engine,
                version: request.version,
                sql: request.sql,
                connection_string: request.connection_string,
                results,
            }),
            Err(e) => {
                error!("{}: {}", e.category(), e);
                Err(e)
            }
        }
    }

    /// Evaluates one request on a current-thread runtime, blocking the caller.
    pub fn evaluate_blocking(&self, request: QueryRequest) -> Result<OutputItem> {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                let err = ProbeError::internal(format!("Failed to start runtime: {e}"));
                error!("{}: {}", err.category(), err);
                return Err(err);
            }
        };
        runtime.block_on(self.evaluate(request))
    }

    async fn collect(&self, request: &QueryRequest) -> Result<Vec<ResultRecord>> {
        let params = ConnectionParameters::parse_with_default(
            request.connection_string.expose(),
            self.default_timeout,
        )?;

        let backend = engine::resolve(&request.engine)?;
        debug!("Engine '{}' resolved to backend {}", request.engine, backend);

        let mut records = Vec::new();
        QueryExecutor::new(self.connector.as_ref())
            .execute(backend, &params, request.sql.expose(), |row| {
                records.push(coerce_row(&row))
            })
            .await?;

        Ok(records)
    }
}
