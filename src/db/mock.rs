//! Mock backend for testing.
//!
//! `MockConnector` hands out connections that replay scripted result-sets,
//! optionally fail at a chosen stage, and record what was asked of them.

use super::{
    BackendConnection, BackendRow, BindMode, Connector, Credentials, Endpoint, ResultSet,
};
use crate::engine::Backend;
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Stage at which a mock connection fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Init,
    Bind,
    Query,
    /// Fails when the second result-set is requested.
    Fetch,
    Finish,
}

/// Shared record of the calls made on mock connections.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
}

#[derive(Debug, Default)]
struct ProbeState {
    backend: Option<Backend>,
    endpoint: Option<String>,
    connect_timeout: Option<Duration>,
    database: Option<String>,
    user: Option<String>,
    password_given: bool,
    queries: Vec<String>,
    finished: usize,
}

impl MockProbe {
    fn with_state<T>(&self, f: impl FnOnce(&mut ProbeState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Backend passed to the last `init`.
    pub fn backend(&self) -> Option<Backend> {
        self.with_state(|s| s.backend)
    }

    /// Endpoint passed to the last `init`, as `host:port`.
    pub fn endpoint(&self) -> Option<String> {
        self.with_state(|s| s.endpoint.clone())
    }

    /// Connect timeout passed to the last `init`.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.with_state(|s| s.connect_timeout)
    }

    /// Database passed to the last `bind`.
    pub fn database(&self) -> Option<String> {
        self.with_state(|s| s.database.clone())
    }

    /// User passed to the last `bind`.
    pub fn user(&self) -> Option<String> {
        self.with_state(|s| s.user.clone())
    }

    /// Whether the last `bind` received a password.
    pub fn password_given(&self) -> bool {
        self.with_state(|s| s.password_given)
    }

    /// Query texts submitted so far.
    pub fn queries(&self) -> Vec<String> {
        self.with_state(|s| s.queries.clone())
    }

    /// Number of `finish` calls.
    pub fn finish_count(&self) -> usize {
        self.with_state(|s| s.finished)
    }
}

/// A connector that returns scripted mock connections.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    result_sets: Vec<ResultSet>,
    fail_at: Option<FailAt>,
    probe: MockProbe,
}

impl MockConnector {
    /// Creates a connector whose queries return no result-sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result-set returned by every query.
    pub fn with_result_set(mut self, rows: Vec<BackendRow>) -> Self {
        self.result_sets.push(ResultSet::new(rows));
        self
    }

    /// Makes connections fail at the given stage.
    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Returns the shared call record.
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl Connector for MockConnector {
    fn init(&self, backend: Backend, endpoint: &Endpoint<'_>) -> Result<Box<dyn BackendConnection>> {
        let display = endpoint.display();
        self.probe.with_state(|s| {
            s.backend = Some(backend);
            s.endpoint = Some(display.clone());
            s.connect_timeout = Some(endpoint.connect_timeout);
        });

        if self.fail_at == Some(FailAt::Init) {
            return Err(ProbeError::ConnectionInit {
                backend: backend.to_string(),
                endpoint: display,
                message: "mock init failure".to_string(),
            });
        }

        Ok(Box::new(MockConnection {
            backend,
            script: self.result_sets.clone(),
            pending: VecDeque::new(),
            handed_out: 0,
            fail_at: self.fail_at,
            probe: self.probe.clone(),
        }))
    }
}

struct MockConnection {
    backend: Backend,
    script: Vec<ResultSet>,
    pending: VecDeque<ResultSet>,
    handed_out: usize,
    fail_at: Option<FailAt>,
    probe: MockProbe,
}

#[async_trait]
impl BackendConnection for MockConnection {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn bind(&mut self, credentials: Credentials<'_>, _mode: BindMode) -> Result<()> {
        self.probe.with_state(|s| {
            s.database = credentials.database.map(String::from);
            s.user = credentials.user.map(String::from);
            s.password_given = credentials.password.is_some();
        });

        if self.fail_at == Some(FailAt::Bind) {
            return Err(super::bind_error(
                self.backend,
                &credentials,
                "mock bind failure",
            ));
        }
        Ok(())
    }

    async fn query(&mut self, sql: &str) -> Result<()> {
        self.probe.with_state(|s| s.queries.push(sql.to_string()));

        if self.fail_at == Some(FailAt::Query) {
            return Err(ProbeError::query(sql, "mock query failure"));
        }
        self.pending = self.script.iter().cloned().collect();
        self.handed_out = 0;
        Ok(())
    }

    async fn next_result(&mut self) -> Result<Option<ResultSet>> {
        if self.fail_at == Some(FailAt::Fetch) && self.handed_out >= 1 {
            return Err(ProbeError::query("", "mock fetch failure"));
        }
        self.handed_out += 1;
        Ok(self.pending.pop_front())
    }

    async fn finish(&mut self) -> Result<()> {
        self.probe.with_state(|s| s.finished += 1);

        if self.fail_at == Some(FailAt::Finish) {
            return Err(ProbeError::ConnectionClose("mock finish failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BackendColumn, ColumnType};

    fn endpoint() -> Endpoint<'static> {
        Endpoint {
            host: Some("mock"),
            port: Some("1"),
            connect_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_mock_replays_result_sets() {
        let connector = MockConnector::new()
            .with_result_set(vec![BackendRow::new(vec![BackendColumn::new(
                "n",
                ColumnType::Integer,
                "1",
            )])])
            .with_result_set(vec![]);
        let probe = connector.probe();

        let mut conn = connector.init(Backend::Sqlite, &endpoint()).unwrap();
        conn.query("SELECT 1").await.unwrap();

        assert_eq!(conn.next_result().await.unwrap().unwrap().remaining(), 1);
        assert_eq!(conn.next_result().await.unwrap().unwrap().remaining(), 0);
        assert!(conn.next_result().await.unwrap().is_none());

        conn.finish().await.unwrap();
        assert_eq!(probe.queries(), vec!["SELECT 1".to_string()]);
        assert_eq!(probe.finish_count(), 1);
        assert_eq!(probe.endpoint().as_deref(), Some("mock:1"));
    }

    #[tokio::test]
    async fn test_mock_fails_at_bind() {
        let connector = MockConnector::new().failing_at(FailAt::Bind);
        let mut conn = connector.init(Backend::Mysql, &endpoint()).unwrap();
        let creds = Credentials {
            database: Some("db"),
            user: Some("u"),
            password: Some("p"),
        };

        let err = conn.bind(creds, BindMode::Simple).await.unwrap_err();
        assert!(matches!(err, ProbeError::Bind { .. }));
        assert!(connector.probe().password_given());
    }

    #[test]
    fn test_mock_fails_at_init() {
        let connector = MockConnector::new().failing_at(FailAt::Init);
        assert!(connector.init(Backend::Pgsql, &endpoint()).is_err());
    }
}
