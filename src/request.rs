//! Query requests.
//!
//! A transport hands over four named string fields. `RequestFields` is the
//! loose form (any field may be missing, e.g. from a config file or CLI);
//! `QueryRequest` is the validated form an evaluation consumes.

use crate::error::{ProbeError, Result};
use crate::secret::SecretString;
use serde::Deserialize;

/// A validated query request. Secret fields are scrubbed on drop.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub engine: String,
    pub version: SecretString,
    pub connection_string: SecretString,
    pub sql: SecretString,
}

impl QueryRequest {
    /// Creates a request from its four fields.
    pub fn new(
        engine: impl Into<String>,
        version: impl Into<SecretString>,
        connection_string: impl Into<SecretString>,
        sql: impl Into<SecretString>,
    ) -> Self {
        Self {
            engine: engine.into(),
            version: version.into(),
            connection_string: connection_string.into(),
            sql: sql.into(),
        }
    }
}

/// Request fields as delivered by a transport, each possibly absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFields {
    pub engine: Option<String>,
    pub version: Option<SecretString>,
    pub connection_string: Option<SecretString>,
    pub sql: Option<SecretString>,
}

impl RequestFields {
    /// Overlays the fields present in `other` onto this one.
    pub fn merge(&mut self, other: RequestFields) {
        if other.engine.is_some() {
            self.engine = other.engine;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        if other.connection_string.is_some() {
            self.connection_string = other.connection_string;
        }
        if other.sql.is_some() {
            self.sql = other.sql;
        }
    }

    /// Validates that every field is present.
    pub fn into_request(self) -> Result<QueryRequest> {
        let RequestFields {
            engine,
            version,
            connection_string,
            sql,
        } = self;

        Ok(QueryRequest {
            engine: engine.ok_or_else(|| ProbeError::input("engine"))?,
            version: version.ok_or_else(|| ProbeError::input("version"))?,
            connection_string: connection_string
                .ok_or_else(|| ProbeError::input("connection_string"))?,
            sql: sql.ok_or_else(|| ProbeError::input("sql"))?,
        })
    }
}
