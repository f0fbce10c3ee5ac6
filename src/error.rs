//! Error types for sqlprobe.
//!
//! Every failure an evaluation can hit maps onto one `ProbeError` variant.
//! Messages carry diagnostic context (engine, endpoint, query text) but never
//! a password.

use thiserror::Error;

/// Main error type for sqlprobe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// A required request field was missing.
    #[error("Missing required request field: {0}")]
    Input(String),

    /// The connection string contained a token that could not be parsed.
    #[error("Malformed connection string: {0}")]
    MalformedConnectionString(String),

    /// The engine name is not in the engine table.
    #[error("DB engine not found: {0}")]
    UnknownEngine(String),

    /// The engine name is known but no backend driver exists for it.
    #[error("DB engine not supported: {0}")]
    UnsupportedEngine(String),

    /// The backend connection could not be opened.
    #[error("Connection init failed: backend={backend}, endpoint={endpoint}: {message}")]
    ConnectionInit {
        backend: String,
        endpoint: String,
        message: String,
    },

    /// The backend refused the credentials or the database.
    #[error("Bind failed: backend={backend}, db={database}, user={user}: {message}")]
    Bind {
        backend: String,
        database: String,
        user: String,
        message: String,
    },

    /// The backend rejected the query or failed while producing results.
    #[error("Query failed: q={sql}: {message}")]
    Query { sql: String, message: String },

    /// Closing the connection failed. Logged only, never returned by an evaluation.
    #[error("Connection close failed: {0}")]
    ConnectionClose(String),

    /// Configuration errors (invalid config file, unknown named request, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (runtime construction, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProbeError {
    /// Creates an input error for the named request field.
    pub fn input(field: impl Into<String>) -> Self {
        Self::Input(field.into())
    }

    /// Creates a malformed connection string error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConnectionString(reason.into())
    }

    /// Creates a query error for the given statement.
    pub fn query(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input Error",
            Self::MalformedConnectionString(_) => "Connection String Error",
            Self::UnknownEngine(_) => "Unknown Engine",
            Self::UnsupportedEngine(_) => "Unsupported Engine",
            Self::ConnectionInit { .. } => "Connection Error",
            Self::Bind { .. } => "Bind Error",
            Self::Query { .. } => "Query Error",
            Self::ConnectionClose(_) => "Connection Close Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns false for errors that are reported but never abort an evaluation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ConnectionClose(_))
    }
}

/// Result type alias using ProbeError.
pub type Result<T> = std::result::Result<T, ProbeError>;
