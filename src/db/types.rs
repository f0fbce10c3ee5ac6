//! Row and result-set types produced by backend drivers.
//!
//! Drivers report every value as text together with a backend type tag.
//! Turning that into typed output is the coercer's job.

use std::collections::VecDeque;

/// Backend-reported column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    SmallInt,
    Integer,
    Real,
    Double,
    Float,
    Char,
    NChar,
    VarChar,
    Timestamp,
    /// Any type without a mapping (blobs, decimals, intervals, ...).
    Other,
}

/// One column of a fetched row.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendColumn {
    /// Column name as reported by the backend.
    pub name: String,
    /// Backend type tag.
    pub column_type: ColumnType,
    /// Textual value, or `None` for SQL NULL.
    pub value: Option<String>,
}

impl BackendColumn {
    /// Creates a column with a value.
    pub fn new(name: impl Into<String>, column_type: ColumnType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type,
            value: Some(value.into()),
        }
    }

    /// Creates a NULL column.
    pub fn null(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            value: None,
        }
    }
}

/// A fetched row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendRow {
    columns: Vec<BackendColumn>,
}

impl BackendRow {
    /// Creates a row from its columns.
    pub fn new(columns: Vec<BackendColumn>) -> Self {
        Self { columns }
    }

    /// Number of columns reported for this row.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Name of column `index`.
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    /// Type of column `index`.
    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.columns.get(index).map(|c| c.column_type)
    }

    /// Textual value of column `index`.
    pub fn field_value(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(|c| c.value.as_deref())
    }

    /// Iterates over the columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &BackendColumn> {
        self.columns.iter()
    }
}

/// One result-set returned by a query submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: VecDeque<BackendRow>,
}

impl ResultSet {
    /// Creates a result-set from fetched rows.
    pub fn new(rows: impl IntoIterator<Item = BackendRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: BackendRow) {
        self.rows.push_back(row);
    }

    /// Fetches the next row, or `None` once exhausted.
    pub fn fetch_row(&mut self) -> Option<BackendRow> {
        self.rows.pop_front()
    }

    /// Rows not yet fetched.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Releases the result-set's resources.
    pub fn finish(self) {}
}

/// Authentication mode passed to `bind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMode {
    /// Plain database/user/password authentication.
    #[default]
    Simple,
}

/// Credentials borrowed from the connection parameters for `bind`.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub database: Option<&'a str>,
    pub user: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.map(|_| "***"))
            .finish()
    }
}
