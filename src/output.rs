//! Output items produced by an evaluation.
//!
//! An `OutputItem` echoes the request attributes and holds one `ResultRecord`
//! per fetched row. Serialized, it looks like:
//!
//! ```json
//! {
//!   "engine": "sqlite",
//!   "version": "3",
//!   "sql": "SELECT 1 AS n",
//!   "connection_string": "Database=/tmp/x.db",
//!   "results": [
//!     { "fields": [ { "name": "n", "type": "integer", "value": 1 } ] }
//!   ]
//! }
//! ```

use crate::secret::{serialize_exposed, SecretString};
use serde::Serialize;
use std::fmt;

/// Abstract value types a field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    String,
    /// Values that cannot be represented. Such fields are never emitted.
    Unrepresentable,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Unrepresentable => "unrepresentable",
        };
        f.write_str(name)
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    /// Returns the abstract type of the value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Integer(_) => FieldType::Integer,
            Self::Float(_) => FieldType::Float,
            Self::String(_) => FieldType::String,
        }
    }
}

/// One named, typed value within a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultField {
    pub name: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

impl ResultField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Returns the abstract type of the field.
    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}

/// One record per database row, fields in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultRecord {
    pub fields: Vec<ResultField>,
}

impl ResultRecord {
    /// Number of emitted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field was emitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by column name.
    pub fn field(&self, name: &str) -> Option<&ResultField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The single item produced by a successful evaluation.
///
/// `sql` and `connection_string` stay secret-backed so they are scrubbed when
/// the item is dropped.
#[derive(Debug, Serialize)]
pub struct OutputItem {
    pub engine: String,
    #[serde(serialize_with = "serialize_exposed")]
    pub version: SecretString,
    #[serde(serialize_with = "serialize_exposed")]
    pub sql: SecretString,
    #[serde(serialize_with = "serialize_exposed")]
    pub connection_string: SecretString,
    pub results: Vec<ResultRecord>,
}

impl OutputItem {
    /// Renders the item as JSON.
    ///
    /// The text echoes the connection string, so it is returned secret-backed.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<SecretString> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(SecretString::from(json))
    }
}
