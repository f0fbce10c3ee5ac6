//! Result type coercion.
//!
//! Turns backend rows (text values plus backend type tags) into records of
//! abstract typed fields. Numeric parsing is deliberately lenient: a value
//! with no numeric prefix is logged and emitted as zero.

use crate::db::{BackendColumn, BackendRow, ColumnType};
use crate::numeric::{leading_float, leading_integer};
use crate::output::{FieldType, FieldValue, ResultField, ResultRecord};
use tracing::{debug, warn};

impl ColumnType {
    /// Returns the abstract type this backend type coerces to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::SmallInt | Self::Integer => FieldType::Integer,
            Self::Real | Self::Double | Self::Float => FieldType::Float,
            Self::Char | Self::NChar | Self::VarChar => FieldType::String,
            // No abstract representation for booleans or timestamps yet.
            Self::Boolean | Self::Timestamp | Self::Other => FieldType::Unrepresentable,
        }
    }
}

/// Coerces one backend row into a record, preserving column order.
pub fn coerce_row(row: &BackendRow) -> ResultRecord {
    ResultRecord {
        fields: row.columns().filter_map(coerce_column).collect(),
    }
}

/// Coerces one column, or returns `None` when the field must be omitted.
pub fn coerce_column(column: &BackendColumn) -> Option<ResultField> {
    let field_type = column.column_type.field_type();
    if field_type == FieldType::Unrepresentable {
        debug!(
            "Omitting column '{}' of type {:?}",
            column.name, column.column_type
        );
        return None;
    }

    let Some(text) = column.value.as_deref() else {
        debug!("Omitting NULL value in column '{}'", column.name);
        return None;
    };

    let value = match field_type {
        FieldType::Integer => {
            let parsed = leading_integer(text);
            if parsed.is_empty() {
                warn!("Integer parse of {:?} in column '{}' failed", text, column.name);
            }
            FieldValue::Integer(parsed.value)
        }
        FieldType::Float => {
            let parsed = leading_float(text);
            if parsed.is_empty() {
                warn!("Float parse of {:?} in column '{}' failed", text, column.name);
            }
            FieldValue::Float(parsed.value)
        }
        FieldType::String => FieldValue::String(text.to_string()),
        FieldType::Unrepresentable => return None,
    };

    Some(ResultField::new(column.name.clone(), value))
}
