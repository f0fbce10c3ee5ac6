//! Query execution and result coercion for sqlprobe.
//!
//! The executor drives a backend connection; the coercer turns the rows it
//! yields into typed records.

pub mod coerce;
pub mod executor;

pub use coerce::{coerce_column, coerce_row};
pub use executor::{ExecutionSummary, QueryExecutor};
