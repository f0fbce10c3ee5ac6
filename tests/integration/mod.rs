//! Integration tests for sqlprobe.

pub mod postgres_test;
pub mod sqlite_test;
