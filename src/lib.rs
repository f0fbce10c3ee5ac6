//! sqlprobe - evaluate one SQL query against a database and return typed records.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod connection;
pub mod db;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod numeric;
pub mod output;
pub mod query;
pub mod request;
pub mod secret;
