//! Connection parameters for sqlprobe.
//!
//! Turns the ad-hoc connection string of a request into discrete fields.

pub mod params;

pub use params::{ConnectionParameters, DEFAULT_CONNECT_TIMEOUT};
