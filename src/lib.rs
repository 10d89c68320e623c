//! Economic data API.
//!
//! Serves a handful of small economic datasets as JSON arrays of records.
//! Each endpoint is a stateless pipeline:
//!
//! ```text
//! fetch (FRED | World Bank | local file) -> reshape -> serialize
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`sources`]: FRED and World Bank clients, local data files
//! - [`datasets`]: Per-endpoint reshaping and row types
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod sources;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, Result};
