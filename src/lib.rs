//! # Gen3 Metadata Library
//!
//! Pulls node exports from a Gen3 data commons submission API using a
//! credentials file, keeps the raw JSON, and flattens it into polars tables.
//!
//! Modules:
//! - `credentials` — credentials file loading with a lenient fallback grammar
//! - `auth` — base url from the api key JWT, token exchange
//! - `export` — export requests and the raw store
//! - `table` — flattening into tables, CSV/JSON output
//! - `session` — `Gen3Session`, tying the above together
//! - `config` — YAML run configuration for the CLI

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod helpers;
pub mod session;
pub mod table;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::error::{Gen3Error, Result};
pub use crate::export::DataKey;
pub use crate::session::Gen3Session;
