//! sonarex-core — shared library for the sonarex exporter.
//!
//! Provides:
//! - `client` — SonarQube Web API client
//! - `measure` — ordered measure tree and flattening
//! - `catalog` — static metric catalog (key → description/domain)
//! - `model` — assembled data model (projects, metrics, snapshots)
//! - `assemble` — raw measures into typed metrics
//! - `store` — atomic snapshot store
//! - `fetch` — full fetch+assemble composition
//! - `exposition` — gauge family emission and text encoding

pub mod assemble;
pub mod catalog;
pub mod client;
pub mod exposition;
pub mod fetch;
pub mod measure;
pub mod model;
pub mod store;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
