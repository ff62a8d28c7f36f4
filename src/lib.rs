//! jobharvest - job listing harvester.
//!
//! Queries a guest job-search endpoint page by page, extracts job records
//! from the returned HTML fragments, and caches results for a fixed TTL.
//! The [`server`] module exposes the pipeline over HTTP.

pub mod cache;
pub mod config;
pub mod error;
pub mod harvester;
pub mod models;
pub mod query;
pub mod scrapers;
pub mod server;

pub use error::HarvestError;
pub use harvester::{Harvester, Preset};
pub use models::{JobRecord, SearchRequest, SearchSpec};
