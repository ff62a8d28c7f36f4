//! HTTP request handlers for the web server.

mod api;

// Re-export handlers for use by the router
pub use api::{health, search_jobs};
