//! Data models for searches and harvested jobs.

mod job;
mod search;

pub use job::{JobRecord, DESCRIPTION_NOT_AVAILABLE, SALARY_NOT_SPECIFIED};
pub use search::{SearchRequest, SearchSpec};

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
