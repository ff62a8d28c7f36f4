//! Harvested job records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Salary value when the listing shows none.
pub const SALARY_NOT_SPECIFIED: &str = "Not specified";

/// Description value when the detail page could not be read.
pub const DESCRIPTION_NOT_AVAILABLE: &str = "Description not available";

/// A single job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub position: String,
    pub company: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<NaiveDate>,
    pub salary: String,
    /// Absolute URL of the detail page, or empty.
    pub job_url: String,
    pub company_logo_url: String,
    /// Relative age as shown by the source ("3 days ago").
    pub ago_time: String,
    /// Only present when descriptions were enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            position: String::new(),
            company: String::new(),
            location: String::new(),
            posted_date: None,
            salary: SALARY_NOT_SPECIFIED.to_string(),
            job_url: String::new(),
            company_logo_url: String::new(),
            ago_time: String::new(),
            description: None,
        }
    }
}

impl JobRecord {
    /// A record with neither position nor company is a parse failure.
    pub fn is_identifiable(&self) -> bool {
        !self.position.is_empty() || !self.company.is_empty()
    }

    /// Key used to drop the same listing appearing on several pages.
    ///
    /// The job URL minus its tracking query string when present, otherwise
    /// the visible identity fields.
    pub fn dedup_key(&self) -> String {
        if !self.job_url.is_empty() {
            let base = self.job_url.split(['?', '#']).next().unwrap_or("");
            return base.trim_end_matches('/').to_string();
        }
        format!(
            "{}|{}|{}",
            self.position.to_lowercase(),
            self.company.to_lowercase(),
            self.location.to_lowercase()
        )
    }
}
