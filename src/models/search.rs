//! Search parameters, raw and normalized.

use serde::{Deserialize, Serialize};

use super::normalize_text;
use crate::query::filters::{
    DatePosted, ExperienceLevel, JobType, RemoteFilter, SalaryFloor, SortBy,
};

/// An immutable description of one job search.
///
/// Keyword and location are normalized on construction, so two specs built
/// from differently-spaced input compare equal and produce the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SearchSpec {
    keyword: String,
    location: String,
    pub date_since_posted: Option<DatePosted>,
    pub job_type: Option<JobType>,
    pub remote_filter: Option<RemoteFilter>,
    pub salary: Option<SalaryFloor>,
    pub experience_level: Option<ExperienceLevel>,
    pub sort_by: Option<SortBy>,
    /// Maximum records to return (0 = unbounded).
    pub limit: usize,
    /// Zero-based page offset; each page is 25 records.
    pub page: u32,
}

impl SearchSpec {
    pub fn new(keyword: &str, location: &str) -> Self {
        Self {
            keyword: normalize_text(keyword),
            location: normalize_text(location),
            ..Default::default()
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn with_date_since_posted(mut self, value: Option<DatePosted>) -> Self {
        self.date_since_posted = value;
        self
    }

    pub fn with_job_type(mut self, value: Option<JobType>) -> Self {
        self.job_type = value;
        self
    }

    pub fn with_remote_filter(mut self, value: Option<RemoteFilter>) -> Self {
        self.remote_filter = value;
        self
    }

    pub fn with_salary(mut self, value: Option<SalaryFloor>) -> Self {
        self.salary = value;
        self
    }

    pub fn with_experience_level(mut self, value: Option<ExperienceLevel>) -> Self {
        self.experience_level = value;
        self
    }

    pub fn with_sort_by(mut self, value: Option<SortBy>) -> Self {
        self.sort_by = value;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Raw, human-readable search parameters as received from `/jobs` or the CLI.
///
/// Filter values are free-form labels ("past week", "Full-Time", ...);
/// unrecognized labels are dropped when converting to a [`SearchSpec`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub date_since_posted: Option<String>,
    pub job_type: Option<String>,
    pub remote_filter: Option<String>,
    pub salary: Option<String>,
    pub experience_level: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<u32>,
}

impl SearchRequest {
    /// Fill every absent field from `defaults`.
    pub fn or(self, defaults: &SearchRequest) -> SearchRequest {
        SearchRequest {
            keyword: self.keyword.or_else(|| defaults.keyword.clone()),
            location: self.location.or_else(|| defaults.location.clone()),
            date_since_posted: self
                .date_since_posted
                .or_else(|| defaults.date_since_posted.clone()),
            job_type: self.job_type.or_else(|| defaults.job_type.clone()),
            remote_filter: self.remote_filter.or_else(|| defaults.remote_filter.clone()),
            salary: self.salary.or_else(|| defaults.salary.clone()),
            experience_level: self
                .experience_level
                .or_else(|| defaults.experience_level.clone()),
            sort_by: self.sort_by.or_else(|| defaults.sort_by.clone()),
            limit: self.limit.or(defaults.limit),
            page: self.page.or(defaults.page),
        }
    }

    /// Translate labels through the filter vocabularies.
    pub fn to_spec(&self) -> SearchSpec {
        let label = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();

        SearchSpec::new(&label(&self.keyword), &label(&self.location))
            .with_date_since_posted(DatePosted::parse(&label(&self.date_since_posted)))
            .with_job_type(JobType::parse(&label(&self.job_type)))
            .with_remote_filter(RemoteFilter::parse(&label(&self.remote_filter)))
            .with_salary(SalaryFloor::parse(&label(&self.salary)))
            .with_experience_level(ExperienceLevel::parse(&label(&self.experience_level)))
            .with_sort_by(SortBy::parse(&label(&self.sort_by)))
            .with_limit(self.limit.unwrap_or(0))
            .with_page(self.page.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_normalizes_text() {
        let spec = SearchSpec::new("  rust   developer ", "\tBerlin,  Germany\n");
        assert_eq!(spec.keyword(), "rust developer");
        assert_eq!(spec.location(), "Berlin, Germany");
        assert_eq!(spec, SearchSpec::new("rust developer", "Berlin, Germany"));
    }

    #[test]
    fn test_request_to_spec_drops_unknown_labels() {
        let request = SearchRequest {
            keyword: Some("data engineer".to_string()),
            experience_level: Some("manager".to_string()),
            job_type: Some("Full Time".to_string()),
            limit: Some(10),
            ..Default::default()
        };

        let spec = request.to_spec();
        assert_eq!(spec.experience_level, None);
        assert_eq!(spec.job_type, Some(JobType::FullTime));
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.page, 0);
        assert_eq!(spec.location(), "");
    }

    #[test]
    fn test_request_defaults_fill_absent_fields() {
        let defaults = SearchRequest {
            keyword: Some("software engineer".to_string()),
            location: Some("United States".to_string()),
            limit: Some(25),
            ..Default::default()
        };
        let request = SearchRequest {
            location: Some("Canada".to_string()),
            ..Default::default()
        };

        let merged = request.or(&defaults);
        assert_eq!(merged.keyword.as_deref(), Some("software engineer"));
        assert_eq!(merged.location.as_deref(), Some("Canada"));
        assert_eq!(merged.limit, Some(25));
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"keyword":"rust","dateSincePosted":"past week","remoteFilter":"remote"}"#,
        )
        .unwrap();
        let spec = request.to_spec();
        assert_eq!(spec.date_since_posted, Some(DatePosted::PastWeek));
        assert_eq!(spec.remote_filter, Some(RemoteFilter::Remote));
    }
}
