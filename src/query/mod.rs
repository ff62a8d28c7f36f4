//! Search URL construction.
//!
//! Turns a [`SearchSpec`] plus a page start offset into the guest search
//! endpoint URL. Parameters are always emitted in the same order, so the
//! first-page URL doubles as a cache key.

pub mod filters;

use crate::models::SearchSpec;

/// Guest search endpoint returning listing fragments.
pub const SEARCH_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";

/// Records per listing page; `start` advances by this much.
pub const PAGE_SIZE: u32 = 25;

/// Builds deterministic search URLs against a base endpoint.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_url: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(SEARCH_URL)
    }
}

impl QueryBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches(['?', '/']).to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for the page beginning at `start` (before applying `spec.page`).
    pub fn build(&self, spec: &SearchSpec, start: u32) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if !spec.keyword().is_empty() {
            params.push(("keywords", urlencoding::encode(spec.keyword()).into_owned()));
        }
        if !spec.location().is_empty() {
            params.push(("location", urlencoding::encode(spec.location()).into_owned()));
        }
        if let Some(date) = spec.date_since_posted {
            params.push(("f_TPR", date.code().to_string()));
        }
        if let Some(salary) = spec.salary {
            params.push(("f_SB2", salary.code().to_string()));
        }
        if let Some(level) = spec.experience_level {
            params.push(("f_E", level.code().to_string()));
        }
        if let Some(remote) = spec.remote_filter {
            params.push(("f_WT", remote.code().to_string()));
        }
        if let Some(job_type) = spec.job_type {
            params.push(("f_JT", job_type.code().to_string()));
        }

        let offset = start.saturating_add(spec.page.saturating_mul(PAGE_SIZE));
        params.push(("start", offset.to_string()));

        if let Some(sort) = spec.sort_by {
            params.push(("sortBy", sort.code().to_string()));
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.base_url, query)
    }

    /// First-page URL, used as the canonical cache key.
    pub fn canonical(&self, spec: &SearchSpec) -> String {
        self.build(spec, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::filters::*;
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("https://jobs.example.com/search")
    }

    #[test]
    fn test_minimal_url() {
        let spec = SearchSpec::new("rust", "");
        assert_eq!(
            builder().build(&spec, 0),
            "https://jobs.example.com/search?keywords=rust&start=0"
        );
    }

    #[test]
    fn test_percent_encodes_text() {
        let spec = SearchSpec::new("c++ developer", "São Paulo");
        let url = builder().build(&spec, 0);
        assert!(url.contains("keywords=c%2B%2B%20developer"));
        assert!(url.contains("location=S%C3%A3o%20Paulo"));
    }

    #[test]
    fn test_full_parameter_order() {
        let spec = SearchSpec::new("engineer", "Berlin")
            .with_date_since_posted(Some(DatePosted::PastWeek))
            .with_salary(Some(SalaryFloor::From100k))
            .with_experience_level(Some(ExperienceLevel::Senior))
            .with_remote_filter(Some(RemoteFilter::Remote))
            .with_job_type(Some(JobType::FullTime))
            .with_sort_by(Some(SortBy::Recent));

        assert_eq!(
            builder().build(&spec, 50),
            "https://jobs.example.com/search?keywords=engineer&location=Berlin\
             &f_TPR=r604800&f_SB2=4&f_E=4&f_WT=2&f_JT=F&start=50&sortBy=DD"
        );
    }

    #[test]
    fn test_page_offsets_start() {
        let spec = SearchSpec::new("rust", "").with_page(2);
        assert!(builder().build(&spec, 0).ends_with("start=50"));
        assert!(builder().build(&spec, 25).ends_with("start=75"));
    }

    #[test]
    fn test_deterministic_for_equivalent_specs() {
        let a = SearchSpec::new("  senior   rust ", "New York").with_limit(10);
        let b = SearchSpec::new("senior rust", "  New   York");
        assert_eq!(builder().canonical(&a), builder().canonical(&b));
        assert_eq!(builder().build(&a, 25), builder().build(&a, 25));
    }

    #[test]
    fn test_unrecognized_filter_is_omitted() {
        let spec = SearchSpec::new("rust", "")
            .with_experience_level(ExperienceLevel::parse("manager"));
        let url = builder().build(&spec, 0);
        assert!(!url.contains("f_E="));
    }

    #[test]
    fn test_trailing_separator_in_base() {
        let spec = SearchSpec::new("rust", "");
        assert_eq!(
            QueryBuilder::new("https://jobs.example.com/search?").build(&spec, 0),
            builder().build(&spec, 0)
        );
    }
}
