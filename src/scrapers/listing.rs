//! Listing fragment extraction.
//!
//! Field extraction is table-driven: each [`FieldRule`] lists selector
//! strategies tried in order, and the first non-empty value wins. Adding a
//! field fallback means adding a row, not a branch.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::ParseError;
use crate::models::{normalize_text, JobRecord};

/// Origin used to absolutize relative job links.
pub const SITE_ORIGIN: &str = "https://www.linkedin.com";

/// Record fields the extractor can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Position,
    Company,
    Location,
    PostedDate,
    Salary,
    JobUrl,
    CompanyLogo,
    AgoTime,
}

/// One way to read a value: a CSS selector plus either its text or an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    pub selector: String,
    pub attr: Option<String>,
}

impl Extract {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: None,
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: Some(attr.to_string()),
        }
    }
}

/// Ordered fallback strategies for one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub strategies: Vec<Extract>,
}

impl FieldRule {
    pub fn new(field: Field, strategies: Vec<Extract>) -> Self {
        Self { field, strategies }
    }
}

/// Selectors for the guest search card markup.
pub fn default_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(
            Field::Position,
            vec![Extract::text(".base-search-card__title"), Extract::text("h3")],
        ),
        FieldRule::new(
            Field::Company,
            vec![Extract::text(".base-search-card__subtitle"), Extract::text("h4")],
        ),
        FieldRule::new(
            Field::Location,
            vec![Extract::text(".job-search-card__location")],
        ),
        FieldRule::new(Field::PostedDate, vec![Extract::attr("time", "datetime")]),
        FieldRule::new(
            Field::Salary,
            vec![Extract::text(".job-search-card__salary-info")],
        ),
        FieldRule::new(
            Field::JobUrl,
            vec![
                Extract::attr("a.base-card__full-link", "href"),
                Extract::attr("a.base-card", "href"),
            ],
        ),
        FieldRule::new(
            Field::CompanyLogo,
            vec![
                Extract::attr("img.artdeco-entity-image", "data-delayed-url"),
                Extract::attr("img.artdeco-entity-image", "src"),
            ],
        ),
        FieldRule::new(
            Field::AgoTime,
            vec![
                Extract::text(".job-search-card__listdate"),
                Extract::text(".job-search-card__listdate--new"),
            ],
        ),
    ]
}

struct CompiledStrategy {
    selector: Selector,
    attr: Option<String>,
}

struct CompiledRule {
    field: Field,
    strategies: Vec<CompiledStrategy>,
}

/// Parses listing fragments into [`JobRecord`]s.
pub struct ListingExtractor {
    item_selector: Selector,
    rules: Vec<CompiledRule>,
    origin: String,
}

impl ListingExtractor {
    /// Extractor with the default card rules.
    pub fn new() -> Result<Self, ParseError> {
        Self::with_rules(default_rules())
    }

    /// Extractor with a custom rule table.
    pub fn with_rules(rules: Vec<FieldRule>) -> Result<Self, ParseError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let strategies = rule
                    .strategies
                    .into_iter()
                    .map(|s| {
                        Ok(CompiledStrategy {
                            selector: parse_selector(&s.selector)?,
                            attr: s.attr,
                        })
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?;
                Ok(CompiledRule {
                    field: rule.field,
                    strategies,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Self {
            item_selector: parse_selector("li")?,
            rules,
            origin: SITE_ORIGIN.to_string(),
        })
    }

    /// Resolve relative job links against `origin` instead of the default site.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Reject bodies that are whole documents rather than listing fragments.
    ///
    /// The guest endpoint answers with bare `<li>` cards; a full page means a
    /// login wall or challenge was served instead.
    pub fn classify(body: &str) -> Result<(), ParseError> {
        let head: String = body
            .trim_start()
            .chars()
            .take(512)
            .collect::<String>()
            .to_lowercase();
        if head.starts_with("<!doctype") || head.contains("<html") {
            return Err(ParseError::NotAFragment);
        }
        Ok(())
    }

    /// Classify then parse a listing page.
    pub fn parse_page(&self, body: &str) -> Result<Vec<JobRecord>, ParseError> {
        Self::classify(body)?;
        Ok(self.parse(body))
    }

    /// Parse every top-level list item; unusable items are skipped.
    pub fn parse(&self, fragment: &str) -> Vec<JobRecord> {
        let document = Html::parse_fragment(fragment);
        let mut records = Vec::new();

        for item in document.select(&self.item_selector) {
            if !is_top_level(&item) {
                continue;
            }
            match self.extract_item(&item) {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping listing item: {}", e),
            }
        }

        debug!("Parsed {} records from listing fragment", records.len());
        records
    }

    fn extract_item(&self, item: &ElementRef) -> Result<JobRecord, ParseError> {
        let mut record = JobRecord::default();

        for rule in &self.rules {
            let value = first_match(item, &rule.strategies);
            match rule.field {
                Field::Position => record.position = value,
                Field::Company => record.company = value,
                Field::Location => record.location = value,
                Field::PostedDate => {
                    record.posted_date = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok()
                }
                Field::Salary => {
                    if !value.is_empty() {
                        record.salary = value;
                    }
                }
                Field::JobUrl => record.job_url = self.resolve_url(&value),
                Field::CompanyLogo => record.company_logo_url = value,
                Field::AgoTime => record.ago_time = value,
            }
        }

        if !record.is_identifiable() {
            return Err(ParseError::MissingIdentity);
        }
        Ok(record)
    }

    fn resolve_url(&self, href: &str) -> String {
        if href.is_empty() {
            return String::new();
        }
        if let Ok(url) = Url::parse(href) {
            return url.to_string();
        }
        Url::parse(&self.origin)
            .and_then(|base| base.join(href))
            .map(|u| u.to_string())
            .unwrap_or_default()
    }
}

/// `scheme://host[:port]` of `url`, for resolving links found on its pages.
pub fn site_origin(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// True unless the item is nested inside another list item.
fn is_top_level(item: &ElementRef) -> bool {
    !item
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "li")
}

fn first_match(item: &ElementRef, strategies: &[CompiledStrategy]) -> String {
    for strategy in strategies {
        let Some(element) = item.select(&strategy.selector).next() else {
            continue;
        };
        let value = match &strategy.attr {
            Some(attr) => element.value().attr(attr).unwrap_or("").trim().to_string(),
            None => normalize_text(&element.text().collect::<String>()),
        };
        if !value.is_empty() {
            return value;
        }
    }
    String::new()
}
