//! Filter vocabularies for the guest job search endpoint.
//!
//! Each filter is a closed enum with a static synonym table. Lookups are
//! case-insensitive and whitespace-tolerant; anything not in a table parses
//! to `None`, which the query builder renders as "omit this parameter".

use crate::models::normalize_text;

/// Find `input` in a synonym table.
fn lookup<T: Copy>(table: &[(&str, T)], input: &str) -> Option<T> {
    let needle = normalize_text(input).to_lowercase();
    if needle.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(label, _)| *label == needle)
        .map(|(_, value)| *value)
}

/// `f_TPR`: how recently the job was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePosted {
    PastMonth,
    PastWeek,
    Past24Hours,
}

impl DatePosted {
    const TABLE: &'static [(&'static str, DatePosted)] = &[
        ("past month", DatePosted::PastMonth),
        ("past week", DatePosted::PastWeek),
        ("24hr", DatePosted::Past24Hours),
    ];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            DatePosted::PastMonth => "r2592000",
            DatePosted::PastWeek => "r604800",
            DatePosted::Past24Hours => "r86400",
        }
    }
}

/// `f_E`: seniority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceLevel {
    Internship,
    Entry,
    Associate,
    Senior,
    Director,
    Executive,
}

impl ExperienceLevel {
    const TABLE: &'static [(&'static str, ExperienceLevel)] = &[
        ("internship", ExperienceLevel::Internship),
        ("entry level", ExperienceLevel::Entry),
        ("associate", ExperienceLevel::Associate),
        ("senior", ExperienceLevel::Senior),
        ("director", ExperienceLevel::Director),
        ("executive", ExperienceLevel::Executive),
    ];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "1",
            ExperienceLevel::Entry => "2",
            ExperienceLevel::Associate => "3",
            ExperienceLevel::Senior => "4",
            ExperienceLevel::Director => "5",
            ExperienceLevel::Executive => "6",
        }
    }
}

/// `f_JT`: employment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Volunteer,
    Internship,
}

impl JobType {
    const TABLE: &'static [(&'static str, JobType)] = &[
        ("full time", JobType::FullTime),
        ("full-time", JobType::FullTime),
        ("part time", JobType::PartTime),
        ("part-time", JobType::PartTime),
        ("contract", JobType::Contract),
        ("temporary", JobType::Temporary),
        ("volunteer", JobType::Volunteer),
        ("internship", JobType::Internship),
    ];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            JobType::FullTime => "F",
            JobType::PartTime => "P",
            JobType::Contract => "C",
            JobType::Temporary => "T",
            JobType::Volunteer => "V",
            JobType::Internship => "I",
        }
    }
}

/// `f_WT`: workplace type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteFilter {
    OnSite,
    Remote,
    Hybrid,
}

impl RemoteFilter {
    const TABLE: &'static [(&'static str, RemoteFilter)] = &[
        ("on-site", RemoteFilter::OnSite),
        ("on site", RemoteFilter::OnSite),
        ("remote", RemoteFilter::Remote),
        ("hybrid", RemoteFilter::Hybrid),
    ];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            RemoteFilter::OnSite => "1",
            RemoteFilter::Remote => "2",
            RemoteFilter::Hybrid => "3",
        }
    }
}

/// `f_SB2`: minimum annual salary bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalaryFloor {
    From40k,
    From60k,
    From80k,
    From100k,
    From120k,
}

impl SalaryFloor {
    const TABLE: &'static [(&'static str, SalaryFloor)] = &[
        ("40000", SalaryFloor::From40k),
        ("60000", SalaryFloor::From60k),
        ("80000", SalaryFloor::From80k),
        ("100000", SalaryFloor::From100k),
        ("120000", SalaryFloor::From120k),
    ];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            SalaryFloor::From40k => "1",
            SalaryFloor::From60k => "2",
            SalaryFloor::From80k => "3",
            SalaryFloor::From100k => "4",
            SalaryFloor::From120k => "5",
        }
    }
}

/// `sortBy`: result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortBy {
    Recent,
    Relevant,
}

impl SortBy {
    const TABLE: &'static [(&'static str, SortBy)] =
        &[("recent", SortBy::Recent), ("relevant", SortBy::Relevant)];

    pub fn parse(label: &str) -> Option<Self> {
        lookup(Self::TABLE, label)
    }

    pub fn code(self) -> &'static str {
        match self {
            SortBy::Recent => "DD",
            SortBy::Relevant => "R",
        }
    }
}
