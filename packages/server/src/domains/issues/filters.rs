//! List filters for issues.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use typed_builder::TypedBuilder;

use super::errors::IssueError;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Raw query-string form of the filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueQuery {
    /// Comma-separated status labels
    pub status: Option<String>,
    pub category: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub from: Option<String>,
    /// YYYY-MM-DD, inclusive through end of day
    pub to: Option<String>,
    /// Case-insensitive text searched in category and description
    pub q: Option<String>,
    /// Only the caller's own issues
    pub mine: Option<bool>,
}

/// Parsed filters. Every field is optional; present ones are ANDed.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct IssueFilters {
    #[builder(default)]
    pub statuses: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    pub category: Option<String>,
    #[builder(default, setter(strip_option))]
    pub from: Option<NaiveDate>,
    #[builder(default, setter(strip_option))]
    pub to: Option<NaiveDate>,
    #[builder(default, setter(strip_option, into))]
    pub text: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub creator: Option<String>,
}

impl IssueFilters {
    /// Parse the query string. `creator` is the caller's identity, applied
    /// only when `mine` is set.
    pub fn from_query(query: &IssueQuery, creator: Option<&str>) -> Result<Self, IssueError> {
        let statuses = query
            .status
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            statuses,
            category: non_blank(query.category.as_deref()),
            from: parse_date(query.from.as_deref(), "from")?,
            to: parse_date(query.to.as_deref(), "to")?
                .map(|d| {
                    d.succ_opt()
                        .map(|_| d)
                        .ok_or_else(|| IssueError::Validation("'to' is out of range".to_string()))
                })
                .transpose()?,
            text: non_blank(query.q.as_deref()),
            creator: if query.mine.unwrap_or(false) {
                creator.map(str::to_string)
            } else {
                None
            },
        })
    }

    /// Category to match exactly, unless it is the wildcard.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    /// Start of the `from` day, UTC.
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Exclusive upper bound: start of the day after `to`, UTC. `None` when
    /// `to` is the last representable day, which leaves the range open.
    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|d| d.succ_opt())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// ILIKE pattern with wildcard characters in the search text escaped.
    pub fn text_pattern(&self) -> Option<String> {
        self.text.as_deref().map(|text| {
            let escaped = text
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, IssueError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| IssueError::Validation(format!("'{}' must be a YYYY-MM-DD date", field))),
    }
}
