use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;

/// Company name used when no candidate survives resolution.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Industry label used when no vocabulary entry matches.
pub const UNKNOWN_INDUSTRY: &str = "Unknown";

pub const MAX_EMAILS: usize = 10;
pub const MAX_PHONES: usize = 5;
pub const MAX_SERVICES: usize = 3;

/// How much of a page gets turned into a [`CompanyRecord`].
///
/// Levels are cumulative: `Advanced` populates everything `Medium` does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ExtractionLevel {
    #[default]
    Basic,
    Medium,
    Advanced,
}

impl ExtractionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionLevel::Basic => "basic",
            ExtractionLevel::Medium => "medium",
            ExtractionLevel::Advanced => "advanced",
        }
    }

    pub fn includes_profile(&self) -> bool {
        *self >= ExtractionLevel::Medium
    }

    pub fn includes_insights(&self) -> bool {
        *self == ExtractionLevel::Advanced
    }
}

impl fmt::Display for ExtractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lenient parse: anything that is not `medium` or `advanced` is `basic`.
impl From<&str> for ExtractionLevel {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "medium" => ExtractionLevel::Medium,
            "advanced" => ExtractionLevel::Advanced,
            _ => ExtractionLevel::Basic,
        }
    }
}

impl From<String> for ExtractionLevel {
    fn from(s: String) -> Self {
        ExtractionLevel::from(s.as_str())
    }
}

/// A validated batch request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    urls: Vec<String>,
    extraction_level: ExtractionLevel,
}

impl ScrapeRequest {
    /// Validate raw input.
    ///
    /// An empty list is rejected outright. Entries that do not parse as an
    /// absolute URL are dropped silently, and the request is rejected only if
    /// nothing survives.
    pub fn new(urls: Vec<String>, extraction_level: ExtractionLevel) -> Result<Self, AppError> {
        if urls.is_empty() {
            return Err(AppError::InvalidRequest(
                "No URLs provided or invalid format".into(),
            ));
        }

        let total = urls.len();
        let valid: Vec<String> = urls.into_iter().filter(|u| is_valid_url(u)).collect();

        if valid.is_empty() {
            return Err(AppError::InvalidRequest("No valid URLs provided".into()));
        }
        if valid.len() < total {
            tracing::debug!(dropped = total - valid.len(), "Dropped unparseable URLs");
        }

        Ok(Self {
            urls: valid,
            extraction_level,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn extraction_level(&self) -> ExtractionLevel {
        self.extraction_level
    }
}

fn is_valid_url(raw: &str) -> bool {
    Url::parse(raw).is_ok()
}

/// Links to the company's social profiles, first match per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

/// Fields populated from `medium` upwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub description: Option<String>,
    pub social_media: SocialLinks,
    pub keywords: Option<String>,
    pub industry: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            description: None,
            social_media: SocialLinks::default(),
            keywords: None,
            industry: UNKNOWN_INDUSTRY.to_string(),
        }
    }
}

/// Fields populated only at `advanced`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsights {
    pub tech_stack: Vec<String>,
    pub page_title: Option<String>,
    pub estimated_employee_count: Option<String>,
    pub founded_year: Option<String>,
    pub services: Vec<String>,
}

/// The per-URL result.
///
/// The shape is a function of the extraction level alone: a record created
/// for `medium` always carries a profile, even when every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub company_name: String,
    pub website: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub error: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CompanyProfile>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub insights: Option<CompanyInsights>,
}

impl CompanyRecord {
    /// An empty record with the defaults for `level`.
    pub fn new(website: &str, level: ExtractionLevel) -> Self {
        Self {
            company_name: UNKNOWN_COMPANY.to_string(),
            website: website.to_string(),
            emails: Vec::new(),
            phones: Vec::new(),
            error: None,
            profile: level.includes_profile().then(CompanyProfile::default),
            insights: level.includes_insights().then(CompanyInsights::default),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub companies_with_emails: usize,
    pub companies_with_phones: usize,
}

impl BatchSummary {
    pub fn from_records(records: &[CompanyRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.total_processed += 1;
            if r.is_success() {
                acc.successful += 1;
            } else {
                acc.failed += 1;
            }
            if !r.emails.is_empty() {
                acc.companies_with_emails += 1;
            }
            if !r.phones.is_empty() {
                acc.companies_with_phones += 1;
            }
            acc
        })
    }
}

/// The outbound result of one batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<CompanyRecord>,
    pub summary: BatchSummary,
    pub extraction_level: ExtractionLevel,
    pub timestamp: DateTime<Utc>,
}

impl BatchReport {
    pub fn new(results: Vec<CompanyRecord>, extraction_level: ExtractionLevel) -> Self {
        let summary = BatchSummary::from_records(&results);
        Self {
            results,
            summary,
            extraction_level,
            timestamp: Utc::now(),
        }
    }
}
