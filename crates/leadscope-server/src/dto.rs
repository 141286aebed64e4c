use serde::{Deserialize, Serialize};

use leadscope_core::models::ExtractionLevel;

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequestBody {
    /// Websites to scrape, in order
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["https://example.com"]))]
    pub urls: serde_json::Value,

    /// `basic` (default), `medium` or `advanced`; anything else means `basic`
    #[schema(example = "medium")]
    pub extraction_level: Option<String>,
}

impl ScrapeRequestBody {
    /// The URL list as strings. Anything that is not an array yields an empty
    /// list, and non-string entries are kept in a form no URL parser accepts.
    pub fn url_list(&self) -> Vec<String> {
        match &self.urls {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn level(&self) -> ExtractionLevel {
        self.extraction_level
            .as_deref()
            .map(ExtractionLevel::from)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
