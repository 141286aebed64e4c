use std::fmt;
use std::str::FromStr;

use leadscope_core::batch::BatchScraper;
use leadscope_core::config::ScraperConfig;
use leadscope_core::error::AppError;
use leadscope_core::models::{BatchReport, ScrapeRequest};

use crate::http::HttpLauncher;

/// Which browser backend drives a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
    /// Headless Chromium, renders JavaScript.
    #[default]
    Chrome,
    /// Plain HTTP plus static HTML parsing.
    Http,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Chrome => "chrome",
            Engine::Http => "http",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "chromium" | "browser" => Ok(Engine::Chrome),
            "http" | "static" => Ok(Engine::Http),
            other => Err(AppError::ConfigError(format!(
                "Unknown engine '{other}' (expected chrome or http)"
            ))),
        }
    }
}

/// Run one batch on the chosen backend.
pub async fn run_batch(
    engine: Engine,
    config: ScraperConfig,
    request: &ScrapeRequest,
) -> Result<BatchReport, AppError> {
    tracing::debug!(%engine, "Selecting browser backend");
    match engine {
        Engine::Chrome => run_chrome(config, request).await,
        Engine::Http => BatchScraper::new(HttpLauncher::new(), config).run(request).await,
    }
}

#[cfg(feature = "browser")]
async fn run_chrome(config: ScraperConfig, request: &ScrapeRequest) -> Result<BatchReport, AppError> {
    BatchScraper::new(crate::chrome::ChromeLauncher::new(), config)
        .run(request)
        .await
}

#[cfg(not(feature = "browser"))]
async fn run_chrome(
    _config: ScraperConfig,
    _request: &ScrapeRequest,
) -> Result<BatchReport, AppError> {
    Err(AppError::SessionInit(
        "leadscope-client was built without the `browser` feature".into(),
    ))
}
