use std::time::Instant;

use crate::config::ScraperConfig;
use crate::error::AppError;
use crate::inspector::PageInspector;
use crate::models::{BatchReport, ScrapeRequest};
use crate::scrape::UrlScraper;
use crate::traits::{BrowserSession, SessionLauncher};
use crate::util::with_timeout;

/// Runs a whole batch on a single browser session.
///
/// Generic over the launcher so tests can drive it with the in-memory browser
/// from the `testutil` module.
pub struct BatchScraper<L: SessionLauncher> {
    launcher: L,
    config: ScraperConfig,
    scraper: UrlScraper,
}

impl<L: SessionLauncher> BatchScraper<L> {
    pub fn new(launcher: L, config: ScraperConfig) -> Self {
        let scraper = UrlScraper::new(PageInspector::new(config.inspector.clone()), config.retry);
        Self {
            launcher,
            config,
            scraper,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Scrape every URL of `request`, in order.
    ///
    /// 1. Launch one session (failure here is the only error returned)
    /// 2. Scrape each URL, pausing between consecutive URLs
    /// 3. Close the session, logging but ignoring close errors
    /// 4. Summarise
    pub async fn run(&self, request: &ScrapeRequest) -> Result<BatchReport, AppError> {
        let level = request.extraction_level();
        let urls = request.urls();
        let start = Instant::now();

        tracing::info!(urls = urls.len(), %level, "Starting batch");

        let session = self
            .launcher
            .launch(&self.config.launch)
            .await
            .map_err(|e| match e {
                AppError::SessionInit(_) => e,
                other => AppError::SessionInit(other.to_string()),
            })?;

        let mut results = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            if index > 0 {
                self.config.pacing.pause().await;
            }
            tracing::info!(%url, position = index + 1, total = urls.len(), "Scraping");
            results.push(self.scraper.scrape(&session, url, level).await);
        }

        let close_timeout = self.config.inspector.operation_timeout;
        if let Err(e) = with_timeout(close_timeout, "Closing browser", session.close()).await {
            tracing::warn!(error = %e, "Error closing browser session");
        }

        let report = BatchReport::new(results, level);
        tracing::info!(
            processed = report.summary.total_processed,
            successful = report.summary.successful,
            failed = report.summary.failed,
            with_emails = report.summary.companies_with_emails,
            with_phones = report.summary.companies_with_phones,
            elapsed_ms = %start.elapsed().as_millis(),
            "Batch complete"
        );
        Ok(report)
    }
}
