pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod inspector;
pub mod models;
pub mod pacing;
pub mod scrape;
#[cfg(test)]
pub(crate) mod testutil;
pub mod traits;
pub mod util;

pub use batch::BatchScraper;
pub use config::{InspectorConfig, LaunchOptions, RetryPolicy, ScraperConfig};
pub use error::AppError;
pub use inspector::{PageInspector, PageMetadata, PageSnapshot};
pub use models::{
    BatchReport, BatchSummary, CompanyInsights, CompanyProfile, CompanyRecord, ExtractionLevel,
    ScrapeRequest, SocialLinks,
};
pub use pacing::PacingConfig;
pub use scrape::{AttemptEvent, AttemptState, UrlScraper};
pub use traits::{
    BrowserPage, BrowserSession, MetadataQuery, RawMetadata, SessionLauncher, Viewport,
    WaitCondition,
};
