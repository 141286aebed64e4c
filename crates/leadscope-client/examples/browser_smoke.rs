/// Smoke-test for `ChromeLauncher`.
///
/// Launches a headless Chromium, scrapes <https://example.com> at the
/// advanced level, and prints the report.
///
/// Run with:
///   cargo run --example browser_smoke --features browser
use leadscope_client::{Engine, run_batch};
use leadscope_core::{ExtractionLevel, ScrapeRequest, ScraperConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("leadscope=debug,info")
        .init();

    let request = ScrapeRequest::new(
        vec!["https://example.com".to_string()],
        ExtractionLevel::Advanced,
    )?;

    println!("Launching headless browser…");
    let report = run_batch(Engine::Chrome, ScraperConfig::from_env()?, &request).await?;

    let record = &report.results[0];
    assert!(
        record.is_success(),
        "scrape failed: {}",
        record.error.as_deref().unwrap_or_default()
    );
    assert_eq!(record.company_name, "Example Domain");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
