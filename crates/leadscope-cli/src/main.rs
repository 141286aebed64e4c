use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use leadscope_client::{Engine, run_batch};
use leadscope_core::config::ScraperConfig;
use leadscope_core::models::{ExtractionLevel, ScrapeRequest};

mod export;
mod input;

use export::OutputFormat;

#[derive(Parser)]
#[command(name = "leadscope", version, about = "Company contact and profile scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a batch of company websites
    Scrape {
        /// Website to scrape (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extraction level: basic, medium or advanced
        #[arg(
            short,
            long,
            env = "LEADSCOPE_EXTRACTION_LEVEL",
            default_value = "basic"
        )]
        level: String,

        /// Browser backend: chrome or http
        #[arg(short, long, env = "LEADSCOPE_ENGINE", default_value = "chrome")]
        engine: Engine,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSS selector tried first for the company name
        #[arg(long, env = "LEADSCOPE_COMPANY_SELECTOR")]
        company_selector: Option<String>,

        /// CSS selector to wait for before reading the page
        #[arg(long, env = "LEADSCOPE_READY_SELECTOR")]
        ready_selector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadscope=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            urls,
            file,
            level,
            engine,
            format,
            output,
            company_selector,
            ready_selector,
        } => {
            let mut config = ScraperConfig::from_env().context("Invalid LEADSCOPE_* configuration")?;
            if company_selector.is_some() {
                config.inspector.company_name_selector = company_selector;
            }
            if ready_selector.is_some() {
                config.inspector.ready_selector = ready_selector;
            }

            let urls = input::collect_urls(&urls, file.as_deref())?;
            let request = ScrapeRequest::new(urls, ExtractionLevel::from(level))?;

            cmd_scrape(engine, config, &request, format, output).await?;
        }
    }

    Ok(())
}

async fn cmd_scrape(
    engine: Engine,
    config: ScraperConfig,
    request: &ScrapeRequest,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    tracing::info!(
        urls = request.urls().len(),
        level = %request.extraction_level(),
        %engine,
        "Scraping"
    );

    let report = run_batch(engine, config, request).await?;
    let rendered = export::render(&report, format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote report to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    let summary = report.summary;
    tracing::info!(
        processed = summary.total_processed,
        successful = summary.successful,
        failed = summary.failed,
        with_emails = summary.companies_with_emails,
        with_phones = summary.companies_with_phones,
        "Done"
    );

    Ok(())
}
