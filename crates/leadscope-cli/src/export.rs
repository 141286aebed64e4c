use anyhow::{Context, Result};
use clap::ValueEnum;
use leadscope_core::models::{BatchReport, CompanyRecord, ExtractionLevel};

const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full report, pretty-printed
    #[default]
    Json,
    /// One row per company
    Csv,
}

pub fn render(report: &BatchReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Csv => to_csv(report),
    }
}

pub fn to_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Columns grow with the extraction level, so a basic export never has
/// empty profile columns.
pub fn to_csv(report: &BatchReport) -> Result<String> {
    let level = report.extraction_level;
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(headers(level))?;
    for record in &report.results {
        writer.write_record(row(record, level))?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn headers(level: ExtractionLevel) -> Vec<&'static str> {
    let mut headers = vec!["Company Name", "Website", "Emails", "Phones"];
    if level.includes_profile() {
        headers.extend(["Description", "LinkedIn", "Twitter", "Industry"]);
    }
    if level.includes_insights() {
        headers.extend(["Tech Stack", "Founded Year", "Services"]);
    }
    headers
}

fn row(record: &CompanyRecord, level: ExtractionLevel) -> Vec<String> {
    let mut row = vec![
        record.company_name.clone(),
        record.website.clone(),
        record.emails.join(LIST_SEPARATOR),
        record.phones.join(LIST_SEPARATOR),
    ];

    if level.includes_profile() {
        let profile = record.profile.clone().unwrap_or_default();
        row.extend([
            profile.description.unwrap_or_default(),
            profile.social_media.linkedin.unwrap_or_default(),
            profile.social_media.twitter.unwrap_or_default(),
            profile.industry,
        ]);
    }

    if level.includes_insights() {
        let insights = record.insights.clone().unwrap_or_default();
        row.extend([
            insights.tech_stack.join(LIST_SEPARATOR),
            insights.founded_year.unwrap_or_default(),
            insights.services.join(LIST_SEPARATOR),
        ]);
    }

    row
}
