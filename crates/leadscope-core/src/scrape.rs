//! Per-URL scrape with a bounded retry budget.
//!
//! # Attempt states
//!
//! ```text
//! INIT --begin--> ATTEMPTING --ok--> SUCCESS
//!                     |
//!                     +--err, budget left--> RETRYING --backoff, begin--> ATTEMPTING
//!                     |
//!                     +--err, budget spent--> FAILED
//! ```
//!
//! Transitions are a pure function of the current state, the event, and the
//! [`RetryPolicy`]; the async driver in [`UrlScraper::scrape`] only performs
//! the I/O each state asks for.

use std::time::Instant;

use crate::config::RetryPolicy;
use crate::error::AppError;
use crate::extract;
use crate::inspector::{PageInspector, PageSnapshot};
use crate::models::{
    CompanyRecord, ExtractionLevel, MAX_EMAILS, MAX_PHONES, MAX_SERVICES, SocialLinks,
};
use crate::traits::{BrowserPage, BrowserSession};
use crate::util::with_timeout;

/// Where a single URL is in its retry lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Init,
    /// Attempt number `attempt` (1-based) is running.
    Attempting { attempt: u32 },
    /// `failed_attempts` attempts have failed and budget remains.
    Retrying {
        failed_attempts: u32,
        last_error: String,
    },
    Success { attempts: u32 },
    Failed { attempts: u32, last_error: String },
}

/// Inputs that move an [`AttemptState`] forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Begin,
    Succeeded,
    Errored(String),
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Success { .. } | AttemptState::Failed { .. })
    }

    /// Next state. Events that make no sense in the current state leave it
    /// unchanged, so terminal states stay terminal.
    pub fn advance(&self, event: AttemptEvent, policy: &RetryPolicy) -> AttemptState {
        match (self, event) {
            (AttemptState::Init, AttemptEvent::Begin) => AttemptState::Attempting { attempt: 1 },
            (AttemptState::Retrying { failed_attempts, .. }, AttemptEvent::Begin) => {
                AttemptState::Attempting {
                    attempt: failed_attempts + 1,
                }
            }
            (AttemptState::Attempting { attempt }, AttemptEvent::Succeeded) => {
                AttemptState::Success { attempts: *attempt }
            }
            (AttemptState::Attempting { attempt }, AttemptEvent::Errored(error)) => {
                if *attempt >= policy.max_attempts {
                    AttemptState::Failed {
                        attempts: *attempt,
                        last_error: error,
                    }
                } else {
                    AttemptState::Retrying {
                        failed_attempts: *attempt,
                        last_error: error,
                    }
                }
            }
            (state, _) => state.clone(),
        }
    }
}

/// Runs the attempt state machine for one URL at a time.
#[derive(Debug, Clone, Default)]
pub struct UrlScraper {
    inspector: PageInspector,
    policy: RetryPolicy,
}

impl UrlScraper {
    pub fn new(inspector: PageInspector, policy: RetryPolicy) -> Self {
        Self { inspector, policy }
    }

    /// Scrape `url` into a finished record.
    ///
    /// Never fails: when the retry budget runs out, the record comes back with
    /// its defaults and `error` set.
    pub async fn scrape<S: BrowserSession>(
        &self,
        session: &S,
        url: &str,
        level: ExtractionLevel,
    ) -> CompanyRecord {
        let mut record = CompanyRecord::new(url, level);
        let mut state = AttemptState::Init;
        let start = Instant::now();

        loop {
            let event = match &state {
                AttemptState::Init => AttemptEvent::Begin,
                AttemptState::Attempting { attempt } => {
                    tracing::debug!(%url, attempt, "Attempting");
                    match self.attempt(session, url).await {
                        Ok(snapshot) => {
                            fill_record(&mut record, &snapshot, level);
                            AttemptEvent::Succeeded
                        }
                        Err(e) => {
                            tracing::warn!(%url, attempt, error = %e, "Attempt failed");
                            AttemptEvent::Errored(e.to_string())
                        }
                    }
                }
                AttemptState::Retrying {
                    failed_attempts, ..
                } => {
                    let backoff = self.policy.backoff(*failed_attempts);
                    tracing::debug!(%url, backoff_ms = %backoff.as_millis(), "Backing off");
                    tokio::time::sleep(backoff).await;
                    AttemptEvent::Begin
                }
                AttemptState::Success { attempts } => {
                    tracing::info!(
                        %url,
                        attempts,
                        company = %record.company_name,
                        emails = record.emails.len(),
                        phones = record.phones.len(),
                        elapsed_ms = %start.elapsed().as_millis(),
                        "Scraped"
                    );
                    return record;
                }
                AttemptState::Failed {
                    attempts,
                    last_error,
                } => {
                    record.error = Some(format!("Failed after {attempts} attempts: {last_error}"));
                    tracing::warn!(
                        %url,
                        attempts,
                        error = %last_error,
                        elapsed_ms = %start.elapsed().as_millis(),
                        "Giving up"
                    );
                    return record;
                }
            };
            state = state.advance(event, &self.policy);
        }
    }

    /// One attempt on a fresh page. The page is closed whatever happens.
    async fn attempt<S: BrowserSession>(
        &self,
        session: &S,
        url: &str,
    ) -> Result<PageSnapshot, AppError> {
        let op_timeout = self.inspector.config().operation_timeout;
        let page = with_timeout(op_timeout, "Opening page", session.new_page()).await?;

        let outcome = self.inspector.inspect(&page, url).await;

        if let Err(e) = with_timeout(op_timeout, "Closing page", page.close()).await {
            tracing::warn!(%url, error = %e, "Error closing page");
        }

        outcome
    }
}

/// Copy what `level` asks for from a snapshot into `record`.
pub fn fill_record(record: &mut CompanyRecord, snapshot: &PageSnapshot, level: ExtractionLevel) {
    let meta = &snapshot.metadata;
    let text = snapshot.body_text.as_str();

    record.emails = extract::extract_emails(&snapshot.raw_markup)
        .into_iter()
        .take(MAX_EMAILS)
        .collect();
    record.phones = extract::extract_phones(&snapshot.raw_markup)
        .into_iter()
        .take(MAX_PHONES)
        .collect();
    if let Some(name) = &meta.company_name_candidate {
        record.company_name = name.clone();
    }

    if level.includes_profile() {
        let profile = record.profile.get_or_insert_with(Default::default);
        profile.description = meta.description.clone();
        profile.social_media = SocialLinks {
            linkedin: meta.linkedin.clone(),
            twitter: meta.twitter.clone(),
            facebook: meta.facebook.clone(),
            instagram: meta.instagram.clone(),
        };
        profile.keywords = meta.keywords.clone();
        profile.industry = extract::extract_industry(text).to_string();
    }

    if level.includes_insights() {
        let insights = record.insights.get_or_insert_with(Default::default);
        insights.tech_stack = extract::extract_tech_stack(text);
        insights.page_title = meta.title.clone();
        insights.estimated_employee_count = extract::extract_employee_count(text);
        insights.founded_year = extract::extract_founded_year(text);
        insights.services = extract::extract_services(text)
            .into_iter()
            .take(MAX_SERVICES)
            .collect();
    }
}
