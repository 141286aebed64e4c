use crate::config::InspectorConfig;
use crate::error::AppError;
use crate::traits::{BrowserPage, MetadataQuery, RawMetadata};
use crate::util::{pick, with_timeout};

/// Name selectors tried after the configured one, in order.
pub const GENERIC_NAME_SELECTORS: &[&str] = &[
    "h1",
    ".company-name",
    ".brand-name",
    "[data-testid=\"company-name\"]",
];

/// Candidates this long or longer are treated as body copy, not a name.
pub const MAX_NAME_CHARS: usize = 100;

const LINKEDIN: &[&str] = &["linkedin.com"];
const TWITTER: &[&str] = &["twitter.com", "x.com"];
const FACEBOOK: &[&str] = &["facebook.com"];
const INSTAGRAM: &[&str] = &["instagram.com"];

/// DOM-derived facts about a loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub company_name_candidate: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

impl PageMetadata {
    pub fn from_raw(raw: RawMetadata) -> Self {
        let company_name_candidate = resolve_company_name(&raw.name_candidates, &raw.title);
        Self {
            company_name_candidate,
            linkedin: first_link(&raw.links, LINKEDIN),
            twitter: first_link(&raw.links, TWITTER),
            facebook: first_link(&raw.links, FACEBOOK),
            instagram: first_link(&raw.links, INSTAGRAM),
            title: non_empty(raw.title),
            description: non_empty(raw.description),
            keywords: non_empty(raw.keywords),
        }
    }
}

/// Everything read from one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub raw_markup: String,
    pub body_text: String,
    pub metadata: PageMetadata,
}

/// Loads a URL into a page and reads it.
///
/// The inspector never retries; a failure is returned to the caller, which
/// owns the retry budget. Every page call is bounded by a timeout from the
/// [`InspectorConfig`].
#[derive(Debug, Clone, Default)]
pub struct PageInspector {
    config: InspectorConfig,
}

impl PageInspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// The query sent into every page.
    pub fn metadata_query(&self) -> MetadataQuery {
        let configured = self
            .config
            .company_name_selector
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned();
        MetadataQuery {
            name_selectors: configured
                .chain(GENERIC_NAME_SELECTORS.iter().map(|s| s.to_string()))
                .collect(),
        }
    }

    pub async fn inspect<P: BrowserPage>(
        &self,
        page: &P,
        url: &str,
    ) -> Result<PageSnapshot, AppError> {
        let cfg = &self.config;
        let op_timeout = cfg.operation_timeout;

        if let Some(user_agent) = pick(&cfg.user_agents) {
            with_timeout(op_timeout, "Setting user agent", page.set_user_agent(user_agent))
                .await?;
        }
        with_timeout(op_timeout, "Setting viewport", page.set_viewport(cfg.viewport)).await?;

        with_timeout(
            cfg.navigation_timeout,
            "Navigation",
            page.navigate(url, cfg.wait_condition, cfg.navigation_timeout),
        )
        .await?;

        if let Some(selector) = cfg.ready_selector.as_deref() {
            let waited = with_timeout(
                cfg.ready_timeout,
                "Waiting for ready selector",
                page.wait_for_selector(selector, cfg.ready_timeout),
            )
            .await;
            if let Err(e) = waited {
                tracing::warn!(%url, %selector, error = %e, "Ready selector not found, continuing");
            }
        }

        if !cfg.settle_delay.is_zero() {
            tokio::time::sleep(cfg.settle_delay).await;
        }

        let raw_markup = with_timeout(op_timeout, "Reading content", page.content()).await?;

        let body_text =
            match with_timeout(op_timeout, "Reading body text", page.inner_text("body")).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(%url, error = %e, "No body text");
                    String::new()
                }
            };

        let query = self.metadata_query();
        let raw = with_timeout(op_timeout, "Metadata query", page.query_metadata(&query)).await?;

        tracing::debug!(
            %url,
            markup_bytes = raw_markup.len(),
            text_bytes = body_text.len(),
            links = raw.links.len(),
            "Page inspected"
        );

        Ok(PageSnapshot {
            raw_markup,
            body_text,
            metadata: PageMetadata::from_raw(raw),
        })
    }
}

/// Pick the company name: the first usable selector hit, else the leading
/// segment of the title split on `-` or `|`.
pub fn resolve_company_name(candidates: &[String], title: &str) -> Option<String> {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| is_usable_name(c))
        .map(str::to_string)
        .or_else(|| {
            title
                .split(['-', '|'])
                .next()
                .map(str::trim)
                .filter(|c| is_usable_name(c))
                .map(str::to_string)
        })
}

fn is_usable_name(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().count() < MAX_NAME_CHARS
}

fn first_link(links: &[String], needles: &[&str]) -> Option<String> {
    links
        .iter()
        .find(|href| {
            let lower = href.to_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
        .cloned()
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
