//! Runtime configuration for a scrape batch.
//!
//! Everything the pipeline needs is carried by one [`ScraperConfig`] value that
//! is built once (defaults, then environment, then CLI overrides) and handed to
//! the orchestrator. Nothing here is global.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::pacing::PacingConfig;
use crate::traits::{Viewport, WaitCondition};

/// User agents rotated per page.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Largest accepted attempt budget per URL.
pub const MAX_ATTEMPTS_LIMIT: u64 = 10;
/// Largest accepted navigation timeout, in seconds.
pub const MAX_NAVIGATION_TIMEOUT_SECS: u64 = 600;
/// Largest accepted delay (settle, pacing, backoff), in milliseconds.
pub const MAX_DELAY_MS: u64 = 600_000;

/// Options for starting the browser process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub headless: bool,
    pub no_sandbox: bool,
    /// Explicit browser binary; `None` lets the backend search for one.
    pub executable: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            executable: None,
        }
    }
}

/// How the page inspector loads and reads a page.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Site-specific selector tried before the generic name selectors.
    pub company_name_selector: Option<String>,
    /// Selector to wait for after navigation; a miss is not an error.
    pub ready_selector: Option<String>,
    pub wait_condition: WaitCondition,
    pub navigation_timeout: Duration,
    pub ready_timeout: Duration,
    /// Pause after navigation so client-rendered content can paint.
    pub settle_delay: Duration,
    /// Upper bound for every other page call (content, evaluation, close).
    pub operation_timeout: Duration,
    pub viewport: Viewport,
    pub user_agents: Vec<String>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            company_name_selector: None,
            ready_selector: None,
            wait_condition: WaitCondition::default(),
            navigation_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(2000),
            operation_timeout: Duration::from_secs(15),
            viewport: Viewport::default(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Attempt budget and linear backoff for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// The n-th failed attempt waits `n * backoff_base` before the next one.
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        self.backoff_base.saturating_mul(failed_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

/// Everything a batch run needs.
#[derive(Debug, Clone, Default)]
pub struct ScraperConfig {
    pub launch: LaunchOptions,
    pub inspector: InspectorConfig,
    pub retry: RetryPolicy,
    pub pacing: PacingConfig,
}

impl ScraperConfig {
    /// Defaults overridden by environment variables.
    ///
    /// - `LEADSCOPE_COMPANY_SELECTOR`, `LEADSCOPE_READY_SELECTOR`
    /// - `LEADSCOPE_NAVIGATION_TIMEOUT_SECS` (default 30)
    /// - `LEADSCOPE_SETTLE_DELAY_MS` (default 2000)
    /// - `LEADSCOPE_PACING_MIN_MS` / `LEADSCOPE_PACING_MAX_MS` (default 1000 / 3000)
    /// - `LEADSCOPE_MAX_ATTEMPTS` (default 2), `LEADSCOPE_RETRY_BACKOFF_MS` (default 1000)
    /// - `LEADSCOPE_HEADLESS` (default true), `CHROME_BIN`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.inspector.company_name_selector = non_empty("LEADSCOPE_COMPANY_SELECTOR");
        config.inspector.ready_selector = non_empty("LEADSCOPE_READY_SELECTOR");

        if let Some(secs) = parse_bounded(
            &lookup,
            "LEADSCOPE_NAVIGATION_TIMEOUT_SECS",
            1,
            MAX_NAVIGATION_TIMEOUT_SECS,
        )? {
            config.inspector.navigation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_bounded(&lookup, "LEADSCOPE_SETTLE_DELAY_MS", 0, MAX_DELAY_MS)? {
            config.inspector.settle_delay = Duration::from_millis(ms);
        }

        let min = parse_bounded(&lookup, "LEADSCOPE_PACING_MIN_MS", 0, MAX_DELAY_MS)?;
        let max = parse_bounded(&lookup, "LEADSCOPE_PACING_MAX_MS", 0, MAX_DELAY_MS)?;
        if min.is_some() || max.is_some() {
            let min = min.unwrap_or(config.pacing.delay.as_millis() as u64);
            let max = max.unwrap_or(min.max(config.pacing.max_delay().as_millis() as u64));
            config.pacing = PacingConfig::window(
                Duration::from_millis(min),
                Duration::from_millis(max),
            )?;
        }

        if let Some(attempts) =
            parse_bounded(&lookup, "LEADSCOPE_MAX_ATTEMPTS", 1, MAX_ATTEMPTS_LIMIT)?
        {
            config.retry.max_attempts = u32::try_from(attempts).map_err(|_| {
                AppError::ConfigError(format!("LEADSCOPE_MAX_ATTEMPTS {attempts} is too large"))
            })?;
        }
        if let Some(ms) = parse_bounded(&lookup, "LEADSCOPE_RETRY_BACKOFF_MS", 0, MAX_DELAY_MS)? {
            config.retry.backoff_base = Duration::from_millis(ms);
        }

        if let Some(raw) = non_empty("LEADSCOPE_HEADLESS") {
            config.launch.headless = match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid LEADSCOPE_HEADLESS '{raw}': expected true or false"
                    )));
                }
            };
        }
        config.launch.executable = non_empty("CHROME_BIN").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            AppError::ConfigError(format!(
                "Invalid {key} '{raw}': must be a non-negative integer"
            ))
        }),
    }
}

/// [`parse_u64`] plus an inclusive range check.
fn parse_bounded<F>(lookup: &F, key: &str, min: u64, max: u64) -> Result<Option<u64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_u64(lookup, key)? {
        Some(value) if value < min || value > max => Err(AppError::ConfigError(format!(
            "{key} must be between {min} and {max}, got {value}"
        ))),
        other => Ok(other),
    }
}
