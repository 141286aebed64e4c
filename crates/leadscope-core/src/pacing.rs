//! Randomized pause between consecutive URLs of a batch.
//!
//! The batch runs one URL at a time and waits a random amount inside a fixed
//! window before moving on, so target sites see human-ish spacing rather than
//! a burst. The pause is skipped after the last URL.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use leadscope_core::pacing::PacingConfig;
//!
//! // Wait somewhere between 1 s and 3 s.
//! let pacing = PacingConfig::new(Duration::from_secs(1))
//!     .with_jitter(Duration::from_secs(2));
//! assert_eq!(pacing.max_delay(), Duration::from_secs(3));
//! ```

use std::time::Duration;

use crate::error::AppError;
use crate::util::rand_below;

/// Pause between URLs: `delay` plus a uniform random `[0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Minimum pause.
    pub delay: Duration,

    /// Maximum random jitter added on top of `delay`.
    ///
    /// Set to `Duration::ZERO` for a fixed pause.
    pub jitter: Duration,
}

impl PacingConfig {
    /// A fixed pause with no jitter.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// A pause drawn from `[min, max)`.
    pub fn window(min: Duration, max: Duration) -> Result<Self, AppError> {
        if max < min {
            return Err(AppError::ConfigError(format!(
                "Pacing window is inverted: min {} ms > max {} ms",
                min.as_millis(),
                max.as_millis()
            )));
        }
        Ok(Self::new(min).with_jitter(max - min))
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_delay(&self) -> Duration {
        self.delay + self.jitter
    }

    /// Draw one pause length.
    pub fn effective_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let jitter_ms = rand_below(self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(jitter_ms)
    }

    /// Sleep for one drawn pause.
    pub async fn pause(&self) {
        let delay = self.effective_delay();
        if delay.is_zero() {
            return;
        }
        tracing::debug!(sleep_ms = %delay.as_millis(), "Pacing before next URL");
        tokio::time::sleep(delay).await;
    }
}

impl Default for PacingConfig {
    /// 1 s base plus up to 2 s jitter.
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            jitter: Duration::from_secs(2),
        }
    }
}
