use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::AppError;

// Cheap randomness based on std, avoids pulling in the `rand` crate.
// A xorshift seeded from the clock plus a per-process counter, so two calls in
// the same nanosecond still differ. Good enough for jitter and UA rotation,
// not for anything security related.

static COUNTER: AtomicU64 = AtomicU64::new(0x9E37_79B9_7F4A_7C15);

/// Uniform-ish value in `[0, max)`. Returns 0 when `max` is 0.
pub fn rand_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let mut x = nanos ^ COUNTER.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed);
    if x == 0 {
        x = 0xDEAD_BEEF;
    }
    // xorshift64
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max
}

/// Pick a random element, `None` for an empty slice.
pub fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(rand_below(items.len() as u64) as usize)
}

/// Run `fut` but give up after `limit`, reporting `operation` as timed out.
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(inner) => inner,
        Err(_) => Err(AppError::timeout(operation, limit)),
    }
}
