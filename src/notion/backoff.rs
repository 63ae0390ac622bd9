//! Exponential backoff for rate-limited API calls.

use std::future::Future;
use std::time::Duration;

use super::NotionError;

/// Retry policy: wait `min(base * 2^attempt, cap)` after each rate-limit
/// response, attempt counter starting at 1, up to `max_retries` retries.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 8,
            base: Duration::from_millis(500),
            cap: Duration::from_secs(8),
        }
    }
}

impl BackoffPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.cap)
    }
}

/// Run `op`, retrying only on `RateLimited` per the policy. Any other error
/// propagates immediately; exceeding the retry budget re-raises the
/// rate-limit error.
pub async fn with_backoff<T, F, Fut>(policy: &BackoffPolicy, mut op: F) -> Result<T, NotionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NotionError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(NotionError::RateLimited) => {
                attempt += 1;
                if attempt > policy.max_retries {
                    return Err(NotionError::RateLimited);
                }
                let delay = policy.delay(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_up_to_the_cap() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(4));
        assert_eq!(policy.delay(4), Duration::from_secs(8));
        assert_eq!(policy.delay(5), Duration::from_secs(8));
        assert_eq!(policy.delay(30), Duration::from_secs(8));
    }
}
