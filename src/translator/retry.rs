//! Retry with exponential backoff around any [`Translator`].
//!
//! The wait before retry `n` (1-based) is `backoff_ms * 2^(n-1)`: with the
//! default 500 ms base and 3 retries that is 500 ms → 1 s → 2 s.

use super::Translator;
use crate::error::TranslatorError;
use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::warn;

pub struct RetryingTranslator<T> {
    inner: T,
    max_retries: u32,
    backoff_ms: u64,
}

impl<T: Translator> RetryingTranslator<T> {
    pub fn new(inner: T, max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            backoff_ms,
        }
    }
}

/// Delay before retry number `attempt` (1-based).
pub fn backoff_delay(backoff_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(backoff_ms.saturating_mul(factor))
}

#[async_trait]
impl<T: Translator> Translator for RetryingTranslator<T> {
    async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
        let mut attempt = 0;
        loop {
            match self.inner.translate(text).await {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.backoff_ms, attempt);
                    warn!(
                        "{}: attempt {} failed ({}); retry {}/{} after {}ms",
                        self.inner.name(),
                        attempt,
                        e,
                        attempt,
                        self.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
