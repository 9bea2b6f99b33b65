//! Exponential backoff retry for transient generation failures.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::GenerationError;
use crate::llm::provider::TextGenerator;

/// Default total attempts: the first request plus one retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `max_attempts` times, but only while it fails
/// with an error for which `is_transient` holds. Any other error is returned
/// immediately. When every attempt failed transiently, the last error goes
/// through `wrap_exhausted`.
pub async fn retry_with_backoff<T, E, Fut, F, P, W>(
    max_attempts: u32,
    mut attempt: F,
    is_transient: P,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    W: FnOnce(E) -> E,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        let e = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !is_transient(&e) {
            return Err(e);
        }
        if attempts >= max_attempts {
            return Err(if max_attempts > 1 { wrap_exhausted(e) } else { e });
        }

        if let Some(wait_duration) = backoff.next_backoff() {
            tokio::time::sleep(wait_duration).await;
        }
    }
}

/// Generator wrapper that retries transient transport failures.
pub struct Retrying {
    inner: Box<dyn TextGenerator>,
    max_attempts: u32,
}

impl Retrying {
    pub fn new(inner: Box<dyn TextGenerator>, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts,
        }
    }
}

#[async_trait]
impl TextGenerator for Retrying {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        retry_with_backoff(
            self.max_attempts,
            || async {
                let result = self.inner.generate(prompt).await;
                if let Err(ref e) = result
                    && e.is_transient()
                {
                    warn!("Transient generation failure: {e}");
                }
                result
            },
            GenerationError::is_transient,
            |e| GenerationError::RetriesExhausted(Box::new(e)),
        )
        .await
    }
}
