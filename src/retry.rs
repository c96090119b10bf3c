//! Exponential backoff bounded by a total wait budget.
//!
//! Retries an async operation while it fails with a retriable error, doubling
//! the delay (with jitter) after every failure, until the operation succeeds,
//! fails fatally, or the wait budget is spent.
//!
//! # Example
//!
//! ```ignore
//! use nodeport::retry::{retry_expo, BackoffConfig};
//!
//! let config = BackoffConfig::expo(Duration::from_secs(6), Duration::from_secs(20));
//! retry_expo(&config, "check_service", || check_service(client, "default", "web")).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::Result;

/// Smallest interval or wait budget accepted; zero is raised to this.
pub const MIN_DURATION: Duration = Duration::from_secs(1);

/// Default cap on a single backoff delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Backoff configuration for readiness polling.
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Maximum delay between attempts
    pub max_delay: Duration,
    /// Multiplier applied to the delay after every failure
    pub backoff_multiplier: f64,
    /// Total time budget; no new attempt starts after it is spent
    pub max_elapsed: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::expo(
            Duration::from_secs(crate::DEFAULT_INTERVAL_SECS),
            Duration::from_secs(crate::DEFAULT_WAIT_SECS),
        )
    }
}

impl BackoffConfig {
    /// Exponential backoff starting at `interval` and giving up after `wait`.
    ///
    /// A zero interval or budget is normalized to [`MIN_DURATION`].
    pub fn expo(interval: Duration, wait: Duration) -> Self {
        Self {
            initial_delay: normalize(interval),
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: 2.0,
            max_elapsed: normalize(wait),
        }
    }
}

fn normalize(d: Duration) -> Duration {
    if d.is_zero() {
        MIN_DURATION
    } else {
        d
    }
}

/// Execute an async operation with exponential backoff and jitter.
///
/// Only errors tagged [`crate::Error::Retriable`] are retried; any other error
/// is returned immediately. Once `max_elapsed` is exceeded the last
/// retriable error is returned as-is.
pub async fn retry_expo<F, Fut, T>(
    config: &BackoffConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retriable() => {
                debug!(
                    operation = %operation_name,
                    attempt = attempt,
                    error = %e,
                    "Operation failed with a fatal error"
                );
                return Err(e);
            }
            Err(e) => e,
        };

        let elapsed = start.elapsed();
        if elapsed >= config.max_elapsed {
            warn!(
                operation = %operation_name,
                attempt = attempt,
                elapsed_ms = elapsed.as_millis(),
                error = %err,
                "Operation still failing after wait budget"
            );
            return Err(err);
        }

        // Jitter: 0.5x to 1.5x of the delay, never past the budget
        let jitter = rand::thread_rng().gen_range(0.5..1.5);
        let jittered_delay = Duration::from_secs_f64(delay.as_secs_f64() * jitter)
            .min(config.max_elapsed - elapsed);

        debug!(
            operation = %operation_name,
            attempt = attempt,
            error = %err,
            delay_ms = jittered_delay.as_millis(),
            "Operation failed, retrying"
        );

        tokio::time::sleep(jittered_delay).await;

        delay = Duration::from_secs_f64(
            (delay.as_secs_f64() * config.backoff_multiplier).min(config.max_delay.as_secs_f64()),
        );
    }
}
