//! Retry with exponential backoff
//!
//! Bitstream fetches from the media store go through [`with_retry`]. Transient
//! failures (timeouts, refused connections, HTTP 5xx and 429) are retried with
//! an exponentially growing, optionally jittered delay; everything else fails
//! immediately.
//!
//! # Example
//!
//! ```no_run
//! use soundcomparisons::config::RetryConfig;
//! use soundcomparisons::error::Error;
//! use soundcomparisons::retry::with_retry;
//!
//! # async fn example() -> Result<(), Error> {
//! let config = RetryConfig::default();
//! let body = with_retry(&config, || async {
//!     Ok::<_, Error>(b"...".to_vec())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{DownloadError, Error};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Classification of errors into transient and permanent
pub trait IsRetryable {
    /// Returns true if the operation may succeed when attempted again
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| is_retryable_status(s.as_u16()))
            }
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            Error::Download(DownloadError::HttpStatus { status, .. }) => {
                is_retryable_status(*status)
            }
            Error::Download(DownloadError::ChecksumMismatch { .. }) => false,
            Error::Config { .. }
            | Error::InvalidName(_)
            | Error::MalformedServerLine { .. }
            | Error::MissingInput { .. }
            | Error::InvalidCatalog { .. }
            | Error::Data(_)
            | Error::InconsistentLanguages { .. }
            | Error::Database(_)
            | Error::Sqlx(_)
            | Error::Serialization(_)
            | Error::Csv(_)
            | Error::Archive(_)
            | Error::Other(_) => false,
        }
    }
}

/// Server errors and rate limiting are worth another attempt
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
///
/// `config.max_attempts` counts retries after the first attempt, so the
/// operation runs at most `max_attempts + 1` times.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut retries = 0;
    let mut delay = config.initial_delay;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(attempts = retries + 1, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !err.is_retryable() {
            tracing::debug!(error = %err, "permanent failure, not retrying");
            return Err(err);
        }
        if retries >= config.max_attempts {
            tracing::error!(
                error = %err,
                attempts = retries + 1,
                "giving up after all retry attempts"
            );
            return Err(err);
        }

        retries += 1;
        let wait = if config.jitter { add_jitter(delay) } else { delay };
        tracing::warn!(
            error = %err,
            attempt = retries,
            max_attempts = config.max_attempts,
            delay_ms = wait.as_millis() as u64,
            "transient failure, retrying"
        );
        tokio::time::sleep(wait).await;

        delay = next_delay(delay, config);
    }
}

fn next_delay(delay: Duration, config: &RetryConfig) -> Duration {
    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier).min(config.max_delay)
}

/// Stretch `delay` by a random factor between 1 and 2
fn add_jitter(delay: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(1.0..=2.0);
    Duration::from_secs_f64(delay.as_secs_f64() * factor)
}
