//! Retry/backoff governor for navigation and page-fetch steps
//!
//! Retry behavior is expressed as data (`RetryPolicy`) plus a failure
//! classifier, never baked into call sites. Wrapped operations must be
//! safely re-invocable; no partial progress is assumed from a failed
//! attempt.

use crate::config::RetryConfig;
use crate::SourceError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How a failure should be treated by the governor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Worth another attempt after a delay (timeout, stale content)
    Transient,
    /// Retrying cannot help; surface immediately
    Fatal,
}

/// Bounded retry policy for a single wrapped step
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before the last failure is surfaced
    pub max_attempts: u32,

    /// Delay between attempts
    pub delay: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

impl SourceError {
    /// Classifies this failure for the retry governor
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Timeout { .. } | Self::Stale { .. } | Self::Request { .. } => {
                FailureClass::Transient
            }
            // 429 and server errors are worth waiting out; other statuses
            // will not change between attempts
            Self::Http { status, .. } if *status == 429 || *status >= 500 => {
                FailureClass::Transient
            }
            Self::Http { .. } | Self::SessionUnavailable(_) | Self::Address(_) => {
                FailureClass::Fatal
            }
        }
    }
}

/// Runs an operation under a retry policy
///
/// Transient failures are retried with a warning per attempt until the
/// policy is exhausted; fatal failures surface immediately. The last
/// failure is returned unchanged so callers can degrade gracefully.
///
/// # Arguments
///
/// * `policy` - Attempt count and inter-attempt delay
/// * `classify` - Maps a failure to transient or fatal
/// * `op` - The operation; invoked fresh on every attempt
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    classify: impl Fn(&E) -> FailureClass,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if classify(&err) == FailureClass::Fatal {
                    tracing::error!("Fatal failure, not retrying: {}", err);
                    return Err(err);
                }
                if attempt >= policy.max_attempts {
                    tracing::error!("Failed after {} attempts: {}", attempt, err);
                    return Err(err);
                }
                tracing::warn!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    err,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
